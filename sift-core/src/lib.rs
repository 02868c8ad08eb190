//! sift-core: data model and error types for the statement categorization pipeline

pub mod bucket;
pub mod error;
pub mod keywords;
pub mod transaction;

pub use bucket::{Bucket, BucketMode, CategoryTotal, format_amount, week_start};
pub use error::{Result, SiftError};
pub use keywords::{KeywordEntry, KeywordTable};
pub use transaction::{Category, NOTHING, TOTAL, TextField, Transaction};
