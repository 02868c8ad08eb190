//! sift-ingest: statement CSV reading, keyword table loading, and field normalization.

pub mod keywords;
pub mod normalize;
pub mod report_reader;
pub mod source;
pub mod types;

pub use keywords::load_keyword_table;
pub use normalize::{FieldNormalizer, file_origin, normalize_source, parse_amount, parse_date};
pub use report_reader::{ReportLine, read_categorized_report};
pub use source::{list_source_files, read_source_csv};
pub use types::{RawCell, RawRow, SourceTable, columns};
