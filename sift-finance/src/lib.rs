//! sift-finance: keyword classifier, category aggregation, and the pipeline that ties them together

pub mod aggregator;
pub mod classifier;
pub mod pipeline;
pub mod report;
pub mod sink;

pub use aggregator::{BucketSummary, ranked_totals, summarize};
pub use classifier::{Classifier, ClassifierOptions, ClassifyError, ClassifyStats};
pub use pipeline::{FileCount, Pipeline, PipelineOptions, PipelineOutput, RunSummary};
pub use report::{DetailedRow, detailed_rows, sort_detailed};
pub use sink::{CsvDirSink, MemorySink, ReportSink};
