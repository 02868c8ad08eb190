use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a run. Row-level problems never surface here; they are
/// recorded on the row and counted instead.
#[derive(Error, Debug)]
pub enum SiftError {
    /// No rows were found across all source files.
    #[error("No transactions found in the source files")]
    NoInputData,

    /// The keyword table has no usable entries.
    #[error("Keyword table is empty: {origin}")]
    EmptyKeywordTable { origin: String },

    /// The keyword file could not be opened or parsed.
    #[error("Failed to read keyword file {path}: {source}")]
    KeywordFile {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A CSV file is missing a column the reader cannot work without.
    #[error("{path} is missing the '{column}' column")]
    MissingColumn { path: PathBuf, column: &'static str },

    /// A source statement could not be opened or parsed.
    #[error("Failed to read source file {path}: {source}")]
    SourceRead {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A report file could not be written.
    #[error("Failed to write report {path}: {source}")]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A built-in matching pattern failed to compile.
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SiftError {
    /// True for the errors that mean there is nothing to categorize.
    pub fn is_fatal_input(&self) -> bool {
        matches!(
            self,
            SiftError::NoInputData
                | SiftError::EmptyKeywordTable { .. }
                | SiftError::KeywordFile { .. }
                | SiftError::MissingColumn { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SiftError>;
