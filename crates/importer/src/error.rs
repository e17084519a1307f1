use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Failed to open export file '{path}': {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Export is missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("Row {row}: invalid '{field}': {reason}")]
    InvalidField {
        row: usize,
        field: &'static str,
        reason: String,
    },

    #[error("Row {row}: {source}")]
    Validation {
        row: usize,
        #[source]
        source: CoreError,
    },
}
