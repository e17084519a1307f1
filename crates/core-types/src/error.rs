use thiserror::Error;

/// Data-validation failures raised while constructing fills and trade records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid value for field '{field}': {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Unknown option type '{0}', expected Call or Put")]
    UnknownOptionType(String),

    #[error("Unknown transaction code '{0}', expected BTO or STC")]
    UnknownTransCode(String),
}

impl CoreError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        CoreError::Validation {
            field,
            reason: reason.into(),
        }
    }
}
