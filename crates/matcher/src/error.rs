use chrono::NaiveDate;
use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MatchError {
    #[error("Closing fill on {date} for {contract} has no matching open. Requested: {requested}, Available: {available}")]
    UnmatchedClose {
        contract: String,
        date: NaiveDate,
        requested: u32,
        available: u32,
    },

    #[error("{count} opening lot(s) were never closed, first: {first}")]
    UnmatchedOpen { count: usize, first: String },

    #[error("Matched trade failed validation: {0}")]
    Validation(#[from] CoreError),
}
