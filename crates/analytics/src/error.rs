use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Trade dated {0} falls on a weekend; options do not trade on weekends")]
    WeekendTrade(NaiveDate),

    #[error("Invalid price bucket edges: {0}")]
    InvalidBuckets(String),

    #[error("Entry price {0} is below the lowest price bucket edge")]
    PriceOutOfRange(Decimal),
}
