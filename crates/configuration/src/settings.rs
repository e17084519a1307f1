use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section is optional in `config.toml`; missing sections fall back to
/// the defaults below.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub import: ImportSettings,
    pub report: ReportSettings,
    pub logging: LoggingSettings,
}

/// What to do with an export row that fails validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidRowPolicy {
    /// Stop the import at the first bad row.
    #[default]
    Abort,
    /// Log a warning and continue with the next row.
    Skip,
}

/// Contains parameters for reading the brokerage export and pairing fills.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    pub on_invalid_row: InvalidRowPolicy,
    /// When false, any position still open at the end of the export is an error.
    pub allow_open_positions: bool,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            on_invalid_row: InvalidRowPolicy::Abort,
            allow_open_positions: false,
        }
    }
}

/// Contains parameters for the aggregated report.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Lower edges of the entry-price buckets. The last bucket is open-ended.
    pub price_buckets: Vec<Decimal>,
    /// How many tickers to list under "top performers".
    pub top_tickers: usize,
    /// How many tickers to list under "worst performers".
    pub worst_tickers: usize,
    /// How many individual overnight trades to list as best winners.
    pub top_trades: usize,
    /// Only weeks starting on or before this date appear in the daily grid.
    pub daily_breakdown_until: Option<NaiveDate>,
    pub format: OutputFormat,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            price_buckets: vec![dec!(0), dec!(1), dec!(3), dec!(6), dec!(10)],
            top_tickers: 15,
            worst_tickers: 10,
            top_trades: 10,
            daily_breakdown_until: None,
            format: OutputFormat::Table,
        }
    }
}

/// How the report is written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OutputFormat {
    #[default]
    Table,
    Markdown,
    Json,
}

/// Contains parameters for the tracing subscriber.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive, overridden by `RUST_LOG`.
    pub level: String,
    /// When set, logs are also written to a daily-rolling file in this directory.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            file_prefix: "options-journal.log".to_string(),
        }
    }
}
