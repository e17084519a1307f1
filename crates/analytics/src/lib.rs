//! # Journal Analytics Engine
//!
//! This crate provides the descriptive statistics of the options journal: totals,
//! win rates, and groupings by week, weekday, ticker, option type, entry-price
//! bucket and overnight holds.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of files or
//!   brokers. It depends only on `core-types` and `configuration` (Layer 0).
//! - **Stateless Calculation:** Every metric in `metrics` is a pure function over a
//!   slice of `TradeRecord`s. The `AnalyticsEngine` composes them into a
//!   `JournalReport`.
//!
//! ## Conventions
//!
//! - A trade with `pnl == 0` is a scratch: neither a win nor a loss, but it still
//!   counts toward trade totals and the win-rate denominator.
//! - Win rates are fractions in `[0, 1]`; for an empty record set they are `None`.
//! - Weeks start on Monday. Weeks without trades are omitted.
//! - Price buckets are inclusive-lower, exclusive-upper.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: Builds the full `JournalReport` from configured settings.
//! - `metrics`: The individual aggregation passes.
//! - `AnalyticsError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod buckets;
pub mod calendar;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use buckets::PriceBuckets;
pub use calendar::{week_start, TradingDay};
pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use metrics::{
    bucket_by_price, group_by_option_type, group_by_ticker, group_by_week, group_by_weekday,
    overnight_metrics, tickers_for_type, total_pnl, win_rate,
};
pub use report::{
    DailyBreakdown, GroupStats, HoldingBreakdown, JournalReport, OvernightReport,
    OvernightStats, PriceBucketStats, Profitability, TickerStats, TypeStats, WeeklySummary,
};
