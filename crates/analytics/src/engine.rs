use crate::buckets::PriceBuckets;
use crate::error::AnalyticsError;
use crate::metrics;
use crate::report::{JournalReport, OvernightReport};
use configuration::ReportSettings;
use core_types::{OptionType, TradeRecord};

/// A stateless calculator for deriving journal metrics from closed trades.
#[derive(Debug, Clone)]
pub struct AnalyticsEngine {
    settings: ReportSettings,
    buckets: PriceBuckets,
}

impl AnalyticsEngine {
    /// Builds an engine, validating the configured price bucket edges.
    pub fn new(settings: ReportSettings) -> Result<Self, AnalyticsError> {
        let buckets = PriceBuckets::new(settings.price_buckets.clone())?;
        Ok(Self { settings, buckets })
    }

    pub fn settings(&self) -> &ReportSettings {
        &self.settings
    }

    /// The main entry point for calculating journal metrics.
    ///
    /// # Arguments
    ///
    /// * `records` - All closed trades, in any order.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `JournalReport` or an `AnalyticsError` when a
    /// record cannot be classified (weekend date, price below every bucket).
    pub fn build_report(&self, records: &[TradeRecord]) -> Result<JournalReport, AnalyticsError> {
        if records.is_empty() {
            // Groupings stay neutral; rates come back as `None`.
            tracing::warn!("No closed trades supplied; the report will be empty.");
        }

        let weeks = metrics::group_by_week(records);
        let ranked = metrics::group_by_ticker(records);
        let overnight = metrics::overnight_trades(records);

        let report = JournalReport {
            first_date: records.iter().map(TradeRecord::date).min(),
            last_date: records.iter().map(TradeRecord::date).max(),
            total_trades: records.len(),
            profitability: metrics::profitability(records),
            winning_weeks: metrics::winning_weeks(&weeks),
            weekdays: metrics::group_by_weekday(records)?,
            by_type: metrics::group_by_option_type(records),
            top_tickers: metrics::top_performers(&ranked, self.settings.top_tickers),
            worst_tickers: metrics::worst_performers(&ranked, self.settings.worst_tickers),
            put_tickers: metrics::tickers_for_type(records, OptionType::Put),
            price_buckets: metrics::bucket_by_price(records, &self.buckets)?,
            overnight: OvernightReport {
                holding: metrics::holding_breakdown(records),
                profitability: metrics::profitability(&overnight),
                by_type: metrics::overnight_metrics(records),
                by_ticker: metrics::overnight_by_ticker(records),
                top_trades: metrics::top_trades(&overnight, self.settings.top_trades),
            },
            daily: metrics::daily_breakdown(records, self.settings.daily_breakdown_until)?,
            weeks,
        };

        tracing::info!(
            trades = report.total_trades,
            weeks = report.weeks.len(),
            total_pnl = %report.profitability.total_pnl,
            "Journal report calculated."
        );
        Ok(report)
    }
}
