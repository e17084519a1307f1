use crate::calendar::TradingDay;
use chrono::NaiveDate;
use core_types::{OptionType, TradeRecord};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Trade count and summed P&L for one group of records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GroupStats {
    pub trades: usize,
    pub pnl: Decimal,
}

impl GroupStats {
    pub fn add(&mut self, record: &TradeRecord) {
        self.trades += 1;
        self.pnl += record.pnl();
    }
}

/// One Monday-aligned calendar week of closed trades.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklySummary {
    pub week_start: NaiveDate,
    pub trades: usize,
    pub pnl: Decimal,
    /// P&L accumulated from the first week up to and including this one.
    pub cumulative_pnl: Decimal,
    pub calls: usize,
    pub puts: usize,
    pub call_pnl: Decimal,
    pub put_pnl: Decimal,
    /// Ticker with the highest summed P&L this week.
    pub top_ticker: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickerStats {
    pub ticker: String,
    pub trades: usize,
    pub wins: usize,
    pub pnl: Decimal,
}

impl TickerStats {
    pub fn win_rate(&self) -> Option<Decimal> {
        ratio(self.wins, self.trades)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TypeStats {
    pub trades: usize,
    pub pnl: Decimal,
    /// Share of the total P&L, in percent. `None` when the total is zero.
    pub pct_of_total: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceBucketStats {
    pub label: String,
    pub lower: Decimal,
    pub upper: Option<Decimal>,
    pub trades: usize,
    pub pnl: Decimal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OvernightStats {
    pub trades: usize,
    pub wins: usize,
    pub pnl: Decimal,
    /// Fraction of overnight trades with positive P&L. `None` without trades.
    pub win_rate: Option<Decimal>,
}

/// Win/loss decomposition of a record set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Profitability {
    pub total_pnl: Decimal,
    pub gross_profit: Decimal,
    pub gross_loss: Decimal,
    pub profit_factor: Option<Decimal>, // None when there are no losses
    pub winning_trades: usize,
    pub losing_trades: usize,
    /// Trades closed at exactly zero P&L.
    pub scratch_trades: usize,
    pub win_rate: Option<Decimal>, // None for an empty record set
    pub average_win: Decimal,
    pub average_loss: Decimal,
}

/// How long positions were held, in trading sessions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HoldingBreakdown {
    pub same_day: usize,
    pub overnight: usize,
    pub multi_session: usize,
}

/// Mon-Fri P&L grid for one week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyBreakdown {
    pub week_start: NaiveDate,
    pub daily_pnl: [Decimal; 5],
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OvernightReport {
    pub holding: HoldingBreakdown,
    pub profitability: Profitability,
    pub by_type: BTreeMap<OptionType, OvernightStats>,
    pub by_ticker: Vec<TickerStats>,
    pub top_trades: Vec<TradeRecord>,
}

/// The complete journal analysis, ready to be rendered or serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JournalReport {
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub total_trades: usize,
    pub profitability: Profitability,
    pub winning_weeks: usize,
    pub weeks: Vec<WeeklySummary>,
    pub weekdays: BTreeMap<TradingDay, GroupStats>,
    pub by_type: BTreeMap<OptionType, TypeStats>,
    pub top_tickers: Vec<TickerStats>,
    pub worst_tickers: Vec<TickerStats>,
    /// Put trades only, ranked by P&L.
    pub put_tickers: Vec<TickerStats>,
    pub price_buckets: Vec<PriceBucketStats>,
    pub overnight: OvernightReport,
    pub daily: Vec<DailyBreakdown>,
}

/// `numerator / denominator`, or `None` when the denominator is zero.
pub(crate) fn ratio(numerator: usize, denominator: usize) -> Option<Decimal> {
    if denominator == 0 {
        return None;
    }
    Some(Decimal::from(numerator) / Decimal::from(denominator))
}
