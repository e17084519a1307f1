//! Pure aggregation passes over closed trades.
//!
//! Every function here is read-only over its input and deterministic: the
//! same records always yield the same output, whatever their order.

use crate::buckets::PriceBuckets;
use crate::calendar::{week_start, TradingDay};
use crate::error::AnalyticsError;
use crate::report::{
    ratio, DailyBreakdown, GroupStats, HoldingBreakdown, OvernightStats, PriceBucketStats,
    Profitability, TickerStats, TypeStats, WeeklySummary,
};
use chrono::NaiveDate;
use core_types::{OptionType, TradeRecord};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

/// Sum of `pnl` across all records. Zero for an empty slice.
pub fn total_pnl(records: &[TradeRecord]) -> Decimal {
    records.iter().map(TradeRecord::pnl).sum()
}

/// Fraction of records with a strictly positive P&L.
///
/// Scratch trades (`pnl == 0`) are not wins but stay in the denominator.
/// Returns `None` for an empty slice, where the rate is undefined.
pub fn win_rate(records: &[TradeRecord]) -> Option<Decimal> {
    let wins = records.iter().filter(|r| r.is_win()).count();
    ratio(wins, records.len())
}

/// Partitions records by Monday-aligned week, oldest week first, with a
/// running cumulative P&L. Weeks without trades are not emitted.
pub fn group_by_week(records: &[TradeRecord]) -> Vec<WeeklySummary> {
    let mut weeks: BTreeMap<NaiveDate, Vec<&TradeRecord>> = BTreeMap::new();
    for record in records {
        weeks.entry(week_start(record.date())).or_default().push(record);
    }

    let mut cumulative = Decimal::ZERO;
    weeks
        .into_iter()
        .map(|(week, trades)| {
            let mut summary = WeeklySummary {
                week_start: week,
                trades: trades.len(),
                pnl: Decimal::ZERO,
                cumulative_pnl: Decimal::ZERO,
                calls: 0,
                puts: 0,
                call_pnl: Decimal::ZERO,
                put_pnl: Decimal::ZERO,
                top_ticker: None,
            };
            let mut tickers: BTreeMap<&str, Decimal> = BTreeMap::new();

            for trade in &trades {
                summary.pnl += trade.pnl();
                match trade.option_type() {
                    OptionType::Call => {
                        summary.calls += 1;
                        summary.call_pnl += trade.pnl();
                    }
                    OptionType::Put => {
                        summary.puts += 1;
                        summary.put_pnl += trade.pnl();
                    }
                }
                *tickers.entry(trade.ticker()).or_default() += trade.pnl();
            }

            // BTreeMap iteration makes the alphabetically first ticker win ties.
            summary.top_ticker = tickers
                .into_iter()
                .fold(None::<(&str, Decimal)>, |best, (ticker, pnl)| match best {
                    Some((_, best_pnl)) if best_pnl >= pnl => best,
                    _ => Some((ticker, pnl)),
                })
                .map(|(ticker, _)| ticker.to_string());

            cumulative += summary.pnl;
            summary.cumulative_pnl = cumulative;
            summary
        })
        .collect()
}

/// Number of weeks that closed with a positive P&L.
pub fn winning_weeks(weeks: &[WeeklySummary]) -> usize {
    weeks.iter().filter(|w| w.pnl > Decimal::ZERO).count()
}

/// Count and P&L per trading day. All five days are always present.
///
/// A record dated on a weekend is a data-quality error.
pub fn group_by_weekday(
    records: &[TradeRecord],
) -> Result<BTreeMap<TradingDay, GroupStats>, AnalyticsError> {
    let mut days: BTreeMap<TradingDay, GroupStats> = TradingDay::ALL
        .into_iter()
        .map(|day| (day, GroupStats::default()))
        .collect();

    for record in records {
        let day = TradingDay::of(record.date())?;
        days.entry(day).or_default().add(record);
    }
    Ok(days)
}

/// Count, wins and P&L per ticker, ranked by P&L descending.
/// Equal P&L is ordered by ticker so the ranking is stable.
pub fn group_by_ticker(records: &[TradeRecord]) -> Vec<TickerStats> {
    let mut tickers: HashMap<&str, TickerStats> = HashMap::new();
    for record in records {
        let stats = tickers
            .entry(record.ticker())
            .or_insert_with(|| TickerStats {
                ticker: record.ticker().to_string(),
                trades: 0,
                wins: 0,
                pnl: Decimal::ZERO,
            });
        stats.trades += 1;
        stats.pnl += record.pnl();
        if record.is_win() {
            stats.wins += 1;
        }
    }

    let mut ranked: Vec<TickerStats> = tickers.into_values().collect();
    ranked.sort_by(|a, b| b.pnl.cmp(&a.pnl).then_with(|| a.ticker.cmp(&b.ticker)));
    ranked
}

/// The `n` best tickers by P&L, best first.
pub fn top_performers(ranked: &[TickerStats], n: usize) -> Vec<TickerStats> {
    ranked.iter().take(n).cloned().collect()
}

/// The `n` worst tickers by P&L, worst first.
pub fn worst_performers(ranked: &[TickerStats], n: usize) -> Vec<TickerStats> {
    ranked.iter().rev().take(n).cloned().collect()
}

/// Per-ticker stats over one option type only, ranked like `group_by_ticker`.
pub fn tickers_for_type(records: &[TradeRecord], option_type: OptionType) -> Vec<TickerStats> {
    let matching: Vec<TradeRecord> = records
        .iter()
        .filter(|r| r.option_type() == option_type)
        .cloned()
        .collect();
    group_by_ticker(&matching)
}

/// Count, P&L and share of total P&L for calls and puts.
///
/// Both option types are always present. Shares are `None` when the total
/// P&L is zero.
pub fn group_by_option_type(records: &[TradeRecord]) -> BTreeMap<OptionType, TypeStats> {
    let mut types: BTreeMap<OptionType, TypeStats> = OptionType::ALL
        .into_iter()
        .map(|t| (t, TypeStats::default()))
        .collect();

    for record in records {
        let stats = types.entry(record.option_type()).or_default();
        stats.trades += 1;
        stats.pnl += record.pnl();
    }

    let total = total_pnl(records);
    if !total.is_zero() {
        for stats in types.values_mut() {
            stats.pct_of_total = Some(stats.pnl / total * Decimal::ONE_HUNDRED);
        }
    }
    types
}

/// Count and P&L per entry-price bucket, in bucket order. Empty buckets are kept.
pub fn bucket_by_price(
    records: &[TradeRecord],
    buckets: &PriceBuckets,
) -> Result<Vec<PriceBucketStats>, AnalyticsError> {
    let mut stats: Vec<PriceBucketStats> = (0..buckets.len())
        .map(|i| {
            let (lower, upper) = buckets.bounds(i);
            PriceBucketStats {
                label: buckets.label(i),
                lower,
                upper,
                trades: 0,
                pnl: Decimal::ZERO,
            }
        })
        .collect();

    for record in records {
        let index = buckets
            .index_of(record.entry_price())
            .ok_or(AnalyticsError::PriceOutOfRange(record.entry_price()))?;
        stats[index].trades += 1;
        stats[index].pnl += record.pnl();
    }
    Ok(stats)
}

/// Win rate, P&L and count per option type over overnight holds only.
pub fn overnight_metrics(records: &[TradeRecord]) -> BTreeMap<OptionType, OvernightStats> {
    OptionType::ALL
        .into_iter()
        .map(|option_type| {
            let held: Vec<TradeRecord> = records
                .iter()
                .filter(|r| r.held_overnight() && r.option_type() == option_type)
                .cloned()
                .collect();
            let stats = OvernightStats {
                trades: held.len(),
                wins: held.iter().filter(|r| r.is_win()).count(),
                pnl: total_pnl(&held),
                win_rate: win_rate(&held),
            };
            (option_type, stats)
        })
        .collect()
}

/// Records held exactly one session.
pub fn overnight_trades(records: &[TradeRecord]) -> Vec<TradeRecord> {
    records.iter().filter(|r| r.held_overnight()).cloned().collect()
}

/// Gross profit/loss, averages and the profit factor.
pub fn profitability(records: &[TradeRecord]) -> Profitability {
    let mut report = Profitability::default();

    for record in records {
        let pnl = record.pnl();
        report.total_pnl += pnl;
        if record.is_win() {
            report.gross_profit += pnl;
            report.winning_trades += 1;
        } else if record.is_loss() {
            report.gross_loss += pnl.abs();
            report.losing_trades += 1;
        } else {
            report.scratch_trades += 1;
        }
    }

    // --- Ratios ---
    if report.gross_loss > Decimal::ZERO {
        report.profit_factor = Some(report.gross_profit / report.gross_loss);
    }

    report.win_rate = ratio(report.winning_trades, records.len());

    if report.winning_trades > 0 {
        report.average_win = report.gross_profit / Decimal::from(report.winning_trades);
    }

    if report.losing_trades > 0 {
        report.average_loss = report.gross_loss / Decimal::from(report.losing_trades);
    }

    report
}

/// Counts trades closed the same day, on the next session, or later.
pub fn holding_breakdown(records: &[TradeRecord]) -> HoldingBreakdown {
    let mut breakdown = HoldingBreakdown::default();
    for record in records {
        match record.sessions_held() {
            0 => breakdown.same_day += 1,
            1 => breakdown.overnight += 1,
            _ => breakdown.multi_session += 1,
        }
    }
    breakdown
}

/// The `n` most profitable trades, best first. Ties keep input order.
pub fn top_trades(records: &[TradeRecord], n: usize) -> Vec<TradeRecord> {
    let mut sorted: Vec<&TradeRecord> = records.iter().collect();
    sorted.sort_by(|a, b| b.pnl().cmp(&a.pnl()));
    sorted.into_iter().take(n).cloned().collect()
}

/// Per-ticker stats over overnight holds only, ranked by P&L descending.
pub fn overnight_by_ticker(records: &[TradeRecord]) -> Vec<TickerStats> {
    group_by_ticker(&overnight_trades(records))
}

/// Mon-Fri P&L grid per week, oldest first, limited to weeks starting on or
/// before `until` when given.
pub fn daily_breakdown(
    records: &[TradeRecord],
    until: Option<NaiveDate>,
) -> Result<Vec<DailyBreakdown>, AnalyticsError> {
    let mut weeks: BTreeMap<NaiveDate, [Decimal; 5]> = BTreeMap::new();
    for record in records {
        let week = week_start(record.date());
        if until.is_some_and(|cutoff| week > cutoff) {
            continue;
        }
        let day = TradingDay::of(record.date())?;
        weeks.entry(week).or_insert([Decimal::ZERO; 5])[day.index()] += record.pnl();
    }

    Ok(weeks
        .into_iter()
        .map(|(week_start, daily_pnl)| DailyBreakdown {
            week_start,
            total: daily_pnl.iter().sum(),
            daily_pnl,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::OptionContract;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    fn trade(
        ticker: &str,
        option_type: OptionType,
        opened: NaiveDate,
        closed: NaiveDate,
        entry: Decimal,
        pnl: Decimal,
    ) -> TradeRecord {
        let contract = OptionContract::new(ticker, option_type, dec!(100), date(12, 19)).unwrap();
        TradeRecord::new(&contract, opened, closed, entry, entry, 1, pnl).unwrap()
    }

    fn day_trade(ticker: &str, option_type: OptionType, on: NaiveDate, pnl: Decimal) -> TradeRecord {
        trade(ticker, option_type, on, on, dec!(2), pnl)
    }

    #[test]
    fn empty_input_is_neutral() {
        assert_eq!(total_pnl(&[]), Decimal::ZERO);
        assert_eq!(win_rate(&[]), None);
        assert!(group_by_week(&[]).is_empty());
        assert!(group_by_ticker(&[]).is_empty());
        assert_eq!(profitability(&[]), Profitability::default());

        let days = group_by_weekday(&[]).unwrap();
        assert_eq!(days.len(), 5);
        assert!(days.values().all(|d| d.trades == 0));
    }

    #[test]
    fn scratch_trade_counts_in_denominator_only() {
        let records = vec![
            day_trade("AMD", OptionType::Call, date(10, 6), dec!(100)),
            day_trade("AMD", OptionType::Call, date(10, 6), dec!(0)),
            day_trade("AMD", OptionType::Call, date(10, 6), dec!(-50)),
            day_trade("AMD", OptionType::Call, date(10, 6), dec!(25)),
        ];
        assert_eq!(win_rate(&records), Some(dec!(0.5)));

        let p = profitability(&records);
        assert_eq!(p.winning_trades, 2);
        assert_eq!(p.losing_trades, 1);
        assert_eq!(p.scratch_trades, 1);
        assert_eq!(p.gross_profit, dec!(125));
        assert_eq!(p.gross_loss, dec!(50));
        assert_eq!(p.profit_factor, Some(dec!(2.5)));
        assert_eq!(p.average_win, dec!(62.5));
        assert_eq!(p.average_loss, dec!(50));
    }

    #[test]
    fn weeks_are_chronological_with_running_total() {
        let records = vec![
            day_trade("NVDA", OptionType::Put, date(10, 15), dec!(-30)),
            day_trade("AMD", OptionType::Call, date(10, 6), dec!(100)),
            day_trade("TSLA", OptionType::Call, date(10, 10), dec!(40)),
            day_trade("AMD", OptionType::Put, date(10, 14), dec!(10)),
        ];

        let weeks = group_by_week(&records);
        assert_eq!(weeks.len(), 2);

        assert_eq!(weeks[0].week_start, date(10, 6));
        assert_eq!(weeks[0].trades, 2);
        assert_eq!(weeks[0].pnl, dec!(140));
        assert_eq!(weeks[0].cumulative_pnl, dec!(140));
        assert_eq!(weeks[0].calls, 2);
        assert_eq!(weeks[0].top_ticker.as_deref(), Some("AMD"));

        assert_eq!(weeks[1].week_start, date(10, 13));
        assert_eq!(weeks[1].pnl, dec!(-20));
        assert_eq!(weeks[1].cumulative_pnl, dec!(120));
        assert_eq!(weeks[1].puts, 2);
        assert_eq!(weeks[1].put_pnl, dec!(-20));
        assert_eq!(weeks[1].top_ticker.as_deref(), Some("AMD"));

        assert_eq!(winning_weeks(&weeks), 1);
    }

    #[test]
    fn weekday_grouping_rejects_weekend_dates() {
        let records = vec![
            day_trade("AMD", OptionType::Call, date(10, 6), dec!(100)),
            day_trade("AMD", OptionType::Call, date(10, 10), dec!(-40)),
        ];
        let days = group_by_weekday(&records).unwrap();
        assert_eq!(days[&TradingDay::Monday], GroupStats { trades: 1, pnl: dec!(100) });
        assert_eq!(days[&TradingDay::Friday], GroupStats { trades: 1, pnl: dec!(-40) });

        let saturday = vec![day_trade("AMD", OptionType::Call, date(10, 11), dec!(1))];
        assert_eq!(
            group_by_weekday(&saturday),
            Err(AnalyticsError::WeekendTrade(date(10, 11)))
        );
    }

    #[test]
    fn tickers_rank_best_and_worst() {
        let records = vec![
            day_trade("AMD", OptionType::Call, date(10, 6), dec!(500)),
            day_trade("SPY", OptionType::Put, date(10, 6), dec!(-200)),
            day_trade("NVDA", OptionType::Call, date(10, 7), dec!(50)),
            day_trade("AMD", OptionType::Call, date(10, 8), dec!(-100)),
            day_trade("QQQ", OptionType::Put, date(10, 8), dec!(-300)),
        ];
        let ranked = group_by_ticker(&records);
        let order: Vec<&str> = ranked.iter().map(|t| t.ticker.as_str()).collect();
        assert_eq!(order, vec!["AMD", "NVDA", "SPY", "QQQ"]);
        assert_eq!(ranked[0].trades, 2);
        assert_eq!(ranked[0].win_rate(), Some(dec!(0.5)));

        let worst: Vec<String> = worst_performers(&ranked, 2).into_iter().map(|t| t.ticker).collect();
        assert_eq!(worst, vec!["QQQ", "SPY"]);
        assert_eq!(top_performers(&ranked, 1)[0].ticker, "AMD");
    }

    #[test]
    fn put_tickers_ignore_calls() {
        let records = vec![
            day_trade("SPY", OptionType::Put, date(10, 6), dec!(120)),
            day_trade("SPY", OptionType::Call, date(10, 6), dec!(900)),
            day_trade("QQQ", OptionType::Put, date(10, 7), dec!(-40)),
            day_trade("SPY", OptionType::Put, date(10, 8), dec!(-20)),
            day_trade("AMD", OptionType::Call, date(10, 8), dec!(300)),
        ];
        let puts = tickers_for_type(&records, OptionType::Put);
        let summary: Vec<(&str, usize, Decimal)> = puts
            .iter()
            .map(|t| (t.ticker.as_str(), t.trades, t.pnl))
            .collect();
        assert_eq!(summary, vec![("SPY", 2, dec!(100)), ("QQQ", 1, dec!(-40))]);
    }

    #[test]
    fn option_type_shares() {
        let records = vec![
            day_trade("AMD", OptionType::Call, date(10, 6), dec!(300)),
            day_trade("SPY", OptionType::Put, date(10, 6), dec!(100)),
        ];
        let types = group_by_option_type(&records);
        assert_eq!(types[&OptionType::Call].pct_of_total, Some(dec!(75)));
        assert_eq!(types[&OptionType::Put].pct_of_total, Some(dec!(25)));

        let flat = vec![
            day_trade("AMD", OptionType::Call, date(10, 6), dec!(100)),
            day_trade("SPY", OptionType::Put, date(10, 6), dec!(-100)),
        ];
        let types = group_by_option_type(&flat);
        assert_eq!(types[&OptionType::Call].pct_of_total, None);
        assert_eq!(types[&OptionType::Put].trades, 1);
    }

    #[test]
    fn price_buckets_keep_empty_ranges() {
        let buckets = PriceBuckets::new(vec![dec!(0), dec!(1), dec!(3)]).unwrap();
        let records = vec![
            trade("AMD", OptionType::Call, date(10, 6), date(10, 6), dec!(0.75), dec!(10)),
            trade("AMD", OptionType::Call, date(10, 6), date(10, 6), dec!(0.99), dec!(-4)),
            trade("AMD", OptionType::Call, date(10, 6), date(10, 6), dec!(5.00), dec!(20)),
        ];
        let stats = bucket_by_price(&records, &buckets).unwrap();
        let summary: Vec<(&str, usize, Decimal)> = stats
            .iter()
            .map(|s| (s.label.as_str(), s.trades, s.pnl))
            .collect();
        assert_eq!(
            summary,
            vec![("$0-1", 2, dec!(6)), ("$1-3", 0, dec!(0)), ("$3+", 1, dec!(20))]
        );
    }

    #[test]
    fn price_below_first_edge_is_an_error() {
        let buckets = PriceBuckets::new(vec![dec!(1), dec!(3)]).unwrap();
        let records = vec![trade("AMD", OptionType::Call, date(10, 6), date(10, 6), dec!(0.5), dec!(1))];
        assert_eq!(
            bucket_by_price(&records, &buckets),
            Err(AnalyticsError::PriceOutOfRange(dec!(0.5)))
        );
    }

    #[test]
    fn overnight_metrics_filter_and_split_by_type() {
        let records = vec![
            trade("AMD", OptionType::Call, date(10, 6), date(10, 7), dec!(1), dec!(100)),
            trade("AMD", OptionType::Call, date(10, 6), date(10, 7), dec!(1), dec!(-40)),
            trade("SPY", OptionType::Put, date(10, 10), date(10, 13), dec!(1), dec!(60)),
            day_trade("SPY", OptionType::Put, date(10, 8), dec!(-500)),
            trade("SPY", OptionType::Put, date(10, 6), date(10, 8), dec!(1), dec!(-70)),
        ];

        let stats = overnight_metrics(&records);
        assert_eq!(
            stats[&OptionType::Call],
            OvernightStats { trades: 2, wins: 1, pnl: dec!(60), win_rate: Some(dec!(0.5)) }
        );
        assert_eq!(
            stats[&OptionType::Put],
            OvernightStats { trades: 1, wins: 1, pnl: dec!(60), win_rate: Some(dec!(1)) }
        );

        assert_eq!(
            holding_breakdown(&records),
            HoldingBreakdown { same_day: 1, overnight: 3, multi_session: 1 }
        );

        let by_ticker = overnight_by_ticker(&records);
        assert_eq!(by_ticker.len(), 2);
        assert_eq!(by_ticker[0].ticker, "AMD");
        assert_eq!(by_ticker[0].pnl, dec!(60));

        let best = top_trades(&overnight_trades(&records), 1);
        assert_eq!(best[0].pnl(), dec!(100));
    }

    #[test]
    fn overnight_without_trades_has_undefined_rate() {
        let records = vec![day_trade("AMD", OptionType::Call, date(10, 6), dec!(1))];
        let stats = overnight_metrics(&records);
        assert_eq!(stats[&OptionType::Call].trades, 0);
        assert_eq!(stats[&OptionType::Call].win_rate, None);
    }

    #[test]
    fn daily_grid_respects_cutoff() {
        let records = vec![
            day_trade("AMD", OptionType::Call, date(10, 6), dec!(100)),
            day_trade("AMD", OptionType::Call, date(10, 8), dec!(-30)),
            day_trade("AMD", OptionType::Call, date(10, 8), dec!(5)),
            day_trade("AMD", OptionType::Call, date(10, 14), dec!(70)),
        ];

        let all = daily_breakdown(&records, None).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(
            all[0].daily_pnl,
            [dec!(100), dec!(0), dec!(-25), dec!(0), dec!(0)]
        );
        assert_eq!(all[0].total, dec!(75));

        let cut = daily_breakdown(&records, Some(date(10, 8))).unwrap();
        assert_eq!(cut.len(), 1);
        assert_eq!(cut[0].week_start, date(10, 6));
    }
}
