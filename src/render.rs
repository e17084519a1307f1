//! Turns a `JournalReport` into terminal tables, Markdown tables or JSON.

use analytics::{JournalReport, TickerStats, TradingDay};
use comfy_table::presets::{ASCII_MARKDOWN, UTF8_FULL};
use comfy_table::{Cell, CellAlignment, Table};
use configuration::OutputFormat;
use core_types::OptionType;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt::Write;

/// Which part of the report a command prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    All,
    Weekly,
    Overnight,
}

pub fn render(
    report: &JournalReport,
    format: OutputFormat,
    section: Section,
) -> anyhow::Result<String> {
    if format == OutputFormat::Json {
        return match section {
            Section::All => to_json(report),
            Section::Weekly => to_json(&WeeklyView {
                weeks: &report.weeks,
                winning_weeks: report.winning_weeks,
                daily: &report.daily,
            }),
            Section::Overnight => to_json(&report.overnight),
        };
    }

    let mut out = Renderer {
        out: String::new(),
        format,
    };
    match section {
        Section::All => {
            out.summary(report)?;
            out.weekly(report)?;
            out.weekdays(report)?;
            out.option_types(report)?;
            out.tickers("Top Tickers by P&L", &report.top_tickers)?;
            out.tickers("Worst Tickers by P&L", &report.worst_tickers)?;
            out.tickers("Put Trades by Ticker", &report.put_tickers)?;
            out.price_buckets(report)?;
            out.overnight(report)?;
            out.daily(report)?;
        }
        Section::Weekly => {
            out.weekly(report)?;
            out.daily(report)?;
        }
        Section::Overnight => out.overnight(report)?,
    }
    Ok(out.out)
}

#[derive(Serialize)]
struct WeeklyView<'a> {
    weeks: &'a [analytics::WeeklySummary],
    winning_weeks: usize,
    daily: &'a [analytics::DailyBreakdown],
}

fn to_json<T: Serialize>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

struct Renderer {
    out: String,
    format: OutputFormat,
}

impl Renderer {
    fn heading(&mut self, title: &str) -> std::fmt::Result {
        match self.format {
            OutputFormat::Markdown => writeln!(self.out, "\n## {title}\n"),
            _ => {
                let rule = "=".repeat(70);
                writeln!(self.out, "\n{rule}\n{}\n{rule}", title.to_uppercase())
            }
        }
    }

    fn table(&self, header: Vec<&str>) -> Table {
        let mut table = Table::new();
        let preset = match self.format {
            OutputFormat::Markdown => ASCII_MARKDOWN,
            _ => UTF8_FULL,
        };
        table.load_preset(preset).set_header(header);
        table
    }

    fn emit(&mut self, table: Table) -> std::fmt::Result {
        writeln!(self.out, "{table}")
    }

    fn summary(&mut self, report: &JournalReport) -> std::fmt::Result {
        self.heading("Overall Summary")?;
        let p = &report.profitability;
        let range = match (report.first_date, report.last_date) {
            (Some(first), Some(last)) => format!("{first} to {last}"),
            _ => "n/a".to_string(),
        };

        let mut table = self.table(vec!["Metric", "Value"]);
        table.add_row(vec!["Data Range".to_string(), range]);
        table.add_row(vec!["Total Trades".to_string(), report.total_trades.to_string()]);
        table.add_row(vec!["Total P&L".to_string(), money(p.total_pnl)]);
        table.add_row(vec![
            "Win Rate".to_string(),
            format!(
                "{} ({}W / {}L / {} scratch)",
                pct(p.win_rate),
                p.winning_trades,
                p.losing_trades,
                p.scratch_trades
            ),
        ]);
        table.add_row(vec!["Average Win".to_string(), money(p.average_win)]);
        table.add_row(vec!["Average Loss".to_string(), money(-p.average_loss)]);
        table.add_row(vec![
            "Profit Factor".to_string(),
            p.profit_factor
                .map(|f| f.round_dp(2).to_string())
                .unwrap_or_else(|| "n/a".to_string()),
        ]);
        table.add_row(vec![
            "Winning Weeks".to_string(),
            format!("{} of {}", report.winning_weeks, report.weeks.len()),
        ]);
        self.emit(table)
    }

    fn weekly(&mut self, report: &JournalReport) -> std::fmt::Result {
        self.heading("Weekly P&L Breakdown")?;
        let mut table = self.table(vec![
            "Week Starting",
            "Trades",
            "P&L",
            "Running",
            "Calls",
            "Puts",
            "Top Ticker",
        ]);
        for week in &report.weeks {
            table.add_row(vec![
                Cell::new(week.week_start),
                Cell::new(week.trades).set_alignment(CellAlignment::Right),
                Cell::new(money(week.pnl)).set_alignment(CellAlignment::Right),
                Cell::new(money(week.cumulative_pnl)).set_alignment(CellAlignment::Right),
                Cell::new(week.calls).set_alignment(CellAlignment::Right),
                Cell::new(week.puts).set_alignment(CellAlignment::Right),
                Cell::new(week.top_ticker.as_deref().unwrap_or("N/A")),
            ]);
        }
        self.emit(table)
    }

    fn weekdays(&mut self, report: &JournalReport) -> std::fmt::Result {
        self.heading("Day of Week")?;
        let mut table = self.table(vec!["Day", "Trades", "P&L"]);
        for (day, stats) in &report.weekdays {
            table.add_row(vec![
                Cell::new(day),
                Cell::new(stats.trades).set_alignment(CellAlignment::Right),
                Cell::new(money(stats.pnl)).set_alignment(CellAlignment::Right),
            ]);
        }
        self.emit(table)
    }

    fn option_types(&mut self, report: &JournalReport) -> std::fmt::Result {
        self.heading("Calls vs Puts")?;
        let mut table = self.table(vec!["Type", "Trades", "P&L", "Share of P&L"]);
        for (option_type, stats) in &report.by_type {
            table.add_row(vec![
                Cell::new(option_type),
                Cell::new(stats.trades).set_alignment(CellAlignment::Right),
                Cell::new(money(stats.pnl)).set_alignment(CellAlignment::Right),
                Cell::new(share(stats.pct_of_total)).set_alignment(CellAlignment::Right),
            ]);
        }
        self.emit(table)
    }

    fn tickers(&mut self, title: &str, tickers: &[TickerStats]) -> std::fmt::Result {
        self.heading(title)?;
        let mut table = self.table(vec!["Ticker", "Trades", "Win Rate", "P&L"]);
        for ticker in tickers {
            table.add_row(vec![
                Cell::new(&ticker.ticker),
                Cell::new(ticker.trades).set_alignment(CellAlignment::Right),
                Cell::new(pct(ticker.win_rate())).set_alignment(CellAlignment::Right),
                Cell::new(money(ticker.pnl)).set_alignment(CellAlignment::Right),
            ]);
        }
        self.emit(table)
    }

    fn price_buckets(&mut self, report: &JournalReport) -> std::fmt::Result {
        self.heading("Analysis by Option Price Range")?;
        let mut table = self.table(vec!["Price Range", "Trades", "P&L"]);
        for bucket in &report.price_buckets {
            table.add_row(vec![
                Cell::new(&bucket.label),
                Cell::new(bucket.trades).set_alignment(CellAlignment::Right),
                Cell::new(money(bucket.pnl)).set_alignment(CellAlignment::Right),
            ]);
        }
        self.emit(table)
    }

    fn overnight(&mut self, report: &JournalReport) -> std::fmt::Result {
        let overnight = &report.overnight;

        self.heading("Trade Duration Breakdown")?;
        let mut table = self.table(vec!["Holding", "Trades"]);
        table.add_row(vec!["Same Day".to_string(), overnight.holding.same_day.to_string()]);
        table.add_row(vec!["Overnight".to_string(), overnight.holding.overnight.to_string()]);
        table.add_row(vec![
            "Multi-Session".to_string(),
            overnight.holding.multi_session.to_string(),
        ]);
        self.emit(table)?;

        self.heading("Overnight Trades by Type")?;
        let mut table = self.table(vec!["Type", "Trades", "Win Rate", "P&L"]);
        for option_type in OptionType::ALL {
            let Some(stats) = overnight.by_type.get(&option_type) else {
                continue;
            };
            table.add_row(vec![
                Cell::new(option_type),
                Cell::new(stats.trades).set_alignment(CellAlignment::Right),
                Cell::new(pct(stats.win_rate)).set_alignment(CellAlignment::Right),
                Cell::new(money(stats.pnl)).set_alignment(CellAlignment::Right),
            ]);
        }
        let all = &overnight.profitability;
        table.add_row(vec![
            Cell::new("ALL"),
            Cell::new(all.winning_trades + all.losing_trades + all.scratch_trades)
                .set_alignment(CellAlignment::Right),
            Cell::new(pct(all.win_rate)).set_alignment(CellAlignment::Right),
            Cell::new(money(all.total_pnl)).set_alignment(CellAlignment::Right),
        ]);
        self.emit(table)?;

        self.heading("Top Overnight Winners")?;
        let mut table = self.table(vec!["Ticker", "Type", "Opened", "Entry", "Exit", "P&L", "Return"]);
        for trade in &overnight.top_trades {
            table.add_row(vec![
                Cell::new(trade.ticker()),
                Cell::new(trade.option_type()),
                Cell::new(trade.opened_on()),
                Cell::new(money(trade.entry_price())).set_alignment(CellAlignment::Right),
                Cell::new(money(trade.exit_price())).set_alignment(CellAlignment::Right),
                Cell::new(money(trade.pnl())).set_alignment(CellAlignment::Right),
                Cell::new(
                    trade
                        .return_pct()
                        .map(|r| format!("{:+}%", r.round_dp(1)))
                        .unwrap_or_else(|| "n/a".to_string()),
                )
                .set_alignment(CellAlignment::Right),
            ]);
        }
        self.emit(table)?;

        self.tickers("Overnight by Ticker", &overnight.by_ticker)
    }

    fn daily(&mut self, report: &JournalReport) -> std::fmt::Result {
        self.heading("Detailed Weekly Breakdown")?;
        let mut header = vec!["Week"];
        header.extend(TradingDay::ALL.iter().map(|d| d.short_name()));
        header.push("Weekly P&L");

        let mut table = self.table(header);
        for week in &report.daily {
            let mut row = vec![Cell::new(week.week_start)];
            row.extend(week.daily_pnl.iter().map(|pnl| {
                let text = if pnl.is_zero() {
                    "-".to_string()
                } else {
                    format!("{:+}", pnl.round())
                };
                Cell::new(text).set_alignment(CellAlignment::Right)
            }));
            row.push(Cell::new(money(week.total)).set_alignment(CellAlignment::Right));
            table.add_row(row);
        }
        self.emit(table)
    }
}

/// `$1,234.56` / `-$1,234.56`.
pub fn money(value: Decimal) -> String {
    let rounded = value.round_dp(2);
    let text = format!("{:.2}", rounded.abs());
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{sign}${grouped}.{fraction}")
}

/// Formats a `[0, 1]` fraction as a percentage with one decimal.
pub fn pct(rate: Option<Decimal>) -> String {
    share(rate.map(|r| r * Decimal::ONE_HUNDRED))
}

fn share(percent: Option<Decimal>) -> String {
    percent
        .map(|p| format!("{:.1}%", p.round_dp(1)))
        .unwrap_or_else(|| "n/a".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn formats_money_with_grouping() {
        assert_eq!(money(dec!(63561.2)), "$63,561.20");
        assert_eq!(money(dec!(-5609)), "-$5,609.00");
        assert_eq!(money(dec!(125)), "$125.00");
        assert_eq!(money(dec!(0)), "$0.00");
        assert_eq!(money(dec!(1234567.891)), "$1,234,567.89");
    }

    #[test]
    fn formats_rates() {
        assert_eq!(pct(Some(dec!(0.4329))), "43.3%");
        assert_eq!(pct(None), "n/a");
    }
}
