use crate::error::MatchError;
use chrono::NaiveDate;
use core_types::{Fill, FillSide, OptionContract, TradeRecord};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};

/// The unclosed remainder of one opening fill.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenLot {
    pub contract: OptionContract,
    pub opened_on: NaiveDate,
    pub price: Decimal,
    pub remaining: u32,
    /// Cash flow still attributable to the remaining contracts (negative for a debit).
    pub remaining_cash: Decimal,
}

impl OpenLot {
    fn from_fill(fill: &Fill) -> Self {
        Self {
            contract: fill.contract.clone(),
            opened_on: fill.executed_on,
            price: fill.price,
            remaining: fill.quantity,
            remaining_cash: fill.cash_flow(),
        }
    }

    /// Removes `take` contracts from the lot, returning their share of the cash flow
    /// in cents. The last slice gets whatever is left, so the slices sum to the lot.
    fn take(&mut self, take: u32) -> Decimal {
        let share = if take >= self.remaining {
            self.remaining_cash
        } else {
            pro_rata(self.remaining_cash, take, self.remaining)
        };
        self.remaining -= take.min(self.remaining);
        self.remaining_cash -= share;
        share
    }
}

/// `part / whole` of `cash`, rounded to cents.
fn pro_rata(cash: Decimal, part: u32, whole: u32) -> Decimal {
    (cash * Decimal::from(part) / Decimal::from(whole)).round_dp(2)
}

/// Per-contract FIFO queues of open lots.
///
/// The book only tracks long option positions: `Open` fills add a lot,
/// `Close` fills consume lots oldest-first and emit one `TradeRecord` per
/// consumed slice.
#[derive(Debug, Clone, Default)]
pub struct Book {
    positions: HashMap<OptionContract, VecDeque<OpenLot>>,
}

impl Book {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a single fill. Fills must arrive in chronological order.
    pub fn apply_fill(&mut self, fill: &Fill) -> Result<Vec<TradeRecord>, MatchError> {
        match fill.side {
            FillSide::Open => {
                self.positions
                    .entry(fill.contract.clone())
                    .or_default()
                    .push_back(OpenLot::from_fill(fill));
                Ok(Vec::new())
            }
            FillSide::Close => self.close(fill),
        }
    }

    fn close(&mut self, fill: &Fill) -> Result<Vec<TradeRecord>, MatchError> {
        let available = self.open_quantity(&fill.contract);
        if fill.quantity > available {
            return Err(MatchError::UnmatchedClose {
                contract: fill.contract.to_string(),
                date: fill.executed_on,
                requested: fill.quantity,
                available,
            });
        }

        let lots = self
            .positions
            .get_mut(&fill.contract)
            .ok_or_else(|| MatchError::UnmatchedClose {
                contract: fill.contract.to_string(),
                date: fill.executed_on,
                requested: fill.quantity,
                available: 0,
            })?;

        let mut trades = Vec::new();
        let mut to_close = fill.quantity;
        let mut close_cash = fill.cash_flow();
        let mut close_remaining = fill.quantity;

        while to_close > 0 {
            let Some(lot) = lots.front_mut() else {
                break;
            };
            let take = to_close.min(lot.remaining);
            let open_share = lot.take(take);

            let close_share = if take == close_remaining {
                close_cash
            } else {
                pro_rata(close_cash, take, close_remaining)
            };
            close_cash -= close_share;
            close_remaining -= take;

            let trade = TradeRecord::new(
                &fill.contract,
                lot.opened_on,
                fill.executed_on,
                lot.price,
                fill.price,
                take,
                (open_share + close_share).round_dp(2),
            )?;
            tracing::trace!(
                contract = %fill.contract,
                contracts = take,
                pnl = %trade.pnl(),
                "Matched round trip."
            );
            trades.push(trade);

            if lot.remaining == 0 {
                lots.pop_front();
            }
            to_close -= take;
        }

        if lots.is_empty() {
            self.positions.remove(&fill.contract);
        }

        Ok(trades)
    }

    /// Contracts currently open for `contract`.
    pub fn open_quantity(&self, contract: &OptionContract) -> u32 {
        self.positions
            .get(contract)
            .map(|lots| lots.iter().map(|l| l.remaining).sum())
            .unwrap_or(0)
    }

    /// All open lots, ordered by open date then contract.
    pub fn open_lots(&self) -> Vec<OpenLot> {
        let mut lots: Vec<OpenLot> = self.positions.values().flatten().cloned().collect();
        lots.sort_by(|a, b| {
            a.opened_on
                .cmp(&b.opened_on)
                .then_with(|| a.contract.cmp(&b.contract))
        });
        lots
    }
}

/// The closed trades reconstructed from an export plus anything still open.
#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    pub trades: Vec<TradeRecord>,
    pub open_lots: Vec<OpenLot>,
}

impl MatchOutcome {
    /// Returns the closed trades, failing if any position was left open.
    pub fn into_closed(self) -> Result<Vec<TradeRecord>, MatchError> {
        if let Some(first) = self.open_lots.first() {
            return Err(MatchError::UnmatchedOpen {
                count: self.open_lots.len(),
                first: format!("{} opened {}", first.contract, first.opened_on),
            });
        }
        Ok(self.trades)
    }
}

/// Pairs opening and closing fills into closed `TradeRecord`s.
///
/// Fills are ordered by execution date with opens ahead of closes on the same
/// date; ties otherwise keep their input order, so same-day fills must be
/// supplied oldest first (see `ImportOutcome::fills`). Each contract (symbol,
/// type, strike, expiration) is matched oldest-open-first.
pub fn match_fills(fills: &[Fill]) -> Result<MatchOutcome, MatchError> {
    let mut ordered: Vec<&Fill> = fills.iter().collect();
    ordered.sort_by_key(|f| (f.executed_on, f.side));

    let mut book = Book::new();
    let mut trades = Vec::new();
    for fill in ordered {
        trades.extend(book.apply_fill(fill)?);
    }

    let open_lots = book.open_lots();
    if !open_lots.is_empty() {
        tracing::warn!(open_lots = open_lots.len(), "Positions remain open after matching.");
    }
    tracing::info!(trades = trades.len(), "Fill matching complete.");

    Ok(MatchOutcome { trades, open_lots })
}
