use crate::enums::{FillSide, OptionType};
use crate::error::CoreError;
use chrono::{Datelike, Days, NaiveDate, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of underlying shares controlled by one listed equity option contract.
pub const CONTRACT_MULTIPLIER: Decimal = Decimal::ONE_HUNDRED;

/// Returns the first weekday strictly after `date`. Exchange holidays are not modelled.
pub fn next_session(date: NaiveDate) -> NaiveDate {
    let step = match date.weekday() {
        Weekday::Fri => 3,
        Weekday::Sat => 2,
        _ => 1,
    };
    date.checked_add_days(Days::new(step)).unwrap_or(date)
}

/// Counts the weekdays in the half-open interval `(from, to]`.
fn sessions_between(from: NaiveDate, to: NaiveDate) -> u32 {
    let mut sessions = 0;
    let mut day = from;
    while day < to {
        day = next_session(day);
        if day <= to {
            sessions += 1;
        } else {
            break;
        }
    }
    sessions
}

/// The terms identifying a single listed option series.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OptionContract {
    pub symbol: String,
    pub option_type: OptionType,
    pub strike: Decimal,
    pub expiration: NaiveDate,
}

impl OptionContract {
    pub fn new(
        symbol: impl Into<String>,
        option_type: OptionType,
        strike: Decimal,
        expiration: NaiveDate,
    ) -> Result<Self, CoreError> {
        let symbol = symbol.into().trim().to_ascii_uppercase();
        if symbol.is_empty() {
            return Err(CoreError::validation("ticker", "symbol is empty"));
        }
        if strike <= Decimal::ZERO {
            return Err(CoreError::validation(
                "strike",
                format!("strike must be positive, got {strike}"),
            ));
        }
        Ok(Self {
            symbol,
            option_type,
            strike,
            expiration,
        })
    }
}

impl fmt::Display for OptionContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} ${}",
            self.symbol, self.expiration, self.option_type, self.strike
        )
    }
}

/// A single execution reported by the brokerage export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub executed_on: NaiveDate,
    pub contract: OptionContract,
    pub side: FillSide,
    /// Per-contract premium.
    pub price: Decimal,
    pub quantity: u32,
    /// Net signed cash flow reported by the broker, fees included.
    pub amount: Option<Decimal>,
}

impl Fill {
    pub fn new(
        executed_on: NaiveDate,
        contract: OptionContract,
        side: FillSide,
        price: Decimal,
        quantity: i64,
        amount: Option<Decimal>,
    ) -> Result<Self, CoreError> {
        if price.is_sign_negative() {
            return Err(CoreError::validation(
                "price",
                format!("price must not be negative, got {price}"),
            ));
        }
        let quantity = u32::try_from(quantity)
            .ok()
            .filter(|q| *q > 0)
            .ok_or_else(|| {
                CoreError::validation(
                    "quantity",
                    format!("quantity must be a positive contract count, got {quantity}"),
                )
            })?;

        Ok(Self {
            executed_on,
            contract,
            side,
            price,
            quantity,
            amount,
        })
    }

    /// The signed cash flow of this fill: negative when buying, positive when selling.
    ///
    /// Falls back to `price * quantity * 100` when the export carried no amount.
    pub fn cash_flow(&self) -> Decimal {
        if let Some(amount) = self.amount {
            return amount;
        }
        let gross = self.price * Decimal::from(self.quantity) * CONTRACT_MULTIPLIER;
        match self.side {
            FillSide::Open => -gross,
            FillSide::Close => gross,
        }
    }
}

/// One closed round-trip options trade.
///
/// Records are immutable once built; every field is exposed read-only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeRecord {
    date: NaiveDate,
    opened_on: NaiveDate,
    ticker: String,
    option_type: OptionType,
    strike: Decimal,
    expiration: NaiveDate,
    entry_price: Decimal,
    exit_price: Decimal,
    contracts: u32,
    pnl: Decimal,
    held_overnight: bool,
}

impl TradeRecord {
    /// Builds a validated record for a position opened on `opened_on` and
    /// closed on `closed_on`. `held_overnight` is derived from the two dates.
    pub fn new(
        contract: &OptionContract,
        opened_on: NaiveDate,
        closed_on: NaiveDate,
        entry_price: Decimal,
        exit_price: Decimal,
        contracts: u32,
        pnl: Decimal,
    ) -> Result<Self, CoreError> {
        if contract.symbol.trim().is_empty() {
            return Err(CoreError::validation("ticker", "symbol is empty"));
        }
        if contracts == 0 {
            return Err(CoreError::validation("contracts", "contract count must be positive"));
        }
        if entry_price.is_sign_negative() {
            return Err(CoreError::validation(
                "entry_price",
                format!("must not be negative, got {entry_price}"),
            ));
        }
        if exit_price.is_sign_negative() {
            return Err(CoreError::validation(
                "exit_price",
                format!("must not be negative, got {exit_price}"),
            ));
        }
        if closed_on < opened_on {
            return Err(CoreError::validation(
                "date",
                format!("closed on {closed_on} before it was opened on {opened_on}"),
            ));
        }

        Ok(Self {
            date: closed_on,
            opened_on,
            ticker: contract.symbol.clone(),
            option_type: contract.option_type,
            strike: contract.strike,
            expiration: contract.expiration,
            entry_price,
            exit_price,
            contracts,
            pnl,
            held_overnight: closed_on == next_session(opened_on),
        })
    }

    /// Date the position was closed and the P&L realised.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn opened_on(&self) -> NaiveDate {
        self.opened_on
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn option_type(&self) -> OptionType {
        self.option_type
    }

    pub fn strike(&self) -> Decimal {
        self.strike
    }

    pub fn expiration(&self) -> NaiveDate {
        self.expiration
    }

    pub fn entry_price(&self) -> Decimal {
        self.entry_price
    }

    pub fn exit_price(&self) -> Decimal {
        self.exit_price
    }

    pub fn contracts(&self) -> u32 {
        self.contracts
    }

    pub fn pnl(&self) -> Decimal {
        self.pnl
    }

    pub fn held_overnight(&self) -> bool {
        self.held_overnight
    }

    pub fn is_win(&self) -> bool {
        self.pnl > Decimal::ZERO
    }

    pub fn is_loss(&self) -> bool {
        self.pnl < Decimal::ZERO
    }

    /// Trading sessions between open and close: 0 for a same-day trade, 1 for overnight.
    pub fn sessions_held(&self) -> u32 {
        sessions_between(self.opened_on, self.date)
    }

    /// Percentage change from entry to exit premium, `None` for a zero entry price.
    pub fn return_pct(&self) -> Option<Decimal> {
        if self.entry_price.is_zero() {
            return None;
        }
        Some((self.exit_price / self.entry_price - Decimal::ONE) * Decimal::ONE_HUNDRED)
    }
}
