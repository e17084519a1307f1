//! # Fill Matcher
//!
//! Reconstructs closed round-trip trades from raw brokerage fills.
//!
//! ## Matching Policy
//!
//! - Fills are grouped by contract: symbol, option type, strike and expiration.
//! - Within a contract, closing fills consume open lots oldest-first (FIFO).
//!   A lot that is only partially closed is split; each consumed slice becomes
//!   its own `TradeRecord` with a pro-rated share of the reported cash flows.
//! - A close with more contracts than are open is an error, never a silent drop.
//! - Lots still open after the last fill are returned in `MatchOutcome::open_lots`.

pub mod book;
pub mod error;

pub use book::{match_fills, Book, MatchOutcome, OpenLot};
pub use error::MatchError;
