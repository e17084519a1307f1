//! # Brokerage Export Importer
//!
//! Reads a Robinhood-style transaction export (`Activity Date, Process Date,
//! Settle Date, Instrument, Description, Trans Code, Quantity, Price, Amount`)
//! and produces validated option `Fill`s. Only `BTO` and `STC` rows are
//! option fills; every other transaction code is ignored.
//!
//! Rows that fail validation either abort the import or are skipped with a
//! warning, depending on the configured `InvalidRowPolicy`.

pub mod description;
pub mod error;
pub mod export;

pub use error::ImportError;
pub use export::{net_cash_flow, ExportImporter, ImportOutcome};
