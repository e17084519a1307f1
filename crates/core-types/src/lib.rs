pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{FillSide, OptionType};
pub use error::CoreError;
pub use structs::{next_session, Fill, OptionContract, TradeRecord, CONTRACT_MULTIPLIER};
