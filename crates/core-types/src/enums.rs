use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The right conveyed by an option contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    pub const ALL: [OptionType; 2] = [OptionType::Call, OptionType::Put];
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => write!(f, "CALL"),
            OptionType::Put => write!(f, "PUT"),
        }
    }
}

impl FromStr for OptionType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CALL" | "C" => Ok(OptionType::Call),
            "PUT" | "P" => Ok(OptionType::Put),
            _ => Err(CoreError::UnknownOptionType(s.to_string())),
        }
    }
}

/// Whether a fill opens a long option position or closes one.
///
/// `Open` sorts before `Close` so that fills executed on the same date are
/// matched with the opening leg first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FillSide {
    /// Buy to open (`BTO`).
    Open,
    /// Sell to close (`STC`).
    Close,
}

impl FillSide {
    /// Maps a brokerage transaction code onto a fill side.
    pub fn from_trans_code(code: &str) -> Result<Self, CoreError> {
        match code.trim().to_ascii_uppercase().as_str() {
            "BTO" => Ok(FillSide::Open),
            "STC" => Ok(FillSide::Close),
            _ => Err(CoreError::UnknownTransCode(code.to_string())),
        }
    }
}
