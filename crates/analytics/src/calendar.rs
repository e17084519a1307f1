use crate::error::AnalyticsError;
use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Returns the Monday of the calendar week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}

/// A weekday on which listed options trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TradingDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl TradingDay {
    pub const ALL: [TradingDay; 5] = [
        TradingDay::Monday,
        TradingDay::Tuesday,
        TradingDay::Wednesday,
        TradingDay::Thursday,
        TradingDay::Friday,
    ];

    /// Classifies a trade date, rejecting Saturdays and Sundays.
    pub fn of(date: NaiveDate) -> Result<Self, AnalyticsError> {
        match date.weekday() {
            Weekday::Mon => Ok(TradingDay::Monday),
            Weekday::Tue => Ok(TradingDay::Tuesday),
            Weekday::Wed => Ok(TradingDay::Wednesday),
            Weekday::Thu => Ok(TradingDay::Thursday),
            Weekday::Fri => Ok(TradingDay::Friday),
            Weekday::Sat | Weekday::Sun => Err(AnalyticsError::WeekendTrade(date)),
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn short_name(self) -> &'static str {
        match self {
            TradingDay::Monday => "Mon",
            TradingDay::Tuesday => "Tue",
            TradingDay::Wednesday => "Wed",
            TradingDay::Thursday => "Thu",
            TradingDay::Friday => "Fri",
        }
    }
}

impl fmt::Display for TradingDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
