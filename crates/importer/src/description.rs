//! Field-level parsers for the brokerage export: option descriptions, dates,
//! quantities and dollar amounts.

use chrono::NaiveDate;
use core_types::OptionType;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::LazyLock;

/// `TICKER MM/DD/YYYY Call|Put $STRIKE`, e.g. `AMD 10/17/2025 Call $170.00`.
static OPTION_DESCRIPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([A-Z0-9.]+)\s+(\d{1,2}/\d{1,2}/\d{4})\s+(Call|Put)\s+\$?([\d,]+(?:\.\d+)?)")
        .expect("option description pattern is valid")
});

const EXPORT_DATE_FORMAT: &str = "%m/%d/%Y";

/// The contract terms embedded in an option description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDescription {
    pub ticker: String,
    pub expiration: NaiveDate,
    pub option_type: OptionType,
    pub strike: Decimal,
}

/// Collapses runs of whitespace (including embedded newlines) into single spaces.
pub fn normalize_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parses an option description. Returns `None` when the text does not
/// describe an option contract (stock trades, dividends, fees...).
pub fn parse_option_description(raw: &str) -> Option<OptionDescription> {
    let text = normalize_whitespace(raw);
    let caps = OPTION_DESCRIPTION.captures(&text)?;

    let expiration = parse_date(&caps[2])?;
    let option_type = OptionType::from_str(&caps[3]).ok()?;
    let strike = Decimal::from_str(&caps[4].replace(',', "")).ok()?;

    Some(OptionDescription {
        ticker: caps[1].to_ascii_uppercase(),
        expiration,
        option_type,
        strike,
    })
}

/// Parses an export date in `MM/DD/YYYY` form.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), EXPORT_DATE_FORMAT).ok()
}

/// Parses a dollar amount such as `$1,234.50`, `-$12.00` or `($500.00)`.
///
/// Parentheses denote a negative amount. An empty field yields `Ok(None)`.
pub fn parse_amount(raw: &str) -> Result<Option<Decimal>, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let negative = (trimmed.starts_with('(') && trimmed.ends_with(')')) || trimmed.starts_with('-');
    let digits: String = trimmed
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '(' | ')' | '-' | ' '))
        .collect();

    let value = Decimal::from_str(&digits).map_err(|e| format!("'{trimmed}' is not an amount: {e}"))?;
    Ok(Some(if negative { -value } else { value }))
}

/// Parses a contract quantity. Accepts a trailing `S` short marker as a negative count.
pub fn parse_quantity(raw: &str) -> Result<i64, String> {
    let trimmed = raw.trim();
    if let Some(short) = trimmed.strip_suffix(['S', 's']) {
        return short
            .trim()
            .parse::<i64>()
            .map(|q| -q)
            .map_err(|e| format!("'{trimmed}' is not a quantity: {e}"));
    }
    trimmed
        .parse::<i64>()
        .map_err(|e| format!("'{trimmed}' is not a quantity: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[test]
    fn parses_call_description() {
        let parsed = parse_option_description("AMD 10/17/2025 Call $170.00").unwrap();
        assert_eq!(parsed.ticker, "AMD");
        assert_eq!(parsed.option_type, OptionType::Call);
        assert_eq!(parsed.strike, dec!(170.00));
        assert_eq!(parsed.expiration, NaiveDate::from_ymd_opt(2025, 10, 17).unwrap());
    }

    #[test]
    fn parses_description_split_across_lines() {
        let parsed = parse_option_description("SPY 09/05/2025\n   Put $1,000.50").unwrap();
        assert_eq!(parsed.option_type, OptionType::Put);
        assert_eq!(parsed.strike, dec!(1000.50));
    }

    #[test]
    fn stock_description_is_not_an_option() {
        assert!(parse_option_description("Advanced Micro Devices").is_none());
        assert!(parse_option_description("AMD 13/45/2025 Call $170.00").is_none());
    }

    #[rstest]
    #[case("$1,234.50", Some(dec!(1234.50)))]
    #[case("($500.00)", Some(dec!(-500.00)))]
    #[case("-$12.00", Some(dec!(-12.00)))]
    #[case("  ", None)]
    fn parses_amounts(#[case] raw: &str, #[case] expected: Option<Decimal>) {
        assert_eq!(parse_amount(raw).unwrap(), expected);
    }

    #[test]
    fn rejects_garbage_amount() {
        assert!(parse_amount("$abc").is_err());
    }

    #[rstest]
    #[case("3", 3)]
    #[case(" 10 ", 10)]
    #[case("2S", -2)]
    fn parses_quantities(#[case] raw: &str, #[case] expected: i64) {
        assert_eq!(parse_quantity(raw).unwrap(), expected);
    }
}
