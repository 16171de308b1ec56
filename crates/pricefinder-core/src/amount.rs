//! Number extraction for prices and ratings scraped out of page text.
//!
//! Retailer markup renders amounts as `"$1,299.99"`, `"current price $19.99"`,
//! `"$10.00 to $20.00"` or Amazon's split `"1,299."` whole-part span. These
//! helpers pick the first well-formed number out of that text without caring
//! about the surrounding words.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

/// ASCII `digits[.digits]`; a point with no digit after it is not part of the number.
static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+(?:\.[0-9]+)?").expect("valid regex"));

/// Parses the first decimal amount in `text`.
///
/// Thousands separators (`,`) are dropped before scanning, so `"$1,299.99"`
/// yields `1299.99`. A ranged price (`"$10.00 to $20.00"` or `"$10 - $20"`)
/// yields its lower bound because the scan stops at the first number. A
/// trailing decimal point with no fraction (`"1299."`) is ignored.
///
/// Returns `None` when no digit is present or the amount is negative.
#[must_use]
pub fn parse_amount(text: &str) -> Option<Decimal> {
    let cleaned: String = text.chars().filter(|c| *c != ',').collect();
    let number = first_number(&cleaned)?;
    let value = Decimal::from_str(number).ok()?;
    (!value.is_sign_negative()).then_some(value)
}

/// Parses the leading numeral of a rating string such as `"4.5 out of 5 stars"`
/// or `"Rating 4.7 out of 5 stars with 1234 reviews"`.
#[must_use]
pub fn parse_leading_number(text: &str) -> Option<f64> {
    first_number(text)?.parse::<f64>().ok()
}

/// Returns the first `digits[.digits]` run in `text`.
fn first_number(text: &str) -> Option<&str> {
    NUMBER.find(text).map(|m| m.as_str())
}
