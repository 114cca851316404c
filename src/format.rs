//! USD input normalization
//!
//! Turns raw keystroke text from the USD field into a whole-dollar amount and
//! re-renders it with grouping separators (`10000` -> `10,000`).

use crate::{constants::GROUPING_SEPARATOR, error::WidgetError};
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// A field value that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedInput {
    /// Text to show in the field
    pub text: String,
    /// Whole-dollar amount, `None` when the field is empty
    pub amount: Option<Decimal>,
}

impl NormalizedInput {
    /// The empty field
    pub fn empty() -> Self {
        Self {
            text: String::new(),
            amount: None,
        }
    }
}

/// Removes grouping separators
pub fn strip_separators(text: &str) -> String {
    text.chars().filter(|c| *c != GROUPING_SEPARATOR).collect()
}

/// Parses field text into a decimal
///
/// Separators and surrounding whitespace are ignored. Empty text is
/// `Ok(None)`; only `digits[.digits]` is accepted otherwise.
pub fn parse_amount(text: &str) -> Result<Option<Decimal>, WidgetError> {
    let stripped = strip_separators(text);
    let trimmed = stripped.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let mut parts = trimmed.splitn(2, '.');
    let whole = parts.next().unwrap_or_default();
    let fraction = parts.next().unwrap_or_default();
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !all_digits(whole) || !all_digits(fraction) || (whole.is_empty() && fraction.is_empty()) {
        return Err(WidgetError::invalid_input(text));
    }

    // "12." and ".5" are valid partial input
    let canonical = match (whole.is_empty(), fraction.is_empty()) {
        (true, _) => format!("0.{}", fraction),
        (false, true) => whole.to_string(),
        (false, false) => format!("{}.{}", whole, fraction),
    };

    Decimal::from_str(&canonical)
        .map(Some)
        .map_err(|_| WidgetError::invalid_input(text))
}

/// Rounds to whole dollars and inserts grouping separators
pub fn format_grouped(amount: Decimal) -> String {
    let whole = amount
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .abs()
        .trunc();
    let digits = whole.to_string();
    let len = digits.len();

    let mut result = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            result.push(GROUPING_SEPARATOR);
        }
        result.push(c);
    }

    if amount.is_sign_negative() && !whole.is_zero() {
        result.insert(0, '-');
    }
    result
}

/// Validates an edit of the USD field against the ceiling
///
/// The ceiling is checked against the value as typed, before rounding to
/// whole dollars.
pub fn normalize(raw: &str, ceiling: Decimal) -> Result<NormalizedInput, WidgetError> {
    let Some(value) = parse_amount(raw)? else {
        return Ok(NormalizedInput::empty());
    };

    if value > ceiling {
        return Err(WidgetError::limit_exceeded(value, ceiling));
    }

    let text = format_grouped(value);
    let amount = parse_amount(&text)?;
    Ok(NormalizedInput { text, amount })
}
