use num_format::{Locale, ToFormattedString};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::str::FromStr;

/// Largest magnitude accepted for any amount: one quadrillion.
pub const MAX_AMOUNT_UNITS: i64 = 1_000_000_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountError {
    Malformed,
    TooLarge,
}

/// Strict form of [`parse_amount`]: empty input is 0, anything else must be
/// a number within [`MAX_AMOUNT_UNITS`].
pub fn try_parse_amount(input: &str) -> Result<Decimal, AmountError> {
    let cleaned: String = input.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return Ok(Decimal::ZERO);
    }
    let value = Decimal::from_str(&cleaned).map_err(|_| AmountError::Malformed)?;
    if value.abs() > Decimal::from(MAX_AMOUNT_UNITS) {
        return Err(AmountError::TooLarge);
    }
    Ok(value.round_dp(2))
}

/// Parses a currency amount as typed by a user or read back from storage.
///
/// Thousands separators and surrounding whitespace are ignored. Empty,
/// malformed or out-of-range input is treated as zero rather than rejected.
pub fn parse_amount(input: &str) -> Decimal {
    try_parse_amount(input).unwrap_or_else(|e| {
        tracing::debug!(input, error = ?e, "amount treated as 0");
        Decimal::ZERO
    })
}

/// Formats an amount with two decimals and `,` thousands grouping.
pub fn format_amount(value: Decimal) -> String {
    let rounded = value.round_dp(2);
    let magnitude = rounded.abs();
    let whole = magnitude.trunc().to_u128().unwrap_or(0).to_formatted_string(&Locale::en);
    let fixed = format!("{:.2}", magnitude);
    let cents = fixed.rsplit_once('.').map(|(_, f)| f).unwrap_or("00");

    // zero is never signed, so "-0.00" cannot appear
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{}{}.{}", sign, whole, cents)
}
