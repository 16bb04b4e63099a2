//! Decimal money helpers.
//!
//! Host orders carry amounts in major units (`49.99`), Klarna expects
//! integer minor units (`4999`). All conversions go through
//! [`to_minor_units`] so rounding is applied in one place.

use core::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors from money conversions.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// The amount does not fit in an `i64` after scaling.
    #[error("amount {0} is out of range for minor units")]
    OutOfRange(Decimal),
    /// The currency code is not three ASCII letters.
    #[error("invalid currency code: {0:?}")]
    InvalidCurrency(String),
}

/// Convert a major-unit amount to minor units (x100), rounding half away
/// from zero.
///
/// Tax rates use the same scale (`25.00` percent becomes `2500`).
///
/// # Errors
///
/// Returns [`MoneyError::OutOfRange`] if the scaled value overflows `i64`.
///
/// ```
/// use kom_core::to_minor_units;
/// use rust_decimal::Decimal;
///
/// assert_eq!(to_minor_units(Decimal::new(5000, 2)).unwrap(), 5000);
/// assert_eq!(to_minor_units(Decimal::new(19995, 3)).unwrap(), 2000);
/// ```
pub fn to_minor_units(amount: Decimal) -> Result<i64, MoneyError> {
    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(|scaled| scaled.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|rounded| rounded.to_i64())
        .ok_or(MoneyError::OutOfRange(amount))
}

/// ISO 4217 currency code, normalized to uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Parse a currency code.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::InvalidCurrency`] unless the input is three
    /// ASCII letters.
    pub fn parse(s: &str) -> Result<Self, MoneyError> {
        let trimmed = s.trim();
        if trimmed.len() == 3 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(trimmed.to_ascii_uppercase()))
        } else {
            Err(MoneyError::InvalidCurrency(s.to_owned()))
        }
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Format an amount for humans, e.g. `50.00 USD`.
    #[must_use]
    pub fn format_amount(&self, amount: Decimal) -> String {
        let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        format!("{rounded:.2} {}", self.0)
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = MoneyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_minor_units_rounding() {
        assert_eq!(to_minor_units(Decimal::new(5000, 2)).unwrap(), 5000);
        assert_eq!(to_minor_units(Decimal::new(1005, 3)).unwrap(), 101);
        assert_eq!(to_minor_units(Decimal::new(-1005, 3)).unwrap(), -101);
        assert_eq!(to_minor_units(Decimal::ZERO).unwrap(), 0);
    }

    #[test]
    fn test_minor_units_overflow() {
        assert!(matches!(
            to_minor_units(Decimal::MAX),
            Err(MoneyError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_currency_format_amount() {
        let usd = CurrencyCode::parse("usd").unwrap();
        assert_eq!(usd.format_amount(Decimal::new(50, 0)), "50.00 USD");
        assert_eq!(usd.format_amount(Decimal::new(12345, 3)), "12.35 USD");
    }

    #[test]
    fn test_currency_rejects_garbage() {
        assert!(CurrencyCode::parse("US").is_err());
        assert!(CurrencyCode::parse("US1").is_err());
    }
}
