//! ISO 3166-1 alpha-2 country code type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`CountryCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CountryError {
    /// The input string is empty.
    #[error("country code cannot be empty")]
    Empty,
    /// The input is not two ASCII letters.
    #[error("country code must be two ASCII letters, got {0:?}")]
    Invalid(String),
}

/// A two-letter country code, normalized to uppercase.
///
/// ## Examples
///
/// ```
/// use kom_core::CountryCode;
///
/// let us = CountryCode::parse("us").unwrap();
/// assert_eq!(us.as_str(), "US");
/// assert_eq!(us.to_lowercase(), "us");
///
/// assert!(CountryCode::parse("").is_err());
/// assert!(CountryCode::parse("USA").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct CountryCode(String);

impl CountryCode {
    /// Parse a `CountryCode` from a string (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or is not exactly two ASCII
    /// letters.
    pub fn parse(s: &str) -> Result<Self, CountryError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(CountryError::Empty);
        }

        if trimmed.len() != 2 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CountryError::Invalid(s.to_owned()));
        }

        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// Returns the uppercase code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the code in lowercase, as used in settings keys.
    #[must_use]
    pub fn to_lowercase(&self) -> String {
        self.0.to_ascii_lowercase()
    }

    /// Whether this is the given uppercase code.
    #[must_use]
    pub fn is(&self, code: &str) -> bool {
        self.0 == code
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for CountryCode {
    type Err = CountryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CountryCode {
    type Error = CountryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CountryCode> for String {
    fn from(code: CountryCode) -> Self {
        code.0
    }
}

impl AsRef<str> for CountryCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_case() {
        assert_eq!(CountryCode::parse("de").unwrap().as_str(), "DE");
        assert_eq!(CountryCode::parse(" Nz ").unwrap().as_str(), "NZ");
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(CountryCode::parse(""), Err(CountryError::Empty));
        assert!(matches!(
            CountryCode::parse("USA"),
            Err(CountryError::Invalid(_))
        ));
        assert!(matches!(
            CountryCode::parse("1A"),
            Err(CountryError::Invalid(_))
        ));
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: CountryCode = serde_json::from_str("\"se\"").unwrap();
        assert!(ok.is("SE"));
        assert!(serde_json::from_str::<CountryCode>("\"sweden\"").is_err());
    }
}
