//! Symbol value object for instrument identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::shared::DomainError;

/// Longest symbol accepted (covers OCC option symbols and crypto pairs).
const MAX_SYMBOL_LEN: usize = 32;

/// A trading symbol, e.g. `"AAPL"`, `"BTC-USD"`, `"RELIANCE.NS"`.
///
/// Normalized to uppercase on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Create a new Symbol, trimming whitespace and uppercasing.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_uppercase())
    }

    /// Get the symbol string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validate the symbol for order submission.
    ///
    /// # Errors
    ///
    /// Returns error if the symbol is empty, too long, or contains
    /// characters other than alphanumerics and `.`, `-`, `/`, `_`.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.0.is_empty() {
            return Err(DomainError::invalid("symbol", "symbol cannot be empty"));
        }
        if self.0.len() > MAX_SYMBOL_LEN {
            return Err(DomainError::invalid(
                "symbol",
                format!("symbol longer than {MAX_SYMBOL_LEN} characters"),
            ));
        }
        if let Some(bad) = self
            .0
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '/' | '_')))
        {
            return Err(DomainError::invalid(
                "symbol",
                format!("invalid character '{bad}' in symbol"),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Symbol {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_is_normalized() {
        assert_eq!(Symbol::new(" reliance.ns ").as_str(), "RELIANCE.NS");
        assert_eq!(Symbol::from("aapl"), Symbol::new("AAPL"));
    }

    #[test]
    fn symbol_validation() {
        assert!(Symbol::new("AAPL").validate().is_ok());
        assert!(Symbol::new("BTC-USD").validate().is_ok());
        assert!(Symbol::new("EUR/USD").validate().is_ok());
        assert!(Symbol::new("").validate().is_err());
        assert!(Symbol::new("   ").validate().is_err());
        assert!(Symbol::new("AA PL").validate().is_err());
        assert!(Symbol::new("X".repeat(33)).validate().is_err());
    }

    #[test]
    fn symbol_serde() {
        let json = serde_json::to_string(&Symbol::new("tsla")).unwrap();
        assert_eq!(json, "\"TSLA\"");
    }
}
