//! # Asset Symbols
//!
//! Balances are keyed by an [`AssetSymbol`]: a short ticker such as
//! `MERIT` or `USDT`. Symbols are validated once at construction so the
//! rest of the vault never has to ask whether a key is well-formed.
//!
//! Accepted symbols are 1 to [`MAX_ASSET_SYMBOL_LENGTH`] characters of
//! ASCII letters, digits, `_` or `-`. Case is preserved: `merit` and
//! `MERIT` are different assets, and both hash differently on the ledger.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::{DEFAULT_ASSET, MAX_ASSET_SYMBOL_LENGTH};
use crate::error::LedgerError;

/// A validated asset ticker.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetSymbol(String);

impl AssetSymbol {
    /// Validates and wraps a symbol.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidAsset`] for empty, over-long, or
    /// non-ticker input.
    pub fn new(symbol: &str) -> Result<Self, LedgerError> {
        let well_formed = !symbol.is_empty()
            && symbol.len() <= MAX_ASSET_SYMBOL_LENGTH
            && symbol
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
        if !well_formed {
            return Err(LedgerError::InvalidAsset(symbol.to_string()));
        }
        Ok(Self(symbol.to_string()))
    }

    /// The default accounting unit, `MERIT`.
    pub fn merit() -> Self {
        Self(DEFAULT_ASSET.to_string())
    }

    /// The symbol as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for AssetSymbol {
    fn default() -> Self {
        Self::merit()
    }
}

impl fmt::Display for AssetSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AssetSymbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for AssetSymbol {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for AssetSymbol {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<AssetSymbol> for String {
    fn from(symbol: AssetSymbol) -> Self {
        symbol.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merit_is_default() {
        assert_eq!(AssetSymbol::default().as_str(), "MERIT");
        assert_eq!(AssetSymbol::merit(), AssetSymbol::new("MERIT").unwrap());
    }

    #[test]
    fn accepts_ticker_shapes() {
        for s in ["MERIT", "USDT", "usd", "BTC-PERP", "GOLD_OZ", "A1"] {
            assert!(AssetSymbol::new(s).is_ok(), "{s} should be accepted");
        }
    }

    #[test]
    fn rejects_malformed() {
        for s in ["", " ", "ME RIT", "MÉRIT", "A/B", "ABCDEFGHIJKLMNOPQ"] {
            assert!(
                matches!(AssetSymbol::new(s), Err(LedgerError::InvalidAsset(_))),
                "{s:?} should be rejected"
            );
        }
    }

    #[test]
    fn case_is_preserved() {
        assert_ne!(AssetSymbol::new("merit").unwrap(), AssetSymbol::merit());
    }

    #[test]
    fn deserialization_validates() {
        let ok: AssetSymbol = serde_json::from_str("\"USDT\"").unwrap();
        assert_eq!(ok.as_str(), "USDT");
        assert!(serde_json::from_str::<AssetSymbol>("\"\"").is_err());
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&AssetSymbol::merit()).unwrap();
        assert_eq!(json, "\"MERIT\"");
    }
}
