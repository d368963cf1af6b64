//! Address - Identity of an account holder or a component
//!
//! Addresses are normalized to uppercase so `alice` and `ALICE` name the
//! same account.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Maximum address length in characters
pub const MAX_ADDRESS_LEN: usize = 64;

/// Errors that can occur when parsing addresses
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("Empty address")]
    Empty,

    #[error("Address too long (max 64 chars): {0}")]
    TooLong(String),

    #[error("Invalid address format: {0}")]
    InvalidFormat(String),
}

/// Normalized account / component identity
///
/// # Examples
/// ```
/// use accrue_core::Address;
///
/// let alice: Address = "alice".parse().unwrap();
/// assert_eq!(alice.as_str(), "ALICE");
///
/// let vault = Address::new("accrue-vault").unwrap();
/// assert_eq!(vault.to_string(), "ACCRUE-VAULT");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Parse and normalize an address
    pub fn new(s: impl AsRef<str>) -> Result<Self, AddressError> {
        s.as_ref().parse()
    }

    /// Returns the address as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_uppercase();

        if s.is_empty() {
            return Err(AddressError::Empty);
        }

        if s.len() > MAX_ADDRESS_LEN {
            return Err(AddressError::TooLong(s));
        }

        // Alphanumeric plus '_' and '-'
        if !s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(AddressError::InvalidFormat(s));
        }

        Ok(Address(s))
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_case() {
        let a: Address = "alice".parse().unwrap();
        let b: Address = " ALICE ".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "ALICE");
    }

    #[test]
    fn test_empty_address_error() {
        let result: Result<Address, _> = "   ".parse();
        assert!(matches!(result, Err(AddressError::Empty)));
    }

    #[test]
    fn test_too_long_error() {
        let long = "A".repeat(MAX_ADDRESS_LEN + 1);
        let result: Result<Address, _> = long.parse();
        assert!(matches!(result, Err(AddressError::TooLong(_))));
    }

    #[test]
    fn test_invalid_format_error() {
        let result: Result<Address, _> = "alice bob".parse();
        assert!(matches!(result, Err(AddressError::InvalidFormat(_))));

        let result: Result<Address, _> = "alice:usdt".parse();
        assert!(matches!(result, Err(AddressError::InvalidFormat(_))));
    }

    #[test]
    fn test_serde_roundtrip() {
        let address = Address::new("rebase-vault_1").unwrap();
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!(json, "\"REBASE-VAULT_1\"");

        let parsed: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, address);
    }

    #[test]
    fn test_deserialize_rejects_invalid() {
        let result: Result<Address, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }
}
