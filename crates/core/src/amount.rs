//! Amount - Exact token quantities
//!
//! Ledger balances are whole token units stored as `u128`.
//! There is no fractional part: accrued interest is floored when realized.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur when parsing amounts
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("Empty amount")]
    Empty,

    #[error("Invalid amount: {0}")]
    InvalidFormat(String),
}

/// An exact, unsigned token quantity.
///
/// `Amount::ENTIRE_BALANCE` is the maximum representable value and is used as
/// a request convention: "operate on the whole balance". Operations that
/// accept it resolve it to a concrete amount before any other logic runs.
///
/// # Example
/// ```
/// use accrue_core::Amount;
///
/// let amount = Amount::new(100);
/// assert_eq!(amount.value(), 100);
///
/// let all: Amount = "max".parse().unwrap();
/// assert!(all.is_entire_balance());
/// assert_eq!(all.resolve(amount), amount);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Amount(u128);

impl Amount {
    /// Zero amount constant
    pub const ZERO: Self = Self(0);

    /// Sentinel for "the entire balance"
    pub const ENTIRE_BALANCE: Self = Self(u128::MAX);

    /// Create a new Amount
    #[inline]
    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    /// Get the inner value
    #[inline]
    pub const fn value(&self) -> u128 {
        self.0
    }

    /// Check if the amount is zero
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Check if this is the `ENTIRE_BALANCE` sentinel
    #[inline]
    pub fn is_entire_balance(&self) -> bool {
        *self == Self::ENTIRE_BALANCE
    }

    /// Replace the sentinel with `balance`; any other amount is returned as is
    pub fn resolve(self, balance: Amount) -> Amount {
        if self.is_entire_balance() {
            balance
        } else {
            self
        }
    }

    /// Checked addition - returns None on overflow
    pub fn checked_add(&self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    /// Checked subtraction - returns None if result would be negative
    pub fn checked_sub(&self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Amount)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    /// Parses a decimal integer; `max` or `all` yields `ENTIRE_BALANCE`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if s.is_empty() {
            return Err(AmountError::Empty);
        }

        if s.eq_ignore_ascii_case("max") || s.eq_ignore_ascii_case("all") {
            return Ok(Self::ENTIRE_BALANCE);
        }

        let digits = s.replace('_', "");
        digits
            .parse::<u128>()
            .map(Amount)
            .map_err(|_| AmountError::InvalidFormat(s.to_string()))
    }
}

impl TryFrom<String> for Amount {
    type Error = AmountError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Amount> for String {
    fn from(amount: Amount) -> Self {
        amount.0.to_string()
    }
}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self(value as u128)
    }
}
