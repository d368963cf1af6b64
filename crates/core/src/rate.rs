//! Rate - Per-second interest rate in fixed point
//!
//! Rates are stored as integers scaled by `PRECISION_FACTOR` (1e18).
//! A scaled rate of `50_000_000_000` means 0.00000005 per second.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Fixed-point scale factor shared by rates and growth factors
pub const PRECISION_FACTOR: u128 = 1_000_000_000_000_000_000;

/// Seconds in a 365-day year, used for display only
const SECONDS_PER_YEAR: u64 = 31_536_000;

/// Errors that can occur when building rates
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RateError {
    #[error("Rate cannot be negative: {0}")]
    Negative(Decimal),

    #[error("Rate has more than 18 fractional digits: {0}")]
    TooPrecise(Decimal),

    #[error("Rate out of range: {0}")]
    OutOfRange(String),

    #[error("Invalid rate: {0}")]
    InvalidFormat(String),
}

/// Per-second interest rate, scaled by 1e18.
///
/// # Example
/// ```
/// use accrue_core::Rate;
/// use rust_decimal::Decimal;
///
/// let rate = Rate::from_decimal(Decimal::new(5, 8)).unwrap(); // 0.00000005
/// assert_eq!(rate.scaled(), 50_000_000_000);
/// assert_eq!(rate.to_decimal(), Some(Decimal::new(5, 8)));
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Rate(u128);

impl Rate {
    /// Zero rate
    pub const ZERO: Self = Self(0);

    /// Create a rate from its scaled integer representation
    #[inline]
    pub const fn from_scaled(scaled: u128) -> Self {
        Self(scaled)
    }

    /// Scaled integer representation
    #[inline]
    pub const fn scaled(&self) -> u128 {
        self.0
    }

    /// Convert a human-readable per-second rate (e.g. `0.00000005`)
    pub fn from_decimal(value: Decimal) -> Result<Self, RateError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(RateError::Negative(value));
        }

        let scaled = value
            .checked_mul(Decimal::from(PRECISION_FACTOR as u64))
            .ok_or_else(|| RateError::OutOfRange(value.to_string()))?;

        if !scaled.fract().is_zero() {
            return Err(RateError::TooPrecise(value));
        }

        scaled
            .to_u128()
            .map(Self)
            .ok_or_else(|| RateError::OutOfRange(value.to_string()))
    }

    /// Per-second rate as a decimal; None if it does not fit a Decimal
    pub fn to_decimal(&self) -> Option<Decimal> {
        let num = i128::try_from(self.0).ok()?;
        Decimal::try_from_i128_with_scale(num, 18)
            .ok()
            .map(|d| d.normalize())
    }

    /// Simple (non-compounding) yearly rate, for display
    pub fn per_year(&self) -> Option<Decimal> {
        self.to_decimal()?
            .checked_mul(Decimal::from(SECONDS_PER_YEAR))
            .map(|d| d.normalize())
    }

    /// `PRECISION_FACTOR + rate * elapsed`; None on overflow
    pub fn growth_factor(&self, elapsed_secs: u64) -> Option<u128> {
        self.0
            .checked_mul(elapsed_secs as u128)?
            .checked_add(PRECISION_FACTOR)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Rate {
    type Err = RateError;

    /// A plain integer is taken as the scaled value; a string with a
    /// decimal point is a per-second fraction.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if s.contains('.') {
            let value = Decimal::from_str(s)
                .map_err(|_| RateError::InvalidFormat(s.to_string()))?;
            return Self::from_decimal(value);
        }

        s.replace('_', "")
            .parse::<u128>()
            .map(Self)
            .map_err(|_| RateError::InvalidFormat(s.to_string()))
    }
}

impl TryFrom<String> for Rate {
    type Error = RateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rate> for String {
    fn from(rate: Rate) -> Self {
        rate.0.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_from_decimal() {
        let rate = Rate::from_decimal(dec!(0.00000005)).unwrap();
        assert_eq!(rate.scaled(), 50_000_000_000);

        let one = Rate::from_decimal(dec!(1)).unwrap();
        assert_eq!(one.scaled(), PRECISION_FACTOR);
    }

    #[test]
    fn test_negative_rejected() {
        let result = Rate::from_decimal(dec!(-0.1));
        assert!(matches!(result, Err(RateError::Negative(_))));
    }

    #[test]
    fn test_too_precise_rejected() {
        let result = Rate::from_decimal(dec!(0.0000000000000000001));
        assert!(matches!(result, Err(RateError::TooPrecise(_))));
    }

    #[test]
    fn test_to_decimal_roundtrip() {
        let rate = Rate::from_scaled(50_000_000_000);
        assert_eq!(rate.to_decimal(), Some(dec!(0.00000005)));
        assert_eq!(Rate::ZERO.to_decimal(), Some(Decimal::ZERO));
    }

    #[test]
    fn test_per_year() {
        let rate = Rate::from_decimal(dec!(0.00000001)).unwrap();
        assert_eq!(rate.per_year(), Some(dec!(0.31536)));
    }

    #[test]
    fn test_growth_factor() {
        let rate = Rate::from_scaled(50_000_000_000);
        assert_eq!(rate.growth_factor(0), Some(PRECISION_FACTOR));
        assert_eq!(
            rate.growth_factor(86_400),
            Some(PRECISION_FACTOR + 50_000_000_000 * 86_400)
        );
        assert_eq!(Rate::from_scaled(u128::MAX).growth_factor(2), None);
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            "50000000000".parse::<Rate>().unwrap(),
            Rate::from_scaled(50_000_000_000)
        );
        assert_eq!(
            "0.00000005".parse::<Rate>().unwrap(),
            Rate::from_scaled(50_000_000_000)
        );
        assert!(matches!(
            "fast".parse::<Rate>(),
            Err(RateError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_ordering() {
        assert!(Rate::from_scaled(2) > Rate::from_scaled(1));
        assert!(Rate::ZERO < Rate::from_scaled(1));
    }

    #[test]
    fn test_serde_roundtrip() {
        let rate = Rate::from_scaled(50_000_000_000);
        let json = serde_json::to_string(&rate).unwrap();
        assert_eq!(json, "\"50000000000\"");
        let parsed: Rate = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, rate);
    }
}
