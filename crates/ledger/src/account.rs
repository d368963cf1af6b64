//! Account state and the accrual formula
//!
//! effective(t) = principal * (S + rate * (t - last_update)) / S, floored,
//! with S = `PRECISION_FACTOR`.

use crate::error::{LedgerError, LedgerResult};
use accrue_core::{Amount, Rate, Timestamp, PRECISION_FACTOR};
use serde::{Deserialize, Serialize};

/// Per-account ledger triple
///
/// A never-referenced account reads as `AccountState::default()`: zero
/// principal, zero rate, last update at the epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccountState {
    /// Stored token quantity, excluding unrealized interest
    pub principal: Amount,

    /// Rate locked in by the last mint or first funding transfer
    pub interest_rate: Rate,

    /// Time of the last realization
    pub last_update: Timestamp,
}

impl AccountState {
    /// Principal grown by the locked rate up to `now`
    pub fn effective_balance(&self, now: Timestamp) -> LedgerResult<Amount> {
        let elapsed = now.elapsed_since(self.last_update);
        if elapsed == 0 || self.principal.is_zero() {
            return Ok(self.principal);
        }

        let factor = self
            .interest_rate
            .growth_factor(elapsed)
            .ok_or(LedgerError::Overflow("computing growth factor"))?;

        mul_div_floor(self.principal.value(), factor, PRECISION_FACTOR)
            .map(Amount::new)
            .ok_or(LedgerError::Overflow("computing effective balance"))
    }

    /// Interest accrued since the last realization
    pub fn pending_interest(&self, now: Timestamp) -> LedgerResult<Amount> {
        let effective = self.effective_balance(now)?;
        // effective >= principal because rate and elapsed are unsigned
        Ok(effective
            .checked_sub(self.principal)
            .unwrap_or(Amount::ZERO))
    }

    /// Fold pending interest into principal and move the checkpoint to `now`.
    ///
    /// Returns the interest realized. Leaves `self` untouched on error.
    pub fn realize(&mut self, now: Timestamp) -> LedgerResult<Amount> {
        let effective = self.effective_balance(now)?;
        let interest = effective
            .checked_sub(self.principal)
            .unwrap_or(Amount::ZERO);

        self.principal = effective;
        // Never move the checkpoint backwards
        self.last_update = self.last_update.max(now);

        Ok(interest)
    }
}

/// floor(a * b / d) without a 256-bit intermediate.
///
/// With a = aq*d + ar and b = bq*d + br:
/// a*b/d = aq*b + ar*bq + ar*br/d, and ar*br < d^2.
fn mul_div_floor(a: u128, b: u128, d: u128) -> Option<u128> {
    let (aq, ar) = (a / d, a % d);
    let (bq, br) = (b / d, b % d);

    aq.checked_mul(b)?
        .checked_add(ar.checked_mul(bq)?)?
        .checked_add(ar.checked_mul(br)? / d)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: Rate = Rate::from_scaled(50_000_000_000);

    fn account(principal: u128, rate: Rate, last_update: u64) -> AccountState {
        AccountState {
            principal: Amount::new(principal),
            interest_rate: rate,
            last_update: Timestamp::from_secs(last_update),
        }
    }

    #[test]
    fn test_no_elapsed_time_no_interest() {
        let acct = account(100_000, RATE, 1_000);
        assert_eq!(
            acct.effective_balance(Timestamp::from_secs(1_000)).unwrap(),
            Amount::new(100_000)
        );
    }

    #[test]
    fn test_one_day_matches_formula() {
        let acct = account(100_000, RATE, 0);
        let expected = 100_000u128 * (PRECISION_FACTOR + RATE.scaled() * 86_400) / PRECISION_FACTOR;

        let balance = acct.effective_balance(Timestamp::from_secs(86_400)).unwrap();
        assert_eq!(balance, Amount::new(expected));
        assert_eq!(balance, Amount::new(100_432));
    }

    #[test]
    fn test_zero_rate_never_grows() {
        let acct = account(500, Rate::ZERO, 0);
        assert_eq!(
            acct.effective_balance(Timestamp::from_secs(10_000_000)).unwrap(),
            Amount::new(500)
        );
    }

    #[test]
    fn test_realize_is_idempotent() {
        let mut acct = account(100_000, RATE, 0);
        let now = Timestamp::from_secs(86_400);

        let first = acct.realize(now).unwrap();
        assert_eq!(first, Amount::new(432));
        assert_eq!(acct.principal, Amount::new(100_432));
        assert_eq!(acct.last_update, now);
        assert_eq!(acct.effective_balance(now).unwrap(), acct.principal);

        let second = acct.realize(now).unwrap();
        assert_eq!(second, Amount::ZERO);
        assert_eq!(acct.principal, Amount::new(100_432));
    }

    #[test]
    fn test_realize_keeps_rate() {
        let mut acct = account(1_000, RATE, 0);
        acct.realize(Timestamp::from_secs(3_600)).unwrap();
        assert_eq!(acct.interest_rate, RATE);
    }

    #[test]
    fn test_realize_never_moves_checkpoint_back() {
        let mut acct = account(1_000, RATE, 500);
        acct.realize(Timestamp::from_secs(100)).unwrap();
        assert_eq!(acct.last_update, Timestamp::from_secs(500));
        assert_eq!(acct.principal, Amount::new(1_000));
    }

    #[test]
    fn test_pending_interest() {
        let acct = account(100_000, RATE, 0);
        assert_eq!(
            acct.pending_interest(Timestamp::from_secs(86_400)).unwrap(),
            Amount::new(432)
        );
    }

    #[test]
    fn test_large_principal_does_not_overflow() {
        // 1e30 units: principal * factor exceeds u128, the split product does not
        let acct = account(1_000_000_000_000_000_000_000_000_000_000, RATE, 0);
        let balance = acct.effective_balance(Timestamp::from_secs(86_400)).unwrap();
        assert_eq!(
            balance,
            Amount::new(1_004_320_000_000_000_000_000_000_000_000)
        );
    }

    #[test]
    fn test_overflow_is_reported() {
        let acct = account(u128::MAX, Rate::from_scaled(PRECISION_FACTOR), 0);
        let result = acct.effective_balance(Timestamp::from_secs(10));
        assert!(matches!(result, Err(LedgerError::Overflow(_))));
    }

    #[test]
    fn test_mul_div_floor_matches_naive() {
        let cases = [
            (0u128, 5u128, 3u128),
            (7, 9, 4),
            (100_000, PRECISION_FACTOR + 4_320_000_000_000_000, PRECISION_FACTOR),
            (PRECISION_FACTOR + 17, PRECISION_FACTOR - 3, PRECISION_FACTOR),
        ];
        for (a, b, d) in cases {
            assert_eq!(mul_div_floor(a, b, d), Some(a * b / d));
        }
    }
}
