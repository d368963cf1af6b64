//! Custody vault
//!
//! Holds the backing asset pool. Deposits mint ledger balance at the current
//! global rate; redemptions burn ledger balance and pay out the same quantity
//! of backing asset. Ledger steps and the custody step of one call run in a
//! single `LedgerTx`, so either everything happens or nothing does.

use crate::custody::PayoutRail;
use crate::error::{PayoutError, VaultError, VaultResult};
use crate::event::VaultEvent;
use accrue_core::{Address, Amount};
use accrue_ledger::Ledger;
use std::sync::Arc;

/// Backing asset custody bound to one ledger
#[derive(Clone)]
pub struct Vault {
    address: Address,
    ledger_address: Address,
    pool: Amount,
    rail: Arc<dyn PayoutRail>,
    outbox: Vec<VaultEvent>,
}

impl Vault {
    /// Create an empty vault.
    ///
    /// `address` is the identity the vault mints and burns as, so it must
    /// hold the ledger's mint/burn role.
    pub fn new(address: Address, ledger_address: Address, rail: Arc<dyn PayoutRail>) -> Self {
        Self {
            address,
            ledger_address,
            pool: Amount::ZERO,
            rail,
            outbox: Vec::new(),
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Identity of the ledger this vault is bound to
    pub fn ledger_address(&self) -> &Address {
        &self.ledger_address
    }

    /// Backing asset currently in custody
    pub fn pool_balance(&self) -> Amount {
        self.pool
    }

    /// Take `value` of backing asset from `caller` and mint the same amount
    /// of ledger balance at the current global rate.
    ///
    /// A zero deposit mints nothing but still re-locks the caller's rate.
    /// `Amount::ENTIRE_BALANCE` is refused with `UnboundedAmount`.
    pub fn deposit(&mut self, ledger: &mut Ledger, caller: &Address, value: Amount) -> VaultResult<()> {
        self.check_ledger(ledger)?;
        if value.is_entire_balance() {
            return Err(VaultError::UnboundedAmount);
        }

        let mut tx = ledger.begin();
        let rate = tx.interest_rate();
        tx.mint(&self.address, caller, value, rate)?;

        let pool = self
            .pool
            .checked_add(value)
            .ok_or(VaultError::Overflow("taking deposit into custody"))?;

        tx.commit();
        self.pool = pool;
        self.outbox.push(VaultEvent::Deposit {
            user: caller.clone(),
            amount: value,
        });

        tracing::info!(user = %caller, amount = %value, rate = %rate, "Deposit");
        Ok(())
    }

    /// Burn `amount` of `caller`'s ledger balance and pay out the same
    /// amount of backing asset. Returns the amount paid.
    ///
    /// `Amount::ENTIRE_BALANCE` redeems the caller's whole current balance.
    /// If that balance is zero the call fails with `ZeroAmount`, the same as
    /// an explicit zero, rather than succeeding as a no-op.
    /// If the payout fails the burn is undone.
    pub fn redeem(&mut self, ledger: &mut Ledger, caller: &Address, amount: Amount) -> VaultResult<Amount> {
        self.check_ledger(ledger)?;
        if amount.is_zero() {
            return Err(VaultError::ZeroAmount);
        }

        let mut tx = ledger.begin();
        let amount = if amount.is_entire_balance() {
            tx.balance_of(caller)?
        } else {
            amount
        };
        if amount.is_zero() {
            return Err(VaultError::ZeroAmount);
        }

        tx.burn(&self.address, caller, amount)?;

        let pool = self.pool.checked_sub(amount).ok_or_else(|| {
            PayoutError::InsufficientLiquidity {
                available: self.pool,
                required: amount,
            }
        })?;
        if let Err(e) = self.rail.pay(caller, amount) {
            tracing::warn!(user = %caller, amount = %amount, error = %e, "Payout failed, redemption rolled back");
            return Err(e.into());
        }

        tx.commit();
        self.pool = pool;
        self.outbox.push(VaultEvent::Redeem {
            user: caller.clone(),
            amount,
        });

        tracing::info!(user = %caller, amount = %amount, "Redeem");
        Ok(amount)
    }

    /// Accept an unsolicited inflow of backing asset
    pub fn fund_rewards(&mut self, from: &Address, value: Amount) -> VaultResult<()> {
        if value.is_entire_balance() {
            return Err(VaultError::UnboundedAmount);
        }
        self.pool = self
            .pool
            .checked_add(value)
            .ok_or(VaultError::Overflow("receiving rewards"))?;
        self.outbox.push(VaultEvent::RewardsReceived {
            from: from.clone(),
            amount: value,
        });

        tracing::info!(from = %from, amount = %value, "Rewards received");
        Ok(())
    }

    /// Take the events committed since the last drain
    pub fn drain_events(&mut self) -> Vec<VaultEvent> {
        std::mem::take(&mut self.outbox)
    }

    /// Rebuild the pool from journaled events; payouts are not re-sent
    pub fn replay<'a>(&mut self, events: impl IntoIterator<Item = &'a VaultEvent>) -> VaultResult<usize> {
        let mut applied = 0;
        for event in events {
            let amount = event.amount();
            self.pool = match event {
                VaultEvent::Deposit { .. } | VaultEvent::RewardsReceived { .. } => {
                    self.pool.checked_add(amount).ok_or(VaultError::Overflow("replaying inflow"))?
                }
                VaultEvent::Redeem { .. } => self.pool.checked_sub(amount).ok_or(
                    PayoutError::InsufficientLiquidity {
                        available: self.pool,
                        required: amount,
                    },
                )?,
            };
            applied += 1;
        }

        tracing::debug!(applied, pool = %self.pool, "Vault replay complete");
        Ok(applied)
    }

    fn check_ledger(&self, ledger: &Ledger) -> VaultResult<()> {
        if ledger.address() != &self.ledger_address {
            return Err(VaultError::LedgerMismatch {
                expected: self.ledger_address.clone(),
                actual: ledger.address().clone(),
            });
        }
        Ok(())
    }
}
