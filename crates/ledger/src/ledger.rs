//! The interest-accruing ledger
//!
//! Every operation that reads or writes an account's raw principal first
//! realizes that account's pending interest. Every top-level call runs in a
//! `LedgerTx`, so a failure at any step leaves the ledger exactly as it was.

use crate::account::AccountState;
use crate::auth::{Authorizer, Capability};
use crate::error::{LedgerError, LedgerResult};
use crate::event::LedgerEvent;
use accrue_core::{Address, Amount, Clock, Rate, Timestamp};
use std::collections::HashMap;
use std::sync::Arc;

/// Account table plus the global interest rate
///
/// Cloning yields an independent snapshot sharing the same authorizer and clock.
#[derive(Clone)]
pub struct Ledger {
    address: Address,
    accounts: HashMap<Address, AccountState>,
    global_rate: Rate,
    authorizer: Arc<dyn Authorizer>,
    clock: Arc<dyn Clock>,
    outbox: Vec<LedgerEvent>,
}

impl Ledger {
    /// Create an empty ledger identified by `address`
    pub fn new(
        address: Address,
        initial_rate: Rate,
        authorizer: Arc<dyn Authorizer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            address,
            accounts: HashMap::new(),
            global_rate: initial_rate,
            authorizer,
            clock,
            outbox: Vec::new(),
        }
    }

    /// Identity of this ledger
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Start an atomic unit of work at the current clock reading
    pub fn begin(&mut self) -> LedgerTx<'_> {
        let now = self.clock.now();
        self.begin_at(now)
    }

    fn begin_at(&mut self, now: Timestamp) -> LedgerTx<'_> {
        LedgerTx {
            ledger: self,
            now,
            undo_accounts: HashMap::new(),
            undo_rate: None,
            events: Vec::new(),
            committed: false,
        }
    }

    // === Top-level operations ===

    /// Raise (or keep) the global interest rate. Owner only.
    pub fn set_rate(&mut self, caller: &Address, new_rate: Rate) -> LedgerResult<()> {
        let mut tx = self.begin();
        tx.set_rate(caller, new_rate)?;
        tx.commit();

        tracing::info!(rate = %new_rate, "Global interest rate set");
        Ok(())
    }

    /// Mint `amount` to `to`, locking `rate` for the account
    pub fn mint(
        &mut self,
        caller: &Address,
        to: &Address,
        amount: Amount,
        rate: Rate,
    ) -> LedgerResult<()> {
        let mut tx = self.begin();
        tx.mint(caller, to, amount, rate)?;
        tx.commit();

        tracing::info!(to = %to, amount = %amount, rate = %rate, "Minted");
        Ok(())
    }

    /// Burn `amount` from `from`; returns the amount burned
    pub fn burn(&mut self, caller: &Address, from: &Address, amount: Amount) -> LedgerResult<Amount> {
        let mut tx = self.begin();
        let burned = tx.burn(caller, from, amount)?;
        tx.commit();

        tracing::info!(from = %from, amount = %burned, "Burned");
        Ok(burned)
    }

    /// Move `amount` from `from` to `to`.
    ///
    /// `Amount::ENTIRE_BALANCE` sends the sender's whole realized principal.
    pub fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> LedgerResult<bool> {
        let mut tx = self.begin();
        let moved = tx.transfer(from, to, amount)?;
        tx.commit();

        tracing::info!(from = %from, to = %to, amount = %moved, "Transferred");
        Ok(true)
    }

    // === Reads ===

    /// Effective balance at the current clock reading. Never mutates.
    pub fn balance_of(&self, user: &Address) -> LedgerResult<Amount> {
        self.balance_of_at(user, self.clock.now())
    }

    /// Effective balance at `at`
    pub fn balance_of_at(&self, user: &Address, at: Timestamp) -> LedgerResult<Amount> {
        self.account(user).effective_balance(at)
    }

    /// Stored principal, without unrealized interest
    pub fn principal_balance_of(&self, user: &Address) -> Amount {
        self.account(user).principal
    }

    /// Interest accrued but not yet folded into principal
    pub fn pending_interest_of(&self, user: &Address) -> LedgerResult<Amount> {
        self.account(user).pending_interest(self.clock.now())
    }

    /// Current global interest rate
    pub fn interest_rate(&self) -> Rate {
        self.global_rate
    }

    /// Rate locked in for `user`
    pub fn user_interest_rate(&self, user: &Address) -> Rate {
        self.account(user).interest_rate
    }

    /// Snapshot of the account triple (default for unknown accounts)
    pub fn account(&self, user: &Address) -> AccountState {
        self.accounts.get(user).copied().unwrap_or_default()
    }

    /// Sum of stored principal across all accounts
    pub fn total_principal(&self) -> Amount {
        self.accounts
            .values()
            .fold(Amount::ZERO, |total, acct| {
                total.checked_add(acct.principal).unwrap_or(Amount::ENTIRE_BALANCE)
            })
    }

    /// Number of accounts ever referenced
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// Take the events committed since the last drain
    pub fn drain_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.outbox)
    }

    /// Re-apply committed events, bypassing capability checks.
    ///
    /// Each event runs at its own recorded timestamp. Derived events are
    /// skipped. Returns the number of events applied.
    pub fn replay<'a>(
        &mut self,
        events: impl IntoIterator<Item = &'a LedgerEvent>,
    ) -> LedgerResult<usize> {
        let mut applied = 0;

        for event in events {
            if event.is_derived() {
                continue;
            }

            let mut tx = self.begin_at(event.at());
            match event {
                LedgerEvent::RateChanged { new_rate, .. } => tx.apply_set_rate(*new_rate)?,
                LedgerEvent::Minted {
                    to, amount, rate, ..
                } => tx.apply_mint(to, *amount, *rate)?,
                LedgerEvent::Burned { from, amount, .. } => {
                    tx.apply_burn(from, *amount)?;
                }
                LedgerEvent::Transferred {
                    from, to, amount, ..
                } => {
                    tx.apply_transfer(from, to, *amount)?;
                }
                LedgerEvent::InterestRealized { .. } => {}
            }
            // Replayed changes are already journaled
            tx.events.clear();
            tx.commit();
            applied += 1;
        }

        tracing::debug!(applied, "Ledger replay complete");
        Ok(applied)
    }
}

/// All-or-nothing guard around one top-level call.
///
/// The first time an account (or the global rate) is touched its prior
/// value is recorded. `commit` publishes buffered events; dropping the guard
/// uncommitted restores every recorded value. One clock reading is used for
/// the whole unit of work.
pub struct LedgerTx<'a> {
    ledger: &'a mut Ledger,
    now: Timestamp,
    undo_accounts: HashMap<Address, Option<AccountState>>,
    undo_rate: Option<Rate>,
    events: Vec<LedgerEvent>,
    committed: bool,
}

impl<'a> LedgerTx<'a> {
    /// Global interest rate as seen inside this unit of work
    pub fn interest_rate(&self) -> Rate {
        self.ledger.global_rate
    }

    /// Effective balance at this unit of work's timestamp
    pub fn balance_of(&self, user: &Address) -> LedgerResult<Amount> {
        self.ledger.account(user).effective_balance(self.now)
    }

    /// Stored principal as seen inside this unit of work
    pub fn principal_balance_of(&self, user: &Address) -> Amount {
        self.ledger.account(user).principal
    }

    /// Raise (or keep) the global rate. Owner only.
    pub fn set_rate(&mut self, caller: &Address, new_rate: Rate) -> LedgerResult<()> {
        self.ledger.authorizer.require(caller, Capability::RateOwner)?;
        self.apply_set_rate(new_rate)
    }

    /// Realize, overwrite the locked rate, then credit. Mint/burn role only.
    pub fn mint(
        &mut self,
        caller: &Address,
        to: &Address,
        amount: Amount,
        rate: Rate,
    ) -> LedgerResult<()> {
        self.ledger.authorizer.require(caller, Capability::MintBurn)?;
        self.apply_mint(to, amount, rate)
    }

    /// Realize, then debit. Mint/burn role only.
    pub fn burn(&mut self, caller: &Address, from: &Address, amount: Amount) -> LedgerResult<Amount> {
        self.ledger.authorizer.require(caller, Capability::MintBurn)?;
        self.apply_burn(from, amount)
    }

    /// Realize both sides, then move principal. Returns the amount moved.
    pub fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> LedgerResult<Amount> {
        self.apply_transfer(from, to, amount)
    }

    /// Publish buffered events and keep all changes
    pub fn commit(mut self) {
        self.committed = true;
        let events = std::mem::take(&mut self.events);
        self.ledger.outbox.extend(events);
    }

    fn apply_set_rate(&mut self, new_rate: Rate) -> LedgerResult<()> {
        let current = self.ledger.global_rate;
        if new_rate < current {
            tracing::warn!(current = %current, proposed = %new_rate, "Rejected interest rate decrease");
            return Err(LedgerError::RateDecrease {
                current,
                proposed: new_rate,
            });
        }

        self.undo_rate.get_or_insert(current);
        self.ledger.global_rate = new_rate;
        self.events.push(LedgerEvent::RateChanged {
            new_rate,
            at: self.now,
        });
        Ok(())
    }

    fn apply_mint(&mut self, to: &Address, amount: Amount, rate: Rate) -> LedgerResult<()> {
        self.realize(to)?;

        let account = self.touch(to);
        account.interest_rate = rate;
        account.principal = account
            .principal
            .checked_add(amount)
            .ok_or(LedgerError::Overflow("minting"))?;

        tracing::debug!(to = %to, amount = %amount, rate = %rate, "Mint applied");
        self.events.push(LedgerEvent::Minted {
            to: to.clone(),
            amount,
            rate,
            at: self.now,
        });
        Ok(())
    }

    fn apply_burn(&mut self, from: &Address, amount: Amount) -> LedgerResult<Amount> {
        self.realize(from)?;

        let available = self.ledger.account(from).principal;
        let amount = amount.resolve(available);
        let remaining = available
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::insufficient_balance(from, available, amount))?;
        self.touch(from).principal = remaining;

        tracing::debug!(from = %from, amount = %amount, "Burn applied");
        self.events.push(LedgerEvent::Burned {
            from: from.clone(),
            amount,
            at: self.now,
        });
        Ok(amount)
    }

    fn apply_transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> LedgerResult<Amount> {
        self.realize(from)?;
        self.realize(to)?;

        let sender = self.ledger.account(from);
        let amount = amount.resolve(sender.principal);
        let recipient_was_empty = self.ledger.account(to).principal.is_zero();

        let remaining = sender
            .principal
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::insufficient_balance(from, sender.principal, amount))?;
        self.touch(from).principal = remaining;

        let recipient = self.touch(to);
        if recipient_was_empty {
            // First funding inherits the sender's locked rate
            recipient.interest_rate = sender.interest_rate;
        }
        recipient.principal = recipient
            .principal
            .checked_add(amount)
            .ok_or(LedgerError::Overflow("crediting transfer"))?;

        tracing::debug!(from = %from, to = %to, amount = %amount, "Transfer applied");
        self.events.push(LedgerEvent::Transferred {
            from: from.clone(),
            to: to.clone(),
            amount,
            at: self.now,
        });
        Ok(amount)
    }

    /// Fold `user`'s pending interest into principal
    fn realize(&mut self, user: &Address) -> LedgerResult<Amount> {
        let now = self.now;
        let interest = self.touch(user).realize(now)?;

        if !interest.is_zero() {
            tracing::debug!(account = %user, interest = %interest, "Interest realized");
            self.events.push(LedgerEvent::InterestRealized {
                account: user.clone(),
                amount: interest,
                at: now,
            });
        }
        Ok(interest)
    }

    /// Mutable access to an account, recording its prior state once
    fn touch(&mut self, user: &Address) -> &mut AccountState {
        if !self.undo_accounts.contains_key(user) {
            let prior = self.ledger.accounts.get(user).copied();
            self.undo_accounts.insert(user.clone(), prior);
        }
        self.ledger.accounts.entry(user.clone()).or_default()
    }

    fn rollback(&mut self) {
        for (user, prior) in self.undo_accounts.drain() {
            match prior {
                Some(state) => {
                    self.ledger.accounts.insert(user, state);
                }
                None => {
                    self.ledger.accounts.remove(&user);
                }
            }
        }
        if let Some(rate) = self.undo_rate.take() {
            self.ledger.global_rate = rate;
        }
        self.events.clear();
    }
}

impl Drop for LedgerTx<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.rollback();
        }
    }
}
