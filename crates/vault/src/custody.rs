//! Payout rail
//!
//! How backing asset physically reaches a recipient is up to the host.
//! The vault only needs `PayoutRail::pay` to either deliver in full or fail.

use crate::error::PayoutError;
use accrue_core::{Address, Amount};
use std::collections::{BTreeSet, HashMap};
use std::sync::{PoisonError, RwLock};

/// Delivers backing asset out of custody
pub trait PayoutRail: Send + Sync {
    /// Send `amount` to `recipient`, all or nothing
    fn pay(&self, recipient: &Address, amount: Amount) -> Result<(), PayoutError>;
}

/// In-memory rail for tests and the CLI
///
/// Records what each recipient received. Recipients can be marked as
/// rejecting, which makes every payout to them fail.
#[derive(Debug, Default)]
pub struct InMemoryRail {
    delivered: RwLock<HashMap<Address, Amount>>,
    rejecting: RwLock<BTreeSet<Address>>,
}

impl InMemoryRail {
    /// Create a rail that accepts every recipient
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a rail that rejects the given recipients
    pub fn with_rejecting(recipients: impl IntoIterator<Item = Address>) -> Self {
        let rail = Self::new();
        for recipient in recipients {
            rail.reject(recipient);
        }
        rail
    }

    /// Make payouts to `recipient` fail
    pub fn reject(&self, recipient: Address) {
        self.rejecting
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(recipient);
    }

    /// Total delivered to `recipient` so far
    pub fn received(&self, recipient: &Address) -> Amount {
        self.delivered
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(recipient)
            .copied()
            .unwrap_or(Amount::ZERO)
    }
}

impl PayoutRail for InMemoryRail {
    fn pay(&self, recipient: &Address, amount: Amount) -> Result<(), PayoutError> {
        let rejected = self
            .rejecting
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(recipient);
        if rejected {
            return Err(PayoutError::Rejected {
                recipient: recipient.clone(),
            });
        }

        let mut delivered = self.delivered.write().unwrap_or_else(PoisonError::into_inner);
        let total = delivered.entry(recipient.clone()).or_default();
        // Saturate: this is a bookkeeping mirror, the vault already bounds payouts
        *total = total.checked_add(amount).unwrap_or(Amount::ENTIRE_BALANCE);
        Ok(())
    }
}
