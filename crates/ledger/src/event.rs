//! Ledger events
//!
//! Each committed state change is described by one event carrying the
//! timestamp it was applied at, so a journal of events can be replayed
//! into an identical ledger.

use accrue_core::{Address, Amount, Rate, Timestamp};
use serde::{Deserialize, Serialize};

/// Events emitted by the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// The global interest rate changed
    RateChanged { new_rate: Rate, at: Timestamp },

    /// Principal was created for `to`, locking `rate`
    Minted {
        to: Address,
        amount: Amount,
        rate: Rate,
        at: Timestamp,
    },

    /// Principal was destroyed
    Burned {
        from: Address,
        amount: Amount,
        at: Timestamp,
    },

    /// Principal moved between accounts
    Transferred {
        from: Address,
        to: Address,
        amount: Amount,
        at: Timestamp,
    },

    /// Pending interest was folded into principal.
    ///
    /// Derived: replaying the surrounding operation realizes it again.
    InterestRealized {
        account: Address,
        amount: Amount,
        at: Timestamp,
    },
}

impl LedgerEvent {
    /// When the change was applied
    pub fn at(&self) -> Timestamp {
        match self {
            LedgerEvent::RateChanged { at, .. }
            | LedgerEvent::Minted { at, .. }
            | LedgerEvent::Burned { at, .. }
            | LedgerEvent::Transferred { at, .. }
            | LedgerEvent::InterestRealized { at, .. } => *at,
        }
    }

    /// Short name for logs and CLI output
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerEvent::RateChanged { .. } => "rate_changed",
            LedgerEvent::Minted { .. } => "minted",
            LedgerEvent::Burned { .. } => "burned",
            LedgerEvent::Transferred { .. } => "transferred",
            LedgerEvent::InterestRealized { .. } => "interest_realized",
        }
    }

    /// True for informational events that replay skips
    pub fn is_derived(&self) -> bool {
        matches!(self, LedgerEvent::InterestRealized { .. })
    }
}
