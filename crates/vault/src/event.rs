//! Vault events

use accrue_core::{Address, Amount};
use serde::{Deserialize, Serialize};

/// Events emitted by the vault
///
/// Replaying them reproduces the pool balance. The matching ledger effects
/// are journaled separately as ledger events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VaultEvent {
    /// Backing asset taken into custody, ledger balance minted
    Deposit { user: Address, amount: Amount },

    /// Ledger balance burned, backing asset paid out
    Redeem { user: Address, amount: Amount },

    /// Unattributed inflow into the pool
    RewardsReceived { from: Address, amount: Amount },
}

impl VaultEvent {
    /// Short name for logs and CLI output
    pub fn kind(&self) -> &'static str {
        match self {
            VaultEvent::Deposit { .. } => "deposit",
            VaultEvent::Redeem { .. } => "redeem",
            VaultEvent::RewardsReceived { .. } => "rewards_received",
        }
    }

    pub fn amount(&self) -> Amount {
        match self {
            VaultEvent::Deposit { amount, .. }
            | VaultEvent::Redeem { amount, .. }
            | VaultEvent::RewardsReceived { amount, .. } => *amount,
        }
    }
}
