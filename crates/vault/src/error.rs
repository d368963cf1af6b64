//! Vault error types

use accrue_core::{Address, Amount};
use accrue_ledger::LedgerError;
use thiserror::Error;

/// Failures of the payout rail
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PayoutError {
    /// The recipient refused the transfer
    #[error("Payout rejected by recipient {recipient}")]
    Rejected { recipient: Address },

    /// The pool cannot cover the payout
    #[error("Insufficient liquidity: pool holds {available}, payout needs {required}")]
    InsufficientLiquidity { available: Amount, required: Amount },
}

/// Vault-related errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VaultError {
    /// Redemption of nothing
    #[error("Amount must be greater than zero")]
    ZeroAmount,

    /// `Amount::ENTIRE_BALANCE` where a concrete quantity of backing asset is needed
    #[error("Entire-balance sentinel is not a concrete amount")]
    UnboundedAmount,

    #[error("Payout failed: {0}")]
    Payout(#[from] PayoutError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// The ledger passed in is not the one this vault is bound to
    #[error("Ledger mismatch: vault is bound to {expected}, got {actual}")]
    LedgerMismatch { expected: Address, actual: Address },

    #[error("Arithmetic overflow while {0}")]
    Overflow(&'static str),
}

/// Result type for vault operations
pub type VaultResult<T> = Result<T, VaultError>;

impl VaultError {
    /// Check if the payout step failed
    pub fn is_payout_failure(&self) -> bool {
        matches!(self, VaultError::Payout(_))
    }

    /// Check if the ledger refused for lack of balance
    pub fn is_insufficient_balance(&self) -> bool {
        matches!(self, VaultError::Ledger(e) if e.is_insufficient_balance())
    }
}
