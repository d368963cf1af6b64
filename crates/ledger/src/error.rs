//! Ledger errors

use crate::auth::Capability;
use accrue_core::{Address, Amount, Rate};
use thiserror::Error;

/// Errors that can occur in ledger operations
///
/// Every error aborts the whole call: no partial state change survives.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("{caller} is not authorized: missing {capability} capability")]
    Unauthorized {
        caller: Address,
        capability: Capability,
    },

    #[error("Interest rate can only increase: current {current}, proposed {proposed}")]
    RateDecrease { current: Rate, proposed: Rate },

    #[error("Insufficient balance for {account}: available {available}, required {required}")]
    InsufficientBalance {
        account: Address,
        available: Amount,
        required: Amount,
    },

    #[error("Arithmetic overflow while {0}")]
    Overflow(&'static str),
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

impl LedgerError {
    /// Create an unauthorized error
    pub fn unauthorized(caller: &Address, capability: Capability) -> Self {
        LedgerError::Unauthorized {
            caller: caller.clone(),
            capability,
        }
    }

    /// Create an insufficient balance error
    pub fn insufficient_balance(account: &Address, available: Amount, required: Amount) -> Self {
        LedgerError::InsufficientBalance {
            account: account.clone(),
            available,
            required,
        }
    }

    /// Check if this is an insufficient balance error
    pub fn is_insufficient_balance(&self) -> bool {
        matches!(self, LedgerError::InsufficientBalance { .. })
    }

    /// Check if this is an authorization failure
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, LedgerError::Unauthorized { .. })
    }
}
