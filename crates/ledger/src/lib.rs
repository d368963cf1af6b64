//! Accrue Ledger - Interest-accruing principal accounts
//!
//! This is the HEART of Accrue. Every balance change goes through this crate.
//!
//! # Key Types
//! - `Ledger`: Account table plus the global interest rate
//! - `LedgerTx`: All-or-nothing guard around one top-level call
//! - `AccountState`: Principal, locked rate and last realization time
//! - `Authorizer`: Capability checks consumed before mint, burn and rate changes
//! - `LedgerEvent`: Committed state changes, replayable

pub mod account;
pub mod auth;
pub mod error;
pub mod event;
pub mod ledger;

pub use account::AccountState;
pub use auth::{Authorizer, Capability, RoleRegistry};
pub use error::{LedgerError, LedgerResult};
pub use event::LedgerEvent;
pub use ledger::{Ledger, LedgerTx};
