//! Accrue Vault - Custody of backing asset against ledger balances
//!
//! # Key Types
//! - `Vault`: Backing asset pool bound to one `Ledger`
//! - `PayoutRail`: Host mechanism that delivers backing asset to a recipient
//! - `InMemoryRail`: Recording rail with configurable rejecting recipients
//! - `VaultEvent`: Deposit, redeem and rewards inflows

pub mod custody;
pub mod error;
pub mod event;
pub mod vault;

pub use custody::{InMemoryRail, PayoutRail};
pub use error::{PayoutError, VaultError, VaultResult};
pub use event::VaultEvent;
pub use vault::Vault;
