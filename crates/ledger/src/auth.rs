//! Authorization capability consumed by the ledger
//!
//! Role granting lives outside the ledger. The ledger only asks two
//! questions, through the `Authorizer` trait, before gated operations.

use crate::error::{LedgerError, LedgerResult};
use accrue_core::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::{PoisonError, RwLock};
use strum_macros::{Display, EnumString};

/// Capabilities checked by the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// May mint and burn on behalf of any account
    MintBurn,
    /// May change the global interest rate
    RateOwner,
}

/// Answers capability questions for the ledger
pub trait Authorizer: Send + Sync {
    /// Is `caller` permitted to mint and burn?
    fn has_mint_burn_role(&self, caller: &Address) -> bool;

    /// Is `caller` the rate-setting owner?
    fn is_rate_owner(&self, caller: &Address) -> bool;

    /// Check a capability, turning a refusal into `LedgerError::Unauthorized`
    fn require(&self, caller: &Address, capability: Capability) -> LedgerResult<()> {
        let allowed = match capability {
            Capability::MintBurn => self.has_mint_burn_role(caller),
            Capability::RateOwner => self.is_rate_owner(caller),
        };

        if allowed {
            Ok(())
        } else {
            tracing::warn!(caller = %caller, capability = %capability, "Capability check failed");
            Err(LedgerError::unauthorized(caller, capability))
        }
    }
}

/// In-memory role table: one owner plus a set of mint/burn holders
///
/// Only the owner may grant the mint/burn role.
#[derive(Debug)]
pub struct RoleRegistry {
    owner: Address,
    mint_burn: RwLock<BTreeSet<Address>>,
}

impl RoleRegistry {
    /// Create a registry owned by `owner` with no role holders
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            mint_burn: RwLock::new(BTreeSet::new()),
        }
    }

    /// The rate-setting owner
    pub fn owner(&self) -> &Address {
        &self.owner
    }

    /// Grant the mint/burn role to `account`
    pub fn grant_mint_and_burn_role(&self, caller: &Address, account: Address) -> LedgerResult<()> {
        self.require(caller, Capability::RateOwner)?;

        let mut holders = self.mint_burn.write().unwrap_or_else(PoisonError::into_inner);
        if holders.insert(account.clone()) {
            tracing::info!(account = %account, "Granted mint/burn role");
        }
        Ok(())
    }

    /// Current mint/burn holders, sorted
    pub fn holders(&self) -> Vec<Address> {
        self.mint_burn
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }
}

impl Authorizer for RoleRegistry {
    fn has_mint_burn_role(&self, caller: &Address) -> bool {
        self.mint_burn
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(caller)
    }

    fn is_rate_owner(&self, caller: &Address) -> bool {
        *caller == self.owner
    }
}
