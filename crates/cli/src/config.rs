//! Deployment configuration
//!
//! Every field has a default, so a partial JSON file (or none at all) works.

use accrue_core::{Address, Rate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Identities, roles and starting parameters for one deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Identity of the ledger
    #[serde(default = "default_ledger_address")]
    pub ledger_address: Address,

    /// Identity of the vault; always granted the mint/burn role
    #[serde(default = "default_vault_address")]
    pub vault_address: Address,

    /// Rate owner, the only one who may grant roles or change the rate
    #[serde(default = "default_owner")]
    pub owner: Address,

    /// Additional mint/burn role holders
    #[serde(default)]
    pub minters: Vec<Address>,

    /// Global rate set by `init` when none is given on the command line
    #[serde(default)]
    pub initial_rate: Rate,

    /// Recipients whose payouts the in-memory rail rejects
    #[serde(default)]
    pub rejecting_payees: Vec<Address>,
}

fn well_known(name: &str) -> Address {
    Address::new(name).unwrap_or_else(|_| unreachable!("{name} is a valid address"))
}

fn default_ledger_address() -> Address {
    well_known("LEDGER")
}

fn default_vault_address() -> Address {
    well_known("VAULT")
}

fn default_owner() -> Address {
    well_known("OWNER")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ledger_address: default_ledger_address(),
            vault_address: default_vault_address(),
            owner: default_owner(),
            minters: Vec::new(),
            initial_rate: Rate::ZERO,
            rejecting_payees: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}
