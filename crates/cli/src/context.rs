//! Application context - wires everything together

use crate::config::AppConfig;
use accrue_core::{Clock, Rate};
use accrue_events::{Event, EventError, EventReader, EventStore, JournalRecord, GENESIS_HASH};
use accrue_ledger::{Ledger, LedgerEvent, RoleRegistry};
use accrue_vault::{InMemoryRail, Vault, VaultEvent};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Application context - wires together all components
pub struct AppContext {
    pub config: AppConfig,
    pub ledger: Ledger,
    pub vault: Vault,
    pub roles: Arc<RoleRegistry>,
    pub rail: Arc<InMemoryRail>,
    event_store: EventStore,
    journal_path: PathBuf,
    last_sequence: u64,
    last_hash: String,
}

impl AppContext {
    /// Open the journal under `data_path` and rebuild state by replaying it
    pub fn new(
        data_path: impl AsRef<Path>,
        config: AppConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, anyhow::Error> {
        let journal_path = data_path.as_ref().join("journal");
        std::fs::create_dir_all(&journal_path)?;
        let event_store = EventStore::new(&journal_path)?;

        // Roles come from configuration, not from the journal
        let roles = Arc::new(RoleRegistry::new(config.owner.clone()));
        roles.grant_mint_and_burn_role(&config.owner, config.vault_address.clone())?;
        for minter in &config.minters {
            roles.grant_mint_and_burn_role(&config.owner, minter.clone())?;
        }

        let rail = Arc::new(InMemoryRail::with_rejecting(
            config.rejecting_payees.iter().cloned(),
        ));

        // The global rate starts at zero; `init` journals the first rate
        let mut ledger = Ledger::new(
            config.ledger_address.clone(),
            Rate::ZERO,
            roles.clone(),
            clock,
        );
        let mut vault = Vault::new(
            config.vault_address.clone(),
            config.ledger_address.clone(),
            rail.clone(),
        );

        let reader = EventReader::from_directory(&journal_path)?;
        let records = reader.read_all()?;

        let (last_sequence, last_hash) = match records.last() {
            Some(last) => (last.sequence, last.hash.clone()),
            None => (0, GENESIS_HASH.to_string()),
        };

        let mut ledger_events: Vec<&LedgerEvent> = Vec::new();
        let mut vault_events: Vec<&VaultEvent> = Vec::new();
        for record in &records {
            match &record.event {
                Event::Ledger(e) => ledger_events.push(e),
                Event::Vault(e) => vault_events.push(e),
            }
        }
        ledger.replay(ledger_events)?;
        vault.replay(vault_events)?;

        tracing::info!(records = records.len(), last_sequence, "Journal replayed");

        Ok(Self {
            config,
            ledger,
            vault,
            roles,
            rail,
            event_store,
            journal_path,
            last_sequence,
            last_hash,
        })
    }

    /// Run one state-changing operation and journal what it emitted.
    ///
    /// Ledger and vault are snapshotted first. The operation's events become
    /// one journal batch, ledger events ahead of vault events, all under
    /// `correlation_id`. If the operation or the batch write fails, both are
    /// restored, so memory never runs ahead of disk. Payouts already made
    /// through the rail are not recalled.
    pub fn execute<T>(
        &mut self,
        correlation_id: &str,
        op: impl FnOnce(&mut Ledger, &mut Vault) -> Result<T, anyhow::Error>,
    ) -> Result<(T, Vec<JournalRecord>), anyhow::Error> {
        let ledger_snapshot = self.ledger.clone();
        let vault_snapshot = self.vault.clone();

        match self.apply(correlation_id, op) {
            Ok(done) => Ok(done),
            Err(e) => {
                self.ledger = ledger_snapshot;
                self.vault = vault_snapshot;
                tracing::debug!(correlation_id, error = %e, "Operation rolled back");
                Err(e)
            }
        }
    }

    fn apply<T>(
        &mut self,
        correlation_id: &str,
        op: impl FnOnce(&mut Ledger, &mut Vault) -> Result<T, anyhow::Error>,
    ) -> Result<(T, Vec<JournalRecord>), anyhow::Error> {
        let value = op(&mut self.ledger, &mut self.vault)?;
        let records = self.stage(correlation_id)?;
        self.event_store
            .append_batch(&records)
            .map_err(CommitError::from)?;

        if let Some(last) = records.last() {
            self.last_sequence = last.sequence;
            self.last_hash = last.hash.clone();
        }
        Ok((value, records))
    }

    /// Chain the drained events onto the journal head without writing them
    fn stage(&mut self, correlation_id: &str) -> Result<Vec<JournalRecord>, CommitError> {
        let events = self
            .ledger
            .drain_events()
            .into_iter()
            .map(Event::from)
            .chain(self.vault.drain_events().into_iter().map(Event::from));

        let mut records: Vec<JournalRecord> = Vec::new();
        for event in events {
            let (sequence, prev_hash) = match records.last() {
                Some(prev) => (prev.sequence + 1, prev.hash.clone()),
                None => (self.last_sequence + 1, self.last_hash.clone()),
            };
            records.push(JournalRecord::new(sequence, prev_hash, correlation_id, event)?);
        }
        Ok(records)
    }

    /// Fail unless `init` has run
    pub fn ensure_initialized(&self) -> Result<(), CommitError> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(CommitError::NotInitialized)
        }
    }

    /// Get journal path
    pub fn journal_path(&self) -> &Path {
        &self.journal_path
    }

    /// Check if system is initialized (has a journaled rate)
    pub fn is_initialized(&self) -> bool {
        self.last_sequence > 0
    }

    /// Get last sequence number
    pub fn last_sequence(&self) -> u64 {
        self.last_sequence
    }
}

/// Errors while journaling an operation
#[derive(Debug, thiserror::Error)]
pub enum CommitError {
    #[error("System not initialized, run `accrue init` first")]
    NotInitialized,

    #[error("Event store error: {0}")]
    Event(#[from] EventError),
}
