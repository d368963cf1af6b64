//! Journal record

use crate::error::EventError;
use crate::hash::calculate_record_hash;
use accrue_ledger::LedgerEvent;
use accrue_vault::VaultEvent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `prev_hash` of the first record
pub const GENESIS_HASH: &str = "GENESIS";

/// Anything that can be journaled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    Ledger(LedgerEvent),
    Vault(VaultEvent),
}

impl Event {
    /// Short name for logs and CLI output
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Ledger(e) => e.kind(),
            Event::Vault(e) => e.kind(),
        }
    }
}

impl From<LedgerEvent> for Event {
    fn from(event: LedgerEvent) -> Self {
        Event::Ledger(event)
    }
}

impl From<VaultEvent> for Event {
    fn from(event: VaultEvent) -> Self {
        Event::Vault(event)
    }
}

/// One line of the journal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalRecord {
    /// 1-based, strictly increasing
    pub sequence: u64,
    /// Hash of the previous record, or `GENESIS_HASH`
    pub prev_hash: String,
    /// SHA-256 over every other field
    pub hash: String,
    /// Wall-clock time the record was written
    pub recorded_at: DateTime<Utc>,
    /// Shared by all records produced by one command
    pub correlation_id: String,
    pub event: Event,
}

impl JournalRecord {
    /// Build a sealed record chained onto `prev_hash`
    pub fn new(
        sequence: u64,
        prev_hash: impl Into<String>,
        correlation_id: impl Into<String>,
        event: impl Into<Event>,
    ) -> Result<Self, EventError> {
        let mut record = Self {
            sequence,
            prev_hash: prev_hash.into(),
            hash: String::new(),
            recorded_at: Utc::now(),
            correlation_id: correlation_id.into(),
            event: event.into(),
        };
        record.hash = calculate_record_hash(&record)?;
        Ok(record)
    }
}
