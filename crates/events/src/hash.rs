//! Hash chain over journal records

use crate::record::{JournalRecord, GENESIS_HASH};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// SHA-256 of a record's content, excluding the `hash` field itself.
///
/// The event contributes its JSON encoding, the same bytes the journal stores.
pub fn calculate_record_hash(record: &JournalRecord) -> Result<String, serde_json::Error> {
    let mut hasher = Sha256::new();

    hasher.update(record.sequence.to_le_bytes());
    hasher.update(record.prev_hash.as_bytes());
    hasher.update(record.recorded_at.to_rfc3339().as_bytes());
    hasher.update(record.correlation_id.as_bytes());
    hasher.update(serde_json::to_vec(&record.event)?);

    Ok(hex::encode(hasher.finalize()))
}

/// Errors in hash chain verification
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("Broken link at seq {sequence}: expected prev_hash '{expected}', got '{actual}'")]
    BrokenLink {
        sequence: u64,
        expected: String,
        actual: String,
    },

    #[error("Invalid hash at seq {sequence}: expected '{expected}', got '{actual}'")]
    InvalidHash {
        sequence: u64,
        expected: String,
        actual: String,
    },

    #[error("Invalid sequence: expected {expected}, got {actual}")]
    InvalidSequence { expected: u64, actual: u64 },

    #[error("Cannot encode event at seq {sequence}: {reason}")]
    Unencodable { sequence: u64, reason: String },
}

/// Check links, hashes and sequence numbers of the whole journal
pub fn verify_chain(records: &[JournalRecord]) -> Result<(), ChainError> {
    let mut prev_hash = GENESIS_HASH.to_string();
    let mut expected_sequence = 1;

    for record in records {
        if record.sequence != expected_sequence {
            return Err(ChainError::InvalidSequence {
                expected: expected_sequence,
                actual: record.sequence,
            });
        }

        if record.prev_hash != prev_hash {
            return Err(ChainError::BrokenLink {
                sequence: record.sequence,
                expected: prev_hash,
                actual: record.prev_hash.clone(),
            });
        }

        let calculated =
            calculate_record_hash(record).map_err(|e| ChainError::Unencodable {
                sequence: record.sequence,
                reason: e.to_string(),
            })?;
        if record.hash != calculated {
            return Err(ChainError::InvalidHash {
                sequence: record.sequence,
                expected: calculated,
                actual: record.hash.clone(),
            });
        }

        prev_hash = record.hash.clone();
        expected_sequence += 1;
    }

    Ok(())
}
