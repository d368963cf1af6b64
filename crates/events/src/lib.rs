//! Accrue Events - Hash-chained JSONL journal
//!
//! Every committed ledger or vault event is appended as one `JournalRecord`.
//! The journal is the source of truth: ledger and vault state are rebuilt
//! from it by replay.

pub mod error;
pub mod hash;
pub mod reader;
pub mod record;
pub mod store;

pub use error::EventError;
pub use hash::{calculate_record_hash, verify_chain, ChainError};
pub use reader::EventReader;
pub use record::{Event, JournalRecord, GENESIS_HASH};
pub use store::EventStore;
