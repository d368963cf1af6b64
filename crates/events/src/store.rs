//! Journal writer
//!
//! Records are written in batches, one batch per command. A batch lands in
//! the day file of its first record, in a single write followed by a sync.
//! If anything fails the file is cut back to its previous length, so a batch
//! is either fully on disk or absent.

use crate::error::EventError;
use crate::record::JournalRecord;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only journal directory
pub struct EventStore {
    dir: PathBuf,
}

impl EventStore {
    /// Open (creating if needed) the journal directory
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, EventError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Write all `records` or none of them
    pub fn append_batch(&mut self, records: &[JournalRecord]) -> Result<(), EventError> {
        let Some(first) = records.first() else {
            return Ok(());
        };

        // Encode up front so a serde failure never touches the file
        let mut buf = String::new();
        for record in records {
            buf.push_str(&serde_json::to_string(record)?);
            buf.push('\n');
        }

        let path = self.day_file(first);
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        let committed_len = file.metadata()?.len();

        let written = file
            .write_all(buf.as_bytes())
            .and_then(|()| file.sync_data());
        if let Err(e) = written {
            tracing::warn!(path = %path.display(), error = %e, "Journal write failed, truncating batch");
            // Best effort: the original error is what the caller needs
            let _ = file.set_len(committed_len);
            return Err(e.into());
        }

        tracing::debug!(
            first = first.sequence,
            count = records.len(),
            path = %path.display(),
            "Journal batch appended"
        );
        Ok(())
    }

    fn day_file(&self, record: &JournalRecord) -> PathBuf {
        self.dir
            .join(format!("{}.jsonl", record.recorded_at.format("%Y-%m-%d")))
    }
}
