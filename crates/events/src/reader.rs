//! JSONL journal reader - sequential reader for replay

use crate::error::EventError;
use crate::record::JournalRecord;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Reads journal files in date order
pub struct EventReader {
    files: Vec<PathBuf>,
}

impl EventReader {
    /// Collect the journal files of a directory; a missing directory is empty
    pub fn from_directory(path: impl AsRef<Path>) -> Result<Self, EventError> {
        let path = path.as_ref();
        let mut files = Vec::new();

        if path.exists() {
            for entry in std::fs::read_dir(path)? {
                let file_path = entry?.path();
                if file_path.extension().is_some_and(|ext| ext == "jsonl") {
                    files.push(file_path);
                }
            }
        }

        // YYYY-MM-DD names sort chronologically
        files.sort();

        Ok(Self { files })
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Read every record from every file, in order
    pub fn read_all(&self) -> Result<Vec<JournalRecord>, EventError> {
        let mut records = Vec::new();
        for file_path in &self.files {
            read_file(file_path, &mut records)?;
        }
        Ok(records)
    }

    /// The newest record, used to continue the chain
    pub fn last_record(&self) -> Result<Option<JournalRecord>, EventError> {
        for file_path in self.files.iter().rev() {
            let mut records = Vec::new();
            read_file(file_path, &mut records)?;
            if let Some(last) = records.pop() {
                return Ok(Some(last));
            }
        }
        Ok(None)
    }

    /// Sequence number of the newest record
    pub fn last_sequence(&self) -> Result<Option<u64>, EventError> {
        Ok(self.last_record()?.map(|r| r.sequence))
    }

    /// Count records across all files
    pub fn count(&self) -> Result<usize, EventError> {
        let mut count = 0;

        for file_path in &self.files {
            let reader = BufReader::new(File::open(file_path)?);
            for line in reader.lines() {
                if !line?.trim().is_empty() {
                    count += 1;
                }
            }
        }

        Ok(count)
    }
}

fn read_file(path: &Path, records: &mut Vec<JournalRecord>) -> Result<(), EventError> {
    let reader = BufReader::new(File::open(path)?);

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|e| EventError::InvalidFile {
            path: path.display().to_string(),
            line: index + 1,
            reason: e.to_string(),
        })?;
        records.push(record);
    }

    Ok(())
}
