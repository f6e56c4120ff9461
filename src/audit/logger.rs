//! Append-only JSONL audit logger

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::{SpendError, SpendResult};
use crate::models::UserId;

use super::entry::AuditEntry;

/// Writes audit entries, one JSON object per line
pub struct AuditLogger {
    log_path: PathBuf,
    /// Serializes appends from concurrent requests
    write_guard: Mutex<()>,
}

impl AuditLogger {
    pub fn new(log_path: PathBuf) -> Self {
        Self {
            log_path,
            write_guard: Mutex::new(()),
        }
    }

    /// Append an entry and flush it
    pub fn log(&self, entry: &AuditEntry) -> SpendResult<()> {
        let line = serde_json::to_string(entry)
            .map_err(|e| SpendError::Json(format!("Failed to serialize audit entry: {}", e)))?;

        let _guard = self
            .write_guard
            .lock()
            .map_err(|e| SpendError::Storage(format!("Audit log lock poisoned: {}", e)))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| SpendError::Io(format!("Failed to open audit log: {}", e)))?;

        writeln!(file, "{}", line)
            .and_then(|_| file.flush())
            .map_err(|e| SpendError::Io(format!("Failed to write audit entry: {}", e)))
    }

    /// Read every entry, oldest first
    pub fn read_all(&self) -> SpendResult<Vec<AuditEntry>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.log_path)
            .map_err(|e| SpendError::Io(format!("Failed to open audit log: {}", e)))?;

        let mut entries = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| {
                SpendError::Io(format!("Failed to read audit log line {}: {}", index + 1, e))
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let entry = serde_json::from_str(&line).map_err(|e| {
                SpendError::Json(format!(
                    "Failed to parse audit entry at line {}: {}",
                    index + 1,
                    e
                ))
            })?;
            entries.push(entry);
        }

        Ok(entries)
    }

    /// The most recent `count` entries recorded for a user, oldest first
    pub fn read_recent_for(&self, actor: UserId, count: usize) -> SpendResult<Vec<AuditEntry>> {
        let mine: Vec<_> = self
            .read_all()?
            .into_iter()
            .filter(|e| e.actor == Some(actor))
            .collect();
        let start = mine.len().saturating_sub(count);
        Ok(mine[start..].to_vec())
    }

    pub fn path(&self) -> &PathBuf {
        &self.log_path
    }
}
