//! Typed handle on one collection file
//!
//! Each repository owns a `JsonFile<T>` for its document (`users.json`,
//! `expenses.json`, ...). Writes go to a sibling `.tmp` file that is synced
//! and renamed over the target, so a crash leaves either the old document or
//! the new one. A `.tmp` left behind by an interrupted write is discarded on
//! the next load.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::SpendError;

pub struct JsonFile<T> {
    path: PathBuf,
    _doc: PhantomData<fn() -> T>,
}

impl<T> JsonFile<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _doc: PhantomData,
        }
    }

    /// Read the document; a missing file is an empty collection
    pub fn load(&self) -> Result<T, SpendError> {
        self.discard_stale_temp()?;

        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(T::default()),
            Err(e) => return Err(self.error("open", e)),
        };

        serde_json::from_reader(BufReader::new(file)).map_err(|e| self.error("parse", e))
    }

    /// Replace the document atomically
    pub fn store(&self, doc: &T) -> Result<(), SpendError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| self.error("create directory for", e))?;
        }

        let temp = self.temp_path();
        let written = Self::write_synced(&temp, doc);
        let result = written.and_then(|()| fs::rename(&temp, &self.path).map_err(Into::into));

        result.map_err(|e| {
            let _ = fs::remove_file(&temp);
            self.error("write", e)
        })
    }

    fn write_synced(temp: &Path, doc: &T) -> Result<(), Box<dyn std::error::Error>> {
        let mut writer = BufWriter::new(File::create(temp)?);
        serde_json::to_writer_pretty(&mut writer, doc)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        Ok(())
    }

    fn discard_stale_temp(&self) -> Result<(), SpendError> {
        match fs::remove_file(self.temp_path()) {
            Ok(()) => {
                tracing::warn!(file = %self.path.display(), "discarded interrupted write");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.error("clean up", e)),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn error(&self, action: &str, e: impl std::fmt::Display) -> SpendError {
        SpendError::Storage(format!("Failed to {} {}: {}", action, self.path.display(), e))
    }
}
