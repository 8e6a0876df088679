//! Durable key/value stores that survive process restarts.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// What: Minimal persistence seam for cached records.
///
/// Details:
/// - Values are opaque strings (JSON in practice); the store knows nothing about expiry.
/// - `save` replaces the whole record. Implementations must never expose a partially
///   written value to a concurrent `load`.
pub trait DurableStore: Send + Sync {
    /// Read the record stored under `key`, `Ok(None)` when there is none.
    ///
    /// # Errors
    /// - Underlying I/O failures other than "not found".
    fn load(&self, key: &str) -> io::Result<Option<String>>;

    /// Replace the record stored under `key`.
    ///
    /// # Errors
    /// - Underlying I/O failures.
    fn save(&self, key: &str, value: &str) -> io::Result<()>;

    /// Delete the record stored under `key`; deleting a missing record succeeds.
    ///
    /// # Errors
    /// - Underlying I/O failures other than "not found".
    fn remove(&self, key: &str) -> io::Result<()>;
}

/// What: One JSON file per key inside a directory.
///
/// Details:
/// - Keys are sanitized to `[A-Za-z0-9_-]` before becoming file names.
/// - Each write goes to its own uniquely named temp file in the same directory and is
///   renamed into place, so a reader sees either the old record or the new one, even
///   with several writers racing.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    /// Directory holding the records.
    dir: PathBuf,
}

impl JsonFileStore {
    /// Store records under `dir` (created lazily on first write).
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the records.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// What: File backing `key`.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }
}

impl DurableStore for JsonFileStore {
    fn load(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn save(&self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| e.error)?;
        tracing::debug!(path = %path.display(), bytes = value.len(), "saved durable record");
        Ok(())
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// What: Process-local store for tests and callers without a writable disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Records by key.
    records: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// `true` when nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DurableStore for MemoryStore {
    fn load(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self
            .records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn save(&self, key: &str, value: &str) -> io::Result<()> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}
