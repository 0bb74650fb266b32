//! Key-value persistence for the event log.
//!
//! The whole log lives under a single key as a JSON array. Loading fails
//! open: a missing or unreadable blob is treated as an empty log.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::records::EventLog;

/// Key under which the serialized log is stored.
pub const LOG_KEY: &str = "log";

/// Errors that can occur while reading or writing the store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Invalid key '{0}'")]
    InvalidKey(String),
}

/// Minimal string key-value store.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

// ==================== File Store ====================

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;
        fs::write(&path, value).map_err(|source| StoreError::Io { path, source })
    }
}

// ==================== Memory Store ====================

/// In-memory store for tests and throwaway sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with a raw value.
    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        store
            .entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        store
    }

    /// Raw value currently stored under `key`.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ==================== Log Store ====================

/// Loads and saves the [`EventLog`] through a [`KeyValueStore`].
#[derive(Clone)]
pub struct LogStore {
    backend: Arc<dyn KeyValueStore>,
}

impl LogStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Read the persisted log. Missing or corrupt data yields an empty log.
    pub fn load(&self) -> EventLog {
        let raw = match self.backend.get(LOG_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!("No persisted log found, starting empty");
                return EventLog::new();
            }
            Err(e) => {
                tracing::warn!("Failed to read persisted log, starting empty: {}", e);
                return EventLog::new();
            }
        };

        match Self::decode(&raw) {
            Ok(log) => {
                tracing::debug!("Loaded {} records", log.len());
                log
            }
            Err(e) => {
                tracing::warn!("Persisted log is corrupt, starting empty: {}", e);
                EventLog::new()
            }
        }
    }

    /// Serialize the full log and overwrite the stored copy.
    pub fn save(&self, log: &EventLog) -> Result<(), StoreError> {
        let raw = serde_json::to_string(log)?;
        self.backend.set(LOG_KEY, &raw)
    }

    fn decode(raw: &str) -> Result<EventLog, serde_json::Error> {
        // Older blobs may hold duplicate dates; `EventLog` collapses them.
        serde_json::from_str(raw)
    }
}

impl std::fmt::Debug for LogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogStore").finish_non_exhaustive()
    }
}
