//! Durable key-value persistence.
//!
//! [`KeyValueStore`] is the process-wide durable medium: named slots holding
//! serialized values. [`PersistentStore`] layers typed, fail-soft `load` and
//! `save` on top of it.

mod memory;
mod sqlite;

pub use memory::MemoryKvStore;
pub use sqlite::SqliteKvStore;

use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::metrics::STORAGE_FAILURES;

/// Errors from the durable medium.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing store could not be read or written.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// A slot holds a value that does not decode as the requested type.
    #[error("Stored value for '{key}' is corrupt: {message}")]
    Corrupt { key: String, message: String },

    /// A value could not be encoded for storage.
    #[error("Failed to serialize value: {0}")]
    Serialization(String),
}

/// Named slots of serialized text.
pub trait KeyValueStore: Send + Sync {
    /// Read a slot. `Ok(None)` when it was never written.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace a slot's contents.
    fn put(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Typed access to a [`KeyValueStore`].
///
/// Values are stored as JSON. `load` and `save` never fail from the caller's
/// point of view: problems are logged and counted, `load` falls back to the
/// type's default and `save` leaves the in-memory state authoritative.
#[derive(Clone)]
pub struct PersistentStore {
    backend: Arc<dyn KeyValueStore>,
}

impl PersistentStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Store backed by a fresh [`MemoryKvStore`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryKvStore::new()))
    }

    /// Open the SQLite store at `path`.
    ///
    /// A file that cannot be opened or is not a database degrades to an
    /// in-memory store: the session starts with empty slots and nothing
    /// outlives the process.
    pub fn open_sqlite(path: &Path) -> Self {
        match SqliteKvStore::new(path) {
            Ok(backend) => Self::new(Arc::new(backend)),
            Err(e) => {
                warn!(
                    "Failed to open storage at {:?}, continuing without persistence: {}",
                    path, e
                );
                STORAGE_FAILURES.with_label_values(&["open"]).inc();
                Self::in_memory()
            }
        }
    }

    /// Read and decode a slot. `Ok(None)` when the slot is empty.
    pub fn try_load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let Some(raw) = self.backend.get(key)? else {
            return Ok(None);
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StorageError::Corrupt {
                key: key.to_string(),
                message: e.to_string(),
            })
    }

    /// Encode and write a slot.
    pub fn try_save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw =
            serde_json::to_string(value).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.backend.put(key, &raw)
    }

    /// Read a slot, falling back to `T::default()` when it is missing,
    /// unreadable or corrupt.
    pub fn load<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.try_load(key) {
            Ok(Some(value)) => value,
            Ok(None) => T::default(),
            Err(e) => {
                warn!("Failed to load '{}', using default: {}", key, e);
                STORAGE_FAILURES.with_label_values(&["load"]).inc();
                T::default()
            }
        }
    }

    /// Write a slot. Failures are logged and otherwise ignored.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        if let Err(e) = self.try_save(key, value) {
            warn!("Failed to save '{}': {}", key, e);
            STORAGE_FAILURES.with_label_values(&["save"]).inc();
        }
    }
}

impl std::fmt::Debug for PersistentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentStore").finish_non_exhaustive()
    }
}
