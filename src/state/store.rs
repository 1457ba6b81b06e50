/// JSON key-value store adapter
///
/// Every collection in the app persists through a `Store`, which wraps an
/// injected `KeyValueBackend`. Listing never fails: an absent key, a backend
/// error or malformed JSON all decode to an empty list. Read-modify-write
/// helpers propagate backend errors instead. Writes are synchronous and
/// overwrite the previous value.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::StoreError;

/// Raw string storage keyed by string
pub trait KeyValueBackend: Send + Sync {
    /// Fetch the raw value stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any prior value
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Process-local backend used by tests and as the degraded fallback
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Cheaply clonable handle to the JSON store
#[derive(Clone)]
pub struct Store {
    backend: Arc<dyn KeyValueBackend>,
}

impl Store {
    pub fn new(backend: Arc<dyn KeyValueBackend>) -> Self {
        Self { backend }
    }

    /// Store backed by a fresh `MemoryBackend`
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    /// Read the list stored under `key`.
    ///
    /// Absent keys, backend errors and undecodable values yield an empty list.
    /// Use this for display only; read-modify-write goes through `try_read`.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        self.try_read(key).unwrap_or_else(|e| {
            tracing::warn!(key, error = %e, "store read failed, treating as empty");
            Vec::new()
        })
    }

    /// Read the list stored under `key`, propagating backend errors.
    ///
    /// Only malformed data degrades to an empty list, so a failed read never
    /// becomes the base of a write.
    pub(crate) fn try_read<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, StoreError> {
        let raw = match self.backend.get(key)? {
            Some(raw) => raw,
            None => return Ok(Vec::new()),
        };

        match serde_json::from_str(&raw) {
            Ok(items) => Ok(items),
            Err(e) => {
                tracing::warn!(key, error = %e, "malformed list in store, treating as empty");
                Ok(Vec::new())
            }
        }
    }

    /// Serialize `items` and persist them under `key`
    pub fn write<T: Serialize>(&self, key: &str, items: &[T]) -> Result<(), StoreError> {
        let json = serde_json::to_string(items).map_err(|source| StoreError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.backend.set(key, &json)?;
        tracing::debug!(key, len = items.len(), "list written");
        Ok(())
    }

    /// Insert `item` at the front of the list under `key`, keeping at most `cap` entries.
    ///
    /// Returns the list as written.
    pub fn prepend<T>(&self, key: &str, item: T, cap: Option<usize>) -> Result<Vec<T>, StoreError>
    where
        T: Serialize + DeserializeOwned,
    {
        let mut items: Vec<T> = self.try_read(key)?;
        items.insert(0, item);
        if let Some(cap) = cap {
            items.truncate(cap);
        }
        self.write(key, &items)?;
        Ok(items)
    }

    /// Append `item` at the end of the list under `key`
    pub fn append<T>(&self, key: &str, item: T) -> Result<Vec<T>, StoreError>
    where
        T: Serialize + DeserializeOwned,
    {
        let mut items: Vec<T> = self.try_read(key)?;
        items.push(item);
        self.write(key, &items)?;
        Ok(items)
    }

    /// Read a single JSON object stored under `key`
    pub fn read_value<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.backend.get(key) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(key, error = %e, "store read failed");
                return None;
            }
        };
        serde_json::from_str(&raw)
            .map_err(|e| tracing::warn!(key, error = %e, "malformed value in store"))
            .ok()
    }

    /// Persist a single JSON object under `key`
    pub fn write_value<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string(value).map_err(|source| StoreError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.backend.set(key, &json)
    }

    /// True when a non-empty marker is stored under `key`
    pub fn flag(&self, key: &str) -> bool {
        match self.backend.get(key) {
            Ok(value) => value.is_some_and(|v| !v.is_empty()),
            Err(e) => {
                tracing::warn!(key, error = %e, "store read failed, flag treated as unset");
                false
            }
        }
    }

    /// Persist a truthy marker under `key`
    pub fn set_flag(&self, key: &str) -> Result<(), StoreError> {
        self.backend.set(key, "true")
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").finish_non_exhaustive()
    }
}
