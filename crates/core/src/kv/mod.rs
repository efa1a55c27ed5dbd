//! Key-value storage abstraction.
//!
//! The dashboard persists a handful of string values (headline price,
//! rates blob, portfolio rows). Implementations must replace a value as a
//! whole so readers never see a partial write. Concurrent writers race and
//! the last one wins.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::errors::{Error, Result};

/// Trait for durable string storage.
pub trait KeyValueStore: Send + Sync {
    /// Read a value. Returns `None` if the key was never set or was removed.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a value. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory store for tests or contexts that don't need persistence.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored keys.
    pub fn len(&self) -> usize {
        self.values.read().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> Error {
    Error::Storage("Memory store lock poisoned".into())
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.read().map_err(|_| poisoned())?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.write().map_err(|_| poisoned())?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.values.write().map_err(|_| poisoned())?;
        values.remove(key);
        Ok(())
    }
}
