//! In-memory key-value backend.

use std::collections::BTreeMap;
use std::sync::RwLock;

use super::{KeyValueStore, RepositoryError};

/// Process-local map. Contents are lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), RepositoryError> {
        self.entries
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), RepositoryError> {
        self.entries
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?
            .remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, RepositoryError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(entries.keys().cloned().collect())
    }
}
