//! In-memory cache store.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::{CacheError, CacheStore, LoadedEntries};

/// Process-local [`CacheStore`].
///
/// Never fails; the `Result` returns exist only to satisfy the trait.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Synchronous lookup.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<String> {
        self.entries.read().unwrap().get(key).cloned()
    }

    /// Synchronous insert, replacing any previous document.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    pub fn insert(&self, key: impl Into<String>, html: impl Into<String>) {
        self.entries.write().unwrap().insert(key.into(), html.into());
    }

    /// Whether `key` has an entry.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.read().unwrap().contains_key(key)
    }

    /// Stored keys, sorted.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.read().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Number of stored entries.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    /// Whether the store is empty.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.lookup(key))
    }

    async fn put(&self, key: &str, html: &str) -> Result<(), CacheError> {
        self.insert(key, html);
        Ok(())
    }

    async fn load_all(&self) -> Result<LoadedEntries, CacheError> {
        let mut entries: Vec<(String, String)> = self
            .entries
            .read()
            .unwrap()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(LoadedEntries {
            entries,
            skipped: 0,
        })
    }
}
