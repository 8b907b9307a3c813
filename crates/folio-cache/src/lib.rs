//! Page document cache stores for Folio.
//!
//! This crate decouples the page assembler from where built documents are
//! kept. A single trait, [`CacheStore`], maps page identifiers to assembled
//! HTML documents.
//!
//! # Implementations
//!
//! - [`MemoryStore`]: process-local map, authoritative for the running process
//! - [`FileStore`]: one `<key>.html` file per entry, authoritative across restarts
//! - [`NullStore`]: persistence disabled (always misses, discards writes)
//!
//! # Keys
//!
//! Every backend uses the same key on the read and write paths. The file
//! backend appends `.html` when mapping a key to a file and strips it again
//! in [`load_all`](CacheStore::load_all), so a key written before a restart
//! is found under the same key afterwards.
//!
//! # Example
//!
//! ```
//! # async fn demo() -> Result<(), folio_cache::CacheError> {
//! use folio_cache::{CacheStore, MemoryStore};
//!
//! let store = MemoryStore::new();
//! store.put("about", "<html>about</html>").await?;
//! assert_eq!(store.get("about").await?.as_deref(), Some("<html>about</html>"));
//! # Ok(())
//! # }
//! ```

mod file;
mod memory;

use std::path::PathBuf;

use async_trait::async_trait;
use folio_pages::is_valid_page_id;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Cache error.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Key cannot be mapped onto the backend (empty segment, `..`, ...).
    #[error("Invalid cache key: {0:?}")]
    InvalidKey(String),
    /// I/O error in a persistent backend.
    #[error("Cache I/O error at {}: {source}", .path.display())]
    Io {
        /// File or directory the operation failed on.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Result of [`CacheStore::load_all`].
#[derive(Debug, Default)]
pub struct LoadedEntries {
    /// `(key, document)` pairs that loaded successfully.
    pub entries: Vec<(String, String)>,
    /// Number of entries that existed but could not be loaded.
    pub skipped: usize,
}

/// Key-value store of assembled page documents.
///
/// Writes are last-writer-wins; there is no expiry or invalidation.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Retrieve the document stored under `key`.
    ///
    /// Returns `Ok(None)` on a miss.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store `html` under `key`, replacing any previous document.
    async fn put(&self, key: &str, html: &str) -> Result<(), CacheError>;

    /// Load every stored entry.
    ///
    /// Entries that exist but cannot be read are logged and counted in
    /// [`LoadedEntries::skipped`] rather than failing the whole load.
    ///
    /// # Errors
    ///
    /// Returns an error only if the store as a whole is unusable (e.g., the
    /// cache directory cannot be created or listed).
    async fn load_all(&self) -> Result<LoadedEntries, CacheError>;
}

/// No-op [`CacheStore`] used when persistence is disabled.
///
/// Every `get` misses, every `put` succeeds without storing, and `load_all`
/// is always empty.
#[derive(Debug, Default)]
pub struct NullStore;

#[async_trait]
impl CacheStore for NullStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Ok(None)
    }

    async fn put(&self, _key: &str, _html: &str) -> Result<(), CacheError> {
        Ok(())
    }

    async fn load_all(&self) -> Result<LoadedEntries, CacheError> {
        Ok(LoadedEntries::default())
    }
}

/// Check that `key` is a page identifier, and so usable as a relative file
/// path.
pub(crate) fn validate_key(key: &str) -> Result<(), CacheError> {
    if is_valid_page_id(key) {
        Ok(())
    } else {
        Err(CacheError::InvalidKey(key.to_owned()))
    }
}
