//! File-based cache store.
//!
//! [`FileStore`] keeps one file per entry under a cache directory. A key maps
//! to `{dir}/{key}.html`, and nested keys become subdirectories:
//!
//! ```text
//! {dir}/
//! +-- index.html          # key "index"
//! +-- about.html          # key "about"
//! +-- docs/
//!     +-- install.html    # key "docs/install"
//! ```
//!
//! Writes go to a temporary sibling first and are then renamed over the
//! target, so a reader never observes a partially written document.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::{CacheError, CacheStore, LoadedEntries, validate_key};

/// Extension appended to every key on disk.
const EXTENSION: &str = ".html";

/// Suffix of in-progress writes. Never loaded.
const TEMP_SUFFIX: &str = ".tmp";

/// [`CacheStore`] persisting documents as files in a directory.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`.
    ///
    /// The directory is created lazily on the first write or load.
    #[must_use]
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Cache directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidKey`] if `key` would escape the cache
    /// directory or cannot be represented as a relative path.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, CacheError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}{EXTENSION}")))
    }

    /// Inverse of [`path_for`](Self::path_for) for a path relative to the
    /// cache directory.
    fn key_for(relative: &Path) -> Option<String> {
        let mut segments = Vec::new();
        for component in relative.components() {
            segments.push(component.as_os_str().to_str()?);
        }
        let joined = segments.join("/");
        let key = joined.strip_suffix(EXTENSION)?;
        validate_key(key).ok()?;
        Some(key.to_owned())
    }
}

#[async_trait]
impl CacheStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(html) => Ok(Some(html)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(CacheError::Io { path, source }),
        }
    }

    async fn put(&self, key: &str, html: &str) -> Result<(), CacheError> {
        let path = self.path_for(key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| CacheError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let mut temp = path.clone().into_os_string();
        temp.push(TEMP_SUFFIX);
        let temp = PathBuf::from(temp);

        if let Err(source) = tokio::fs::write(&temp, html).await {
            return Err(CacheError::Io { path: temp, source });
        }
        if let Err(source) = tokio::fs::rename(&temp, &path).await {
            // Best effort: a stale temp file is ignored by `load_all` anyway.
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(CacheError::Io { path, source });
        }

        tracing::debug!(key, path = %path.display(), "Persisted page");
        Ok(())
    }

    async fn load_all(&self) -> Result<LoadedEntries, CacheError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| CacheError::Io {
                path: self.dir.clone(),
                source,
            })?;

        let mut loaded = LoadedEntries::default();
        let mut pending = vec![self.dir.clone()];

        while let Some(dir) = pending.pop() {
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(source) if dir == self.dir => {
                    return Err(CacheError::Io { path: dir, source });
                }
                Err(e) => {
                    tracing::warn!(path = %dir.display(), error = %e, "Skipping unreadable cache directory");
                    loaded.skipped += 1;
                    continue;
                }
            };

            loop {
                let entry = match entries.next_entry().await {
                    Ok(Some(entry)) => entry,
                    Ok(None) => break,
                    Err(e) => {
                        tracing::warn!(path = %dir.display(), error = %e, "Failed to list cache directory");
                        loaded.skipped += 1;
                        break;
                    }
                };
                let path = entry.path();

                let file_type = match entry.file_type().await {
                    Ok(file_type) => file_type,
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Skipping cache entry");
                        loaded.skipped += 1;
                        continue;
                    }
                };
                if file_type.is_dir() {
                    pending.push(path);
                    continue;
                }

                let Some(key) = path
                    .strip_prefix(&self.dir)
                    .ok()
                    .and_then(Self::key_for)
                else {
                    // Temp files and foreign files are not cache entries.
                    continue;
                };

                match tokio::fs::read(&path).await {
                    Ok(bytes) => match String::from_utf8(bytes) {
                        Ok(html) => loaded.entries.push((key, html)),
                        Err(_) => {
                            tracing::warn!(path = %path.display(), "Skipping non-UTF-8 cache entry");
                            loaded.skipped += 1;
                        }
                    },
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable cache entry");
                        loaded.skipped += 1;
                    }
                }
            }
        }

        loaded.entries.sort_by(|a, b| a.0.cmp(&b.0));
        tracing::debug!(
            dir = %self.dir.display(),
            loaded = loaded.entries.len(),
            skipped = loaded.skipped,
            "Loaded cache directory"
        );
        Ok(loaded)
    }
}
