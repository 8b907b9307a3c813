//! Page assembler with in-memory and persistent document caching.
//!
//! # Caching
//!
//! Built documents live in two places:
//! - an in-memory [`MemoryStore`], consulted first on every request
//! - a persistent [`CacheStore`], loaded into memory by [`PageAssembler::init`]
//!
//! A document is committed to memory only after it has been persisted, so the
//! two never diverge. If persisting fails, the document is still returned and
//! the next request for the page builds it again.
//!
//! # Coalescing
//!
//! Concurrent requests for the same unbuilt page share one in-flight lock.
//! The first caller builds; the others wait, then find the page in memory.
//! A document that could not be persisted is handed to the waiters through
//! the in-flight entry instead, so they do not rebuild it. Requests arriving
//! after the entry is gone build again. Different pages build in parallel.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use folio_cache::{CacheStore, MemoryStore};
use folio_pages::{PageSource, normalize_page_id};

use crate::document::assemble_document;
use crate::error::BuildError;

/// Default identifier served for the empty path.
const DEFAULT_INDEX_PAGE: &str = "index";

/// Result of [`PageAssembler::build_page`].
#[derive(Clone, Debug)]
pub struct BuiltPage {
    /// Normalized page identifier.
    pub id: String,
    /// Complete HTML document.
    pub html: String,
    /// Whether the document came from the cache.
    pub from_cache: bool,
}

/// Result of [`PageAssembler::init`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WarmUpReport {
    /// Entries committed to memory.
    pub loaded: usize,
    /// Entries that existed but could not be read.
    pub skipped: usize,
    /// The persistent store could not be read at all.
    pub unavailable: bool,
}

/// Lock guarding one page's build. Holds the document when it was built but
/// not committed to memory.
type BuildLock = Arc<tokio::sync::Mutex<Option<String>>>;

/// Per-page in-flight lock and the number of callers holding it.
#[derive(Default)]
struct InFlight {
    lock: BuildLock,
    holders: usize,
}

type InFlightMap = Mutex<HashMap<String, InFlight>>;

/// Membership in a page's in-flight entry. The entry is removed when the
/// last member leaves, including on cancellation.
struct InFlightSlot<'a> {
    in_flight: &'a InFlightMap,
    id: String,
    lock: BuildLock,
}

impl Drop for InFlightSlot<'_> {
    fn drop(&mut self) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = in_flight.get_mut(&self.id) {
            entry.holders -= 1;
            if entry.holders == 0 {
                in_flight.remove(&self.id);
            }
        }
    }
}

/// Builds complete HTML documents for page identifiers and memoizes them.
///
/// Safe for concurrent use behind an `Arc`.
pub struct PageAssembler {
    source: Arc<dyn PageSource>,
    store: Arc<dyn CacheStore>,
    memory: MemoryStore,
    in_flight: InFlightMap,
    index_page: String,
}

impl PageAssembler {
    /// Create an assembler. Performs no I/O; call [`init`](Self::init) before
    /// serving to load previously persisted documents.
    #[must_use]
    pub fn new(source: Arc<dyn PageSource>, store: Arc<dyn CacheStore>) -> Self {
        Self {
            source,
            store,
            memory: MemoryStore::new(),
            in_flight: Mutex::new(HashMap::new()),
            index_page: DEFAULT_INDEX_PAGE.to_owned(),
        }
    }

    /// Set the identifier the empty path maps to.
    #[must_use]
    pub fn with_index_page(mut self, index_page: impl Into<String>) -> Self {
        self.index_page = index_page.into();
        self
    }

    /// Identifier the empty path maps to.
    #[must_use]
    pub fn index_page(&self) -> &str {
        &self.index_page
    }

    /// Load every persisted document into memory.
    ///
    /// Never fails: an unusable store and unreadable entries are logged and
    /// reported, and the assembler starts with whatever could be loaded.
    pub async fn init(&self) -> WarmUpReport {
        let loaded = match self.store.load_all().await {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::warn!(error = %e, "Cache warm-up failed, starting with an empty cache");
                return WarmUpReport {
                    unavailable: true,
                    ..WarmUpReport::default()
                };
            }
        };

        let report = WarmUpReport {
            loaded: loaded.entries.len(),
            skipped: loaded.skipped,
            unavailable: false,
        };
        for (id, html) in loaded.entries {
            self.memory.insert(id, html);
        }

        tracing::info!(
            loaded = report.loaded,
            skipped = report.skipped,
            "Cache warm-up complete"
        );
        report
    }

    /// Build (or fetch from cache) the document for `page_id`.
    ///
    /// `page_id` is normalized first: surrounding slashes are trimmed and the
    /// empty path maps to the index page.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::NotFound`] if the identifier is malformed or has
    /// no definition, and [`BuildError::Resolve`] if the definition could not
    /// be loaded. Persistence failures are not errors.
    pub async fn build_page(&self, page_id: &str) -> Result<BuiltPage, BuildError> {
        let id = normalize_page_id(page_id, &self.index_page)?;

        // Fast path: already built
        if let Some(html) = self.memory.lookup(&id) {
            return Ok(BuiltPage {
                id,
                html,
                from_cache: true,
            });
        }

        // Slow path: take this page's in-flight lock
        let slot = self.enter(&id);
        let mut turn = slot.lock.lock().await;

        // Double-check after acquiring lock
        if let Some(html) = self.memory.lookup(&id) {
            return Ok(BuiltPage {
                id,
                html,
                from_cache: true,
            });
        }

        // Built by the caller ahead of us but not persisted
        if let Some(html) = turn.as_ref() {
            return Ok(BuiltPage {
                id,
                html: html.clone(),
                from_cache: false,
            });
        }

        if let Some(html) = self.read_persisted(&id).await {
            self.memory.insert(id.as_str(), html.as_str());
            return Ok(BuiltPage {
                id,
                html,
                from_cache: true,
            });
        }

        let definition = self.source.resolve(&id).await?;
        let html = assemble_document(&id, &definition);

        match self.store.put(&id, &html).await {
            Ok(()) => {
                self.memory.insert(id.as_str(), html.as_str());
                tracing::info!(page = %id, "Built page");
            }
            Err(e) => {
                tracing::error!(page = %id, error = %e, "Failed to persist page, serving uncached");
                *turn = Some(html.clone());
            }
        }

        Ok(BuiltPage {
            id,
            html,
            from_cache: false,
        })
    }

    /// Whether the normalized identifier `id` has a document in memory.
    #[must_use]
    pub fn is_cached(&self, id: &str) -> bool {
        self.memory.contains(id)
    }

    /// Identifiers with a document in memory, sorted.
    #[must_use]
    pub fn cached_ids(&self) -> Vec<String> {
        self.memory.keys()
    }

    /// Join the in-flight entry for `id`, creating it if needed.
    ///
    /// # Panics
    ///
    /// Panics if the internal `Mutex` is poisoned.
    fn enter(&self, id: &str) -> InFlightSlot<'_> {
        let mut in_flight = self.in_flight.lock().unwrap();
        let entry = in_flight.entry(id.to_owned()).or_default();
        entry.holders += 1;
        InFlightSlot {
            in_flight: &self.in_flight,
            id: id.to_owned(),
            lock: Arc::clone(&entry.lock),
        }
    }

    /// Read a document persisted after warm-up. Read errors count as a miss.
    async fn read_persisted(&self, id: &str) -> Option<String> {
        match self.store.get(id).await {
            Ok(Some(html)) => {
                tracing::debug!(page = %id, "Loaded page from persistent cache");
                Some(html)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(page = %id, error = %e, "Failed to read persisted page, rebuilding");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    // Shared across request handlers behind an Arc
    static_assertions::assert_impl_all!(super::PageAssembler: Send, Sync);

    use std::fs;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use folio_cache::{CacheError, FileStore, LoadedEntries, NullStore};
    use folio_pages::{PageDefinition, PageRegistry, ResolveError};
    use folio_view::Node;
    use pretty_assertions::assert_eq;

    use super::*;

    /// Page source that counts resolutions.
    struct CountingSource {
        registry: PageRegistry,
        calls: AtomicUsize,
        delay: Duration,
    }

    impl CountingSource {
        fn new(registry: PageRegistry) -> Self {
            Self {
                registry,
                calls: AtomicUsize::new(0),
                delay: Duration::ZERO,
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PageSource for CountingSource {
        async fn resolve(&self, id: &str) -> Result<PageDefinition, ResolveError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.registry.resolve(id).await
        }
    }

    /// Store whose writes always fail.
    struct FailingStore;

    #[async_trait]
    impl CacheStore for FailingStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
            Ok(None)
        }

        async fn put(&self, key: &str, _html: &str) -> Result<(), CacheError> {
            Err(CacheError::Io {
                path: PathBuf::from(format!("{key}.html")),
                source: std::io::Error::other("disk full"),
            })
        }

        async fn load_all(&self) -> Result<LoadedEntries, CacheError> {
            Ok(LoadedEntries::default())
        }
    }

    fn registry() -> PageRegistry {
        PageRegistry::new()
            .with_page("index", || PageDefinition::new("Home", Node::text("welcome")))
            .with_page("about", || {
                PageDefinition::new("About", Node::element("h1").child(Node::text("About")))
                    .with_meta_tag([("name", "description"), ("content", "x")])
                    .with_import("site.css")
                    .with_import("app.js")
            })
            .with_page("docs/install", || {
                PageDefinition::new("Install", Node::text("steps"))
            })
            .with_page("blank", || PageDefinition::new("", Node::text("x")))
    }

    fn assembler_with(source: &Arc<CountingSource>, store: Arc<dyn CacheStore>) -> PageAssembler {
        PageAssembler::new(Arc::clone(source) as Arc<dyn PageSource>, store)
    }

    #[tokio::test]
    async fn test_fresh_build_is_complete_document() {
        let source = Arc::new(CountingSource::new(registry()));
        let assembler = assembler_with(&source, Arc::new(NullStore));

        let page = assembler.build_page("about").await.unwrap();

        assert_eq!(page.id, "about");
        assert!(!page.from_cache);
        assert!(page.html.starts_with("<!DOCTYPE html>"));
        assert_eq!(page.html.matches("<title>About</title>").count(), 1);
        assert!(page.html.contains(r#"<div id="root"><h1>About</h1></div>"#));
    }

    #[tokio::test]
    async fn test_second_build_served_from_cache() {
        let source = Arc::new(CountingSource::new(registry()));
        let assembler = assembler_with(&source, Arc::new(folio_cache::MemoryStore::new()));

        let first = assembler.build_page("about").await.unwrap();
        let second = assembler.build_page("about").await.unwrap();

        assert!(!first.from_cache);
        assert!(second.from_cache);
        assert_eq!(first.html, second.html);
        assert_eq!(source.calls(), 1);
        assert!(assembler.is_cached("about"));
    }

    #[tokio::test]
    async fn test_ids_are_normalized() {
        let source = Arc::new(CountingSource::new(registry()));
        let assembler = assembler_with(&source, Arc::new(folio_cache::MemoryStore::new()));

        assert_eq!(assembler.build_page("").await.unwrap().id, "index");
        assert_eq!(assembler.build_page("/").await.unwrap().id, "index");
        assert_eq!(
            assembler.build_page("/docs/install/").await.unwrap().id,
            "docs/install"
        );

        assert_eq!(source.calls(), 2);
        assert_eq!(assembler.cached_ids(), vec!["docs/install", "index"]);
    }

    #[tokio::test]
    async fn test_custom_index_page() {
        let source = Arc::new(CountingSource::new(registry()));
        let assembler =
            assembler_with(&source, Arc::new(NullStore)).with_index_page("about");

        assert_eq!(assembler.index_page(), "about");
        assert_eq!(assembler.build_page("/").await.unwrap().id, "about");
    }

    #[tokio::test]
    async fn test_unknown_page_is_not_found() {
        let source = Arc::new(CountingSource::new(registry()));
        let assembler = assembler_with(&source, Arc::new(NullStore));

        let err = assembler.build_page("missing").await.unwrap_err();

        assert!(matches!(err, BuildError::NotFound(ref id) if id == "missing"));
        assert!(!assembler.is_cached("missing"));
    }

    #[tokio::test]
    async fn test_invalid_id_is_not_found_without_resolving() {
        let source = Arc::new(CountingSource::new(registry()));
        let assembler = assembler_with(&source, Arc::new(NullStore));

        let err = assembler.build_page("../etc/passwd").await.unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_invalid_definition_is_resolve_error() {
        let source = Arc::new(CountingSource::new(registry()));
        let assembler = assembler_with(&source, Arc::new(NullStore));

        let err = assembler.build_page("blank").await.unwrap_err();

        assert!(matches!(err, BuildError::Resolve(ResolveError::Invalid { .. })));
    }

    #[tokio::test]
    async fn test_persistence_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let cache_dir = tmp.path().join("cache");

        let source = Arc::new(CountingSource::new(registry()));
        let first = assembler_with(&source, Arc::new(FileStore::new(cache_dir.clone())));
        first.init().await;
        let built = first.build_page("docs/install").await.unwrap();
        assert!(cache_dir.join("docs/install.html").is_file());

        // A new process over the same cache directory
        let fresh_source = Arc::new(CountingSource::new(registry()));
        let second = assembler_with(&fresh_source, Arc::new(FileStore::new(cache_dir)));
        let report = second.init().await;

        assert_eq!(
            report,
            WarmUpReport {
                loaded: 1,
                skipped: 0,
                unavailable: false,
            }
        );
        assert!(second.is_cached("docs/install"));

        let served = second.build_page("docs/install").await.unwrap();
        assert!(served.from_cache);
        assert_eq!(served.html, built.html);
        assert_eq!(fresh_source.calls(), 0);
    }

    #[tokio::test]
    async fn test_persisted_after_warm_up_is_read_from_store() {
        let store = Arc::new(folio_cache::MemoryStore::new());
        store.insert("about", "<html>persisted</html>");

        let source = Arc::new(CountingSource::new(registry()));
        let assembler = assembler_with(&source, store);

        // No init: the entry is only in the persistent store
        let page = assembler.build_page("about").await.unwrap();

        assert!(page.from_cache);
        assert_eq!(page.html, "<html>persisted</html>");
        assert_eq!(source.calls(), 0);
        assert!(assembler.is_cached("about"));
    }

    #[tokio::test]
    async fn test_persistence_failure_returns_document_uncached() {
        let source = Arc::new(CountingSource::new(registry()));
        let assembler = assembler_with(&source, Arc::new(FailingStore));

        let first = assembler.build_page("about").await.unwrap();
        assert!(first.html.starts_with("<!DOCTYPE html>"));
        assert!(!first.from_cache);
        assert!(!assembler.is_cached("about"));

        // Next request retries the build
        let second = assembler.build_page("about").await.unwrap();
        assert!(!second.from_cache);
        assert_eq!(first.html, second.html);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_warm_up_skips_unreadable_entries() {
        let tmp = tempfile::tempdir().unwrap();
        let cache_dir = tmp.path().join("cache");
        fs::create_dir_all(&cache_dir).unwrap();
        fs::write(cache_dir.join("good.html"), "<html>good</html>").unwrap();
        fs::write(cache_dir.join("bad.html"), [0xC3, 0x28]).unwrap();

        let source = Arc::new(CountingSource::new(registry()));
        let assembler = assembler_with(&source, Arc::new(FileStore::new(cache_dir)));
        let report = assembler.init().await;

        assert_eq!(report.loaded, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(assembler.cached_ids(), vec!["good"]);
    }

    #[tokio::test]
    async fn test_warm_up_with_unusable_store_starts_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let not_a_dir = tmp.path().join("cache");
        fs::write(&not_a_dir, "file").unwrap();

        let source = Arc::new(CountingSource::new(registry()));
        let assembler = assembler_with(&source, Arc::new(FileStore::new(not_a_dir)));
        let report = assembler.init().await;

        assert!(report.unavailable);
        assert!(assembler.cached_ids().is_empty());

        // Building still works; the failed write leaves the page uncached
        let page = assembler.build_page("index").await.unwrap();
        assert!(!page.from_cache);
        assert!(!assembler.is_cached("index"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_builds_resolve_once() {
        let source =
            Arc::new(CountingSource::new(registry()).with_delay(Duration::from_millis(50)));
        let assembler = Arc::new(assembler_with(
            &source,
            Arc::new(folio_cache::MemoryStore::new()),
        ));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let assembler = Arc::clone(&assembler);
                tokio::spawn(async move { assembler.build_page("about").await.unwrap() })
            })
            .collect();

        let mut pages = Vec::new();
        for handle in handles {
            pages.push(handle.await.unwrap());
        }

        assert_eq!(source.calls(), 1);
        assert_eq!(pages.iter().filter(|p| !p.from_cache).count(), 1);
        assert!(pages.iter().all(|p| p.html == pages[0].html));
        assert!(assembler.in_flight.lock().unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_different_pages_build_in_parallel() {
        let source =
            Arc::new(CountingSource::new(registry()).with_delay(Duration::from_millis(50)));
        let assembler = Arc::new(assembler_with(&source, Arc::new(NullStore)));

        let a = {
            let assembler = Arc::clone(&assembler);
            tokio::spawn(async move { assembler.build_page("about").await })
        };
        let b = {
            let assembler = Arc::clone(&assembler);
            tokio::spawn(async move { assembler.build_page("index").await })
        };

        assert_eq!(a.await.unwrap().unwrap().id, "about");
        assert_eq!(b.await.unwrap().unwrap().id, "index");
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_builds_share_unpersisted_document() {
        let source =
            Arc::new(CountingSource::new(registry()).with_delay(Duration::from_millis(50)));
        let assembler = Arc::new(assembler_with(&source, Arc::new(FailingStore)));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let assembler = Arc::clone(&assembler);
                tokio::spawn(async move { assembler.build_page("about").await.unwrap() })
            })
            .collect();

        let mut pages = Vec::new();
        for handle in handles {
            pages.push(handle.await.unwrap());
        }

        assert_eq!(source.calls(), 1);
        assert!(pages.iter().all(|p| p.html == pages[0].html && !p.from_cache));
        assert!(!assembler.is_cached("about"));
        assert!(assembler.in_flight.lock().unwrap().is_empty());

        // Once the flight is over, the next request builds again
        assembler.build_page("about").await.unwrap();
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_in_flight_entry_removed_after_failure() {
        let source = Arc::new(CountingSource::new(registry()));
        let assembler = assembler_with(&source, Arc::new(NullStore));

        assert!(assembler.build_page("missing").await.is_err());

        assert!(assembler.in_flight.lock().unwrap().is_empty());
    }
}
