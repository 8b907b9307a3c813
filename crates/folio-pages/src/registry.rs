//! In-process page registry.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::definition::PageDefinition;
use crate::source::{PageSource, ResolveError};

type PageFactory = Arc<dyn Fn() -> PageDefinition + Send + Sync>;

/// [`PageSource`] mapping identifiers to definition factories.
///
/// Factories run on every resolution, so a definition is only constructed
/// when the assembler actually needs to build the page.
///
/// # Example
///
/// ```
/// use folio_pages::{PageDefinition, PageRegistry};
/// use folio_view::Node;
///
/// let registry = PageRegistry::new();
/// registry.register("about", || PageDefinition::new("About", Node::text("Hi")));
/// assert_eq!(registry.ids(), vec!["about".to_owned()]);
/// ```
#[derive(Default)]
pub struct PageRegistry {
    pages: RwLock<HashMap<String, PageFactory>>,
}

impl PageRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`register`](Self::register).
    #[must_use]
    pub fn with_page<F>(self, id: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> PageDefinition + Send + Sync + 'static,
    {
        self.register(id, factory);
        self
    }

    /// Register (or replace) the factory for `id`.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    pub fn register<F>(&self, id: impl Into<String>, factory: F)
    where
        F: Fn() -> PageDefinition + Send + Sync + 'static,
    {
        let id = id.into();
        let replaced = self
            .pages
            .write()
            .unwrap()
            .insert(id.clone(), Arc::new(factory))
            .is_some();
        if replaced {
            tracing::debug!(page = %id, "Replaced page factory");
        }
    }

    /// Whether a factory is registered for `id`.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.pages.read().unwrap().contains_key(id)
    }

    /// Registered identifiers, sorted.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.pages.read().unwrap().keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[async_trait]
impl PageSource for PageRegistry {
    async fn resolve(&self, id: &str) -> Result<PageDefinition, ResolveError> {
        // Clone the factory out so the lock is not held while it runs.
        let factory = self
            .pages
            .read()
            .unwrap()
            .get(id)
            .map(Arc::clone)
            .ok_or_else(|| ResolveError::NotFound(id.to_owned()))?;

        let definition = factory();
        definition.validate(id)?;
        Ok(definition)
    }
}
