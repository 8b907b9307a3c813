//! Page definition types.

use folio_view::{Attrs, Node};
use serde::Deserialize;

use crate::source::ResolveError;

/// One `<meta>` element: attribute pairs in render order.
///
/// A tag with no attributes contributes no markup.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct MetaTag(Attrs);

impl MetaTag {
    /// Attributes in render order.
    #[must_use]
    pub fn attrs(&self) -> &Attrs {
        &self.0
    }
}

impl From<Attrs> for MetaTag {
    fn from(attrs: Attrs) -> Self {
        Self(attrs)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MetaTag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Everything needed to build one page.
///
/// Loaded from YAML by [`FsPageSource`](crate::FsPageSource):
///
/// ```yaml
/// title: About us
/// meta_tags:
///   - name: description
///     content: Who we are
/// imports:
///   - /static/site.css
///   - /static/app.js
/// root:
///   tag: main
///   children:
///     - tag: h1
///       children: About us
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageDefinition {
    /// Document title. Must not be empty.
    pub title: String,
    /// `<meta>` tags emitted in the document head, in order.
    #[serde(default, alias = "metaTags")]
    pub meta_tags: Vec<MetaTag>,
    /// Asset paths; `.css` become stylesheet links, `.js` become scripts.
    #[serde(default)]
    pub imports: Vec<String>,
    /// UI tree rendered into the root container.
    #[serde(alias = "page")]
    pub root: Node,
}

impl PageDefinition {
    /// Create a definition with no meta tags or imports.
    #[must_use]
    pub fn new(title: impl Into<String>, root: Node) -> Self {
        Self {
            title: title.into(),
            meta_tags: Vec::new(),
            imports: Vec::new(),
            root,
        }
    }

    /// Append a meta tag built from attribute pairs.
    #[must_use]
    pub fn with_meta_tag<K, V>(mut self, attrs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.meta_tags.push(attrs.into_iter().collect());
        self
    }

    /// Append an asset import.
    #[must_use]
    pub fn with_import(mut self, path: impl Into<String>) -> Self {
        self.imports.push(path.into());
        self
    }

    /// Check the constraints a definition must satisfy before it is built.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Invalid`] if the title is empty or blank.
    pub fn validate(&self, id: &str) -> Result<(), ResolveError> {
        if self.title.trim().is_empty() {
            return Err(ResolveError::Invalid {
                id: id.to_owned(),
                reason: "title cannot be empty".to_owned(),
            });
        }
        Ok(())
    }
}
