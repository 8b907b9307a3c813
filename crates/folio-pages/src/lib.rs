//! Page definitions and page sources for Folio.
//!
//! This crate provides the input side of the page-build pipeline:
//!
//! - [`PageDefinition`]: title, meta tags, asset imports and the root UI tree of one page
//! - [`PageSource`]: resolves a page identifier to a definition or reports not-found
//! - [`PageRegistry`]: in-process source mapping identifiers to factories
//! - [`FsPageSource`]: source reading one YAML file per page from a directory
//!
//! # Page Identifiers
//!
//! Identifiers are URL-like paths without leading or trailing slashes:
//! - `"index"` - home page
//! - `"about"` - standalone page
//! - `"docs/install"` - nested page
//!
//! [`normalize_page_id`] turns a raw request path into an identifier and
//! rejects anything that could escape a directory (`..`, empty segments).
//!
//! # Example
//!
//! ```
//! use folio_pages::{PageDefinition, PageRegistry};
//! use folio_view::Node;
//!
//! let registry = PageRegistry::new().with_page("index", || {
//!     PageDefinition::new("Home", Node::element("h1").child(Node::text("Hello")))
//!         .with_meta_tag([("name", "description"), ("content", "Landing page")])
//!         .with_import("/static/site.css")
//! });
//! assert!(registry.contains("index"));
//! ```

mod asset;
mod definition;
mod fs;
mod id;
mod registry;
mod source;

pub use asset::AssetKind;
pub use definition::{MetaTag, PageDefinition};
pub use fs::FsPageSource;
pub use id::{check_page_id, is_valid_page_id, normalize_page_id};
pub use registry::PageRegistry;
pub use source::{PageSource, ResolveError};
