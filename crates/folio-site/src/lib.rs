//! Page assembly and document caching for Folio.
//!
//! This crate provides:
//! - [`PageAssembler`]: resolves a page identifier, assembles the HTML
//!   document and memoizes it in memory and in a [`CacheStore`]
//! - [`assemble_document`]: the pure definition-to-document step
//!
//! # Quick Start
//!
//! ```no_run
//! # async fn demo() -> Result<(), folio_site::BuildError> {
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! use folio_cache::FileStore;
//! use folio_pages::FsPageSource;
//! use folio_site::PageAssembler;
//!
//! let source = Arc::new(FsPageSource::new(PathBuf::from("pages")));
//! let store = Arc::new(FileStore::new(PathBuf::from("cache")));
//! let assembler = PageAssembler::new(source, store);
//!
//! // Load previously built documents before serving
//! let report = assembler.init().await;
//!
//! let page = assembler.build_page("about").await?;
//! println!("{}", page.html);
//! # Ok(())
//! # }
//! ```
//!
//! [`CacheStore`]: folio_cache::CacheStore

mod assembler;
mod document;
mod error;

pub use assembler::{BuiltPage, PageAssembler, WarmUpReport};
pub use document::assemble_document;
pub use error::BuildError;
