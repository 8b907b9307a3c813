//! Application state.
//!
//! Shared state for all request handlers.

use std::sync::Arc;

use folio_site::PageAssembler;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Builds and caches page documents.
    pub(crate) assembler: Arc<PageAssembler>,
    /// Application version, mixed into `ETag`s.
    pub(crate) version: String,
}
