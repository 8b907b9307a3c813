//! Page source trait and error types.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::definition::PageDefinition;

/// Error returned when a page identifier cannot be resolved to a definition.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// No definition exists for the identifier.
    #[error("Page not found: {0}")]
    NotFound(String),
    /// The identifier is malformed (empty segment, `..`, ...).
    #[error("Invalid page identifier: {0:?}")]
    InvalidId(String),
    /// The definition exists but violates a required constraint.
    #[error("Invalid page definition for {id}: {reason}")]
    Invalid {
        /// Page identifier.
        id: String,
        /// What is wrong with the definition.
        reason: String,
    },
    /// The definition file is not valid YAML or has the wrong shape.
    #[error("Failed to parse page definition {}: {source}", .path.display())]
    Parse {
        /// Definition file path.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_yaml::Error,
    },
    /// The definition file could not be read.
    #[error("Failed to read page definition {}: {source}", .path.display())]
    Io {
        /// Definition file path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

impl ResolveError {
    /// Whether the error means "no such page" rather than a server-side failure.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::InvalidId(_))
    }
}

/// Resolves page identifiers to [`PageDefinition`]s.
///
/// This is the only capability the page assembler needs from whatever
/// supplies page content. Implementations receive normalized identifiers
/// (see [`normalize_page_id`](crate::normalize_page_id)).
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Produce the definition for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::NotFound`] if no definition exists for `id`,
    /// or another variant if the definition exists but cannot be loaded.
    async fn resolve(&self, id: &str) -> Result<PageDefinition, ResolveError>;
}
