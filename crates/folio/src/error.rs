//! CLI error types.

use folio_config::ConfigError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{failed} of {total} pages failed to build")]
    PagesFailed { failed: usize, total: usize },

    #[error("{0}")]
    Server(String),
}
