//! HTTP server for Folio pages.
//!
//! Serves every page as a complete HTML document built by
//! [`PageAssembler`]:
//!
//! - `GET /` serves the index page
//! - `GET /{page}` serves any other page, including nested ones
//! - `GET /healthz` answers `ok`
//!
//! Pages carry an `ETag` and `Cache-Control: no-cache`, so browsers
//! revalidate and get `304 Not Modified` while the document is unchanged.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::PathBuf;
//! use folio_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         pages_dir: PathBuf::from("pages"),
//!         cache_dir: Some(PathBuf::from("cache")),
//!         ..ServerConfig::default()
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Browser ──HTTP──► axum router (folio-server)
//!                        │
//!                        └─► PageAssembler (folio-site)
//!                                 │
//!                                 ├─► memory cache ──► hit: return
//!                                 ├─► FsPageSource (folio-pages)
//!                                 └─► FileStore (folio-cache)
//! ```

mod app;
mod error;
mod handlers;
mod middleware;
mod state;

use std::path::PathBuf;
use std::sync::Arc;

use folio_cache::{CacheStore, FileStore, NullStore};
use folio_pages::FsPageSource;
use folio_site::PageAssembler;
use state::AppState;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Directory of YAML page definitions.
    pub pages_dir: PathBuf,
    /// Page identifier served for `/`.
    pub index_page: String,
    /// Cache directory (`None` disables persistence).
    pub cache_dir: Option<PathBuf>,
    /// Application version (mixed into `ETag`s).
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 5050,
            pages_dir: PathBuf::from("pages"),
            index_page: "index".to_owned(),
            cache_dir: None,
            version: String::new(),
        }
    }
}

/// Create the page assembler described by `config`.
///
/// Pages are read from `pages_dir`. Built documents are persisted to
/// `cache_dir` when set, otherwise they are kept in memory only. The returned
/// assembler is not warmed up; call [`PageAssembler::init`] before use.
#[must_use]
pub fn create_assembler(config: &ServerConfig) -> PageAssembler {
    let source = Arc::new(FsPageSource::new(config.pages_dir.clone()));
    let store: Arc<dyn CacheStore> = match &config.cache_dir {
        Some(dir) => Arc::new(FileStore::new(dir.clone())),
        None => Arc::new(NullStore),
    };
    PageAssembler::new(source, store).with_index_page(config.index_page.clone())
}

/// Run the server.
///
/// Loads persisted documents before binding, then serves until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails to start.
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let assembler = Arc::new(create_assembler(&config));

    // Warm up before accepting requests
    let report = assembler.init().await;
    tracing::info!(
        loaded = report.loaded,
        skipped = report.skipped,
        "Page cache ready"
    );

    let state = Arc::new(AppState {
        assembler,
        version: config.version.clone(),
    });
    let app = app::create_router(state);

    let listener = bind_listener(&config).await?;
    tracing::info!(address = %listener.local_addr()?, "Starting server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Bind the configured host, which may be a hostname or an IP address.
async fn bind_listener(config: &ServerConfig) -> std::io::Result<tokio::net::TcpListener> {
    tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        // Without a handler the server runs until killed
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from Folio config.
#[must_use]
pub fn server_config_from_config(config: &folio_config::Config, version: String) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        pages_dir: config.site_resolved.pages_dir.clone(),
        index_page: config.site_resolved.index_page.clone(),
        cache_dir: config
            .cache_resolved
            .enabled
            .then(|| config.cache_resolved.dir.clone()),
        version,
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_server_config_from_config() {
        let mut config = folio_config::Config::default();
        config.server.port = 8080;

        let server_config = server_config_from_config(&config, "1.0.0".to_owned());

        assert_eq!(server_config.port, 8080);
        assert_eq!(server_config.index_page, "index");
        assert_eq!(server_config.cache_dir, Some(PathBuf::from("./cache")));
        assert_eq!(server_config.pages_dir, PathBuf::from("./pages"));
        assert_eq!(server_config.version, "1.0.0");
    }

    #[tokio::test]
    async fn test_bind_listener_accepts_hostname() {
        let config = ServerConfig {
            host: "localhost".to_owned(),
            port: 0,
            ..ServerConfig::default()
        };

        let listener = bind_listener(&config).await.unwrap();

        assert!(listener.local_addr().unwrap().ip().is_loopback());
    }

    #[test]
    fn test_server_config_cache_disabled() {
        let mut config = folio_config::Config::default();
        config.cache_resolved.enabled = false;

        let server_config = server_config_from_config(&config, String::new());

        assert!(server_config.cache_dir.is_none());
    }

    #[tokio::test]
    async fn test_create_assembler_reads_pages_and_cache() {
        let tmp = tempfile::tempdir().unwrap();
        let pages_dir = tmp.path().join("pages");
        let cache_dir = tmp.path().join("cache");
        fs::create_dir_all(&pages_dir).unwrap();
        fs::write(pages_dir.join("home.yaml"), "title: Home\nroot: hi\n").unwrap();

        let config = ServerConfig {
            pages_dir,
            cache_dir: Some(cache_dir.clone()),
            index_page: "home".to_owned(),
            ..ServerConfig::default()
        };
        let assembler = create_assembler(&config);
        assembler.init().await;

        let page = assembler.build_page("/").await.unwrap();

        assert_eq!(page.id, "home");
        assert!(cache_dir.join("home.html").is_file());
    }
}
