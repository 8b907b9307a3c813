//! `folio serve` command implementation.

use std::path::PathBuf;

use clap::Args;
use folio_config::{CliSettings, Config};
use folio_server::{run_server, server_config_from_config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover folio.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Page definitions directory (overrides config).
    #[arg(long)]
    pages_dir: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config and the PORT variable).
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable verbose output (request and cache logs).
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable the on-disk page cache (default: enabled).
    #[arg(long)]
    cache: Option<bool>,

    /// Disable the on-disk page cache.
    #[arg(long, conflicts_with = "cache")]
    no_cache: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            host: self.host,
            port: self.port,
            pages_dir: self.pages_dir,
            cache_enabled: self.no_cache.then_some(false).or(self.cache),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        output.info(&format!(
            "Starting server on {}:{}",
            config.server.host, config.server.port
        ));
        output.info(&format!(
            "Pages directory: {}",
            config.site_resolved.pages_dir.display()
        ));
        if config.cache_resolved.enabled {
            output.info(&format!(
                "Cache directory: {}",
                config.cache_resolved.dir.display()
            ));
        } else {
            output.info("Cache: disabled");
        }

        let server_config = server_config_from_config(&config, version.to_owned());
        run_server(server_config)
            .await
            .map_err(|e| CliError::Server(e.to_string()))?;

        Ok(())
    }
}
