//! `folio build` command implementation.
//!
//! Pre-renders pages into the cache directory so a server started later
//! serves them without building.

use std::path::PathBuf;

use clap::Args;
use folio_config::{CliSettings, Config};
use folio_server::{create_assembler, server_config_from_config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Page identifiers to build (e.g. `index`, `docs/install`).
    #[arg(required = true)]
    pages: Vec<String>,

    /// Path to configuration file (default: auto-discover folio.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Page definitions directory (overrides config).
    #[arg(long)]
    pages_dir: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl BuildArgs {
    /// Execute the build command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or any page fails to build.
    pub(crate) async fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            pages_dir: self.pages_dir,
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if !config.cache_resolved.enabled {
            output.warning("Cache is disabled in config; pages will not be persisted");
        }

        let server_config = server_config_from_config(&config, version.to_owned());
        let assembler = create_assembler(&server_config);
        let report = assembler.init().await;
        if report.skipped > 0 {
            output.warning(&format!(
                "Skipped {} unreadable cache entries",
                report.skipped
            ));
        }

        let mut failed = 0;
        for page_id in &self.pages {
            match assembler.build_page(page_id).await {
                Ok(page) if page.from_cache => {
                    output.muted(&format!("  cached  {}", page.id));
                }
                Ok(page) if assembler.is_cached(&page.id) => {
                    output.success(&format!("  built   {}", page.id));
                }
                Ok(page) => {
                    // Built, but the cache write failed
                    failed += 1;
                    output.warning(&format!("  unsaved {}", page.id));
                }
                Err(e) => {
                    failed += 1;
                    output.error(&format!("  failed  {page_id}: {e}"));
                }
            }
        }

        if failed > 0 {
            return Err(CliError::PagesFailed {
                failed,
                total: self.pages.len(),
            });
        }

        output.info(&format!("{} pages ready", self.pages.len()));
        Ok(())
    }
}
