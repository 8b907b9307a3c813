//! Configuration management for Folio.
//!
//! Parses `folio.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 5050
//!
//! [site]
//! pages_dir = "pages"
//! index_page = "index"
//!
//! [cache]
//! enabled = true
//! dir = "cache"
//! ```
//!
//! Relative paths are resolved against the directory containing the config
//! file (or the current directory when no file is found).
//!
//! ## Overrides
//!
//! Values are applied in this order, later wins:
//!
//! 1. defaults
//! 2. `folio.toml`
//! 3. the `PORT` environment variable (`server.port`)
//! 4. [`CliSettings`]
//!
//! ## Environment Variable Expansion
//!
//! `server.host` supports `${VAR}` (error if unset) and `${VAR:-default}`.

mod expand;

use std::path::{Path, PathBuf};

use folio_pages::is_valid_page_id;
use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "folio.toml";

/// Environment variable overriding `server.port`.
const PORT_ENV: &str = "PORT";

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override page definitions directory.
    pub pages_dir: Option<PathBuf>,
    /// Override cache enabled flag.
    pub cache_enabled: Option<bool>,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Site configuration (paths are relative strings from TOML).
    site: SiteConfigRaw,
    /// Cache configuration (paths are relative strings from TOML).
    cache: CacheConfigRaw,

    /// Resolved site configuration (set after loading).
    #[serde(skip)]
    pub site_resolved: SiteConfig,
    /// Resolved cache configuration (set after loading).
    #[serde(skip)]
    pub cache_resolved: CacheConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 5050,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SiteConfigRaw {
    pages_dir: Option<String>,
    index_page: Option<String>,
}

/// Resolved site configuration.
#[derive(Debug)]
pub struct SiteConfig {
    /// Directory of YAML page definitions.
    pub pages_dir: PathBuf,
    /// Page identifier served for `/`.
    pub index_page: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            pages_dir: PathBuf::from("pages"),
            index_page: "index".to_owned(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct CacheConfigRaw {
    enabled: Option<bool>,
    dir: Option<String>,
}

/// Resolved cache configuration.
#[derive(Debug)]
pub struct CacheConfig {
    /// Whether built documents are persisted to disk.
    pub enabled: bool,
    /// Directory holding `<page>.html` files.
    pub dir: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: PathBuf::from("cache"),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion or override.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`server.host`").
        field: String,
        /// Error message (e.g., "${`FOLIO_HOST`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `folio.toml` in current directory and parents,
    /// falling back to defaults relative to the current directory.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// `PORT` is not a valid port, or the final configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        config.apply_port_env(std::env::var(PORT_ENV).ok().as_deref())?;
        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply the `PORT` environment variable, if set.
    fn apply_port_env(&mut self, value: Option<&str>) -> Result<(), ConfigError> {
        let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return Ok(());
        };
        self.server.port = value.parse().map_err(|_| ConfigError::EnvVar {
            field: "server.port".to_owned(),
            message: format!("{PORT_ENV}={value:?} is not a valid port"),
        })?;
        Ok(())
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(pages_dir) = &settings.pages_dir {
            self.site_resolved.pages_dir.clone_from(pages_dir);
        }
        if let Some(cache_enabled) = settings.cache_enabled {
            self.cache_resolved.enabled = cache_enabled;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        let site = SiteConfig::default();
        let cache = CacheConfig::default();
        Self {
            server: ServerConfig::default(),
            site: SiteConfigRaw::default(),
            cache: CacheConfigRaw::default(),
            site_resolved: SiteConfig {
                pages_dir: base.join(site.pages_dir),
                index_page: site.index_page,
            },
            cache_resolved: CacheConfig {
                enabled: cache.enabled,
                dir: base.join(cache.dir),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically at the end of [`load`](Self::load), after all
    /// overrides are applied.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_site()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        // Port 0 would bind a random port, which is never what a config means
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        Ok(())
    }

    fn validate_site(&self) -> Result<(), ConfigError> {
        let index_page = &self.site_resolved.index_page;
        require_non_empty(index_page, "site.index_page")?;

        if !is_valid_page_id(index_page) {
            return Err(ConfigError::Validation(format!(
                "site.index_page {index_page:?} is not a valid page identifier"
            )));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;
        Ok(())
    }

    /// Resolve relative paths against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.site_resolved = SiteConfig {
            pages_dir: resolve(self.site.pages_dir.as_deref(), "pages"),
            index_page: self
                .site
                .index_page
                .clone()
                .unwrap_or_else(|| SiteConfig::default().index_page),
        };
        self.cache_resolved = CacheConfig {
            enabled: self.cache.enabled.unwrap_or(true),
            dir: resolve(self.cache.dir.as_deref(), "cache"),
        };
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 5050);
        assert_eq!(config.site_resolved.pages_dir, PathBuf::from("/test/pages"));
        assert_eq!(config.site_resolved.index_page, "index");
        assert!(config.cache_resolved.enabled);
        assert_eq!(config.cache_resolved.dir, PathBuf::from("/test/cache"));
        assert!(config.config_path.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 5050);
    }

    #[test]
    fn test_parse_server_config() {
        let toml = r#"
[server]
host = "0.0.0.0"
port = 9000
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[site]
pages_dir = "content/pages"
index_page = "home"

[cache]
enabled = false
dir = ".folio/cache"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.site_resolved.pages_dir,
            PathBuf::from("/project/content/pages")
        );
        assert_eq!(config.site_resolved.index_page, "home");
        assert!(!config.cache_resolved.enabled);
        assert_eq!(
            config.cache_resolved.dir,
            PathBuf::from("/project/.folio/cache")
        );
    }

    #[test]
    fn test_resolve_paths_defaults() {
        let mut config: Config = toml::from_str("").unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(config.site_resolved.pages_dir, PathBuf::from("/project/pages"));
        assert_eq!(config.site_resolved.index_page, "index");
        assert!(config.cache_resolved.enabled);
        assert_eq!(config.cache_resolved.dir, PathBuf::from("/project/cache"));
    }

    #[test]
    fn test_load_explicit_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("folio.toml");
        fs::write(&path, "[server]\nport = 8080\n\n[site]\npages_dir = \"site\"\n").unwrap();

        let config = Config::load_from_file(&path).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.site_resolved.pages_dir, tmp.path().join("site"));
        assert_eq!(config.cache_resolved.dir, tmp.path().join("cache"));
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("missing.toml");

        let err = Config::load(Some(&path), None).unwrap_err();

        assert!(matches!(err, ConfigError::NotFound(p) if p == path));
    }

    #[test]
    fn test_load_invalid_toml() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("folio.toml");
        fs::write(&path, "[server\nport = ").unwrap();

        let err = Config::load_from_file(&path).unwrap_err();

        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_wrong_type() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("folio.toml");
        fs::write(&path, "[server]\nport = \"eighty\"\n").unwrap();

        assert!(matches!(
            Config::load_from_file(&path),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.apply_cli_settings(&CliSettings {
            host: Some("0.0.0.0".to_owned()),
            port: Some(9000),
            pages_dir: Some(PathBuf::from("/other/pages")),
            cache_enabled: Some(false),
        });

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.site_resolved.pages_dir, PathBuf::from("/other/pages"));
        assert!(!config.cache_resolved.enabled);
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 5050);
        assert!(config.cache_resolved.enabled);
    }

    #[test]
    fn test_apply_port_env() {
        let mut config = Config::default_with_base(Path::new("/test"));

        config.apply_port_env(Some("8081")).unwrap();
        assert_eq!(config.server.port, 8081);

        // Unset or blank leaves the port alone
        config.apply_port_env(None).unwrap();
        config.apply_port_env(Some("  ")).unwrap();
        assert_eq!(config.server.port, 8081);
    }

    #[test]
    fn test_apply_port_env_invalid() {
        let mut config = Config::default_with_base(Path::new("/test"));

        let err = config.apply_port_env(Some("http")).unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { ref field, .. } if field == "server.port"));
        assert!(err.to_string().contains("PORT"));
        assert_eq!(config.server.port, 5050);
    }

    #[test]
    fn test_cli_port_wins_over_env() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.apply_port_env(Some("8081")).unwrap();
        config.apply_cli_settings(&CliSettings {
            port: Some(9090),
            ..CliSettings::default()
        });

        assert_eq!(config.server.port, 9090);
    }

    #[test]
    fn test_expand_env_vars_server_host() {
        // SAFETY: variable is unique to this test
        unsafe {
            std::env::set_var("FOLIO_TEST_HOST", "0.0.0.0");
        }

        let mut config: Config = toml::from_str("[server]\nhost = \"${FOLIO_TEST_HOST}\"\n").unwrap();
        config.expand_env_vars().unwrap();
        assert_eq!(config.server.host, "0.0.0.0");

        unsafe {
            std::env::remove_var("FOLIO_TEST_HOST");
        }
    }

    #[test]
    fn test_expand_env_vars_missing_required_var() {
        let mut config: Config =
            toml::from_str("[server]\nhost = \"${FOLIO_TEST_HOST_UNSET}\"\n").unwrap();

        let err = config.expand_env_vars().unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { ref field, .. } if field == "server.host"));
    }

    #[test]
    fn test_validate_default_config_passes() {
        assert!(Config::default_with_base(Path::new("/test")).validate().is_ok());
    }

    #[test]
    fn test_validate_server_host_empty() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.server.host = String::new();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server.host"));
    }

    #[test]
    fn test_validate_server_port_zero() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.server.port = 0;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server.port"));
    }

    #[test]
    fn test_validate_index_page() {
        let mut config = Config::default_with_base(Path::new("/test"));

        config.site_resolved.index_page = "docs/home".to_owned();
        assert!(config.validate().is_ok());

        for bad in ["", "/home", "../home", "a//b"] {
            config.site_resolved.index_page = bad.to_owned();
            assert!(
                matches!(config.validate(), Err(ConfigError::Validation(_))),
                "{bad:?} should be rejected"
            );
        }
    }
}
