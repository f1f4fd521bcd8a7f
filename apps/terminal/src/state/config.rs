//! # Terminal Configuration
//!
//! Settings loaded once at startup.
//!
//! ## Load Order (later overrides earlier)
//! ```text
//! TerminalConfig::default()
//!        │
//!        ▼
//! terminal.toml  (platform config dir, or an explicit path)
//!        │
//!        ▼
//! CAJA_* environment variables
//!        │
//!        ▼
//! validate()  ── bad URL / zero limit ──► ConfigError
//! ```
//!
//! | Variable             | Field           |
//! |----------------------|-----------------|
//! | `CAJA_BACKEND_URL`   | `backend_url`   |
//! | `CAJA_STORE_NAME`    | `store_name`    |
//! | `CAJA_DB_PATH`       | `db_path`       |
//! | `CAJA_CATALOG_LIMIT` | `catalog_limit` |
//! | `CAJA_TIMEOUT_SECS`  | `timeout_secs`  |

use std::path::PathBuf;
use std::time::Duration;

use caja_client::{ClientConfig, ClientResult, DEFAULT_BASE_URL};
use caja_core::Money;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Could not determine the application data directory")]
    NoDataDir,
}

/// Terminal settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    /// Shown in the header and on reports.
    pub store_name: String,

    /// Prefix for formatted amounts. Default: "$"
    pub currency_symbol: String,

    /// Default: http://localhost:8000/api
    pub backend_url: String,

    /// Per-request timeout. Default: 10
    pub timeout_secs: u64,

    /// Backoff budget for reads when the backend is unreachable; 0 disables.
    /// Default: 5
    pub retry_window_secs: u64,

    /// `limit` sent with `GET /products`. Default: 500
    pub catalog_limit: usize,

    /// `limit` sent with `GET /sales` and `GET /withdrawals`. Default: 100
    pub report_limit: usize,

    /// SQLite file for the cash box. Defaults to the platform data dir.
    pub db_path: Option<PathBuf>,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        TerminalConfig {
            store_name: "Botillería".to_string(),
            currency_symbol: "$".to_string(),
            backend_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
            retry_window_secs: 5,
            catalog_limit: 500,
            report_limit: 100,
            db_path: None,
        }
    }
}

impl TerminalConfig {
    /// Loads defaults, then the TOML file, then environment overrides.
    ///
    /// A missing file is not an error; an unreadable or malformed one is.
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading terminal config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parses a TOML document on top of the defaults.
    pub fn from_toml(contents: &str) -> ConfigResult<Self> {
        let config: TerminalConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let url = Url::parse(&self.backend_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", self.backend_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl(format!(
                "Backend URL must start with http:// or https://, got: {}",
                self.backend_url
            )));
        }

        if self.catalog_limit == 0 {
            return Err(ConfigError::Invalid(
                "catalog_limit must be greater than 0".into(),
            ));
        }
        if self.report_limit == 0 {
            return Err(ConfigError::Invalid(
                "report_limit must be greater than 0".into(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "timeout_secs must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Applies `CAJA_*` overrides read through `lookup`.
    ///
    /// Unparseable numbers are logged and ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("CAJA_BACKEND_URL") {
            debug!(backend_url = %url, "Overriding backend URL from environment");
            self.backend_url = url;
        }

        if let Some(name) = lookup("CAJA_STORE_NAME") {
            self.store_name = name;
        }

        if let Some(path) = lookup("CAJA_DB_PATH") {
            self.db_path = Some(PathBuf::from(path));
        }

        if let Some(limit) = lookup("CAJA_CATALOG_LIMIT") {
            match limit.parse() {
                Ok(limit) => self.catalog_limit = limit,
                Err(_) => warn!(value = %limit, "Ignoring invalid CAJA_CATALOG_LIMIT"),
            }
        }

        if let Some(secs) = lookup("CAJA_TIMEOUT_SECS") {
            match secs.parse() {
                Ok(secs) => self.timeout_secs = secs,
                Err(_) => warn!(value = %secs, "Ignoring invalid CAJA_TIMEOUT_SECS"),
            }
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("cl", "caja", "pos").map(|dirs| dirs.config_dir().join("terminal.toml"))
    }

    /// Resolves the cash box database file, creating its directory.
    ///
    /// ## Platform-Specific Paths
    /// - **Linux**: `~/.local/share/pos/caja.db`
    /// - **macOS**: `~/Library/Application Support/cl.caja.pos/caja.db`
    /// - **Windows**: `%APPDATA%\caja\pos\data\caja.db`
    pub fn database_path(&self) -> ConfigResult<PathBuf> {
        let path = match &self.db_path {
            Some(path) => path.clone(),
            None => ProjectDirs::from("cl", "caja", "pos")
                .ok_or(ConfigError::NoDataDir)?
                .data_dir()
                .join("caja.db"),
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(path)
    }

    pub fn client_config(&self) -> ClientResult<ClientConfig> {
        Ok(ClientConfig::new(&self.backend_url)?
            .timeout(Duration::from_secs(self.timeout_secs))
            .retry_window(Duration::from_secs(self.retry_window_secs)))
    }

    /// Formats an amount with the configured symbol: `$15.000`.
    pub fn format_money(&self, amount: Money) -> String {
        amount.format_with(&self.currency_symbol)
    }
}
