//! # Configuration
//!
//! Application configuration loaded once at startup.
//!
//! ## Configuration Sources (later overrides earlier)
//! 1. Defaults (this file)
//! 2. Config file (`shopfront.toml` in the platform config dir, or `--config`)
//! 3. Environment variables (`SHOPFRONT_*`)
//!
//! ## Example `shopfront.toml`
//! ```toml
//! api_url = "https://shop.example.com/api"
//! database_path = "/var/lib/shopfront/shopfront.db"
//! currency_symbol = "€"
//! ```
//!
//! ## Thread Safety
//! Read-only after load, so no lock.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use shopfront_api::DEFAULT_API_URL;
use shopfront_core::Money;

use crate::error::{AppError, AppResult};

const CONFIG_FILE: &str = "shopfront.toml";
const DATABASE_FILE: &str = "shopfront.db";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the storefront REST backend.
    pub api_url: String,

    /// Local storage file. `None` means the platform data directory.
    pub database_path: Option<PathBuf>,

    /// Symbol printed in front of amounts.
    pub currency_symbol: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            api_url: DEFAULT_API_URL.to_string(),
            database_path: None,
            currency_symbol: "$".to_string(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// An explicit `config_path` that does not exist is an error; a missing
    /// default file is not.
    pub fn load(config_path: Option<PathBuf>) -> AppResult<Self> {
        let explicit = config_path.is_some();
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                config = Self::from_file(&path)?;
            } else if explicit {
                return Err(AppError::validation(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;

        Ok(config)
    }

    fn from_file(path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::validation(format!("Cannot read config {}: {}", path.display(), e))
        })?;
        Self::from_toml(&contents)
    }

    /// Parses a TOML document. Missing fields keep their defaults.
    pub fn from_toml(contents: &str) -> AppResult<Self> {
        toml::from_str(contents)
            .map_err(|e| AppError::validation(format!("Invalid config file: {}", e)))
    }

    /// Applies `SHOPFRONT_*` overrides read through `lookup`.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("SHOPFRONT_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.api_url = url;
        }

        if let Some(path) = lookup("SHOPFRONT_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database_path = Some(PathBuf::from(path));
        }

        if let Some(symbol) = lookup("SHOPFRONT_CURRENCY_SYMBOL") {
            self.currency_symbol = symbol;
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> AppResult<()> {
        let url = Url::parse(&self.api_url).map_err(|e| {
            AppError::validation(format!("api_url '{}' is not a URL: {}", self.api_url, e))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(AppError::validation(format!(
                "api_url must start with http:// or https://, got: {}",
                self.api_url
            )));
        }

        Ok(())
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("com", "shopfront", "shopfront")
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Resolves the local storage file, creating its directory.
    ///
    /// ## Platform-Specific Paths
    /// - **Linux**: `~/.local/share/shopfront/shopfront.db`
    /// - **macOS**: `~/Library/Application Support/com.shopfront.shopfront/shopfront.db`
    /// - **Windows**: `%APPDATA%\shopfront\shopfront\data\shopfront.db`
    pub fn resolve_database_path(&self) -> AppResult<PathBuf> {
        let path = match &self.database_path {
            Some(path) => path.clone(),
            None => Self::project_dirs()
                .map(|dirs| dirs.data_dir().join(DATABASE_FILE))
                .ok_or_else(|| AppError::internal("Could not determine app data directory"))?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::internal(format!("Cannot create {}: {}", parent.display(), e))
            })?;
        }

        Ok(path)
    }

    /// Formats an amount with the configured symbol.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = AppConfig::default();
    /// assert_eq!(config.format_currency(Money::from_cents(1234)), "$12.34");
    /// ```
    pub fn format_currency(&self, amount: Money) -> String {
        let cents = amount.cents();
        format!(
            "{}{}{}.{:02}",
            if cents < 0 { "-" } else { "" },
            self.currency_symbol,
            (cents / 100).abs(),
            (cents % 100).abs()
        )
    }
}
