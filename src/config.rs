//! Configuration management for Cryptoblog
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{BlogError, Result};
use crate::post::Principal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Backends accepted by `service.backend`.
const VALID_BACKENDS: [&str; 2] = ["http", "memory"];

/// Main configuration structure for Cryptoblog
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Post service connection settings
    #[serde(default)]
    pub service: ServiceConfig,
    /// Identity provider and session settings
    #[serde(default)]
    pub identity: IdentityConfig,
    /// View behavior settings
    #[serde(default)]
    pub view: ViewConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Post service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Which binding to use: `http` for the remote service, `memory` for
    /// the in-process store
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Base URL of the remote post service
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_backend() -> String {
    "http".to_string()
}

fn default_endpoint() -> String {
    "http://127.0.0.1:4943/api/backend".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            endpoint: default_endpoint(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Identity provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Authorization page of the identity provider
    #[serde(default = "default_provider_url")]
    pub provider_url: String,

    /// Requested session lifetime (hours)
    #[serde(default = "default_max_time_to_live_hours")]
    pub max_time_to_live_hours: u64,

    /// Loopback port for the login callback; 0 picks a free port
    #[serde(default)]
    pub redirect_port: u16,

    /// Try to open the authorization page in a browser
    #[serde(default = "default_open_browser")]
    pub open_browser: bool,

    /// Keyring service name sessions are stored under
    #[serde(default = "default_keyring_service")]
    pub keyring_service: String,

    /// Principal used by the local development identity (memory backend)
    #[serde(default)]
    pub local_principal: Option<String>,
}

fn default_provider_url() -> String {
    "https://identity.ic0.app/#authorize".to_string()
}

fn default_max_time_to_live_hours() -> u64 {
    8
}

fn default_open_browser() -> bool {
    true
}

fn default_keyring_service() -> String {
    "cryptoblog".to_string()
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            provider_url: default_provider_url(),
            max_time_to_live_hours: default_max_time_to_live_hours(),
            redirect_port: 0,
            open_browser: default_open_browser(),
            keyring_service: default_keyring_service(),
            local_principal: None,
        }
    }
}

/// View behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Only logged-in users may submit posts
    #[serde(default = "default_require_login")]
    pub require_login: bool,

    /// `strftime` format for post timestamps
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

fn default_require_login() -> bool {
    true
}

fn default_date_format() -> String {
    "%Y-%m-%d %H:%M:%S".to_string()
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            require_login: default_require_login(),
            date_format: default_date_format(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json_format: bool,

    /// Optional file that receives a copy of every log line
    #[serde(default)]
    pub file_path: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
            file_path: None,
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// A missing file is not an error: defaults are used and a warning is
    /// logged.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else if let Some(user_path) = Self::user_config_path().filter(|p| p.exists()) {
            tracing::debug!("Using user config at {}", user_path.display());
            Self::from_file(&user_path.to_string_lossy())?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    /// Per-user config location, e.g. `~/.config/cryptoblog/config.yaml`
    pub fn user_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("org", "cryptoblog", "cryptoblog")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| BlogError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| BlogError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(backend) = std::env::var("CRYPTOBLOG_BACKEND") {
            self.service.backend = backend;
        }

        if let Ok(endpoint) = std::env::var("CRYPTOBLOG_ENDPOINT") {
            self.service.endpoint = endpoint;
        }

        if let Ok(timeout) = std::env::var("CRYPTOBLOG_TIMEOUT_SECONDS") {
            match timeout.parse::<u64>() {
                Ok(value) => self.service.timeout_seconds = value,
                Err(_) => tracing::warn!(
                    "Ignoring CRYPTOBLOG_TIMEOUT_SECONDS={}: not a number",
                    timeout
                ),
            }
        }

        if let Ok(provider_url) = std::env::var("CRYPTOBLOG_IDENTITY_PROVIDER") {
            self.identity.provider_url = provider_url;
        }

        if let Ok(principal) = std::env::var("CRYPTOBLOG_LOCAL_PRINCIPAL") {
            self.identity.local_principal = Some(principal);
        }

        if let Ok(require_login) = std::env::var("CRYPTOBLOG_REQUIRE_LOGIN") {
            match require_login.to_lowercase().as_str() {
                "1" | "true" | "yes" => self.view.require_login = true,
                "0" | "false" | "no" => self.view.require_login = false,
                other => tracing::warn!("Ignoring CRYPTOBLOG_REQUIRE_LOGIN={}", other),
            }
        }

        if let Ok(level) = std::env::var("CRYPTOBLOG_LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(endpoint) = &cli.endpoint {
            self.service.endpoint = endpoint.clone();
        }

        if cli.offline {
            self.service.backend = "memory".to_string();
        }

        if cli.json_logs {
            self.logging.json_format = true;
        }

        if cli.verbose {
            self.logging.level = "debug".to_string();
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if !VALID_BACKENDS.contains(&self.service.backend.as_str()) {
            return Err(BlogError::Config(format!(
                "Invalid service backend: {}. Must be one of: {}",
                self.service.backend,
                VALID_BACKENDS.join(", ")
            ))
            .into());
        }

        if self.service.backend == "http" {
            url::Url::parse(&self.service.endpoint).map_err(|e| {
                BlogError::Config(format!(
                    "service.endpoint is not a valid URL ({}): {}",
                    self.service.endpoint, e
                ))
            })?;
        }

        if self.service.timeout_seconds == 0 {
            return Err(BlogError::Config(
                "service.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        url::Url::parse(&self.identity.provider_url).map_err(|e| {
            BlogError::Config(format!(
                "identity.provider_url is not a valid URL ({}): {}",
                self.identity.provider_url, e
            ))
        })?;

        if self.identity.max_time_to_live_hours == 0 || self.identity.max_time_to_live_hours > 720
        {
            return Err(BlogError::Config(
                "identity.max_time_to_live_hours must be between 1 and 720".to_string(),
            )
            .into());
        }

        if self.identity.keyring_service.trim().is_empty() {
            return Err(BlogError::Config(
                "identity.keyring_service cannot be empty".to_string(),
            )
            .into());
        }

        if let Some(principal) = &self.identity.local_principal {
            Principal::parse(principal).map_err(|e| {
                BlogError::Config(format!("identity.local_principal: {}", e))
            })?;
        }

        if self.view.date_format.trim().is_empty() {
            return Err(
                BlogError::Config("view.date_format cannot be empty".to_string()).into(),
            );
        }

        if chrono::format::StrftimeItems::new(&self.view.date_format)
            .any(|item| matches!(item, chrono::format::Item::Error))
        {
            return Err(BlogError::Config(format!(
                "view.date_format is not a valid strftime format: {}",
                self.view.date_format
            ))
            .into());
        }

        Ok(())
    }
}
