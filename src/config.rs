//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::client::{ClientConfig, DEFAULT_BASE_URL};
use crate::state::StalePolicy;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub calendar: CalendarConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Unset waits for the backend indefinitely
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: None,
        }
    }
}

/// Where the auth token is persisted
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_token_path")]
    pub token_path: PathBuf,
}

fn default_token_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|p| p.join("bizdesk"))
        .unwrap_or_else(|| PathBuf::from(".bizdesk"))
        .join("token.json")
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_path: default_token_path(),
        }
    }
}

/// Calendar view configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CalendarConfig {
    #[serde(default)]
    pub stale_results: StalePolicy,

    #[serde(default = "default_preview_limit")]
    pub preview_limit: usize,
}

fn default_preview_limit() -> usize {
    2
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            stale_results: StalePolicy::default(),
            preview_limit: default_preview_limit(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from an explicit path, or the default locations, or environment
    ///
    /// An explicit path must exist and parse. Default locations that fail
    /// to load are skipped and returned alongside the config, so the caller
    /// can report them once logging is up.
    pub fn resolve(explicit: Option<&Path>) -> Result<(Self, Vec<ConfigError>), ConfigError> {
        match explicit {
            Some(path) => Ok((Self::load_with_env(path)?, Vec::new())),
            None => Ok(Self::search(&Self::default_paths())),
        }
    }

    /// First of `paths` that loads, plus the errors of those that existed
    /// but did not
    fn search(paths: &[PathBuf]) -> (Self, Vec<ConfigError>) {
        let mut skipped = Vec::new();
        for path in paths {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::debug!("Loaded config from {:?}", path);
                        return (config, skipped);
                    }
                    Err(e) => skipped.push(e),
                }
            }
        }

        tracing::debug!("Using default config with environment overrides");
        (Self::from_env(), skipped)
    }

    /// Config file locations, in search order
    pub fn default_paths() -> Vec<PathBuf> {
        [
            dirs::config_dir().map(|p| p.join("bizdesk").join("config.toml")),
            Some(PathBuf::from("./bizdesk.toml")),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // API overrides
        if let Some(url) = var("BIZDESK_API_URL") {
            self.api.base_url = url;
        }
        if let Some(timeout) = var("BIZDESK_TIMEOUT_SECS") {
            match timeout.parse() {
                Ok(secs) => self.api.request_timeout_secs = Some(secs),
                Err(_) => tracing::warn!("Ignoring invalid BIZDESK_TIMEOUT_SECS: {}", timeout),
            }
        }

        // Session overrides
        if let Some(path) = var("BIZDESK_TOKEN_PATH") {
            self.session.token_path = PathBuf::from(path);
        }

        // Logging overrides
        if let Some(level) = var("BIZDESK_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("BIZDESK_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    /// HTTP client settings derived from the `[api]` section
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api.base_url.clone(),
            request_timeout: self.api.request_timeout_secs.map(Duration::from_secs),
            ..ClientConfig::default()
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Bizdesk Configuration
#
# Environment variables override these settings:
# - BIZDESK_API_URL
# - BIZDESK_TIMEOUT_SECS
# - BIZDESK_TOKEN_PATH
# - BIZDESK_LOG_LEVEL
# - BIZDESK_LOG_FORMAT

[api]
# Backend base URL, including the /api prefix
base_url = "http://127.0.0.1:8000/api"

# Request timeout in seconds (unset waits indefinitely)
# request_timeout_secs = 30

[session]
# Where the auth token is stored between runs
# token_path = "~/.local/share/bizdesk/token.json"

[calendar]
# Results of superseded calendar fetches: discard or apply
stale_results = "discard"

# Entries previewed per day cell in the month grid
preview_limit = 2

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
