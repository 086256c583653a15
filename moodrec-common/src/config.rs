//! Bootstrap configuration loading
//!
//! Configuration sources, highest priority first:
//! 1. Command-line arguments (handled by the binary)
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Built-in defaults (code constants)
//!
//! A missing TOML file is not fatal: the service starts on defaults and logs
//! a warning. Upstream credentials that resolve to nothing are reported per
//! request instead of at startup.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable holding the TMDb API key
pub const TMDB_API_KEY_ENV: &str = "TMDB_API_KEY";

/// Environment variable holding the RAWG API key
pub const RAWG_API_KEY_ENV: &str = "RAWG_API_KEY";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Interface to bind
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// TMDb API key (movies, watch providers, reviews)
    #[serde(default)]
    pub tmdb_api_key: Option<String>,

    /// RAWG API key (games, stores)
    #[serde(default)]
    pub rawg_api_key: Option<String>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Upstream catalog provider settings
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Inference sidecar endpoints
    #[serde(default)]
    pub inference: InferenceConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Upstream catalog provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_tmdb_base_url")]
    pub tmdb_base_url: String,

    #[serde(default = "default_rawg_base_url")]
    pub rawg_base_url: String,

    /// Per-call timeout for every outbound request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Client-side rate limit applied per provider
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
}

/// Inference sidecar configuration
///
/// When an endpoint is absent the matching streaming route rejects
/// connections.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InferenceConfig {
    #[serde(default)]
    pub face_url: Option<String>,

    #[serde(default)]
    pub voice_url: Option<String>,
}

fn default_port() -> u16 {
    8000
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_tmdb_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_rawg_base_url() -> String {
    "https://api.rawg.io/api".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_requests_per_second() -> u32 {
    40
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_address: default_bind_address(),
            tmdb_api_key: None,
            rawg_api_key: None,
            logging: LoggingConfig::default(),
            upstream: UpstreamConfig::default(),
            inference: InferenceConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            tmdb_base_url: default_tmdb_base_url(),
            rawg_base_url: default_rawg_base_url(),
            timeout_secs: default_timeout_secs(),
            requests_per_second: default_requests_per_second(),
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Load configuration from a file
    ///
    /// A missing file yields defaults; an unreadable or malformed file is an
    /// error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(
                "Config file not found: {} (using built-in defaults)",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Resolve the TMDb key: environment first, then TOML
    pub fn resolve_tmdb_api_key(&self) -> Option<String> {
        resolve_api_key(TMDB_API_KEY_ENV, self.tmdb_api_key.as_deref())
    }

    /// Resolve the RAWG key: environment first, then TOML
    pub fn resolve_rawg_api_key(&self) -> Option<String> {
        resolve_api_key(RAWG_API_KEY_ENV, self.rawg_api_key.as_deref())
    }
}

/// Default configuration file path for the platform
///
/// `<config_dir>/moodrec/config.toml`, or `./moodrec.toml` when the
/// platform has no configuration directory.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("moodrec").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("moodrec.toml"))
}

/// Resolve an API key from environment then TOML
///
/// Blank values are skipped. Returns `None` when no source holds a valid
/// key.
pub fn resolve_api_key(env_var: &str, toml_value: Option<&str>) -> Option<String> {
    let env_key = std::env::var(env_var).ok().filter(|k| is_valid_key(k));
    let toml_key = toml_value.filter(|k| is_valid_key(k));

    if env_key.is_some() && toml_key.is_some() {
        warn!(
            "{} found in both environment and TOML. Using environment (highest priority).",
            env_var
        );
    }

    if let Some(key) = env_key {
        info!("{} loaded from environment variable", env_var);
        return Some(key.trim().to_string());
    }

    if let Some(key) = toml_key {
        info!("{} loaded from TOML config", env_var);
        return Some(key.trim().to_string());
    }

    warn!("{} not configured", env_var);
    None
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_key() {
        assert!(is_valid_key("abc"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("   \t"));
    }

    #[test]
    fn test_defaults() {
        let config = TomlConfig::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.upstream.timeout_secs, 30);
        assert!(config.inference.face_url.is_none());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.bind_address, "0.0.0.0");
        assert_eq!(config.upstream.rawg_base_url, "https://api.rawg.io/api");
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("port = \"not a number\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
