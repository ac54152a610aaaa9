//! Configuration for the sourcing engine.
//!
//! Loaded from `~/.sourcing/config.json` unless a path is given. Every field
//! has a serde default so partial files are valid.

use anyhow::{Context, Result};
use directories::UserDirs;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Longest accepted cache TTL (30 days).
pub const MAX_CACHE_TTL_SECS: i64 = 30 * 24 * 3600;

/// Environment variable that points at an explicit config file.
pub const CONFIG_PATH_ENV: &str = "SOURCING_CONFIG";

/// Get the configuration directory (`~/.sourcing`).
pub fn config_dir() -> PathBuf {
    UserDirs::new()
        .map(|d| d.home_dir().join(".sourcing"))
        .unwrap_or_else(|| PathBuf::from(".sourcing"))
}

/// Get the main configuration file path.
pub fn config_path() -> PathBuf {
    std::env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| config_dir().join("config.json"))
}

/// Read and parse a JSON config file into any serde type.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config from {}", path.display()))
}

// ============================================================================
// Root Config
// ============================================================================

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Batch orchestration settings
    #[serde(default)]
    pub engine: EngineSettings,
}

impl Config {
    /// Load configuration from the default location, falling back to defaults.
    pub fn load() -> Result<Self> {
        let path = config_path();
        if !path.exists() {
            tracing::info!("Config file not found, using defaults");
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        load_json(path)
    }

    /// Load configuration and apply environment variable overrides.
    pub fn load_with_env() -> Result<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply `SOURCING_*` environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(level) = std::env::var("SOURCING_LOG_LEVEL") {
            self.observability.log_level = level;
        }
        if let Ok(format) = std::env::var("SOURCING_LOG_FORMAT") {
            self.observability.log_format = format;
        }
        if let Ok(value) = std::env::var("SOURCING_MAX_CONCURRENCY") {
            if let Ok(n) = value.parse() {
                self.engine.max_concurrency = n;
            }
        }
        if let Ok(value) = std::env::var("SOURCING_CANDIDATE_TIMEOUT_MS") {
            if let Ok(ms) = value.parse() {
                self.engine.candidate_timeout_ms = ms;
            }
        }
    }
}

// ============================================================================
// Observability
// ============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level", alias = "level")]
    pub log_level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format", alias = "format")]
    pub log_format: String,

    /// Additional module targets to set to `warn`.
    #[serde(default)]
    pub excluded_targets: Vec<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
            excluded_targets: Vec::new(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

// ============================================================================
// Engine Settings
// ============================================================================

/// Runtime settings for batch analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Maximum number of candidates analyzed concurrently
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Per-candidate analysis timeout in milliseconds
    #[serde(default = "default_candidate_timeout_ms")]
    pub candidate_timeout_ms: u64,

    /// Page size when a request does not specify one
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// Competitor listings requested per product
    #[serde(default = "default_competitor_limit")]
    pub competitor_limit: usize,

    /// TTL for cached analyses, in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: i64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            candidate_timeout_ms: default_candidate_timeout_ms(),
            default_limit: default_limit(),
            competitor_limit: default_competitor_limit(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

fn default_max_concurrency() -> usize {
    4
}

fn default_candidate_timeout_ms() -> u64 {
    10_000
}

fn default_limit() -> usize {
    10
}

fn default_competitor_limit() -> usize {
    20
}

fn default_cache_ttl_secs() -> i64 {
    3600
}

// ============================================================================
// Tests
// ============================================================================
