//! Configuration file parser for ~/.config/skiff/config.toml.
//!
//! The config file is optional; a missing file yields `Config::default()`.
//! Command-line flags are applied on top with [`Config::apply_overrides`] and
//! the result is checked once with [`Config::validate`] before anything
//! touches the database.
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::page::FilterId;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("No database configured: set db_path in the config file or pass --db")]
    MissingDbPath,

    #[error("Database {} does not exist or is not a regular file", .0.display())]
    DbNotFound(PathBuf),

    #[error("Invalid filter '{name}': {reason}")]
    InvalidFilter { name: String, reason: String },

    #[error("notify_capacity must be at least 1")]
    ZeroCapacity,
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// A saved filter shown at the top of the main menu
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FilterConfig {
    pub name: String,
    /// SQL condition over `rss_item` columns, e.g. `unread = 1`
    #[serde(default)]
    pub query: String,
    /// Tags to include; prefix with `!` to exclude
    #[serde(default)]
    pub tags: Vec<String>,
}

impl FilterConfig {
    fn check(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidFilter {
            name: self.name.clone(),
            reason: reason.to_string(),
        };
        if self.name.trim().is_empty() {
            return Err(invalid("name is empty"));
        }
        if self.name.contains(':') || self.query.contains(':') {
            return Err(invalid("name and query cannot contain ':'"));
        }
        if self.query.contains(';') {
            return Err(invalid("query cannot contain ';'"));
        }
        if let Some(tag) = self
            .tags
            .iter()
            .find(|t| t.trim_start_matches('!').trim().is_empty() || t.contains(|c| c == ',' || c == ':'))
        {
            return Err(invalid(&format!("bad tag '{tag}'")));
        }
        Ok(())
    }
}

/// Top-level configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// newsboat cache database
    pub db_path: Option<PathBuf>,

    /// newsboat urls file; feed tags are read from it at startup
    pub urls_path: Option<PathBuf>,

    /// `tracing` filter directive, e.g. "skiff=debug". `RUST_LOG` wins.
    pub log_level: Option<String>,

    /// Buffered unread-change notifications before new ones are dropped
    pub notify_capacity: usize,

    pub filters: Vec<FilterConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: None,
            urls_path: None,
            log_level: None,
            notify_capacity: 32,
            filters: Vec::new(),
        }
    }
}

impl Config {
    /// Maximum config file size (1 MiB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 5] = [
        "db_path",
        "urls_path",
        "log_level",
        "notify_capacity",
        "filters",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing or empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(
            path = %path.display(),
            filters = config.filters.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Command-line values replace whatever the file said
    pub fn apply_overrides(&mut self, db_path: Option<PathBuf>, urls_path: Option<PathBuf>) {
        if db_path.is_some() {
            self.db_path = db_path;
        }
        if urls_path.is_some() {
            self.urls_path = urls_path;
        }
    }

    /// Check everything that can be checked before startup
    pub fn validate(&self) -> Result<(), ConfigError> {
        let db_path = self.db_path.as_deref().ok_or(ConfigError::MissingDbPath)?;
        if !db_path.is_file() {
            return Err(ConfigError::DbNotFound(db_path.to_path_buf()));
        }
        if self.notify_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        self.filters.iter().try_for_each(FilterConfig::check)
    }

    /// Validated database path
    pub fn db_path(&self) -> Result<&Path, ConfigError> {
        self.db_path.as_deref().ok_or(ConfigError::MissingDbPath)
    }

    pub fn filter_ids(&self) -> Vec<FilterId> {
        self.filters
            .iter()
            .map(|f| FilterId::new(f.name.trim(), f.query.trim(), &f.tags))
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
