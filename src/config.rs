//! Configuration management for Assis
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{AssisError, Result};
use anyhow::Context;
use crate::storage::{DEFAULT_BUSY_TIMEOUT_MS, DEFAULT_CONVERSATION_TITLE, HISTORY_DB_ENV};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

/// Main configuration structure for Assis
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Database location and connection behavior
    #[serde(default)]
    pub storage: StorageConfig,
    /// Conversation defaults and listing behavior
    #[serde(default)]
    pub conversation: ConversationConfig,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path of the SQLite file. `None` uses the user's data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// How long to wait on a database locked by another process (milliseconds)
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

/// Conversation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// Title used when a conversation is created without one
    #[serde(default = "default_title")]
    pub default_title: String,

    /// Number of conversations shown by `history list` when no limit is given
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,

    /// Titles longer than this are shortened in listings
    #[serde(default = "default_title_display_width")]
    pub title_display_width: usize,
}

fn default_title() -> String {
    DEFAULT_CONVERSATION_TITLE.to_string()
}

fn default_recent_limit() -> usize {
    10
}

fn default_title_display_width() -> usize {
    30
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            default_title: default_title(),
            recent_limit: default_recent_limit(),
            title_display_width: default_title_display_width(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
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
        } else {
            tracing::debug!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(AssisError::Io)
            .with_context(|| format!("Failed to read config file {}", path))?;
        let config = serde_yaml::from_str(&contents)
            .map_err(AssisError::Yaml)
            .with_context(|| format!("Failed to parse config file {}", path))?;
        Ok(config)
    }

    fn apply_env_vars(&mut self) {
        if let Ok(db_path) = std::env::var(HISTORY_DB_ENV) {
            self.storage.path = Some(PathBuf::from(db_path));
        }

        if let Ok(timeout) = std::env::var("ASSIS_BUSY_TIMEOUT_MS") {
            if let Ok(value) = timeout.parse() {
                self.storage.busy_timeout_ms = value;
            } else {
                tracing::warn!("Invalid ASSIS_BUSY_TIMEOUT_MS: {}", timeout);
            }
        }

        if let Ok(limit) = std::env::var("ASSIS_RECENT_LIMIT") {
            if let Ok(value) = limit.parse() {
                self.conversation.recent_limit = value;
            } else {
                tracing::warn!("Invalid ASSIS_RECENT_LIMIT: {}", limit);
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(db_path) = &cli.storage_path {
            tracing::info!("Using storage DB override from CLI: {}", db_path);
            self.storage.path = Some(PathBuf::from(db_path));
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.storage.busy_timeout_ms > 600_000 {
            return Err(AssisError::Config(
                "storage.busy_timeout_ms must be less than or equal to 600000".to_string(),
            )
            .into());
        }

        if let Some(path) = &self.storage.path {
            if path.as_os_str().is_empty() {
                return Err(
                    AssisError::Config("storage.path cannot be empty".to_string()).into(),
                );
            }
        }

        if self.conversation.default_title.trim().is_empty() {
            return Err(AssisError::Config(
                "conversation.default_title cannot be empty".to_string(),
            )
            .into());
        }

        if self.conversation.recent_limit == 0 {
            return Err(AssisError::Config(
                "conversation.recent_limit must be greater than 0".to_string(),
            )
            .into());
        }

        if self.conversation.title_display_width < 4 {
            return Err(AssisError::Config(
                "conversation.title_display_width must be at least 4".to_string(),
            )
            .into());
        }

        Ok(())
    }
}
