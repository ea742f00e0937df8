//! Configuration loading and management
//!
//! Handles parsing of `taskstash.toml` in the data directory.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::lock::DEFAULT_LOCK_TIMEOUT_MS;
use crate::task::{Priority, DESCRIPTION_WIDTH};

/// Configuration file name inside the data directory
pub const CONFIG_FILE: &str = "taskstash.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Storage keys and locking
    #[serde(default)]
    pub storage: StorageConfig,

    /// Defaults for new tasks
    #[serde(default)]
    pub tasks: TasksConfig,

    /// Presentation settings
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Storage keys for each collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Key holding active tasks
    #[serde(default = "default_tasks_key")]
    pub tasks_key: String,

    /// Key holding completed tasks
    #[serde(default = "default_done_key")]
    pub done_key: String,

    /// Key holding category names
    #[serde(default = "default_categories_key")]
    pub categories_key: String,

    /// Key holding an in-flight move between collections
    #[serde(default = "default_pending_key")]
    pub pending_key: String,

    /// How long to wait for the data directory lock
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_tasks_key() -> String {
    "@logs_task".to_string()
}

fn default_done_key() -> String {
    "@logs_done".to_string()
}

fn default_categories_key() -> String {
    "@logs_category".to_string()
}

fn default_pending_key() -> String {
    "@logs_pending".to_string()
}

fn default_lock_timeout_ms() -> u64 {
    DEFAULT_LOCK_TIMEOUT_MS
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            tasks_key: default_tasks_key(),
            done_key: default_done_key(),
            categories_key: default_categories_key(),
            pending_key: default_pending_key(),
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

/// Task defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksConfig {
    /// Priority for tasks created without one (1 = high, 3 = low)
    #[serde(default = "default_priority")]
    pub default_priority: u8,
}

fn default_priority() -> u8 {
    Priority::Medium.rank()
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            default_priority: default_priority(),
        }
    }
}

impl TasksConfig {
    pub fn priority(&self) -> Priority {
        Priority::try_from(self.default_priority).unwrap_or_default()
    }
}

/// Presentation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Characters of description/category shown before `...`
    #[serde(default = "default_description_width")]
    pub description_width: usize,
}

fn default_description_width() -> usize {
    DESCRIPTION_WIDTH
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            description_width: default_description_width(),
        }
    }
}

impl Config {
    /// Load configuration from a `taskstash.toml` file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a data directory, or return defaults
    pub fn load_from_dir(data_dir: &Path) -> Result<Self> {
        let config_path = data_dir.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<()> {
        self.storage.validate()?;
        if Priority::try_from(self.tasks.default_priority).is_err() {
            return Err(Error::InvalidConfig(format!(
                "tasks.default_priority must be 1, 2 or 3 (got {})",
                self.tasks.default_priority
            )));
        }
        if self.display.description_width == 0 {
            return Err(Error::InvalidConfig(
                "display.description_width must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl StorageConfig {
    fn validate(&self) -> Result<()> {
        let keys = [
            ("storage.tasks_key", &self.tasks_key),
            ("storage.done_key", &self.done_key),
            ("storage.categories_key", &self.categories_key),
            ("storage.pending_key", &self.pending_key),
        ];
        let mut seen = HashSet::new();
        for (field, key) in keys {
            if key.trim().is_empty() {
                return Err(Error::InvalidConfig(format!("{field} cannot be empty")));
            }
            if !seen.insert(key.as_str()) {
                return Err(Error::InvalidConfig(format!(
                    "{field} reuses key '{key}'; every collection needs its own key"
                )));
            }
        }
        if self.lock_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "storage.lock_timeout_ms must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Platform data directory used when none is given explicitly
pub fn default_data_dir() -> Result<PathBuf> {
    ProjectDirs::from("", "", "taskstash")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or(Error::NoDataDir)
}
