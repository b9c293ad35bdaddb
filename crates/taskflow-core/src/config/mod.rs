mod defaults;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::TaskFlowError;
use defaults::*;

/// Top-level TaskFlow configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub taskflow: TaskFlowConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskFlowConfig {
    /// Default log filter, overridden by `RUST_LOG` when set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for TaskFlowConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Store config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

/// Directive synchronization config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// `chrono` format string used to parse directive `dueDate` values.
    #[serde(default = "default_date_format")]
    pub date_format: String,
    /// Base URL prepended when building task links for notifications.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            date_format: default_date_format(),
            base_url: default_base_url(),
        }
    }
}

/// Reminder scheduler config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Minutes between reminder passes. Windows are an hour wide, so the
    /// default of 60 evaluates each one exactly once.
    #[serde(default = "default_poll_minutes")]
    pub poll_minutes: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_minutes: default_poll_minutes(),
        }
    }
}

impl SyncConfig {
    /// Build the task URL embedded in notification params: the document
    /// view URL with the record id as fragment.
    pub fn task_url(&self, doc: &crate::task::DocumentId, rid: &str) -> String {
        format!("{}/{doc}#{rid}", self.base_url.trim_end_matches('/'))
    }
}

/// Expand a leading `~/` using `$HOME`.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

/// Load configuration from a TOML file, falling back to defaults when the
/// file does not exist.
pub fn load(path: &str) -> Result<Config, TaskFlowError> {
    let path = Path::new(path);
    if !path.exists() {
        tracing::info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| TaskFlowError::Config(format!("failed to read {}: {e}", path.display())))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| TaskFlowError::Config(format!("failed to parse config: {e}")))?;

    Ok(config)
}
