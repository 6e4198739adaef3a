//! Storage locations: database file, study asset root, JSONL trail directory.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

fn default_db_path() -> String {
    ".lab/lab.db".to_string()
}

fn default_assets_dir() -> String {
    ".lab/studies".to_string()
}

fn default_trail_dir() -> String {
    ".lab/trail".to_string()
}

const fn default_trail_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// libSQL database file, or `:memory:`.
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Root under which every study gets its `study_<id>` asset directory.
    #[serde(default = "default_assets_dir")]
    pub assets_dir: String,

    /// Directory for per-actor JSONL trail files.
    #[serde(default = "default_trail_dir")]
    pub trail_dir: String,

    /// Whether mutations are appended to the JSONL trail.
    #[serde(default = "default_trail_enabled")]
    pub trail_enabled: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            assets_dir: default_assets_dir(),
            trail_dir: default_trail_dir(),
            trail_enabled: default_trail_enabled(),
        }
    }
}

impl StorageConfig {
    /// Reject empty paths.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the empty field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("storage.db_path", &self.db_path),
            ("storage.assets_dir", &self.assets_dir),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: "must not be empty".to_string(),
                });
            }
        }
        if self.trail_enabled && self.trail_dir.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "storage.trail_dir".to_string(),
                reason: "must not be empty while the trail is enabled".to_string(),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn assets_path(&self) -> PathBuf {
        PathBuf::from(&self.assets_dir)
    }

    /// Trail directory, or `None` when the trail is disabled.
    #[must_use]
    pub fn trail_path(&self) -> Option<PathBuf> {
        self.trail_enabled.then(|| PathBuf::from(&self.trail_dir))
    }
}
