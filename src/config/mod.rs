//! Configuration loading and management

mod io;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::progress::{ConfigError, EngineRules};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Engine constants (XP per level, combo window, badge thresholds)
    #[serde(default)]
    pub engine: EngineRules,

    /// General settings
    #[serde(default)]
    pub settings: Settings,
}

/// General settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Quiet period (ms) before a changed snapshot is written
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: i64,

    /// Database file; defaults to ~/.illusion-progress/progress.db
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Reward used when none is given on the command line
    #[serde(default = "default_reward")]
    pub default_reward: i64,

    /// User id used when none is given on the command line
    #[serde(default = "default_user")]
    pub default_user: String,
}

fn default_debounce_ms() -> i64 {
    1_000
}

fn default_reward() -> i64 {
    50
}

fn default_user() -> String {
    "local".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            database_path: None,
            default_reward: default_reward(),
            default_user: default_user(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()
    }

    /// Database location, honoring `settings.database_path`
    pub fn database_path(&self) -> PathBuf {
        self.settings
            .database_path
            .clone()
            .unwrap_or_else(|| Self::global_config_dir().join("progress.db"))
    }
}
