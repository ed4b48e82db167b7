//! Configuration file I/O operations

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;

use super::Config;

impl Config {
    /// Get the global config directory path (~/.illusion-progress/)
    pub fn global_config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".illusion-progress")
    }

    /// Get the global config file path (~/.illusion-progress/config.toml)
    pub fn global_config_path() -> PathBuf {
        Self::global_config_dir().join("config.toml")
    }

    /// Load and validate configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate and write the configuration to `path`.
    ///
    /// Rules that would be rejected on load are never written.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        self.validate().context("Refusing to save invalid config")?;

        let body = toml::to_string_pretty(self).context("Failed to serialize config")?;
        let content = format!("{CONFIG_HEADER}\n\n{body}");
        replace_locked(path, content.as_bytes())
            .with_context(|| format!("Failed to save config file: {}", path.display()))?;

        tracing::debug!("Saved config to {}", path.display());
        Ok(())
    }

    /// Load configuration from `path`, or from the global location.
    /// A missing global config falls back to defaults without writing anything.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        let global_path = Self::global_config_path();
        if !global_path.exists() {
            tracing::debug!("No config at {}, using defaults", global_path.display());
            return Ok(Self::default());
        }
        Self::from_file(&global_path)
    }
}

const CONFIG_HEADER: &str = "# illusion-progress configuration";

/// Replace `path` with `bytes` while holding `<path>.lock`.
/// Readers see either the old file or the new one, never a partial write.
fn replace_locked(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let guard = File::create(sibling(path, "lock"))?;
    guard.lock_exclusive()?;

    let staged = sibling(path, "tmp");
    let result = File::create(&staged)
        .and_then(|mut file| {
            file.write_all(bytes)?;
            file.sync_all()
        })
        .and_then(|()| std::fs::rename(&staged, path));
    if result.is_err() {
        let _ = std::fs::remove_file(&staged);
    }

    FileExt::unlock(&guard)?;
    result
}

/// `config.toml` -> `config.toml.<suffix>`
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}
