//! CLI command implementations

pub mod init;
pub mod progress;

use std::path::PathBuf;

use anyhow::{Context, Result};

use illusion_progress::clock::{Clock, ManualClock, SystemClock};
use illusion_progress::config::Config;
use illusion_progress::progress::GamificationEngine;
use illusion_progress::session::ProgressSession;
use illusion_progress::store::SqliteStore;

use self::progress::ConsoleSink;

/// Options shared by every progress command
pub struct SessionOptions {
    pub config: Option<PathBuf>,
    pub db: Option<PathBuf>,
    pub user: Option<String>,
    /// Fixed time (ms) to evaluate the command at
    pub at: Option<i64>,
}

pub type CliSession = ProgressSession<SqliteStore, ManualClock, ConsoleSink>;

/// Load config, open the store and the user's session
pub fn open_session(opts: &SessionOptions) -> Result<CliSession> {
    let config = Config::load(opts.config.as_deref())?;
    let db_path = opts.db.clone().unwrap_or_else(|| config.database_path());
    let store = SqliteStore::open(&db_path)
        .with_context(|| format!("Failed to open progress db: {}", db_path.display()))?;

    let user = opts
        .user
        .clone()
        .unwrap_or_else(|| config.settings.default_user.clone());
    let clock = ManualClock::new(opts.at.unwrap_or_else(|| SystemClock.now_ms()));
    let engine = GamificationEngine::new(config.engine.clone())?;

    tracing::debug!("Opening progress for {} at {}", user, db_path.display());
    let session = ProgressSession::open(
        user,
        engine,
        store,
        clock,
        ConsoleSink,
        config.settings.debounce_ms,
    )
    .context("Failed to load stored progress")?;
    Ok(session)
}

/// Reward to use when the command line gives none
pub fn default_reward(opts: &SessionOptions) -> Result<i64> {
    Ok(Config::load(opts.config.as_deref())?.settings.default_reward)
}
