//! Illusion Buster progress engine
//!
//! Tracks XP, levels, combos, streaks and badges for the Illusion Buster
//! exercise. The core (`progress`) is a pure state machine over a
//! `ProgressSnapshot`; everything with side effects lives in collaborators:
//!
//! - `clock` supplies the time for combo decisions
//! - `store` loads and persists snapshots, with debounced writes
//! - `sink` surfaces XP, level and badge notifications
//! - `session` ties them together for one user

pub mod clock;
pub mod config;
pub mod progress;
pub mod session;
pub mod sink;
pub mod store;

pub use progress::{
    BadgeId, GamificationEngine, GamificationEvent, ProgressSnapshot, Resolution,
};
pub use session::ProgressSession;
