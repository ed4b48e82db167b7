//! Gamification core: XP, levels, combos, streaks and badges
//!
//! The engine is a pure state machine over `ProgressSnapshot`. Loading,
//! persisting and presenting the results are collaborator concerns.

mod badges;
mod engine;
mod error;
mod levels;
mod snapshot;

pub use badges::{Badge, BadgeContext, BadgeId, BadgeThresholds};
pub use engine::{
    EngineRules, GamificationEngine, GamificationEvent, ProgressSummary, Resolution,
};
pub use error::{ConfigError, EngineError, SnapshotError};
pub use levels::{level_for_xp, xp_for_level, LevelProgress, LevelUp};
pub use snapshot::{
    load_snapshot, serialize_snapshot, ItemId, ProgressSnapshot, SnapshotRecord, MAX_COUNTER,
};
