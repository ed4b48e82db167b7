//! XP and level derivation
//!
//! Levels are linear: every `xp_per_level` points is one level, starting at 1.

use serde::Serialize;

/// Level reached with `xp` total experience
///
/// `xp_per_level` of zero is treated as one to keep the derivation total;
/// `EngineRules::validate` rejects that configuration up front.
pub fn level_for_xp(xp: u64, xp_per_level: u64) -> u32 {
    let level = (xp / xp_per_level.max(1)).saturating_add(1);
    u32::try_from(level).unwrap_or(u32::MAX)
}

/// Total XP at which `level` starts
pub fn xp_for_level(level: u32, xp_per_level: u64) -> u64 {
    u64::from(level.saturating_sub(1)).saturating_mul(xp_per_level)
}

/// A level transition produced by one event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelUp {
    pub old_level: u32,
    pub new_level: u32,
}

/// Where the player stands inside the current level
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelProgress {
    pub total_xp: u64,
    pub level: u32,
    /// XP at which the current level started
    pub current_level_xp: u64,
    /// XP at which the next level starts
    pub next_level_xp: u64,
}

impl LevelProgress {
    pub fn new(total_xp: u64, xp_per_level: u64) -> Self {
        let level = level_for_xp(total_xp, xp_per_level);
        let current_level_xp = xp_for_level(level, xp_per_level);
        Self {
            total_xp,
            level,
            current_level_xp,
            next_level_xp: current_level_xp.saturating_add(xp_per_level.max(1)),
        }
    }

    /// XP earned since the current level started
    pub fn xp_into_level(&self) -> u64 {
        self.total_xp - self.current_level_xp
    }

    /// XP still missing for the next level
    pub fn xp_to_next(&self) -> u64 {
        self.next_level_xp - self.total_xp
    }

    /// Calculate progress percentage to next level (0.0 - 1.0)
    pub fn progress_to_next(&self) -> f32 {
        let span = self.next_level_xp - self.current_level_xp;
        if span == 0 {
            1.0
        } else {
            self.xp_into_level() as f32 / span as f32
        }
    }
}
