//! Badge definitions and the unlock precedence table
//!
//! Item badges are checked in a fixed order and at most one of them fires per
//! event. Level-up badges are separate and fire once per level reached.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::SnapshotError;

/// Unique identifier for each badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BadgeId {
    /// Every item in the catalog resolved
    Master,
    /// Combo reached the combo threshold
    Combo3,
    /// Midpoint of the catalog reached
    Halfway,
    /// Five items resolved
    Streak5,
    /// First item resolved
    First,
    /// Reached the given level
    LevelUp(u32),
}

impl BadgeId {
    const LEVEL_UP_PREFIX: &'static str = "levelup-";

    /// Item badges in precedence order, highest first
    pub const PRECEDENCE: [BadgeId; 5] = [
        Self::Master,
        Self::Combo3,
        Self::Halfway,
        Self::Streak5,
        Self::First,
    ];

    pub fn is_level_badge(&self) -> bool {
        matches!(self, Self::LevelUp(_))
    }

    /// Catalog metadata (level badges get generated metadata)
    pub fn badge(&self) -> Badge {
        match self {
            Self::LevelUp(level) => Badge {
                id: *self,
                name: format!("Level {}", level),
                description: format!("Reach level {}", level),
                icon: "⭐",
            },
            id => CATALOG
                .iter()
                .find(|def| def.id == *id)
                .map(|def| Badge {
                    id: *id,
                    name: def.name.to_string(),
                    description: def.description.to_string(),
                    icon: def.icon,
                })
                .unwrap_or_else(|| Badge {
                    id: *id,
                    name: id.to_string(),
                    description: String::new(),
                    icon: "🏅",
                }),
        }
    }
}

impl fmt::Display for BadgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Master => f.write_str("master"),
            Self::Combo3 => f.write_str("combo3"),
            Self::Halfway => f.write_str("halfway"),
            Self::Streak5 => f.write_str("streak5"),
            Self::First => f.write_str("first"),
            Self::LevelUp(level) => write!(f, "{}{}", Self::LEVEL_UP_PREFIX, level),
        }
    }
}

impl FromStr for BadgeId {
    type Err = SnapshotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "master" => Ok(Self::Master),
            "combo3" => Ok(Self::Combo3),
            "halfway" => Ok(Self::Halfway),
            "streak5" => Ok(Self::Streak5),
            "first" => Ok(Self::First),
            other => other
                .strip_prefix(Self::LEVEL_UP_PREFIX)
                .and_then(|n| n.parse::<u32>().ok())
                .filter(|level| *level > 1)
                .map(Self::LevelUp)
                .ok_or_else(|| SnapshotError::UnknownBadge(other.to_string())),
        }
    }
}

/// Badge metadata handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub id: BadgeId,
    pub name: String,
    pub description: String,
    pub icon: &'static str,
}

struct BadgeDef {
    id: BadgeId,
    name: &'static str,
    description: &'static str,
    icon: &'static str,
}

static CATALOG: &[BadgeDef] = &[
    BadgeDef {
        id: BadgeId::Master,
        name: "Illusion Master",
        description: "Destroy every illusion",
        icon: "👑",
    },
    BadgeDef {
        id: BadgeId::Combo3,
        name: "Combo Breaker",
        description: "Build a combo of three",
        icon: "🔥",
    },
    BadgeDef {
        id: BadgeId::Halfway,
        name: "Halfway There",
        description: "Destroy half of the illusions",
        icon: "🌗",
    },
    BadgeDef {
        id: BadgeId::Streak5,
        name: "On a Roll",
        description: "Destroy five illusions",
        icon: "⚡",
    },
    BadgeDef {
        id: BadgeId::First,
        name: "First Crack",
        description: "Destroy your first illusion",
        icon: "🎯",
    },
];

/// Thresholds for the item badges
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeThresholds {
    /// Items in the catalog; resolving all of them earns `master`
    #[serde(default = "default_total_items")]
    pub total_items: usize,

    /// Combo needed for `combo3`
    #[serde(default = "default_combo")]
    pub combo: u32,

    /// Resolved-item count that earns `halfway`
    #[serde(default = "default_halfway")]
    pub halfway: usize,

    /// Resolved-item count that earns `streak5`
    #[serde(default = "default_streak_items")]
    pub streak_items: usize,

    /// Resolved-item count that earns `first`
    #[serde(default = "default_first")]
    pub first: usize,
}

fn default_total_items() -> usize {
    6
}

fn default_combo() -> u32 {
    3
}

fn default_halfway() -> usize {
    3
}

fn default_streak_items() -> usize {
    5
}

fn default_first() -> usize {
    1
}

impl Default for BadgeThresholds {
    fn default() -> Self {
        Self {
            total_items: default_total_items(),
            combo: default_combo(),
            halfway: default_halfway(),
            streak_items: default_streak_items(),
            first: default_first(),
        }
    }
}

/// State the badge predicates look at, taken after the event was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeContext {
    pub destroyed_count: usize,
    pub combo: u32,
    pub streak: u64,
    pub level_just_reached: Option<u32>,
}

impl BadgeThresholds {
    /// Whether the predicate for an item badge holds
    pub fn is_satisfied(&self, id: BadgeId, ctx: &BadgeContext) -> bool {
        match id {
            BadgeId::Master => ctx.destroyed_count == self.total_items,
            BadgeId::Combo3 => ctx.combo >= self.combo,
            BadgeId::Halfway => ctx.destroyed_count == self.halfway,
            BadgeId::Streak5 => ctx.destroyed_count == self.streak_items,
            BadgeId::First => ctx.destroyed_count == self.first,
            BadgeId::LevelUp(level) => ctx.level_just_reached == Some(level),
        }
    }

    /// First item badge in precedence order that holds and is not yet earned
    pub fn evaluate(&self, ctx: &BadgeContext, earned: &BTreeSet<BadgeId>) -> Option<BadgeId> {
        BadgeId::PRECEDENCE
            .into_iter()
            .find(|id| !earned.contains(id) && self.is_satisfied(*id, ctx))
    }
}

/// Level badge for a level transition, unless already earned
pub fn level_badge(ctx: &BadgeContext, earned: &BTreeSet<BadgeId>) -> Option<BadgeId> {
    ctx.level_just_reached
        .map(BadgeId::LevelUp)
        .filter(|id| !earned.contains(id))
}
