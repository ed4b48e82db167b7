//! Gamification engine - the state transition rules
//!
//! Every operation takes the current snapshot and returns a new one. The engine
//! performs no I/O and keeps no state besides its rules; persisting the result
//! and showing notifications is left to the caller.

use serde::{Deserialize, Serialize};

use super::badges::{level_badge, BadgeContext, BadgeId, BadgeThresholds};
use super::error::{ConfigError, EngineError};
use super::levels::{level_for_xp, LevelProgress, LevelUp};
use super::snapshot::{ItemId, ProgressSnapshot, MAX_COUNTER};

/// Fixed-point scale for the combo multiplier (six decimal places)
const MULTIPLIER_SCALE: u128 = 1_000_000;

/// Tunable constants of the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineRules {
    /// XP per level; level = xp / xp_per_level + 1
    #[serde(default = "default_xp_per_level")]
    pub xp_per_level: u64,

    /// Reward multiplier while a combo is running
    #[serde(default = "default_combo_multiplier")]
    pub combo_multiplier: f64,

    /// Inactivity window (ms) after which the combo resets
    #[serde(default = "default_combo_timeout_ms")]
    pub combo_timeout_ms: i64,

    /// Item badge thresholds
    #[serde(default)]
    pub badges: BadgeThresholds,
}

fn default_xp_per_level() -> u64 {
    100
}

fn default_combo_multiplier() -> f64 {
    1.5
}

fn default_combo_timeout_ms() -> i64 {
    10_000
}

impl Default for EngineRules {
    fn default() -> Self {
        Self {
            xp_per_level: default_xp_per_level(),
            combo_multiplier: default_combo_multiplier(),
            combo_timeout_ms: default_combo_timeout_ms(),
            badges: BadgeThresholds::default(),
        }
    }
}

impl EngineRules {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.xp_per_level == 0 {
            return Err(ConfigError::ZeroXpPerLevel);
        }
        if !self.combo_multiplier.is_finite() || self.combo_multiplier < 1.0 {
            return Err(ConfigError::InvalidMultiplier(self.combo_multiplier));
        }
        if self.combo_timeout_ms < 0 {
            return Err(ConfigError::NegativeTimeout(self.combo_timeout_ms));
        }
        let thresholds = [
            ("total_items", self.badges.total_items),
            ("combo", self.badges.combo as usize),
            ("halfway", self.badges.halfway),
            ("streak_items", self.badges.streak_items),
            ("first", self.badges.first),
        ];
        for (name, value) in thresholds {
            if value == 0 {
                return Err(ConfigError::ZeroThreshold(name));
            }
        }
        Ok(())
    }
}

/// Outbound events of one transition, in display order
#[derive(Debug, Clone, PartialEq)]
pub enum GamificationEvent {
    XpAwarded { amount: u64, multiplied: bool },
    ComboExtended { count: u32 },
    LevelUp(LevelUp),
    BadgeEarned(BadgeId),
}

/// Result of `resolve_item`
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub snapshot: ProgressSnapshot,
    /// False when the item had already been resolved
    pub qualified: bool,
    pub gained_xp: u64,
    pub new_combo: u32,
    pub level_up: Option<LevelUp>,
    /// Item badge from the precedence table
    pub badge_earned: Option<BadgeId>,
    /// `levelup-{N}` badge for the level just reached
    pub level_badge: Option<BadgeId>,
}

impl Resolution {
    fn unchanged(snapshot: &ProgressSnapshot) -> Self {
        Self {
            snapshot: snapshot.clone(),
            qualified: false,
            gained_xp: 0,
            new_combo: snapshot.combo,
            level_up: None,
            badge_earned: None,
            level_badge: None,
        }
    }

    /// New level, if this event crossed a level boundary
    pub fn leveled_up(&self) -> Option<u32> {
        self.level_up.map(|up| up.new_level)
    }

    pub fn events(&self) -> Vec<GamificationEvent> {
        let mut events = Vec::new();
        if !self.qualified {
            return events;
        }
        if self.gained_xp > 0 {
            events.push(GamificationEvent::XpAwarded {
                amount: self.gained_xp,
                multiplied: self.new_combo > 1,
            });
        }
        events.push(GamificationEvent::ComboExtended {
            count: self.new_combo,
        });
        if let Some(level_up) = self.level_up {
            events.push(GamificationEvent::LevelUp(level_up));
        }
        if let Some(badge) = self.badge_earned {
            events.push(GamificationEvent::BadgeEarned(badge));
        }
        if let Some(badge) = self.level_badge {
            events.push(GamificationEvent::BadgeEarned(badge));
        }
        events
    }
}

/// Read-only overview of a snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSummary {
    pub level: LevelProgress,
    pub combo: u32,
    pub best_combo: u32,
    pub streak: u64,
    pub items_destroyed: usize,
    pub total_items: usize,
    pub badges_earned: usize,
}

/// Pure transition function over `ProgressSnapshot`
#[derive(Debug, Clone, Default)]
pub struct GamificationEngine {
    rules: EngineRules,
}

impl GamificationEngine {
    pub fn new(rules: EngineRules) -> Result<Self, ConfigError> {
        rules.validate()?;
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &EngineRules {
        &self.rules
    }

    /// Apply a first-time resolution of `item_id` at `now` (ms)
    ///
    /// Resolving an item that is already destroyed returns the snapshot
    /// unchanged with no rewards.
    pub fn resolve_item(
        &self,
        snapshot: &ProgressSnapshot,
        item_id: &str,
        base_reward: i64,
        now: i64,
    ) -> Result<Resolution, EngineError> {
        let item = ItemId::new(item_id)?;
        let base_reward =
            u64::try_from(base_reward).map_err(|_| EngineError::InvalidReward(base_reward))?;

        if snapshot.is_destroyed(&item) {
            tracing::debug!("Item {} already destroyed, ignoring", item);
            return Ok(Resolution::unchanged(snapshot));
        }

        let effective_combo = if snapshot.combo_lapsed(now, self.rules.combo_timeout_ms) {
            0
        } else {
            snapshot.combo
        };
        let gained_xp = self.reward_for(base_reward, effective_combo);

        let mut next = snapshot.clone();
        next.xp = snapshot.xp.saturating_add(gained_xp).min(MAX_COUNTER);
        next.combo = effective_combo.saturating_add(1);
        next.best_combo = next.best_combo.max(next.combo);
        next.streak = snapshot.streak.saturating_add(1).min(MAX_COUNTER);
        next.last_event_at = Some(now);
        next.destroyed_items.insert(item.clone());
        next.level = level_for_xp(next.xp, self.rules.xp_per_level);

        let level_up = (next.level > snapshot.level).then_some(LevelUp {
            old_level: snapshot.level,
            new_level: next.level,
        });

        let ctx = BadgeContext {
            destroyed_count: next.destroyed_items.len(),
            combo: next.combo,
            streak: next.streak,
            level_just_reached: level_up.map(|up| up.new_level),
        };
        let badge_earned = self.rules.badges.evaluate(&ctx, &next.earned_badges);
        let level_badge = level_badge(&ctx, &next.earned_badges);
        next.earned_badges.extend(badge_earned);
        next.earned_badges.extend(level_badge);

        tracing::debug!(
            "Resolved {}: +{} xp (combo {} -> {}), total {}",
            item,
            gained_xp,
            effective_combo,
            next.combo,
            next.xp
        );
        if let Some(up) = level_up {
            tracing::info!("Level up: {} -> {}", up.old_level, up.new_level);
        }
        if let Some(badge) = badge_earned {
            tracing::info!("Badge earned: {}", badge);
        }

        Ok(Resolution {
            new_combo: next.combo,
            snapshot: next,
            qualified: true,
            gained_xp,
            level_up,
            badge_earned,
            level_badge,
        })
    }

    /// Reset the combo if it has lapsed at `now`; XP, streak and badges are untouched
    pub fn check_combo_expiry(&self, snapshot: &ProgressSnapshot, now: i64) -> ProgressSnapshot {
        let mut next = snapshot.clone();
        if next.combo != 0 && next.combo_lapsed(now, self.rules.combo_timeout_ms) {
            tracing::debug!("Combo of {} expired", next.combo);
            next.combo = 0;
        }
        next
    }

    /// Zero-value snapshot for an explicit user reset
    pub fn reset(&self) -> ProgressSnapshot {
        ProgressSnapshot::empty()
    }

    pub fn summary(&self, snapshot: &ProgressSnapshot) -> ProgressSummary {
        ProgressSummary {
            level: LevelProgress::new(snapshot.xp, self.rules.xp_per_level),
            combo: snapshot.combo,
            best_combo: snapshot.best_combo,
            streak: snapshot.streak,
            items_destroyed: snapshot.destroyed_items.len(),
            total_items: self.rules.badges.total_items,
            badges_earned: snapshot.earned_badges.len(),
        }
    }

    /// XP for `base_reward` with the combo going into the event
    ///
    /// The multiplier is applied in integer micro-units so large rewards are
    /// not rounded through `f64`.
    fn reward_for(&self, base_reward: u64, combo: u32) -> u64 {
        if combo == 0 {
            return base_reward.min(MAX_COUNTER);
        }
        let micros = (self.rules.combo_multiplier * MULTIPLIER_SCALE as f64).round() as u128;
        let gained = u128::from(base_reward).saturating_mul(micros) / MULTIPLIER_SCALE;
        u64::try_from(gained).unwrap_or(u64::MAX).min(MAX_COUNTER)
    }
}
