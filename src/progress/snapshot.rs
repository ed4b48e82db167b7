//! Progress snapshot and its persisted record form
//!
//! A `ProgressSnapshot` is the complete gamification state of one user. It is
//! only changed through the engine; collaborators persist it as a flat
//! `SnapshotRecord`.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::badges::BadgeId;
use super::error::{EngineError, SnapshotError};
use super::levels::level_for_xp;

/// Identifier of a resolvable item (an illusion, a task)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Validate and wrap an item id. Blank ids are rejected.
    pub fn new(id: impl Into<String>) -> Result<Self, EngineError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(EngineError::InvalidItemId);
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Complete gamification state for one user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub(crate) xp: u64,
    pub(crate) level: u32,
    pub(crate) combo: u32,
    pub(crate) best_combo: u32,
    pub(crate) streak: u64,
    pub(crate) last_event_at: Option<i64>,
    pub(crate) destroyed_items: BTreeSet<ItemId>,
    pub(crate) earned_badges: BTreeSet<BadgeId>,
}

impl Default for ProgressSnapshot {
    fn default() -> Self {
        Self {
            xp: 0,
            level: 1,
            combo: 0,
            best_combo: 0,
            streak: 0,
            last_event_at: None,
            destroyed_items: BTreeSet::new(),
            earned_badges: BTreeSet::new(),
        }
    }
}

impl ProgressSnapshot {
    /// Empty snapshot for a first-time user
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn xp(&self) -> u64 {
        self.xp
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    /// Highest combo ever reached
    pub fn best_combo(&self) -> u32 {
        self.best_combo
    }

    /// Lifetime count of qualifying events
    pub fn streak(&self) -> u64 {
        self.streak
    }

    /// Time (ms) of the last qualifying event
    pub fn last_event_at(&self) -> Option<i64> {
        self.last_event_at
    }

    pub fn destroyed_items(&self) -> &BTreeSet<ItemId> {
        &self.destroyed_items
    }

    pub fn earned_badges(&self) -> &BTreeSet<BadgeId> {
        &self.earned_badges
    }

    pub fn is_destroyed(&self, item: &ItemId) -> bool {
        self.destroyed_items.contains(item)
    }

    pub fn has_badge(&self, badge: BadgeId) -> bool {
        self.earned_badges.contains(&badge)
    }

    /// Whether the combo has lapsed at `now` given the inactivity window
    pub(crate) fn combo_lapsed(&self, now: i64, combo_timeout_ms: i64) -> bool {
        self.last_event_at
            .is_some_and(|last| now.saturating_sub(last) > combo_timeout_ms)
    }
}

/// Upper bound for `xp` and `streak`; stores keep them as signed 64-bit integers
pub const MAX_COUNTER: u64 = i64::MAX as u64;

/// Flat persisted form of a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SnapshotRecord {
    #[serde(default)]
    pub xp: u64,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub combo: u32,
    #[serde(default)]
    pub best_combo: u32,
    #[serde(default)]
    pub streak: u64,
    #[serde(default)]
    pub last_event_at: Option<i64>,
    #[serde(default)]
    pub destroyed_items: Vec<String>,
    #[serde(default)]
    pub earned_badges: Vec<String>,
}

fn default_level() -> u32 {
    1
}

impl SnapshotRecord {
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Convert a snapshot into its persisted record (id lists are sorted)
pub fn serialize_snapshot(snapshot: &ProgressSnapshot) -> SnapshotRecord {
    SnapshotRecord {
        xp: snapshot.xp,
        level: snapshot.level,
        combo: snapshot.combo,
        best_combo: snapshot.best_combo.max(snapshot.combo),
        streak: snapshot.streak,
        last_event_at: snapshot.last_event_at,
        destroyed_items: snapshot
            .destroyed_items
            .iter()
            .map(|id| id.as_str().to_string())
            .collect(),
        earned_badges: snapshot
            .earned_badges
            .iter()
            .map(|id| id.to_string())
            .collect(),
    }
}

/// Rebuild a snapshot from its persisted record
///
/// The level is always re-derived from `xp`; a stored level that disagrees is
/// corrected rather than rejected.
pub fn load_snapshot(
    record: &SnapshotRecord,
    xp_per_level: u64,
) -> Result<ProgressSnapshot, SnapshotError> {
    let destroyed_items = record
        .destroyed_items
        .iter()
        .map(|id| ItemId::new(id.as_str()).map_err(|_| SnapshotError::EmptyItemId))
        .collect::<Result<BTreeSet<_>, _>>()?;

    let earned_badges = record
        .earned_badges
        .iter()
        .map(|id| id.parse::<BadgeId>())
        .collect::<Result<BTreeSet<_>, _>>()?;

    let xp = record.xp.min(MAX_COUNTER);
    let streak = record.streak.min(MAX_COUNTER);
    if xp != record.xp || streak != record.streak {
        tracing::warn!("Stored counters exceed {}, clamping", MAX_COUNTER);
    }

    let level = level_for_xp(xp, xp_per_level);
    if level != record.level {
        tracing::warn!(
            "Stored level {} does not match xp {} (expected {}), correcting",
            record.level,
            xp,
            level
        );
    }

    // Without a timestamp the combo could never lapse
    let combo = if record.last_event_at.is_none() && record.combo != 0 {
        tracing::warn!(
            "Stored combo {} has no last event time, resetting",
            record.combo
        );
        0
    } else {
        record.combo
    };

    Ok(ProgressSnapshot {
        xp,
        level,
        combo,
        best_combo: record.best_combo.max(combo),
        streak,
        last_event_at: record.last_event_at,
        destroyed_items,
        earned_badges,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> SnapshotRecord {
        SnapshotRecord {
            xp: 125,
            level: 2,
            combo: 2,
            best_combo: 2,
            streak: 2,
            last_event_at: Some(1_000),
            destroyed_items: vec!["b".to_string(), "a".to_string()],
            earned_badges: vec!["first".to_string(), "levelup-2".to_string()],
        }
    }

    #[test]
    fn test_item_id_rejects_blank() {
        assert_eq!(ItemId::new(""), Err(EngineError::InvalidItemId));
        assert_eq!(ItemId::new("   "), Err(EngineError::InvalidItemId));
        assert_eq!(ItemId::new("illusion-1").unwrap().as_str(), "illusion-1");
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = ProgressSnapshot::empty();
        assert_eq!(snapshot.xp(), 0);
        assert_eq!(snapshot.level(), 1);
        assert!(snapshot.destroyed_items().is_empty());
        assert!(snapshot.earned_badges().is_empty());
        assert_eq!(snapshot.last_event_at(), None);
    }

    #[test]
    fn test_load_then_serialize_sorts_ids() {
        let snapshot = load_snapshot(&record(), 100).unwrap();
        assert_eq!(snapshot.destroyed_items().len(), 2);
        assert!(snapshot.has_badge(BadgeId::LevelUp(2)));

        let out = serialize_snapshot(&snapshot);
        assert_eq!(out.destroyed_items, vec!["a", "b"]);
        assert_eq!(out.earned_badges, vec!["first", "levelup-2"]);
        assert_eq!(out.level, 2);
    }

    #[test]
    fn test_load_corrects_inconsistent_level() {
        let mut rec = record();
        rec.level = 7;
        let snapshot = load_snapshot(&rec, 100).unwrap();
        assert_eq!(snapshot.level(), 2);
    }

    #[test]
    fn test_load_resets_combo_without_timestamp() {
        let rec = SnapshotRecord {
            combo: 4,
            best_combo: 4,
            ..Default::default()
        };
        let snapshot = load_snapshot(&rec, 100).unwrap();
        assert_eq!(snapshot.combo(), 0);
        assert_eq!(snapshot.best_combo(), 4);
        assert!(!snapshot.combo_lapsed(i64::MAX, 10_000));
    }

    #[test]
    fn test_load_keeps_timed_combo() {
        let snapshot = load_snapshot(&record(), 100).unwrap();
        assert_eq!(snapshot.combo(), 2);
    }

    #[test]
    fn test_load_clamps_oversized_counters() {
        let rec = SnapshotRecord {
            xp: u64::MAX,
            streak: u64::MAX,
            ..Default::default()
        };
        let snapshot = load_snapshot(&rec, 100).unwrap();
        assert_eq!(snapshot.xp(), MAX_COUNTER);
        assert_eq!(snapshot.streak(), MAX_COUNTER);
        assert_eq!(snapshot.level(), level_for_xp(MAX_COUNTER, 100));
    }

    #[test]
    fn test_load_collapses_duplicates() {
        let mut rec = record();
        rec.destroyed_items.push("a".to_string());
        rec.earned_badges.push("first".to_string());
        let snapshot = load_snapshot(&rec, 100).unwrap();
        assert_eq!(snapshot.destroyed_items().len(), 2);
        assert_eq!(snapshot.earned_badges().len(), 2);
    }

    #[test]
    fn test_load_rejects_bad_ids() {
        let mut rec = record();
        rec.destroyed_items.push(String::new());
        assert_eq!(load_snapshot(&rec, 100), Err(SnapshotError::EmptyItemId));

        let mut rec = record();
        rec.earned_badges.push("night_owl".to_string());
        assert_eq!(
            load_snapshot(&rec, 100),
            Err(SnapshotError::UnknownBadge("night_owl".to_string()))
        );
    }

    #[test]
    fn test_record_json_defaults() {
        let rec = SnapshotRecord::from_json(r#"{"xp": 250}"#).unwrap();
        assert_eq!(rec.level, 1);
        assert!(rec.destroyed_items.is_empty());
        let snapshot = load_snapshot(&rec, 100).unwrap();
        assert_eq!(snapshot.level(), 3);
    }

    #[test]
    fn test_combo_lapsed() {
        let snapshot = load_snapshot(&record(), 100).unwrap();
        assert!(!snapshot.combo_lapsed(11_000, 10_000));
        assert!(snapshot.combo_lapsed(11_001, 10_000));
        assert!(!ProgressSnapshot::empty().combo_lapsed(i64::MAX, 10_000));
    }
}
