//! End-to-end behavior of the progress engine
//!
//! Covers the scripted six-item run, idempotent resolution, monotonic
//! counters, combo expiry and badge precedence.

use illusion_progress::progress::{
    level_for_xp, load_snapshot, BadgeId, BadgeThresholds, EngineRules, GamificationEngine,
    ProgressSnapshot, SnapshotRecord,
};

fn engine() -> GamificationEngine {
    GamificationEngine::new(EngineRules::default()).unwrap()
}

#[test]
fn six_item_run_matches_expected_progression() {
    let engine = engine();
    let mut snapshot = ProgressSnapshot::empty();
    let mut xp = Vec::new();
    let mut badges = Vec::new();
    let mut level_ups = Vec::new();

    for (i, item) in ["1", "2", "3", "4", "5", "6"].iter().enumerate() {
        let res = engine
            .resolve_item(&snapshot, item, 50, i as i64 * 1_000)
            .unwrap();
        xp.push(res.snapshot.xp());
        badges.push(res.badge_earned);
        level_ups.push(res.leveled_up());
        snapshot = res.snapshot;
    }

    assert_eq!(xp, vec![50, 125, 200, 275, 350, 425]);
    assert_eq!(level_ups[0], None);
    assert_eq!(level_ups[1], Some(2));
    assert_eq!(
        badges,
        vec![
            Some(BadgeId::First),
            None,
            Some(BadgeId::Combo3),
            None,
            Some(BadgeId::Streak5),
            Some(BadgeId::Master),
        ]
    );
    assert_eq!(snapshot.combo(), 6);
    assert_eq!(snapshot.streak(), 6);
    assert_eq!(snapshot.level(), 5);
}

#[test]
fn resolving_twice_equals_resolving_once() {
    let engine = engine();
    let once = engine
        .resolve_item(&ProgressSnapshot::empty(), "illusion", 40, 0)
        .unwrap();
    let twice = engine
        .resolve_item(&once.snapshot, "illusion", 40, 500)
        .unwrap();

    assert_eq!(twice.snapshot, once.snapshot);
    assert_eq!(twice.gained_xp, 0);
    assert_eq!(twice.badge_earned, None);
    assert_eq!(twice.leveled_up(), None);
}

#[test]
fn counters_never_decrease_and_level_stays_derived() {
    let engine = engine();
    let mut snapshot = ProgressSnapshot::empty();
    let steps: &[(&str, i64, i64)] = &[
        ("a", 30, 0),
        ("b", 30, 2_000),
        ("a", 30, 3_000),
        ("c", 0, 20_000),
        ("d", 90, 21_000),
        ("d", 90, 21_500),
        ("e", 10, 60_000),
    ];

    for (item, reward, now) in steps {
        let expired = engine.check_combo_expiry(&snapshot, *now);
        assert_eq!(expired.xp(), snapshot.xp());

        let res = engine.resolve_item(&expired, item, *reward, *now).unwrap();
        let next = res.snapshot;
        assert!(next.xp() >= snapshot.xp());
        assert!(next.streak() >= snapshot.streak());
        assert!(next.destroyed_items().len() >= snapshot.destroyed_items().len());
        assert!(next.earned_badges().len() >= snapshot.earned_badges().len());
        assert!(next.earned_badges().is_superset(snapshot.earned_badges()));
        assert_eq!(next.level(), level_for_xp(next.xp(), 100));
        snapshot = next;
    }

    assert_eq!(snapshot.streak(), 5);
}

#[test]
fn expired_combo_resets_multiplier() {
    let engine = engine();
    let first = engine
        .resolve_item(&ProgressSnapshot::empty(), "a", 50, 0)
        .unwrap();
    assert_eq!(first.new_combo, 1);

    let expired = engine.check_combo_expiry(&first.snapshot, 10_001);
    assert_eq!(expired.combo(), 0);

    let next = engine.resolve_item(&expired, "b", 50, 10_001).unwrap();
    assert_eq!(next.gained_xp, 50);
    assert_eq!(next.new_combo, 1);
}

#[test]
fn untimed_stored_combo_is_not_carried_forward() {
    let engine = engine();
    let record = SnapshotRecord {
        combo: 4,
        ..Default::default()
    };
    let snapshot = load_snapshot(&record, 100).unwrap();

    let expired = engine.check_combo_expiry(&snapshot, i64::MAX);
    assert_eq!(expired.combo(), 0);

    let res = engine.resolve_item(&expired, "x", 50, i64::MAX).unwrap();
    assert_eq!(res.gained_xp, 50);
    assert_eq!(res.new_combo, 1);
}

#[test]
fn master_takes_precedence_over_first() {
    let rules = EngineRules {
        badges: BadgeThresholds {
            total_items: 1,
            ..Default::default()
        },
        ..Default::default()
    };
    let engine = GamificationEngine::new(rules).unwrap();
    let res = engine
        .resolve_item(&ProgressSnapshot::empty(), "only", 10, 0)
        .unwrap();
    assert_eq!(res.badge_earned, Some(BadgeId::Master));
    assert!(!res.snapshot.has_badge(BadgeId::First));
}

#[test]
fn first_badge_fires_once() {
    let rules = EngineRules {
        badges: BadgeThresholds {
            total_items: 100,
            ..Default::default()
        },
        ..Default::default()
    };
    let engine = GamificationEngine::new(rules).unwrap();

    let first = engine
        .resolve_item(&ProgressSnapshot::empty(), "a", 10, 0)
        .unwrap();
    assert_eq!(first.badge_earned, Some(BadgeId::First));

    let mut snapshot = first.snapshot;
    for (i, item) in ["b", "c", "d", "e", "f", "g"].iter().enumerate() {
        let res = engine
            .resolve_item(&snapshot, item, 10, (i as i64 + 1) * 60_000)
            .unwrap();
        assert_ne!(res.badge_earned, Some(BadgeId::First));
        snapshot = res.snapshot;
    }
    assert_eq!(
        snapshot
            .earned_badges()
            .iter()
            .filter(|b| **b == BadgeId::First)
            .count(),
        1
    );
}

#[test]
fn custom_multiplier_and_level_size() {
    let rules = EngineRules {
        xp_per_level: 40,
        combo_multiplier: 2.25,
        combo_timeout_ms: 500,
        ..Default::default()
    };
    let engine = GamificationEngine::new(rules).unwrap();

    let a = engine
        .resolve_item(&ProgressSnapshot::empty(), "a", 10, 0)
        .unwrap();
    let b = engine.resolve_item(&a.snapshot, "b", 10, 400).unwrap();
    assert_eq!(b.gained_xp, 22);
    assert_eq!(b.snapshot.xp(), 32);

    let c = engine.resolve_item(&b.snapshot, "c", 10, 901).unwrap();
    assert_eq!(c.gained_xp, 10);
    assert_eq!(c.snapshot.level(), 2);
    assert_eq!(c.leveled_up(), Some(2));
}
