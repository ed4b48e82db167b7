//! Session round trips through the SQLite store

use illusion_progress::clock::ManualClock;
use illusion_progress::progress::{BadgeId, EngineRules, GamificationEngine};
use illusion_progress::session::ProgressSession;
use illusion_progress::sink::RecordingSink;
use illusion_progress::store::{ProgressStore, SqliteStore};
use tempfile::TempDir;

fn open(
    store: &SqliteStore,
    clock: &ManualClock,
    user: &str,
) -> ProgressSession<SqliteStore, ManualClock, RecordingSink> {
    let engine = GamificationEngine::new(EngineRules::default()).unwrap();
    ProgressSession::open(
        user,
        engine,
        store.clone(),
        clock.clone(),
        RecordingSink::default(),
        1_000,
    )
    .unwrap()
}

#[test]
fn progress_survives_reopening_the_database() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("progress.db");
    let clock = ManualClock::new(1_700_000_000_000);

    {
        let store = SqliteStore::open(&path).unwrap();
        let mut session = open(&store, &clock, "alice");
        for item in ["1", "2", "3"] {
            session.resolve(item, 50).unwrap();
            clock.advance(100);
        }
        assert_eq!(session.sink().badges(), vec!["first", "levelup-2", "combo3", "levelup-3"]);

        clock.advance(1_000);
        assert!(session.tick().unwrap());
    }

    let store = SqliteStore::open(&path).unwrap();
    let session = open(&store, &clock, "alice");
    let snapshot = session.snapshot();
    assert_eq!(snapshot.xp(), 200);
    assert_eq!(snapshot.level(), 3);
    assert_eq!(snapshot.combo(), 3);
    assert_eq!(snapshot.streak(), 3);
    assert!(snapshot.has_badge(BadgeId::Combo3));
    assert!(snapshot.has_badge(BadgeId::LevelUp(3)));
}

#[test]
fn users_are_isolated() {
    let store = SqliteStore::open_in_memory().unwrap();
    let clock = ManualClock::new(0);

    let mut alice = open(&store, &clock, "alice");
    alice.resolve("x", 50).unwrap();
    alice.flush().unwrap();

    let bob = open(&store, &clock, "bob");
    assert_eq!(bob.snapshot().xp(), 0);
    assert!(store.load("bob").unwrap().is_none());
    assert_eq!(store.load("alice").unwrap().unwrap().xp, 50);
}

#[test]
fn combo_lapses_across_sessions() {
    let store = SqliteStore::open_in_memory().unwrap();
    let clock = ManualClock::new(0);

    let mut session = open(&store, &clock, "alice");
    session.resolve("a", 50).unwrap();
    session.flush().unwrap();
    drop(session);

    clock.advance(30_000);
    let mut session = open(&store, &clock, "alice");
    let res = session.resolve("b", 50).unwrap();
    assert_eq!(res.gained_xp, 50);
    assert_eq!(res.new_combo, 1);
}

#[test]
fn reset_clears_stored_progress() {
    let store = SqliteStore::open_in_memory().unwrap();
    let clock = ManualClock::new(0);

    let mut session = open(&store, &clock, "alice");
    session.resolve("a", 50).unwrap();
    session.flush().unwrap();

    session.reset();
    session.flush().unwrap();

    let record = store.load("alice").unwrap().unwrap();
    assert_eq!(record.xp, 0);
    assert!(record.destroyed_items.is_empty());
    assert!(record.earned_badges.is_empty());
}
