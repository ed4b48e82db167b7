//! SQLite progress store
//!
//! Manages the `~/.illusion-progress/progress.db` database. The schema is
//! created on open and its version recorded; a database written by a newer
//! schema is refused. Each save replaces a user's snapshot in one transaction.

use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};

use super::{ProgressStore, StoreError};
use crate::config::Config;
use crate::progress::SnapshotRecord;

/// SQLite-backed store, safe to clone across threads
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open or create the database at the default location
    pub fn open_default() -> Result<Self, StoreError> {
        let db_path = Config::global_config_dir().join("progress.db");
        Self::open(&db_path)
    }

    /// Open or create the database at a specific path
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        Self::from_connection(conn)
    }

    /// Private in-memory database
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().expect("Progress DB lock poisoned")
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        let conn = self.conn();
        conn.execute_batch(SCHEMA_SQL)?;

        let version = schema_version(&conn)?;
        if version > SCHEMA_VERSION {
            return Err(StoreError::Unavailable(format!(
                "database schema version {} is newer than supported version {}",
                version, SCHEMA_VERSION
            )));
        }
        Ok(())
    }

    /// Number of users with stored progress
    pub fn user_count(&self) -> Result<usize, StoreError> {
        let conn = self.conn();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM progress", [], |r| r.get(0))?;
        Ok(count as usize)
    }
}

impl ProgressStore for SqliteStore {
    fn load(&self, user: &str) -> Result<Option<SnapshotRecord>, StoreError> {
        let conn = self.conn();
        let record = conn
            .query_row(
                "SELECT xp, level, combo, best_combo, streak, last_event_at FROM progress WHERE user_id = ?1",
                [user],
                |r| {
                    Ok(SnapshotRecord {
                        xp: r.get(0)?,
                        level: r.get(1)?,
                        combo: r.get(2)?,
                        best_combo: r.get(3)?,
                        streak: r.get(4)?,
                        last_event_at: r.get(5)?,
                        destroyed_items: Vec::new(),
                        earned_badges: Vec::new(),
                    })
                },
            )
            .optional()?;

        let Some(mut record) = record else {
            return Ok(None);
        };

        let mut stmt = conn.prepare(
            "SELECT item_id FROM destroyed_items WHERE user_id = ?1 ORDER BY item_id",
        )?;
        record.destroyed_items = stmt
            .query_map([user], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        let mut stmt = conn.prepare(
            "SELECT badge_id FROM earned_badges WHERE user_id = ?1 ORDER BY badge_id",
        )?;
        record.earned_badges = stmt
            .query_map([user], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(Some(record))
    }

    fn save(&self, user: &str, record: &SnapshotRecord) -> Result<(), StoreError> {
        let now = Utc::now().timestamp_millis();
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        tx.execute(
            r#"
            INSERT INTO progress (user_id, xp, level, combo, best_combo, streak, last_event_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(user_id) DO UPDATE SET
                xp = ?2, level = ?3, combo = ?4, best_combo = ?5, streak = ?6,
                last_event_at = ?7, updated_at = ?8
            "#,
            rusqlite::params![
                user,
                record.xp,
                record.level,
                record.combo,
                record.best_combo,
                record.streak,
                record.last_event_at,
                now,
            ],
        )?;

        tx.execute("DELETE FROM destroyed_items WHERE user_id = ?1", [user])?;
        tx.execute("DELETE FROM earned_badges WHERE user_id = ?1", [user])?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO destroyed_items (user_id, item_id) VALUES (?1, ?2)",
            )?;
            for item in &record.destroyed_items {
                stmt.execute((user, item))?;
            }

            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO earned_badges (user_id, badge_id, earned_at) VALUES (?1, ?2, ?3)",
            )?;
            for badge in &record.earned_badges {
                stmt.execute((user, badge, now))?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn delete(&self, user: &str) -> Result<(), StoreError> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM destroyed_items WHERE user_id = ?1", [user])?;
        tx.execute("DELETE FROM earned_badges WHERE user_id = ?1", [user])?;
        tx.execute("DELETE FROM progress WHERE user_id = ?1", [user])?;
        tx.commit()?;
        Ok(())
    }
}

const SCHEMA_VERSION: i64 = 1;

fn schema_version(conn: &Connection) -> Result<i64, StoreError> {
    Ok(conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?)
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);

-- One row per user
CREATE TABLE IF NOT EXISTS progress (
    user_id TEXT PRIMARY KEY,
    xp INTEGER NOT NULL DEFAULT 0,
    level INTEGER NOT NULL DEFAULT 1,
    combo INTEGER NOT NULL DEFAULT 0,
    best_combo INTEGER NOT NULL DEFAULT 0,
    streak INTEGER NOT NULL DEFAULT 0,
    last_event_at INTEGER,
    updated_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS destroyed_items (
    user_id TEXT NOT NULL,
    item_id TEXT NOT NULL,
    PRIMARY KEY (user_id, item_id)
);

CREATE TABLE IF NOT EXISTS earned_badges (
    user_id TEXT NOT NULL,
    badge_id TEXT NOT NULL,
    earned_at INTEGER NOT NULL,
    PRIMARY KEY (user_id, badge_id)
);

INSERT OR IGNORE INTO schema_version VALUES (1);
"#;
