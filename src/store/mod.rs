//! Progress persistence collaborators
//!
//! Stores deal in `SnapshotRecord`s keyed by user id. Writes are driven by the
//! host through `DebouncedWriter`; the engine never touches a store.

mod db;
mod debounce;
mod memory;

pub use db::SqliteStore;
pub use debounce::DebouncedWriter;
pub use memory::MemoryStore;

use crate::progress::{SnapshotError, SnapshotRecord};

/// Errors raised by a progress store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Progress store unavailable: {0}")]
    Unavailable(String),

    #[error("Stored progress is corrupt: {0}")]
    Corrupt(#[from] SnapshotError),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to prepare store location: {0}")]
    Io(#[from] std::io::Error),
}

/// Loads and persists snapshots keyed by user identity
pub trait ProgressStore {
    /// Stored record for `user`, or `None` for a first-time user
    fn load(&self, user: &str) -> Result<Option<SnapshotRecord>, StoreError>;

    /// Replace the stored record for `user` as a whole
    fn save(&self, user: &str, record: &SnapshotRecord) -> Result<(), StoreError>;

    fn delete(&self, user: &str) -> Result<(), StoreError>;
}
