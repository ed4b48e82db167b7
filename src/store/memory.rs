//! In-memory progress store

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::{ProgressStore, StoreError};
use crate::progress::SnapshotRecord;

/// Map-backed store. Clones share the same data.
///
/// `set_unavailable(true)` makes every call fail, which lets hosts exercise
/// their retry paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Arc<Mutex<HashMap<String, SnapshotRecord>>>,
    unavailable: Arc<AtomicBool>,
    saves: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of successful saves so far
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store offline".to_string()));
        }
        Ok(())
    }
}

impl ProgressStore for MemoryStore {
    fn load(&self, user: &str) -> Result<Option<SnapshotRecord>, StoreError> {
        self.check_available()?;
        let records = self.records.lock().expect("lock");
        Ok(records.get(user).cloned())
    }

    fn save(&self, user: &str, record: &SnapshotRecord) -> Result<(), StoreError> {
        self.check_available()?;
        let mut records = self.records.lock().expect("lock");
        records.insert(user.to_string(), record.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn delete(&self, user: &str) -> Result<(), StoreError> {
        self.check_available()?;
        let mut records = self.records.lock().expect("lock");
        records.remove(user);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.load("u1").unwrap().is_none());

        let record = SnapshotRecord {
            xp: 50,
            level: 1,
            ..Default::default()
        };
        store.save("u1", &record).unwrap();
        assert_eq!(store.load("u1").unwrap(), Some(record));
        assert!(store.load("u2").unwrap().is_none());
        assert_eq!(store.save_count(), 1);

        store.delete("u1").unwrap();
        assert!(store.load("u1").unwrap().is_none());
    }

    #[test]
    fn test_unavailable_store_fails() {
        let store = MemoryStore::new();
        let handle = store.clone();
        handle.set_unavailable(true);
        assert!(matches!(
            store.save("u1", &SnapshotRecord::default()),
            Err(StoreError::Unavailable(_))
        ));
        handle.set_unavailable(false);
        assert!(store.save("u1", &SnapshotRecord::default()).is_ok());
    }
}
