//! Debounced snapshot persistence
//!
//! The host marks the writer dirty after every engine transition and calls
//! `flush_due` from its timer or event loop. Writes are coalesced until the
//! snapshot has been quiet for `debounce_ms`.

use super::{ProgressStore, StoreError};
use crate::progress::SnapshotRecord;

#[derive(Debug, Clone)]
pub struct DebouncedWriter {
    debounce_ms: i64,
    pending: Option<SnapshotRecord>,
    last_change_at: Option<i64>,
    consecutive_failures: u32,
}

impl DebouncedWriter {
    pub fn new(debounce_ms: i64) -> Self {
        Self {
            debounce_ms: debounce_ms.max(0),
            pending: None,
            last_change_at: None,
            consecutive_failures: 0,
        }
    }

    /// Queue `record` as the latest state, replacing anything still pending
    pub fn mark_dirty(&mut self, record: SnapshotRecord, now: i64) {
        self.pending = Some(record);
        self.last_change_at = Some(now);
    }

    pub fn is_dirty(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether the pending record has been quiet long enough to write
    pub fn is_due(&self, now: i64) -> bool {
        match (&self.pending, self.last_change_at) {
            (Some(_), Some(changed)) => now.saturating_sub(changed) >= self.debounce_ms,
            (Some(_), None) => true,
            _ => false,
        }
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Write the pending record if the debounce window has elapsed
    ///
    /// Returns `Ok(true)` when a write happened.
    pub fn flush_due(
        &mut self,
        store: &dyn ProgressStore,
        user: &str,
        now: i64,
    ) -> Result<bool, StoreError> {
        if !self.is_due(now) {
            return Ok(false);
        }
        self.flush_now(store, user)
    }

    /// Write the pending record immediately
    ///
    /// On failure the record stays pending so the next flush retries it.
    pub fn flush_now(&mut self, store: &dyn ProgressStore, user: &str) -> Result<bool, StoreError> {
        let Some(record) = &self.pending else {
            return Ok(false);
        };

        match store.save(user, record) {
            Ok(()) => {
                tracing::debug!("Persisted progress for {} (xp {})", user, record.xp);
                self.pending = None;
                self.last_change_at = None;
                self.consecutive_failures = 0;
                Ok(true)
            }
            Err(e) => {
                self.consecutive_failures += 1;
                tracing::warn!(
                    "Failed to persist progress for {} (attempt {}): {}",
                    user,
                    self.consecutive_failures,
                    e
                );
                Err(e)
            }
        }
    }
}
