//! Progress session - the host context around the engine
//!
//! Owns the single in-memory snapshot for one user and wires the engine to
//! its collaborators: the clock for combo decisions, the store (through a
//! debounced writer) and a presentation sink.

use crate::clock::Clock;
use crate::progress::{
    load_snapshot, serialize_snapshot, EngineError, GamificationEngine, ProgressSnapshot,
    ProgressSummary, Resolution, SnapshotRecord,
};
use crate::sink::{dispatch, PresentationSink};
use crate::store::{DebouncedWriter, ProgressStore, StoreError};

pub struct ProgressSession<S, C, K> {
    user: String,
    engine: GamificationEngine,
    store: S,
    clock: C,
    sink: K,
    snapshot: ProgressSnapshot,
    writer: DebouncedWriter,
}

impl<S, C, K> ProgressSession<S, C, K>
where
    S: ProgressStore,
    C: Clock,
    K: PresentationSink,
{
    /// Load the user's stored snapshot, or start from an empty one
    pub fn open(
        user: impl Into<String>,
        engine: GamificationEngine,
        store: S,
        clock: C,
        sink: K,
        debounce_ms: i64,
    ) -> Result<Self, StoreError> {
        let user = user.into();
        let snapshot = match store.load(&user)? {
            Some(record) => load_snapshot(&record, engine.rules().xp_per_level)?,
            None => {
                tracing::debug!("No stored progress for {}, starting fresh", user);
                ProgressSnapshot::empty()
            }
        };

        Ok(Self {
            user,
            engine,
            store,
            clock,
            sink,
            snapshot,
            writer: DebouncedWriter::new(debounce_ms),
        })
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn snapshot(&self) -> &ProgressSnapshot {
        &self.snapshot
    }

    pub fn summary(&self) -> ProgressSummary {
        self.engine.summary(&self.snapshot)
    }

    pub fn engine(&self) -> &GamificationEngine {
        &self.engine
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut K {
        &mut self.sink
    }

    /// Whether a changed snapshot is waiting to be persisted
    pub fn is_dirty(&self) -> bool {
        self.writer.is_dirty()
    }

    pub fn export(&self) -> SnapshotRecord {
        serialize_snapshot(&self.snapshot)
    }

    /// Resolve an item now and surface the resulting notifications
    pub fn resolve(&mut self, item_id: &str, base_reward: i64) -> Result<Resolution, EngineError> {
        let now = self.clock.now_ms();
        let resolution = self
            .engine
            .resolve_item(&self.snapshot, item_id, base_reward, now)?;

        if resolution.qualified {
            self.replace_snapshot(resolution.snapshot.clone(), now);
            dispatch(&resolution.events(), &mut self.sink);
        }
        Ok(resolution)
    }

    /// Apply combo expiry and persist if the debounce window has elapsed
    ///
    /// Returns `Ok(true)` when a write happened. A failed write keeps the
    /// in-memory snapshot and stays pending for the next tick.
    pub fn tick(&mut self) -> Result<bool, StoreError> {
        let now = self.clock.now_ms();
        let next = self.engine.check_combo_expiry(&self.snapshot, now);
        if next != self.snapshot {
            self.replace_snapshot(next, now);
        }
        self.writer.flush_due(&self.store, &self.user, now)
    }

    /// Replace progress with the zero snapshot
    pub fn reset(&mut self) {
        tracing::info!("Resetting progress for {}", self.user);
        let now = self.clock.now_ms();
        let empty = self.engine.reset();
        self.replace_snapshot(empty, now);
    }

    /// Replace progress with an imported record
    pub fn import(&mut self, record: &SnapshotRecord) -> Result<(), StoreError> {
        let snapshot = load_snapshot(record, self.engine.rules().xp_per_level)?;
        let now = self.clock.now_ms();
        self.replace_snapshot(snapshot, now);
        Ok(())
    }

    /// Persist any pending change immediately
    pub fn flush(&mut self) -> Result<bool, StoreError> {
        self.writer.flush_now(&self.store, &self.user)
    }

    fn replace_snapshot(&mut self, snapshot: ProgressSnapshot, now: i64) {
        self.snapshot = snapshot;
        self.writer.mark_dirty(serialize_snapshot(&self.snapshot), now);
    }
}
