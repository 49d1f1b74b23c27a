// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Per-origin ring buffers of captured requests.
//!
//! Each origin holds a newest-first buffer bounded by the configured
//! capacity. Every mutation publishes the origin's badge and schedules a
//! debounced snapshot write when persistence is attached. Persistence
//! failures are logged and never affect the in-memory state.

use crate::badge::Badge;
use crate::debounce::Debouncer;
use crate::error::PersistError;
use crate::notify::Notifier;
use crate::persist::{decode_snapshot, encode_snapshot, Snapshot, SnapshotStore};
use crate::record::{CapturedRequest, OriginId};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

type Sessions = HashMap<OriginId, VecDeque<CapturedRequest>>;

/// Shared buffer state; the debounce task holds a second handle to it.
#[derive(Debug)]
struct StoreState {
    capacity: usize,
    sessions: Mutex<Sessions>,
}

impl StoreState {
    fn snapshot(&self) -> Snapshot {
        self.sessions
            .lock()
            .iter()
            .map(|(origin, records)| (*origin, records.iter().cloned().collect()))
            .collect()
    }
}

struct Persistence {
    backend: Arc<dyn SnapshotStore>,
    key: String,
    debouncer: Debouncer,
}

/// Capture store keyed by origin
pub struct CaptureStore {
    state: Arc<StoreState>,
    notifier: Notifier,
    persistence: Option<Persistence>,
}

impl CaptureStore {
    /// Create an in-memory store
    pub fn new(capacity: usize, notifier: Notifier) -> Self {
        Self {
            state: Arc::new(StoreState {
                capacity,
                sessions: Mutex::new(HashMap::new()),
            }),
            notifier,
            persistence: None,
        }
    }

    /// Attach a snapshot backend written at most once per `debounce` window
    pub fn with_persistence(
        mut self,
        backend: Arc<dyn SnapshotStore>,
        key: impl Into<String>,
        debounce: Duration,
    ) -> Self {
        let key = key.into();
        let state = Arc::clone(&self.state);
        let flush_backend = Arc::clone(&backend);
        let flush_key = key.clone();
        let debouncer = Debouncer::spawn(debounce, move || {
            if let Err(error) = write_snapshot(&*flush_backend, &flush_key, &state.snapshot()) {
                tracing::error!(%error, "failed to persist captured requests");
            }
        });

        self.persistence = Some(Persistence {
            backend,
            key,
            debouncer,
        });
        self
    }

    pub fn capacity(&self) -> usize {
        self.state.capacity
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Insert `record` at the head of the origin's buffer, evicting the
    /// oldest entries beyond capacity.
    pub fn append(&self, origin: OriginId, record: CapturedRequest) {
        let count = {
            let mut sessions = self.state.sessions.lock();
            let buffer = sessions.entry(origin).or_default();
            buffer.push_front(record);
            buffer.truncate(self.state.capacity);
            buffer.len()
        };

        tracing::debug!(%origin, count, "captured request stored");
        self.notifier.notify_badge(origin, Badge::for_count(count));
        self.schedule_persist();
    }

    /// Records for `origin`, newest first; empty if the origin is unknown
    pub fn list(&self, origin: OriginId) -> Vec<CapturedRequest> {
        self.state
            .sessions
            .lock()
            .get(&origin)
            .map(|records| records.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of records held for `origin`
    pub fn count(&self, origin: OriginId) -> usize {
        self.state
            .sessions
            .lock()
            .get(&origin)
            .map_or(0, VecDeque::len)
    }

    /// Whether the store holds state for `origin`, even an empty buffer
    pub fn contains(&self, origin: OriginId) -> bool {
        self.state.sessions.lock().contains_key(&origin)
    }

    /// Origins with state, in ascending order
    pub fn origins(&self) -> Vec<OriginId> {
        let mut origins: Vec<_> = self.state.sessions.lock().keys().copied().collect();
        origins.sort();
        origins
    }

    /// Badge for `origin`, or `None` once the origin has been removed
    pub fn badge(&self, origin: OriginId) -> Option<Badge> {
        self.state
            .sessions
            .lock()
            .get(&origin)
            .map(|records| Badge::for_count(records.len()))
    }

    /// Empty the origin's buffer, keeping the origin itself
    pub fn clear(&self, origin: OriginId) {
        self.state
            .sessions
            .lock()
            .entry(origin)
            .or_default()
            .clear();

        self.notifier.notify_badge(origin, Badge::default());
        self.schedule_persist();
    }

    /// Drop every trace of `origin`
    pub fn remove(&self, origin: OriginId) {
        let removed = self.state.sessions.lock().remove(&origin).is_some();
        if removed {
            tracing::debug!(%origin, "origin removed");
        }
        self.schedule_persist();
    }

    /// Replace all state with `snapshot`, re-deriving every origin's badge
    pub fn restore(&self, snapshot: Snapshot) {
        let restored: Vec<(OriginId, usize)> = {
            let mut sessions = self.state.sessions.lock();
            sessions.clear();
            for (origin, records) in snapshot {
                let mut buffer: VecDeque<_> = records.into();
                buffer.truncate(self.state.capacity);
                sessions.insert(origin, buffer);
            }
            sessions.iter().map(|(o, r)| (*o, r.len())).collect()
        };

        tracing::info!(origins = restored.len(), "restored captured requests");
        for (origin, count) in restored {
            self.notifier.notify_badge(origin, Badge::for_count(count));
        }
    }

    /// Read the persisted snapshot, if a backend is attached, and restore it.
    ///
    /// A missing or unreadable snapshot leaves the store empty.
    pub fn load_persisted(&self) {
        let Some(persistence) = &self.persistence else {
            return;
        };

        match persistence.backend.get(&persistence.key) {
            Ok(Some(value)) => self.restore(decode_snapshot(value)),
            Ok(None) => tracing::debug!("no persisted snapshot"),
            Err(error) => tracing::error!(%error, "failed to restore captured requests"),
        }
    }

    /// Copy of every origin's buffer
    pub fn snapshot(&self) -> Snapshot {
        self.state.snapshot()
    }

    /// Write the snapshot now, bypassing the debounce window.
    ///
    /// Runs on the calling thread; async callers with a file backend should
    /// move it to the blocking pool.
    pub fn flush(&self) -> Result<(), PersistError> {
        match &self.persistence {
            Some(p) => write_snapshot(&*p.backend, &p.key, &self.state.snapshot()),
            None => Ok(()),
        }
    }

    fn schedule_persist(&self) {
        if let Some(persistence) = &self.persistence {
            persistence.debouncer.trigger();
        }
    }
}

fn write_snapshot(
    backend: &dyn SnapshotStore,
    key: &str,
    snapshot: &Snapshot,
) -> Result<(), PersistError> {
    backend.set(key, encode_snapshot(snapshot)?)
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
