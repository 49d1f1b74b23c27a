// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Snapshot persistence.
//!
//! The snapshot is a single keyed blob mapping origin id (as a string) to
//! that origin's newest-first record list. It is read once at startup and
//! rewritten wholesale on every flush.

use crate::error::PersistError;
use crate::record::{CapturedRequest, OriginId};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Origin to buffer mapping, as persisted.
pub type Snapshot = BTreeMap<OriginId, Vec<CapturedRequest>>;

/// Keyed storage area the snapshot is written into.
pub trait SnapshotStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>, PersistError>;

    fn set(&self, key: &str, value: Value) -> Result<(), PersistError>;
}

/// Encode a snapshot as a JSON object keyed by origin id.
pub fn encode_snapshot(snapshot: &Snapshot) -> Result<Value, PersistError> {
    let mut map = Map::new();
    for (origin, records) in snapshot {
        map.insert(origin.to_string(), serde_json::to_value(records)?);
    }
    Ok(Value::Object(map))
}

/// Decode a persisted snapshot.
///
/// Entries whose key is not an origin id, or whose records do not parse,
/// are skipped so one bad entry does not discard the rest.
pub fn decode_snapshot(value: Value) -> Snapshot {
    let Value::Object(map) = value else {
        tracing::warn!("persisted snapshot is not an object, ignoring");
        return Snapshot::new();
    };

    let mut snapshot = Snapshot::new();
    for (key, records) in map {
        let Ok(origin) = key.parse::<OriginId>() else {
            tracing::warn!(key, "skipping snapshot entry with invalid origin id");
            continue;
        };
        match serde_json::from_value::<Vec<CapturedRequest>>(records) {
            Ok(records) => {
                snapshot.insert(origin, records);
            }
            Err(error) => {
                tracing::warn!(%origin, %error, "skipping unreadable snapshot entry");
            }
        }
    }
    snapshot
}

/// Storage area backed by a JSON file holding an object of keyed blobs.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Map<String, Value>, PersistError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str(&content)? {
            Value::Object(map) => Ok(map),
            _ => Err(PersistError::Unavailable(format!(
                "{} does not hold a JSON object",
                self.path.display()
            ))),
        }
    }

    /// Write via a temp file in the same directory, then rename over the target.
    fn write_all(&self, map: &Map<String, Value>) -> Result<(), PersistError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer(&mut file, map)?;
        file.flush()?;
        file.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl SnapshotStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, PersistError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: Value) -> Result<(), PersistError> {
        let mut map = self.read_all()?;
        map.insert(key.to_string(), value);
        self.write_all(&map)
    }
}

/// In-memory storage area with write counting and failure injection.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, Value>>,
    writes: AtomicUsize,
    failing: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with one blob
    pub fn with_item(key: &str, value: Value) -> Self {
        let store = Self::new();
        store.items.lock().insert(key.to_string(), value);
        store
    }

    /// Number of successful `set` calls
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make every subsequent read and write fail
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn item(&self, key: &str) -> Option<Value> {
        self.items.lock().get(key).cloned()
    }

    fn check(&self) -> Result<(), PersistError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PersistError::Unavailable("memory store set to fail".into()));
        }
        Ok(())
    }
}

impl SnapshotStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, PersistError> {
        self.check()?;
        Ok(self.items.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), PersistError> {
        self.check()?;
        self.items.lock().insert(key.to_string(), value);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
#[path = "persist_tests.rs"]
mod tests;
