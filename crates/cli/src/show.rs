// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `statlens show`: print a persisted snapshot.

use crate::cli::ShowArgs;
use crate::output::{collect_reports, write_reports};
use statlens_capture::persist::decode_snapshot;
use statlens_capture::{JsonFileStore, PersistError, Snapshot, SnapshotStore};
use std::io::{self, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShowError {
    #[error("Failed to read snapshot '{path}': {source}")]
    Snapshot {
        path: String,
        #[source]
        source: PersistError,
    },

    #[error("Failed to write output: {0}")]
    Output(#[from] io::Error),
}

/// Load the snapshot stored under `key`; a missing file or key is empty.
pub fn load_snapshot(store: &JsonFileStore, key: &str) -> Result<Snapshot, ShowError> {
    let value = store.get(key).map_err(|source| ShowError::Snapshot {
        path: store.path().display().to_string(),
        source,
    })?;
    Ok(value.map(decode_snapshot).unwrap_or_default())
}

pub fn run<W: Write>(args: &ShowArgs, out: &mut W) -> Result<(), ShowError> {
    let store = JsonFileStore::new(&args.snapshot);
    let snapshot = load_snapshot(&store, &args.key)?;
    let reports = collect_reports(snapshot, args.origin);
    write_reports(out, &reports, args.output_format)?;
    Ok(())
}

#[cfg(test)]
#[path = "show_tests.rs"]
mod tests;
