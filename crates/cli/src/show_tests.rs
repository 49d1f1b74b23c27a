// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
use super::*;
use serde_json::json;
use statlens_capture::OriginId;
use tempfile::tempdir;

fn record(id: &str, tab: u32) -> serde_json::Value {
    json!({
        "id": id,
        "timestamp": "2026-01-02T03:04:05Z",
        "url": "https://example.com/api/statistics/v2/track",
        "method": "POST",
        "requestData": "{}",
        "decodedData": [],
        "isTargetAPI": true,
        "origin": tab
    })
}

#[test]
fn missing_file_is_empty() {
    let dir = tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("absent.json"));
    assert!(load_snapshot(&store, "capturedRequestsByTab").unwrap().is_empty());
}

#[test]
fn loads_records_and_skips_bad_keys() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.json");
    std::fs::write(
        &path,
        json!({
            "capturedRequestsByTab": {
                "7": [record("a", 7)],
                "tab-x": [record("b", 8)]
            }
        })
        .to_string(),
    )
    .unwrap();

    let snapshot = load_snapshot(&JsonFileStore::new(&path), "capturedRequestsByTab").unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[&OriginId(7)][0].id, "a");
}

#[test]
fn unreadable_snapshot_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.json");
    std::fs::write(&path, "[1, 2, 3]").unwrap();

    let err = load_snapshot(&JsonFileStore::new(&path), "capturedRequestsByTab").unwrap_err();
    assert!(err.to_string().contains("snapshot.json"));
}
