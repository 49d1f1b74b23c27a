// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
use super::*;
use serde_json::json;
use statlens_capture::persist::decode_snapshot;
use statlens_capture::{CaptureSource, MemoryStore, RetentionPolicy};

const TRACK: &str = "https://example.com/api/statistics/v2/track";

fn replay() -> Replay {
    Replay::with_clock(CaptureConfig::default(), None, ClockHandle::fake_at(1_000))
}

fn observed(tab: i64, body: &str) -> String {
    json!({
        "event": "observed",
        "tabId": tab,
        "url": TRACK,
        "method": "POST",
        "requestBody": {"raw": [{"bytes": body.as_bytes()}]}
    })
    .to_string()
}

fn page(tab: Option<u32>, body: &str) -> String {
    json!({
        "event": "page",
        "tabId": tab,
        "request": {
            "url": TRACK,
            "method": "POST",
            "body": {"type": "text", "value": body}
        }
    })
    .to_string()
}

async fn run_lines(replay: &mut Replay, lines: &[String]) -> Result<(), ReplayError> {
    let input = lines.join("\n");
    replay.run(input.as_bytes()).await
}

#[test]
fn parses_every_event_kind() {
    let events: Vec<HostEvent> = [
        observed(1, "{}"),
        page(Some(2), "{}"),
        r#"{"event":"message","sender":3,"message":{"action":"clearRequests"}}"#.to_string(),
        r#"{"event":"tab_removed","tabId":4}"#.to_string(),
        r#"{"event":"start"}"#.to_string(),
        r#"{"event":"stop"}"#.to_string(),
    ]
    .iter()
    .map(|line| serde_json::from_str(line).unwrap())
    .collect();

    assert!(matches!(&events[0], HostEvent::Observed(r) if r.tab_id == 1));
    assert!(matches!(&events[1], HostEvent::Page { tab_id: Some(OriginId(2)), .. }));
    assert!(matches!(&events[2], HostEvent::Message { sender: Some(OriginId(3)), .. }));
    assert_eq!(events[3], HostEvent::TabRemoved { tab_id: OriginId(4) });
    assert_eq!(events[4], HostEvent::Start);
    assert_eq!(events[5], HostEvent::Stop);
}

#[tokio::test]
async fn observed_events_need_a_listener() {
    let mut replay = replay();
    run_lines(&mut replay, &[observed(1, "{}")]).await.unwrap();
    assert_eq!(replay.stats().undelivered, 1);
    assert_eq!(replay.controller().store().count(OriginId(1)), 0);

    replay.launch().await.unwrap();
    run_lines(&mut replay, &[observed(1, "{}")]).await.unwrap();
    assert_eq!(replay.stats().captured, 1);
    assert_eq!(replay.controller().store().count(OriginId(1)), 1);
}

#[tokio::test]
async fn stop_and_start_gate_delivery() {
    let mut replay = replay();
    replay.launch().await.unwrap();

    let lines = [
        observed(1, "{}"),
        r#"{"event":"stop"}"#.to_string(),
        observed(1, "{}"),
        r#"{"event":"start"}"#.to_string(),
        observed(1, "{}"),
    ];
    run_lines(&mut replay, &lines).await.unwrap();

    let stats = replay.stats();
    assert_eq!(stats.events, 5);
    assert_eq!(stats.captured, 2);
    assert_eq!(stats.undelivered, 1);
    assert_eq!(replay.host().registrations(), 2);
}

#[tokio::test]
async fn page_events_cross_the_message_boundary() {
    let mut replay = replay();
    let lines = [
        page(Some(5), r#"{"data":"eyJ4IjoxfQ=="}"#),
        page(None, r#"{"data":"eyJ4IjoxfQ=="}"#),
    ];
    run_lines(&mut replay, &lines).await.unwrap();

    let records = replay.controller().store().list(OriginId(5));
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].source, CaptureSource::PageScript);
    assert_eq!(records[0].decoded_fields[0].path, "data");

    let stats = replay.stats();
    assert_eq!(stats.captured, 1);
    assert_eq!(stats.failures, 1);
}

#[tokio::test]
async fn page_events_follow_retention() {
    let config = CaptureConfig::default().with_retention(RetentionPolicy::DecodedOnly);
    let mut replay = Replay::with_clock(config, None, ClockHandle::fake_at(0));
    run_lines(&mut replay, &[page(Some(5), "{}")]).await.unwrap();

    assert_eq!(replay.stats().skipped, 1);
    assert!(replay.controller().store().origins().is_empty());
}

#[tokio::test]
async fn messages_and_tab_removal() {
    let mut replay = replay();
    replay.launch().await.unwrap();
    let lines = [
        observed(1, "{}"),
        observed(2, "{}"),
        r#"{"event":"message","sender":1,"message":{"action":"clearRequests"}}"#.to_string(),
        r#"{"event":"tab_removed","tabId":2}"#.to_string(),
        r#"{"event":"message","message":{"action":"bogus"}}"#.to_string(),
    ];
    run_lines(&mut replay, &lines).await.unwrap();

    let store = replay.controller().store();
    assert!(store.contains(OriginId(1)));
    assert_eq!(store.count(OriginId(1)), 0);
    assert!(!store.contains(OriginId(2)));
    assert_eq!(replay.stats().failures, 1);
}

#[tokio::test]
async fn skips_blank_and_comment_lines() {
    let mut replay = replay();
    let lines = [
        "# recorded 2026-01-02".to_string(),
        String::new(),
        r#"{"event":"start"}"#.to_string(),
    ];
    run_lines(&mut replay, &lines).await.unwrap();
    assert_eq!(replay.stats().events, 1);
}

#[tokio::test]
async fn malformed_line_reports_line_number() {
    let mut replay = replay();
    let lines = [
        r#"{"event":"start"}"#.to_string(),
        r#"{"event":"teleport"}"#.to_string(),
    ];
    let err = run_lines(&mut replay, &lines).await.unwrap_err();
    assert!(matches!(err, ReplayError::Parse { line: 2, .. }));
    assert_eq!(replay.stats().events, 1);
}

#[tokio::test(start_paused = true)]
async fn finish_writes_snapshot() {
    let backend = Arc::new(MemoryStore::new());
    let mut replay = Replay::with_clock(
        CaptureConfig::default(),
        Some(Arc::clone(&backend) as Arc<dyn SnapshotStore>),
        ClockHandle::fake_at(7_000),
    );
    replay.launch().await.unwrap();
    run_lines(&mut replay, &[observed(3, "{}")]).await.unwrap();
    replay.finish().await.unwrap();

    let snapshot = decode_snapshot(backend.item("capturedRequestsByTab").unwrap());
    assert_eq!(snapshot[&OriginId(3)][0].id, "7000-0");
}

#[tokio::test(start_paused = true)]
async fn launch_restores_previous_snapshot() {
    let backend = Arc::new(MemoryStore::new());
    {
        let mut first = Replay::with_clock(
            CaptureConfig::default(),
            Some(Arc::clone(&backend) as Arc<dyn SnapshotStore>),
            ClockHandle::fake_at(1_000),
        );
        first.launch().await.unwrap();
        run_lines(&mut first, &[observed(3, "{}")]).await.unwrap();
        first.finish().await.unwrap();
    }

    let mut second = Replay::with_clock(
        CaptureConfig::default(),
        Some(Arc::clone(&backend) as Arc<dyn SnapshotStore>),
        ClockHandle::fake_at(2_000),
    );
    second.launch().await.unwrap();
    run_lines(&mut second, &[observed(3, "{}")]).await.unwrap();

    let ids: Vec<_> = second
        .controller()
        .store()
        .list(OriginId(3))
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids, vec!["2000-0", "1000-0"]);
}
