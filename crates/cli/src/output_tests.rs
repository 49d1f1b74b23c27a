// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
use super::*;
use chrono::{TimeZone, Utc};
use serde_json::json;
use statlens_capture::{CaptureSource, DecodedField, DecodedValue};

fn request(id: &str, origin: u32) -> CapturedRequest {
    CapturedRequest {
        id: id.to_string(),
        timestamp: Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
        url: "https://example.com/api/statistics/v2/track".to_string(),
        method: "POST".to_string(),
        raw_body: Some(r#"{"data":"eyJ4IjoxfQ=="}"#.to_string()),
        decoded_fields: vec![DecodedField {
            path: "data".to_string(),
            original: "eyJ4IjoxfQ==".to_string(),
            decoded: DecodedValue::Json(json!({"x": 1})),
        }],
        is_target_endpoint: true,
        origin: OriginId(origin),
        source: CaptureSource::Observer,
    }
}

fn render(reports: &[OriginReport], format: OutputFormat) -> String {
    let mut buf = Vec::new();
    write_reports(&mut buf, reports, format).unwrap();
    String::from_utf8(buf).unwrap()
}

#[test]
fn error_plain_text_when_not_terminal() {
    let mut buf = Vec::new();
    write_error(&mut buf, "something went wrong", false);
    assert_eq!(String::from_utf8(buf).unwrap(), "Error: something went wrong\n");
}

#[test]
fn error_with_ansi_when_terminal() {
    let mut buf = Vec::new();
    write_error(&mut buf, "something went wrong", true);
    assert_eq!(
        String::from_utf8(buf).unwrap(),
        "\x1b[31mError: something went wrong\x1b[0m\n"
    );
}

#[test]
fn warning_plain_text_when_not_terminal() {
    let mut buf = Vec::new();
    write_warning(&mut buf, format_args!("{} lines skipped", 2), false);
    assert_eq!(String::from_utf8(buf).unwrap(), "Warning: 2 lines skipped\n");
}

#[test]
fn warning_with_ansi_when_terminal() {
    let mut buf = Vec::new();
    write_warning(&mut buf, "snapshot not written", true);
    assert_eq!(
        String::from_utf8(buf).unwrap(),
        "\x1b[33mWarning: snapshot not written\x1b[0m\n"
    );
}

#[test]
fn collect_all_origins_in_order() {
    let mut snapshot = Snapshot::new();
    snapshot.insert(OriginId(2), vec![request("b", 2)]);
    snapshot.insert(OriginId(1), vec![request("a", 1), request("c", 1)]);

    let reports = collect_reports(snapshot, None);
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].tab_id, OriginId(1));
    assert_eq!(reports[0].badge.text, "2");
    assert_eq!(reports[1].tab_id, OriginId(2));
}

#[test]
fn collect_single_origin() {
    let mut snapshot = Snapshot::new();
    snapshot.insert(OriginId(2), vec![request("b", 2)]);

    let reports = collect_reports(snapshot.clone(), Some(OriginId(2)));
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].requests[0].id, "b");

    let missing = collect_reports(snapshot, Some(OriginId(9)));
    assert_eq!(missing[0].requests, vec![]);
    assert!(missing[0].badge.is_empty());
}

#[test]
fn text_report_lists_decoded_fields() {
    let reports = vec![OriginReport {
        tab_id: OriginId(4),
        badge: Badge::for_count(1),
        requests: vec![request("a", 4)],
    }];

    assert_eq!(
        render(&reports, OutputFormat::Text),
        "Tab 4 [1]\n\
         \x20 2026-01-02T03:04:05.000Z POST https://example.com/api/statistics/v2/track (target)\n\
         \x20   data: {\"x\":1}\n"
    );
}

#[test]
fn text_report_for_empty_origin() {
    let reports = vec![OriginReport {
        tab_id: OriginId(4),
        badge: Badge::default(),
        requests: vec![],
    }];
    assert_eq!(render(&reports, OutputFormat::Text), "Tab 4 [-]\n");
    assert_eq!(render(&[], OutputFormat::Text), "No captured requests\n");
}

#[test]
fn json_report_shape() {
    let reports = vec![OriginReport {
        tab_id: OriginId(4),
        badge: Badge::for_count(1),
        requests: vec![request("a", 4)],
    }];

    let value: serde_json::Value =
        serde_json::from_str(&render(&reports, OutputFormat::Json)).unwrap();
    assert_eq!(value[0]["tabId"], 4);
    assert_eq!(value[0]["badge"], json!({"text": "1", "color": "#1a73e8"}));
    assert_eq!(value[0]["requests"][0]["decodedFields"][0]["decoded"], json!({"x": 1}));
    assert_eq!(value[0]["requests"][0]["source"], "observer");
}
