// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
use super::*;
use rstest::rstest;

#[test]
fn test_defaults() {
    let config = CaptureConfig::default();
    assert_eq!(config.capacity, 100);
    assert_eq!(config.debounce(), Duration::from_millis(300));
    assert_eq!(config.target_key, "data");
    assert_eq!(config.endpoint_patterns, vec!["/api/statistics/v2/track"]);
    assert_eq!(config.fallback_min_len, 20);
    assert_eq!(config.retention, RetentionPolicy::EndpointOrDecoded);
    assert!(config.auto_start_on_read);
    assert!(config.start_on_launch);
    assert_eq!(config.snapshot_key, "capturedRequestsByTab");
}

#[test]
fn test_empty_json_uses_defaults() {
    let config: CaptureConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config, CaptureConfig::default());
}

#[test]
fn test_partial_override() {
    let config: CaptureConfig = serde_json::from_str(
        r#"{"capacity": 5, "retention": "decoded_only", "auto_start_on_read": false}"#,
    )
    .unwrap();
    assert_eq!(config.capacity, 5);
    assert_eq!(config.retention, RetentionPolicy::DecodedOnly);
    assert!(!config.auto_start_on_read);
    assert_eq!(config.debounce_ms, 300);
}

#[test]
fn test_unknown_field_rejected() {
    let err = serde_json::from_str::<CaptureConfig>(r#"{"capacty": 5}"#).unwrap_err();
    assert!(err.to_string().contains("unknown field"));
}

#[test]
fn test_builders() {
    let config = CaptureConfig::default()
        .with_capacity(3)
        .with_retention(RetentionPolicy::DecodedOnly);
    assert_eq!(config.capacity, 3);
    assert_eq!(config.retention, RetentionPolicy::DecodedOnly);
    assert!(config.endpoint_matcher().is_target_endpoint("/api/statistics/v2/track"));
}

#[rstest]
#[case(RetentionPolicy::EndpointOrDecoded, true, 0, true)]
#[case(RetentionPolicy::EndpointOrDecoded, false, 1, true)]
#[case(RetentionPolicy::EndpointOrDecoded, false, 0, false)]
#[case(RetentionPolicy::DecodedOnly, true, 0, false)]
#[case(RetentionPolicy::DecodedOnly, false, 2, true)]
fn test_retention(
    #[case] policy: RetentionPolicy,
    #[case] endpoint: bool,
    #[case] decoded: usize,
    #[case] expected: bool,
) {
    assert_eq!(policy.retains(endpoint, decoded), expected);
}
