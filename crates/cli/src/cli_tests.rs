// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
use super::*;
use clap::CommandFactory;

#[test]
fn test_cli_definition_is_valid() {
    Cli::command().debug_assert();
}

#[test]
fn test_parse_decode_body() {
    let cli = Cli::try_parse_from(["statlens", "decode", r#"{"data":"eyJ4IjoxfQ=="}"#]).unwrap();
    let Command::Decode(args) = cli.command else {
        panic!("expected decode");
    };
    assert_eq!(args.body.as_deref(), Some(r#"{"data":"eyJ4IjoxfQ=="}"#));
    assert!(!args.form);
    assert_eq!(args.file, None);
}

#[test]
fn test_parse_decode_form_file() {
    let cli = Cli::try_parse_from(["statlens", "decode", "--form", "--file", "body.txt"]).unwrap();
    let Command::Decode(args) = cli.command else {
        panic!("expected decode");
    };
    assert!(args.form);
    assert_eq!(args.file, Some(PathBuf::from("body.txt")));
}

#[test]
fn test_decode_body_conflicts_with_file() {
    assert!(Cli::try_parse_from(["statlens", "decode", "abc", "--file", "x"]).is_err());
}

#[test]
fn test_parse_replay() {
    let cli = Cli::try_parse_from([
        "statlens",
        "replay",
        "events.jsonl",
        "--snapshot",
        "snap.json",
        "--origin",
        "12",
        "--capacity",
        "5",
        "--output-format",
        "json",
    ])
    .unwrap();
    let Command::Replay(args) = cli.command else {
        panic!("expected replay");
    };
    assert_eq!(args.events, PathBuf::from("events.jsonl"));
    assert_eq!(args.snapshot, Some(PathBuf::from("snap.json")));
    assert_eq!(args.origin, Some(OriginId(12)));
    assert_eq!(args.config.capacity, Some(5));
    assert_eq!(args.output_format, OutputFormat::Json);
}

#[test]
fn test_replay_rejects_bad_origin() {
    assert!(Cli::try_parse_from(["statlens", "replay", "e.jsonl", "--origin", "-1"]).is_err());
}

#[test]
fn test_parse_show_defaults() {
    let cli = Cli::try_parse_from(["statlens", "show", "--snapshot", "snap.json"]).unwrap();
    let Command::Show(args) = cli.command else {
        panic!("expected show");
    };
    assert_eq!(args.key, "capturedRequestsByTab");
    assert_eq!(args.output_format, OutputFormat::Text);
    assert_eq!(args.origin, None);
}

#[test]
fn test_show_requires_snapshot() {
    assert!(Cli::try_parse_from(["statlens", "show"]).is_err());
}

#[test]
fn test_verbose_is_global_and_counted() {
    let cli = Cli::try_parse_from(["statlens", "show", "--snapshot", "s.json", "-vv"]).unwrap();
    assert_eq!(cli.verbose, 2);
    assert_eq!(crate::logging::default_directive(cli.verbose), "trace");
    assert_eq!(crate::logging::default_directive(0), "warn");
}
