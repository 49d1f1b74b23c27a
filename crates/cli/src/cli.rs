// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! CLI argument parsing.

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use statlens_capture::config::DEFAULT_SNAPSHOT_KEY;
use statlens_capture::OriginId;

/// Capture and decode base64 tracking payloads
#[derive(Parser, Debug)]
#[command(name = "statlens", version, about = "Capture and decode base64 tracking payloads")]
pub struct Cli {
    /// Raise log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Normalize one request body and print what decodes out of it
    Decode(DecodeArgs),

    /// Replay a JSONL log of host events through the capture pipeline
    Replay(ReplayArgs),

    /// Print a persisted snapshot
    Show(ShowArgs),
}

/// Config file plus the overrides accepted on the command line
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Capture config file (TOML, or JSON/JSON5 by extension)
    #[arg(long, value_name = "PATH", env = "STATLENS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Records kept per tab
    #[arg(long)]
    pub capacity: Option<usize>,

    /// Persistence debounce window in milliseconds
    #[arg(long)]
    pub debounce_ms: Option<u64>,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Request body; read from stdin when neither BODY nor --file is given
    #[arg(value_name = "BODY", conflicts_with = "file")]
    pub body: Option<String>,

    /// Read the body from a file
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Treat the body as URL-encoded form data
    #[arg(long)]
    pub form: bool,

    /// Request URL, to report whether it is a monitored endpoint
    #[arg(long)]
    pub url: Option<String>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// JSONL file of host events, one per line
    #[arg(value_name = "EVENTS")]
    pub events: PathBuf,

    /// Snapshot file restored before and written after the replay
    #[arg(long, value_name = "PATH")]
    pub snapshot: Option<PathBuf>,

    /// Only print this tab's records
    #[arg(long, value_name = "ID")]
    pub origin: Option<OriginId>,

    #[arg(long, value_enum, default_value = "text")]
    pub output_format: OutputFormat,

    #[command(flatten)]
    pub config: ConfigArgs,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Snapshot file to read
    #[arg(long, value_name = "PATH")]
    pub snapshot: PathBuf,

    /// Only print this tab's records
    #[arg(long, value_name = "ID")]
    pub origin: Option<OriginId>,

    /// Key the snapshot is stored under
    #[arg(long, default_value = DEFAULT_SNAPSHOT_KEY)]
    pub key: String,

    #[arg(long, value_enum, default_value = "text")]
    pub output_format: OutputFormat,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
