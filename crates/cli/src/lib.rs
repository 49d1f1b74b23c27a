// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! statlens command line
//!
//! Decodes base64 tracking payloads from request bodies, replays recorded
//! host events through the capture pipeline, and prints persisted snapshots.

pub mod cli;
pub mod config;
pub mod decode;
pub mod logging;
pub mod output;
pub mod replay;
pub mod show;

use cli::{Cli, Command};
use thiserror::Error;

/// Failure of any subcommand
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Decode(#[from] decode::DecodeCommandError),

    #[error(transparent)]
    Replay(#[from] replay::ReplayError),

    #[error(transparent)]
    Show(#[from] show::ShowError),
}

/// Run the parsed command, writing results to stdout.
pub async fn run(cli: Cli) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match &cli.command {
        Command::Decode(args) => decode::run(args, &mut out)?,
        Command::Replay(args) => replay::run(args, &mut out).await?,
        Command::Show(args) => show::run(args, &mut out)?,
    }
    Ok(())
}
