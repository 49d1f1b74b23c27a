// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal output: diagnostics and captured-request reports.

use crate::cli::OutputFormat;
use chrono::SecondsFormat;
use serde::Serialize;
use statlens_capture::{Badge, CapturedRequest, OriginId, Snapshot};
use std::io::{self, IsTerminal, Write};

/// Print an error message to stderr.
///
/// Displays in red when stderr is a terminal, plain text otherwise.
pub fn print_error(msg: impl std::fmt::Display) {
    let is_tty = io::stderr().is_terminal();
    write_error(&mut io::stderr(), msg, is_tty);
}

fn write_error<W: Write>(writer: &mut W, msg: impl std::fmt::Display, is_terminal: bool) {
    if is_terminal {
        let _ = writeln!(writer, "\x1b[31mError: {}\x1b[0m", msg);
    } else {
        let _ = writeln!(writer, "Error: {}", msg);
    }
}

/// Print a warning message to stderr.
///
/// Displays in yellow when stderr is a terminal, plain text otherwise.
pub fn print_warning(msg: impl std::fmt::Display) {
    let is_tty = io::stderr().is_terminal();
    write_warning(&mut io::stderr(), msg, is_tty);
}

fn write_warning<W: Write>(writer: &mut W, msg: impl std::fmt::Display, is_terminal: bool) {
    if is_terminal {
        let _ = writeln!(writer, "\x1b[33mWarning: {}\x1b[0m", msg);
    } else {
        let _ = writeln!(writer, "Warning: {}", msg);
    }
}

/// One tab's records as printed by `replay` and `show`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginReport {
    pub tab_id: OriginId,
    pub badge: Badge,
    pub requests: Vec<CapturedRequest>,
}

/// Reports for every origin in `snapshot`, or just `only` when given.
///
/// An origin that was asked for but holds no state still gets an empty report.
pub fn collect_reports(snapshot: Snapshot, only: Option<OriginId>) -> Vec<OriginReport> {
    let report = |tab_id, requests: Vec<CapturedRequest>| OriginReport {
        tab_id,
        badge: Badge::for_count(requests.len()),
        requests,
    };

    match only {
        Some(origin) => {
            let mut snapshot = snapshot;
            let requests = snapshot.remove(&origin).unwrap_or_default();
            vec![report(origin, requests)]
        }
        None => snapshot
            .into_iter()
            .map(|(origin, requests)| report(origin, requests))
            .collect(),
    }
}

pub fn write_reports<W: Write>(
    writer: &mut W,
    reports: &[OriginReport],
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *writer, reports).map_err(io::Error::other)?;
            writeln!(writer)
        }
        OutputFormat::Text => {
            if reports.is_empty() {
                return writeln!(writer, "No captured requests");
            }
            for report in reports {
                write_report_text(writer, report)?;
            }
            Ok(())
        }
    }
}

fn write_report_text<W: Write>(writer: &mut W, report: &OriginReport) -> io::Result<()> {
    let badge = if report.badge.is_empty() {
        "-"
    } else {
        report.badge.text.as_str()
    };
    writeln!(writer, "Tab {} [{}]", report.tab_id, badge)?;

    for request in &report.requests {
        let target = if request.is_target_endpoint {
            " (target)"
        } else {
            ""
        };
        writeln!(
            writer,
            "  {} {} {}{}",
            request.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            request.method,
            request.url,
            target
        )?;
        for field in &request.decoded_fields {
            writeln!(writer, "    {}: {}", field.path, field.decoded.to_json())?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
