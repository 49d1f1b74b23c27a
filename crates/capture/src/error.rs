// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy for the capture pipeline.
//!
//! None of these are fatal to the pipeline: decode and persistence failures
//! are logged and swallowed at the call site, routing failures are answered
//! back to the producer that sent the event.

use thiserror::Error;

/// A single candidate field could not be decoded.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("decoded bytes are not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Snapshot read or write failure.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot store unavailable: {0}")]
    Unavailable(String),
}

/// Failure registering or removing the network observer with the host.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("host rejected listener registration: {0}")]
    Rejected(String),
}

/// Errors surfaced to producers and message senders.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("No tab ID")]
    NoOrigin,

    #[error("unsupported_action")]
    UnsupportedAction,

    #[error(transparent)]
    Host(#[from] HostError),
}
