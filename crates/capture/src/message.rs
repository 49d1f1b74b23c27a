// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime message boundary between presentation surfaces, in-page hooks,
//! and the controller.

use crate::controller::CaptureController;
use crate::error::CaptureError;
use crate::record::{CapturedRequest, OriginId, PendingRequest};
use serde::{Deserialize, Serialize};

/// Inbound message, tagged by `action`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum RuntimeMessage {
    StartCapture,
    StopCapture,
    GetCapturedRequests {
        #[serde(rename = "tabId", default)]
        tab_id: Option<OriginId>,
    },
    ClearRequests {
        #[serde(rename = "tabId", default)]
        tab_id: Option<OriginId>,
    },
    InterceptedRequest {
        request: PendingRequest,
    },
    #[serde(other)]
    Unsupported,
}

/// Reply sent back to the message's sender.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuntimeResponse {
    Requests {
        requests: Vec<CapturedRequest>,
    },
    Ack {
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

impl RuntimeResponse {
    pub fn ok() -> Self {
        Self::Ack {
            success: true,
            error: None,
        }
    }

    pub fn failure(error: impl ToString) -> Self {
        Self::Ack {
            success: false,
            error: Some(error.to_string()),
        }
    }
}

/// Dispatch `message` from `sender` (the tab it came from, if any).
///
/// Messages that name no tab fall back to the sender's tab.
pub async fn dispatch(
    controller: &CaptureController,
    message: RuntimeMessage,
    sender: Option<OriginId>,
) -> RuntimeResponse {
    controller.ready().await;

    match message {
        RuntimeMessage::StartCapture => match controller.start() {
            Ok(()) => RuntimeResponse::ok(),
            Err(error) => RuntimeResponse::failure(error),
        },
        RuntimeMessage::StopCapture => {
            controller.stop();
            RuntimeResponse::ok()
        }
        RuntimeMessage::GetCapturedRequests { tab_id } => {
            let requests = match tab_id.or(sender) {
                Some(origin) => controller.get_captured_requests(origin).await,
                None => Vec::new(),
            };
            RuntimeResponse::Requests { requests }
        }
        RuntimeMessage::ClearRequests { tab_id } => match tab_id.or(sender) {
            Some(origin) => {
                controller.clear_requests(origin).await;
                RuntimeResponse::ok()
            }
            None => RuntimeResponse::failure(CaptureError::NoOrigin),
        },
        RuntimeMessage::InterceptedRequest { request } => {
            match controller.ingest_intercepted_request(sender, request).await {
                Ok(_) => RuntimeResponse::ok(),
                Err(error) => RuntimeResponse::failure(error),
            }
        }
        RuntimeMessage::Unsupported => RuntimeResponse::failure(CaptureError::UnsupportedAction),
    }
}

/// Parse and dispatch a JSON message; unparseable input is answered with a
/// failure rather than an error.
pub async fn dispatch_json(
    controller: &CaptureController,
    json: &str,
    sender: Option<OriginId>,
) -> RuntimeResponse {
    match serde_json::from_str::<RuntimeMessage>(json) {
        Ok(message) => dispatch(controller, message, sender).await,
        Err(error) => {
            tracing::warn!(%error, "unreadable runtime message");
            RuntimeResponse::failure("invalid_message")
        }
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
