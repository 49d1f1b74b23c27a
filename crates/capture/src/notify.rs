// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Best-effort fan-out of capture events to presentation surfaces.

use crate::badge::Badge;
use crate::record::{CapturedRequest, OriginId};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Events buffered per subscriber before the slowest one starts lagging.
const EVENT_BUFFER: usize = 256;

/// Outbound event broadcast to listeners.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum CaptureEvent {
    NewRequest {
        #[serde(rename = "tabId")]
        origin: OriginId,
        request: Box<CapturedRequest>,
    },
    BadgeChanged {
        #[serde(rename = "tabId")]
        origin: OriginId,
        badge: Badge,
    },
}

/// Publishes [`CaptureEvent`]s to any number of subscribers.
///
/// Publishing never fails: with no subscribers the event is dropped.
#[derive(Clone, Debug)]
pub struct Notifier {
    tx: broadcast::Sender<CaptureEvent>,
}

impl Notifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_BUFFER);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CaptureEvent> {
        self.tx.subscribe()
    }

    /// Publish an event, returning how many subscribers received it.
    pub fn publish(&self, event: CaptureEvent) -> usize {
        match self.tx.send(event) {
            Ok(delivered) => delivered,
            Err(_) => {
                tracing::trace!("no listeners for capture event");
                0
            }
        }
    }

    pub fn notify_new_request(&self, origin: OriginId, request: &CapturedRequest) -> usize {
        self.publish(CaptureEvent::NewRequest {
            origin,
            request: Box::new(request.clone()),
        })
    }

    pub fn notify_badge(&self, origin: OriginId, badge: Badge) -> usize {
        self.publish(CaptureEvent::BadgeChanged { origin, badge })
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "notify_tests.rs"]
mod tests;
