// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Producer adapters turning raw host events into captured requests.
//!
//! Two producers feed the same sink: the privileged network observer, which
//! sees every request of every tab, and the in-page hook on XHR/fetch, which
//! only sees what its own page sends. Both share one [`Pipeline`] so they
//! filter, decode, and retain by exactly the same rules.

use crate::clock::{Clock, ClockHandle};
use crate::config::{CaptureConfig, RetentionPolicy};
use crate::endpoint::EndpointMatcher;
use crate::normalizer::{FormFields, RequestBody, RequestNormalizer};
use crate::record::{CaptureSource, CapturedRequest, OriginId, PendingRequest};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Why an event did not become a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    NotPost,
    NoOrigin,
    /// Neither the endpoint nor the decoded fields satisfied the retention policy
    NotRetained,
}

/// Outcome of feeding one event to a producer.
#[derive(Clone, Debug, PartialEq)]
pub enum Ingest {
    Captured(CapturedRequest),
    Skipped(SkipReason),
}

impl Ingest {
    pub fn captured(self) -> Option<CapturedRequest> {
        match self {
            Self::Captured(record) => Some(record),
            Self::Skipped(_) => None,
        }
    }
}

/// Common interface of both producers.
pub trait Producer {
    type Event;

    /// Filter and decode `event`; `origin` is the tab the event belongs to.
    fn ingest(&self, origin: Option<OriginId>, event: &Self::Event) -> Ingest;
}

/// Monotonic id source: `<millis>-<sequence>`, unique per generator.
#[derive(Debug)]
pub struct RecordIds {
    clock: ClockHandle,
    seq: AtomicU64,
}

impl RecordIds {
    pub fn new(clock: ClockHandle) -> Self {
        Self {
            clock,
            seq: AtomicU64::new(0),
        }
    }

    pub fn clock(&self) -> &ClockHandle {
        &self.clock
    }

    pub fn next_id(&self) -> String {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        format!("{}-{}", self.clock.now_millis(), seq)
    }
}

/// Shared filtering, normalization, and retention.
#[derive(Debug)]
pub struct Pipeline {
    normalizer: RequestNormalizer,
    matcher: EndpointMatcher,
    retention: RetentionPolicy,
    ids: RecordIds,
}

impl Pipeline {
    pub fn new(config: &CaptureConfig, clock: ClockHandle) -> Self {
        Self {
            normalizer: RequestNormalizer::from_config(config),
            matcher: config.endpoint_matcher(),
            retention: config.retention,
            ids: RecordIds::new(clock),
        }
    }

    pub fn next_id(&self) -> String {
        self.ids.next_id()
    }

    /// Bind `pending` to `origin`, assigning an id if it has none.
    pub fn bind(&self, pending: PendingRequest, origin: OriginId) -> CapturedRequest {
        pending.into_captured(origin, || self.next_id())
    }

    pub fn retention(&self) -> RetentionPolicy {
        self.retention
    }

    /// Build a pending record, or say why the request is not kept.
    pub fn process(
        &self,
        url: &str,
        method: &str,
        body: Option<&RequestBody>,
        source: CaptureSource,
    ) -> Result<PendingRequest, SkipReason> {
        if !is_post(method) {
            return Err(SkipReason::NotPost);
        }

        let is_target_endpoint = self.matcher.matches_url(url);
        let normalized = body
            .map(|b| self.normalizer.normalize(b))
            .unwrap_or_default();

        if !self
            .retention
            .retains(is_target_endpoint, normalized.fields.len())
        {
            return Err(SkipReason::NotRetained);
        }

        for field in &normalized.fields {
            tracing::debug!(url, path = %field.path, "decoded base64 field");
        }

        Ok(PendingRequest {
            id: Some(self.ids.next_id()),
            timestamp: self.ids.clock().now_utc(),
            url: url.to_string(),
            method: method.to_ascii_uppercase(),
            raw_body: normalized.canonical,
            decoded_fields: normalized.fields,
            is_target_endpoint,
            source,
        })
    }
}

pub fn is_post(method: &str) -> bool {
    method.eq_ignore_ascii_case("POST")
}

// =============================================================================
// Privileged observer
// =============================================================================

/// One chunk of a raw request body.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawChunk {
    #[serde(default)]
    pub bytes: Option<Vec<u8>>,
    /// Set instead of `bytes` for file uploads
    #[serde(default)]
    pub file: Option<String>,
}

/// Request body as reported by the network observer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservedBody {
    #[serde(default)]
    pub raw: Option<Vec<RawChunk>>,
    #[serde(default)]
    pub form_data: Option<FormFields>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ObservedBody {
    /// Raw byte chunks are concatenated; form data is used only when there
    /// are no bytes.
    pub fn to_request_body(&self) -> Option<RequestBody> {
        if let Some(error) = &self.error {
            tracing::debug!(error, "host could not read request body");
        }

        let bytes: Vec<u8> = self
            .raw
            .iter()
            .flatten()
            .filter_map(|chunk| chunk.bytes.as_deref())
            .flatten()
            .copied()
            .collect();
        if !bytes.is_empty() {
            return Some(RequestBody::Raw(bytes));
        }

        self.form_data.clone().map(RequestBody::Form)
    }
}

/// An outbound request seen by the privileged observer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservedRequest {
    /// Host tab id; negative when the request has no tab
    pub tab_id: i64,
    pub url: String,
    pub method: String,
    #[serde(default)]
    pub request_body: Option<ObservedBody>,
}

impl ObservedRequest {
    pub fn origin(&self) -> Option<OriginId> {
        OriginId::from_tab_id(self.tab_id)
    }
}

/// Producer for the privileged network observer.
#[derive(Clone, Debug)]
pub struct ObserverProducer {
    pipeline: Arc<Pipeline>,
}

impl ObserverProducer {
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        Self { pipeline }
    }
}

impl Producer for ObserverProducer {
    type Event = ObservedRequest;

    fn ingest(&self, origin: Option<OriginId>, event: &ObservedRequest) -> Ingest {
        if !is_post(&event.method) {
            return Ingest::Skipped(SkipReason::NotPost);
        }
        let Some(origin) = origin else {
            return Ingest::Skipped(SkipReason::NoOrigin);
        };

        let body = event
            .request_body
            .as_ref()
            .and_then(ObservedBody::to_request_body);
        match self
            .pipeline
            .process(&event.url, &event.method, body.as_ref(), CaptureSource::Observer)
        {
            Ok(pending) => Ingest::Captured(self.pipeline.bind(pending, origin)),
            Err(reason) => Ingest::Skipped(reason),
        }
    }
}

// =============================================================================
// In-page hook
// =============================================================================

/// A multipart form value handed to an in-page hook.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FormValue {
    Text { value: String },
    File { name: String },
}

/// Body shapes an in-page hook can be called with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PageBody {
    Text(String),
    FormData(Vec<(String, FormValue)>),
}

impl PageBody {
    /// Text entries become form fields; file entries are never decode
    /// candidates and are left out.
    pub fn to_request_body(&self) -> RequestBody {
        match self {
            Self::Text(text) => RequestBody::Text(text.clone()),
            Self::FormData(entries) => {
                let mut form = FormFields::new();
                for (name, value) in entries {
                    match value {
                        FormValue::Text { value } => {
                            form.entry(name.clone()).or_default().push(value.clone())
                        }
                        FormValue::File { .. } => {
                            tracing::trace!(name, "skipping file entry in form body")
                        }
                    }
                }
                RequestBody::Form(form)
            }
        }
    }
}

/// A request issued through a hooked XHR `send` or `fetch` call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub url: String,
    pub method: String,
    #[serde(default)]
    pub body: Option<PageBody>,
}

/// Producer for the in-page XHR/fetch hook.
#[derive(Clone, Debug)]
pub struct PageProducer {
    pipeline: Arc<Pipeline>,
}

impl PageProducer {
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        Self { pipeline }
    }

    /// The in-page half: decode without knowing which tab this is.
    ///
    /// Hooks only fire for calls that carry a body.
    pub fn decode(&self, event: &PageRequest) -> Result<PendingRequest, SkipReason> {
        let Some(body) = &event.body else {
            return Err(SkipReason::NotRetained);
        };
        self.pipeline.process(
            &event.url,
            &event.method,
            Some(&body.to_request_body()),
            CaptureSource::PageScript,
        )
    }
}

impl Producer for PageProducer {
    type Event = PageRequest;

    fn ingest(&self, origin: Option<OriginId>, event: &PageRequest) -> Ingest {
        if !is_post(&event.method) {
            return Ingest::Skipped(SkipReason::NotPost);
        }
        let Some(origin) = origin else {
            return Ingest::Skipped(SkipReason::NoOrigin);
        };
        match self.decode(event) {
            Ok(pending) => Ingest::Captured(self.pipeline.bind(pending, origin)),
            Err(reason) => Ingest::Skipped(reason),
        }
    }
}

#[cfg(test)]
#[path = "producer_tests.rs"]
mod tests;
