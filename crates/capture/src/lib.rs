// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Request capture and base64 payload decoding.
//!
//! Outbound requests are observed at two layers, a privileged network
//! observer and an in-page XHR/fetch hook. Their bodies are normalized, a
//! named base64 field is searched for and decoded, and the resulting records
//! are kept in per-origin ring buffers that are snapshotted to storage and
//! announced to listeners.

pub mod badge;
pub mod clock;
pub mod codec;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod endpoint;
pub mod error;
pub mod host;
pub mod message;
pub mod normalizer;
pub mod notify;
pub mod persist;
pub mod producer;
pub mod record;
pub mod store;

pub use badge::Badge;
pub use clock::{Clock, ClockHandle, FakeClock, SystemClock};
pub use config::{CaptureConfig, RetentionPolicy};
pub use controller::CaptureController;
pub use endpoint::EndpointMatcher;
pub use error::{CaptureError, DecodeError, HostError, PersistError};
pub use host::{LocalHost, NetworkHost};
pub use message::{RuntimeMessage, RuntimeResponse};
pub use normalizer::{FormFields, NormalizedBody, RequestBody, RequestNormalizer};
pub use notify::{CaptureEvent, Notifier};
pub use persist::{JsonFileStore, MemoryStore, Snapshot, SnapshotStore};
pub use producer::{Ingest, ObservedRequest, PageRequest, Producer, SkipReason};
pub use record::{CaptureSource, CapturedRequest, DecodedField, DecodedValue, OriginId, PendingRequest};
pub use store::CaptureStore;
