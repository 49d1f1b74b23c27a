// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Capture pipeline configuration.

use crate::endpoint::{EndpointMatcher, DEFAULT_ENDPOINT_PATTERN};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default per-origin buffer capacity
pub const DEFAULT_CAPACITY: usize = 100;
/// Default persistence coalescing window in milliseconds
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;
/// Default name of the base64 field searched for in JSON bodies
pub const DEFAULT_TARGET_KEY: &str = "data";
/// Whole-body fallback only considers bodies longer than this
pub const DEFAULT_FALLBACK_MIN_LEN: usize = 20;
/// Key the snapshot blob is stored under
pub const DEFAULT_SNAPSHOT_KEY: &str = "capturedRequestsByTab";

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

fn default_target_key() -> String {
    DEFAULT_TARGET_KEY.to_string()
}

fn default_endpoint_patterns() -> Vec<String> {
    vec![DEFAULT_ENDPOINT_PATTERN.to_string()]
}

fn default_fallback_min_len() -> usize {
    DEFAULT_FALLBACK_MIN_LEN
}

fn default_true() -> bool {
    true
}

fn default_snapshot_key() -> String {
    DEFAULT_SNAPSHOT_KEY.to_string()
}

/// Which requests are worth keeping once normalized.
///
/// Applied identically to both producers.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RetentionPolicy {
    /// Keep when the endpoint matches or any field decoded
    #[default]
    EndpointOrDecoded,
    /// Keep only when at least one field decoded
    DecodedOnly,
}

impl RetentionPolicy {
    pub fn retains(self, is_target_endpoint: bool, decoded_count: usize) -> bool {
        match self {
            Self::EndpointOrDecoded => is_target_endpoint || decoded_count > 0,
            Self::DecodedOnly => decoded_count > 0,
        }
    }
}

/// Top-level capture configuration
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CaptureConfig {
    /// Maximum records kept per origin (default: 100)
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Persistence debounce window in milliseconds (default: 300)
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Field name searched for in JSON bodies (default: "data")
    #[serde(default = "default_target_key")]
    pub target_key: String,

    /// URL path fragments identifying the monitored endpoint
    #[serde(default = "default_endpoint_patterns")]
    pub endpoint_patterns: Vec<String>,

    /// Minimum length, exclusive, for decoding a whole non-JSON body
    #[serde(default = "default_fallback_min_len")]
    pub fallback_min_len: usize,

    #[serde(default)]
    pub retention: RetentionPolicy,

    /// Reading captured requests starts capture if it is stopped
    #[serde(default = "default_true")]
    pub auto_start_on_read: bool,

    /// Register the network observer as soon as the controller starts
    #[serde(default = "default_true")]
    pub start_on_launch: bool,

    /// Key the persisted snapshot is stored under
    #[serde(default = "default_snapshot_key")]
    pub snapshot_key: String,
}

impl CaptureConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn endpoint_matcher(&self) -> EndpointMatcher {
        EndpointMatcher::new(self.endpoint_patterns.iter().cloned())
    }

    /// Builder-style capacity override
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_retention(mut self, retention: RetentionPolicy) -> Self {
        self.retention = retention;
        self
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            target_key: default_target_key(),
            endpoint_patterns: default_endpoint_patterns(),
            fallback_min_len: DEFAULT_FALLBACK_MIN_LEN,
            retention: RetentionPolicy::default(),
            auto_start_on_read: true,
            start_on_launch: true,
            snapshot_key: default_snapshot_key(),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
