// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Canonicalization of request bodies and extraction of decoded fields.

use crate::codec::{decode_field, find_named_base64_fields, is_base64_like};
use crate::config::CaptureConfig;
use crate::record::DecodedField;
use serde::{Deserialize, Serialize};
use indexmap::IndexMap;
use serde_json::Value;

/// Field name used when the whole body is a base64 string.
pub const WHOLE_BODY_FIELD: &str = "request_body";

/// Form fields in submission order, each key with every value sent under it.
pub type FormFields = IndexMap<String, Vec<String>>;

/// The shapes a captured request body can take.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum RequestBody {
    /// Raw byte buffer as seen by the network observer
    Raw(Vec<u8>),
    /// Form fields in submission order
    Form(FormFields),
    /// Plain string body, as handed to an in-page hook
    Text(String),
}

/// Normalizer output: the canonical body string and what was decoded from it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NormalizedBody {
    pub canonical: Option<String>,
    pub fields: Vec<DecodedField>,
}

/// Turns body representations into a [`NormalizedBody`].
#[derive(Clone, Debug)]
pub struct RequestNormalizer {
    target_key: String,
    fallback_min_len: usize,
}

impl RequestNormalizer {
    pub fn new(target_key: impl Into<String>, fallback_min_len: usize) -> Self {
        Self {
            target_key: target_key.into(),
            fallback_min_len,
        }
    }

    pub fn from_config(config: &CaptureConfig) -> Self {
        Self::new(config.target_key.clone(), config.fallback_min_len)
    }

    pub fn normalize(&self, body: &RequestBody) -> NormalizedBody {
        match body {
            RequestBody::Raw(bytes) => {
                let text = String::from_utf8_lossy(bytes);
                self.normalize_text(&text)
            }
            RequestBody::Form(fields) => self.normalize_form(fields),
            RequestBody::Text(text) => self.normalize_text(text),
        }
    }

    /// JSON bodies are searched for the target key; anything else is tried
    /// as a single base64 blob.
    fn normalize_text(&self, text: &str) -> NormalizedBody {
        let fields = match serde_json::from_str::<Value>(text) {
            Ok(value) => find_named_base64_fields(&value, &self.target_key, ""),
            Err(_) if self.is_whole_body_candidate(text) => {
                decode_field(WHOLE_BODY_FIELD, text).into_iter().collect()
            }
            Err(_) => Vec::new(),
        };

        NormalizedBody {
            canonical: Some(text.to_string()),
            fields,
        }
    }

    fn normalize_form(&self, form: &FormFields) -> NormalizedBody {
        let canonical = match serde_json::to_string(form) {
            Ok(json) => Some(json),
            Err(error) => {
                tracing::warn!(%error, "failed to serialize form body");
                None
            }
        };

        let fields = form
            .iter()
            .flat_map(|(key, values)| values.iter().map(move |value| (key, value)))
            .filter(|(_, value)| is_base64_like(value))
            .filter_map(|(key, value)| decode_field(key, value))
            .collect();

        NormalizedBody { canonical, fields }
    }

    fn is_whole_body_candidate(&self, text: &str) -> bool {
        text.len() > self.fallback_min_len && is_base64_like(text)
    }
}

impl Default for RequestNormalizer {
    fn default() -> Self {
        Self::from_config(&CaptureConfig::default())
    }
}

#[cfg(test)]
#[path = "normalizer_tests.rs"]
mod tests;
