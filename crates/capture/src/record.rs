// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Captured request data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of the browsing context (tab) a request belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OriginId(pub u32);

impl OriginId {
    /// Build an origin from a host tab id; negative ids mean "no tab".
    pub fn from_tab_id(tab_id: i64) -> Option<Self> {
        u32::try_from(tab_id).ok().map(Self)
    }
}

impl fmt::Display for OriginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OriginId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// Which producer captured a request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureSource {
    /// Privileged network observer.
    #[default]
    Observer,
    /// In-page XHR/fetch hook.
    #[serde(alias = "content_script")]
    PageScript,
}

/// Result of decoding a base64 field: parsed JSON, or the text itself when
/// the decoded bytes were not JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DecodedValue {
    Text(String),
    Json(serde_json::Value),
}

impl DecodedValue {
    /// The decoded value as JSON, wrapping text in a JSON string.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Text(text) => serde_json::Value::String(text.clone()),
            Self::Json(value) => value.clone(),
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }
}

/// A base64 field found in a request body and decoded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecodedField {
    /// Dotted path to the field within the parsed body, e.g. `payload.data`
    #[serde(alias = "field")]
    pub path: String,

    /// The base64 text as found in the body
    pub original: String,

    pub decoded: DecodedValue,
}

/// A request retained by the capture pipeline. Immutable once created.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedRequest {
    pub id: String,

    pub timestamp: DateTime<Utc>,

    pub url: String,

    pub method: String,

    /// Canonical string form of the body
    #[serde(alias = "requestData")]
    pub raw_body: Option<String>,

    #[serde(alias = "decodedData", default)]
    pub decoded_fields: Vec<DecodedField>,

    #[serde(alias = "isTargetAPI", default)]
    pub is_target_endpoint: bool,

    pub origin: OriginId,

    #[serde(default)]
    pub source: CaptureSource,
}

/// A decoded request that has not yet been routed to an origin.
///
/// The in-page producer cannot know its own tab, so it hands one of these
/// across the message boundary and the receiver attaches the sender's origin.
///
/// Page scripts may send a numeric id or none at all; a missing id is
/// assigned when the request is bound to its origin.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingRequest {
    #[serde(
        default,
        deserialize_with = "id_from_wire",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub url: String,
    pub method: String,
    #[serde(alias = "requestData")]
    pub raw_body: Option<String>,
    #[serde(alias = "decodedData", default)]
    pub decoded_fields: Vec<DecodedField>,
    #[serde(alias = "isTargetAPI", default)]
    pub is_target_endpoint: bool,
    #[serde(default)]
    pub source: CaptureSource,
}

impl PendingRequest {
    /// Bind this request to the origin that produced it, calling
    /// `assign_id` only when the request arrived without an id.
    pub fn into_captured(
        self,
        origin: OriginId,
        assign_id: impl FnOnce() -> String,
    ) -> CapturedRequest {
        CapturedRequest {
            id: self.id.unwrap_or_else(assign_id),
            timestamp: self.timestamp,
            url: self.url,
            method: self.method,
            raw_body: self.raw_body,
            decoded_fields: self.decoded_fields,
            is_target_endpoint: self.is_target_endpoint,
            origin,
            source: self.source,
        }
    }
}

fn id_from_wire<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum WireId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(Option::<WireId>::deserialize(deserializer)?.map(|id| match id {
        WireId::Text(text) => text,
        WireId::Number(number) => number.to_string(),
    }))
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
