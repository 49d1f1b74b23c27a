// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Base64 payload detection and decoding.
//!
//! Pure functions only. Detection is a loose shape check: an alphanumeric
//! string of the right length passes even if it was never base64, and only
//! decoding filters it out.

use crate::error::DecodeError;
use crate::record::{DecodedField, DecodedValue};
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, PAD};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use serde_json::Value;

/// Maximum number of trailing `=` characters accepted.
const MAX_PADDING: usize = 2;

/// Standard alphabet, tolerant of non-zero trailing bits the way browser
/// `atob` is.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    PAD.with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Returns true if `s` looks like standard base64.
///
/// Requires at least four characters, a length that is a multiple of four,
/// and only `A-Z a-z 0-9 + /` followed by at most two `=`.
pub fn is_base64_like(s: &str) -> bool {
    if s.len() < 4 || s.len() % 4 != 0 {
        return false;
    }

    let body = s.trim_end_matches('=');
    if s.len() - body.len() > MAX_PADDING {
        return false;
    }

    body.bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/')
}

/// Decode standard base64 and interpret the bytes as UTF-8 text.
pub fn decode_base64_utf8(s: &str) -> Result<String, DecodeError> {
    let bytes = LENIENT.decode(s)?;
    Ok(String::from_utf8(bytes)?)
}

/// Parse `s` as JSON, falling back to the original text.
pub fn try_parse_json(s: &str) -> DecodedValue {
    match serde_json::from_str::<Value>(s) {
        Ok(value) => DecodedValue::Json(value),
        Err(_) => DecodedValue::Text(s.to_string()),
    }
}

/// Decode a single candidate into a [`DecodedField`] recorded at `path`.
///
/// Failures are logged and yield `None` so callers can skip the field and
/// keep going.
pub fn decode_field(path: &str, original: &str) -> Option<DecodedField> {
    match decode_base64_utf8(original) {
        Ok(text) => Some(DecodedField {
            path: path.to_string(),
            original: original.to_string(),
            decoded: try_parse_json(&text),
        }),
        Err(error) => {
            tracing::warn!(path, %error, "base64 decode failed");
            None
        }
    }
}

/// Walk `value` and decode every string found under `target_key`.
///
/// Objects are descended into; arrays are not. Paths are dotted, rooted at
/// `path_prefix` (empty for the top level). A key matching `target_key`
/// whose value is not a base64-like string is treated like any other key,
/// so an object stored under it is still searched.
pub fn find_named_base64_fields(
    value: &Value,
    target_key: &str,
    path_prefix: &str,
) -> Vec<DecodedField> {
    let mut results = Vec::new();
    collect_named_fields(value, target_key, path_prefix, &mut results);
    results
}

fn collect_named_fields(
    value: &Value,
    target_key: &str,
    path_prefix: &str,
    results: &mut Vec<DecodedField>,
) {
    let Value::Object(map) = value else {
        return;
    };

    for (key, child) in map {
        let path = join_path(path_prefix, key);
        match child {
            Value::String(s) if key == target_key && is_base64_like(s) => {
                results.extend(decode_field(&path, s));
            }
            Value::Object(_) => collect_named_fields(child, target_key, &path, results),
            _ => {}
        }
    }
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
