// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `statlens decode`: run one body through the normalizer.

use crate::cli::DecodeArgs;
use crate::config::{self, ConfigError};
use serde::Serialize;
use statlens_capture::{CaptureConfig, DecodedField, FormFields, RequestBody, RequestNormalizer};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeCommandError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to read body from '{path}': {source}")]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read body from stdin: {0}")]
    Stdin(#[source] io::Error),

    #[error("Failed to write output: {0}")]
    Output(#[from] io::Error),
}

/// What `decode` prints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodeReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_target_endpoint: Option<bool>,
    pub body: Option<String>,
    pub fields: Vec<DecodedField>,
}

pub fn run<W: Write>(args: &DecodeArgs, out: &mut W) -> Result<(), DecodeCommandError> {
    let config = config::resolve(&args.config)?;
    let body = read_body(args)?;
    let report = decode_body(&config, &body, args.form, args.url.as_deref());

    serde_json::to_writer_pretty(&mut *out, &report).map_err(io::Error::other)?;
    writeln!(out)?;
    Ok(())
}

/// Normalize `body` the way a captured request body would be.
pub fn decode_body(
    config: &CaptureConfig,
    body: &str,
    form: bool,
    url: Option<&str>,
) -> DecodeReport {
    let body = if form {
        RequestBody::Form(parse_form(body))
    } else {
        RequestBody::Text(body.to_string())
    };
    let normalized = RequestNormalizer::from_config(config).normalize(&body);

    DecodeReport {
        is_target_endpoint: url.map(|url| config.endpoint_matcher().matches_url(url)),
        body: normalized.canonical,
        fields: normalized.fields,
    }
}

/// Parse an `application/x-www-form-urlencoded` body, keeping repeated keys.
pub fn parse_form(body: &str) -> FormFields {
    let mut form = FormFields::new();
    for (key, value) in url::form_urlencoded::parse(body.trim().as_bytes()) {
        form.entry(key.into_owned())
            .or_default()
            .push(value.into_owned());
    }
    form
}

fn read_body(args: &DecodeArgs) -> Result<String, DecodeCommandError> {
    if let Some(body) = &args.body {
        return Ok(body.clone());
    }
    if let Some(path) = &args.file {
        return std::fs::read_to_string(path).map_err(|source| DecodeCommandError::File {
            path: path.clone(),
            source,
        });
    }

    let mut body = String::new();
    io::stdin()
        .read_to_string(&mut body)
        .map_err(DecodeCommandError::Stdin)?;
    // A trailing newline from a pipe is not part of the payload.
    Ok(body.trim_end_matches(['\r', '\n']).to_string())
}

#[cfg(test)]
#[path = "decode_tests.rs"]
mod tests;
