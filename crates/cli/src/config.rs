// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Capture config file loading.

use crate::cli::ConfigArgs;
use statlens_capture::CaptureConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur when loading a config file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Validation(String),
}

/// Parse content as JSON5, falling back to strict JSON on parse failure.
pub fn parse_json5_or_json<T: serde::de::DeserializeOwned>(
    content: &str,
) -> Result<T, serde_json::Error> {
    json5::from_str(content).or_else(|_| serde_json::from_str(content))
}

/// Load a config file; `.json` and `.json5` are JSON, anything else TOML.
pub fn load_config(path: &Path) -> Result<CaptureConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext == "json" || ext == "json5");
    let config = if is_json {
        parse_json5_or_json(&content)?
    } else {
        toml::from_str(&content)?
    };
    Ok(config)
}

/// Resolve the effective config: file (or defaults), then flag overrides.
pub fn resolve(args: &ConfigArgs) -> Result<CaptureConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => CaptureConfig::default(),
    };

    if let Some(capacity) = args.capacity {
        config.capacity = capacity;
    }
    if let Some(debounce_ms) = args.debounce_ms {
        config.debounce_ms = debounce_ms;
    }

    validate(&config)?;
    tracing::debug!(?config, "capture config resolved");
    Ok(config)
}

fn validate(config: &CaptureConfig) -> Result<(), ConfigError> {
    if config.capacity == 0 {
        return Err(ConfigError::Validation("capacity must be at least 1".into()));
    }
    if config.target_key.is_empty() {
        return Err(ConfigError::Validation("target_key must not be empty".into()));
    }
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
