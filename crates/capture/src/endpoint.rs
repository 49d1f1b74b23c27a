// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Classification of request URLs against the monitored endpoint set.

use url::Url;

/// Path fragment of the tracking-statistics endpoint.
pub const DEFAULT_ENDPOINT_PATTERN: &str = "/api/statistics/v2/track";

/// Substring matcher over URL paths.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndpointMatcher {
    patterns: Vec<String>,
}

impl EndpointMatcher {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(Into::into)
                .filter(|p: &String| !p.is_empty())
                .collect(),
        }
    }

    /// True if `path` contains any configured fragment.
    pub fn is_target_endpoint(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| path.contains(p.as_str()))
    }

    /// Classify a full or page-relative URL.
    ///
    /// Absolute URLs are matched on their path only, so a fragment appearing
    /// in the query string does not count. Relative URLs (as seen by in-page
    /// hooks) are matched as given.
    pub fn matches_url(&self, url: &str) -> bool {
        match Url::parse(url) {
            Ok(parsed) => self.is_target_endpoint(parsed.path()),
            Err(_) => self.is_target_endpoint(url),
        }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

impl Default for EndpointMatcher {
    fn default() -> Self {
        Self::new([DEFAULT_ENDPOINT_PATTERN])
    }
}

#[cfg(test)]
#[path = "endpoint_tests.rs"]
mod tests;
