// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Toolbar badge derived from an origin's buffer length.

use serde::{Deserialize, Serialize};

/// Background color shown behind a non-empty badge.
pub const BADGE_COLOR: &str = "#1a73e8";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    /// Empty when the count is zero
    pub text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Badge {
    pub fn for_count(count: usize) -> Self {
        if count == 0 {
            return Self::default();
        }
        Self {
            text: count.to_string(),
            color: Some(BADGE_COLOR.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}
