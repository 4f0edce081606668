// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The usage-limit singleton row.

use serde::{Deserialize, Serialize};

use super::now_ms;

/// A small singleton-by-convention log: the most recently written row
/// wins. Persisted via the store facade.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageLimitState {
    pub is_limited: bool,
    pub paused_at: Option<u64>,
    pub next_retry_at: Option<u64>,
    pub retry_count: u32,
    pub last_error_message: Option<String>,
}

impl UsageLimitState {
    /// Builds the row written when a fresh limit condition is detected.
    pub fn triggered(next_retry_at: u64, error_message: impl Into<String>, prior_retry_count: u32) -> Self {
        Self {
            is_limited: true,
            paused_at: Some(now_ms()),
            next_retry_at: Some(next_retry_at),
            retry_count: prior_retry_count + 1,
            last_error_message: Some(error_message.into()),
        }
    }

    /// Whether `now` has passed the scheduled retry time.
    pub fn is_resolved_at(&self, now: u64) -> bool {
        match self.next_retry_at {
            Some(at) => now >= at,
            None => false,
        }
    }

    /// The cleared state, retaining the retry counter as history.
    pub fn cleared(&self) -> Self {
        Self {
            is_limited: false,
            paused_at: None,
            next_retry_at: None,
            retry_count: self.retry_count,
            last_error_message: self.last_error_message.clone(),
        }
    }
}

#[cfg(test)]
#[path = "usage_limit_tests.rs"]
mod tests;
