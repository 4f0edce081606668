// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Completion Detector: scans per-agent output for task-completion phrases.

use regex::Regex;

use crate::model::now_ms;

macro_rules! re {
    ($pat:expr) => {
        Regex::new($pat).unwrap_or_else(|e| unreachable!("built-in completion pattern {:?} failed to compile: {e}", $pat))
    };
}

/// A detected completion, ready to be applied by the dispatcher.
#[derive(Debug, Clone)]
pub struct CompletionSignal {
    pub excerpt: String,
    pub elapsed_minutes: u64,
}

pub struct CompletionDetector {
    president_strict: Vec<Regex>,
    exclude: Vec<Regex>,
    general: Vec<Regex>,
    minimum_in_progress: std::time::Duration,
}

impl CompletionDetector {
    pub fn new(minimum_in_progress: std::time::Duration) -> Self {
        Self {
            president_strict: vec![
                re!(r"(?i)\btask (?:is )?(?:now )?complete\b"),
                re!(r"(?i)\bi have (?:successfully )?completed the task\b"),
                re!(r"(?i)\ball (?:deliverables|requirements) (?:have been|are) (?:met|delivered)\b"),
            ],
            exclude: vec![
                re!(r"(?i)\bnot yet completed?\b"),
                re!(r"(?i)\bplanning to complete\b"),
                re!(r"(?i)\bwill complete\b"),
                re!(r"(?i)\bis (?:this|it) complete\?"),
                re!(r"(?i)\bhave (?:you|we) completed\?"),
            ],
            general: vec![
                re!(r"(?i)\b(?:task )?(?:completed|done|finished)\b"),
                re!(r"(?i)\beverything (?:is|looks) (?:done|working)\b"),
            ],
            minimum_in_progress,
        }
    }

    /// First pass (spec.md §4.6 step 2): strict, president-only patterns.
    pub fn check_president(&self, output: &str, in_progress_since: u64) -> Option<CompletionSignal> {
        let elapsed = self.elapsed_minutes(in_progress_since);
        if elapsed < self.minimum_in_progress.as_secs() / 60 {
            return None;
        }
        self.president_strict
            .iter()
            .find_map(|re| re.find(output))
            .map(|m| CompletionSignal { excerpt: excerpt_around(output, m.start(), m.end()), elapsed_minutes: elapsed })
    }

    /// Second pass (spec.md §4.6 step 3): any non-president agent, with
    /// exclude-pattern negation applied first.
    pub fn check_worker(&self, new_output: &str, in_progress_since: u64) -> Option<CompletionSignal> {
        let elapsed = self.elapsed_minutes(in_progress_since);
        if elapsed < self.minimum_in_progress.as_secs() / 60 {
            return None;
        }
        if self.exclude.iter().any(|re| re.is_match(new_output)) {
            return None;
        }
        self.general
            .iter()
            .find_map(|re| re.find(new_output))
            .map(|m| CompletionSignal { excerpt: excerpt_around(new_output, m.start(), m.end()), elapsed_minutes: elapsed })
    }

    fn elapsed_minutes(&self, since: u64) -> u64 {
        now_ms().saturating_sub(since) / 1000 / 60
    }
}

/// A short excerpt around a match, for the completion event payload.
fn excerpt_around(text: &str, start: usize, end: usize) -> String {
    const PAD: usize = 40;
    let lo = start.saturating_sub(PAD);
    let hi = (end + PAD).min(text.len());
    text.get(lo..hi).unwrap_or(text).trim().to_string()
}

#[cfg(test)]
#[path = "completion_tests.rs"]
mod tests;
