// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal Monitor: per-agent diff of captured pane output, fed into the
//! activity classifier.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tokio::sync::Mutex;

use crate::classifier::Classifier;
use crate::model::{ActivityInfo, AgentId};
use crate::pane::PaneAdapter;

/// Consecutive capture failures, across the whole monitor loop, before the
/// health supervisor is expected to back off into degraded mode.
pub const FAILURE_STREAK_DEGRADED_THRESHOLD: u32 = 5;

/// Per-agent bookkeeping the monitor keeps between passes.
#[derive(Debug, Clone, Default)]
struct AgentCaptureState {
    last_capture: String,
    last_timestamp: u64,
    failure_streak: u32,
}

/// Result of one agent's capture-and-classify pass.
#[derive(Debug, Clone)]
pub struct MonitorResult {
    pub agent: AgentId,
    pub has_new_activity: bool,
    pub activity_info: Option<ActivityInfo>,
    pub is_idle: bool,
    pub last_output: String,
    pub timestamp: u64,
    pub usage_limit_text: Option<String>,
}

/// Fixed, seeded phrase set the usage-limit coordinator is notified about.
/// Open question in spec.md §9: kept extensible so operators can append
/// provider-specific phrasing without a code change.
fn usage_limit_phrases() -> &'static [&'static str] {
    &[
        "usage limit reached",
        "you've hit your usage limit",
        "rate limit exceeded",
        "please try again later",
        "quota exceeded",
    ]
}

fn detect_usage_limit(text: &str) -> Option<String> {
    let lowered = text.to_lowercase();
    usage_limit_phrases().iter().find(|phrase| lowered.contains(*phrase)).map(|p| (*p).to_string())
}

pub struct TerminalMonitor {
    pane: Arc<dyn PaneAdapter>,
    classifier: Arc<Mutex<Classifier>>,
    state: Mutex<HashMap<AgentId, AgentCaptureState>>,
    capture_lines: u32,
    capture_timeout: Duration,
}

impl TerminalMonitor {
    pub fn new(pane: Arc<dyn PaneAdapter>, classifier: Arc<Mutex<Classifier>>, capture_lines: u32, capture_timeout: Duration) -> Self {
        Self { pane, classifier, state: Mutex::new(HashMap::new()), capture_lines, capture_timeout }
    }

    /// One pass of `monitorAllAgents()`: captures every agent's pane in
    /// parallel, diffs against the last capture, and classifies the new
    /// suffix.
    pub async fn monitor_all(&self, targets: &[(AgentId, String)]) -> Vec<MonitorResult> {
        let futures = targets.iter().map(|(agent, target)| self.monitor_one(agent.clone(), target.clone()));
        join_all(futures).await
    }

    async fn monitor_one(&self, agent: AgentId, target: String) -> MonitorResult {
        let capture = tokio::time::timeout(self.capture_timeout, self.pane.capture(&target, self.capture_lines)).await;

        let mut guard = self.state.lock().await;
        let entry = guard.entry(agent.clone()).or_default();

        let captured = match capture {
            Ok(Ok(text)) => {
                entry.failure_streak = 0;
                text
            }
            _ => {
                entry.failure_streak += 1;
                return MonitorResult {
                    agent,
                    has_new_activity: false,
                    activity_info: None,
                    is_idle: true,
                    last_output: entry.last_capture.clone(),
                    timestamp: crate::model::now_ms(),
                    usage_limit_text: None,
                };
            }
        };

        let new_suffix = diff_suffix(&entry.last_capture, &captured);
        entry.last_capture = captured.clone();
        entry.last_timestamp = crate::model::now_ms();

        if new_suffix.trim().is_empty() {
            return MonitorResult {
                agent,
                has_new_activity: false,
                activity_info: None,
                is_idle: true,
                last_output: captured,
                timestamp: entry.last_timestamp,
                usage_limit_text: None,
            };
        }

        let cleaned = Classifier::clean(&new_suffix);
        let usage_limit_text = detect_usage_limit(&cleaned);
        let (activity, _confidence) = {
            let mut classifier = self.classifier.lock().await;
            classifier.classify(&cleaned)
        };
        let is_idle = activity.activity_type == crate::model::ActivityType::Idle;

        MonitorResult {
            agent,
            has_new_activity: true,
            activity_info: Some(activity),
            is_idle,
            last_output: captured,
            timestamp: entry.last_timestamp,
            usage_limit_text,
        }
    }

    pub async fn failure_streak_total(&self) -> u32 {
        self.state.lock().await.values().map(|s| s.failure_streak).sum()
    }
}

/// The new suffix of `current` relative to `previous`, at line
/// granularity: lines shared as a common prefix are dropped.
fn diff_suffix(previous: &str, current: &str) -> String {
    if previous.is_empty() {
        return current.to_string();
    }
    let prev_lines: Vec<&str> = previous.lines().collect();
    let curr_lines: Vec<&str> = current.lines().collect();

    let common = prev_lines.iter().zip(curr_lines.iter()).take_while(|(a, b)| a == b).count();

    curr_lines[common.min(curr_lines.len())..].join("\n")
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
