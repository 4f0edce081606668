// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory agent state: identity, status, and recent activity.
//!
//! Owned exclusively by the agent state cache; every other component
//! only ever sees cloned snapshots.

use std::collections::VecDeque;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::now_ms;

/// Bound on the per-agent activity ring kept for "detailed status" broadcasts.
const ACTIVITY_RING_CAPACITY: usize = 10;

/// Stable identifier for a roster member. The privileged agent is always
/// named `"president"`; the rest are worker agents addressed by pane index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn president() -> Self {
        Self("president".to_string())
    }

    pub fn is_president(&self) -> bool {
        self.0 == "president"
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Coarse liveness/activity state of one agent.
///
/// `Unreachable` is distinct from `Offline`: it marks an agent whose pane
/// exists but has stopped acknowledging `send` within the capture timeout
/// across repeated attempts, whereas `Offline` means no session/pane was
/// found at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatusValue {
    Idle,
    Working,
    Offline,
    Error,
    Unreachable,
}

impl AgentStatusValue {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Working => "working",
            Self::Offline => "offline",
            Self::Error => "error",
            Self::Unreachable => "unreachable",
        }
    }

    pub fn is_online(&self) -> bool {
        matches!(self, Self::Idle | Self::Working | Self::Error)
    }
}

/// Kind of activity extracted from an agent's terminal output by the
/// classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Coding,
    FileOperation,
    CommandExecution,
    Thinking,
    Idle,
}

/// A single classified slice of terminal output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityInfo {
    pub activity_type: ActivityType,
    pub description: String,
    pub timestamp: u64,
    pub file_name: Option<String>,
    pub command: Option<String>,
}

/// Current observed state of one agent. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentStatus {
    pub id: AgentId,
    pub name: String,
    pub status: AgentStatusValue,
    pub current_activity: Option<String>,
    pub working_on_file: Option<String>,
    pub executing_command: Option<String>,
    pub last_activity: u64,
    pub terminal_output: Option<String>,

    /// Set when an operator has issued an emergency stop against this
    /// agent; auto-recovery will not restart it until explicitly cleared.
    pub emergency_stopped: bool,

    #[serde(skip)]
    activity_ring: VecDeque<ActivityInfo>,
}

impl AgentStatus {
    pub fn new(id: AgentId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            status: AgentStatusValue::Offline,
            current_activity: None,
            working_on_file: None,
            executing_command: None,
            last_activity: now_ms(),
            terminal_output: None,
            emergency_stopped: false,
            activity_ring: VecDeque::with_capacity(ACTIVITY_RING_CAPACITY),
        }
    }

    /// A fresh idle snapshot, with no current activity — what the cleanup
    /// protocols (cancel, emergency stop, session reset) push through the
    /// cache to clear an agent's working state.
    pub fn idle(id: AgentId, name: impl Into<String>) -> Self {
        let mut status = Self::new(id, name);
        status.status = AgentStatusValue::Idle;
        status
    }

    /// Whether `next` differs from `self` in any field the change filter
    /// watches (spec.md §4.4: status, currentActivity, workingOnFile,
    /// executingCommand).
    pub fn differs_materially(&self, next: &AgentStatus) -> bool {
        self.status != next.status
            || self.current_activity != next.current_activity
            || self.working_on_file != next.working_on_file
            || self.executing_command != next.executing_command
    }

    /// Pushes a new activity snapshot onto the bounded ring, evicting the
    /// oldest entry once at capacity.
    pub fn push_activity(&mut self, info: ActivityInfo) {
        if self.activity_ring.len() == ACTIVITY_RING_CAPACITY {
            self.activity_ring.pop_front();
        }
        self.activity_ring.push_back(info);
    }

    /// Most recent activity entries, newest last.
    pub fn recent_activity(&self) -> impl Iterator<Item = &ActivityInfo> {
        self.activity_ring.iter()
    }
}

/// The fixed roster of agents, keyed by [`AgentId`] in insertion order so
/// iteration (and therefore health-check and broadcast ordering) is
/// deterministic.
#[derive(Debug, Clone, Default)]
pub struct Roster(IndexMap<AgentId, AgentStatus>);

impl Roster {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Builds the standard five-agent roster: `president` plus four
    /// `multiagent:0.N` workers.
    pub fn standard() -> Self {
        let mut roster = Self::new();
        roster.insert(AgentStatus::new(AgentId::president(), "president"));
        for i in 0..4 {
            let id = AgentId(format!("multiagent-{i}"));
            let name = format!("agent-{i}");
            roster.insert(AgentStatus::new(id, name));
        }
        roster
    }

    pub fn insert(&mut self, status: AgentStatus) {
        self.0.insert(status.id.clone(), status);
    }

    pub fn get(&self, id: &AgentId) -> Option<&AgentStatus> {
        self.0.get(id)
    }

    pub fn get_mut(&mut self, id: &AgentId) -> Option<&mut AgentStatus> {
        self.0.get_mut(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AgentId, &AgentStatus)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn online_count(&self) -> usize {
        self.0.values().filter(|s| s.status.is_online()).count()
    }

    pub fn any_working(&self) -> bool {
        self.0.values().any(|s| s.status == AgentStatusValue::Working)
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
