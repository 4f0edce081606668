// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The system-health snapshot produced once per health-supervisor tick.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::now_ms;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallHealth {
    Healthy,
    Degraded,
    Critical,
}

/// Session presence, as reported by `listSessions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionPresence {
    pub president: bool,
    pub multiagent: bool,
}

/// One atomic snapshot of whole-system health. Produced exactly once per
/// health-supervisor tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemHealth {
    pub sessions: SessionPresence,
    pub agents: BTreeMap<String, bool>,
    pub overall_health: OverallHealth,
    pub timestamp: u64,
}

impl SystemHealth {
    /// Computes `overallHealth` from session presence and the count of
    /// online agents, per spec.md §4.5.
    pub fn assess(sessions: SessionPresence, agents: BTreeMap<String, bool>) -> Self {
        let online = agents.values().filter(|up| **up).count();
        let total = agents.len();
        let sessions_up = sessions.president && sessions.multiagent;

        let overall_health = if sessions_up && online == total {
            OverallHealth::Healthy
        } else if sessions_up && online >= 3 {
            OverallHealth::Degraded
        } else {
            OverallHealth::Critical
        };

        Self { sessions, agents, overall_health, timestamp: now_ms() }
    }

    /// Whether auto-recovery's trigger gate is satisfied: critical AND
    /// (a session is missing OR at most one agent is online).
    pub fn needs_auto_recovery(&self) -> bool {
        let online = self.agents.values().filter(|up| **up).count();
        let sessions_missing = !self.sessions.president || !self.sessions.multiagent;
        self.overall_health == OverallHealth::Critical && (sessions_missing || online <= 1)
    }
}

#[cfg(test)]
#[path = "health_tests.rs"]
mod tests;
