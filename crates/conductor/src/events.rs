// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event Bus: typed pub/sub fan-out to external subscribers.
//!
//! Ordering guarantees (spec.md §4.9): events for a given agent are
//! delivered in the order produced by the agent state cache; events for a
//! given task are delivered in the order produced by the dispatcher. There
//! is no cross-entity ordering guarantee, and subscribers may drop events
//! on disconnect — there is no replay.

use serde::{Deserialize, Serialize};

use crate::model::{ActivityInfo, AgentId, AgentStatus, SystemHealth, Task};

const BROADCAST_CAPACITY: usize = 512;

/// Every event the core can emit, tagged so clients can match on `type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Event {
    TaskQueued { task: Task },
    TaskAssigned { task: Task },
    TaskCompleted { task: Task, detected_by: Option<AgentId>, excerpt: Option<String>, elapsed_minutes: Option<u64> },
    TaskCancelled { task: Task },
    TaskFailed { task: Task, reason: String },
    TaskRetried { task: Task },
    TaskDeleted { task_id: String },
    TaskQueueUpdated,
    UsageLimitReached { next_retry_at: Option<u64>, message: Option<String> },
    UsageLimitCleared,
    UsageLimitResolved,
    PausedTasksResumed { task_ids: Vec<String> },
    SystemHealth { health: SystemHealth },
    AutoRecoveryPerformed { recovered: Vec<AgentId> },
    AutoRecoveryStatus { message: String },
    AutoRecoveryFailed { reason: String },
    AgentStatusUpdated { status: AgentStatus },
    AgentActivityDetected { agent: AgentId, activity: ActivityInfo },
    AgentDetailedStatus { agent: AgentId, history: Vec<ActivityInfo> },
    EmergencyStopCompleted,
    SessionResetCompleted,
    ProjectCompletionCleanup { project_name: String },
}

/// Broadcast hub. Cloning the sender is cheap; every component that
/// produces events holds one.
#[derive(Clone)]
pub struct EventBus {
    tx: tokio::sync::broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = tokio::sync::broadcast::channel(BROADCAST_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Publishes an event. Subscribers that have lagged or disconnected
    /// simply miss it — there is no replay buffer.
    pub fn publish(&self, event: Event) {
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
