// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket message types for the conductor real-time protocol
//! (spec.md §6's Client RPC list).

use serde::{Deserialize, Serialize};

use crate::app::{AgentMonitoringStats, KpiMetrics};
use crate::model::Task;
use crate::store::TaskCounts;
use crate::transport::ErrorBody;

/// Client-to-server requests, internally tagged on `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    RequestTask { title: String, description: String },
    DeleteTask { id: String },
    CancelTask { id: String },
    RetryTask { id: String },
    RestartTaskAsNew { id: String },
    MarkTaskCompleted { id: String },
    MarkTaskFailed { id: String, reason: String },
    ResumePausedTasks {},
    EmergencyStop {},
    SessionReset {},
    ManualRecoveryRequest {},
    ToggleTaskCompletionMonitoring { enabled: bool },
    ToggleAgentActivityMonitoring { enabled: bool },
    GetAgentMonitoringStats {},
    UpdateMonitoringConfig {},
    ResetMonitoringStats {},
}

/// Server-to-client replies and push notifications, internally tagged.
/// Push notifications for [`crate::events::Event`] are forwarded as the
/// event's own tagged JSON rather than wrapped here — the client matches
/// on whichever `type` value is present.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    TaskResult { task: Task },
    TaskList { tasks: Vec<Task>, counts: TaskCounts },
    AgentMonitoringStats { stats: AgentMonitoringStats },
    KpiMetrics { metrics: KpiMetrics },
    Ack {},
    Error { error: ErrorBody },
}
