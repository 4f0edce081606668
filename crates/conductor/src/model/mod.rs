// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plain data entities shared across components.

pub mod agent;
pub mod health;
pub mod task;
pub mod usage_limit;

pub use agent::{ActivityInfo, ActivityType, AgentId, AgentStatus, AgentStatusValue, Roster};
pub use health::{OverallHealth, SessionPresence, SystemHealth};
pub use task::{ErrorHistoryEntry, Task, TaskStatus};
pub use usage_limit::UsageLimitState;

/// Current time as epoch milliseconds.
///
/// Every timestamp in the data model is a plain `u64`, not a `chrono`
/// type, so snapshots serialize identically to the wire events.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
