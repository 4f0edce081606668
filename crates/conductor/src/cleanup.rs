// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cleanup protocols (spec.md §4.10): the pane/task side-effects bracketing
//! a project's lifecycle and the two "reset the world" operator actions.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;

use crate::agent_cache::AgentCache;
use crate::error::Rejection;
use crate::events::{Event, EventBus};
use crate::model::{AgentId, AgentStatus, TaskStatus};
use crate::pane::{Key, PaneAdapter};
use crate::store::Store;

/// Settle time after the parallel project-start `/clear` fan-out.
const PROJECT_START_SETTLE: Duration = Duration::from_secs(1);
/// Per-pane settle time during the serial project-completion fan-out.
const PROJECT_COMPLETION_SETTLE: Duration = Duration::from_secs(2);
/// Size a session is recreated at during a session reset.
const RESET_COLS: u16 = 220;
const RESET_ROWS: u16 = 50;

pub struct CleanupCoordinator {
    pane: Arc<dyn PaneAdapter>,
    store: Arc<dyn Store>,
    agent_cache: Arc<AgentCache>,
    events: EventBus,
}

impl CleanupCoordinator {
    pub fn new(pane: Arc<dyn PaneAdapter>, store: Arc<dyn Store>, agent_cache: Arc<AgentCache>, events: EventBus) -> Self {
        Self { pane, store, agent_cache, events }
    }

    /// Project start: `Escape` → `/clear` → `Enter` to every pane in
    /// parallel, then one aggregate settle.
    pub async fn project_start(&self, targets: &[String]) {
        join_all(targets.iter().map(|target| self.clear_pane(target))).await;
        tokio::time::sleep(PROJECT_START_SETTLE).await;
    }

    /// Task completion is lightweight by design: no terminal operations.
    /// Kept as an explicit no-op so the cleanup protocol list in
    /// spec.md §4.10 has a one-to-one method here.
    pub fn task_completion(&self) {}

    /// Project completion: the same `/clear` fan-out as project start, but
    /// serial with a settle per pane, followed by a best-effort `tmp/`
    /// wipe.
    pub async fn project_completion(&self, targets: &[String], project_name: impl Into<String>) {
        for target in targets {
            let _ = self.clear_pane(target).await;
            tokio::time::sleep(PROJECT_COMPLETION_SETTLE).await;
        }
        remove_tmp_contents().await;
        self.events.publish(Event::ProjectCompletionCleanup { project_name: project_name.into() });
    }

    /// Emergency stop: Ctrl+C to every pane, every `in_progress` task
    /// reverts to `pending` with its assignee preserved as history, and
    /// every agent's cache entry clears to idle with `emergency_stopped`
    /// set so auto-recovery won't restart it.
    pub async fn emergency_stop(&self, agents: &[(AgentId, String)]) -> Result<(), Rejection> {
        join_all(agents.iter().map(|(_, target)| self.pane.send(target, &[Key::CtrlC]))).await;

        for task in self.store.get_tasks_by_status(TaskStatus::InProgress).await? {
            let mut task = task;
            task.revert_to_pending(false)?;
            self.store.update_task(task).await?;
        }

        for (id, name) in agents {
            let mut status = AgentStatus::idle(id.clone(), name.clone());
            status.emergency_stopped = true;
            self.agent_cache.update(status).await;
        }

        self.events.publish(Event::EmergencyStopCompleted);
        Ok(())
    }

    /// Session reset: tears down and reinitializes the multiplexer
    /// session set, wipes `tmp/`, clears the agent cache, and reverts
    /// every `in_progress` task to `pending` with `assignedTo` cleared —
    /// the roster itself is being rebuilt, so there is no agent left to
    /// preserve the assignment against.
    pub async fn session_reset(&self, targets: &[String], agents: &[(AgentId, String)]) -> Result<(), Rejection> {
        remove_tmp_contents().await;

        for target in targets {
            let _ = self.pane.kill_session(target).await;
            let _ = self.pane.spawn_session(target, RESET_COLS, RESET_ROWS).await;
        }

        for task in self.store.get_tasks_by_status(TaskStatus::InProgress).await? {
            let mut task = task;
            task.revert_to_pending(true)?;
            self.store.update_task(task).await?;
        }

        for (id, name) in agents {
            self.agent_cache.update(AgentStatus::idle(id.clone(), name.clone())).await;
        }

        self.events.publish(Event::SessionResetCompleted);
        Ok(())
    }

    async fn clear_pane(&self, target: &str) -> Result<(), crate::pane::PaneError> {
        self.pane.send(target, &[Key::Escape, Key::Literal("/clear".to_string()), Key::Enter]).await
    }
}

/// Best-effort recursive wipe of `./tmp`'s contents. Missing directory is
/// not an error; individual entry failures are swallowed the same way.
async fn remove_tmp_contents() {
    let Ok(mut entries) = tokio::fs::read_dir("./tmp").await else {
        return;
    };
    while let Ok(Some(entry)) = entries.next_entry().await {
        let path = entry.path();
        if path.is_dir() {
            let _ = tokio::fs::remove_dir_all(&path).await;
        } else {
            let _ = tokio::fs::remove_file(&path).await;
        }
    }
}

#[cfg(test)]
#[path = "cleanup_tests.rs"]
mod tests;
