// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The task entity and its lifecycle invariants.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::now_ms;
use crate::error::Rejection;

/// Lifecycle states from spec.md §3. Transitions are validated by
/// [`Task::transition_to`]; nothing outside this module mutates `status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Paused,
    Completed,
    Failed,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether `self -> next` is a legal transition per spec.md §3.
    fn can_transition_to(&self, next: TaskStatus) -> bool {
        use TaskStatus::*;
        matches!(
            (self, next),
            (Pending, InProgress)
                | (InProgress, Completed)
                | (InProgress, Failed)
                | (InProgress, Paused)
                | (InProgress, Cancelled)
                | (InProgress, Pending)
                | (Paused, InProgress)
                | (Paused, Cancelled)
                | (Failed, Pending)
                | (Failed, Completed)
                | (Pending, Cancelled)
        )
    }
}

/// One entry in a task's bounded failure history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorHistoryEntry {
    pub timestamp: u64,
    pub reason: String,
    pub retry_count: u32,
}

/// Bound on `Task.error_history`; oldest entries are dropped first.
const MAX_ERROR_HISTORY: usize = 20;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub project_name: Option<String>,
    pub deliverables: Vec<String>,
    /// Free-form client-supplied annotation, set via `PATCH
    /// /api/tasks/:id/metadata`. Opaque to the core.
    pub metadata: Option<serde_json::Value>,

    pub status: TaskStatus,
    pub assigned_to: Option<String>,
    pub retry_count: u32,
    pub last_attempt_at: Option<u64>,
    pub paused_reason: Option<String>,
    pub failure_reason: Option<String>,
    pub error_history: Vec<ErrorHistoryEntry>,

    pub created_at: u64,
    pub updated_at: u64,
    pub cancelled_at: Option<u64>,
}

impl Task {
    /// A brand-new `pending` task with a fresh id.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        let now = now_ms();
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            description: description.into(),
            project_name: None,
            deliverables: Vec::new(),
            metadata: None,
            status: TaskStatus::Pending,
            assigned_to: None,
            retry_count: 0,
            last_attempt_at: None,
            paused_reason: None,
            failure_reason: None,
            error_history: Vec::new(),
            created_at: now,
            updated_at: now,
            cancelled_at: None,
        }
    }

    /// Validates `project_name` per spec.md §3: `[a-zA-Z0-9_-]+`, ≤30 chars.
    pub fn validate_project_name(name: &str) -> Result<(), Rejection> {
        let valid = !name.is_empty()
            && name.len() <= 30
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if valid {
            Ok(())
        } else {
            Err(Rejection::bad_request(format!(
                "invalid projectName {name:?}: must match [a-zA-Z0-9_-]+ and be <=30 chars"
            )))
        }
    }

    /// Assigns the task to an agent and marks it in-progress.
    pub fn assign(&mut self, agent: impl Into<String>) -> Result<(), Rejection> {
        self.transition_to(TaskStatus::InProgress)?;
        self.assigned_to = Some(agent.into());
        self.last_attempt_at = Some(now_ms());
        Ok(())
    }

    /// Marks the task paused, preserving `assignedTo` so resume can target
    /// the same agent.
    pub fn pause(&mut self, reason: impl Into<String>) -> Result<(), Rejection> {
        if self.assigned_to.is_none() {
            return Err(Rejection::conflict("cannot pause a task with no assignee"));
        }
        self.transition_to(TaskStatus::Paused)?;
        self.paused_reason = Some(reason.into());
        Ok(())
    }

    /// Resumes a paused task back onto its existing assignee.
    pub fn resume(&mut self) -> Result<(), Rejection> {
        self.transition_to(TaskStatus::InProgress)?;
        self.paused_reason = None;
        Ok(())
    }

    /// Marks the task completed.
    pub fn complete(&mut self) -> Result<(), Rejection> {
        self.transition_to(TaskStatus::Completed)
    }

    /// Marks the task failed, appending to the bounded error history.
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), Rejection> {
        let reason = reason.into();
        self.transition_to(TaskStatus::Failed)?;
        self.failure_reason = Some(reason.clone());
        self.error_history.push(ErrorHistoryEntry {
            timestamp: now_ms(),
            reason,
            retry_count: self.retry_count,
        });
        if self.error_history.len() > MAX_ERROR_HISTORY {
            let drop = self.error_history.len() - MAX_ERROR_HISTORY;
            self.error_history.drain(0..drop);
        }
        Ok(())
    }

    /// Cancels the task. Allowed from `{pending, in_progress, paused}`;
    /// `assignedTo` and `projectName` are retained as history.
    pub fn cancel(&mut self) -> Result<(), Rejection> {
        if !matches!(self.status, TaskStatus::Pending | TaskStatus::InProgress | TaskStatus::Paused)
        {
            return Err(Rejection::conflict(format!(
                "cannot cancel a task in status {}",
                self.status.as_str()
            )));
        }
        self.status = TaskStatus::Cancelled;
        self.cancelled_at = Some(now_ms());
        self.updated_at = now_ms();
        Ok(())
    }

    /// Reverts an `in_progress` task back to `pending` without touching
    /// `retryCount` — used by the cleanup protocols (emergency stop,
    /// session reset) rather than by the normal retry path.
    /// `clear_assignee` distinguishes emergency stop (preserves
    /// `assignedTo` as the interrupted agent) from session reset (clears
    /// it, since the pane roster itself is being torn down).
    pub fn revert_to_pending(&mut self, clear_assignee: bool) -> Result<(), Rejection> {
        self.transition_to(TaskStatus::Pending)?;
        if clear_assignee {
            self.assigned_to = None;
        }
        Ok(())
    }

    /// Resets a `{failed, cancelled}` task back to `pending` with
    /// `retryCount + 1` and a cleared assignee.
    pub fn retry(&mut self) -> Result<(), Rejection> {
        if !matches!(self.status, TaskStatus::Failed | TaskStatus::Cancelled) {
            return Err(Rejection::conflict(format!(
                "cannot retry a task in status {}",
                self.status.as_str()
            )));
        }
        self.status = TaskStatus::Pending;
        self.retry_count += 1;
        self.assigned_to = None;
        self.failure_reason = None;
        self.last_attempt_at = None;
        self.updated_at = now_ms();
        Ok(())
    }

    /// Marks this task `completed` and returns a brand-new pending task
    /// sharing title and description, with `retryCount` reset to zero.
    pub fn clone_as_new(&mut self) -> Result<Task, Rejection> {
        self.transition_to(TaskStatus::Completed)?;
        Ok(Task::new(self.title.clone(), self.description.clone()))
    }

    /// Whether `delete` is permitted: not `in_progress` or `paused`.
    pub fn deletable(&self) -> bool {
        !matches!(self.status, TaskStatus::InProgress | TaskStatus::Paused)
    }

    /// `PATCH /api/tasks/:id/project-name`: validated the same way as task
    /// creation.
    pub fn set_project_name(&mut self, project_name: Option<String>) -> Result<(), Rejection> {
        if let Some(name) = &project_name {
            Self::validate_project_name(name)?;
        }
        self.project_name = project_name;
        self.updated_at = now_ms();
        Ok(())
    }

    /// `PATCH /api/tasks/:id/assigned-to`: an operator override, independent
    /// of the normal `assign`/`retry` transitions.
    pub fn set_assigned_to(&mut self, assigned_to: Option<String>) {
        self.assigned_to = assigned_to;
        self.updated_at = now_ms();
    }

    /// `PATCH /api/tasks/:id/metadata`.
    pub fn set_metadata(&mut self, metadata: Option<serde_json::Value>) {
        self.metadata = metadata;
        self.updated_at = now_ms();
    }

    fn transition_to(&mut self, next: TaskStatus) -> Result<(), Rejection> {
        if !self.status.can_transition_to(next) {
            return Err(Rejection::conflict(format!(
                "illegal task transition {} -> {}",
                self.status.as_str(),
                next.as_str()
            )));
        }
        self.status = next;
        self.updated_at = now_ms();
        Ok(())
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
