// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task Queue & Dispatcher: task CRUD plus the periodic assignment loop
//! that hands the oldest pending task to the president (spec.md §4.7).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::agent_cache::AgentCache;
use crate::error::Rejection;
use crate::events::{Event, EventBus};
use crate::model::{AgentId, AgentStatus, Task, TaskStatus};
use crate::pane::{Key, PaneAdapter};
use crate::store::{Store, TaskCounts};

/// The president's pane target. A fixed name, not a setting: there is
/// exactly one president session per deployment.
const PRESIDENT_TARGET: &str = "president";

pub struct Dispatcher {
    store: Arc<dyn Store>,
    pane: Arc<dyn PaneAdapter>,
    agent_cache: Arc<AgentCache>,
    events: EventBus,
    /// Read-mostly cache over the store, refreshed on every mutation and
    /// by a 30-second ticker (spec.md §4.7). Reads never touch the store
    /// directly — the store is the write path, this is the read path.
    cache: RwLock<Vec<Task>>,
    /// Guards the dispatch loop body: a tick that finds the previous tick
    /// still running is a no-op rather than a pile-up.
    running: AtomicBool,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn Store>, pane: Arc<dyn PaneAdapter>, agent_cache: Arc<AgentCache>, events: EventBus) -> Self {
        Self { store, pane, agent_cache, events, cache: RwLock::new(Vec::new()), running: AtomicBool::new(false) }
    }

    /// Reloads the task cache from the store. Called after every mutation
    /// and by the 30-second cache-refresh ticker.
    pub async fn refresh_cache(&self) -> Result<(), Rejection> {
        let tasks = self.store.get_all_tasks().await?;
        *self.cache.write().await = tasks;
        Ok(())
    }

    pub async fn create_task(&self, title: impl Into<String>, description: impl Into<String>) -> Result<Task, Rejection> {
        let task = Task::new(title, description);
        let task = self.store.create_task(task).await?;
        self.refresh_cache().await?;
        self.events.publish(Event::TaskQueued { task: task.clone() });
        self.events.publish(Event::TaskQueueUpdated);
        Ok(task)
    }

    pub async fn list_tasks(&self) -> Vec<Task> {
        self.cache.read().await.clone()
    }

    pub async fn get_task(&self, id: &str) -> Option<Task> {
        self.cache.read().await.iter().find(|t| t.id == id).cloned()
    }

    pub async fn counts_by_status(&self) -> TaskCounts {
        let cache = self.cache.read().await;
        let mut counts = TaskCounts::default();
        for task in cache.iter() {
            match task.status {
                TaskStatus::Pending => counts.pending += 1,
                TaskStatus::InProgress => counts.in_progress += 1,
                TaskStatus::Paused => counts.paused += 1,
                TaskStatus::Completed => counts.completed += 1,
                TaskStatus::Failed => counts.failed += 1,
                TaskStatus::Cancelled => counts.cancelled += 1,
            }
        }
        counts
    }

    pub async fn mark_failed(&self, id: &str, reason: impl Into<String>) -> Result<Task, Rejection> {
        let reason = reason.into();
        let mut task = self.require_task(id).await?;
        task.fail(reason.clone())?;
        let task = self.store.update_task(task).await?;
        self.refresh_cache().await?;
        self.events.publish(Event::TaskFailed { task: task.clone(), reason });
        self.events.publish(Event::TaskQueueUpdated);
        Ok(task)
    }

    pub async fn retry(&self, id: &str) -> Result<Task, Rejection> {
        let mut task = self.require_task(id).await?;
        task.retry()?;
        let task = self.store.update_task(task).await?;
        self.refresh_cache().await?;
        self.events.publish(Event::TaskRetried { task: task.clone() });
        self.events.publish(Event::TaskQueueUpdated);
        Ok(task)
    }

    /// Marks the source task completed and enqueues a fresh pending clone
    /// (spec.md §3: failed → cloned-as-new).
    pub async fn clone_as_new(&self, id: &str) -> Result<Task, Rejection> {
        let mut source = self.require_task(id).await?;
        let fresh = source.clone_as_new()?;
        let source = self.store.update_task(source).await?;
        let fresh = self.store.create_task(fresh).await?;
        self.refresh_cache().await?;
        self.events.publish(Event::TaskCompleted { task: source, detected_by: None, excerpt: None, elapsed_minutes: None });
        self.events.publish(Event::TaskQueued { task: fresh.clone() });
        self.events.publish(Event::TaskQueueUpdated);
        Ok(fresh)
    }

    /// Deletes a task. Rejects `in_progress`/`paused` tasks per
    /// [`Task::deletable`]; workspace directory removal for the task's
    /// project, if any, is the caller's (cleanup protocol's) concern.
    pub async fn delete(&self, id: &str) -> Result<(), Rejection> {
        self.store.delete_task(id).await?;
        self.refresh_cache().await?;
        self.events.publish(Event::TaskDeleted { task_id: id.to_string() });
        self.events.publish(Event::TaskQueueUpdated);
        Ok(())
    }

    /// Cancels a task, interrupting its assignee with Ctrl+C if it was
    /// in progress, and clearing that agent's working state in the cache.
    pub async fn cancel(&self, id: &str) -> Result<Task, Rejection> {
        let mut task = self.require_task(id).await?;
        if task.status == TaskStatus::InProgress {
            if let Some(target) = task.assigned_to.clone() {
                let _ = self.pane.send(&target, &[Key::CtrlC]).await;
                let id = AgentId::from(target.as_str());
                self.agent_cache.update(AgentStatus::idle(id, target)).await;
            }
        }
        task.cancel()?;
        let task = self.store.update_task(task).await?;
        self.refresh_cache().await?;
        self.events.publish(Event::TaskCancelled { task: task.clone() });
        self.events.publish(Event::TaskQueueUpdated);
        Ok(task)
    }

    /// Marks an `in_progress` task completed (the Completion Detector's
    /// and the `mark-task-completed`/`complete-task` RPC's entry point),
    /// clears the assignee's working state, and publishes the completion
    /// event with whatever detection metadata the caller has.
    pub async fn complete_task(
        &self,
        id: &str,
        detected_by: Option<AgentId>,
        excerpt: Option<String>,
        elapsed_minutes: Option<u64>,
    ) -> Result<Task, Rejection> {
        let mut task = self.require_task(id).await?;
        let assignee = task.assigned_to.clone();
        task.complete()?;
        let task = self.store.update_task(task).await?;
        self.refresh_cache().await?;

        if let Some(target) = assignee {
            let agent_id = AgentId::from(target.as_str());
            self.agent_cache.update(AgentStatus::idle(agent_id, target)).await;
        }

        self.events.publish(Event::TaskCompleted { task: task.clone(), detected_by, excerpt, elapsed_minutes });
        self.events.publish(Event::TaskQueueUpdated);
        Ok(task)
    }

    /// One dispatch tick. Consults `usage_limited` first — a limited
    /// deployment leaves pending tasks untouched rather than assigning
    /// into a session that will reject them. Non-reentrant: a tick that
    /// overlaps the previous one's is a silent no-op.
    pub async fn run_dispatch(&self, usage_limited: bool) -> Result<(), Rejection> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let result = self.dispatch_once(usage_limited).await;
        self.running.store(false, Ordering::SeqCst);
        result
    }

    async fn dispatch_once(&self, usage_limited: bool) -> Result<(), Rejection> {
        if usage_limited {
            return Ok(());
        }

        let mut pending = self.store.get_tasks_by_status(TaskStatus::Pending).await?;
        pending.sort_by_key(|t| t.created_at);
        let Some(mut next) = pending.into_iter().next() else {
            return Ok(());
        };

        self.assign_to_president(&mut next).await?;
        let assigned = self.store.update_task(next).await?;
        self.refresh_cache().await?;
        self.events.publish(Event::TaskAssigned { task: assigned });
        self.events.publish(Event::TaskQueueUpdated);
        Ok(())
    }

    /// Clears the president's pane, sends the task payload, and records
    /// the assignment. Order matters: the pane send must succeed before
    /// the task transitions, or a retried dispatch would re-clear a
    /// session that already holds work in flight.
    async fn assign_to_president(&self, task: &mut Task) -> Result<(), Rejection> {
        self.pane
            .send(PRESIDENT_TARGET, &[Key::Escape, Key::Literal("/clear".to_string()), Key::Enter])
            .await?;

        let payload = format!("{}\n\n{}", task.title, task.description);
        self.pane.send(PRESIDENT_TARGET, &[Key::Literal(payload), Key::Enter]).await?;

        task.assign(AgentId::president().as_str())
    }

    async fn require_task(&self, id: &str) -> Result<Task, Rejection> {
        self.store
            .get_task_by_id(id)
            .await?
            .ok_or_else(|| Rejection::not_found(format!("task {id} not found")))
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
