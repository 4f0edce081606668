// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory `Store` implementation. Stands in for the relational facade
//! that is out of scope for the core (spec.md §6): same contract, no
//! schema, no transactions beyond the lock it already holds.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Store, TaskCounts};
use crate::error::Rejection;
use crate::model::{Task, TaskStatus, UsageLimitState};

#[derive(Default)]
struct Inner {
    tasks: HashMap<String, Task>,
    usage_limit: UsageLimitState,
    settings: HashMap<String, String>,
    task_id_counter: u64,
}

pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self { inner: RwLock::new(Inner::default()) }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_all_tasks(&self) -> Result<Vec<Task>, Rejection> {
        Ok(self.inner.read().await.tasks.values().cloned().collect())
    }

    async fn get_task_by_id(&self, id: &str) -> Result<Option<Task>, Rejection> {
        Ok(self.inner.read().await.tasks.get(id).cloned())
    }

    async fn get_tasks_by_status(&self, status: TaskStatus) -> Result<Vec<Task>, Rejection> {
        Ok(self.inner.read().await.tasks.values().filter(|t| t.status == status).cloned().collect())
    }

    async fn get_task_counts(&self) -> Result<TaskCounts, Rejection> {
        let inner = self.inner.read().await;
        let mut counts = TaskCounts::default();
        for task in inner.tasks.values() {
            match task.status {
                TaskStatus::Pending => counts.pending += 1,
                TaskStatus::InProgress => counts.in_progress += 1,
                TaskStatus::Paused => counts.paused += 1,
                TaskStatus::Completed => counts.completed += 1,
                TaskStatus::Failed => counts.failed += 1,
                TaskStatus::Cancelled => counts.cancelled += 1,
            }
        }
        Ok(counts)
    }

    async fn create_task(&self, task: Task) -> Result<Task, Rejection> {
        let mut inner = self.inner.write().await;
        inner.tasks.insert(task.id.clone(), task.clone());
        Ok(task)
    }

    async fn update_task(&self, task: Task) -> Result<Task, Rejection> {
        let mut inner = self.inner.write().await;
        if !inner.tasks.contains_key(&task.id) {
            return Err(Rejection::not_found(format!("task {} not found", task.id)));
        }
        inner.tasks.insert(task.id.clone(), task.clone());
        Ok(task)
    }

    async fn delete_task(&self, id: &str) -> Result<(), Rejection> {
        let mut inner = self.inner.write().await;
        match inner.tasks.get(id) {
            None => Err(Rejection::not_found(format!("task {id} not found"))),
            Some(task) if !task.deletable() => {
                Err(Rejection::conflict(format!("task {id} cannot be deleted in status {}", task.status.as_str())))
            }
            Some(_) => {
                inner.tasks.remove(id);
                Ok(())
            }
        }
    }

    async fn get_usage_limit_state(&self) -> Result<UsageLimitState, Rejection> {
        Ok(self.inner.read().await.usage_limit.clone())
    }

    async fn save_usage_limit_state(&self, state: UsageLimitState) -> Result<(), Rejection> {
        self.inner.write().await.usage_limit = state;
        Ok(())
    }

    async fn clear_usage_limit_state(&self) -> Result<(), Rejection> {
        let mut inner = self.inner.write().await;
        inner.usage_limit = inner.usage_limit.cleared();
        Ok(())
    }

    async fn get_setting(&self, key: &str) -> Result<Option<String>, Rejection> {
        Ok(self.inner.read().await.settings.get(key).cloned())
    }

    async fn set_setting(&self, key: &str, value: String) -> Result<(), Rejection> {
        self.inner.write().await.settings.insert(key.to_string(), value);
        Ok(())
    }

    async fn increment_task_id_counter(&self) -> Result<u64, Rejection> {
        let mut inner = self.inner.write().await;
        inner.task_id_counter += 1;
        Ok(inner.task_id_counter)
    }

    async fn health_check(&self) -> Result<(), Rejection> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
