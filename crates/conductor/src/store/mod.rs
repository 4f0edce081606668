// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store facade: the narrow data-access interface the core depends on.
//!
//! No SQL appears in the core — every persisted entity is read and
//! written through this trait. The schema is owned by whatever
//! implements it; the core only ever asserts it via `health_check`.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Rejection;
use crate::model::{Task, TaskStatus, UsageLimitState};

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCounts {
    pub pending: u64,
    pub in_progress: u64,
    pub paused: u64,
    pub completed: u64,
    pub failed: u64,
    pub cancelled: u64,
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn get_all_tasks(&self) -> Result<Vec<Task>, Rejection>;
    async fn get_task_by_id(&self, id: &str) -> Result<Option<Task>, Rejection>;
    async fn get_tasks_by_status(&self, status: TaskStatus) -> Result<Vec<Task>, Rejection>;
    async fn get_task_counts(&self) -> Result<TaskCounts, Rejection>;

    async fn create_task(&self, task: Task) -> Result<Task, Rejection>;
    async fn update_task(&self, task: Task) -> Result<Task, Rejection>;
    async fn delete_task(&self, id: &str) -> Result<(), Rejection>;

    async fn get_usage_limit_state(&self) -> Result<UsageLimitState, Rejection>;
    async fn save_usage_limit_state(&self, state: UsageLimitState) -> Result<(), Rejection>;
    async fn clear_usage_limit_state(&self) -> Result<(), Rejection>;

    async fn get_setting(&self, key: &str) -> Result<Option<String>, Rejection>;
    async fn set_setting(&self, key: &str, value: String) -> Result<(), Rejection>;
    /// Mints the next `task_id_counter` value under a write lock.
    async fn increment_task_id_counter(&self) -> Result<u64, Rejection>;

    async fn health_check(&self) -> Result<(), Rejection>;
}
