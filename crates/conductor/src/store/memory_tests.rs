// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::model::Task;

#[tokio::test]
async fn create_then_get_round_trips() {
    let store = MemoryStore::new();
    let task = Task::new("t", "d");
    store.create_task(task.clone()).await.unwrap();
    let fetched = store.get_task_by_id(&task.id).await.unwrap();
    assert_eq!(fetched.unwrap().id, task.id);
}

#[tokio::test]
async fn update_unknown_task_is_not_found() {
    let store = MemoryStore::new();
    let task = Task::new("t", "d");
    let result = store.update_task(task).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn delete_rejects_in_progress_tasks() {
    let store = MemoryStore::new();
    let mut task = Task::new("t", "d");
    task.assign("president").unwrap();
    store.create_task(task.clone()).await.unwrap();
    let result = store.delete_task(&task.id).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn delete_succeeds_for_pending_tasks() {
    let store = MemoryStore::new();
    let task = Task::new("t", "d");
    store.create_task(task.clone()).await.unwrap();
    store.delete_task(&task.id).await.unwrap();
    assert!(store.get_task_by_id(&task.id).await.unwrap().is_none());
}

#[tokio::test]
async fn task_id_counter_is_monotonic() {
    let store = MemoryStore::new();
    let first = store.increment_task_id_counter().await.unwrap();
    let second = store.increment_task_id_counter().await.unwrap();
    assert_eq!(second, first + 1);
}

#[tokio::test]
async fn task_counts_reflect_status_distribution() {
    let store = MemoryStore::new();
    let mut in_progress = Task::new("a", "d");
    in_progress.assign("president").unwrap();
    store.create_task(Task::new("p", "d")).await.unwrap();
    store.create_task(in_progress).await.unwrap();

    let counts = store.get_task_counts().await.unwrap();
    assert_eq!(counts.pending, 1);
    assert_eq!(counts.in_progress, 1);
}

#[tokio::test]
async fn usage_limit_state_round_trips_and_clears() {
    let store = MemoryStore::new();
    let state = UsageLimitState::triggered(1_000, "limit", 0);
    store.save_usage_limit_state(state).await.unwrap();
    assert!(store.get_usage_limit_state().await.unwrap().is_limited);
    store.clear_usage_limit_state().await.unwrap();
    assert!(!store.get_usage_limit_state().await.unwrap().is_limited);
}
