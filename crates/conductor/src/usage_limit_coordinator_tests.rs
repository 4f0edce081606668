// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use async_trait::async_trait;

use super::*;
use crate::pane::PaneError;
use crate::store::MemoryStore;

struct NoopPane;

#[async_trait]
impl PaneAdapter for NoopPane {
    async fn list_sessions(&self) -> Result<Vec<String>, PaneError> {
        Ok(vec![])
    }

    async fn pane_exists(&self, _target: &str) -> Result<bool, PaneError> {
        Ok(true)
    }

    async fn capture(&self, _target: &str, _lines: u32) -> Result<String, PaneError> {
        Ok(String::new())
    }

    async fn send(&self, _target: &str, _keys: &[Key]) -> Result<(), PaneError> {
        Ok(())
    }

    async fn resize(&self, _target: &str, _cols: u16, _rows: u16) -> Result<(), PaneError> {
        Ok(())
    }

    async fn spawn_session(&self, _target: &str, _cols: u16, _rows: u16) -> Result<(), PaneError> {
        Ok(())
    }

    async fn kill_session(&self, _target: &str) -> Result<(), PaneError> {
        Ok(())
    }
}

fn coordinator() -> (UsageLimitCoordinator, Arc<dyn Store>) {
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let pane: Arc<dyn PaneAdapter> = Arc::new(NoopPane);
    let events = EventBus::new();
    let agent_cache = crate::agent_cache::AgentCache::new(crate::model::Roster::standard(), Duration::from_millis(1));
    let dispatcher =
        Arc::new(Dispatcher::new(Arc::clone(&store), Arc::clone(&pane), agent_cache, events.clone()));
    let coordinator =
        UsageLimitCoordinator::new(Arc::clone(&store), pane, dispatcher, events, Duration::from_secs(3600));
    (coordinator, store)
}

#[tokio::test]
async fn detection_pauses_in_progress_tasks_and_records_state() {
    let (coordinator, store) = coordinator();
    let mut task = crate::model::Task::new("t", "d");
    task.assign("president").unwrap();
    store.create_task(task.clone()).await.unwrap();

    coordinator.handle_detection("usage limit reached").await.unwrap();

    assert!(coordinator.is_limited().await.unwrap());
    let paused = store.get_task_by_id(&task.id).await.unwrap().unwrap();
    assert_eq!(paused.status, TaskStatus::Paused);
    assert_eq!(paused.assigned_to.as_deref(), Some("president"));
}

#[tokio::test]
async fn a_second_detection_while_already_limited_is_a_no_op() {
    let (coordinator, store) = coordinator();
    coordinator.handle_detection("usage limit reached").await.unwrap();
    let first_state = store.get_usage_limit_state().await.unwrap();

    coordinator.handle_detection("usage limit reached again").await.unwrap();
    let second_state = store.get_usage_limit_state().await.unwrap();

    assert_eq!(first_state.last_error_message, second_state.last_error_message);
}

#[tokio::test]
async fn tick_is_a_no_op_before_next_retry_at() {
    let (coordinator, store) = coordinator();
    coordinator.handle_detection("usage limit reached").await.unwrap();

    coordinator.tick().await.unwrap();

    assert!(coordinator.is_limited().await.unwrap());
}

#[tokio::test]
async fn manual_resume_clears_state_and_resumes_paused_tasks() {
    let (coordinator, store) = coordinator();
    let mut task = crate::model::Task::new("t", "d");
    task.assign("president").unwrap();
    store.create_task(task.clone()).await.unwrap();
    coordinator.handle_detection("usage limit reached").await.unwrap();

    coordinator.manual_resume().await.unwrap();

    assert!(!coordinator.is_limited().await.unwrap());
    let resumed = store.get_task_by_id(&task.id).await.unwrap().unwrap();
    assert_eq!(resumed.status, TaskStatus::InProgress);
    assert_eq!(resumed.assigned_to.as_deref(), Some("president"));
}

#[tokio::test]
async fn embedded_timestamp_is_used_as_next_retry_at() {
    let (coordinator, _store) = coordinator();
    let seconds_from_now = now_ms() / 1000 + 120;
    coordinator.handle_detection(format!("usage limit reached, retry at {seconds_from_now}")).await.unwrap();

    let state = coordinator.store.get_usage_limit_state().await.unwrap();
    assert_eq!(state.next_retry_at, Some(seconds_from_now * 1000));
}
