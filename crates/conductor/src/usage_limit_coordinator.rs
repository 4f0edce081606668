// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Usage-Limit Coordinator: pauses in-flight work when the president's
//! session hits a rate limit, and resumes it once the window clears
//! (spec.md §4.8).

use std::sync::Arc;
use std::time::Duration;

use regex::Regex;

use crate::dispatcher::Dispatcher;
use crate::error::Rejection;
use crate::events::{Event, EventBus};
use crate::model::{now_ms, TaskStatus, UsageLimitState};
use crate::pane::{Key, PaneAdapter};
use crate::store::Store;

pub struct UsageLimitCoordinator {
    store: Arc<dyn Store>,
    pane: Arc<dyn PaneAdapter>,
    dispatcher: Arc<Dispatcher>,
    events: EventBus,
    default_backoff: Duration,
    /// A bare 10-13 digit run, read as a unix timestamp (seconds or
    /// millis) embedded in a limit message. Most limit messages carry no
    /// such detail, in which case the default backoff applies.
    embedded_timestamp: Regex,
}

impl UsageLimitCoordinator {
    pub fn new(
        store: Arc<dyn Store>,
        pane: Arc<dyn PaneAdapter>,
        dispatcher: Arc<Dispatcher>,
        events: EventBus,
        default_backoff: Duration,
    ) -> Self {
        let embedded_timestamp =
            Regex::new(r"\b(\d{10,13})\b").unwrap_or_else(|e| unreachable!("embedded timestamp pattern failed: {e}"));
        Self { store, pane, dispatcher, events, default_backoff, embedded_timestamp }
    }

    pub async fn is_limited(&self) -> Result<bool, Rejection> {
        Ok(self.store.get_usage_limit_state().await?.is_limited)
    }

    /// Handles a usage-limit phrase surfaced by the terminal monitor.
    /// Drops silently if a limit is already recorded — C3 is expected to
    /// invoke this at most once per detection window, but this guard
    /// makes the operation idempotent regardless.
    pub async fn handle_detection(&self, message: impl Into<String>) -> Result<(), Rejection> {
        let message = message.into();
        let current = self.store.get_usage_limit_state().await?;
        if current.is_limited {
            return Ok(());
        }

        let next_retry_at =
            self.extract_retry_at(&message).unwrap_or_else(|| now_ms() + self.default_backoff.as_millis() as u64);
        let state = UsageLimitState::triggered(next_retry_at, message.clone(), current.retry_count);
        self.store.save_usage_limit_state(state).await?;

        for task in self.store.get_tasks_by_status(TaskStatus::InProgress).await? {
            let mut task = task;
            task.pause(format!("Usage limit reached: {message}"))?;
            self.store.update_task(task).await?;
        }

        self.events.publish(Event::UsageLimitReached { next_retry_at: Some(next_retry_at), message: Some(message) });
        Ok(())
    }

    /// The 1-minute resolution ticker: resolves automatically once
    /// `nextRetryAt` has passed.
    pub async fn tick(&self) -> Result<(), Rejection> {
        let state = self.store.get_usage_limit_state().await?;
        if !state.is_limited || !state.is_resolved_at(now_ms()) {
            return Ok(());
        }
        self.resolve(Event::UsageLimitCleared).await
    }

    /// An explicit operator resume, identical to automatic resolution
    /// minus the `nextRetryAt` gate.
    pub async fn manual_resume(&self) -> Result<(), Rejection> {
        self.resolve(Event::UsageLimitResolved).await
    }

    async fn resolve(&self, resolved_event: Event) -> Result<(), Rejection> {
        self.store.clear_usage_limit_state().await?;

        let mut resumed_ids = Vec::new();
        for task in self.store.get_tasks_by_status(TaskStatus::Paused).await? {
            let mut task = task;
            task.resume()?;
            let task = self.store.update_task(task).await?;
            resumed_ids.push(task.id);
        }

        self.events.publish(resolved_event);
        if !resumed_ids.is_empty() {
            self.events.publish(Event::PausedTasksResumed { task_ids: resumed_ids });
        }

        self.dispatcher.run_dispatch(false).await?;

        let _ = self
            .pane
            .send("president", &[Key::Literal("Please check progress and continue.".to_string()), Key::Enter])
            .await;

        Ok(())
    }

    /// Tries to read an embedded unix timestamp out of a limit message;
    /// accepts both second and millisecond epochs.
    fn extract_retry_at(&self, message: &str) -> Option<u64> {
        let raw: u64 = self.embedded_timestamp.captures(message)?.get(1)?.as_str().parse().ok()?;
        if raw < 10_000_000_000 {
            Some(raw * 1000)
        } else {
            Some(raw)
        }
    }
}

#[cfg(test)]
#[path = "usage_limit_coordinator_tests.rs"]
mod tests;
