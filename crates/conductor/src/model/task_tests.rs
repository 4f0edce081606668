// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn new_task_is_pending_with_no_assignee() {
    let task = Task::new("title", "description");
    assert_eq!(task.status, TaskStatus::Pending);
    assert!(task.assigned_to.is_none());
    assert_eq!(task.retry_count, 0);
}

#[test]
fn assign_moves_to_in_progress_and_sets_assignee() {
    let mut task = Task::new("t", "d");
    task.assign("president").unwrap();
    assert_eq!(task.status, TaskStatus::InProgress);
    assert_eq!(task.assigned_to.as_deref(), Some("president"));
    assert!(task.last_attempt_at.is_some());
}

#[test]
fn pause_requires_an_assignee() {
    let mut task = Task::new("t", "d");
    assert!(task.pause("usage limit").is_err());
}

#[test]
fn pause_then_resume_preserves_assignee() {
    let mut task = Task::new("t", "d");
    task.assign("president").unwrap();
    task.pause("usage limit").unwrap();
    assert_eq!(task.status, TaskStatus::Paused);
    assert_eq!(task.assigned_to.as_deref(), Some("president"));
    task.resume().unwrap();
    assert_eq!(task.status, TaskStatus::InProgress);
    assert!(task.paused_reason.is_none());
    assert_eq!(task.assigned_to.as_deref(), Some("president"));
}

#[test]
fn fail_appends_bounded_error_history() {
    let mut task = Task::new("t", "d");
    task.assign("president").unwrap();
    for i in 0..25 {
        task.status = TaskStatus::InProgress;
        task.fail(format!("attempt {i}")).unwrap();
    }
    assert_eq!(task.error_history.len(), 20);
    assert_eq!(task.error_history.last().unwrap().reason, "attempt 24");
}

#[test]
fn retry_resets_pending_state_and_increments_count() {
    let mut task = Task::new("t", "d");
    task.assign("president").unwrap();
    task.fail("boom").unwrap();
    task.retry().unwrap();
    assert_eq!(task.status, TaskStatus::Pending);
    assert_eq!(task.retry_count, 1);
    assert!(task.assigned_to.is_none());
    assert!(task.failure_reason.is_none());
}

#[test]
fn cancel_preserves_assignee_and_project_name() {
    let mut task = Task::new("t", "d");
    task.project_name = Some("demo".into());
    task.assign("president").unwrap();
    task.cancel().unwrap();
    assert_eq!(task.status, TaskStatus::Cancelled);
    assert_eq!(task.assigned_to.as_deref(), Some("president"));
    assert_eq!(task.project_name.as_deref(), Some("demo"));
    assert!(task.cancelled_at.is_some());
}

#[test]
fn cancel_is_rejected_once_completed() {
    let mut task = Task::new("t", "d");
    task.assign("president").unwrap();
    task.complete().unwrap();
    assert!(task.cancel().is_err());
}

#[test]
fn clone_as_new_completes_source_and_returns_fresh_pending() {
    let mut task = Task::new("t", "d");
    task.assign("president").unwrap();
    task.fail("boom").unwrap();
    let clone = task.clone_as_new().unwrap();
    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(clone.status, TaskStatus::Pending);
    assert_eq!(clone.title, "t");
    assert_eq!(clone.retry_count, 0);
    assert_ne!(clone.id, task.id);
}

#[test]
fn revert_to_pending_can_clear_or_preserve_the_assignee() {
    let mut emergency_stopped = Task::new("t", "d");
    emergency_stopped.assign("president").unwrap();
    emergency_stopped.revert_to_pending(false).unwrap();
    assert_eq!(emergency_stopped.status, TaskStatus::Pending);
    assert_eq!(emergency_stopped.assigned_to.as_deref(), Some("president"));

    let mut session_reset = Task::new("t", "d");
    session_reset.assign("president").unwrap();
    session_reset.revert_to_pending(true).unwrap();
    assert_eq!(session_reset.status, TaskStatus::Pending);
    assert!(session_reset.assigned_to.is_none());
}

#[test]
fn deletable_rejects_in_progress_and_paused() {
    let mut task = Task::new("t", "d");
    assert!(task.deletable());
    task.assign("president").unwrap();
    assert!(!task.deletable());
    task.pause("limit").unwrap();
    assert!(!task.deletable());
}

#[yare::parameterized(
    valid_slug = { "demo-project_1", true },
    too_long = { "this-project-name-is-definitely-too-long-ok", false },
    empty = { "", false },
    bad_chars = { "has space", false },
)]
fn project_name_validation(name: &str, expect_ok: bool) {
    assert_eq!(Task::validate_project_name(name).is_ok(), expect_ok);
}
