// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::model::Task;

#[tokio::test]
async fn published_events_reach_subscribers() {
    let bus = EventBus::new();
    let mut rx = bus.subscribe();
    bus.publish(Event::TaskQueueUpdated);
    let event = rx.recv().await.unwrap();
    assert!(matches!(event, Event::TaskQueueUpdated));
}

#[tokio::test]
async fn events_are_ordered_per_subscriber() {
    let bus = EventBus::new();
    let mut rx = bus.subscribe();
    let task = Task::new("t", "d");
    bus.publish(Event::TaskQueued { task: task.clone() });
    bus.publish(Event::TaskAssigned { task });
    assert!(matches!(rx.recv().await.unwrap(), Event::TaskQueued { .. }));
    assert!(matches!(rx.recv().await.unwrap(), Event::TaskAssigned { .. }));
}

#[test]
fn publish_without_subscribers_does_not_panic() {
    let bus = EventBus::new();
    bus.publish(Event::EmergencyStopCompleted);
}

#[test]
fn event_serializes_with_a_type_tag() {
    let event = Event::TaskDeleted { task_id: "abc".to_string() };
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["type"], "task-deleted");
    assert_eq!(json["task_id"], "abc");
}
