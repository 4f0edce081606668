// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::model::AgentStatusValue;

fn president_status(value: AgentStatusValue) -> AgentStatus {
    let mut status = AgentStatus::new(AgentId::president(), "president");
    status.status = value;
    status
}

#[tokio::test]
async fn material_change_publishes_immediately() {
    let cache = AgentCache::new(Roster::standard(), Duration::from_millis(500));
    let mut rx = cache.subscribe();
    cache.update(president_status(AgentStatusValue::Working)).await;

    let published = tokio::time::timeout(Duration::from_millis(50), rx.recv()).await;
    assert!(published.is_ok(), "material change should publish without waiting for debounce");
}

#[tokio::test]
async fn non_material_change_is_debounced() {
    let cache = AgentCache::new(Roster::standard(), Duration::from_millis(60));
    let mut rx = cache.subscribe();
    // First update is always published (no prior publish to debounce against).
    cache.update(president_status(AgentStatusValue::Idle)).await;
    rx.recv().await.unwrap();

    // A same-status update with a different terminal_output should coalesce.
    let mut second = president_status(AgentStatusValue::Idle);
    second.terminal_output = Some("same status, new output".into());
    cache.update(second).await;

    let immediate = tokio::time::timeout(Duration::from_millis(20), rx.recv()).await;
    assert!(immediate.is_err(), "non-material update should not publish before the debounce window");

    let eventually = tokio::time::timeout(Duration::from_millis(150), rx.recv()).await;
    assert!(eventually.is_ok(), "debounced update should still publish once the window elapses");
}

#[tokio::test]
async fn rapid_updates_coalesce_to_the_latest_value() {
    let cache = AgentCache::new(Roster::standard(), Duration::from_millis(60));
    let mut rx = cache.subscribe();
    cache.update(president_status(AgentStatusValue::Idle)).await;
    rx.recv().await.unwrap();

    for i in 0..5 {
        let mut update = president_status(AgentStatusValue::Idle);
        update.terminal_output = Some(format!("frame {i}"));
        cache.update(update).await;
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let published = tokio::time::timeout(Duration::from_millis(200), rx.recv()).await.unwrap().unwrap();
    assert_eq!(published.terminal_output.as_deref(), Some("frame 4"));
}

#[tokio::test]
async fn get_returns_the_latest_roster_snapshot_even_before_publish() {
    let cache = AgentCache::new(Roster::standard(), Duration::from_millis(500));
    cache.update(president_status(AgentStatusValue::Idle)).await;
    let mut second = president_status(AgentStatusValue::Idle);
    second.terminal_output = Some("not yet published".into());
    cache.update(second).await;

    let snapshot = cache.get(&AgentId::president()).await.unwrap();
    assert_eq!(snapshot.terminal_output.as_deref(), Some("not yet published"));
}
