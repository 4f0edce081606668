// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn standard_roster_has_president_plus_four_workers() {
    let roster = Roster::standard();
    assert_eq!(roster.len(), 5);
    assert!(roster.get(&AgentId::president()).is_some());
}

#[test]
fn differs_materially_ignores_terminal_output_changes() {
    let mut a = AgentStatus::new(AgentId::president(), "president");
    let mut b = a.clone();
    b.terminal_output = Some("new text".into());
    assert!(!a.differs_materially(&b));

    b.status = AgentStatusValue::Working;
    assert!(a.differs_materially(&b));
    a.status = AgentStatusValue::Working;
    assert!(!a.differs_materially(&b));
}

#[test]
fn activity_ring_evicts_oldest_past_capacity() {
    let mut status = AgentStatus::new(AgentId::president(), "president");
    for i in 0..15 {
        status.push_activity(ActivityInfo {
            activity_type: ActivityType::Coding,
            description: format!("step {i}"),
            timestamp: i,
            file_name: None,
            command: None,
        });
    }
    let entries: Vec<_> = status.recent_activity().collect();
    assert_eq!(entries.len(), 10);
    assert_eq!(entries.first().unwrap().description, "step 5");
    assert_eq!(entries.last().unwrap().description, "step 14");
}

#[test]
fn online_count_excludes_offline_and_unreachable() {
    let mut roster = Roster::new();
    roster.insert(AgentStatus::new(AgentId::president(), "president"));
    let mut working = AgentStatus::new(AgentId::from("multiagent-0"), "agent-0");
    working.status = AgentStatusValue::Working;
    roster.insert(working);
    let mut unreachable = AgentStatus::new(AgentId::from("multiagent-1"), "agent-1");
    unreachable.status = AgentStatusValue::Unreachable;
    roster.insert(unreachable);

    assert_eq!(roster.online_count(), 2);
    assert!(roster.any_working());
}
