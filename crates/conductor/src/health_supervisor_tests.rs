// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use async_trait::async_trait;

use super::*;
use crate::pane::PaneError;

struct FakePane {
    sessions: Vec<&'static str>,
    captures: std::collections::HashMap<&'static str, &'static str>,
}

#[async_trait]
impl PaneAdapter for FakePane {
    async fn list_sessions(&self) -> Result<Vec<String>, PaneError> {
        Ok(self.sessions.iter().map(|s| s.to_string()).collect())
    }

    async fn pane_exists(&self, target: &str) -> Result<bool, PaneError> {
        Ok(self.captures.contains_key(target))
    }

    async fn capture(&self, target: &str, _lines: u32) -> Result<String, PaneError> {
        self.captures.get(target).map(|s| s.to_string()).ok_or_else(|| PaneError::NotFound(target.to_string()))
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

fn supervisor(pane: FakePane) -> HealthSupervisor {
    let cache = AgentCache::new(crate::model::Roster::standard(), Duration::from_millis(500));
    HealthSupervisor::new(
        Arc::new(pane),
        cache,
        EventBus::new(),
        Arc::new(Mutex::new(Classifier::new())),
        Duration::from_secs(300),
    )
}

#[tokio::test]
async fn healthy_tick_reports_all_agents_online() {
    let mut captures = std::collections::HashMap::new();
    captures.insert("president", "claude> waiting for input");
    captures.insert("multiagent-0", "$ tokens remaining: 500");
    captures.insert("multiagent-1", "$ tokens remaining: 500");
    captures.insert("multiagent-2", "$ tokens remaining: 500");
    captures.insert("multiagent-3", "$ tokens remaining: 500");
    let supervisor = supervisor(FakePane { sessions: vec!["president", "multiagent"], captures });

    let agents: Vec<(AgentId, String)> = vec![
        (AgentId::president(), "president".to_string()),
        (AgentId::from("multiagent-0"), "multiagent-0".to_string()),
        (AgentId::from("multiagent-1"), "multiagent-1".to_string()),
        (AgentId::from("multiagent-2"), "multiagent-2".to_string()),
        (AgentId::from("multiagent-3"), "multiagent-3".to_string()),
    ];
    let health = supervisor.tick(&agents).await;
    assert_eq!(health.overall_health, crate::model::OverallHealth::Healthy);
}

#[tokio::test]
async fn missing_pane_marks_agent_offline_and_degrades_health() {
    let mut captures = std::collections::HashMap::new();
    captures.insert("president", "claude> waiting for input");
    let supervisor = supervisor(FakePane { sessions: vec!["president", "multiagent"], captures });

    let agents: Vec<(AgentId, String)> = vec![
        (AgentId::president(), "president".to_string()),
        (AgentId::from("multiagent-0"), "multiagent-0".to_string()),
    ];
    let health = supervisor.tick(&agents).await;
    assert_eq!(health.agents.get("multiagent-0"), Some(&false));
}

#[tokio::test]
async fn missing_sessions_report_critical() {
    let supervisor = supervisor(FakePane { sessions: vec![], captures: std::collections::HashMap::new() });
    let agents: Vec<(AgentId, String)> = vec![(AgentId::president(), "president".to_string())];
    let health = supervisor.tick(&agents).await;
    assert_eq!(health.overall_health, crate::model::OverallHealth::Critical);
}

#[tokio::test(start_paused = true)]
async fn emergency_stopped_agents_are_skipped_by_recovery() {
    let supervisor = supervisor(FakePane { sessions: vec![], captures: std::collections::HashMap::new() });
    let mut stopped = AgentStatus::new(AgentId::from("multiagent-0"), "agent-0");
    stopped.status = AgentStatusValue::Offline;
    stopped.emergency_stopped = true;
    supervisor.agent_cache.update(stopped).await;

    let agents: Vec<(AgentId, String)> = vec![(AgentId::from("multiagent-0"), "multiagent-0".to_string())];
    supervisor.manual_recovery(&agents).await;
    // No panic and the flag is respected; nothing else to assert without a
    // send-call spy, but this exercises the skip branch.
}
