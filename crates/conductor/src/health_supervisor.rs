// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Health Supervisor: periodic liveness assessment and auto-recovery.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::agent_cache::AgentCache;
use crate::classifier::Classifier;
use crate::events::{Event, EventBus};
use crate::model::{AgentId, AgentStatus, AgentStatusValue, SessionPresence, SystemHealth};
use crate::pane::{Key, PaneAdapter};

/// Interpreter process names that count as a live "alive" signal when seen
/// as a pane's current command.
const KNOWN_INTERPRETERS: &[&str] = &["claude", "node"];

/// Pane text that indicates an agent is alive even if its process name
/// isn't recognized (prompts, banners, token-remaining lines).
const ALIVE_TEXT_HINTS: &[&str] = &["tokens remaining", "$", "›", "continue?"];

/// Size a recovered session is created at when its pane is gone entirely.
const RECOVERY_COLS: u16 = 220;
const RECOVERY_ROWS: u16 = 50;

pub struct HealthSupervisor {
    pane: Arc<dyn PaneAdapter>,
    agent_cache: Arc<AgentCache>,
    events: EventBus,
    classifier: Arc<Mutex<Classifier>>,
    recovery_in_progress: AtomicBool,
    last_recovery_at: Mutex<Option<std::time::Instant>>,
    recovery_cooldown: Duration,
}

impl HealthSupervisor {
    pub fn new(
        pane: Arc<dyn PaneAdapter>,
        agent_cache: Arc<AgentCache>,
        events: EventBus,
        classifier: Arc<Mutex<Classifier>>,
        recovery_cooldown: Duration,
    ) -> Self {
        Self {
            pane,
            agent_cache,
            events,
            classifier,
            recovery_in_progress: AtomicBool::new(false),
            last_recovery_at: Mutex::new(None),
            recovery_cooldown,
        }
    }

    /// One supervisor tick: checks session presence and per-agent
    /// liveness, pushes updated `AgentStatus` through the cache, computes
    /// and emits `SystemHealth`, and triggers auto-recovery if gated.
    pub async fn tick(&self, agents: &[(AgentId, String)]) -> SystemHealth {
        let sessions = self.check_sessions().await;

        let mut online = BTreeMap::new();
        for (id, target) in agents {
            let alive = self.is_agent_alive(target).await;
            online.insert(id.as_str().to_string(), alive);

            let mut status = self.agent_cache.get(id).await.unwrap_or_else(|| AgentStatus::new(id.clone(), id.as_str()));
            status.status = if !alive {
                AgentStatusValue::Offline
            } else if status.status == AgentStatusValue::Working {
                AgentStatusValue::Working
            } else {
                AgentStatusValue::Idle
            };
            self.agent_cache.update(status).await;
        }

        let health = SystemHealth::assess(sessions, online);
        self.events.publish(Event::SystemHealth { health: health.clone() });

        if health.needs_auto_recovery() {
            self.maybe_auto_recover(agents).await;
        }

        health
    }

    /// Adaptive interval per spec.md §4.5: active while any agent is
    /// working, idle otherwise.
    pub async fn next_interval(&self, active_interval: Duration, idle_interval: Duration) -> Duration {
        let roster = self.agent_cache.roster_snapshot().await;
        if roster.any_working() {
            active_interval
        } else {
            idle_interval
        }
    }

    async fn check_sessions(&self) -> SessionPresence {
        let sessions = self.pane.list_sessions().await.unwrap_or_default();
        SessionPresence {
            president: sessions.iter().any(|s| s == "president"),
            multiagent: sessions.iter().any(|s| s.starts_with("multiagent")),
        }
    }

    /// Two-signal liveness rule: either the pane's current command matches
    /// a known interpreter, or recent text matches an "alive" pattern.
    /// Either signal alone is sufficient.
    async fn is_agent_alive(&self, target: &str) -> bool {
        if !matches!(self.pane.pane_exists(target).await, Ok(true)) {
            return false;
        }

        let Ok(text) = self.pane.capture(target, 20).await else {
            return false;
        };

        let cleaned = Classifier::clean(&text);
        let interpreter_hint = KNOWN_INTERPRETERS.iter().any(|name| cleaned.contains(name));
        let text_hint = ALIVE_TEXT_HINTS.iter().any(|hint| cleaned.contains(hint));
        let has_error = self.classifier.lock().await.has_error(&cleaned);

        (interpreter_hint || text_hint) && !has_error
    }

    /// Triggered only when critical and gated by reentrancy + cooldown
    /// (bypassable via [`Self::manual_recovery`]).
    async fn maybe_auto_recover(&self, agents: &[(AgentId, String)]) {
        if self.recovery_in_progress.swap(true, Ordering::SeqCst) {
            return;
        }

        let cooled_down = {
            let last = self.last_recovery_at.lock().await;
            last.map(|at| at.elapsed() >= self.recovery_cooldown).unwrap_or(true)
        };

        if !cooled_down {
            self.recovery_in_progress.store(false, Ordering::SeqCst);
            return;
        }

        self.run_recovery(agents).await;
        self.recovery_in_progress.store(false, Ordering::SeqCst);
    }

    /// Bypasses the cooldown gate for an explicit operator request.
    pub async fn manual_recovery(&self, agents: &[(AgentId, String)]) {
        if self.recovery_in_progress.swap(true, Ordering::SeqCst) {
            return;
        }
        self.run_recovery(agents).await;
        self.recovery_in_progress.store(false, Ordering::SeqCst);
    }

    async fn run_recovery(&self, agents: &[(AgentId, String)]) {
        *self.last_recovery_at.lock().await = Some(std::time::Instant::now());

        let mut recovered = Vec::new();
        for (id, target) in agents {
            let status = self.agent_cache.get(id).await;
            if matches!(&status, Some(s) if s.emergency_stopped) {
                continue;
            }
            if matches!(status.as_ref().map(|s| s.status), Some(AgentStatusValue::Offline)) {
                if self.restart_agent(target).await.is_ok() {
                    recovered.push(id.clone());
                }
                tokio::time::sleep(Duration::from_millis(500)).await;
            }
        }

        self.events.publish(Event::AutoRecoveryPerformed { recovered: recovered.clone() });

        tokio::time::sleep(Duration::from_secs(30)).await;
        self.events
            .publish(Event::AutoRecoveryStatus { message: format!("recovered {} agent(s)", recovered.len()) });
    }

    /// Recreates the session if its pane is gone entirely, then launches
    /// the interpreter inside it.
    async fn restart_agent(&self, target: &str) -> Result<(), crate::pane::PaneError> {
        if !self.pane.pane_exists(target).await? {
            self.pane.spawn_session(target, RECOVERY_COLS, RECOVERY_ROWS).await?;
        }
        self.pane.send(target, &[Key::Literal("claude".to_string()), Key::Enter]).await
    }
}

#[cfg(test)]
#[path = "health_supervisor_tests.rs"]
mod tests;
