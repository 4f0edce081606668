// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent State Cache: the single owner of every agent's [`AgentStatus`].
//!
//! Applies the change filter from spec.md §4.4: an update is published
//! immediately if it materially differs from the current snapshot, or if
//! the debounce window has elapsed since the last publish; otherwise it
//! coalesces with any other update arriving inside the window, and only
//! the latest value is eventually sent.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{broadcast, Mutex, RwLock};

use crate::model::{AgentId, AgentStatus, Roster};

const BROADCAST_CAPACITY: usize = 256;

pub struct AgentCache {
    roster: RwLock<Roster>,
    tx: broadcast::Sender<AgentStatus>,
    generations: Mutex<HashMap<AgentId, Arc<AtomicU64>>>,
    last_published_at: Mutex<HashMap<AgentId, Instant>>,
    debounce_window: Duration,
}

impl AgentCache {
    pub fn new(roster: Roster, debounce_window: Duration) -> Arc<Self> {
        Arc::new(Self {
            roster: RwLock::new(roster),
            tx: broadcast::channel(BROADCAST_CAPACITY).0,
            generations: Mutex::new(HashMap::new()),
            last_published_at: Mutex::new(HashMap::new()),
            debounce_window,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AgentStatus> {
        self.tx.subscribe()
    }

    pub async fn get(&self, id: &AgentId) -> Option<AgentStatus> {
        self.roster.read().await.get(id).cloned()
    }

    pub async fn roster_snapshot(&self) -> Roster {
        self.roster.read().await.clone()
    }

    /// Applies an incoming status update, publishing immediately or
    /// scheduling a debounced publish per the change filter.
    pub async fn update(self: &Arc<Self>, next: AgentStatus) {
        let id = next.id.clone();

        let materially_differs = {
            let roster = self.roster.read().await;
            roster.get(&id).map(|cur| cur.differs_materially(&next)).unwrap_or(true)
        };

        {
            let mut roster = self.roster.write().await;
            roster.insert(next.clone());
        }

        let window_expired = {
            let last = self.last_published_at.lock().await;
            match last.get(&id) {
                Some(instant) => instant.elapsed() >= self.debounce_window,
                None => true,
            }
        };

        if materially_differs || window_expired {
            self.publish(id, next).await;
            return;
        }

        self.schedule_debounced_publish(id).await;
    }

    /// Bumps the agent's generation counter (superseding any in-flight
    /// debounce task for a stale value) and spawns a fresh one.
    async fn schedule_debounced_publish(self: &Arc<Self>, id: AgentId) {
        let gen_counter = {
            let mut gens = self.generations.lock().await;
            Arc::clone(gens.entry(id.clone()).or_insert_with(|| Arc::new(AtomicU64::new(0))))
        };
        let my_gen = gen_counter.fetch_add(1, Ordering::SeqCst) + 1;

        let cache = Arc::clone(self);
        let window = self.debounce_window;
        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            if gen_counter.load(Ordering::SeqCst) != my_gen {
                return;
            }
            let latest = cache.roster.read().await.get(&id).cloned();
            if let Some(latest) = latest {
                cache.publish(id, latest).await;
            }
        });
    }

    async fn publish(&self, id: AgentId, status: AgentStatus) {
        self.last_published_at.lock().await.insert(id, Instant::now());
        let _ = self.tx.send(status);
    }
}

#[cfg(test)]
#[path = "agent_cache_tests.rs"]
mod tests;
