// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! LRU-ish classification cache keyed on a digest of cleaned output text.
//!
//! No generic cache crate is used here — this is hand-rolled bookkeeping
//! over a `HashMap`, in the same register as the rest of the in-memory
//! state in this crate.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::model::ActivityInfo;

/// Entries older than this are dropped outright regardless of hit rate.
const ENTRY_TTL: Duration = Duration::from_secs(5 * 60);

/// Fraction of entries removed by one eviction pass, expressed as the
/// numerator/denominator of the range spec.md §4.2 gives (25-40%); we take
/// the midpoint.
const EVICTION_FRACTION: f64 = 0.33;

#[derive(Debug, Clone)]
struct CacheEntry {
    result: ActivityInfo,
    confidence: f32,
    created_at: Instant,
    hit_count: u64,
    last_accessed: Instant,
    size: usize,
}

/// Classification result cache, keyed by a digest of the cleaned input.
pub struct ClassifyCache {
    entries: HashMap<String, CacheEntry>,
    capacity: usize,
    hits_since_reorder: u64,
}

impl ClassifyCache {
    pub fn new(capacity: usize) -> Self {
        Self { entries: HashMap::new(), capacity, hits_since_reorder: 0 }
    }

    /// Computes the cache key for a cleaned text: the text itself when
    /// short, otherwise `first-half … last-half` clipped to 100 chars.
    pub fn digest(text: &str) -> String {
        const CLIP: usize = 100;
        if text.len() <= CLIP {
            return text.to_string();
        }
        let half = CLIP / 2 - 2;
        let chars: Vec<char> = text.chars().collect();
        let head: String = chars.iter().take(half).collect();
        let tail: String = chars.iter().rev().take(half).collect::<Vec<_>>().into_iter().rev().collect();
        format!("{head}…{tail}")
    }

    /// Looks up a cached classification, bumping its hit/recency stats.
    /// Expired entries are evicted lazily on lookup.
    pub fn get(&mut self, key: &str) -> Option<(ActivityInfo, f32)> {
        let expired = matches!(self.entries.get(key), Some(e) if e.created_at.elapsed() > ENTRY_TTL);
        if expired {
            self.entries.remove(key);
            return None;
        }
        let entry = self.entries.get_mut(key)?;
        entry.hit_count += 1;
        entry.last_accessed = Instant::now();
        self.hits_since_reorder += 1;
        Some((entry.result.clone(), entry.confidence))
    }

    /// Inserts a freshly computed classification, evicting if over capacity.
    pub fn insert(&mut self, key: String, result: ActivityInfo, confidence: f32) {
        let size = key.len() + result.description.len();
        self.entries.insert(
            key,
            CacheEntry { result, confidence, created_at: Instant::now(), hit_count: 0, last_accessed: Instant::now(), size },
        );
        if self.entries.len() > self.capacity {
            self.evict();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether usage statistics have accumulated enough hits that pattern
    /// order could be reconsidered (spec.md §4.2: "every 100 hits").
    pub fn due_for_pattern_reorder(&self) -> bool {
        self.hits_since_reorder >= 100
    }

    pub fn reset_reorder_counter(&mut self) {
        self.hits_since_reorder = 0;
    }

    /// Removes the lowest-ranked ~33% of entries by `recency × (1/hitRate)`
    /// — larger score means staler and less-hit, so the highest-scoring
    /// entries are evicted first. Size-weighted: among near-tied scores,
    /// larger entries are preferred for eviction under memory pressure.
    fn evict(&mut self) {
        let now = Instant::now();
        let mut scored: Vec<(String, f64, usize)> = self
            .entries
            .iter()
            .map(|(key, entry)| {
                let age_secs = now.duration_since(entry.last_accessed).as_secs_f64();
                let hit_rate = (entry.hit_count as f64) + 1.0;
                let score = age_secs * (1.0 / hit_rate);
                (key.clone(), score, entry.size)
            })
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal).then(b.2.cmp(&a.2))
        });

        let evict_count = ((scored.len() as f64) * EVICTION_FRACTION).ceil() as usize;
        for (key, _, _) in scored.into_iter().take(evict_count) {
            self.entries.remove(&key);
        }
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
