// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::model::ActivityType;

fn sample_activity(desc: &str) -> ActivityInfo {
    ActivityInfo {
        activity_type: ActivityType::Coding,
        description: desc.to_string(),
        timestamp: 0,
        file_name: None,
        command: None,
    }
}

#[test]
fn digest_returns_short_text_unchanged() {
    assert_eq!(ClassifyCache::digest("short text"), "short text");
}

#[test]
fn digest_clips_long_text_to_head_and_tail() {
    let text = "a".repeat(500);
    let digest = ClassifyCache::digest(&text);
    assert!(digest.len() <= 100);
    assert!(digest.contains('…'));
}

#[test]
fn insert_then_get_round_trips() {
    let mut cache = ClassifyCache::new(10);
    cache.insert("key".to_string(), sample_activity("writing main.rs"), 0.9);
    let (info, confidence) = cache.get("key").unwrap();
    assert_eq!(info.description, "writing main.rs");
    assert_eq!(confidence, 0.9);
}

#[test]
fn get_on_missing_key_returns_none() {
    let mut cache = ClassifyCache::new(10);
    assert!(cache.get("nope").is_none());
}

#[test]
fn eviction_keeps_cache_at_or_under_capacity() {
    let mut cache = ClassifyCache::new(5);
    for i in 0..20 {
        cache.insert(format!("key-{i}"), sample_activity("desc"), 0.5);
    }
    assert!(cache.len() <= 5 + 1);
}

#[test]
fn due_for_pattern_reorder_after_100_hits() {
    let mut cache = ClassifyCache::new(10);
    cache.insert("key".to_string(), sample_activity("desc"), 0.5);
    for _ in 0..100 {
        cache.get("key");
    }
    assert!(cache.due_for_pattern_reorder());
    cache.reset_reorder_counter();
    assert!(!cache.due_for_pattern_reorder());
}
