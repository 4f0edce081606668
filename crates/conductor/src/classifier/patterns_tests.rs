// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn fast_path_is_a_strict_subset_of_the_full_table() {
    let table = PatternTable::standard();
    let fast_count = table.fast_path().count();
    let full_count = table.full().count();
    assert!(fast_count > 0);
    assert!(fast_count < full_count);
}

#[test]
fn has_error_matches_common_failure_language() {
    let table = PatternTable::standard();
    assert!(table.has_error("Error: could not compile crate"));
    assert!(table.has_error("thread panicked at src/main.rs"));
    assert!(!table.has_error("Writing src/main.rs"));
}

#[test]
fn rules_are_stored_in_descending_priority_order() {
    let table = PatternTable::standard();
    let priorities: Vec<u32> = table.full().map(|r| r.priority).collect();
    let mut sorted = priorities.clone();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    assert_eq!(priorities, sorted);
}
