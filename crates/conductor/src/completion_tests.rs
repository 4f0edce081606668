// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use super::*;

fn minutes_ago(minutes: u64) -> u64 {
    now_ms().saturating_sub(minutes * 60 * 1000)
}

#[test]
fn president_strict_match_requires_minimum_duration() {
    let detector = CompletionDetector::new(Duration::from_secs(120));
    let too_soon = detector.check_president("The task is now complete.", minutes_ago(1));
    assert!(too_soon.is_none());

    let long_enough = detector.check_president("The task is now complete.", minutes_ago(5));
    assert!(long_enough.is_some());
}

#[test]
fn worker_match_rejects_excluded_negations() {
    let detector = CompletionDetector::new(Duration::from_secs(120));
    let negated = detector.check_worker("This is not yet completed, still working.", minutes_ago(5));
    assert!(negated.is_none());

    let question = detector.check_worker("Is this complete? checking now.", minutes_ago(5));
    assert!(question.is_none());
}

#[test]
fn worker_match_accepts_plain_completion_language() {
    let detector = CompletionDetector::new(Duration::from_secs(120));
    let signal = detector.check_worker("All done, the feature is finished.", minutes_ago(5));
    assert!(signal.is_some());
    assert_eq!(signal.unwrap().elapsed_minutes, 5);
}

#[test]
fn president_general_patterns_do_not_satisfy_the_strict_pass() {
    let detector = CompletionDetector::new(Duration::from_secs(120));
    // "done" alone is a general-pass word, not a strict presidential claim.
    let signal = detector.check_president("I'm done for now, taking a break.", minutes_ago(5));
    assert!(signal.is_none());
}
