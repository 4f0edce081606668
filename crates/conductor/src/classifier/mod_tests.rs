// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn clean_strips_ansi_and_collapses_whitespace() {
    let raw = "\u{1b}[31mError\u{1b}[0m:   too   many   spaces";
    assert_eq!(Classifier::clean(raw), "Error: too many spaces");
}

#[test]
fn has_error_detects_error_language() {
    let classifier = Classifier::new();
    assert!(classifier.has_error("Error: build failed"));
    assert!(!classifier.has_error("Writing output.rs"));
}

#[test]
fn classify_routes_error_text_to_idle() {
    let mut classifier = Classifier::new();
    let (info, confidence) = classifier.classify("Traceback (most recent call last): oops");
    assert_eq!(info.activity_type, ActivityType::Idle);
    assert_eq!(confidence, 1.0);
}

#[test]
fn classify_detects_file_operation_with_extracted_name() {
    let mut classifier = Classifier::new();
    let (info, _) = classifier.classify("Creating file: src/main.rs now");
    assert_eq!(info.activity_type, ActivityType::FileOperation);
    assert!(info.file_name.is_some());
}

#[test]
fn classify_detects_command_execution_with_extracted_command() {
    let mut classifier = Classifier::new();
    let (info, _) = classifier.classify("$ cargo build --release");
    assert_eq!(info.activity_type, ActivityType::CommandExecution);
    assert!(info.command.is_some());
}

#[test]
fn classify_falls_back_to_idle_when_nothing_matches() {
    let mut classifier = Classifier::new();
    let (info, confidence) = classifier.classify("zzz completely unrecognized zzz");
    assert_eq!(info.activity_type, ActivityType::Idle);
    assert!(confidence < 0.5);
}

#[test]
fn classify_is_cached_on_repeat_calls() {
    let mut classifier = Classifier::new();
    classifier.classify("Writing main.rs");
    assert_eq!(classifier.cache_len(), 1);
    classifier.classify("Writing main.rs");
    assert_eq!(classifier.cache_len(), 1);
}

#[test]
fn short_commands_are_rejected_as_noise() {
    let classifier = Classifier::new();
    assert!(classifier.extract_command("$ ls").is_none());
}
