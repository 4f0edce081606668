// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Activity classifier: maps cleaned terminal output to an [`ActivityInfo`]
//! plus a confidence score.

mod cache;
mod patterns;

use cache::ClassifyCache;
pub use patterns::PatternTable;

use crate::model::{now_ms, ActivityInfo, ActivityType};

/// Default cache capacity before an eviction pass runs.
const DEFAULT_CACHE_CAPACITY: usize = 2048;

pub struct Classifier {
    patterns: PatternTable,
    cache: ClassifyCache,
}

impl Classifier {
    pub fn new() -> Self {
        Self { patterns: PatternTable::standard(), cache: ClassifyCache::new(DEFAULT_CACHE_CAPACITY) }
    }

    /// Strips ANSI escapes and collapses whitespace, matching the cleaning
    /// step the classifier expects as input (spec.md §4.2).
    pub fn clean(raw: &str) -> String {
        let ansi_stripped = strip_ansi(raw);
        let collapsed: Vec<&str> = ansi_stripped.split_whitespace().collect();
        collapsed.join(" ")
    }

    /// Whether any error pattern matches the cleaned text. Error states are
    /// never "working" — callers that see `true` here should not also
    /// report the agent as actively coding.
    pub fn has_error(&self, cleaned: &str) -> bool {
        self.patterns.has_error(cleaned)
    }

    /// Classifies a cleaned output string, returning the activity plus a
    /// confidence score in `[0, 1]`. Cached by a digest of `cleaned`.
    pub fn classify(&mut self, cleaned: &str) -> (ActivityInfo, f32) {
        let key = ClassifyCache::digest(cleaned);
        if let Some(hit) = self.cache.get(&key) {
            return hit;
        }

        let result = self.classify_uncached(cleaned);
        self.cache.insert(key, result.0.clone(), result.1);
        result
    }

    fn classify_uncached(&self, cleaned: &str) -> (ActivityInfo, f32) {
        if self.patterns.has_error(cleaned) {
            return (self.build_activity(ActivityType::Idle, cleaned, "error detected"), 1.0);
        }

        let max_priority = self.patterns.full().map(|r| r.priority).max().unwrap_or(1) as f32;

        let matched = self
            .patterns
            .fast_path()
            .find(|rule| rule.regex.is_match(cleaned))
            .or_else(|| self.patterns.full().find(|rule| rule.regex.is_match(cleaned)));

        let Some(rule) = matched else {
            return (self.build_activity(ActivityType::Idle, cleaned, "idle"), 0.1);
        };

        let mut confidence = rule.priority as f32 / max_priority;

        let file_name = self.extract_file_name(cleaned);
        let command = self.extract_command(cleaned);

        if file_name.is_some() {
            confidence += 0.15;
        }
        if command.is_some() {
            confidence += 0.10;
        }
        if rule.activity_type == ActivityType::Coding && cleaned.contains("```") {
            confidence += 0.05;
        }

        let description = describe(rule.activity_type, cleaned);
        (
            ActivityInfo {
                activity_type: rule.activity_type,
                description,
                timestamp: now_ms(),
                file_name,
                command,
            },
            confidence.min(1.0),
        )
    }

    fn build_activity(&self, activity_type: ActivityType, cleaned: &str, description: &str) -> ActivityInfo {
        ActivityInfo {
            activity_type,
            description: if description.is_empty() { describe(activity_type, cleaned) } else { description.to_string() },
            timestamp: now_ms(),
            file_name: None,
            command: None,
        }
    }

    /// Tries each file-name pattern in priority order; rejects matches
    /// shorter than 2 characters as noise.
    fn extract_file_name(&self, cleaned: &str) -> Option<String> {
        for pattern in &self.patterns.file_patterns {
            if let Some(captures) = pattern.captures(cleaned) {
                if let Some(m) = captures.get(1).or_else(|| captures.get(0)) {
                    let candidate = m.as_str().trim();
                    if candidate.len() > 2 && (candidate.contains('.') || candidate.contains('/')) {
                        return Some(candidate.to_string());
                    }
                }
            }
        }
        None
    }

    /// Tries shell-prompt and known-tool patterns; rejects commands of
    /// two characters or fewer.
    fn extract_command(&self, cleaned: &str) -> Option<String> {
        for pattern in &self.patterns.command_prefixes {
            if let Some(captures) = pattern.captures(cleaned) {
                if let Some(m) = captures.get(1) {
                    let candidate = m.as_str().trim();
                    if candidate.len() > 2 {
                        return Some(candidate.to_string());
                    }
                }
            }
        }
        for pattern in &self.patterns.known_tools {
            if let Some(m) = pattern.find(cleaned) {
                let candidate = m.as_str().trim();
                if candidate.len() > 2 {
                    return Some(candidate.to_string());
                }
            }
        }
        None
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

fn describe(activity_type: ActivityType, cleaned: &str) -> String {
    let excerpt: String = cleaned.chars().take(80).collect();
    match activity_type {
        ActivityType::Coding => format!("coding: {excerpt}"),
        ActivityType::FileOperation => format!("file operation: {excerpt}"),
        ActivityType::CommandExecution => format!("running command: {excerpt}"),
        ActivityType::Thinking => format!("thinking: {excerpt}"),
        ActivityType::Idle => "idle".to_string(),
    }
}

fn strip_ansi(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\u{1b}' {
            if chars.peek() == Some(&'[') {
                chars.next();
                for next in chars.by_ref() {
                    if next.is_ascii_alphabetic() {
                        break;
                    }
                }
            }
            continue;
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
