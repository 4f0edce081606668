// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compiled regex tables for activity classification.

use regex::Regex;

use crate::model::ActivityType;

/// One entry in the priority-ordered pattern table.
pub struct PatternRule {
    pub regex: Regex,
    pub activity_type: ActivityType,
    pub priority: u32,
    /// Whether this rule also participates in the fast-path list (the
    /// 4-8 highest-frequency regexes tried before the full table).
    pub fast_path: bool,
}

/// The full classifier pattern set, grouped by semantic category. Error
/// regexes are checked separately and always win (spec.md §4.2.3).
pub struct PatternTable {
    pub rules: Vec<PatternRule>,
    pub error_patterns: Vec<Regex>,
    pub file_patterns: Vec<Regex>,
    pub command_prefixes: Vec<Regex>,
    pub known_tools: Vec<Regex>,
}

macro_rules! re {
    ($pat:expr) => {
        Regex::new($pat).unwrap_or_else(|e| {
            unreachable!("built-in classifier pattern {:?} failed to compile: {e}", $pat)
        })
    };
}

impl PatternTable {
    /// Builds the default, seeded pattern table. Rule order doubles as
    /// initial priority (earlier = higher), matching spec.md §4.2's
    /// "descending priority, first match wins" walk.
    pub fn standard() -> Self {
        let rules = vec![
            PatternRule {
                regex: re!(r"(?i)^\s*```"),
                activity_type: ActivityType::Coding,
                priority: 100,
                fast_path: true,
            },
            PatternRule {
                regex: re!(r"(?i)\bwriting\b|\bimplementing\b|\bedit(?:ing)?\b"),
                activity_type: ActivityType::Coding,
                priority: 95,
                fast_path: true,
            },
            PatternRule {
                regex: re!(r"(?i)\bcreating file\b|\bediting file\b|\breading file\b"),
                activity_type: ActivityType::FileOperation,
                priority: 90,
                fast_path: true,
            },
            PatternRule {
                regex: re!(r"(?i)\brunning\b|\bexecuting\b|\bstarting\b"),
                activity_type: ActivityType::CommandExecution,
                priority: 85,
                fast_path: true,
            },
            PatternRule {
                regex: re!(r"^[$#>]\s+\S"),
                activity_type: ActivityType::CommandExecution,
                priority: 80,
                fast_path: true,
            },
            PatternRule {
                regex: re!(r"(?i)\bthinking\b|\bplanning\b|\bconsidering\b|\banalyzing\b"),
                activity_type: ActivityType::Thinking,
                priority: 60,
                fast_path: true,
            },
            PatternRule {
                regex: re!(r"(?i)\btouch\b|\bcp\b|\bmv\b|\brm\b"),
                activity_type: ActivityType::FileOperation,
                priority: 50,
                fast_path: false,
            },
            PatternRule {
                regex: re!(r"(?i)\bnpm\b|\bcargo\b|\bgit\b|\bdocker\b|\bpip\b|\byarn\b"),
                activity_type: ActivityType::CommandExecution,
                priority: 45,
                fast_path: false,
            },
            PatternRule {
                regex: re!(r"(?i)waiting for input|idle|ready\s*$"),
                activity_type: ActivityType::Idle,
                priority: 10,
                fast_path: false,
            },
        ];

        let error_patterns = vec![
            re!(r"(?i)\berror\b"),
            re!(r"(?i)\bexception\b"),
            re!(r"(?i)\btraceback\b"),
            re!(r"(?i)\bfailed\b"),
            re!(r"(?i)panicked at"),
        ];

        let file_patterns = vec![
            re!(r#"["']([\w./-]+\.[a-zA-Z0-9]+)["']"#),
            re!(r"(?i)(?:creating|editing|reading) file:\s*(\S+)"),
            re!(r"(?i)\b(?:touch|cp|mv)\s+(\S+)"),
        ];

        let command_prefixes = vec![re!(r"^[$#>]\s+(.+)$"), re!(r"(?i)^(?:running|executing|starting):\s*(.+)$")];

        let known_tools = vec![
            re!(r"(?i)^(npm|yarn|pnpm|cargo|git|docker|pip|kubectl)\b.*"),
        ];

        Self { rules, error_patterns, file_patterns, command_prefixes, known_tools }
    }

    /// The fast-path subset, in priority order.
    pub fn fast_path(&self) -> impl Iterator<Item = &PatternRule> {
        self.rules.iter().filter(|r| r.fast_path)
    }

    /// The full table, already stored in descending-priority order.
    pub fn full(&self) -> impl Iterator<Item = &PatternRule> {
        self.rules.iter()
    }

    pub fn has_error(&self, text: &str) -> bool {
        self.error_patterns.iter().any(|re| re.is_match(text))
    }
}

impl Default for PatternTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
#[path = "patterns_tests.rs"]
mod tests;
