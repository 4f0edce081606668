// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use clap::Parser;

/// Multi-agent task orchestrator.
#[derive(Debug, Parser, Clone)]
#[command(name = "conductor", version, about)]
pub struct Config {
    /// HTTP port to listen on.
    #[arg(long, env = "CONDUCTOR_PORT", default_value = "3001")]
    pub port: u16,

    /// Host address to bind to.
    #[arg(long, env = "CONDUCTOR_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Allowed front-end origin for CORS.
    #[arg(long, env = "CONDUCTOR_ORIGIN", default_value = "http://localhost:3000")]
    pub origin: String,

    /// Serve static assets from a build directory (production mode).
    #[arg(long, env = "CONDUCTOR_PRODUCTION", default_value = "false")]
    pub production: bool,

    /// Static asset directory, used only when `--production` is set.
    #[arg(long, env = "CONDUCTOR_STATIC_DIR", default_value = "dist")]
    pub static_dir: String,

    /// tmux socket path. `None` uses the default per-user server.
    #[arg(long, env = "CONDUCTOR_TMUX_SOCKET")]
    pub tmux_socket: Option<String>,

    /// Log format (json or text).
    #[arg(long, env = "CONDUCTOR_LOG_FORMAT", default_value = "json")]
    pub log_format: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "CONDUCTOR_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[command(flatten)]
    pub monitoring: MonitoringConfig,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.production && self.static_dir.trim().is_empty() {
            anyhow::bail!("--static-dir must be set when --production is enabled");
        }
        self.monitoring.validate()
    }
}

/// Recognized monitoring tunables from spec.md §6, grouped as a single
/// reloadable configuration object (`update-monitoring-config`).
#[derive(Debug, Parser, Clone, Copy)]
pub struct MonitoringConfig {
    /// Health Supervisor cadence while no agent is working, in ms.
    #[arg(long, env = "CONDUCTOR_IDLE_CHECK_MS", default_value = "15000")]
    pub idle_check_interval_ms: u64,

    /// Health Supervisor cadence while at least one agent is working, in ms.
    #[arg(long, env = "CONDUCTOR_ACTIVE_CHECK_MS", default_value = "5000")]
    pub active_check_interval_ms: u64,

    /// Agent State Cache debounce window, in ms.
    #[arg(long, env = "CONDUCTOR_ACTIVITY_DEBOUNCE_MS", default_value = "500")]
    pub activity_debounce_ms: u64,

    /// How long an agent may go without new output before it is treated as idle, in ms.
    #[arg(long, env = "CONDUCTOR_IDLE_TIMEOUT_MS", default_value = "120000")]
    pub idle_timeout_ms: u64,

    /// Minimum time a task must be in-progress before completion can be accepted, in minutes.
    #[arg(long, env = "CONDUCTOR_COMPLETION_MINIMUM_MINUTES", default_value = "2")]
    pub completion_minimum_minutes: u64,

    /// Completion Detector cadence, in ms.
    #[arg(long, env = "CONDUCTOR_COMPLETION_CADENCE_MS", default_value = "45000")]
    pub completion_cadence_ms: u64,

    /// Task cache refresh cadence, in ms.
    #[arg(long, env = "CONDUCTOR_CACHE_REFRESH_MS", default_value = "30000")]
    pub cache_refresh_ms: u64,

    /// Dispatch loop cadence, in ms.
    #[arg(long, env = "CONDUCTOR_DISPATCH_CADENCE_MS", default_value = "30000")]
    pub dispatch_cadence_ms: u64,

    /// Usage-limit resolution check cadence, in ms.
    #[arg(long, env = "CONDUCTOR_USAGE_LIMIT_CHECK_MS", default_value = "60000")]
    pub usage_limit_check_ms: u64,

    /// Minimum time between auto-recovery attempts, in ms.
    #[arg(long, env = "CONDUCTOR_RECOVERY_COOLDOWN_MS", default_value = "300000")]
    pub recovery_cooldown_ms: u64,

    /// Pane capture/send timeout, in ms.
    #[arg(long, env = "CONDUCTOR_CAPTURE_TIMEOUT_MS", default_value = "5000")]
    pub capture_timeout_ms: u64,

    /// Maximum lines captured from a pane per poll.
    #[arg(long, env = "CONDUCTOR_MAX_CAPTURE_LINES", default_value = "100")]
    pub max_capture_lines: u32,

    /// Default backoff applied when a usage-limit message carries no
    /// explicit retry time, in ms. Resolves the open question in
    /// SPEC_FULL.md §9.
    #[arg(long, env = "CONDUCTOR_DEFAULT_USAGE_LIMIT_BACKOFF_MS", default_value = "18000000")]
    pub default_usage_limit_backoff_ms: u64,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            idle_check_interval_ms: 15_000,
            active_check_interval_ms: 5_000,
            activity_debounce_ms: 500,
            idle_timeout_ms: 120_000,
            completion_minimum_minutes: 2,
            completion_cadence_ms: 45_000,
            cache_refresh_ms: 30_000,
            dispatch_cadence_ms: 30_000,
            usage_limit_check_ms: 60_000,
            recovery_cooldown_ms: 300_000,
            capture_timeout_ms: 5_000,
            max_capture_lines: 100,
            default_usage_limit_backoff_ms: 18_000_000,
        }
    }
}

impl MonitoringConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_capture_lines == 0 {
            anyhow::bail!("--max-capture-lines must be greater than zero");
        }
        if self.completion_cadence_ms == 0 || self.dispatch_cadence_ms == 0 {
            anyhow::bail!("ticker cadences must be greater than zero");
        }
        Ok(())
    }

    pub fn idle_check_interval(&self) -> Duration {
        Duration::from_millis(self.idle_check_interval_ms)
    }

    pub fn active_check_interval(&self) -> Duration {
        Duration::from_millis(self.active_check_interval_ms)
    }

    pub fn activity_debounce(&self) -> Duration {
        Duration::from_millis(self.activity_debounce_ms)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    pub fn completion_minimum(&self) -> Duration {
        Duration::from_secs(self.completion_minimum_minutes * 60)
    }

    pub fn completion_cadence(&self) -> Duration {
        Duration::from_millis(self.completion_cadence_ms)
    }

    pub fn cache_refresh(&self) -> Duration {
        Duration::from_millis(self.cache_refresh_ms)
    }

    pub fn dispatch_cadence(&self) -> Duration {
        Duration::from_millis(self.dispatch_cadence_ms)
    }

    pub fn usage_limit_check(&self) -> Duration {
        Duration::from_millis(self.usage_limit_check_ms)
    }

    pub fn recovery_cooldown(&self) -> Duration {
        Duration::from_millis(self.recovery_cooldown_ms)
    }

    pub fn capture_timeout(&self) -> Duration {
        Duration::from_millis(self.capture_timeout_ms)
    }

    pub fn default_usage_limit_backoff(&self) -> Duration {
        Duration::from_millis(self.default_usage_limit_backoff_ms)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
