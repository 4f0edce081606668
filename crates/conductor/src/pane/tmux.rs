// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use super::{Key, PaneAdapter, PaneError};

/// Drives a real `tmux` server. Every call is one `tokio::process::Command`
/// invocation bounded by `timeout`; no state is cached between calls, and
/// failures never panic — they resolve to a [`PaneError`].
pub struct TmuxPaneAdapter {
    socket: Option<String>,
    timeout: Duration,
}

impl TmuxPaneAdapter {
    pub fn new(timeout: Duration) -> Self {
        Self { socket: None, timeout }
    }

    pub fn with_socket(mut self, socket: impl Into<String>) -> Self {
        self.socket = Some(socket.into());
        self
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new("tmux");
        if let Some(socket) = &self.socket {
            cmd.arg("-S").arg(socket);
        }
        cmd
    }

    async fn run(&self, args: &[&str]) -> Result<std::process::Output, PaneError> {
        let mut cmd = self.command();
        cmd.args(args).stdout(Stdio::piped()).stderr(Stdio::piped());
        match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => Err(PaneError::Io(e.to_string())),
            Err(_) => Err(PaneError::Timeout(args.join(" "))),
        }
    }

    fn key_args(key: &Key) -> Vec<String> {
        match key {
            Key::Literal(s) => vec!["-l".to_string(), s.clone()],
            Key::Escape => vec!["Escape".to_string()],
            Key::Enter => vec!["Enter".to_string()],
            Key::CtrlC => vec!["C-c".to_string()],
        }
    }
}

#[async_trait]
impl PaneAdapter for TmuxPaneAdapter {
    async fn list_sessions(&self) -> Result<Vec<String>, PaneError> {
        let output = self.run(&["list-sessions", "-F", "#{session_name}"]).await?;
        if !output.status.success() {
            // `tmux list-sessions` exits nonzero (with "no server running")
            // when no sessions exist at all; treat that as an empty list.
            return Ok(Vec::new());
        }
        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::to_string)
            .filter(|s| !s.is_empty())
            .collect())
    }

    async fn pane_exists(&self, target: &str) -> Result<bool, PaneError> {
        let output = self.run(&["has-session", "-t", target]).await?;
        Ok(output.status.success())
    }

    async fn capture(&self, target: &str, lines: u32) -> Result<String, PaneError> {
        let start = format!("-{lines}");
        let output =
            self.run(&["capture-pane", "-p", "-e", "-t", target, "-S", &start]).await?;
        if !output.status.success() {
            return Err(PaneError::NotFound(target.to_string()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn send(&self, target: &str, keys: &[Key]) -> Result<(), PaneError> {
        for key in keys {
            let key_args = Self::key_args(key);
            let mut args = vec!["send-keys", "-t", target];
            args.extend(key_args.iter().map(String::as_str));
            let output = self.run(&args).await?;
            if !output.status.success() {
                return Err(PaneError::NotFound(target.to_string()));
            }
        }
        Ok(())
    }

    async fn resize(&self, target: &str, cols: u16, rows: u16) -> Result<(), PaneError> {
        let cols = cols.to_string();
        let rows = rows.to_string();
        let output =
            self.run(&["resize-pane", "-t", target, "-x", &cols, "-y", &rows]).await?;
        if !output.status.success() {
            return Err(PaneError::NotFound(target.to_string()));
        }
        Ok(())
    }

    async fn spawn_session(&self, target: &str, cols: u16, rows: u16) -> Result<(), PaneError> {
        if self.pane_exists(target).await? {
            return Ok(());
        }
        let cols = cols.to_string();
        let rows = rows.to_string();
        let output = self
            .run(&["new-session", "-d", "-s", target, "-x", &cols, "-y", &rows])
            .await?;
        if !output.status.success() {
            return Err(PaneError::Io(String::from_utf8_lossy(&output.stderr).into_owned()));
        }
        Ok(())
    }

    async fn kill_session(&self, target: &str) -> Result<(), PaneError> {
        if !self.pane_exists(target).await? {
            return Ok(());
        }
        let output = self.run(&["kill-session", "-t", target]).await?;
        if !output.status.success() {
            return Err(PaneError::Io(String::from_utf8_lossy(&output.stderr).into_owned()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tmux_tests.rs"]
mod tests;
