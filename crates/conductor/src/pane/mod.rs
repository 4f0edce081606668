// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pane I/O adapter: the only component that talks to the terminal
//! multiplexer. Every other component sees named targets and text.

mod tmux;

pub use tmux::TmuxPaneAdapter;

use async_trait::async_trait;

/// One keystroke token sent to a pane. `Literal` strings and the two
/// named keys are dispatched as independent `send-keys` invocations —
/// the host multiplexer does not reliably interpret them batched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Literal(String),
    Escape,
    Enter,
    CtrlC,
}

#[derive(Debug, thiserror::Error)]
pub enum PaneError {
    #[error("pane {0:?} not found")]
    NotFound(String),
    #[error("operation on pane {0:?} timed out")]
    Timeout(String),
    #[error("io error talking to multiplexer: {0}")]
    Io(String),
}

impl From<PaneError> for crate::error::Rejection {
    fn from(err: PaneError) -> Self {
        use crate::error::ErrorCode;
        match err {
            PaneError::NotFound(target) => Self::new(ErrorCode::NotFound, format!("pane {target:?} not found")),
            PaneError::Timeout(op) => Self::new(ErrorCode::Timeout, format!("pane operation timed out: {op}")),
            PaneError::Io(msg) => Self::new(ErrorCode::Internal, format!("pane io error: {msg}")),
        }
    }
}

/// Capabilities required of a terminal multiplexer. Implemented against a
/// real `tmux` binary by [`TmuxPaneAdapter`]; mockable for tests.
#[async_trait]
pub trait PaneAdapter: Send + Sync {
    /// Lists live session names.
    async fn list_sessions(&self) -> Result<Vec<String>, PaneError>;

    /// Whether a named pane/target currently exists.
    async fn pane_exists(&self, target: &str) -> Result<bool, PaneError>;

    /// Captures the last `lines` lines of a pane's scrollback, bounded by
    /// the adapter's configured timeout.
    async fn capture(&self, target: &str, lines: u32) -> Result<String, PaneError>;

    /// Sends an ordered list of keys to a pane, each as an independent
    /// operation.
    async fn send(&self, target: &str, keys: &[Key]) -> Result<(), PaneError>;

    /// Resizes a pane, best-effort.
    async fn resize(&self, target: &str, cols: u16, rows: u16) -> Result<(), PaneError>;

    /// Creates a detached session named `target`, sized `cols` x `rows`.
    /// A no-op if the session already exists.
    async fn spawn_session(&self, target: &str, cols: u16, rows: u16) -> Result<(), PaneError>;

    /// Tears down a session. A no-op if the session does not exist.
    async fn kill_session(&self, target: &str) -> Result<(), PaneError>;
}
