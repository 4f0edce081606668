// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduler / Ticker Kernel: the single process-wide owner of every
//! periodic timer (spec.md §4.10). Nothing outside this module calls
//! `tokio::time::interval` directly.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Hard deadline [`Scheduler::shutdown`] waits for each ticker's last
/// in-flight callback before abandoning it.
const SHUTDOWN_DEADLINE: Duration = Duration::from_secs(5);

struct Ticker {
    name: String,
    cancel: CancellationToken,
    paused: Arc<AtomicBool>,
    join: JoinHandle<()>,
}

/// Owns every periodic ticker in the process. Registration order is
/// preserved so [`Scheduler::shutdown`] can tear tickers down in reverse.
pub struct Scheduler {
    tickers: Mutex<Vec<Ticker>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self { tickers: Mutex::new(Vec::new()) }
    }

    /// Registers a named periodic ticker. `initial_delay`, if set, is
    /// waited out once before the first tick (the completion detector's
    /// ~10s warm-up). The callback is skipped, not queued, while the
    /// ticker is paused.
    pub async fn register<F, Fut>(&self, name: impl Into<String>, period: Duration, initial_delay: Option<Duration>, mut callback: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let name = name.into();
        let cancel = CancellationToken::new();
        let paused = Arc::new(AtomicBool::new(false));

        let task_cancel = cancel.clone();
        let task_paused = Arc::clone(&paused);
        let join = tokio::spawn(async move {
            if let Some(delay) = initial_delay {
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = task_cancel.cancelled() => return,
                }
            }

            let mut interval = tokio::time::interval(period);
            interval.tick().await; // first tick fires immediately; consume it

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        if !task_paused.load(Ordering::SeqCst) {
                            callback().await;
                        }
                    }
                    _ = task_cancel.cancelled() => break,
                }
            }
        });

        self.tickers.lock().await.push(Ticker { name, cancel, paused, join });
    }

    /// Cancels and re-registers a ticker under the same name with a new
    /// period — the adaptive-interval restart the Health Supervisor needs
    /// when it switches between its active and idle cadence.
    pub async fn reschedule<F, Fut>(&self, name: impl Into<String>, period: Duration, initial_delay: Option<Duration>, callback: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let name = name.into();
        self.cancel(&name).await;
        self.register(name, period, initial_delay, callback).await;
    }

    /// Pauses a ticker: its clock keeps running but callbacks are
    /// skipped. Returns `false` if no ticker by that name is registered.
    pub async fn pause(&self, name: &str) -> bool {
        self.with_ticker(name, |t| t.paused.store(true, Ordering::SeqCst)).await
    }

    pub async fn resume(&self, name: &str) -> bool {
        self.with_ticker(name, |t| t.paused.store(false, Ordering::SeqCst)).await
    }

    /// Cancels and removes a ticker without waiting for its task to
    /// finish; the loop exits at its next `select!` poll.
    pub async fn cancel(&self, name: &str) -> bool {
        let mut tickers = self.tickers.lock().await;
        let Some(pos) = tickers.iter().position(|t| t.name == name) else {
            return false;
        };
        let ticker = tickers.remove(pos);
        ticker.cancel.cancel();
        true
    }

    async fn with_ticker(&self, name: &str, f: impl FnOnce(&Ticker)) -> bool {
        let tickers = self.tickers.lock().await;
        match tickers.iter().find(|t| t.name == name) {
            Some(ticker) => {
                f(ticker);
                true
            }
            None => false,
        }
    }

    /// Tears every ticker down in reverse registration order, waiting up
    /// to [`SHUTDOWN_DEADLINE`] total for in-flight callbacks to finish.
    pub async fn shutdown(&self) {
        let drained: Vec<Ticker> = self.tickers.lock().await.drain(..).collect();
        let deadline = tokio::time::Instant::now() + SHUTDOWN_DEADLINE;

        for ticker in drained.into_iter().rev() {
            ticker.cancel.cancel();
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            let _ = tokio::time::timeout(remaining, ticker.join).await;
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
