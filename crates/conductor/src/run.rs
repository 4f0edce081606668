// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Top-level process runner — shared by `main` and integration tests.

use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::config::Config;
use crate::transport::build_router;

/// Initialize tracing from config. Uses `try_init` so it is safe to call
/// more than once (e.g. from tests).
pub fn init_tracing(config: &Config) {
    use tracing_subscriber::fmt;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let result = match config.log_format.as_str() {
        "json" => fmt::fmt().with_env_filter(filter).json().try_init(),
        _ => fmt::fmt().with_env_filter(filter).try_init(),
    };
    drop(result);
}

/// Runs the orchestrator to completion: wires the core, starts its
/// tickers, serves HTTP/WebSocket traffic, and tears down cleanly on
/// SIGINT/SIGTERM.
pub async fn run(config: Config) -> anyhow::Result<()> {
    init_tracing(&config);
    config.validate()?;

    let addr = format!("{}:{}", config.host, config.port);
    let origin = config.origin.clone();
    let static_dir = config.production.then(|| config.static_dir.clone());

    let app = App::new(config);
    app.start().await?;

    let static_dir_ref = static_dir.as_deref();
    let router = build_router(app.clone(), &origin, static_dir_ref);
    let listener = TcpListener::bind(&addr).await?;
    info!("conductor listening on {}", listener.local_addr()?);

    let result = axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await;
    if let Err(e) = result {
        error!("HTTP server error: {e}");
    }

    app.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        let Ok(mut sig) = signal::unix::signal(signal::unix::SignalKind::terminate()) else {
            return;
        };
        sig.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
