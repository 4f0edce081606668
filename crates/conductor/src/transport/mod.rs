// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! API contract types and server implementation for HTTP and WebSocket
//! transports.

pub mod http;
pub mod ws;
pub mod ws_msg;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::app::App;
use crate::error::ErrorCode;

/// Top-level error response envelope shared across HTTP and WebSocket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ErrorCode {
    pub fn to_error_body(&self, message: impl Into<String>) -> ErrorBody {
        ErrorBody { code: self.as_str().to_owned(), message: message.into() }
    }

    pub fn to_http_response(&self, message: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
        let status = StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErrorResponse { error: self.to_error_body(message) }))
    }
}

/// Builds the axum `Router` with every HTTP and WebSocket route
/// (spec.md §6). `static_dir` serves a built front-end when `--production`
/// is set; `None` leaves the API-only surface.
pub fn build_router(app: Arc<App>, origin: &str, static_dir: Option<&str>) -> Router {
    let cors = origin
        .parse()
        .map(|origin| CorsLayer::new().allow_origin(tower_http::cors::AllowOrigin::exact(origin)).allow_methods(tower_http::cors::Any).allow_headers(tower_http::cors::Any))
        .unwrap_or_else(|_| CorsLayer::permissive());

    let mut router = Router::new()
        .route("/api/tasks", get(http::tasks::list_tasks))
        .route("/api/tasks/{id}/project-name", patch(http::tasks::patch_project_name))
        .route("/api/tasks/{id}/assigned-to", patch(http::tasks::patch_assigned_to))
        .route("/api/tasks/{id}/metadata", patch(http::tasks::patch_metadata))
        .route("/api/complete-task", post(http::tasks::complete_task))
        .route("/api/kpi-metrics", get(http::analytics::kpi_metrics))
        .route("/api/agent-performance", get(http::analytics::agent_performance))
        .route("/api/task-trend", get(http::analytics::task_trend))
        .route("/api/system-health", get(http::agents::system_health))
        .route("/api/agents", get(http::agents::list_agents))
        .route("/api/terminal/{agent}", get(http::agents::terminal))
        .route("/api/agents/start-all", post(http::agents::start_all))
        .route("/api/agents/{name}/start", post(http::agents::start_agent))
        .route("/api/agents/{name}/message", post(http::agents::message_agent))
        .route("/api/projects/{name}/files", get(http::projects::files))
        .route("/api/projects/{name}/download/zip", get(http::projects::download_zip))
        .route("/api/tmux/setup", post(http::control::tmux_setup))
        .route("/ws", get(ws::ws_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app);

    if let Some(static_dir) = static_dir {
        let index = format!("{static_dir}/index.html");
        router = router.fallback_service(ServeDir::new(static_dir).fallback(ServeFile::new(index)));
    }

    router
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
