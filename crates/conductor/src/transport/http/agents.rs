// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent roster, terminal, and control HTTP handlers.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::app::App;

/// `GET /api/system-health`
pub async fn system_health(State(app): State<Arc<App>>) -> impl IntoResponse {
    match app.system_health().await {
        Some(health) => Json(health).into_response(),
        None => axum::http::StatusCode::SERVICE_UNAVAILABLE.into_response(),
    }
}

/// `GET /api/agents`
pub async fn list_agents(State(app): State<Arc<App>>) -> impl IntoResponse {
    Json(app.agent_statuses().await).into_response()
}

#[derive(Debug, Clone, Deserialize)]
pub struct TerminalQuery {
    pub lines: Option<u32>,
}

/// `GET /api/terminal/:agent`
pub async fn terminal(State(app): State<Arc<App>>, Path(agent): Path<String>, Query(query): Query<TerminalQuery>) -> impl IntoResponse {
    let lines = query.lines.unwrap_or(200);
    match app.capture_terminal(&agent, lines).await {
        Ok(text) => text.into_response(),
        Err(e) => e.code.to_http_response(e.message).into_response(),
    }
}

/// `POST /api/agents/start-all`
pub async fn start_all(State(app): State<Arc<App>>) -> impl IntoResponse {
    match app.start_all_agents().await {
        Ok(()) => axum::http::StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.code.to_http_response(e.message).into_response(),
    }
}

/// `POST /api/agents/:name/start`
pub async fn start_agent(State(app): State<Arc<App>>, Path(name): Path<String>) -> impl IntoResponse {
    match app.start_agent(&name).await {
        Ok(()) => axum::http::StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.code.to_http_response(e.message).into_response(),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageAgentBody {
    pub message: String,
}

/// `POST /api/agents/:name/message`
pub async fn message_agent(
    State(app): State<Arc<App>>,
    Path(name): Path<String>,
    Json(body): Json<MessageAgentBody>,
) -> impl IntoResponse {
    match app.message_agent(&name, body.message).await {
        Ok(()) => axum::http::StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.code.to_http_response(e.message).into_response(),
    }
}
