// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-only analytics HTTP handlers, derived from the in-memory task
//! cache rather than a dedicated time-series store (spec.md §1).

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::app::App;

/// `GET /api/kpi-metrics`
pub async fn kpi_metrics(State(app): State<Arc<App>>) -> impl IntoResponse {
    Json(app.kpi_metrics().await).into_response()
}

/// `GET /api/agent-performance`
pub async fn agent_performance(State(app): State<Arc<App>>) -> impl IntoResponse {
    Json(app.agent_performance().await).into_response()
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskTrendQuery {
    pub days: Option<u32>,
}

/// `GET /api/task-trend?days=N`
pub async fn task_trend(State(app): State<Arc<App>>, Query(query): Query<TaskTrendQuery>) -> impl IntoResponse {
    let days = query.days.unwrap_or(7).clamp(1, 90);
    Json(app.task_trend(days).await).into_response()
}
