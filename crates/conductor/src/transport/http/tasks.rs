// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task queue HTTP handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::app::App;

#[derive(Debug, Clone, Serialize)]
pub struct TaskListResponse {
    pub tasks: Vec<crate::model::Task>,
    pub counts: crate::store::TaskCounts,
}

/// `GET /api/tasks`
pub async fn list_tasks(State(app): State<Arc<App>>) -> impl IntoResponse {
    let tasks = app.list_tasks().await;
    let counts = app.counts_by_status().await;
    Json(TaskListResponse { tasks, counts }).into_response()
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompleteTaskBody {
    pub id: String,
}

/// `POST /api/complete-task`
pub async fn complete_task(State(app): State<Arc<App>>, Json(body): Json<CompleteTaskBody>) -> impl IntoResponse {
    match app.mark_task_completed(&body.id).await {
        Ok(task) => Json(task).into_response(),
        Err(e) => e.code.to_http_response(e.message).into_response(),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectNameBody {
    pub project_name: Option<String>,
}

/// `PATCH /api/tasks/:id/project-name`
pub async fn patch_project_name(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
    Json(body): Json<ProjectNameBody>,
) -> impl IntoResponse {
    match app.patch_task_project_name(&id, body.project_name).await {
        Ok(task) => Json(task).into_response(),
        Err(e) => e.code.to_http_response(e.message).into_response(),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssignedToBody {
    pub assigned_to: Option<String>,
}

/// `PATCH /api/tasks/:id/assigned-to`
pub async fn patch_assigned_to(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
    Json(body): Json<AssignedToBody>,
) -> impl IntoResponse {
    match app.patch_task_assigned_to(&id, body.assigned_to).await {
        Ok(task) => Json(task).into_response(),
        Err(e) => e.code.to_http_response(e.message).into_response(),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetadataBody {
    pub metadata: Option<serde_json::Value>,
}

/// `PATCH /api/tasks/:id/metadata`
pub async fn patch_metadata(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
    Json(body): Json<MetadataBody>,
) -> impl IntoResponse {
    match app.patch_task_metadata(&id, body.metadata).await {
        Ok(task) => Json(task).into_response(),
        Err(e) => e.code.to_http_response(e.message).into_response(),
    }
}
