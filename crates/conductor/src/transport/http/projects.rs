// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project file-listing and download HTTP handlers. Both endpoints are
//! named in spec.md §1 only as external-collaborator interfaces and carry
//! no further elaboration; they are implemented as minimal stubs.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

use crate::app::App;

/// `GET /api/projects/:name/files`
pub async fn files(State(app): State<Arc<App>>, Path(name): Path<String>) -> impl IntoResponse {
    Json(app.project_files(&name)).into_response()
}

/// `GET /api/projects/:name/download/zip`
pub async fn download_zip(State(app): State<Arc<App>>, Path(name): Path<String>) -> impl IntoResponse {
    if app.project_zip_available(&name) {
        axum::http::StatusCode::OK.into_response()
    } else {
        axum::http::StatusCode::NOT_FOUND.into_response()
    }
}
