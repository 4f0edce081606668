// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-control HTTP handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;

use crate::app::App;

/// `POST /api/tmux/setup`
pub async fn tmux_setup(State(app): State<Arc<App>>) -> impl IntoResponse {
    app.tmux_setup().await;
    axum::http::StatusCode::NO_CONTENT
}
