// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use axum::http::StatusCode;

use crate::app::App;
use crate::config::{Config, MonitoringConfig};
use crate::transport::build_router;

fn test_config() -> Config {
    Config {
        port: 0,
        host: "127.0.0.1".into(),
        origin: "http://localhost:3000".into(),
        production: false,
        static_dir: "dist".into(),
        tmux_socket: None,
        log_format: "text".into(),
        log_level: "info".into(),
        monitoring: MonitoringConfig::default(),
    }
}

#[tokio::test]
async fn list_tasks_empty_on_fresh_app() -> anyhow::Result<()> {
    let app = App::new(test_config());
    let router = build_router(app, "http://localhost:3000", None);
    let server = axum_test::TestServer::new(router)?;

    let resp = server.get("/api/tasks").await;
    resp.assert_status(StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&resp.text())?;
    assert_eq!(body["tasks"].as_array().map(Vec::len), Some(0));
    assert_eq!(body["counts"]["pending"], 0);
    Ok(())
}

#[tokio::test]
async fn complete_task_unknown_id_is_not_found() -> anyhow::Result<()> {
    let app = App::new(test_config());
    let router = build_router(app, "http://localhost:3000", None);
    let server = axum_test::TestServer::new(router)?;

    let resp = server.post("/api/complete-task").json(&serde_json::json!({"id": "missing"})).await;
    resp.assert_status(StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn patch_metadata_round_trips_through_list() -> anyhow::Result<()> {
    let app = App::new(test_config());
    let task = app.request_task("title", "description").await?;
    let router = build_router(app, "http://localhost:3000", None);
    let server = axum_test::TestServer::new(router)?;

    let resp = server
        .patch(&format!("/api/tasks/{}/metadata", task.id))
        .json(&serde_json::json!({"metadata": {"priority": "high"}}))
        .await;
    resp.assert_status(StatusCode::OK);

    let resp = server.get("/api/tasks").await;
    let body: serde_json::Value = serde_json::from_str(&resp.text())?;
    assert_eq!(body["tasks"][0]["metadata"]["priority"], "high");
    Ok(())
}

#[tokio::test]
async fn system_health_unavailable_before_first_tick() -> anyhow::Result<()> {
    let app = App::new(test_config());
    let router = build_router(app, "http://localhost:3000", None);
    let server = axum_test::TestServer::new(router)?;

    let resp = server.get("/api/system-health").await;
    resp.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    Ok(())
}

#[tokio::test]
async fn list_agents_returns_standard_roster() -> anyhow::Result<()> {
    let app = App::new(test_config());
    let router = build_router(app, "http://localhost:3000", None);
    let server = axum_test::TestServer::new(router)?;

    let resp = server.get("/api/agents").await;
    resp.assert_status(StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&resp.text())?;
    assert_eq!(body.as_array().map(Vec::len), Some(5));
    Ok(())
}
