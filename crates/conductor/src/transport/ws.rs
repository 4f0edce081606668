// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket transport: one connection per client, multiplexing event-bus
//! pushes with inbound RPC requests (spec.md §6's Client RPC list).

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use tracing::warn;

use crate::app::App;
use crate::error::ErrorCode;
use crate::transport::ws_msg::{ClientMessage, ServerMessage};

pub async fn ws_handler(State(app): State<Arc<App>>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(app, socket))
}

async fn handle_connection(app: Arc<App>, socket: WebSocket) {
    let (mut tx, mut rx) = socket.split();
    let mut events = app.events.subscribe();

    loop {
        tokio::select! {
            event = events.recv() => {
                let event = match event {
                    Ok(e) => e,
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                };
                if send_json(&mut tx, &event).await.is_err() {
                    break;
                }
            }
            msg = rx.next() => {
                let msg = match msg {
                    Some(Ok(m)) => m,
                    Some(Err(_)) | None => break,
                };
                match msg {
                    Message::Text(text) => {
                        let parsed: Result<ClientMessage, _> = serde_json::from_str(&text);
                        let reply = match parsed {
                            Ok(client_msg) => handle_client_message(&app, client_msg).await,
                            Err(_) => ServerMessage::Error {
                                error: ErrorCode::BadRequest.to_error_body("malformed message"),
                            },
                        };
                        if send_json(&mut tx, &reply).await.is_err() {
                            break;
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    }
}

async fn handle_client_message(app: &Arc<App>, msg: ClientMessage) -> ServerMessage {
    match msg {
        ClientMessage::RequestTask { title, description } => match app.request_task(title, description).await {
            Ok(task) => ServerMessage::TaskResult { task },
            Err(e) => reply_error(e),
        },
        ClientMessage::DeleteTask { id } => match app.delete_task(&id).await {
            Ok(()) => ServerMessage::Ack {},
            Err(e) => reply_error(e),
        },
        ClientMessage::CancelTask { id } => match app.cancel_task(&id).await {
            Ok(task) => ServerMessage::TaskResult { task },
            Err(e) => reply_error(e),
        },
        ClientMessage::RetryTask { id } => match app.retry_task(&id).await {
            Ok(task) => ServerMessage::TaskResult { task },
            Err(e) => reply_error(e),
        },
        ClientMessage::RestartTaskAsNew { id } => match app.restart_task_as_new(&id).await {
            Ok(task) => ServerMessage::TaskResult { task },
            Err(e) => reply_error(e),
        },
        ClientMessage::MarkTaskCompleted { id } => match app.mark_task_completed(&id).await {
            Ok(task) => ServerMessage::TaskResult { task },
            Err(e) => reply_error(e),
        },
        ClientMessage::MarkTaskFailed { id, reason } => match app.mark_task_failed(&id, reason).await {
            Ok(task) => ServerMessage::TaskResult { task },
            Err(e) => reply_error(e),
        },
        ClientMessage::ResumePausedTasks {} => match app.resume_paused_tasks().await {
            Ok(()) => ServerMessage::Ack {},
            Err(e) => reply_error(e),
        },
        ClientMessage::EmergencyStop {} => match app.emergency_stop().await {
            Ok(()) => ServerMessage::Ack {},
            Err(e) => reply_error(e),
        },
        ClientMessage::SessionReset {} => match app.session_reset().await {
            Ok(()) => ServerMessage::Ack {},
            Err(e) => reply_error(e),
        },
        ClientMessage::ManualRecoveryRequest {} => {
            app.manual_recovery_request().await;
            ServerMessage::Ack {}
        }
        ClientMessage::ToggleTaskCompletionMonitoring { enabled } => {
            app.toggle_task_completion_monitoring(enabled).await;
            ServerMessage::Ack {}
        }
        ClientMessage::ToggleAgentActivityMonitoring { enabled } => {
            app.toggle_agent_activity_monitoring(enabled).await;
            ServerMessage::Ack {}
        }
        ClientMessage::GetAgentMonitoringStats {} => {
            ServerMessage::AgentMonitoringStats { stats: app.agent_monitoring_stats().await }
        }
        ClientMessage::UpdateMonitoringConfig {} => ServerMessage::Ack {},
        ClientMessage::ResetMonitoringStats {} => {
            app.reset_monitoring_stats().await;
            ServerMessage::Ack {}
        }
    }
}

fn reply_error(e: crate::error::Rejection) -> ServerMessage {
    ServerMessage::Error { error: e.code.to_error_body(e.message) }
}

async fn send_json<T: serde::Serialize>(
    tx: &mut futures_util::stream::SplitSink<WebSocket, Message>,
    value: &T,
) -> Result<(), axum::Error> {
    let text = match serde_json::to_string(value) {
        Ok(t) => t,
        Err(e) => {
            warn!("failed to serialize websocket message: {e}");
            return Ok(());
        }
    };
    tx.send(Message::Text(text.into())).await
}
