//! WebSocket support for live recompute progress.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use hsorter_core::{RecomputeEvent, RecomputeStage};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::metrics::{WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL, WS_LAG_EVENTS, WS_MESSAGES_SENT};
use crate::state::AppState;

/// Interval between heartbeats on an idle connection.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// WebSocket message sent to clients for real-time updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    /// A unit of recompute work finished.
    RecomputeProgress {
        run_id: Uuid,
        stage: RecomputeStage,
        /// Human-readable stage label
        label: String,
        done: u64,
        total: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },
    /// A pass finished and every partition was rewritten.
    RecomputeCompleted {
        run_id: Uuid,
        files: usize,
        partitions_written: usize,
        /// Completion time, RFC 3339
        completed_at: String,
    },
    /// A pass stopped early (error or cancellation).
    RecomputeFailed {
        run_id: Uuid,
        stage: Option<RecomputeStage>,
        done: u64,
        total: u64,
        error: String,
    },
    /// Recompute running state changed.
    RecomputeStatus { running: bool },
    /// Server heartbeat (sent periodically to keep connection alive).
    Heartbeat { timestamp: i64 },
}

impl WsMessage {
    fn type_label(&self) -> &'static str {
        match self {
            WsMessage::RecomputeProgress { .. } => "recompute_progress",
            WsMessage::RecomputeCompleted { .. } => "recompute_completed",
            WsMessage::RecomputeFailed { .. } => "recompute_failed",
            WsMessage::RecomputeStatus { .. } => "recompute_status",
            WsMessage::Heartbeat { .. } => "heartbeat",
        }
    }
}

impl From<&RecomputeEvent> for WsMessage {
    fn from(event: &RecomputeEvent) -> Self {
        match event {
            RecomputeEvent::Progress(p) => WsMessage::RecomputeProgress {
                run_id: p.run_id,
                stage: p.stage,
                label: p.stage.label().to_string(),
                done: p.done,
                total: p.total,
                detail: p.detail.clone(),
            },
            RecomputeEvent::Completed(summary) => WsMessage::RecomputeCompleted {
                run_id: summary.run_id,
                files: summary.files,
                partitions_written: summary.partitions_written,
                completed_at: summary.completed_at.to_rfc3339(),
            },
            RecomputeEvent::Failed {
                run_id,
                stage,
                done,
                total,
                error,
            } => WsMessage::RecomputeFailed {
                run_id: *run_id,
                stage: *stage,
                done: *done,
                total: *total,
                error: error.clone(),
            },
        }
    }
}

/// Broadcaster for WebSocket messages using tokio broadcast channel.
#[derive(Debug, Clone)]
pub struct WsBroadcaster {
    sender: broadcast::Sender<WsMessage>,
}

impl WsBroadcaster {
    /// Create a new broadcaster with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Broadcast a message to all connected clients.
    pub fn broadcast(&self, msg: WsMessage) {
        // Ignore send errors - they just mean no one is listening
        let _ = self.sender.send(msg);
    }

    /// Subscribe to receive messages.
    pub fn subscribe(&self) -> broadcast::Receiver<WsMessage> {
        self.sender.subscribe()
    }

    /// Forward a recompute event.
    pub fn recompute_event(&self, event: &RecomputeEvent) {
        self.broadcast(WsMessage::from(event));
    }

    pub fn recompute_status(&self, running: bool) {
        self.broadcast(WsMessage::RecomputeStatus { running });
    }
}

impl Default for WsBroadcaster {
    fn default() -> Self {
        Self::new(256)
    }
}

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Handle a single WebSocket connection.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    // Subscribe to broadcast messages
    let mut rx = state.ws_broadcaster().subscribe();

    // Track connection metrics
    WS_CONNECTIONS_TOTAL.inc();
    WS_CONNECTIONS_ACTIVE.inc();

    info!("WebSocket client connected");

    // Spawn task to forward broadcast messages to this client
    let send_task = tokio::spawn(async move {
        let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
        // The first tick completes immediately
        heartbeat.tick().await;

        loop {
            let msg = tokio::select! {
                result = rx.recv() => match result {
                    Ok(msg) => msg,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("WebSocket client lagged, skipped {} messages", n);
                        WS_LAG_EVENTS.inc();
                        // Continue receiving - the client will catch up
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("Broadcast channel closed");
                        break;
                    }
                },
                _ = heartbeat.tick() => WsMessage::Heartbeat {
                    timestamp: chrono::Utc::now().timestamp(),
                },
            };

            WS_MESSAGES_SENT.with_label_values(&[msg.type_label()]).inc();

            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        debug!("WebSocket send failed, client disconnected");
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to serialize WsMessage: {}", e);
                }
            }
        }
    });

    // Handle incoming messages from client (ping/pong, close)
    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Close(_)) => {
                debug!("WebSocket client requested close");
                break;
            }
            Ok(Message::Text(text)) => {
                // We don't expect any client messages, but log them
                debug!("Received text message: {}", text);
            }
            Ok(_) => {
                // Pong is handled automatically by axum
            }
            Err(e) => {
                warn!("WebSocket receive error: {}", e);
                break;
            }
        }
    }

    // Clean up
    send_task.abort();
    WS_CONNECTIONS_ACTIVE.dec();
    info!("WebSocket client disconnected");
}
