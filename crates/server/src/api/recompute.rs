//! Recompute API handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;

use super::stats::ErrorResponse;
use crate::recompute::RecomputeStatus;
use crate::state::AppState;

/// Simple message response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// POST /api/v1/stats/recompute
///
/// Start a pass in the background. Returns 409 if one is already running.
pub async fn start_recompute(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    if state.recompute().start().await {
        (StatusCode::ACCEPTED, Json(state.recompute().status().await)).into_response()
    } else {
        (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: "A recompute pass is already running".to_string(),
            }),
        )
            .into_response()
    }
}

/// GET /api/v1/stats/recompute
pub async fn get_recompute_status(State(state): State<Arc<AppState>>) -> Json<RecomputeStatus> {
    Json(state.recompute().status().await)
}

/// POST /api/v1/stats/recompute/cancel
pub async fn cancel_recompute(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    if state.recompute().cancel().await {
        (
            StatusCode::OK,
            Json(MessageResponse {
                message: "Recompute cancellation requested".to_string(),
            }),
        )
            .into_response()
    } else {
        (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: "No recompute pass is running".to_string(),
            }),
        )
            .into_response()
    }
}
