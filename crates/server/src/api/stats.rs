//! Statistics API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use hsorter_core::{QueryError, Scope, StatBucket, StatKey};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StatsQueryParams {
    #[serde(default = "default_scope")]
    pub scope: String,
}

fn default_scope() -> String {
    Scope::PerTitle.as_str().to_string()
}

/// One partition as listed by `GET /stats`.
#[derive(Debug, Serialize)]
pub struct PartitionInfo {
    pub category: &'static str,
    pub metric: &'static str,
    pub scope: &'static str,
    /// Whether the cache currently holds buckets for it
    pub computed: bool,
}

#[derive(Debug, Serialize)]
pub struct StatsListResponse {
    pub partitions: Vec<PartitionInfo>,
    pub last_recompute: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub category: &'static str,
    pub metric: &'static str,
    pub scope: &'static str,
    pub buckets: Vec<StatBucket>,
    /// Sum of all bucket counts
    pub total: u64,
    pub last_recompute: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub message: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(e: QueryError) -> ApiError {
    let status = match e {
        QueryError::InvalidKey(_) => StatusCode::BAD_REQUEST,
        QueryError::Cache(_) | QueryError::Settings(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/stats
///
/// List every partition and whether it has been computed.
pub async fn list_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatsListResponse>, ApiError> {
    let query = state.query();

    let computed = query.computed().map_err(error_response)?;
    let last_recompute = query.last_recompute().map_err(error_response)?;

    let partitions = query
        .available()
        .into_iter()
        .map(|key| PartitionInfo {
            category: key.category().as_str(),
            metric: key.metric().as_str(),
            scope: key.scope().as_str(),
            computed: computed.contains(&key),
        })
        .collect();

    Ok(Json(StatsListResponse {
        partitions,
        last_recompute,
    }))
}

/// GET /api/v1/stats/{category}/{metric}?scope=all_files|per_title
///
/// Ordered buckets of one partition. Reads the cache only.
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    Path((category, metric)): Path<(String, String)>,
    Query(params): Query<StatsQueryParams>,
) -> Result<Json<StatsResponse>, ApiError> {
    let query = state.query();

    let key = StatKey::parse(&category, &metric, &params.scope)
        .map_err(|e| error_response(QueryError::from(e)))?;
    let buckets = query.query_key(&key).map_err(error_response)?;
    let last_recompute = query.last_recompute().map_err(error_response)?;

    let total = buckets.iter().map(|b| b.count).sum();

    Ok(Json(StatsResponse {
        category: key.category().as_str(),
        metric: key.metric().as_str(),
        scope: key.scope().as_str(),
        buckets,
        total,
        last_recompute,
    }))
}

/// DELETE /api/v1/stats
///
/// Drop every cached partition.
pub async fn clear_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SuccessResponse>, impl IntoResponse> {
    match state.cache().clear_all() {
        Ok(()) => Ok(Json(SuccessResponse {
            message: "Statistics cache cleared".to_string(),
        })),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}
