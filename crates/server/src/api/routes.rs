use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{handlers, middleware::metrics_middleware, recompute, stats, ws};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and metrics
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        // Statistics (cache reads only)
        .route("/stats", get(stats::list_stats).delete(stats::clear_stats))
        .route("/stats/{category}/{metric}", get(stats::get_stats))
        // Recompute
        .route(
            "/stats/recompute",
            get(recompute::get_recompute_status).post(recompute::start_recompute),
        )
        .route("/stats/recompute/cancel", post(recompute::cancel_recompute))
        // Live progress
        .route("/ws", get(ws::ws_handler))
        .route_layer(middleware::from_fn(metrics_middleware))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
}
