//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{routing::get, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // Read-only API; any origin may query it.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the API router with versioned endpoints
    let api_v1 = Router::new()
        .route("/dataset", get(handlers::get_dataset_info))
        // Per-year analytics
        .route("/years/{year}/organizations", get(handlers::list_organizations))
        .route("/years/{year}/cut-points", get(handlers::get_cut_points))
        .route("/years/{year}/risk-opportunity", get(handlers::get_risk_opportunity))
        .route("/years/{year}/reward-factor", get(handlers::get_reward_factor))
        .route("/years/{year}/distributions", get(handlers::get_distributions))
        // Year-over-year
        .route("/trends/high-star", get(handlers::get_high_star_trends));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
