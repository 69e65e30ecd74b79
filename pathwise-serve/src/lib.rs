//! pathwise-serve library - career inference HTTP service
//!
//! Exposes the router and shared state for integration testing.

pub mod api;
pub mod error;
pub mod pipeline;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::pipeline::InferencePipeline;
use pathwise_common::db::RecordStore;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Inference pipeline over the loaded artifact bundle
    pub pipeline: Arc<InferencePipeline>,
    /// Record store backing the administrative listing
    pub store: RecordStore,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(pipeline: Arc<InferencePipeline>, store: RecordStore) -> Self {
        Self {
            pipeline,
            store,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};
    use tower_http::cors::CorsLayer;

    Router::new()
        .route("/predict", post(api::predict))
        .route("/interests", get(api::list_interests))
        .route("/admin/records", get(api::list_records))
        .merge(api::health_routes())
        .with_state(state)
        // Enable CORS for browser clients on other origins
        .layer(CorsLayer::permissive())
}
