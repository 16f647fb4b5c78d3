use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::SharedState;

mod error;
mod items;
mod observability;
mod system;
mod types;
mod validation;

pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn new(shared: Arc<SharedState>, prometheus_handle: Option<PrometheusHandle>) -> Arc<Self> {
        Arc::new(Self {
            shared,
            start_time: std::time::Instant::now(),
            prometheus_handle,
        })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.shared.config.server.cors_allowed_origins.clone();

    let api_router = Router::new()
        .route("/sync", post(system::trigger_sync))
        .route("/{kind}", get(items::list_items))
        .route(
            "/{kind}/search",
            get(items::search_items_query).post(items::search_items),
        )
        .route("/{kind}/{id}", get(items::get_item));

    let cors_layer = if cors_origins.iter().any(|origin| origin == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .route("/health", get(system::health))
        .route("/metrics", get(observability::get_metrics))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(observability::logging_middleware))
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer.allow_methods(Any).allow_headers(Any)),
        )
}
