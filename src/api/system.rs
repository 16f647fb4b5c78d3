//! Health and sync endpoints.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, HealthResponse, KindCount};
use crate::services::SyncReport;

/// `GET /health`
///
/// Pings the store and reports row counts per kind. Returns 503 when the
/// store is unreachable.
pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    let database = state.shared.store.ping().await.is_ok();

    let counts = if database {
        match state.shared.counts().await {
            Ok(counts) => counts
                .into_iter()
                .map(|(kind, count)| KindCount { kind, count })
                .collect(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to count catalog rows");
                Vec::new()
            }
        }
    } else {
        Vec::new()
    };

    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ApiResponse::success(HealthResponse {
            status: if database { "ok" } else { "degraded" },
            database,
            version: env!("CARGO_PKG_VERSION"),
            uptime_seconds: state.start_time.elapsed().as_secs(),
            counts,
        })),
    )
        .into_response()
}

/// `POST /api/sync`
///
/// Runs a full sync and returns its report. Upstream failures map to 502,
/// store failures to 500.
pub async fn trigger_sync(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<SyncReport>>, ApiError> {
    let report = state.shared.synchronize().await?;
    Ok(Json(ApiResponse::success(report)))
}
