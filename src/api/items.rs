//! Catalog endpoints, one set of routes shared by the four kinds.
//!
//! `{kind}` is the plural kind name; anything else is a 404.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;

use super::validation::{parse_kind, validate_item_id, validate_search_query};
use super::{ApiError, ApiResponse, AppState, SearchParams};
use crate::domain::{ItemKind, SearchQuery};

/// Binds `$svc` to the service for `$kind` and evaluates `$body`.
macro_rules! with_service {
    ($state:expr, $kind:expr, |$svc:ident| $body:expr) => {
        match $kind {
            ItemKind::Skin => {
                let $svc = &$state.shared.skins;
                $body
            }
            ItemKind::Agent => {
                let $svc = &$state.shared.agents;
                $body
            }
            ItemKind::Crate => {
                let $svc = &$state.shared.crates;
                $body
            }
            ItemKind::Key => {
                let $svc = &$state.shared.keys;
                $body
            }
        }
    };
}

fn success<T: Serialize>(data: T) -> Response {
    Json(ApiResponse::success(data)).into_response()
}

/// `GET /api/{kind}`
pub async fn list_items(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
) -> Result<Response, ApiError> {
    let kind = parse_kind(&kind)?;
    Ok(with_service!(state, kind, |service| success(
        service.get_all().await
    )))
}

/// `GET /api/{kind}/{id}`
pub async fn get_item(
    State(state): State<Arc<AppState>>,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let kind = parse_kind(&kind)?;
    let id = validate_item_id(&id)?;

    with_service!(state, kind, |service| service
        .get_by_id(id)
        .await
        .map(success)
        .ok_or_else(|| ApiError::not_found(kind.as_str(), id)))
}

/// `GET /api/{kind}/search?q=&team=&crate=&page=&page_size=`
pub async fn search_items_query(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    Query(params): Query<SearchParams>,
) -> Result<Response, ApiError> {
    run_search(&state, &kind, params.into()).await
}

/// `POST /api/{kind}/search` with a JSON `SearchQuery` body.
///
/// A body that is not a valid `SearchQuery` is a 400 in the usual envelope.
pub async fn search_items(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    payload: Result<Json<SearchQuery>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(query) = payload
        .map_err(|e| ApiError::validation(format!("Invalid search body: {}", e.body_text())))?;
    run_search(&state, &kind, query).await
}

async fn run_search(state: &AppState, kind: &str, query: SearchQuery) -> Result<Response, ApiError> {
    let kind = parse_kind(kind)?;
    let query = validate_search_query(query)?;

    Ok(with_service!(state, kind, |service| success(
        service.search(query).await
    )))
}
