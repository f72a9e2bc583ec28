use axum::{
    Json, Router,
    http::{StatusCode, Uri},
    routing::get,
};

use crate::{
    repository::BasketRepository,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub mod baskets;
pub mod doc;
pub mod health;
pub mod params;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router<R: BasketRepository>() -> Router<AppState<R>> {
    Router::new().nest("/baskets", baskets::router())
}

/// The whole application: health check, API, docs and JSON fallbacks.
///
/// Transport layers (tracing, limits, request ids) are added by the binary.
pub fn app<R: BasketRepository>(state: AppState<R>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", create_api_router())
        .merge(doc::scalar_docs())
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(state)
}

async fn not_found(uri: Uri) -> (StatusCode, Json<ApiResponse<serde_json::Value>>) {
    let body = ApiResponse::success(
        "API resource not found",
        serde_json::json!({ "path": uri.path() }),
        Some(Meta::empty()),
    );
    (StatusCode::NOT_FOUND, Json(body))
}

async fn method_not_allowed() -> (StatusCode, Json<ApiResponse<serde_json::Value>>) {
    let body = ApiResponse::success(
        "Method not allowed",
        serde_json::json!({}),
        Some(Meta::empty()),
    );
    (StatusCode::METHOD_NOT_ALLOWED, Json(body))
}
