//! Axum router with CORS, body limits and static asset serving.
//!
//! The asset store root is mounted read-only under `/images`; recommendation
//! URLs produced by the resolver point into that tree.

use std::path::Path;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::catalog::IMAGE_URL_PREFIX;
use crate::http::handlers;
use crate::http::state::AppState;

/// Builds the complete router. The browse route shape follows the catalog
/// mode: gendered deployments take a gender path segment, flat ones do not.
pub fn build_router(state: AppState, asset_root: &Path, body_limit_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        .route("/predict", post(handlers::predict))
        .route("/health", get(handlers::health));

    router = if state.styles.is_gendered() {
        router.route(
            "/styles/{gender}/{category}",
            get(handlers::browse_styles_by_gender),
        )
    } else {
        router.route("/styles/{category}", get(handlers::browse_styles))
    };

    router
        .nest_service(IMAGE_URL_PREFIX, ServeDir::new(asset_root))
        .layer(DefaultBodyLimit::max(body_limit_bytes))
        .layer(cors)
        .with_state(state)
}
