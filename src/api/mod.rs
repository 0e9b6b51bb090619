//! REST API server module
//!
//! Provides the management API for media assets plus the static gateway that
//! serves extracted site bundles.

use crate::{Config, MediaVault, Result};
use axum::{
    http::HeaderValue,
    routing::{delete, get, patch, post, put},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Assets
/// - `GET /assets` - List assets (search, kind and category filters, pagination)
/// - `GET /assets/:id` - Get single asset (includes processing state/error)
/// - `POST /assets` - Upload a new asset (multipart/form-data)
/// - `PATCH /assets/:id` - Update editable metadata
/// - `DELETE /assets/:id` - Delete asset (triggers sandbox reaping)
/// - `POST /assets/:id/retry` - Explicitly retry failed site ingestion
///
/// ## Categories
/// - `GET /categories` - List categories
/// - `PUT /categories/:slug` - Create/update category
/// - `DELETE /categories/:slug` - Delete category
///
/// ## Site Gateway
/// - `GET /sites/:id` - Serve the site's entry document
/// - `GET /sites/:id/*path` - Serve a file from the site's sandbox
///
/// ## System
/// - `GET /health` - Health check
/// - `GET /openapi.json` - OpenAPI specification
pub fn create_router(vault: Arc<MediaVault>, config: Arc<Config>) -> Router {
    let state = AppState::new(vault, config.clone());

    let router = Router::new()
        // Assets
        .route("/assets", get(routes::list_assets))
        .route("/assets", post(routes::upload_asset))
        .route("/assets/:id", get(routes::get_asset))
        .route("/assets/:id", patch(routes::update_asset))
        .route("/assets/:id", delete(routes::delete_asset))
        .route("/assets/:id/retry", post(routes::retry_asset))
        // Categories
        .route("/categories", get(routes::list_categories))
        .route("/categories/:slug", put(routes::upsert_category))
        .route("/categories/:slug", delete(routes::delete_category))
        // Site gateway (both URL shapes: implicit entry document and
        // explicit asset-relative path)
        .route("/sites/:id", get(routes::serve_site_entry))
        .route("/sites/:id/", get(routes::serve_site_entry))
        .route("/sites/:id/*path", get(routes::serve_site_path))
        // System
        .route("/health", get(routes::health_check))
        .route("/openapi.json", get(routes::openapi_spec));

    let router = router.with_state(state).layer(TraceLayer::new_for_http());

    // Apply CORS middleware if enabled in config
    if config.api.cors_enabled {
        let cors = build_cors_layer(&config.api.cors_origins);
        router.layer(cors)
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// Supports "*" (or an empty list) for any origin, otherwise the listed
/// origins only.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server on the configured bind address.
///
/// Creates a TCP listener, binds it to `api.bind_address`, and serves the
/// router until the server is shut down.
pub async fn start_api_server(vault: Arc<MediaVault>, config: Arc<Config>) -> Result<()> {
    let bind_address = config.api.bind_address;
    let router = create_router(vault, config);

    let listener = TcpListener::bind(bind_address).await.map_err(|e| {
        crate::Error::ApiServerError(format!("failed to bind {}: {}", bind_address, e))
    })?;

    tracing::info!(%bind_address, "API server listening");

    axum::serve(listener, router)
        .await
        .map_err(|e| crate::Error::ApiServerError(format!("server error: {}", e)))
}
