//! The static gateway: serve files out of site bundle sandboxes.
//!
//! Every failure (unknown asset, unready bundle, escape attempt, missing
//! file) is the same bare 404. No internal path or state detail ever
//! reaches the caller.

use crate::api::AppState;
use crate::gateway::{self, resolve_site_path};
use crate::types::AssetId;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use tokio_util::io::ReaderStream;

/// GET /sites/:id - Serve the site's entry document
#[utoipa::path(
    get,
    path = "/sites/{id}",
    tag = "sites",
    params(("id" = i64, Path, description = "Asset ID")),
    responses(
        (status = 200, description = "The site's entry document"),
        (status = 404, description = "Asset unknown, not ready, or path invalid")
    )
)]
pub async fn serve_site_entry(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    serve(state, id, String::new()).await
}

/// GET /sites/:id/*path - Serve a file from the site's sandbox
#[utoipa::path(
    get,
    path = "/sites/{id}/{path}",
    tag = "sites",
    params(
        ("id" = i64, Path, description = "Asset ID"),
        ("path" = String, Path, description = "Sandbox-relative file path")
    ),
    responses(
        (status = 200, description = "The requested file"),
        (status = 404, description = "Asset unknown, not ready, or path invalid")
    )
)]
pub async fn serve_site_path(
    State(state): State<AppState>,
    Path((id, path)): Path<(i64, String)>,
) -> Response {
    serve(state, id, path).await
}

async fn serve(state: AppState, id: i64, sub_path: String) -> Response {
    let row = match state.vault.db.get_asset(AssetId(id)).await {
        Ok(Some(row)) => row,
        Ok(None) => return not_found(),
        Err(e) => {
            tracing::error!(asset_id = id, error = %e, "gateway lookup failed");
            return not_found();
        }
    };

    let Some(resolved) =
        resolve_site_path(&row, &state.config.storage.root, &sub_path).await
    else {
        return not_found();
    };

    let body = Body::from_stream(ReaderStream::new(resolved.file));

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, resolved.content_type)
        .header(header::CONTENT_LENGTH, resolved.len)
        .header(header::X_FRAME_OPTIONS, gateway::FRAME_OPTIONS)
        .header(header::CONTENT_SECURITY_POLICY, gateway::FRAME_ANCESTORS);

    if state.config.gateway.disable_cache {
        builder = builder
            .header(header::CACHE_CONTROL, gateway::NO_CACHE)
            .header(header::PRAGMA, "no-cache")
            .header(header::EXPIRES, "0");
    }

    match builder.body(body) {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(asset_id = id, error = %e, "failed to build gateway response");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// The one generic not-found response the gateway ever produces
fn not_found() -> Response {
    StatusCode::NOT_FOUND.into_response()
}
