//! Asset management handlers.

use super::{AssetListResponse, ListAssetsQuery, UpdateAssetRequest};
use crate::api::error_response::error_response;
use crate::api::AppState;
use crate::db::{AssetFilter, AssetRow};
use crate::error::{ApiError, Error};
use crate::types::{AssetId, AssetInfo, MediaKind, ProcessingState};
use crate::vault::NewAssetUpload;
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Build the API representation of an asset row
async fn asset_info(state: &AppState, row: AssetRow) -> crate::Result<AssetInfo> {
    let id = AssetId(row.id);
    let categories = state.vault.db.asset_category_slugs(id).await?;

    let processing_state = ProcessingState::from_i32(row.state);
    let is_site_bundle = row.is_site_bundle();
    let site_url = (is_site_bundle && processing_state == ProcessingState::Ready)
        .then(|| format!("/sites/{}/", row.id));

    Ok(AssetInfo {
        id,
        title: row.title,
        kind: MediaKind::parse(&row.kind),
        file_path: row.file_path,
        is_site_bundle,
        processing_state,
        processing_error: row.processing_error,
        site_url,
        alt_text: row.alt_text,
        description: row.description,
        categories,
        created_at: chrono::DateTime::from_timestamp(row.created_at, 0)
            .unwrap_or_else(chrono::Utc::now),
        updated_at: chrono::DateTime::from_timestamp(row.updated_at, 0)
            .unwrap_or_else(chrono::Utc::now),
    })
}

/// GET /assets - List assets with filters and pagination
#[utoipa::path(
    get,
    path = "/assets",
    tag = "assets",
    params(ListAssetsQuery),
    responses(
        (status = 200, description = "One page of assets", body = AssetListResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_assets(
    State(state): State<AppState>,
    Query(query): Query<ListAssetsQuery>,
) -> Response {
    let page = query.page.unwrap_or(1).max(1);
    let page_size = query
        .page_size
        .unwrap_or(state.config.api.page_size)
        .clamp(1, 100);

    let filter = AssetFilter {
        query: query.q,
        kind: query.kind,
        category_slug: query.category,
        limit: page_size as i64,
        offset: (page as i64 - 1) * page_size as i64,
    };

    let page_result = match state.vault.list_assets(&filter).await {
        Ok(page_result) => page_result,
        Err(e) => return error_response(e),
    };

    let mut results = Vec::with_capacity(page_result.assets.len());
    for row in page_result.assets {
        match asset_info(&state, row).await {
            Ok(info) => results.push(info),
            Err(e) => return error_response(e),
        }
    }

    (
        StatusCode::OK,
        Json(AssetListResponse {
            count: page_result.total,
            page,
            page_size,
            results,
        }),
    )
        .into_response()
}

/// GET /assets/:id - Get single asset
///
/// A still-processing or failed site bundle is a normal, displayable state:
/// the payload carries `processing_state` and `processing_error` so
/// consumers can render "processing" or "failed: reason" instead of a broken
/// link.
#[utoipa::path(
    get,
    path = "/assets/{id}",
    tag = "assets",
    params(("id" = i64, Path, description = "Asset ID")),
    responses(
        (status = 200, description = "Asset information", body = crate::types::AssetInfo),
        (status = 404, description = "Asset not found", body = crate::error::ApiError),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_asset(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match state.vault.get_asset(AssetId(id)).await {
        Ok(Some(row)) => match asset_info(&state, row).await {
            Ok(info) => (StatusCode::OK, Json(info)).into_response(),
            Err(e) => error_response(e),
        },
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiError::not_found(format!("asset {}", id))),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /assets - Upload a new asset
///
/// Multipart fields: `file` (required), `title`, `alt_text`, `description`,
/// `is_site_bundle` (strictly `"true"` or `"false"`), repeated `category`.
#[utoipa::path(
    post,
    path = "/assets",
    tag = "assets",
    request_body(content = Vec<u8>, description = "Asset upload (multipart/form-data)", content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Asset created", body = crate::types::AssetInfo),
        (status = 400, description = "Invalid upload", body = crate::error::ApiError),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn upload_asset(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut filename: Option<String> = None;
    let mut content: Option<Vec<u8>> = None;
    let mut title: Option<String> = None;
    let mut alt_text = String::new();
    let mut description = String::new();
    let mut is_site_bundle = false;
    let mut categories: Vec<String> = Vec::new();

    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                filename = field.file_name().map(|s| s.to_string());
                content = match field.bytes().await {
                    Ok(bytes) => Some(bytes.to_vec()),
                    Err(e) => {
                        return error_response(Error::InvalidUpload(format!(
                            "failed to read file field: {}",
                            e
                        )))
                    }
                };
            }
            "title" => title = field.text().await.ok().filter(|s| !s.is_empty()),
            "alt_text" => alt_text = field.text().await.unwrap_or_default(),
            "description" => description = field.text().await.unwrap_or_default(),
            "is_site_bundle" => {
                // Strictly typed flag: exactly "true" or "false", no loose
                // coercion of "1"/"yes"/"True"
                match field.text().await.as_deref() {
                    Ok("true") => is_site_bundle = true,
                    Ok("false") => is_site_bundle = false,
                    Ok(other) => {
                        return error_response(Error::InvalidUpload(format!(
                            "is_site_bundle must be \"true\" or \"false\", got {:?}",
                            other
                        )))
                    }
                    Err(e) => {
                        return error_response(Error::InvalidUpload(format!(
                            "failed to read is_site_bundle field: {}",
                            e
                        )))
                    }
                }
            }
            "category" => {
                if let Ok(value) = field.text().await {
                    if !value.is_empty() {
                        categories.push(value);
                    }
                }
            }
            _ => {}
        }
    }

    let (Some(filename), Some(content)) = (filename, content) else {
        return error_response(Error::InvalidUpload("no file provided".to_string()));
    };

    let upload = NewAssetUpload {
        filename,
        content,
        title,
        alt_text,
        description,
        is_site_bundle,
        categories,
    };

    match state.vault.add_asset(upload).await {
        Ok(id) => match state.vault.get_asset(id).await {
            Ok(Some(row)) => match asset_info(&state, row).await {
                Ok(info) => (StatusCode::CREATED, Json(info)).into_response(),
                Err(e) => error_response(e),
            },
            Ok(None) => (
                StatusCode::CREATED,
                Json(json!({ "id": id })),
            )
                .into_response(),
            Err(e) => error_response(e),
        },
        Err(e) => error_response(e),
    }
}

/// PATCH /assets/:id - Update editable metadata
#[utoipa::path(
    patch,
    path = "/assets/{id}",
    tag = "assets",
    params(("id" = i64, Path, description = "Asset ID")),
    request_body = UpdateAssetRequest,
    responses(
        (status = 200, description = "Updated asset", body = crate::types::AssetInfo),
        (status = 404, description = "Asset not found", body = crate::error::ApiError),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn update_asset(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateAssetRequest>,
) -> Response {
    let asset_id = AssetId(id);
    let row = match state.vault.get_asset(asset_id).await {
        Ok(Some(row)) => row,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiError::not_found(format!("asset {}", id))),
            )
                .into_response()
        }
        Err(e) => return error_response(e),
    };

    let title = request.title.unwrap_or(row.title);
    let alt_text = request.alt_text.unwrap_or(row.alt_text);
    let description = request.description.unwrap_or(row.description);

    if let Err(e) = state
        .vault
        .db
        .update_asset_metadata(asset_id, &title, &alt_text, &description)
        .await
    {
        return error_response(e);
    }

    match state.vault.get_asset(asset_id).await {
        Ok(Some(row)) => match asset_info(&state, row).await {
            Ok(info) => (StatusCode::OK, Json(info)).into_response(),
            Err(e) => error_response(e),
        },
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiError::not_found(format!("asset {}", id))),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// DELETE /assets/:id - Delete an asset
///
/// Deletion enqueues sandbox reaping; the extracted tree disappears shortly
/// after the record does.
#[utoipa::path(
    delete,
    path = "/assets/{id}",
    tag = "assets",
    params(("id" = i64, Path, description = "Asset ID")),
    responses(
        (status = 204, description = "Asset deleted"),
        (status = 404, description = "Asset not found", body = crate::error::ApiError),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn delete_asset(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match state.vault.delete_asset(AssetId(id)).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /assets/:id/retry - Explicitly retry failed site ingestion
///
/// Failed site bundles are never retried implicitly; this endpoint is the
/// deliberate way back into the pipeline.
#[utoipa::path(
    post,
    path = "/assets/{id}/retry",
    tag = "assets",
    params(("id" = i64, Path, description = "Asset ID")),
    responses(
        (status = 202, description = "Ingestion re-enqueued"),
        (status = 400, description = "Asset is not a site bundle", body = crate::error::ApiError),
        (status = 404, description = "Asset not found", body = crate::error::ApiError),
        (status = 409, description = "Asset is not in a failed state", body = crate::error::ApiError),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn retry_asset(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match state.vault.retry_ingest(AssetId(id)).await {
        Ok(()) => (StatusCode::ACCEPTED, Json(json!({ "queued": true }))).into_response(),
        Err(e) => error_response(e),
    }
}
