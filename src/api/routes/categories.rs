//! Category management handlers.

use super::UpsertCategoryRequest;
use crate::api::error_response::error_response;
use crate::api::AppState;
use crate::error::ApiError;
use crate::types::CategoryInfo;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// GET /categories - List all categories
#[utoipa::path(
    get,
    path = "/categories",
    tag = "categories",
    responses(
        (status = 200, description = "All categories ordered by name", body = Vec<crate::types::CategoryInfo>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_categories(State(state): State<AppState>) -> Response {
    match state.vault.db.list_categories().await {
        Ok(rows) => {
            let categories: Vec<CategoryInfo> = rows
                .into_iter()
                .map(|c| CategoryInfo {
                    id: c.id,
                    name: c.name,
                    slug: c.slug,
                })
                .collect();
            (StatusCode::OK, Json(categories)).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// PUT /categories/:slug - Create or update a category
#[utoipa::path(
    put,
    path = "/categories/{slug}",
    tag = "categories",
    params(("slug" = String, Path, description = "Category slug")),
    request_body = UpsertCategoryRequest,
    responses(
        (status = 200, description = "Category created or updated", body = crate::types::CategoryInfo),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn upsert_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(request): Json<UpsertCategoryRequest>,
) -> Response {
    match state.vault.db.upsert_category(&request.name, &slug).await {
        Ok(row) => (
            StatusCode::OK,
            Json(CategoryInfo {
                id: row.id,
                name: row.name,
                slug: row.slug,
            }),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// DELETE /categories/:slug - Delete a category
#[utoipa::path(
    delete,
    path = "/categories/{slug}",
    tag = "categories",
    params(("slug" = String, Path, description = "Category slug")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 404, description = "Category not found", body = crate::error::ApiError),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn delete_category(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    match state.vault.db.delete_category(&slug).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(ApiError::not_found(format!("category {}", slug))),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}
