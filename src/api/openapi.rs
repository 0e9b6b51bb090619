//! OpenAPI documentation and schema generation
//!
//! Defines the OpenAPI specification for the media-vault REST API using
//! utoipa for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the media-vault REST API
///
/// The spec is served at `/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "media-vault REST API",
        version = "0.2.0",
        description = "REST API for managing media assets and serving extracted static-HTML site bundles",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    paths(
        // Assets
        crate::api::routes::list_assets,
        crate::api::routes::get_asset,
        crate::api::routes::upload_asset,
        crate::api::routes::update_asset,
        crate::api::routes::delete_asset,
        crate::api::routes::retry_asset,

        // Categories
        crate::api::routes::list_categories,
        crate::api::routes::upsert_category,
        crate::api::routes::delete_category,

        // Site gateway
        crate::api::routes::serve_site_entry,
        crate::api::routes::serve_site_path,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
    ),
    components(schemas(
        crate::types::AssetId,
        crate::types::AssetInfo,
        crate::types::CategoryInfo,
        crate::types::MediaKind,
        crate::types::ProcessingState,
        crate::error::ApiError,
        crate::error::ErrorDetail,
        crate::api::routes::AssetListResponse,
        crate::api::routes::UpdateAssetRequest,
        crate::api::routes::UpsertCategoryRequest,
    )),
    tags(
        (name = "assets", description = "Media asset management"),
        (name = "categories", description = "Category management"),
        (name = "sites", description = "Static gateway for extracted site bundles"),
        (name = "system", description = "Health and API metadata")
    )
)]
pub struct ApiDoc;
