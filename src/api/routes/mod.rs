//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`assets`] — Asset management (upload, list, detail, delete, retry)
//! - [`categories`] — Category management
//! - [`sites`] — The static gateway serving extracted site bundles
//! - [`system`] — Health and OpenAPI

use serde::{Deserialize, Serialize};

mod assets;
mod categories;
mod sites;
mod system;

// Re-export all handlers so `routes::function_name` continues to work
pub use assets::*;
pub use categories::*;
pub use sites::*;
pub use system::*;

// ============================================================================
// Query/Request Types (shared across handlers)
// ============================================================================

/// Query parameters for GET /assets
#[derive(Debug, Deserialize, Serialize, utoipa::IntoParams)]
pub struct ListAssetsQuery {
    /// Substring match over title, alt text, and description
    pub q: Option<String>,
    /// Filter by media kind ("image", "site", ...)
    pub kind: Option<String>,
    /// Filter by category slug
    pub category: Option<String>,
    /// 1-based page number (default: 1)
    pub page: Option<u32>,
    /// Items per page (default: config `api.page_size`)
    pub page_size: Option<u32>,
}

/// One page of assets
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AssetListResponse {
    /// Total number of assets matching the filter
    pub count: i64,
    /// 1-based page number of this response
    pub page: u32,
    /// Page size used
    pub page_size: u32,
    /// Assets on this page
    pub results: Vec<crate::types::AssetInfo>,
}

/// Request body for PATCH /assets/:id
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct UpdateAssetRequest {
    /// New title (unchanged when absent)
    pub title: Option<String>,
    /// New alternative text (unchanged when absent)
    pub alt_text: Option<String>,
    /// New description (unchanged when absent)
    pub description: Option<String>,
}

/// Request body for PUT /categories/:slug
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct UpsertCategoryRequest {
    /// Display name for the category
    pub name: String,
}
