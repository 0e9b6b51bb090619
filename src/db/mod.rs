//! Database layer for media-vault
//!
//! Handles SQLite persistence for media assets and categories.
//!
//! ## Submodules
//!
//! Methods on [`Database`] are organized by domain:
//! - [`migrations`] — Database lifecycle, schema migrations
//! - [`assets`] — Asset CRUD plus the orchestrator-owned partial updates
//! - [`categories`] — Category CRUD and asset-category links

use sqlx::{sqlite::SqlitePool, FromRow};

mod assets;
mod categories;
mod migrations;

pub use assets::AssetFilter;

/// New asset to be inserted into the database
#[derive(Debug, Clone)]
pub struct NewAsset {
    /// Display title
    pub title: String,
    /// Storage-root-relative path of the uploaded blob
    pub file_path: String,
    /// Broad media classification label (see [`crate::types::MediaKind`])
    pub kind: String,
    /// Whether the upload is a zipped static-HTML site bundle
    pub is_site_bundle: bool,
    /// Alternative text for accessibility
    pub alt_text: String,
    /// Free-form description
    pub description: String,
    /// Initial processing state code (see [`crate::types::ProcessingState`])
    pub state: i32,
}

/// Asset record from database
#[derive(Debug, Clone, FromRow)]
pub struct AssetRow {
    /// Unique database ID
    pub id: i64,
    /// Display title
    pub title: String,
    /// Storage-root-relative path of the uploaded blob
    pub file_path: String,
    /// Broad media classification label
    pub kind: String,
    /// Whether the upload is a site bundle (0 = no, 1 = yes)
    pub is_site_bundle: i32,
    /// Alternative text for accessibility
    pub alt_text: String,
    /// Free-form description
    pub description: String,
    /// Absolute path of the uploaded archive recorded when extraction ran
    pub source_archive_path: Option<String>,
    /// Storage-root-relative path of the located entry document; set exactly
    /// once, together with `sandbox_base_dir`
    pub entry_document_path: Option<String>,
    /// Storage-root-relative directory containing the entry document
    pub sandbox_base_dir: Option<String>,
    /// Processing state code (see [`crate::types::ProcessingState`])
    pub state: i32,
    /// Failure detail, set only when the state is failed
    pub processing_error: Option<String>,
    /// Unix timestamp when the asset was created
    pub created_at: i64,
    /// Unix timestamp when the asset was last updated
    pub updated_at: i64,
}

impl AssetRow {
    /// Whether the row is flagged as a site bundle
    pub fn is_site_bundle(&self) -> bool {
        self.is_site_bundle != 0
    }
}

/// Category record from database
#[derive(Debug, Clone, FromRow)]
pub struct CategoryRow {
    /// Unique database ID
    pub id: i64,
    /// Display name
    pub name: String,
    /// URL-safe unique slug
    pub slug: String,
}

/// Database handle for media-vault
pub struct Database {
    pool: SqlitePool,
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
