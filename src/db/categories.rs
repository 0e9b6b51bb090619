//! Category CRUD and asset-category links.

use crate::error::DatabaseError;
use crate::types::AssetId;
use crate::{Error, Result};

use super::{CategoryRow, Database};

impl Database {
    /// Get a category by slug
    pub async fn get_category_by_slug(&self, slug: &str) -> Result<Option<CategoryRow>> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, slug FROM categories WHERE slug = ?",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to get category: {}",
                e
            )))
        })?;

        Ok(row)
    }

    /// Create a category if its slug is new, otherwise update the name.
    ///
    /// Returns the (possibly pre-existing) row.
    pub async fn upsert_category(&self, name: &str, slug: &str) -> Result<CategoryRow> {
        sqlx::query(
            r#"
            INSERT INTO categories (name, slug) VALUES (?, ?)
            ON CONFLICT (slug) DO UPDATE SET name = excluded.name
            "#,
        )
        .bind(name)
        .bind(slug)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to upsert category: {}",
                e
            )))
        })?;

        self.get_category_by_slug(slug).await?.ok_or_else(|| {
            Error::Database(DatabaseError::NotFound(format!(
                "category {} vanished after upsert",
                slug
            )))
        })
    }

    /// List all categories ordered by name
    pub async fn list_categories(&self) -> Result<Vec<CategoryRow>> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, slug FROM categories ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to list categories: {}",
                e
            )))
        })?;

        Ok(rows)
    }

    /// Delete a category by slug; asset links cascade.
    ///
    /// Returns true if a row was removed.
    pub async fn delete_category(&self, slug: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE slug = ?")
            .bind(slug)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to delete category: {}",
                    e
                )))
            })?;

        Ok(result.rows_affected() > 0)
    }

    /// Link an asset to a category (idempotent)
    pub async fn link_asset_category(&self, asset_id: AssetId, category_id: i64) -> Result<()> {
        sqlx::query(
            "INSERT OR IGNORE INTO asset_categories (asset_id, category_id) VALUES (?, ?)",
        )
        .bind(asset_id)
        .bind(category_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to link asset to category: {}",
                e
            )))
        })?;

        Ok(())
    }

    /// Slugs of every category the asset is linked to, ordered by name
    pub async fn asset_category_slugs(&self, asset_id: AssetId) -> Result<Vec<String>> {
        let slugs: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT c.slug FROM categories c
            JOIN asset_categories ac ON ac.category_id = c.id
            WHERE ac.asset_id = ?
            ORDER BY c.name ASC
            "#,
        )
        .bind(asset_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to list asset categories: {}",
                e
            )))
        })?;

        Ok(slugs)
    }
}
