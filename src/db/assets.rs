//! Asset CRUD operations and the orchestrator-owned partial updates.
//!
//! The ingestion orchestrator only ever touches the columns it owns
//! (`state`, `processing_error`, the derived paths), so its updates never
//! race concurrent metadata edits.

use crate::error::DatabaseError;
use crate::types::{AssetId, ProcessingState};
use crate::{Error, Result};

use super::{AssetRow, Database, NewAsset};

/// Columns selected for every asset query
const ASSET_COLUMNS: &str = r#"
    id, title, file_path, kind, is_site_bundle, alt_text, description,
    source_archive_path, entry_document_path, sandbox_base_dir,
    state, processing_error, created_at, updated_at
"#;

/// Filters for listing assets
#[derive(Debug, Clone, Default)]
pub struct AssetFilter {
    /// Substring match over title, alt text, and description
    pub query: Option<String>,
    /// Exact media kind label ("image", "site", ...)
    pub kind: Option<String>,
    /// Category slug the asset must be linked to
    pub category_slug: Option<String>,
    /// Maximum number of rows to return
    pub limit: i64,
    /// Number of rows to skip
    pub offset: i64,
}

impl Database {
    /// Insert a new asset record
    pub async fn insert_asset(&self, asset: &NewAsset) -> Result<AssetId> {
        let now = chrono::Utc::now().timestamp();

        let result = sqlx::query(
            r#"
            INSERT INTO assets (
                title, file_path, kind, is_site_bundle, alt_text, description,
                state, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&asset.title)
        .bind(&asset.file_path)
        .bind(&asset.kind)
        .bind(asset.is_site_bundle as i32)
        .bind(&asset.alt_text)
        .bind(&asset.description)
        .bind(asset.state)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to insert asset: {}",
                e
            )))
        })?;

        Ok(AssetId(result.last_insert_rowid()))
    }

    /// Get an asset by ID
    pub async fn get_asset(&self, id: AssetId) -> Result<Option<AssetRow>> {
        let row = sqlx::query_as::<_, AssetRow>(&format!(
            "SELECT {} FROM assets WHERE id = ?",
            ASSET_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to get asset: {}",
                e
            )))
        })?;

        Ok(row)
    }

    /// List assets matching the filter, newest first
    pub async fn list_assets(&self, filter: &AssetFilter) -> Result<Vec<AssetRow>> {
        let mut qb = sqlx::QueryBuilder::<sqlx::Sqlite>::new(format!(
            "SELECT {} FROM assets WHERE 1 = 1",
            ASSET_COLUMNS
        ));
        Self::push_asset_filter(&mut qb, filter);
        qb.push(" ORDER BY created_at DESC, id DESC");
        qb.push(" LIMIT ").push_bind(filter.limit);
        qb.push(" OFFSET ").push_bind(filter.offset);

        let rows = qb
            .build_query_as::<AssetRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to list assets: {}",
                    e
                )))
            })?;

        Ok(rows)
    }

    /// Count assets matching the filter (ignoring limit/offset), for
    /// pagination metadata
    pub async fn count_assets(&self, filter: &AssetFilter) -> Result<i64> {
        let mut qb =
            sqlx::QueryBuilder::<sqlx::Sqlite>::new("SELECT COUNT(*) FROM assets WHERE 1 = 1");
        Self::push_asset_filter(&mut qb, filter);

        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to count assets: {}",
                    e
                )))
            })?;

        Ok(count)
    }

    /// Append the shared WHERE clauses for [`AssetFilter`]
    fn push_asset_filter<'a>(
        qb: &mut sqlx::QueryBuilder<'a, sqlx::Sqlite>,
        filter: &'a AssetFilter,
    ) {
        if let Some(query) = &filter.query {
            let pattern = format!("%{}%", query);
            qb.push(" AND (title LIKE ")
                .push_bind(pattern.clone())
                .push(" OR alt_text LIKE ")
                .push_bind(pattern.clone())
                .push(" OR description LIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(kind) = &filter.kind {
            qb.push(" AND kind = ").push_bind(kind.as_str());
        }
        if let Some(slug) = &filter.category_slug {
            qb.push(
                " AND id IN (SELECT ac.asset_id FROM asset_categories ac \
                 JOIN categories c ON c.id = ac.category_id WHERE c.slug = ",
            )
            .push_bind(slug.as_str())
            .push(")");
        }
    }

    /// Update editable metadata (title, alt text, description).
    ///
    /// Touches only metadata columns; the orchestrator-owned columns are
    /// never part of this statement.
    pub async fn update_asset_metadata(
        &self,
        id: AssetId,
        title: &str,
        alt_text: &str,
        description: &str,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE assets SET title = ?, alt_text = ?, description = ?, updated_at = ? WHERE id = ?",
        )
        .bind(title)
        .bind(alt_text)
        .bind(description)
        .bind(chrono::Utc::now().timestamp())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to update asset metadata: {}",
                e
            )))
        })?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete an asset record; category links cascade.
    ///
    /// Returns true if a row was removed.
    pub async fn delete_asset(&self, id: AssetId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM assets WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to delete asset: {}",
                    e
                )))
            })?;

        Ok(result.rows_affected() > 0)
    }

    /// Claim a site bundle for processing (pending|failed -> processing).
    ///
    /// The conditional UPDATE is the "claim" pattern: of two concurrent
    /// ingestion jobs for the same asset, exactly one observes an affected
    /// row. Assets whose derived paths are already set can never be claimed.
    pub async fn claim_for_processing(&self, id: AssetId) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE assets SET state = ?, updated_at = ?
            WHERE id = ? AND is_site_bundle = 1
              AND entry_document_path IS NULL
              AND state IN (?, ?)
            "#,
        )
        .bind(ProcessingState::Processing.to_i32())
        .bind(chrono::Utc::now().timestamp())
        .bind(id)
        .bind(ProcessingState::Pending.to_i32())
        .bind(ProcessingState::Failed.to_i32())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to claim asset for processing: {}",
                e
            )))
        })?;

        Ok(result.rows_affected() > 0)
    }

    /// Persist a successful ingestion: both derived paths, the recorded
    /// archive location, and state=ready in a single statement (atomic,
    /// both-or-neither).
    pub async fn set_site_paths(
        &self,
        id: AssetId,
        entry_document_path: &str,
        sandbox_base_dir: &str,
        source_archive_path: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE assets
            SET entry_document_path = ?, sandbox_base_dir = ?,
                source_archive_path = ?, state = ?, processing_error = NULL,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(entry_document_path)
        .bind(sandbox_base_dir)
        .bind(source_archive_path)
        .bind(ProcessingState::Ready.to_i32())
        .bind(chrono::Utc::now().timestamp())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to set site paths: {}",
                e
            )))
        })?;

        Ok(())
    }

    /// Persist a failed ingestion: state=failed plus the human-readable
    /// detail. The derived paths are left untouched.
    pub async fn set_ingest_failed(&self, id: AssetId, message: &str) -> Result<()> {
        sqlx::query("UPDATE assets SET state = ?, processing_error = ?, updated_at = ? WHERE id = ?")
            .bind(ProcessingState::Failed.to_i32())
            .bind(message)
            .bind(chrono::Utc::now().timestamp())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to record ingest failure: {}",
                    e
                )))
            })?;

        Ok(())
    }

    /// Reset a failed site bundle back to pending for an explicit retry.
    ///
    /// Returns false when the asset is not currently failed (retry of a
    /// ready or in-flight asset is a state conflict handled by the caller).
    pub async fn reset_for_retry(&self, id: AssetId) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE assets SET state = ?, processing_error = NULL, updated_at = ?
            WHERE id = ? AND is_site_bundle = 1 AND state = ?
            "#,
        )
        .bind(ProcessingState::Pending.to_i32())
        .bind(chrono::Utc::now().timestamp())
        .bind(id)
        .bind(ProcessingState::Failed.to_i32())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to reset asset for retry: {}",
                e
            )))
        })?;

        Ok(result.rows_affected() > 0)
    }

    /// IDs of site bundles still pending ingestion, oldest first.
    ///
    /// Used by the startup scan to re-enqueue jobs lost to a crash.
    pub async fn list_pending_site_bundles(&self) -> Result<Vec<AssetId>> {
        let ids: Vec<i64> = sqlx::query_scalar(
            "SELECT id FROM assets WHERE is_site_bundle = 1 AND state = ? ORDER BY id ASC",
        )
        .bind(ProcessingState::Pending.to_i32())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to list pending site bundles: {}",
                e
            )))
        })?;

        Ok(ids.into_iter().map(AssetId).collect())
    }
}
