//! Asset operations: upload intake, deletion, explicit retry, and queries.

use crate::db::{AssetFilter, AssetRow, NewAsset};
use crate::error::{Error, Result};
use crate::types::{AssetId, Event, MediaKind, ProcessingState};
use crate::utils;

use super::MediaVault;

/// A validated upload handed to the vault by the upload-handling layer.
///
/// The site-bundle flag is already strictly typed here: the HTTP boundary
/// parses `"true"`/`"false"` exactly and rejects anything else before this
/// struct is built.
#[derive(Debug, Clone)]
pub struct NewAssetUpload {
    /// Original filename as uploaded
    pub filename: String,
    /// Raw file content
    pub content: Vec<u8>,
    /// Display title; defaults to the filename when empty
    pub title: Option<String>,
    /// Alternative text for accessibility
    pub alt_text: String,
    /// Free-form description
    pub description: String,
    /// Whether the upload is a zipped static-HTML site bundle
    pub is_site_bundle: bool,
    /// Category names to link (created on first use)
    pub categories: Vec<String>,
}

/// One page of an asset listing plus the total match count
#[derive(Debug, Clone)]
pub struct AssetPage {
    /// Matching rows for the requested page
    pub assets: Vec<AssetRow>,
    /// Total number of rows matching the filter
    pub total: i64,
}

impl MediaVault {
    /// Store an uploaded file and create its asset record.
    ///
    /// Site bundles are created in `pending` state and an ingestion job is
    /// enqueued; everything else is `ready` immediately. Returns the new
    /// asset's ID.
    pub async fn add_asset(&self, upload: NewAssetUpload) -> Result<AssetId> {
        if !self.accepting_new.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(Error::ShuttingDown);
        }
        if upload.filename.trim().is_empty() {
            return Err(Error::InvalidUpload("no filename provided".to_string()));
        }
        if upload.is_site_bundle && !upload.filename.to_lowercase().ends_with(".zip") {
            return Err(Error::InvalidUpload(
                "site bundles must be zip archives".to_string(),
            ));
        }

        // Store the blob under uploads/{year}/{month}/, dodging collisions
        let storage_root = &self.config.storage.root;
        let relative = utils::upload_storage_path(&upload.filename, chrono::Utc::now());
        let absolute = utils::unique_path(&self.config.uploads_dir().join(relative));
        if let Some(parent) = absolute.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&absolute, &upload.content).await?;

        let file_path = utils::to_relative_string(&absolute, storage_root).ok_or_else(|| {
            Error::Other(format!(
                "stored upload {} is outside the storage root",
                absolute.display()
            ))
        })?;

        let kind = MediaKind::classify(&upload.filename, upload.is_site_bundle);
        let state = if upload.is_site_bundle {
            ProcessingState::Pending
        } else {
            ProcessingState::Ready
        };

        let title = match upload.title {
            Some(title) if !title.trim().is_empty() => title,
            _ => upload.filename.clone(),
        };

        let asset_id = self
            .db
            .insert_asset(&NewAsset {
                title,
                file_path,
                kind: kind.as_str().to_string(),
                is_site_bundle: upload.is_site_bundle,
                alt_text: upload.alt_text,
                description: upload.description,
                state: state.to_i32(),
            })
            .await?;

        for name in &upload.categories {
            let slug = utils::slugify(name);
            let category = self.db.upsert_category(name, &slug).await?;
            self.db.link_asset_category(asset_id, category.id).await?;
        }

        tracing::info!(
            asset_id = asset_id.0,
            kind = kind.as_str(),
            is_site_bundle = upload.is_site_bundle,
            "asset created"
        );
        let _ = self.event_tx.send(Event::AssetCreated {
            id: asset_id,
            is_site_bundle: upload.is_site_bundle,
        });

        if upload.is_site_bundle {
            self.enqueue_ingest(asset_id).await?;
        }

        Ok(asset_id)
    }

    /// Delete an asset record and its stored blob, and enqueue sandbox
    /// removal.
    pub async fn delete_asset(&self, asset_id: AssetId) -> Result<()> {
        let asset = self
            .db
            .get_asset(asset_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("asset {}", asset_id)))?;

        if !self.db.delete_asset(asset_id).await? {
            return Err(Error::NotFound(format!("asset {}", asset_id)));
        }

        // Remove the uploaded blob best-effort; the record is already gone
        let blob = self.config.storage.root.join(&asset.file_path);
        if let Err(e) = tokio::fs::remove_file(&blob).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(asset_id = asset_id.0, error = %e, "failed to remove uploaded blob");
            }
        }

        tracing::info!(asset_id = asset_id.0, "asset deleted");
        let _ = self.event_tx.send(Event::AssetDeleted { id: asset_id });

        if asset.is_site_bundle() {
            self.enqueue_reap(asset_id).await;
        }

        Ok(())
    }

    /// Explicitly retry ingestion of a failed site bundle.
    ///
    /// Failed assets are never retried implicitly; this is the deliberate
    /// path back into the pipeline. Ready or in-flight assets conflict.
    pub async fn retry_ingest(&self, asset_id: AssetId) -> Result<()> {
        if !self.accepting_new.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(Error::ShuttingDown);
        }

        let asset = self
            .db
            .get_asset(asset_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("asset {}", asset_id)))?;

        if !asset.is_site_bundle() {
            return Err(Error::InvalidUpload(format!(
                "asset {} is not a site bundle",
                asset_id
            )));
        }

        if !self.db.reset_for_retry(asset_id).await? {
            return Err(Error::InvalidState {
                id: asset_id.0,
                operation: "retry".to_string(),
                state: ProcessingState::from_i32(asset.state).as_str().to_string(),
            });
        }

        tracing::info!(asset_id = asset_id.0, "retrying site bundle ingestion");
        self.enqueue_ingest(asset_id).await
    }

    /// Get an asset by ID
    pub async fn get_asset(&self, asset_id: AssetId) -> Result<Option<AssetRow>> {
        self.db.get_asset(asset_id).await
    }

    /// List assets matching the filter along with the total match count
    pub async fn list_assets(&self, filter: &AssetFilter) -> Result<AssetPage> {
        let assets = self.db.list_assets(filter).await?;
        let total = self.db.count_assets(filter).await?;
        Ok(AssetPage { assets, total })
    }
}
