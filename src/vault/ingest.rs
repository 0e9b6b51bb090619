//! Site bundle ingestion orchestration.
//!
//! `run_ingest` coordinates extraction and entry location against the
//! persisted record: guard, claim, extract, locate, then a single atomic
//! update to ready (or failed with a stored message). Errors never escape to
//! the job dispatcher: a background job must not crash the worker, and a
//! retry storm on a permanently corrupt archive helps nobody.

use crate::extraction::{extract_site_archive, ExtractLimits};
use crate::locate::locate_entry;
use crate::types::{AssetId, Event};

use super::MediaVault;

impl MediaVault {
    /// Run site bundle ingestion for an asset.
    ///
    /// Safe to invoke any number of times: the call is a silent no-op when
    /// the asset is gone, is not a site bundle, or already has its derived
    /// paths recorded.
    pub async fn run_ingest(&self, asset_id: AssetId) {
        if let Err(e) = self.ingest_inner(asset_id).await {
            // ingest_inner persists domain failures itself; anything
            // reaching here is a database-level problem we can only log
            tracing::error!(asset_id = asset_id.0, error = %e, "ingestion job error");
        }
    }

    async fn ingest_inner(&self, asset_id: AssetId) -> crate::Result<()> {
        let Some(asset) = self.db.get_asset(asset_id).await? else {
            // The asset may have been deleted between enqueue and processing
            tracing::warn!(asset_id = asset_id.0, "asset not found, skipping ingestion");
            return Ok(());
        };

        // Idempotency guard: already processed, or nothing to process
        if !asset.is_site_bundle() || asset.entry_document_path.is_some() {
            tracing::debug!(asset_id = asset_id.0, "nothing to ingest");
            return Ok(());
        }

        // Claim pattern: of two concurrent jobs for the same asset, exactly
        // one proceeds
        if !self.db.claim_for_processing(asset_id).await? {
            tracing::debug!(asset_id = asset_id.0, "asset already claimed");
            return Ok(());
        }

        let _ = self.event_tx.send(Event::IngestStarted { id: asset_id });

        let storage_root = &self.config.storage.root;
        let archive_path = storage_root.join(&asset.file_path);
        if !archive_path.is_file() {
            tracing::warn!(asset_id = asset_id.0, ?archive_path, "uploaded archive missing");
            return self
                .fail_ingest(
                    asset_id,
                    &format!("uploaded archive not found at {}", asset.file_path),
                )
                .await;
        }

        let sandbox = self.config.sandbox_dir(asset_id);
        tracing::info!(asset_id = asset_id.0, ?sandbox, "extracting site bundle");

        let limits = ExtractLimits::from(&self.config.ingest);
        if let Err(e) = extract_site_archive(&archive_path, &sandbox, limits) {
            return self.fail_ingest(asset_id, &e.to_string()).await;
        }

        let entry_file_name = &self.config.ingest.entry_file_name;
        let located = match locate_entry(&sandbox, storage_root, entry_file_name) {
            Ok(located) => located,
            Err(e) => return self.fail_ingest(asset_id, &e.to_string()).await,
        };

        let Some(entry) = located else {
            return self
                .fail_ingest(
                    asset_id,
                    &format!("no {} found in archive", entry_file_name),
                )
                .await;
        };

        // Both derived paths, the archive location, and state=ready land in
        // one statement
        self.db
            .set_site_paths(
                asset_id,
                &entry.entry_path,
                &entry.base_dir,
                &archive_path.display().to_string(),
            )
            .await?;

        if self.config.ingest.delete_archive_after_extract {
            if let Err(e) = tokio::fs::remove_file(&archive_path).await {
                tracing::warn!(asset_id = asset_id.0, error = %e, "failed to delete extracted archive");
            }
        }

        tracing::info!(
            asset_id = asset_id.0,
            entry = %entry.entry_path,
            "site bundle ready"
        );
        let _ = self.event_tx.send(Event::IngestCompleted {
            id: asset_id,
            entry_document_path: entry.entry_path,
        });

        Ok(())
    }

    /// Record a failed ingestion and emit the matching event
    async fn fail_ingest(&self, asset_id: AssetId, message: &str) -> crate::Result<()> {
        tracing::warn!(asset_id = asset_id.0, message, "site bundle ingestion failed");
        self.db.set_ingest_failed(asset_id, message).await?;
        let _ = self.event_tx.send(Event::IngestFailed {
            id: asset_id,
            reason: message.to_string(),
        });
        Ok(())
    }
}
