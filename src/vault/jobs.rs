//! Background job dispatch: the explicit contract between persistence and
//! processing.
//!
//! Asset creation and deletion enqueue `AssetJob { asset_id, kind }` payloads
//! on a bounded channel; a dispatcher task hands them to workers bounded by
//! the `ingest.workers` semaphore. Handlers never return errors to the
//! dispatcher (every failure path is persisted on the asset record or
//! logged), so a poisonous job can never kill the worker pool.

use crate::error::{Error, Result};
use crate::types::{AssetId, AssetJob, JobKind};

use super::MediaVault;

impl MediaVault {
    /// Start the job dispatcher task.
    ///
    /// The dispatcher continuously:
    /// 1. Waits for the next job on the queue
    /// 2. Acquires a permit from the concurrency limiter (respects
    ///    `ingest.workers`)
    /// 3. Spawns a task running the job's handler
    /// 4. Repeats until shutdown
    pub(crate) fn start_job_dispatcher(
        &self,
        mut job_rx: tokio::sync::mpsc::Receiver<AssetJob>,
    ) -> tokio::task::JoinHandle<()> {
        let vault = self.clone();
        let job_limit = self.job_limit.clone();
        let shutdown = self.shutdown_token.clone();

        tokio::spawn(async move {
            loop {
                let job = tokio::select! {
                    _ = shutdown.cancelled() => break,
                    job = job_rx.recv() => match job {
                        Some(job) => job,
                        None => break,
                    },
                };

                let permit = match job_limit.clone().acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => break, // semaphore closed
                };

                let vault = vault.clone();
                tokio::spawn(async move {
                    let _permit = permit;
                    vault.dispatch_job(job).await;
                });
            }

            tracing::debug!("job dispatcher stopped");
        })
    }

    /// Run a single job to completion. Never panics or errors outward.
    pub(crate) async fn dispatch_job(&self, job: AssetJob) {
        tracing::debug!(asset_id = job.asset_id.0, kind = ?job.kind, "running job");
        match job.kind {
            JobKind::Ingest => self.run_ingest(job.asset_id).await,
            JobKind::Reap => self.run_reap(job.asset_id).await,
        }
    }

    /// Enqueue an ingestion job for the asset
    pub(crate) async fn enqueue_ingest(&self, asset_id: AssetId) -> Result<()> {
        self.enqueue(AssetJob {
            asset_id,
            kind: JobKind::Ingest,
        })
        .await
    }

    /// Enqueue a reap job for the asset.
    ///
    /// Failures are logged rather than surfaced: the record is already gone,
    /// and an orphaned sandbox is recoverable (it will be reaped on the next
    /// explicit delete or by operator cleanup).
    pub(crate) async fn enqueue_reap(&self, asset_id: AssetId) {
        let result = self
            .enqueue(AssetJob {
                asset_id,
                kind: JobKind::Reap,
            })
            .await;
        if let Err(e) = result {
            tracing::error!(asset_id = asset_id.0, error = %e, "failed to enqueue reap job");
        }
    }

    async fn enqueue(&self, job: AssetJob) -> Result<()> {
        self.job_tx
            .send(job)
            .await
            .map_err(|_| Error::ShuttingDown)
    }

    /// Re-enqueue every site bundle still pending ingestion.
    ///
    /// Called at startup so jobs lost to a crash are redelivered
    /// (at-least-once). Duplicate delivery is harmless: the claim update
    /// admits a single winner and ready assets are inert.
    pub(crate) async fn requeue_pending(&self) -> Result<()> {
        let pending = self.db.list_pending_site_bundles().await?;
        if pending.is_empty() {
            return Ok(());
        }

        tracing::info!(count = pending.len(), "re-enqueueing pending site bundles");
        for asset_id in pending {
            self.enqueue_ingest(asset_id).await?;
        }
        Ok(())
    }
}
