//! Core vault implementation split into focused submodules.
//!
//! The `MediaVault` struct and its methods are organized by domain:
//! - [`assets`] - Upload intake, deletion, explicit retry, queries
//! - [`ingest`] - Site bundle ingestion orchestration
//! - [`reaper`] - Sandbox removal after asset deletion
//! - [`jobs`] - Background job dispatch and worker coordination

mod assets;
mod ingest;
mod jobs;
mod reaper;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use assets::{AssetPage, NewAssetUpload};

use crate::config::Config;
use crate::db::Database;
use crate::error::Result;
use crate::types::{AssetJob, Event};

use std::sync::Arc;

/// Main vault instance (cloneable - all fields are Arc-wrapped)
///
/// Owns the database, the event broadcast channel, and the background job
/// workers that run ingestion and reaping off the request path.
#[derive(Clone)]
pub struct MediaVault {
    /// Database instance for persistence (wrapped in Arc for sharing across tasks)
    /// Public for integration tests and API handlers to query asset state
    pub db: Arc<Database>,
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
    /// Producer side of the background job queue
    pub(crate) job_tx: tokio::sync::mpsc::Sender<AssetJob>,
    /// Semaphore bounding concurrent job execution (respects ingest.workers)
    pub(crate) job_limit: Arc<tokio::sync::Semaphore>,
    /// Flag to indicate whether new work is accepted (cleared during shutdown)
    pub(crate) accepting_new: Arc<std::sync::atomic::AtomicBool>,
    /// Token cancelled when shutdown begins
    pub(crate) shutdown_token: tokio_util::sync::CancellationToken,
}

impl MediaVault {
    /// Create a new vault from configuration.
    ///
    /// Opens (and migrates) the database, creates the storage directories,
    /// starts the background job dispatcher, and re-enqueues any site
    /// bundles still pending from a previous run: jobs lost to a crash are
    /// redelivered, and the ingestion idempotency guard makes duplicate
    /// delivery safe.
    pub async fn new(config: Config) -> Result<Self> {
        let db = Arc::new(Database::new(&config.persistence.database_path).await?);

        tokio::fs::create_dir_all(config.uploads_dir()).await?;
        tokio::fs::create_dir_all(config.storage.root.join(&config.storage.sites_subdir)).await?;

        let (event_tx, _rx) = tokio::sync::broadcast::channel(1000);
        let (job_tx, job_rx) = tokio::sync::mpsc::channel(config.ingest.job_queue_depth);
        let workers = config.ingest.workers.max(1);

        let vault = Self {
            db,
            config: Arc::new(config),
            event_tx,
            job_tx,
            job_limit: Arc::new(tokio::sync::Semaphore::new(workers)),
            accepting_new: Arc::new(std::sync::atomic::AtomicBool::new(true)),
            shutdown_token: tokio_util::sync::CancellationToken::new(),
        };

        let _dispatcher = vault.start_job_dispatcher(job_rx);
        vault.requeue_pending().await?;

        Ok(vault)
    }

    /// Subscribe to vault events.
    ///
    /// Multiple subscribers are supported; events are broadcast to all.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Get the active configuration
    pub fn get_config(&self) -> Arc<Config> {
        self.config.clone()
    }

    /// Gracefully shut down the vault.
    ///
    /// Stops accepting new uploads and jobs, waits for in-flight background
    /// jobs to finish (bounded by a timeout), then closes the database.
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("Initiating graceful shutdown");

        // 1. Stop accepting new work
        self.accepting_new
            .store(false, std::sync::atomic::Ordering::SeqCst);

        // 2. Stop the job dispatcher
        self.shutdown_token.cancel();

        // 3. Wait for in-flight jobs by draining every worker permit
        let workers = self.config.ingest.workers.max(1) as u32;
        let shutdown_timeout = std::time::Duration::from_secs(30);
        match tokio::time::timeout(shutdown_timeout, self.job_limit.acquire_many(workers)).await {
            Ok(Ok(_permits)) => {
                tracing::info!("All background jobs completed");
            }
            Ok(Err(_)) => {
                tracing::warn!("Job semaphore closed before shutdown completed");
            }
            Err(_) => {
                tracing::warn!("Timeout waiting for background jobs, proceeding with shutdown");
            }
        }

        // 4. Emit shutdown event
        let _ = self.event_tx.send(Event::Shutdown);

        // 5. Close database connections
        self.db.close().await;

        tracing::info!("Graceful shutdown complete");
        Ok(())
    }

    /// Spawn the REST API server as a background task.
    ///
    /// Returns the join handle; the server runs until the process exits or
    /// the task is aborted.
    pub fn spawn_api_server(self: &Arc<Self>) -> tokio::task::JoinHandle<Result<()>> {
        let vault = Arc::clone(self);
        let config = vault.get_config();
        tokio::spawn(async move { crate::api::start_api_server(vault, config).await })
    }
}
