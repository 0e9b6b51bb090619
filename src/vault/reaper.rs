//! Sandbox removal after asset deletion.

use crate::types::{AssetId, Event};

use super::MediaVault;

impl MediaVault {
    /// Remove the asset's extraction sandbox.
    ///
    /// The sandbox path is derived the same way the orchestrator derives it,
    /// so the two always agree. A missing sandbox is success; deletion is
    /// idempotent. Failures are logged and suppressed; a reap job must never
    /// kill the worker.
    pub async fn run_reap(&self, asset_id: AssetId) {
        let sandbox = self.config.sandbox_dir(asset_id);

        match tokio::fs::remove_dir_all(&sandbox).await {
            Ok(()) => {
                tracing::info!(asset_id = asset_id.0, ?sandbox, "sandbox removed");
                let _ = self.event_tx.send(Event::SandboxRemoved { id: asset_id });
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(asset_id = asset_id.0, "no sandbox to remove");
                let _ = self.event_tx.send(Event::SandboxRemoved { id: asset_id });
            }
            Err(e) => {
                tracing::error!(asset_id = asset_id.0, ?sandbox, error = %e, "failed to remove sandbox");
            }
        }
    }
}
