//! # media-vault
//!
//! Backend library for managing uploaded media assets, built around an
//! asynchronous HTML-site ingestion pipeline: zipped static-site bundles are
//! safely unpacked into per-asset sandboxes, their entry documents located
//! and recorded, and the extracted trees served back out through a
//! path-traversal-safe static gateway.
//!
//! ## Design Philosophy
//!
//! media-vault is designed to be:
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Sensible defaults** - Works out of the box with zero configuration
//! - **Event-driven** - Consumers subscribe to events, no polling required
//! - **Safe by default** - Hostile archives and hostile request paths fail
//!   closed
//!
//! ## Quick Start
//!
//! ```no_run
//! use media_vault::{Config, MediaVault};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let vault = Arc::new(MediaVault::new(Config::default()).await?);
//!
//!     // Subscribe to events
//!     let mut events = vault.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     // Serve the REST API and site gateway
//!     vault.spawn_api_server();
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API and static gateway server
pub mod api;
/// Configuration types
pub mod config;
/// Database persistence layer
pub mod db;
/// Error types
pub mod error;
/// Safe site bundle extraction
pub mod extraction;
/// Static gateway path resolution
pub mod gateway;
/// Entry-point location in extracted trees
pub mod locate;
/// Core types and events
pub mod types;
/// Utility functions
pub mod utils;
/// Core vault implementation (decomposed into focused submodules)
pub mod vault;

// Re-export commonly used types
pub use config::Config;
pub use db::Database;
pub use error::{ApiError, DatabaseError, Error, ErrorDetail, IngestError, Result, ToHttpStatus};
pub use types::{AssetId, AssetInfo, CategoryInfo, Event, MediaKind, ProcessingState};
pub use vault::{MediaVault, NewAssetUpload};

/// Helper function to run the vault with graceful signal handling.
///
/// Waits for a termination signal and then calls the vault's `shutdown()`
/// method.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal
///   registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use media_vault::{Config, MediaVault, run_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let vault = MediaVault::new(Config::default()).await?;
///
///     // Run with automatic signal handling
///     run_with_shutdown(vault).await?;
///
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(vault: MediaVault) -> Result<()> {
    wait_for_signal().await;
    vault.shutdown().await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    // Set up signal handlers - these may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
