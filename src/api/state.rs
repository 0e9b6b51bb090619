//! Application state for the API server

use crate::{Config, MediaVault};
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// This struct is cloned for each request (cheap Arc clone) and provides
/// access to the vault instance and configuration.
#[derive(Clone)]
pub struct AppState {
    /// The main MediaVault instance
    pub vault: Arc<MediaVault>,

    /// Configuration (for read access)
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(vault: Arc<MediaVault>, config: Arc<Config>) -> Self {
        Self { vault, config }
    }
}
