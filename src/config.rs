//! Configuration types for media-vault

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use utoipa::ToSchema;

/// Storage layout configuration (upload blobs and extraction sandboxes)
///
/// Both original uploads and extraction sandboxes live under [`Self::root`];
/// the sandbox for asset `N` is `{root}/{sites_subdir}/{N}/`.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct StorageConfig {
    /// Filesystem root under which all media lives (default: "./media")
    #[serde(default = "default_storage_root")]
    pub root: PathBuf,

    /// Subdirectory of the root holding per-asset site sandboxes
    /// (default: "html_sites")
    #[serde(default = "default_sites_subdir")]
    pub sites_subdir: String,

    /// Subdirectory of the root holding uploaded blobs (default: "uploads")
    #[serde(default = "default_uploads_subdir")]
    pub uploads_subdir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
            sites_subdir: default_sites_subdir(),
            uploads_subdir: default_uploads_subdir(),
        }
    }
}

/// Ingestion pipeline configuration (extraction ceilings, entry document,
/// worker pool)
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct IngestConfig {
    /// File name the entry-point locator searches for (default: "index.html")
    #[serde(default = "default_entry_file_name")]
    pub entry_file_name: String,

    /// Ceiling on total decompressed bytes per archive (default: 1 GiB)
    ///
    /// Extraction fails with `archive_too_large` before this much has been
    /// written, guarding against zip bombs.
    #[serde(default = "default_max_unpacked_bytes")]
    pub max_unpacked_bytes: u64,

    /// Ceiling on the number of entries per archive (default: 10000)
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Number of background job workers (default: 2)
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Bound of the in-process job queue (default: 256)
    #[serde(default = "default_job_queue_depth")]
    pub job_queue_depth: usize,

    /// Delete the uploaded archive blob once extraction succeeds
    /// (default: false; the blob is retained and only its path recorded)
    #[serde(default)]
    pub delete_archive_after_extract: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            entry_file_name: default_entry_file_name(),
            max_unpacked_bytes: default_max_unpacked_bytes(),
            max_entries: default_max_entries(),
            workers: default_workers(),
            job_queue_depth: default_job_queue_depth(),
            delete_archive_after_extract: false,
        }
    }
}

/// Static gateway response policy
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct GatewayConfig {
    /// Send cache-disabling headers on every served file (default: true)
    ///
    /// The development-style default trades performance for iteration speed:
    /// edits to a sandboxed tree are immediately visible. Production
    /// deployments should turn this off.
    #[serde(default = "default_true")]
    pub disable_cache: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            disable_cache: true,
        }
    }
}

/// REST API server configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiConfig {
    /// Address the API server binds to (default: 127.0.0.1:8420)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Enable permissive CORS on API and gateway responses (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins; "*" or empty means any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Default page size for list endpoints (default: 24)
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: vec![],
            page_size: default_page_size(),
        }
    }
}

/// Persistence configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PersistenceConfig {
    /// Path to the SQLite database file (default: "./media_vault.db")
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

/// Top-level media-vault configuration
///
/// Works out of the box with zero configuration; every field has a sensible
/// default and can be overridden via serde deserialization.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// Storage layout
    #[serde(default)]
    pub storage: StorageConfig,

    /// Ingestion pipeline behavior
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Static gateway response policy
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// REST API server
    #[serde(default)]
    pub api: ApiConfig,

    /// Persistence
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

impl Config {
    /// Absolute sandbox directory for an asset: `{root}/{sites_subdir}/{id}`
    ///
    /// Deterministic per asset ID, so repeated ingestion runs and the reaper
    /// always agree on the location.
    pub fn sandbox_dir(&self, id: crate::types::AssetId) -> PathBuf {
        self.storage
            .root
            .join(&self.storage.sites_subdir)
            .join(id.to_string())
    }

    /// Absolute uploads directory: `{root}/{uploads_subdir}`
    pub fn uploads_dir(&self) -> PathBuf {
        self.storage.root.join(&self.storage.uploads_subdir)
    }
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("./media")
}

fn default_sites_subdir() -> String {
    "html_sites".to_string()
}

fn default_uploads_subdir() -> String {
    "uploads".to_string()
}

fn default_entry_file_name() -> String {
    "index.html".to_string()
}

fn default_max_unpacked_bytes() -> u64 {
    1024 * 1024 * 1024 // 1 GiB
}

fn default_max_entries() -> usize {
    10_000
}

fn default_workers() -> usize {
    2
}

fn default_job_queue_depth() -> usize {
    256
}

fn default_bind_address() -> SocketAddr {
    use std::net::{IpAddr, Ipv4Addr};
    SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8420)
}

fn default_page_size() -> u32 {
    24
}

fn default_true() -> bool {
    true
}

fn default_database_path() -> PathBuf {
    PathBuf::from("./media_vault.db")
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AssetId;

    #[test]
    fn default_config_is_complete() {
        let config = Config::default();
        assert_eq!(config.storage.root, PathBuf::from("./media"));
        assert_eq!(config.storage.sites_subdir, "html_sites");
        assert_eq!(config.ingest.entry_file_name, "index.html");
        assert_eq!(config.ingest.workers, 2);
        assert!(config.gateway.disable_cache);
        assert_eq!(config.api.page_size, 24);
    }

    #[test]
    fn sandbox_dir_is_deterministic_per_asset() {
        let config = Config::default();
        let a = config.sandbox_dir(AssetId(42));
        let b = config.sandbox_dir(AssetId(42));
        assert_eq!(a, b);
        assert_eq!(a, PathBuf::from("./media/html_sites/42"));
        assert_ne!(a, config.sandbox_dir(AssetId(43)));
    }

    #[test]
    fn config_deserializes_from_partial_json() {
        let config: Config = serde_json::from_str(
            r#"{
                "storage": { "root": "/srv/media" },
                "ingest": { "max_entries": 50 }
            }"#,
        )
        .unwrap();

        assert_eq!(config.storage.root, PathBuf::from("/srv/media"));
        assert_eq!(config.storage.sites_subdir, "html_sites");
        assert_eq!(config.ingest.max_entries, 50);
        assert_eq!(
            config.ingest.max_unpacked_bytes,
            default_max_unpacked_bytes()
        );
    }
}
