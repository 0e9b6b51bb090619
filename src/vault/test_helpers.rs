//! Shared test helpers for creating MediaVault instances in tests.

use crate::config::Config;
use crate::vault::MediaVault;
use tempfile::tempdir;

/// Helper to create a test MediaVault instance with storage and database
/// inside a temp directory. Returns the vault and the tempdir (which must be
/// kept alive).
pub(crate) async fn create_test_vault() -> (MediaVault, tempfile::TempDir) {
    let temp_dir = tempdir().unwrap();

    let mut config = Config::default();
    config.storage.root = temp_dir.path().join("media");
    config.persistence.database_path = temp_dir.path().join("test.db");
    config.ingest.workers = 2;

    let vault = MediaVault::new(config).await.unwrap();
    (vault, temp_dir)
}

/// Build an in-memory zip archive from (name, content) pairs
pub(crate) fn zip_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = ::zip::ZipWriter::new(&mut cursor);
        let options = ::zip::write::FileOptions::default()
            .compression_method(::zip::CompressionMethod::Stored);
        for (name, content) in files {
            writer.start_file(*name, options).unwrap();
            std::io::Write::write_all(&mut writer, content).unwrap();
        }
        writer.finish().unwrap();
    }
    cursor.into_inner()
}
