use crate::db::*;
use crate::types::{AssetId, ProcessingState};
use tempfile::NamedTempFile;

mod categories;

/// Create a minimal NewAsset for use in DB-backed tests
fn test_asset(is_site_bundle: bool) -> NewAsset {
    NewAsset {
        title: "Test Asset".to_string(),
        file_path: "uploads/2025/3/test.zip".to_string(),
        kind: if is_site_bundle { "site" } else { "other" }.to_string(),
        is_site_bundle,
        alt_text: String::new(),
        description: String::new(),
        state: if is_site_bundle {
            ProcessingState::Pending.to_i32()
        } else {
            ProcessingState::Ready.to_i32()
        },
    }
}

/// Create a fresh database backed by a temp file.
/// Returns the database and the temp file (which must be kept alive).
async fn test_db() -> (Database, NamedTempFile) {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();
    (db, temp_file)
}
