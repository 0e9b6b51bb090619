use crate::config::Config;
use crate::db::NewAsset;
use crate::types::{AssetId, ProcessingState};
use crate::vault::test_helpers::{create_test_vault, zip_bytes};
use crate::vault::MediaVault;
use std::time::Duration;


/// Create a vault whose config has been adjusted by the caller
async fn create_vault_with(adjust: impl FnOnce(&mut Config)) -> (MediaVault, tempfile::TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();

    let mut config = Config::default();
    config.storage.root = temp_dir.path().join("media");
    config.persistence.database_path = temp_dir.path().join("test.db");
    adjust(&mut config);

    let vault = MediaVault::new(config).await.unwrap();
    (vault, temp_dir)
}

/// Write a site bundle blob into the uploads area and insert a pending
/// record for it, without enqueueing any job; tests drive ingestion
/// explicitly for determinism.
async fn seed_site_bundle(vault: &MediaVault, name: &str, files: &[(&str, &[u8])]) -> AssetId {
    let relative = format!("uploads/2025/1/{name}");
    let absolute = vault.get_config().storage.root.join(&relative);
    std::fs::create_dir_all(absolute.parent().unwrap()).unwrap();
    std::fs::write(&absolute, zip_bytes(files)).unwrap();

    vault
        .db
        .insert_asset(&NewAsset {
            title: name.to_string(),
            file_path: relative,
            kind: "site".to_string(),
            is_site_bundle: true,
            alt_text: String::new(),
            description: String::new(),
            state: ProcessingState::Pending.to_i32(),
        })
        .await
        .unwrap()
}

/// Poll the asset until it reaches the expected state or the timeout expires
async fn wait_for_state(vault: &MediaVault, id: AssetId, expected: ProcessingState) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let row = vault.db.get_asset(id).await.unwrap();
        if let Some(row) = &row {
            if ProcessingState::from_i32(row.state) == expected {
                return;
            }
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "asset {id} did not reach {expected:?} in time (currently {:?})",
            row.map(|r| ProcessingState::from_i32(r.state))
        );
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
}
