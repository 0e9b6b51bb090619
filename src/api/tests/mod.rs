use super::*;
use crate::db::NewAsset;
use crate::types::{AssetId, ProcessingState};
use crate::vault::test_helpers::{create_test_vault, zip_bytes};
use crate::MediaVault;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

mod categories;

/// Build a router backed by a fresh test vault
async fn test_app() -> (Router, Arc<MediaVault>, tempfile::TempDir) {
    let (vault, temp_dir) = create_test_vault().await;
    let vault = Arc::new(vault);
    let config = vault.get_config();
    let router = create_router(vault.clone(), config);
    (router, vault, temp_dir)
}

/// Collect a response body as JSON
async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Collect a response body as raw bytes
async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

/// Seed a ready site bundle directly through the vault, bypassing the queue
/// for determinism
async fn seed_ready_site(vault: &MediaVault, files: &[(&str, &[u8])]) -> AssetId {
    let relative = format!("uploads/2025/1/api-{}.zip", files.len());
    let absolute = vault.get_config().storage.root.join(&relative);
    std::fs::create_dir_all(absolute.parent().unwrap()).unwrap();
    std::fs::write(&absolute, zip_bytes(files)).unwrap();

    let id = vault
        .db
        .insert_asset(&NewAsset {
            title: "api site".to_string(),
            file_path: relative,
            kind: "site".to_string(),
            is_site_bundle: true,
            alt_text: String::new(),
            description: String::new(),
            state: ProcessingState::Pending.to_i32(),
        })
        .await
        .unwrap();

    vault.run_ingest(id).await;
    id
}

/// Poll the asset until it reaches the expected state or the timeout expires
async fn wait_for_state(vault: &MediaVault, id: AssetId, expected: ProcessingState) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        if let Some(row) = vault.db.get_asset(id).await.unwrap() {
            if ProcessingState::from_i32(row.state) == expected {
                return;
            }
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "asset {id} did not reach {expected:?} in time"
        );
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
}

/// Build a multipart/form-data request body for POST /assets
fn multipart_upload(
    filename: &str,
    file_content: &[u8],
    fields: &[(&str, &str)],
) -> Request<Body> {
    const BOUNDARY: &str = "media-vault-test-boundary";

    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; \
             filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(file_content);
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "\r\n--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/assets")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}
