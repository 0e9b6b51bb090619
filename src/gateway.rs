//! Static gateway: resolve (asset, sub-path) requests into sandboxed files
//!
//! The gateway maps a logical request to a concrete file inside the asset's
//! extraction sandbox. Every failure mode (unknown asset, not-ready bundle,
//! path escape, missing file, directory hit) collapses into `None`, which
//! the HTTP layer serves as a plain 404. Escape attempts are never
//! distinguishable from missing files, so nothing about the host filesystem
//! leaks.

use crate::db::AssetRow;
use crate::types::ProcessingState;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// `X-Frame-Options` value sent with every served file
pub const FRAME_OPTIONS: &str = "SAMEORIGIN";

/// `Content-Security-Policy` value restricting embedding to the same origin
pub const FRAME_ANCESTORS: &str = "frame-ancestors 'self'";

/// `Cache-Control` value used when per-environment cache disabling is on
pub const NO_CACHE: &str = "no-cache, no-store, must-revalidate";

/// A successfully resolved sandbox file, ready to stream
#[derive(Debug)]
pub struct ResolvedFile {
    /// Open file handle
    pub file: tokio::fs::File,
    /// File length in bytes
    pub len: u64,
    /// Best-effort content type guessed from the file suffix
    pub content_type: String,
}

/// Resolve `sub_path` inside the asset's sandbox.
///
/// The asset must be a ready site bundle with both derived paths recorded.
/// An empty `sub_path` substitutes the entry document's path relative to the
/// sandbox base directory (precomputed at ingestion time).
pub async fn resolve_site_path(
    asset: &AssetRow,
    storage_root: &Path,
    sub_path: &str,
) -> Option<ResolvedFile> {
    if !asset.is_site_bundle() || ProcessingState::from_i32(asset.state) != ProcessingState::Ready {
        return None;
    }
    let base_dir = asset.sandbox_base_dir.as_deref()?;
    let entry_path = asset.entry_document_path.as_deref()?;

    let requested = if sub_path.is_empty() {
        // Entry document, relative to the base directory
        entry_relative_to_base(entry_path, base_dir)?
    } else {
        sub_path.to_string()
    };

    let relative = normalize_within_sandbox(&requested)?;
    let candidate = storage_root.join(base_dir).join(relative);

    // Canonicalize both sides so symlinks cannot smuggle the resolved path
    // out of the sandbox; a missing file fails canonicalization and stays
    // indistinguishable from an escape
    let base_real = tokio::fs::canonicalize(storage_root.join(base_dir))
        .await
        .ok()?;
    let candidate_real = tokio::fs::canonicalize(&candidate).await.ok()?;
    if !candidate_real.starts_with(&base_real) {
        debug!(?candidate, "rejected path escaping the sandbox");
        return None;
    }

    let metadata = tokio::fs::metadata(&candidate_real).await.ok()?;
    if !metadata.is_file() {
        return None;
    }

    let file = tokio::fs::File::open(&candidate_real).await.ok()?;
    let content_type = mime_guess::from_path(&candidate_real)
        .first_or_octet_stream()
        .essence_str()
        .to_string();

    Some(ResolvedFile {
        file,
        len: metadata.len(),
        content_type,
    })
}

/// Strip the base directory prefix off the stored entry document path
fn entry_relative_to_base(entry_path: &str, base_dir: &str) -> Option<String> {
    let rest = entry_path.strip_prefix(base_dir)?;
    Some(rest.strip_prefix('/').unwrap_or(rest).to_string())
}

/// Lexically normalize a request path, resolving `.`/`..` segments.
///
/// Returns `None` when the path would climb out of the sandbox; the caller
/// maps that to a generic not-found.
fn normalize_within_sandbox(sub_path: &str) -> Option<PathBuf> {
    let mut stack: Vec<std::ffi::OsString> = Vec::new();

    for component in Path::new(sub_path).components() {
        match component {
            Component::Prefix(_) | Component::RootDir => return None,
            Component::CurDir => {}
            Component::ParentDir => {
                // Popping past the sandbox root is an escape
                stack.pop()?;
            }
            Component::Normal(segment) => stack.push(segment.to_os_string()),
        }
    }

    if stack.is_empty() {
        return None;
    }

    let mut path = PathBuf::new();
    for segment in stack {
        path.push(segment);
    }
    Some(path)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::AssetRow;
    use tempfile::TempDir;

    fn ready_site_row(id: i64) -> AssetRow {
        AssetRow {
            id,
            title: "Site".to_string(),
            file_path: "uploads/2025/3/site.zip".to_string(),
            kind: "site".to_string(),
            is_site_bundle: 1,
            alt_text: String::new(),
            description: String::new(),
            source_archive_path: Some("/media/uploads/site.zip".to_string()),
            entry_document_path: Some(format!("html_sites/{id}/site/index.html")),
            sandbox_base_dir: Some(format!("html_sites/{id}/site")),
            state: ProcessingState::Ready.to_i32(),
            processing_error: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    /// Lay out a ready sandbox for asset 42 under a temp storage root
    fn populate_sandbox(root: &Path) {
        let base = root.join("html_sites/42/site");
        std::fs::create_dir_all(base.join("css")).unwrap();
        std::fs::write(base.join("index.html"), b"<html>hi</html>").unwrap();
        std::fs::write(base.join("css/style.css"), b"body{}").unwrap();
    }

    #[tokio::test]
    async fn empty_sub_path_serves_entry_document() {
        let tmp = TempDir::new().unwrap();
        populate_sandbox(tmp.path());

        let resolved = resolve_site_path(&ready_site_row(42), tmp.path(), "")
            .await
            .unwrap();
        assert_eq!(resolved.content_type, "text/html");
        assert_eq!(resolved.len, 15);
    }

    #[tokio::test]
    async fn sub_path_resolves_inside_sandbox() {
        let tmp = TempDir::new().unwrap();
        populate_sandbox(tmp.path());

        let resolved = resolve_site_path(&ready_site_row(42), tmp.path(), "css/style.css")
            .await
            .unwrap();
        assert_eq!(resolved.content_type, "text/css");
    }

    #[tokio::test]
    async fn traversal_is_not_found_even_when_target_exists() {
        let tmp = TempDir::new().unwrap();
        populate_sandbox(tmp.path());
        std::fs::write(tmp.path().join("secret.txt"), b"secret").unwrap();

        for escape in [
            "../../../secret.txt",
            "../../etc/passwd",
            "css/../../../secret.txt",
            "/etc/passwd",
        ] {
            let resolved = resolve_site_path(&ready_site_row(42), tmp.path(), escape).await;
            assert!(resolved.is_none(), "escape {escape:?} must resolve to None");
        }
    }

    #[tokio::test]
    async fn dot_segments_inside_sandbox_are_allowed() {
        let tmp = TempDir::new().unwrap();
        populate_sandbox(tmp.path());

        let resolved =
            resolve_site_path(&ready_site_row(42), tmp.path(), "css/./../index.html").await;
        assert!(resolved.is_some());
    }

    #[tokio::test]
    async fn missing_file_and_directory_hit_are_none() {
        let tmp = TempDir::new().unwrap();
        populate_sandbox(tmp.path());

        assert!(
            resolve_site_path(&ready_site_row(42), tmp.path(), "nope.html")
                .await
                .is_none()
        );
        assert!(resolve_site_path(&ready_site_row(42), tmp.path(), "css")
            .await
            .is_none());
    }

    #[tokio::test]
    async fn unready_or_non_bundle_assets_are_none() {
        let tmp = TempDir::new().unwrap();
        populate_sandbox(tmp.path());

        let mut pending = ready_site_row(42);
        pending.state = ProcessingState::Pending.to_i32();
        assert!(resolve_site_path(&pending, tmp.path(), "")
            .await
            .is_none());

        let mut not_bundle = ready_site_row(42);
        not_bundle.is_site_bundle = 0;
        assert!(resolve_site_path(&not_bundle, tmp.path(), "")
            .await
            .is_none());

        let mut no_paths = ready_site_row(42);
        no_paths.entry_document_path = None;
        no_paths.sandbox_base_dir = None;
        assert!(resolve_site_path(&no_paths, tmp.path(), "")
            .await
            .is_none());
    }

    #[tokio::test]
    async fn unknown_suffix_defaults_to_octet_stream() {
        let tmp = TempDir::new().unwrap();
        populate_sandbox(tmp.path());
        std::fs::write(
            tmp.path().join("html_sites/42/site/data.weirdext"),
            b"\x00\x01",
        )
        .unwrap();

        let resolved = resolve_site_path(&ready_site_row(42), tmp.path(), "data.weirdext")
            .await
            .unwrap();
        assert_eq!(resolved.content_type, "application/octet-stream");
    }

    #[test]
    fn normalize_rejects_escapes_and_accepts_inner_dots() {
        assert!(normalize_within_sandbox("../x").is_none());
        assert!(normalize_within_sandbox("a/../../x").is_none());
        assert!(normalize_within_sandbox("/abs").is_none());
        assert!(normalize_within_sandbox("").is_none());
        assert_eq!(
            normalize_within_sandbox("a/./b/../c").unwrap(),
            PathBuf::from("a/c")
        );
    }
}
