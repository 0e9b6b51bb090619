//! Utility functions for storage naming and path manipulation

use std::path::{Path, PathBuf};

/// Maximum number of rename attempts when resolving file collisions
const MAX_RENAME_ATTEMPTS: u32 = 9999;

/// Sanitize an uploaded filename's stem into a lowercase slug.
///
/// Alphanumerics are kept (lowercased), runs of anything else collapse into a
/// single `-`. An empty result falls back to `"file"` so the storage path is
/// never blank.
pub fn slugify(stem: &str) -> String {
    let mut slug = String::with_capacity(stem.len());
    let mut last_dash = true; // suppress leading dashes

    for c in stem.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    if slug.is_empty() {
        "file".to_string()
    } else {
        slug
    }
}

/// Compute the uploads-relative storage path for a new blob:
/// `{year}/{month}/{slugified-stem}{.ext}`.
///
/// Files are organized by upload year/month so directories stay small.
pub fn upload_storage_path(filename: &str, now: chrono::DateTime<chrono::Utc>) -> PathBuf {
    use chrono::Datelike;

    let path = Path::new(filename);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase());

    let name = match extension {
        Some(ext) if !ext.is_empty() => format!("{}.{}", slugify(&stem), ext),
        _ => slugify(&stem),
    };

    PathBuf::from(now.year().to_string())
        .join(now.month().to_string())
        .join(name)
}

/// Find a path that does not collide with an existing file.
///
/// If `path` is free it is returned unchanged; otherwise ` (1)`, ` (2)`, ...
/// suffixes are tried. Falls back to the original path after
/// `MAX_RENAME_ATTEMPTS` rather than looping forever.
pub fn unique_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "file".to_string());
    let extension = path.extension().map(|e| e.to_string_lossy().to_string());
    let parent = path.parent().unwrap_or_else(|| Path::new(""));

    for i in 1..=MAX_RENAME_ATTEMPTS {
        let new_name = match &extension {
            Some(ext) => format!("{} ({}).{}", stem, i, ext),
            None => format!("{} ({})", stem, i),
        };
        let candidate = parent.join(new_name);
        if !candidate.exists() {
            return candidate;
        }
    }

    path.to_path_buf()
}

/// Convert a path to a storage-root-relative string with forward slashes.
///
/// Derived paths are persisted in this form so they stay valid across
/// platforms and across process restarts.
pub fn to_relative_string(path: &Path, root: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let mut out = String::new();
    for component in rel.components() {
        if !out.is_empty() {
            out.push('/');
        }
        out.push_str(&component.as_os_str().to_string_lossy());
    }
    Some(out)
}
