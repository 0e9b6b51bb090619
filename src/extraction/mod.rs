//! Safe extraction of uploaded site bundle archives
//!
//! This module materializes a zip archive into a per-asset sandbox directory.
//! Entries that would escape the sandbox (`..` segments, absolute paths) fail
//! the whole operation with `unsafe_archive_entry`; they are never silently
//! skipped. Decompressed-size and entry-count ceilings bound extraction of
//! malicious archives before they exhaust disk space.

use crate::error::{Error, IngestError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

/// Ceilings applied to a single archive extraction
#[derive(Debug, Clone, Copy)]
pub struct ExtractLimits {
    /// Maximum total decompressed bytes
    pub max_unpacked_bytes: u64,
    /// Maximum number of archive entries
    pub max_entries: usize,
}

impl From<&crate::config::IngestConfig> for ExtractLimits {
    fn from(config: &crate::config::IngestConfig) -> Self {
        Self {
            max_unpacked_bytes: config.max_unpacked_bytes,
            max_entries: config.max_entries,
        }
    }
}

/// Result of a successful extraction
#[derive(Debug, Clone)]
pub struct ExtractOutcome {
    /// Files written, in archive order (directories excluded)
    pub files: Vec<PathBuf>,
    /// Total decompressed bytes written
    pub total_bytes: u64,
}

/// Extract a site bundle archive into `dest_dir`.
///
/// `dest_dir` is created if absent; calling against an existing, possibly
/// partially populated directory is safe, and pre-existing unrelated content
/// is never deleted.
///
/// The archive is validated in full (entry names, entry count, declared
/// sizes) before anything is written, so an archive with a traversal entry
/// leaves the destination untouched.
pub fn extract_site_archive(
    archive_path: &Path,
    dest_dir: &Path,
    limits: ExtractLimits,
) -> Result<ExtractOutcome> {
    debug!(?archive_path, ?dest_dir, "extracting site bundle");

    let file = std::fs::File::open(archive_path).map_err(|e| {
        Error::Io(std::io::Error::other(format!(
            "failed to open archive: {}",
            e
        )))
    })?;

    let mut archive = zip::ZipArchive::new(file).map_err(|e| {
        Error::Ingest(IngestError::CorruptArchive {
            archive: archive_path.to_path_buf(),
            reason: format!("failed to read zip archive: {}", e),
        })
    })?;

    validate_archive(&mut archive, archive_path, limits)?;

    std::fs::create_dir_all(dest_dir).map_err(|e| {
        Error::Io(std::io::Error::other(format!(
            "failed to create destination: {}",
            e
        )))
    })?;

    let mut files = Vec::new();
    let mut total_bytes: u64 = 0;

    for i in 0..archive.len() {
        let entry = archive.by_index(i).map_err(|e| {
            Error::Ingest(IngestError::CorruptArchive {
                archive: archive_path.to_path_buf(),
                reason: format!("failed to read zip entry: {}", e),
            })
        })?;

        if let Some(written) = extract_entry(entry, dest_dir, archive_path, &mut total_bytes, limits)? {
            files.push(written);
        }
    }

    info!(
        ?archive_path,
        extracted_count = files.len(),
        total_bytes,
        "site bundle extraction successful"
    );

    Ok(ExtractOutcome { files, total_bytes })
}

/// Validation pass over the whole archive before any write happens
fn validate_archive(
    archive: &mut zip::ZipArchive<std::fs::File>,
    archive_path: &Path,
    limits: ExtractLimits,
) -> Result<()> {
    if archive.len() > limits.max_entries {
        return Err(Error::Ingest(IngestError::ArchiveTooLarge {
            archive: archive_path.to_path_buf(),
            reason: format!(
                "{} entries exceed the {} entry limit",
                archive.len(),
                limits.max_entries
            ),
        }));
    }

    let mut declared_bytes: u64 = 0;
    for i in 0..archive.len() {
        let entry = archive.by_index(i).map_err(|e| {
            Error::Ingest(IngestError::CorruptArchive {
                archive: archive_path.to_path_buf(),
                reason: format!("failed to read zip entry: {}", e),
            })
        })?;

        if entry.enclosed_name().is_none() {
            warn!(
                ?archive_path,
                entry = entry.name(),
                "rejecting archive with unsafe entry"
            );
            return Err(Error::Ingest(IngestError::UnsafeArchiveEntry {
                archive: archive_path.to_path_buf(),
                entry: entry.name().to_string(),
            }));
        }

        declared_bytes = declared_bytes.saturating_add(entry.size());
        if declared_bytes > limits.max_unpacked_bytes {
            return Err(Error::Ingest(IngestError::ArchiveTooLarge {
                archive: archive_path.to_path_buf(),
                reason: format!(
                    "declared decompressed size exceeds {} bytes",
                    limits.max_unpacked_bytes
                ),
            }));
        }
    }

    Ok(())
}

/// Extract a single entry to disk, creating directories as needed.
///
/// Returns the written file path, or None for directory entries. The running
/// byte count guards against archives whose declared sizes lie.
fn extract_entry(
    mut entry: zip::read::ZipFile,
    dest_dir: &Path,
    archive_path: &Path,
    total_bytes: &mut u64,
    limits: ExtractLimits,
) -> Result<Option<PathBuf>> {
    // Validation already established every name is enclosed; re-check rather
    // than unwrap so a racing archive rewrite cannot bypass the sandbox
    let relative = match entry.enclosed_name() {
        Some(path) => path.to_path_buf(),
        None => {
            return Err(Error::Ingest(IngestError::UnsafeArchiveEntry {
                archive: archive_path.to_path_buf(),
                entry: entry.name().to_string(),
            }));
        }
    };
    let out_path = dest_dir.join(relative);

    if entry.is_dir() {
        std::fs::create_dir_all(&out_path).map_err(|e| {
            Error::Io(std::io::Error::other(format!(
                "failed to create directory: {}",
                e
            )))
        })?;
        return Ok(None);
    }

    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            Error::Io(std::io::Error::other(format!(
                "failed to create parent directories: {}",
                e
            )))
        })?;
    }

    let mut outfile = std::fs::File::create(&out_path).map_err(|e| {
        Error::Io(std::io::Error::other(format!(
            "failed to create output file: {}",
            e
        )))
    })?;

    let written = std::io::copy(&mut entry, &mut outfile).map_err(|e| {
        Error::Io(std::io::Error::other(format!(
            "failed to extract file: {}",
            e
        )))
    })?;

    *total_bytes = total_bytes.saturating_add(written);
    if *total_bytes > limits.max_unpacked_bytes {
        return Err(Error::Ingest(IngestError::ArchiveTooLarge {
            archive: archive_path.to_path_buf(),
            reason: format!(
                "decompressed size exceeds {} bytes",
                limits.max_unpacked_bytes
            ),
        }));
    }

    Ok(Some(out_path))
}
