//! Entry-point location for extracted site bundles
//!
//! Walks an extracted tree looking for the entry document (conventionally
//! `index.html`). The traversal is breadth-first with directories visited in
//! ascending name order, so bundles with several candidate entry documents
//! resolve the same way on every run: first match wins, shallower beats
//! deeper, `a/` beats `b/`.

use crate::error::{Error, Result};
use crate::utils::to_relative_string;
use std::collections::VecDeque;
use std::path::Path;
use tracing::debug;

/// A located entry document, expressed relative to the storage root so the
/// paths remain valid after the call returns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoint {
    /// Storage-root-relative path of the entry document itself
    pub entry_path: String,
    /// Storage-root-relative directory containing the entry document
    pub base_dir: String,
}

/// Search `root_dir` for a file literally named `entry_file_name`.
///
/// Returns `Ok(None)` when no match exists; absence is a normal outcome,
/// not a failure. The search stops at the first match; other candidates are
/// never enumerated.
pub fn locate_entry(
    root_dir: &Path,
    storage_root: &Path,
    entry_file_name: &str,
) -> Result<Option<EntryPoint>> {
    if !root_dir.is_dir() {
        return Ok(None);
    }

    let mut queue = VecDeque::new();
    queue.push_back(root_dir.to_path_buf());

    while let Some(dir) = queue.pop_front() {
        let candidate = dir.join(entry_file_name);
        if candidate.is_file() {
            debug!(?candidate, "located entry document");

            let entry_path = to_relative_string(&candidate, storage_root).ok_or_else(|| {
                Error::Other(format!(
                    "entry document {} is outside the storage root",
                    candidate.display()
                ))
            })?;
            let base_dir = to_relative_string(&dir, storage_root).ok_or_else(|| {
                Error::Other(format!(
                    "entry directory {} is outside the storage root",
                    dir.display()
                ))
            })?;

            return Ok(Some(EntryPoint {
                entry_path,
                base_dir,
            }));
        }

        // Queue subdirectories in ascending name order for determinism
        let mut subdirs: Vec<_> = std::fs::read_dir(&dir)
            .map_err(|e| {
                Error::Io(std::io::Error::other(format!(
                    "failed to read directory: {}",
                    e
                )))
            })?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect();
        subdirs.sort();
        queue.extend(subdirs);
    }

    Ok(None)
}
