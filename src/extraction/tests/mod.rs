use crate::error::{Error, IngestError};
use crate::extraction::*;
use std::path::Path;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const TEST_LIMITS: ExtractLimits = ExtractLimits {
    max_unpacked_bytes: 10 * 1024 * 1024,
    max_entries: 1000,
};

/// Create a zip archive containing the given (name, content) files.
/// Entry names are written verbatim, including unsafe ones.
fn create_zip_archive(archive_path: &Path, files: &[(&str, &[u8])]) {
    let file = std::fs::File::create(archive_path).unwrap();
    let mut writer = ::zip::ZipWriter::new(file);
    let options =
        ::zip::write::FileOptions::default().compression_method(::zip::CompressionMethod::Stored);
    for (name, content) in files {
        writer.start_file(*name, options).unwrap();
        std::io::Write::write_all(&mut writer, content).unwrap();
    }
    writer.finish().unwrap();
}

/// Create a zip archive with an explicit directory entry plus files
fn create_zip_with_dir(archive_path: &Path, dir: &str, files: &[(&str, &[u8])]) {
    let file = std::fs::File::create(archive_path).unwrap();
    let mut writer = ::zip::ZipWriter::new(file);
    let options =
        ::zip::write::FileOptions::default().compression_method(::zip::CompressionMethod::Stored);
    writer.add_directory(dir, options).unwrap();
    for (name, content) in files {
        writer.start_file(*name, options).unwrap();
        std::io::Write::write_all(&mut writer, content).unwrap();
    }
    writer.finish().unwrap();
}

/// Collect all file paths under a directory, relative, sorted
fn tree_of(root: &Path) -> Vec<String> {
    let mut paths: Vec<String> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    paths.sort();
    paths
}

// ---------------------------------------------------------------------------
// Safe archives reproduce their tree
// ---------------------------------------------------------------------------

#[test]
fn test_extract_reproduces_file_tree() {
    let tmp = TempDir::new().unwrap();
    let archive = tmp.path().join("site.zip");
    let dest = tmp.path().join("out");

    create_zip_archive(
        &archive,
        &[
            ("index.html", b"<html></html>".as_slice()),
            ("css/style.css", b"body{}".as_slice()),
            ("js/app.js", b"console.log(1)".as_slice()),
        ],
    );

    let outcome = extract_site_archive(&archive, &dest, TEST_LIMITS).unwrap();

    assert_eq!(outcome.files.len(), 3);
    assert_eq!(
        tree_of(&dest),
        vec!["css/style.css", "index.html", "js/app.js"]
    );
    assert_eq!(
        std::fs::read(dest.join("index.html")).unwrap(),
        b"<html></html>"
    );
    assert_eq!(outcome.total_bytes, 13 + 6 + 14);
}

#[test]
fn test_extract_handles_directory_entries() {
    let tmp = TempDir::new().unwrap();
    let archive = tmp.path().join("site.zip");
    let dest = tmp.path().join("out");

    create_zip_with_dir(
        &archive,
        "assets/",
        &[("assets/logo.svg", b"<svg/>".as_slice())],
    );

    let outcome = extract_site_archive(&archive, &dest, TEST_LIMITS).unwrap();
    assert_eq!(outcome.files.len(), 1);
    assert!(dest.join("assets").is_dir());
    assert!(dest.join("assets/logo.svg").is_file());
}

#[test]
fn test_extract_creates_missing_destination() {
    let tmp = TempDir::new().unwrap();
    let archive = tmp.path().join("site.zip");
    let dest = tmp.path().join("deeply/nested/out");

    create_zip_archive(&archive, &[("index.html", b"x".as_slice())]);
    extract_site_archive(&archive, &dest, TEST_LIMITS).unwrap();
    assert!(dest.join("index.html").is_file());
}

#[test]
fn test_extract_preserves_unrelated_content() {
    let tmp = TempDir::new().unwrap();
    let archive = tmp.path().join("site.zip");
    let dest = tmp.path().join("out");
    std::fs::create_dir_all(&dest).unwrap();
    std::fs::write(dest.join("keep.txt"), b"keep me").unwrap();

    create_zip_archive(&archive, &[("index.html", b"x".as_slice())]);
    extract_site_archive(&archive, &dest, TEST_LIMITS).unwrap();

    assert_eq!(std::fs::read(dest.join("keep.txt")).unwrap(), b"keep me");
    assert!(dest.join("index.html").is_file());
}

// ---------------------------------------------------------------------------
// Unsafe archives are rejected wholesale
// ---------------------------------------------------------------------------

#[test]
fn test_traversal_entry_rejected_and_nothing_written() {
    let tmp = TempDir::new().unwrap();
    let archive = tmp.path().join("evil.zip");
    let dest = tmp.path().join("out");

    create_zip_archive(
        &archive,
        &[
            ("index.html", b"x".as_slice()),
            ("../outside.txt", b"escape".as_slice()),
        ],
    );

    let err = extract_site_archive(&archive, &dest, TEST_LIMITS).unwrap_err();
    match err {
        Error::Ingest(IngestError::UnsafeArchiveEntry { entry, .. }) => {
            assert_eq!(entry, "../outside.txt");
        }
        other => panic!("expected UnsafeArchiveEntry, got {other:?}"),
    }

    // Validation happens before any write: the safe sibling was not
    // extracted either, and nothing escaped the destination
    assert!(!dest.exists());
    assert!(!tmp.path().join("outside.txt").exists());
}

#[test]
fn test_absolute_path_entry_rejected() {
    let tmp = TempDir::new().unwrap();
    let archive = tmp.path().join("evil.zip");
    let dest = tmp.path().join("out");

    create_zip_archive(&archive, &[("/etc/evil.txt", b"x".as_slice())]);

    let err = extract_site_archive(&archive, &dest, TEST_LIMITS).unwrap_err();
    assert!(matches!(
        err,
        Error::Ingest(IngestError::UnsafeArchiveEntry { .. })
    ));
    assert!(!dest.exists());
}

#[test]
fn test_nested_traversal_entry_rejected() {
    let tmp = TempDir::new().unwrap();
    let archive = tmp.path().join("evil.zip");
    let dest = tmp.path().join("out");

    // Resolves past the root even though it starts with a normal segment
    create_zip_archive(&archive, &[("a/../../outside.txt", b"x".as_slice())]);

    let err = extract_site_archive(&archive, &dest, TEST_LIMITS).unwrap_err();
    assert!(matches!(
        err,
        Error::Ingest(IngestError::UnsafeArchiveEntry { .. })
    ));
}

// ---------------------------------------------------------------------------
// Corruption and ceilings
// ---------------------------------------------------------------------------

#[test]
fn test_corrupt_archive_rejected() {
    let tmp = TempDir::new().unwrap();
    let archive = tmp.path().join("not-a-zip.zip");
    let dest = tmp.path().join("out");
    std::fs::write(&archive, b"this is not a zip file").unwrap();

    let err = extract_site_archive(&archive, &dest, TEST_LIMITS).unwrap_err();
    assert!(matches!(
        err,
        Error::Ingest(IngestError::CorruptArchive { .. })
    ));
}

#[test]
fn test_missing_archive_is_io_error() {
    let tmp = TempDir::new().unwrap();
    let err = extract_site_archive(
        &tmp.path().join("missing.zip"),
        &tmp.path().join("out"),
        TEST_LIMITS,
    )
    .unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn test_entry_count_ceiling() {
    let tmp = TempDir::new().unwrap();
    let archive = tmp.path().join("many.zip");
    let dest = tmp.path().join("out");

    create_zip_archive(
        &archive,
        &[
            ("a.txt", b"a".as_slice()),
            ("b.txt", b"b".as_slice()),
            ("c.txt", b"c".as_slice()),
        ],
    );

    let limits = ExtractLimits {
        max_unpacked_bytes: 1024,
        max_entries: 2,
    };
    let err = extract_site_archive(&archive, &dest, limits).unwrap_err();
    assert!(matches!(
        err,
        Error::Ingest(IngestError::ArchiveTooLarge { .. })
    ));
    assert!(!dest.exists());
}

#[test]
fn test_decompressed_size_ceiling() {
    let tmp = TempDir::new().unwrap();
    let archive = tmp.path().join("big.zip");
    let dest = tmp.path().join("out");

    create_zip_archive(&archive, &[("big.bin", [0u8; 4096].as_slice())]);

    let limits = ExtractLimits {
        max_unpacked_bytes: 1024,
        max_entries: 100,
    };
    let err = extract_site_archive(&archive, &dest, limits).unwrap_err();
    assert!(matches!(
        err,
        Error::Ingest(IngestError::ArchiveTooLarge { .. })
    ));
    assert!(!dest.exists());
}
