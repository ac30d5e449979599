//! Path utilities for locating lookup tables and scratch directories.

use std::path::PathBuf;

/// Returns the workspace root directory.
///
/// This is determined by walking up from the current crate's manifest directory
/// until we find the workspace Cargo.toml.
pub fn workspace_root() -> PathBuf {
    // Start from the test-utils crate manifest dir
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent()) // workspace root
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// Searches for a directory holding the real GERDA lookup tables.
///
/// This function checks the following locations in order:
/// 1. Environment variable `AR39_PDF_DATA_DIR` (if set)
/// 2. `lookup/` at the workspace root
///
/// A directory only counts if it contains the channel 0 table.
///
/// # Returns
///
/// `Some(PathBuf)` if the directory is found, `None` otherwise.
pub fn find_lookup_dir() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(dir) = std::env::var("AR39_PDF_DATA_DIR") {
        candidates.push(PathBuf::from(dir));
    }
    candidates.push(workspace_root().join("lookup"));

    candidates
        .into_iter()
        .find(|dir| dir.join("ar39-pdf-ch0.dat").exists())
}

/// Creates a temporary directory for generated lookup tables.
///
/// The directory is automatically cleaned up when the returned `TempDir` is dropped.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary test directory")
}
