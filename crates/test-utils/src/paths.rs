//! Scratch directories for tests that write images.

use std::path::PathBuf;

use tempfile::TempDir;

/// Returns the workspace root directory.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent()) // workspace root
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// Fresh temporary directory, removed when the guard drops.
pub fn scratch_dir() -> TempDir {
    tempfile::Builder::new()
        .prefix("geo-surface-test-")
        .tempdir()
        .unwrap_or_else(|e| panic!("failed to create scratch dir: {}", e))
}

/// Path to `relative` inside `dir`, which need not exist yet.
pub fn scratch_path(dir: &TempDir, relative: &str) -> PathBuf {
    dir.path().join(relative)
}
