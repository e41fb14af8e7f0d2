use std::path::{Path, PathBuf};

pub mod error;
mod fs;
pub mod operations;

/// Resolves `path` against `base_dir` unless it is already absolute.
pub fn resolve_path(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}
