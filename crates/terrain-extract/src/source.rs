//! Python source discovery

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File extension of Terrain sources
const PYTHON_EXTENSION: &str = "py";

/// All `.py` files under `root`, sorted by path
///
/// A missing root yields an empty list; unreadable directory entries are
/// skipped with a warning.
#[must_use]
pub fn python_sources(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::warn!("skipping unreadable entry under {}: {}", root.display(), err);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| ext == PYTHON_EXTENSION)
        })
        .collect();

    files.sort();
    files
}
