// src/watch/path_utils.rs

//! Utility functions for path handling in the watcher.

use std::path::{Path, PathBuf};

/// Express an event path under `root` so glob matching sees the same prefix
/// the build uses.
///
/// Event paths normally already start with `root`. When they don't (e.g.
/// symlinks, or `/private/var` vs `/var` on macOS) both sides are
/// canonicalized and the relative part is re-joined onto `root`. Removed
/// files cannot be canonicalized, so their parent directory is used.
pub fn under_root(root: &Path, path: &Path) -> Option<PathBuf> {
    if path.starts_with(root) {
        return Some(path.to_path_buf());
    }

    let root_canon = root.canonicalize().ok()?;
    let path_canon = match path.canonicalize() {
        Ok(p) => p,
        Err(_) => {
            let parent = path.parent()?.canonicalize().ok()?;
            parent.join(path.file_name()?)
        }
    };
    let rel = path_canon.strip_prefix(&root_canon).ok()?;
    Some(root.join(rel))
}

/// The closest existing directory at or above `dir`.
pub fn existing_ancestor(dir: &Path) -> Option<PathBuf> {
    dir.ancestors().find(|d| d.is_dir()).map(Path::to_path_buf)
}
