// src/watch/cache.rs

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::fs::FileSystem;
use crate::matcher::match_files;
use crate::watch::binding::WatchBinding;

/// What an event did to a file's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentChange {
    /// New file, or the bytes differ from the last observation.
    Changed,
    /// Same bytes as last time (metadata touch, duplicate notification).
    Unchanged,
    /// The file is gone.
    Removed,
}

/// In-memory `blake3` hash per watched file.
///
/// Lives only as long as the watcher; nothing is persisted.
#[derive(Debug, Default)]
pub struct ContentCache {
    hashes: HashMap<PathBuf, blake3::Hash>,
}

impl ContentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash every file currently matched by `bindings`, so the first event
    /// after startup is compared against what the initial build saw.
    pub fn prime(&mut self, fs: &dyn FileSystem, root: &Path, bindings: &[WatchBinding]) {
        for pattern in bindings.iter().flat_map(|b| b.patterns()) {
            let files = match match_files(fs, root, pattern) {
                Ok(files) => files,
                Err(err) => {
                    warn!(pattern = %pattern, error = %err, "could not prime content cache");
                    continue;
                }
            };
            for file in files {
                if let Ok(bytes) = fs.read(&file) {
                    self.hashes.insert(file, blake3::hash(&bytes));
                }
            }
        }
        debug!(files = self.hashes.len(), "primed content cache");
    }

    /// Re-hash `path` and report how it compares to the previous hash.
    pub fn observe(&mut self, fs: &dyn FileSystem, path: &Path) -> ContentChange {
        if fs.is_dir(path) {
            return ContentChange::Unchanged;
        }
        match fs.read(path) {
            Ok(bytes) => {
                let hash = blake3::hash(&bytes);
                match self.hashes.insert(path.to_path_buf(), hash) {
                    Some(previous) if previous == hash => ContentChange::Unchanged,
                    _ => ContentChange::Changed,
                }
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                self.hashes.remove(path);
                ContentChange::Removed
            }
            Err(err) => {
                // Mid-write or permission trouble: let the build report it.
                debug!(path = ?path, error = %err, "could not hash changed file");
                self.hashes.remove(path);
                ContentChange::Changed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn unchanged_bytes_are_detected() {
        let fs = MockFileSystem::new();
        fs.add_file("/p/a.less", "a { }");
        let mut cache = ContentCache::new();
        let path = Path::new("/p/a.less");

        assert_eq!(cache.observe(&fs, path), ContentChange::Changed);
        assert_eq!(cache.observe(&fs, path), ContentChange::Unchanged);

        fs.add_file("/p/a.less", "a { color: red; }");
        assert_eq!(cache.observe(&fs, path), ContentChange::Changed);
    }

    #[test]
    fn missing_file_is_removed() {
        let fs = MockFileSystem::new();
        let mut cache = ContentCache::new();
        assert_eq!(
            cache.observe(&fs, Path::new("/p/gone.less")),
            ContentChange::Removed
        );
    }
}
