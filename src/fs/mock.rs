// src/fs/mock.rs

use super::FileSystem;
use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File(Vec<u8>),
    Dir(Vec<String>), // List of child names
}

/// In-memory filesystem for tests.
///
/// Paths are used as given (no normalisation), so tests should stick to one
/// spelling, typically absolute paths under `/project`. Individual paths can
/// be marked as failing to simulate read or write errors.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    files: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
    failing_writes: Arc<Mutex<Vec<PathBuf>>>,
    failing_reads: Arc<Mutex<Vec<PathBuf>>>,
    write_log: Arc<Mutex<Vec<PathBuf>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        let fs = Self::default();
        fs.lock().insert(PathBuf::from("/"), MockEntry::Dir(Vec::new()));
        fs
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, MockEntry>> {
        self.files.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = path.as_ref().to_path_buf();
        let mut files = self.lock();
        files.insert(path.clone(), MockEntry::File(content.into()));
        Self::link_into_parent(&mut files, &path);
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut files = self.lock();
        Self::ensure_dir_entry(&mut files, path.as_ref());
    }

    /// Make every later write to `path` fail with `PermissionDenied`.
    pub fn fail_writes_to(&self, path: impl AsRef<Path>) {
        if let Ok(mut failing) = self.failing_writes.lock() {
            failing.push(path.as_ref().to_path_buf());
        }
    }

    /// Make every later read of `path` fail with `PermissionDenied`.
    pub fn fail_reads_of(&self, path: impl AsRef<Path>) {
        if let Ok(mut failing) = self.failing_reads.lock() {
            failing.push(path.as_ref().to_path_buf());
        }
    }

    /// Contents of a file, if present.
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        match self.lock().get(path.as_ref()) {
            Some(MockEntry::File(content)) => Some(content.clone()),
            _ => None,
        }
    }

    /// Every file currently stored, sorted by path.
    pub fn snapshot(&self) -> BTreeMap<PathBuf, Vec<u8>> {
        self.lock()
            .iter()
            .filter_map(|(path, entry)| match entry {
                MockEntry::File(content) => Some((path.clone(), content.clone())),
                MockEntry::Dir(_) => None,
            })
            .collect()
    }

    /// Paths written through the `FileSystem` trait, in order.
    pub fn writes(&self) -> Vec<PathBuf> {
        self.write_log
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    fn link_into_parent(files: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        let Some(parent) = path.parent() else {
            return;
        };
        let parent = if parent.as_os_str().is_empty() {
            Path::new(".")
        } else {
            parent
        };

        Self::ensure_dir_entry(files, parent);
        if let Some(MockEntry::Dir(children)) = files.get_mut(parent) {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if !children.iter().any(|c| c == name) {
                    children.push(name.to_string());
                }
            }
        }
    }

    fn ensure_dir_entry(files: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        if files.contains_key(path) {
            return;
        }
        files.insert(path.to_path_buf(), MockEntry::Dir(Vec::new()));
        if path.parent().is_some_and(|p| p != path) {
            Self::link_into_parent(files, path);
        }
    }

    fn check_failing(list: &Mutex<Vec<PathBuf>>, path: &Path, op: &str) -> io::Result<()> {
        let failing = list.lock().map(|l| l.iter().any(|p| p == path)).unwrap_or(false);
        if failing {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("mock {op} failure for {:?}", path),
            ));
        }
        Ok(())
    }
}

impl FileSystem for MockFileSystem {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        Self::check_failing(&self.failing_reads, path, "read")?;
        match self.lock().get(path) {
            Some(MockEntry::File(content)) => Ok(content.clone()),
            Some(MockEntry::Dir(_)) => Err(io::Error::new(
                io::ErrorKind::Other,
                format!("Is a directory: {:?}", path),
            )),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("File not found: {:?}", path),
            )),
        }
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let bytes = self.read(path)?;
        String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        Self::check_failing(&self.failing_writes, path, "write")?;
        self.add_file(path, contents);
        if let Ok(mut log) = self.write_log.lock() {
            log.push(path.to_path_buf());
        }
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        Self::check_failing(&self.failing_writes, path, "mkdir")?;
        self.add_dir(path);
        Ok(())
    }

    fn is_file(&self, path: &Path) -> bool {
        matches!(self.lock().get(path), Some(MockEntry::File(_)))
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.lock().get(path), Some(MockEntry::Dir(_)))
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        match self.lock().get(path) {
            Some(MockEntry::Dir(children)) => {
                Ok(children.iter().map(|name| path.join(name)).collect())
            }
            _ => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Not a directory or not found: {:?}", path),
            )),
        }
    }
}
