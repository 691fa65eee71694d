// src/copy.rs

//! Verbatim file copy into one or more destination directories.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::dag::TaskAction;
use crate::errors::{BuildError, Result};
use crate::fs::FileSystem;
use crate::matcher::{match_files, GlobPattern};

/// Files matched by `pattern` are copied into every directory in `dest`.
#[derive(Debug, Clone)]
pub struct CopyBinding {
    pub pattern: GlobPattern,
    pub dest: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct CopyTask {
    root: PathBuf,
    bindings: Vec<CopyBinding>,
}

impl CopyTask {
    pub fn new(root: impl Into<PathBuf>, bindings: Vec<CopyBinding>) -> Self {
        Self {
            root: root.into(),
            bindings,
        }
    }

    /// Copy everything, returning the destination paths written.
    pub fn copy_all(&self, fs: &dyn FileSystem) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();

        for binding in &self.bindings {
            for dir in &binding.dest {
                fs.create_dir_all(dir).map_err(|e| BuildError::io(dir, e))?;
            }

            let sources = match_files(fs, &self.root, &binding.pattern)?;
            for src in &sources {
                for dir in &binding.dest {
                    written.push(copy_into(fs, src, dir)?);
                }
            }

            info!(
                pattern = %binding.pattern,
                files = sources.len(),
                destinations = binding.dest.len(),
                "copied library files"
            );
        }

        Ok(written)
    }
}

fn copy_into(fs: &dyn FileSystem, src: &Path, dir: &Path) -> Result<PathBuf> {
    let to = match src.file_name() {
        Some(name) => dir.join(name),
        None => dir.to_path_buf(),
    };
    let copy_error = |source: std::io::Error| BuildError::CopyError {
        from: src.to_path_buf(),
        to: to.clone(),
        source,
    };

    let bytes = fs.read(src).map_err(copy_error)?;
    fs.write(&to, &bytes).map_err(copy_error)?;
    debug!(from = ?src, to = ?to, bytes = bytes.len(), "copied file");
    Ok(to)
}

impl TaskAction for CopyTask {
    fn run(&self, fs: &dyn FileSystem) -> Result<()> {
        self.copy_all(fs).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    fn binding(pattern: &str, dest: &[&str]) -> CopyBinding {
        CopyBinding {
            pattern: GlobPattern::new(pattern).unwrap(),
            dest: dest.iter().map(PathBuf::from).collect(),
        }
    }

    #[test]
    fn copies_bytes_into_every_destination() {
        let fs = MockFileSystem::new();
        fs.add_file("/p/node_modules/jquery/dist/jquery.min.js", vec![0u8, 159, 146, 150]);

        let task = CopyTask::new(
            "/p",
            vec![binding("node_modules/jquery/dist/*", &["/p/www/js", "/p/dist/js"])],
        );
        let written = task.copy_all(&fs).unwrap();

        assert_eq!(written.len(), 2);
        assert_eq!(
            fs.contents("/p/www/js/jquery.min.js"),
            Some(vec![0u8, 159, 146, 150])
        );
        assert_eq!(
            fs.contents("/p/dist/js/jquery.min.js"),
            Some(vec![0u8, 159, 146, 150])
        );
    }

    #[test]
    fn creates_destination_even_without_matches() {
        let fs = MockFileSystem::new();
        let task = CopyTask::new("/p", vec![binding("node_modules/none/*", &["/p/www/fonts"])]);
        assert!(task.copy_all(&fs).unwrap().is_empty());
        assert!(fs.is_dir(Path::new("/p/www/fonts")));
    }

    #[test]
    fn write_failure_names_both_paths() {
        let fs = MockFileSystem::new();
        fs.add_file("/p/lib/a.js", "a");
        fs.fail_writes_to("/p/www/js/a.js");

        let task = CopyTask::new("/p", vec![binding("lib/*.js", &["/p/www/js"])]);
        let err = task.copy_all(&fs).unwrap_err();
        match err {
            BuildError::CopyError { from, to, .. } => {
                assert_eq!(from, PathBuf::from("/p/lib/a.js"));
                assert_eq!(to, PathBuf::from("/p/www/js/a.js"));
            }
            other => panic!("expected CopyError, got {other:?}"),
        }
    }
}
