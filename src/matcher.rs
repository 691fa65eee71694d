// src/matcher.rs

//! Glob-based file matching.
//!
//! Patterns are resolved against the filesystem every time a task runs, so
//! files created since the last run are picked up. Relative patterns are
//! anchored at the project root; only the literal directory prefix of a
//! pattern is walked (`less/*.less` never descends into `node_modules/`).

use std::fmt;
use std::path::{Component, Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};
use tracing::debug;

use crate::errors::{BuildError, Result};
use crate::fs::FileSystem;

/// A compiled glob pattern.
#[derive(Clone)]
pub struct GlobPattern {
    raw: String,
    matcher: GlobMatcher,
    /// Leading path components that contain no glob syntax.
    base: PathBuf,
    /// How many directory levels below `base` can match, or `None` for `**`.
    max_depth: Option<usize>,
}

impl fmt::Debug for GlobPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("GlobPattern").field(&self.raw).finish()
    }
}

impl fmt::Display for GlobPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl GlobPattern {
    /// Compile `pattern`. A malformed pattern is a `MatchError`.
    ///
    /// `*` does not cross directory separators; use `**` for recursion.
    pub fn new(pattern: &str) -> Result<Self> {
        let normalized = pattern.replace('\\', "/");
        let normalized = normalized.trim_start_matches("./");
        let matcher = GlobBuilder::new(normalized)
            .literal_separator(true)
            .build()
            .map_err(|source| BuildError::MatchError {
                pattern: pattern.to_string(),
                source,
            })?
            .compile_matcher();

        let mut base = PathBuf::new();
        let mut rest: Vec<&str> = Vec::new();
        for (i, part) in normalized.split('/').enumerate() {
            if !rest.is_empty() || has_glob_syntax(part) {
                rest.push(part);
            } else if i == 0 && part.is_empty() {
                base.push("/");
            } else if !part.is_empty() {
                base.push(part);
            }
        }

        let max_depth = if rest.iter().any(|p| p.contains("**")) {
            None
        } else {
            Some(rest.len())
        };

        Ok(Self {
            raw: pattern.to_string(),
            matcher,
            base,
            max_depth,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_absolute(&self) -> bool {
        self.base.is_absolute()
    }

    /// Directory the pattern is rooted at, resolved against `root`.
    pub fn base_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.base)
    }

    /// Whether a path matches. Relative patterns compare against the
    /// root-relative form of `path` (forward slashes).
    pub fn matches_path(&self, root: &Path, path: &Path) -> bool {
        if self.is_absolute() {
            return self.matcher.is_match(slashed(path));
        }
        match relative_to(root, path) {
            Some(rel) => self.matcher.is_match(rel),
            None => false,
        }
    }
}

fn has_glob_syntax(part: &str) -> bool {
    part.contains(['*', '?', '[', '{'])
}

fn slashed(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// `path` relative to `root` with forward slashes, ignoring `.` components.
pub fn relative_to(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    Some(parts.join("/"))
}

/// Enumerate files matching `pattern` under `root`.
///
/// Returns absolute (root-joined) paths in sorted order. A pattern whose base
/// directory does not exist matches nothing; that is not an error.
pub fn match_files(
    fs: &dyn FileSystem,
    root: &Path,
    pattern: &GlobPattern,
) -> Result<Vec<PathBuf>> {
    let base = pattern.base_dir(root);
    let mut files = Vec::new();

    if fs.is_file(&base) {
        if pattern.matches_path(root, &base) {
            files.push(base);
        }
        return Ok(files);
    }
    if !fs.is_dir(&base) {
        debug!(pattern = %pattern, base = ?base, "pattern base directory missing; no matches");
        return Ok(files);
    }

    let mut stack = vec![(base, 0usize)];
    while let Some((dir, depth)) = stack.pop() {
        let entries = fs.read_dir(&dir).map_err(|e| BuildError::io(&dir, e))?;
        for path in entries {
            if fs.is_dir(&path) {
                if pattern.max_depth.is_none_or(|max| depth + 1 < max) {
                    stack.push((path, depth + 1));
                }
            } else if fs.is_file(&path) && pattern.matches_path(root, &path) {
                files.push(path);
            }
        }
    }

    files.sort();
    debug!(pattern = %pattern, matched = files.len(), "resolved glob");
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    fn project() -> MockFileSystem {
        let fs = MockFileSystem::new();
        fs.add_file("/p/less/site.less", "a{}");
        fs.add_file("/p/less/theme.less", "b{}");
        fs.add_file("/p/less/notes.txt", "x");
        fs.add_file("/p/less/sub/deep.less", "c{}");
        fs.add_file("/p/node_modules/jquery/dist/jquery.js", "js");
        fs
    }

    #[test]
    fn star_does_not_cross_directories() {
        let fs = project();
        let pat = GlobPattern::new("less/*.less").unwrap();
        let files = match_files(&fs, Path::new("/p"), &pat).unwrap();
        assert_eq!(
            files,
            vec![
                PathBuf::from("/p/less/site.less"),
                PathBuf::from("/p/less/theme.less")
            ]
        );
    }

    #[test]
    fn double_star_recurses() {
        let fs = project();
        let pat = GlobPattern::new("less/**/*.less").unwrap();
        let files = match_files(&fs, Path::new("/p"), &pat).unwrap();
        assert!(files.contains(&PathBuf::from("/p/less/sub/deep.less")));
        assert!(files.contains(&PathBuf::from("/p/less/site.less")));
    }

    #[test]
    fn missing_base_is_empty_not_error() {
        let fs = project();
        let pat = GlobPattern::new("scss/*.scss").unwrap();
        assert!(match_files(&fs, Path::new("/p"), &pat).unwrap().is_empty());
    }

    #[test]
    fn malformed_pattern_is_match_error() {
        let err = GlobPattern::new("less/[*.less").unwrap_err();
        assert!(matches!(err, BuildError::MatchError { .. }));
        assert!(err.to_string().contains("less/[*.less"));
    }

    #[test]
    fn base_dir_is_literal_prefix() {
        let pat = GlobPattern::new("node_modules/bootstrap/dist/fonts/*").unwrap();
        assert_eq!(
            pat.base_dir(Path::new("/p")),
            PathBuf::from("/p/node_modules/bootstrap/dist/fonts")
        );
    }
}
