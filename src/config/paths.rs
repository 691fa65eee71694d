// src/config/paths.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info};

use crate::config::loader::load_layout;
use crate::config::model::ConfigFile;
use crate::copy::CopyBinding;
use crate::errors::{BuildError, Result};
use crate::matcher::GlobPattern;

/// Go workspace holding the `bpy` checkout.
pub const GOPATH_VAR: &str = "GOPATH";

/// Location of the rendered man pages inside `$GOPATH`.
pub const MAN_PAGES_SUBDIR: &str = "src/github.com/buppyio/bpy/doc/man";

/// Every location the build touches, resolved once at startup.
///
/// Nothing reads the environment after this value exists.
#[derive(Debug, Clone)]
pub struct BuildPaths {
    pub root: PathBuf,
    /// `$GOPATH`.
    pub docs_root: PathBuf,
    pub man_pages_dir: PathBuf,
    pub templates_dir: PathBuf,
    pub css_sources: GlobPattern,
    pub css_output_dir: PathBuf,
    pub libs: Vec<CopyBinding>,
    pub debounce: Duration,
}

impl BuildPaths {
    /// Resolve against the process environment.
    pub fn from_env(root: &Path, config: Option<&Path>) -> Result<Self> {
        Self::resolve_with(root, config, |key| std::env::var(key).ok())
    }

    /// Resolve with an explicit environment lookup.
    ///
    /// `GOPATH` is checked before the layout file is read, so a missing
    /// variable fails without touching the filesystem.
    pub fn resolve_with<F>(root: &Path, config: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let gopath = required_var(&lookup, GOPATH_VAR)?;
        let root = absolute_root(root)?;
        let layout = load_layout(&root, config)?;
        Self::from_layout(&root, Path::new(&gopath), &layout)
    }

    /// Combine an already validated layout with the docs root.
    pub fn from_layout(root: &Path, gopath: &Path, cfg: &ConfigFile) -> Result<Self> {
        let css_sources = GlobPattern::new(&cfg.layout.css_sources)?;
        let libs = cfg
            .libs
            .iter()
            .map(|lib| {
                Ok(CopyBinding {
                    pattern: GlobPattern::new(&lib.pattern)?,
                    dest: lib.dest.iter().map(|d| root.join(d)).collect(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let paths = Self {
            root: root.to_path_buf(),
            docs_root: gopath.to_path_buf(),
            man_pages_dir: gopath.join(MAN_PAGES_SUBDIR),
            templates_dir: root.join(&cfg.layout.templates_dir),
            css_sources,
            css_output_dir: root.join(&cfg.layout.css_output_dir),
            libs,
            debounce: Duration::from_millis(cfg.watch.debounce_ms),
        };
        info!(
            root = ?paths.root,
            docs_root = ?paths.docs_root,
            css_sources = %paths.css_sources,
            "resolved build paths"
        );
        Ok(paths)
    }
}

fn required_var<F>(lookup: &F, name: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => {
            debug!(var = name, value = %value, "read environment variable");
            Ok(value.trim().to_string())
        }
        _ => Err(BuildError::ConfigError(format!(
            "environment variable {name} must be set to the Go workspace containing bpy"
        ))),
    }
}

fn absolute_root(root: &Path) -> Result<PathBuf> {
    std::path::absolute(root).map_err(|e| BuildError::io(root, e))
}
