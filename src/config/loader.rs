// src/config/loader.rs

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{BuildError, Result};

/// File name looked up in the project root when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "Assetdag.toml";

/// Load a layout file and return the raw, unvalidated `RawConfigFile`.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| BuildError::io(path, e))?;
    let config: RawConfigFile = toml::from_str(&contents)?;
    Ok(config)
}

/// Load a layout file from path and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    ConfigFile::try_from(raw_config)
}

/// Resolve the layout for a project.
///
/// With an explicit path the file must exist. Otherwise
/// `<root>/Assetdag.toml` is used if present and the built-in layout if not.
pub fn load_layout(root: &Path, explicit: Option<&Path>) -> Result<ConfigFile> {
    if let Some(path) = explicit {
        debug!(path = ?path, "loading layout file given on command line");
        return load_and_validate(path);
    }

    let path = default_config_path(root);
    match fs::metadata(&path) {
        Ok(_) => {
            debug!(path = ?path, "loading project layout file");
            load_and_validate(&path)
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(path = ?path, "no layout file; using built-in layout");
            Ok(ConfigFile::default())
        }
        Err(err) => Err(BuildError::io(path, err)),
    }
}

pub fn default_config_path(root: &Path) -> PathBuf {
    root.join(DEFAULT_CONFIG_FILE)
}
