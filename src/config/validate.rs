// src/config/validate.rs

use crate::config::model::{ConfigFile, LibSection, RawConfigFile};
use crate::errors::{BuildError, Result};
use crate::matcher::GlobPattern;

/// Upper bound for `[watch].debounce_ms`; anything larger is almost
/// certainly a unit mistake.
const MAX_DEBOUNCE_MS: u64 = 60_000;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = BuildError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.layout, raw.libs, raw.watch))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_layout(cfg)?;
    for (i, lib) in cfg.libs.iter().enumerate() {
        validate_lib(i, lib)?;
    }
    validate_watch(cfg)?;
    Ok(())
}

fn validate_layout(cfg: &RawConfigFile) -> Result<()> {
    let layout = &cfg.layout;
    non_empty("[layout].css_sources", &layout.css_sources)?;
    non_empty("[layout].css_output_dir", &layout.css_output_dir)?;
    non_empty("[layout].templates_dir", &layout.templates_dir)?;
    check_glob("[layout].css_sources", &layout.css_sources)
}

fn validate_lib(index: usize, lib: &LibSection) -> Result<()> {
    let field = format!("[[libs]] #{}", index + 1);
    non_empty(&format!("{field} pattern"), &lib.pattern)?;
    check_glob(&format!("{field} pattern"), &lib.pattern)?;

    if lib.dest.is_empty() {
        return Err(BuildError::ConfigError(format!(
            "{field} ('{}') must list at least one destination",
            lib.pattern
        )));
    }
    for dest in &lib.dest {
        non_empty(&format!("{field} dest"), dest)?;
    }
    Ok(())
}

fn validate_watch(cfg: &RawConfigFile) -> Result<()> {
    if cfg.watch.debounce_ms > MAX_DEBOUNCE_MS {
        return Err(BuildError::ConfigError(format!(
            "[watch].debounce_ms must be <= {MAX_DEBOUNCE_MS} (got {})",
            cfg.watch.debounce_ms
        )));
    }
    Ok(())
}

fn non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(BuildError::ConfigError(format!("{field} must not be empty")));
    }
    Ok(())
}

fn check_glob(field: &str, pattern: &str) -> Result<()> {
    GlobPattern::new(pattern)
        .map(|_| ())
        .map_err(|err| BuildError::ConfigError(format!("{field}: {err}")))
}
