// src/config/mod.rs

//! Build configuration.
//!
//! - `model.rs`: the optional `Assetdag.toml` layout file.
//! - `loader.rs`: reading it from disk (or falling back to defaults).
//! - `validate.rs`: turning the raw file into a checked `ConfigFile`.
//! - `paths.rs`: combining environment and layout into immutable `BuildPaths`.

pub mod loader;
pub mod model;
pub mod paths;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, load_layout};
pub use model::{ConfigFile, LayoutSection, LibSection, RawConfigFile, WatchSection};
pub use paths::BuildPaths;
