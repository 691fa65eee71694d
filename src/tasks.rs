// src/tasks.rs

//! The fixed task graph for the `bpy browse` static assets:
//!
//! ```text
//! css      less/*.less -> less -> autoprefix -> clean-css -> www/css/*.css
//! libs     bootstrap fonts and jquery dist -> www/fonts, www/js
//! default  [css, libs]
//! watch    [default], then rebuild css on source changes
//! ```

use crate::config::BuildPaths;
use crate::copy::CopyTask;
use crate::css::{Autoprefix, Less, Minify};
use crate::dag::TaskRegistry;
use crate::errors::Result;
use crate::pipeline::Pipeline;
use crate::watch::WatchBinding;

pub const CSS: &str = "css";
pub const LIBS: &str = "libs";
pub const DEFAULT: &str = "default";
pub const WATCH: &str = "watch";

/// The `css` pipeline: compile LESS, add vendor prefixes, minify.
pub fn css_pipeline(paths: &BuildPaths) -> Pipeline {
    Pipeline::new(
        paths.root.clone(),
        paths.css_sources.clone(),
        paths.css_output_dir.clone(),
        "css",
    )
    .stage(Less)
    .stage(Autoprefix)
    .stage(Minify)
}

/// The `libs` task: copy third-party assets verbatim.
pub fn libs_task(paths: &BuildPaths) -> CopyTask {
    CopyTask::new(paths.root.clone(), paths.libs.clone())
}

pub fn build_registry(paths: &BuildPaths) -> Result<TaskRegistry> {
    let mut registry = TaskRegistry::new();
    registry.register(CSS, &[], css_pipeline(paths))?;
    registry.register(LIBS, &[], libs_task(paths))?;
    registry.register_composite(DEFAULT, &[CSS, LIBS])?;
    registry.register_composite(WATCH, &[DEFAULT])?;
    Ok(registry)
}

/// Source patterns that trigger a rebuild in watch mode. Library files are
/// deliberately absent: they only change on `npm install`.
pub fn watch_bindings(paths: &BuildPaths) -> Vec<WatchBinding> {
    vec![WatchBinding::new(CSS, vec![paths.css_sources.clone()])]
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::config::ConfigFile;

    fn paths() -> BuildPaths {
        BuildPaths::from_layout(Path::new("/p"), Path::new("/go"), &ConfigFile::default()).unwrap()
    }

    #[test]
    fn registers_the_four_tasks() {
        let registry = build_registry(&paths()).unwrap();
        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            [CSS, LIBS, DEFAULT, WATCH]
        );
        assert_eq!(registry.get(DEFAULT).unwrap().deps, [CSS, LIBS]);
        assert!(registry.get(WATCH).unwrap().is_composite());
    }

    #[test]
    fn css_stages_run_in_order() {
        assert_eq!(
            css_pipeline(&paths()).stage_names(),
            ["less", "autoprefix", "clean-css"]
        );
    }

    #[test]
    fn only_css_is_watched() {
        let bindings = watch_bindings(&paths());
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].task(), CSS);
    }
}
