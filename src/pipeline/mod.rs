// src/pipeline/mod.rs

//! File transform pipelines.
//!
//! A [`Pipeline`] matches its input pattern, pushes each file through an
//! ordered list of [`Stage`]s and writes one output per input. The first
//! failure aborts the whole pipeline: files processed before it keep their
//! fresh output, the failing file and everything after it are left untouched.

pub mod stage;

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::dag::TaskAction;
use crate::errors::{BuildError, Result};
use crate::fs::FileSystem;
use crate::matcher::{match_files, GlobPattern};

pub use stage::{Stage, StageError};

/// An ordered chain of stages applied to every file matched by `input`.
#[derive(Debug)]
pub struct Pipeline {
    root: PathBuf,
    input: GlobPattern,
    stages: Vec<Box<dyn Stage>>,
    output_dir: PathBuf,
    output_extension: String,
}

impl Pipeline {
    pub fn new(
        root: impl Into<PathBuf>,
        input: GlobPattern,
        output_dir: impl Into<PathBuf>,
        output_extension: impl Into<String>,
    ) -> Self {
        Self {
            root: root.into(),
            input,
            stages: Vec::new(),
            output_dir: output_dir.into(),
            output_extension: output_extension.into(),
        }
    }

    /// Append a stage. Stages run in the order they were added.
    pub fn stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Output location for `input`: same stem, extension rewritten.
    pub fn output_path_for(&self, input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.output_dir
            .join(format!("{stem}.{}", self.output_extension))
    }

    /// Run every stage over `content` in order.
    pub fn transform(&self, path: &Path, content: String) -> Result<String> {
        self.stages.iter().try_fold(content, |acc, stage| {
            stage
                .apply(path, &acc)
                .map_err(|source| BuildError::TransformError {
                    stage: stage.name(),
                    path: path.to_path_buf(),
                    source,
                })
        })
    }

    /// Process every matched file, returning the outputs written.
    pub fn process(&self, fs: &dyn FileSystem) -> Result<Vec<PathBuf>> {
        let inputs = match_files(fs, &self.root, &self.input)?;
        if inputs.is_empty() {
            info!(pattern = %self.input, "no input files matched; nothing to do");
            return Ok(Vec::new());
        }

        let mut written = Vec::with_capacity(inputs.len());
        for input in inputs {
            let content = fs
                .read_to_string(&input)
                .map_err(|e| BuildError::io(&input, e))?;

            let output = self.transform(&input, content)?;

            let dest = self.output_path_for(&input);
            fs.write(&dest, output.as_bytes())
                .map_err(|e| BuildError::io(&dest, e))?;
            debug!(input = ?input, output = ?dest, bytes = output.len(), "wrote pipeline output");
            written.push(dest);
        }

        info!(
            pattern = %self.input,
            files = written.len(),
            output_dir = ?self.output_dir,
            "pipeline finished"
        );
        Ok(written)
    }
}

impl TaskAction for Pipeline {
    fn run(&self, fs: &dyn FileSystem) -> Result<()> {
        self.process(fs).map(|_| ())
    }
}
