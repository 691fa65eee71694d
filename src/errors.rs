// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! Every failure a build can surface maps onto one variant here, so the CLI
//! can print a single diagnostic naming the task, file and cause.

use std::path::PathBuf;

use thiserror::Error;

use crate::pipeline::StageError;

#[derive(Error, Debug)]
pub enum BuildError {
    /// Missing or invalid environment / layout input, detected before any
    /// task runs.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Duplicate task name: {0}")]
    DuplicateTask(String),

    #[error("Cycle detected in task graph: {0}")]
    DagCycle(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    /// The glob pattern itself is malformed. A pattern that matches nothing is
    /// not an error.
    #[error("Invalid glob pattern '{pattern}': {source}")]
    MatchError {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("{stage} failed on {}: {source}", path.display())]
    TransformError {
        stage: &'static str,
        path: PathBuf,
        #[source]
        source: StageError,
    },

    #[error("IO error on {}: {source}", path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("copying {} to {}: {source}", from.display(), to.display())]
    CopyError {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("task '{task}' failed: {source}")]
    TaskFailed {
        task: String,
        #[source]
        source: Box<BuildError>,
    },

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BuildError {
    /// Attach an IO failure to the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BuildError::IoError {
            path: path.into(),
            source,
        }
    }

    /// True for errors that are fatal at startup (before any output is
    /// touched): bad configuration or a bad task graph.
    pub fn is_startup_error(&self) -> bool {
        matches!(
            self,
            BuildError::ConfigError(_)
                | BuildError::DuplicateTask(_)
                | BuildError::DagCycle(_)
                | BuildError::TomlError(_)
        )
    }

    /// Name of the task that failed, if this error came out of a run.
    pub fn failed_task(&self) -> Option<&str> {
        match self {
            BuildError::TaskFailed { task, .. } => Some(task),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, BuildError>;
