// src/pipeline/stage.rs

use std::fmt::Debug;
use std::path::Path;

use thiserror::Error;

/// Why a stage rejected a file's content.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StageError {
    #[error("syntax error at line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("unsupported at line {line}: {message}")]
    Unsupported { line: usize, message: String },

    #[error("undefined variable @{name} at line {line}")]
    UndefinedVariable { line: usize, name: String },
}

impl StageError {
    pub fn syntax(line: usize, message: impl Into<String>) -> Self {
        StageError::Syntax {
            line,
            message: message.into(),
        }
    }

    pub fn unsupported(line: usize, message: impl Into<String>) -> Self {
        StageError::Unsupported {
            line,
            message: message.into(),
        }
    }

    pub fn line(&self) -> usize {
        match self {
            StageError::Syntax { line, .. }
            | StageError::Unsupported { line, .. }
            | StageError::UndefinedVariable { line, .. } => *line,
        }
    }
}

/// One pure content transform.
///
/// Implementations must be deterministic: the same input always yields the
/// same output.
pub trait Stage: Send + Sync + Debug {
    /// Short name used in diagnostics (e.g. `"less"`).
    fn name(&self) -> &'static str;

    fn apply(&self, path: &Path, input: &str) -> Result<String, StageError>;
}
