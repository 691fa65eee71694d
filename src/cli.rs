// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, ValueEnum};

use crate::tasks;

/// Command-line arguments for `assetdag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "assetdag",
    version,
    about = "Build the static assets of the bpy browse UI, optionally watching for changes.",
    long_about = None
)]
pub struct CliArgs {
    /// Task to run: css, libs, default or watch.
    #[arg(value_name = "TASK", default_value = tasks::DEFAULT)]
    pub task: String,

    /// Build, then keep rebuilding CSS when sources change (same as TASK=watch).
    ///
    /// Cannot be combined with TASK other than `default` or `watch`.
    #[arg(long)]
    pub watch: bool,

    /// Project root containing `less/`, `node_modules/` and `www/`.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Layout file (TOML). Default: `Assetdag.toml` in the project root, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `ASSETDAG_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve paths and print the execution plan without running anything.
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    pub fn watch_mode(&self) -> bool {
        self.watch || self.task == tasks::WATCH
    }

    /// Reject argument combinations clap cannot express on its own.
    pub fn check(&self) -> Result<(), clap::Error> {
        if self.watch && self.task != tasks::DEFAULT && self.task != tasks::WATCH {
            return Err(CliArgs::command().error(
                ErrorKind::ArgumentConflict,
                format!(
                    "--watch always runs the `{}` task and cannot be combined with TASK `{}`",
                    tasks::WATCH,
                    self.task
                ),
            ));
        }
        Ok(())
    }

    /// The task whose plan is executed first.
    pub fn target(&self) -> &str {
        if self.watch_mode() {
            tasks::WATCH
        } else {
            &self.task
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Parse and check the process arguments, exiting with a usage error on
/// failure.
pub fn parse() -> CliArgs {
    let args = CliArgs::parse();
    if let Err(err) = args.check() {
        err.exit();
    }
    args
}
