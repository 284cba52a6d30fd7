//! Core logging types: the [`Log`] trait, its message levels, and the run
//! header.
use std::fmt;
use std::path::PathBuf;

use crate::deploy::DeployMode;

/// `tracing` target for stage headers.
pub(super) const STAGE_TARGET: &str = "plugin_deploy::stage";
/// `tracing` target for planned dry-run actions.
pub(super) const DRY_RUN_TARGET: &str = "plugin_deploy::dry_run";
/// `tracing` target for the run header.
pub(super) const RUN_TARGET: &str = "plugin_deploy::run";

/// Abstraction over logging backends.
///
/// Both [`Logger`](super::logger::Logger) (direct output through `tracing`)
/// and [`BufferedLog`](super::buffered::BufferedLog) (in-memory capture)
/// implement this trait, so deployment code can log without knowing where
/// the output ends up.
pub trait Log: Send + Sync {
    /// Record what this run is about to deploy, once it is known.
    fn run(&self, header: &RunHeader);
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log an action that dry-run mode would have performed.
    fn dry_run(&self, msg: &str);
}

/// Kind of a logged message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Run header.
    Run,
    /// Stage header.
    Stage,
    /// Informational message.
    Info,
    /// Debug message.
    Debug,
    /// Warning.
    Warn,
    /// Error.
    Error,
    /// Dry-run action.
    DryRun,
}

/// What one invocation deploys and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunHeader {
    /// Human-readable plugin description (name, version, id).
    pub plugin: String,
    /// Deployment mode.
    pub mode: DeployMode,
    /// Resolved target path.
    pub target: PathBuf,
    /// Whether mutations are only reported.
    pub dry_run: bool,
}

impl fmt::Display for RunHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} mode{}) -> {}",
            self.plugin,
            self.mode,
            if self.dry_run { ", dry run" } else { "" },
            self.target.display()
        )
    }
}
