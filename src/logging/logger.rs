//! Console and file logger backed by `tracing`.
use std::path::{Path, PathBuf};

use super::types::{DRY_RUN_TARGET, Log, RUN_TARGET, RunHeader, STAGE_TARGET};

/// Structured logger that emits `tracing` events.
///
/// Rendering is left to the subscriber installed with
/// [`init_subscriber`](super::subscriber::init_subscriber); the logger only
/// remembers where the log file lives so failures can point at it.
#[derive(Debug)]
pub struct Logger {
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a logger whose output is also written to `log_file`.
    #[must_use]
    pub const fn new(log_file: Option<PathBuf>) -> Self {
        Self { log_file }
    }

    /// Return the log file path, if there is one.
    #[must_use]
    pub fn log_path(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }
}

impl Log for Logger {
    fn run(&self, header: &RunHeader) {
        tracing::info!(
            target: RUN_TARGET,
            plugin = %header.plugin,
            mode = %header.mode,
            path = %header.target.display(),
            dry_run = header.dry_run,
            "{header}"
        );
    }

    fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    fn dry_run(&self, msg: &str) {
        tracing::info!(target: DRY_RUN_TARGET, "{msg}");
    }
}
