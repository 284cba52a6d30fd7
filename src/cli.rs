//! Command line parsing.
use anyhow::{Context as _, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

use crate::config::Invocation;

/// Command line for `plugin-deploy`.
#[derive(Parser, Debug)]
#[command(
    name = "plugin-deploy",
    about = "Deploy a built plugin into a host application's plugin folder",
    version = option_env!("PLUGIN_DEPLOY_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
)]
pub struct Cli {
    /// Deployment mode: link (development) or copy (install) [default: from deploy.toml, else link]
    pub mode: Option<String>,

    /// Target base directory; overrides the environment store
    #[arg(long, value_name = "DIR")]
    pub base: Option<PathBuf>,

    /// Project root [default: current directory]
    #[arg(long, value_name = "DIR")]
    pub project: Option<PathBuf>,

    /// Preview changes without applying
    #[arg(short = 'd', long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Build the [`Invocation`] for this command line, resolving relative
    /// paths against the current directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be determined.
    pub fn invocation(&self) -> Result<Invocation> {
        let cwd = std::env::current_dir().context("determine current directory")?;
        Ok(self.invocation_in(&cwd))
    }

    /// Build the [`Invocation`] as if run from `cwd`.
    #[must_use]
    pub fn invocation_in(&self, cwd: &Path) -> Invocation {
        let project = self
            .project
            .as_ref()
            .map_or_else(|| cwd.to_path_buf(), |p| cwd.join(p));
        Invocation {
            mode: self.mode.clone(),
            base: self.base.as_ref().map(|b| cwd.join(b)),
            project,
            dry_run: self.dry_run,
        }
    }
}
