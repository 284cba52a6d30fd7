//! Deployment engine: target inspection and convergence.
//!
//! The engine receives explicit paths and a [`FileSystem`](crate::fs::FileSystem);
//! it never reads configuration or the process environment itself.
pub mod copy;
pub mod inspect;
pub mod paths;
pub mod reconcile;

pub use inspect::TargetState;
pub use reconcile::Reconciler;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{ConfigError, PreconditionError};

/// How the artifact is placed at the target path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeployMode {
    /// Symlink (or junction) the target to the artifact; for development.
    #[default]
    Link,
    /// Recursively copy the artifact into the target; for installs.
    Copy,
}

impl FromStr for DeployMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "link" => Ok(Self::Link),
            "copy" => Ok(Self::Copy),
            other => Err(ConfigError::UnknownMode(other.to_string())),
        }
    }
}

impl fmt::Display for DeployMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Link => write!(f, "link"),
            Self::Copy => write!(f, "copy"),
        }
    }
}

/// Everything the reconciler needs to converge one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployRequest {
    /// Desired end state.
    pub mode: DeployMode,
    /// Artifact root (source of truth).
    pub source: PathBuf,
    /// Location inside the host plugin directory.
    pub target: PathBuf,
    /// Name of the host-owned file rescued from a directory target in link mode.
    pub backup_file: String,
}

impl DeployRequest {
    /// Reject a request where one of source and target encloses the other.
    ///
    /// Replacing a target above the artifact deletes the artifact, and a
    /// target below it would be written into the artifact itself.
    ///
    /// # Errors
    ///
    /// Returns [`PreconditionError::TargetContainsArtifact`] or
    /// [`PreconditionError::ArtifactContainsTarget`].
    pub fn check_disjoint(&self) -> Result<(), PreconditionError> {
        if paths::is_nested(&self.source, &self.target) {
            return Err(PreconditionError::TargetContainsArtifact {
                target: self.target.clone(),
                artifact: self.source.clone(),
            });
        }
        if paths::is_nested(&self.target, &self.source) {
            return Err(PreconditionError::ArtifactContainsTarget {
                target: self.target.clone(),
                artifact: self.source.clone(),
            });
        }
        Ok(())
    }
}

/// Result of a deployment run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployOutcome {
    /// A new link was created.
    Linked,
    /// The target already linked to the artifact; nothing changed.
    AlreadyLinked,
    /// The artifact was copied into the target.
    Copied {
        /// Top-level entries in the artifact root.
        entries: usize,
        /// Files copied in total.
        files: usize,
        /// Directories created beneath the target.
        dirs: usize,
    },
    /// Source and target are the same location; nothing to do.
    SelfTarget,
    /// Deployment was intentionally skipped.
    Skipped {
        /// Why nothing was done.
        reason: String,
    },
    /// Dry run; the planned actions were logged but not performed.
    DryRun,
}

impl fmt::Display for DeployOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linked => write!(f, "linked"),
            Self::AlreadyLinked => write!(f, "already linked"),
            Self::Copied {
                entries,
                files,
                dirs,
            } => write!(
                f,
                "copied {entries} entries ({files} files, {dirs} directories)"
            ),
            Self::SelfTarget => write!(f, "source is the target, nothing to do"),
            Self::Skipped { reason } => write!(f, "skipped: {reason}"),
            Self::DryRun => write!(f, "dry run, no changes made"),
        }
    }
}
