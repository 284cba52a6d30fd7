//! Domain-specific error types for the deployment engine.
//!
//! Internal modules return typed errors (e.g., [`ConfigError`],
//! [`PreconditionError`]) while the command layer converts them to
//! [`anyhow::Error`] via the standard `?` operator.  Filesystem failures are
//! plain [`std::io::Error`]s wrapped with [`anyhow::Context`] at the call site.
//!
//! # Error hierarchy
//!
//! ```text
//! DeployError
//! ├── Config(ConfigError)              mode, settings, environment store
//! └── Precondition(PreconditionError)  artifact and manifest checks
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the deployment engine.
///
/// Aggregates domain-specific sub-errors and is convertible to
/// [`anyhow::Error`] for use at command boundaries.
#[derive(Error, Debug)]
pub enum DeployError {
    /// Configuration-related error (mode, settings file, environment store).
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A precondition for deployment does not hold.
    #[error("Precondition failed: {0}")]
    Precondition(#[from] PreconditionError),
}

/// Errors that arise while resolving the deployment configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The requested deployment mode is not recognised.
    #[error("Invalid mode '{0}': must be one of link, copy")]
    UnknownMode(String),

    /// The environment store exists but does not define a required key.
    #[error("{key} is not set in {}", .file.display())]
    MissingValue {
        /// Name of the missing key.
        key: String,
        /// Environment file that was searched.
        file: PathBuf,
    },

    /// The settings file could not be parsed.
    #[error("Invalid settings in {}: {message}", .path.display())]
    InvalidSettings {
        /// Path to the settings file.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// An I/O error occurred while reading a configuration file.
    #[error("IO error reading config file {}: {source}", .path.display())]
    Io {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors that arise when a deployment precondition does not hold.
#[derive(Error, Debug)]
pub enum PreconditionError {
    /// The artifact directory has not been built.
    #[error("artifact directory not found: {} (run the build first)", .0.display())]
    ArtifactMissing(PathBuf),

    /// The target base directory does not exist (copy mode only).
    #[error("base directory not found: {}", .0.display())]
    BaseDirMissing(PathBuf),

    /// No plugin manifest exists in any of the searched locations.
    #[error("plugin manifest not found (checked {})", display_paths(.checked))]
    ManifestMissing {
        /// Locations that were searched, in order of preference.
        checked: Vec<PathBuf>,
    },

    /// The manifest exists but is not valid JSON.
    #[error("cannot parse plugin manifest {}: {message}", .path.display())]
    ManifestInvalid {
        /// Path to the manifest.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// The manifest has no usable `id` field.
    #[error("plugin manifest {} has no \"id\" field", .0.display())]
    ManifestMissingId(PathBuf),

    /// The target directory encloses the artifact, so replacing it would
    /// destroy the artifact.
    #[error(
        "target {} contains the artifact directory {}; refusing to replace it",
        .target.display(),
        .artifact.display()
    )]
    TargetContainsArtifact {
        /// Deployment target.
        target: PathBuf,
        /// Artifact directory below it.
        artifact: PathBuf,
    },

    /// The target lies inside the artifact directory.
    #[error(
        "target {} is inside the artifact directory {}",
        .target.display(),
        .artifact.display()
    )]
    ArtifactContainsTarget {
        /// Deployment target.
        target: PathBuf,
        /// Artifact directory above it.
        artifact: PathBuf,
    },

    /// The plugin identifier cannot be used as a single path component.
    #[error("invalid plugin id '{0}': must be a single path component")]
    InvalidPluginId(String),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
