//! Resolution of everything a deployment needs before it touches the target.
//!
//! Sources, in the order they are consulted:
//!
//! 1. `<project>/deploy.toml` ([`settings`]), optional;
//! 2. the mode given on the command line, else the settings default;
//! 3. `--base`, else the environment store ([`env_file`]);
//! 4. the plugin manifest ([`manifest`]).
pub mod env_file;
pub mod manifest;
pub mod settings;

use std::path::{Path, PathBuf};

use crate::deploy::paths::{normalize, resolve_target};
use crate::deploy::{DeployMode, DeployRequest};
use crate::error::{DeployError, PreconditionError};
use env_file::EnvFile;
use manifest::PluginManifest;
use settings::Settings;

/// Raw inputs of one run, as collected by the command line layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    /// Requested mode, unparsed; `None` uses the settings default.
    pub mode: Option<String>,
    /// Explicit target base directory.
    pub base: Option<PathBuf>,
    /// Project root.
    pub project: PathBuf,
    /// Report planned actions without performing them.
    pub dry_run: bool,
}

/// What [`DeployConfig::resolve`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Everything needed to deploy is known.
    Ready(Box<DeployConfig>),
    /// There is intentionally nothing to do.
    Skipped {
        /// Human-readable explanation.
        reason: String,
    },
}

/// Fully resolved deployment configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployConfig {
    /// Requested mode.
    pub mode: DeployMode,
    /// Project root.
    pub project: PathBuf,
    /// Artifact root inside the project.
    pub artifact: PathBuf,
    /// Target base directory (the host "vault").
    pub base: PathBuf,
    /// `<base>/.<namespace>/plugins/<id>`.
    pub target: PathBuf,
    /// Settings in effect.
    pub settings: Settings,
    /// Plugin identity.
    pub manifest: PluginManifest,
}

impl DeployConfig {
    /// Resolve `invocation` into a deployment configuration.
    ///
    /// Reads files but never modifies anything.  A missing environment store
    /// (when `--base` is not given) yields [`Resolution::Skipped`].
    ///
    /// # Errors
    ///
    /// - [`ConfigError`](crate::error::ConfigError) for an unknown mode, an
    ///   unreadable or invalid settings file, or a missing base directory key.
    /// - [`PreconditionError`] in copy mode when the artifact or base
    ///   directory does not exist, and for any manifest problem.
    pub fn resolve(invocation: &Invocation) -> Result<Resolution, DeployError> {
        let project = normalize(&invocation.project);
        let settings = Settings::load(&project)?;
        let mode: DeployMode = invocation
            .mode
            .as_deref()
            .unwrap_or(&settings.default_mode)
            .parse()?;

        let base = if let Some(base) = &invocation.base {
            absolute(&project, base)
        } else {
            let env_path = project.join(&settings.env_file);
            let Some(env) = EnvFile::load(&env_path)? else {
                return Ok(Resolution::Skipped {
                    reason: format!("{} not found", env_path.display()),
                });
            };
            absolute(&project, Path::new(env.require(&settings.base_dir_key)?))
        };

        let artifact = normalize(&project.join(&settings.artifact_dir));
        if mode == DeployMode::Copy {
            if !artifact.is_dir() {
                return Err(PreconditionError::ArtifactMissing(artifact).into());
            }
            if !base.is_dir() {
                return Err(PreconditionError::BaseDirMissing(base).into());
            }
        }

        let manifest = PluginManifest::locate(&[
            artifact.join(&settings.manifest_file),
            project.join(&settings.manifest_file),
        ])?;
        let target = resolve_target(&base, &settings.namespace, &manifest.id);

        Ok(Resolution::Ready(Box::new(Self {
            mode,
            project,
            artifact,
            base,
            target,
            settings,
            manifest,
        })))
    }

    /// Build the reconciler request for this configuration.
    #[must_use]
    pub fn request(&self) -> DeployRequest {
        DeployRequest {
            mode: self.mode,
            source: self.artifact.clone(),
            target: self.target.clone(),
            backup_file: self.settings.backup_file.clone(),
        }
    }

    /// Path of the marker file inside the artifact root.
    #[must_use]
    pub fn marker_path(&self) -> PathBuf {
        self.artifact.join(&self.settings.marker_file)
    }
}

/// Resolve `path` against `root` unless it is already absolute.
fn absolute(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize(path)
    } else {
        normalize(&root.join(path))
    }
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use std::fs;
    use tempfile::TempDir;

    struct Project {
        dir: TempDir,
    }

    impl Project {
        fn new() -> Self {
            Self {
                dir: tempfile::tempdir().unwrap(),
            }
        }

        fn path(&self) -> &Path {
            self.dir.path()
        }

        fn write(&self, rel: &str, content: &str) -> &Self {
            let path = self.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
            self
        }

        fn invocation(&self, mode: Option<&str>) -> Invocation {
            Invocation {
                mode: mode.map(str::to_string),
                project: self.path().to_path_buf(),
                ..Invocation::default()
            }
        }

        fn resolve(&self, mode: Option<&str>) -> Result<Resolution, DeployError> {
            DeployConfig::resolve(&self.invocation(mode))
        }

        fn ready(&self, mode: Option<&str>) -> DeployConfig {
            match self.resolve(mode).unwrap() {
                Resolution::Ready(config) => *config,
                Resolution::Skipped { reason } => panic!("unexpected skip: {reason}"),
            }
        }
    }

    #[test]
    fn resolves_target_from_env_store_and_manifest() {
        let p = Project::new();
        p.write(".env", "VAULT_PATH=/home/me/vault\n")
            .write("dist/manifest.json", r#"{"id":"demo"}"#);

        let config = p.ready(None);

        assert_eq!(config.mode, DeployMode::Link);
        assert_eq!(config.base, PathBuf::from("/home/me/vault"));
        assert_eq!(
            config.target,
            PathBuf::from("/home/me/vault/.obsidian/plugins/demo")
        );
        assert_eq!(config.artifact, normalize(&p.path().join("dist")));
        assert_eq!(config.marker_path(), config.artifact.join(".hotreload"));
    }

    #[test]
    fn relative_base_resolves_against_project() {
        let p = Project::new();
        p.write(".env", "VAULT_PATH=../vault\n")
            .write("manifest.json", r#"{"id":"demo"}"#);
        let config = p.ready(None);
        assert_eq!(config.base, normalize(&p.path().join("../vault")));
    }

    #[test]
    fn explicit_base_bypasses_env_store() {
        let p = Project::new();
        p.write("manifest.json", r#"{"id":"demo"}"#);
        let invocation = Invocation {
            base: Some(PathBuf::from("/elsewhere")),
            ..p.invocation(None)
        };
        let Resolution::Ready(config) = DeployConfig::resolve(&invocation).unwrap() else {
            panic!("expected a resolved configuration");
        };
        assert_eq!(config.base, PathBuf::from("/elsewhere"));
    }

    #[test]
    fn missing_env_store_is_a_skip() {
        let p = Project::new();
        p.write("manifest.json", r#"{"id":"demo"}"#);
        let resolution = p.resolve(None).unwrap();
        assert!(
            matches!(&resolution, Resolution::Skipped { reason } if reason.contains(".env")),
            "got {resolution:?}"
        );
    }

    #[test]
    fn missing_key_is_an_error() {
        let p = Project::new();
        p.write(".env", "OTHER=1\n");
        let err = p.resolve(None).unwrap_err();
        assert!(
            matches!(err, DeployError::Config(ConfigError::MissingValue { .. })),
            "got {err:?}"
        );
    }

    #[test]
    fn unknown_mode_is_rejected_before_anything_else() {
        let p = Project::new();
        let err = p.resolve(Some("sync")).unwrap_err();
        assert!(matches!(
            err,
            DeployError::Config(ConfigError::UnknownMode(ref m)) if m == "sync"
        ));
    }

    #[test]
    fn settings_override_defaults() {
        let p = Project::new();
        p.write(
            "deploy.toml",
            "artifact_dir = \"build\"\nenv_file = \"local.env\"\nbase_dir_key = \"HOST_DIR\"\nnamespace = \"host\"\ndefault_mode = \"copy\"\n",
        )
        .write("local.env", "HOST_DIR=/host\n")
        .write("build/manifest.json", r#"{"id":"demo"}"#);

        let err = p.resolve(None).unwrap_err();
        // copy mode by default, and /host does not exist
        assert!(
            matches!(err, DeployError::Precondition(PreconditionError::BaseDirMissing(ref b)) if b == Path::new("/host")),
            "got {err:?}"
        );

        let config = p.ready(Some("link"));
        assert_eq!(config.target, PathBuf::from("/host/.host/plugins/demo"));
        assert_eq!(config.artifact, normalize(&p.path().join("build")));
    }

    #[test]
    fn copy_mode_requires_artifact() {
        let p = Project::new();
        p.write(".env", "VAULT_PATH=/tmp\n")
            .write("manifest.json", r#"{"id":"demo"}"#);
        let err = p.resolve(Some("copy")).unwrap_err();
        assert!(
            matches!(err, DeployError::Precondition(PreconditionError::ArtifactMissing(_))),
            "got {err:?}"
        );
    }

    #[test]
    fn manifest_errors_surface_as_preconditions() {
        let p = Project::new();
        p.write(".env", "VAULT_PATH=/v\n");
        let err = p.resolve(None).unwrap_err();
        assert!(matches!(
            err,
            DeployError::Precondition(PreconditionError::ManifestMissing { .. })
        ));
    }

    #[test]
    fn request_carries_backup_file() {
        let p = Project::new();
        p.write(".env", "VAULT_PATH=/v\n")
            .write("manifest.json", r#"{"id":"demo"}"#)
            .write("deploy.toml", "backup_file = \"state.json\"\n");
        let request = p.ready(None).request();
        assert_eq!(request.backup_file, "state.json");
        assert_eq!(request.target, PathBuf::from("/v/.obsidian/plugins/demo"));
    }
}
