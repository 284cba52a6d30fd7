//! The deploy command: resolve, guard, prepare, converge.
use anyhow::{Context as _, Result};

use crate::config::{DeployConfig, Invocation, Resolution};
use crate::deploy::paths::identical;
use crate::deploy::{DeployOutcome, Reconciler};
use crate::fs::FileSystem;
use crate::logging::{Log, RunHeader};

/// Run one deployment.
///
/// Intentional no-ops (no environment store, artifact already at the target)
/// are reported as successful outcomes, not errors.
///
/// # Errors
///
/// Returns an error if configuration cannot be resolved, a precondition does
/// not hold, or any filesystem operation fails.
pub fn run(invocation: &Invocation, fs: &dyn FileSystem, log: &dyn Log) -> Result<DeployOutcome> {
    log.stage("Resolving configuration");
    let config = match DeployConfig::resolve(invocation)? {
        Resolution::Ready(config) => config,
        Resolution::Skipped { reason } => {
            log.info(&format!("{reason}, skipping deployment"));
            return Ok(DeployOutcome::Skipped { reason });
        }
    };
    log.run(&RunHeader {
        plugin: config.manifest.describe(),
        mode: config.mode,
        target: config.target.clone(),
        dry_run: invocation.dry_run,
    });
    log.debug(&format!("manifest: {}", config.manifest.path.display()));

    if identical(&config.artifact, &config.target) {
        log.info("artifact directory is the deployment target, nothing to do");
        return Ok(DeployOutcome::SelfTarget);
    }
    let request = config.request();
    request.check_disjoint()?;

    log.stage(&format!("Deploying {} ({} mode)", config.manifest.id, config.mode));
    prepare_artifact(fs, log, &config, invocation.dry_run)?;

    let outcome = Reconciler::new(fs, log, invocation.dry_run).converge(&request)?;
    log.info(&format!("done: {outcome}"));
    Ok(outcome)
}

/// Make sure the artifact root exists and holds the marker file.
///
/// Copy mode never gets here without an artifact directory.
fn prepare_artifact(
    fs: &dyn FileSystem,
    log: &dyn Log,
    config: &DeployConfig,
    dry_run: bool,
) -> Result<()> {
    let artifact = &config.artifact;
    if !fs.is_dir(artifact) {
        if dry_run {
            log.dry_run(&format!("would create directory {}", artifact.display()));
        } else {
            fs.create_dir_all(artifact)
                .with_context(|| format!("create artifact directory: {}", artifact.display()))?;
            log.debug(&format!("created {}", artifact.display()));
        }
    }

    let marker = config.marker_path();
    let exists = fs
        .entry_kind(&marker)
        .with_context(|| format!("inspect marker: {}", marker.display()))?
        .is_some();
    if exists {
        return Ok(());
    }
    if dry_run {
        log.dry_run(&format!("would create {}", marker.display()));
    } else {
        fs.write_file(&marker, b"")
            .with_context(|| format!("create marker: {}", marker.display()))?;
        log.debug(&format!("created {}", marker.display()));
    }
    Ok(())
}
