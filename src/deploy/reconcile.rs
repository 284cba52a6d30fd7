//! Convergence of the target path to the desired deployment mode.
use anyhow::{Context as _, Result};
use std::fmt;
use std::path::Path;

use super::copy::copy_tree;
use super::inspect::{TargetState, inspect};
use super::paths::identical;
use super::{DeployMode, DeployOutcome, DeployRequest};
use crate::error::PreconditionError;
use crate::fs::{EntryKind, FileSystem};
use crate::logging::Log;

/// Drives one target path to its goal state.
///
/// In dry-run mode the target is still inspected, but every mutation is
/// reported through [`Log::dry_run`] instead of being performed.
pub struct Reconciler<'a> {
    fs: &'a dyn FileSystem,
    log: &'a dyn Log,
    dry_run: bool,
}

impl fmt::Debug for Reconciler<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reconciler")
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

impl<'a> Reconciler<'a> {
    /// Create a reconciler over `fs`, reporting through `log`.
    #[must_use]
    pub const fn new(fs: &'a dyn FileSystem, log: &'a dyn Log, dry_run: bool) -> Self {
        Self { fs, log, dry_run }
    }

    /// Converge `request.target` to the state required by `request.mode`.
    ///
    /// Returns [`DeployOutcome::SelfTarget`] without touching anything when
    /// source and target name the same location.
    ///
    /// # Errors
    ///
    /// Returns a [`PreconditionError`] before touching anything if one of
    /// source and target encloses the other, or in copy mode if the source
    /// is not a directory.  Otherwise returns any filesystem error
    /// encountered while inspecting, removing, linking, or copying.
    pub fn converge(&self, request: &DeployRequest) -> Result<DeployOutcome> {
        if identical(&request.source, &request.target) {
            self.log.info(&format!(
                "source and target are the same location ({}), nothing to do",
                request.target.display()
            ));
            return Ok(DeployOutcome::SelfTarget);
        }
        request.check_disjoint()?;
        match request.mode {
            DeployMode::Link => self.link(request),
            DeployMode::Copy => self.copy(request),
        }
    }

    fn link(&self, request: &DeployRequest) -> Result<DeployOutcome> {
        let DeployRequest { source, target, .. } = request;
        let state = inspect(self.fs, target, source)?;
        self.log.debug(&format!("target state: {state}"));

        match &state {
            TargetState::LinkToSource => {
                self.log.info(&format!(
                    "already linked: {} -> {}",
                    target.display(),
                    source.display()
                ));
                return Ok(DeployOutcome::AlreadyLinked);
            }
            TargetState::Absent => {}
            TargetState::Directory => {
                self.preserve_backup(request)?;
                self.remove_existing(target, &state)?;
            }
            TargetState::LinkElsewhere { .. } | TargetState::Other => {
                self.remove_existing(target, &state)?;
            }
        }

        self.ensure_parent(target)?;
        if self.dry_run {
            self.log.dry_run(&format!(
                "would link {} -> {}",
                target.display(),
                source.display()
            ));
            return Ok(DeployOutcome::DryRun);
        }
        self.fs
            .symlink_dir(source, target)
            .with_context(|| format!("create link: {}", target.display()))?;
        self.log.info(&format!(
            "linked {} -> {}",
            target.display(),
            source.display()
        ));
        Ok(DeployOutcome::Linked)
    }

    fn copy(&self, request: &DeployRequest) -> Result<DeployOutcome> {
        let DeployRequest { source, target, .. } = request;
        if !self.fs.is_dir(source) {
            return Err(PreconditionError::ArtifactMissing(source.clone()).into());
        }

        let state = inspect(self.fs, target, source)?;
        self.log.debug(&format!("target state: {state}"));
        // No backup here: copy mode is meant for fresh installs.
        if state != TargetState::Absent {
            self.remove_existing(target, &state)?;
        }
        self.ensure_parent(target)?;

        let entries = self
            .fs
            .list_dir(source)
            .with_context(|| format!("reading directory {}", source.display()))?
            .len();
        if self.dry_run {
            self.log.dry_run(&format!(
                "would copy {entries} entries from {} to {}",
                source.display(),
                target.display()
            ));
            return Ok(DeployOutcome::DryRun);
        }

        let stats = copy_tree(self.fs, source, target)?;
        self.log.info(&format!("copied {entries} entries to {}", target.display()));
        Ok(DeployOutcome::Copied {
            entries,
            files: stats.files,
            dirs: stats.dirs,
        })
    }

    /// Rescue the host's runtime state file from a directory that is about
    /// to be replaced, overwriting any copy in the artifact root.
    fn preserve_backup(&self, request: &DeployRequest) -> Result<()> {
        let backup = request.target.join(&request.backup_file);
        let kind = self
            .fs
            .entry_kind(&backup)
            .with_context(|| format!("inspect backup: {}", backup.display()))?;
        let is_dir = match kind {
            Some(EntryKind::File) => false,
            Some(EntryKind::Symlink) => self.fs.is_dir(&backup),
            Some(EntryKind::Directory) => true,
            Some(EntryKind::Other) | None => return Ok(()),
        };
        if is_dir {
            self.log.warn(&format!(
                "{} is a directory, not backing it up",
                backup.display()
            ));
            return Ok(());
        }

        let dest = request.source.join(&request.backup_file);
        if self.dry_run {
            self.log.dry_run(&format!(
                "would back up {} to {}",
                backup.display(),
                dest.display()
            ));
            return Ok(());
        }
        self.fs
            .copy_file(&backup, &dest)
            .with_context(|| format!("back up {} to {}", backup.display(), dest.display()))?;
        self.log.info(&format!(
            "preserved {} from the existing plugin directory",
            request.backup_file
        ));
        Ok(())
    }

    fn remove_existing(&self, target: &Path, state: &TargetState) -> Result<()> {
        if self.dry_run {
            self.log.dry_run(&format!(
                "would remove existing {} ({state})",
                target.display()
            ));
            return Ok(());
        }
        let result = if *state == TargetState::Directory {
            self.fs.remove_dir_all(target)
        } else {
            self.fs.remove_file(target)
        };
        result.with_context(|| format!("remove existing: {}", target.display()))?;
        self.log.debug(&format!("removed existing {} ({state})", target.display()));
        Ok(())
    }

    fn ensure_parent(&self, target: &Path) -> Result<()> {
        let Some(parent) = target.parent() else {
            return Ok(());
        };
        if self.fs.is_dir(parent) {
            return Ok(());
        }
        if self.dry_run {
            self.log.dry_run(&format!("would create directory {}", parent.display()));
            return Ok(());
        }
        self.fs
            .create_dir_all(parent)
            .with_context(|| format!("create parent: {}", parent.display()))
    }
}
