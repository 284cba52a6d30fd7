//! Classification of whatever currently occupies the target path.
use anyhow::{Context as _, Result};
use std::fmt;
use std::path::{Path, PathBuf};

use super::paths::identical;
use crate::fs::{EntryKind, FileSystem};

/// State of the target path relative to the artifact being deployed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetState {
    /// Nothing exists at the target path.
    Absent,
    /// The target is a symlink that already resolves to the source.
    LinkToSource,
    /// The target is a symlink that resolves somewhere else.
    LinkElsewhere {
        /// Where the link points, resolved against its parent directory.
        points_to: PathBuf,
    },
    /// The target is a real directory.
    Directory,
    /// The target is a regular file or another kind of entry.
    Other,
}

impl fmt::Display for TargetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => write!(f, "absent"),
            Self::LinkToSource => write!(f, "linked to source"),
            Self::LinkElsewhere { points_to } => write!(f, "link to {}", points_to.display()),
            Self::Directory => write!(f, "directory"),
            Self::Other => write!(f, "file"),
        }
    }
}

/// Classify the entry at `target`.
///
/// A relative link value is resolved against the link's containing
/// directory before it is compared with `source`.
///
/// # Errors
///
/// Returns an error if `target` cannot be examined for any reason other than
/// not existing.
pub fn inspect(fs: &dyn FileSystem, target: &Path, source: &Path) -> Result<TargetState> {
    let kind = fs
        .entry_kind(target)
        .with_context(|| format!("inspect target: {}", target.display()))?;

    let state = match kind {
        None => TargetState::Absent,
        Some(EntryKind::Symlink) => {
            let raw = fs
                .read_link(target)
                .with_context(|| format!("read link: {}", target.display()))?;
            let points_to = resolve_link_value(target, &raw);
            if identical(&points_to, source) {
                TargetState::LinkToSource
            } else {
                TargetState::LinkElsewhere { points_to }
            }
        }
        Some(EntryKind::Directory) => TargetState::Directory,
        Some(EntryKind::File | EntryKind::Other) => TargetState::Other,
    };
    Ok(state)
}

fn resolve_link_value(link: &Path, value: &Path) -> PathBuf {
    if value.is_absolute() {
        value.to_path_buf()
    } else {
        link.parent().unwrap_or_else(|| Path::new("")).join(value)
    }
}
