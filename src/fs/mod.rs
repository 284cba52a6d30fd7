//! Filesystem capability used by the inspector, copier, and reconciler.
//!
//! Deployment logic never calls `std::fs` directly; it goes through
//! [`FileSystem`] so that it can run against [`RealFs`] in production and
//! against an in-memory fake or a mock in unit tests.

#[cfg(test)]
pub mod memory;
mod real;

pub use real::RealFs;

use std::io;
use std::path::{Path, PathBuf};

/// Type of a filesystem entry, as seen without following symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A symbolic link (or a Windows junction).
    Symlink,
    /// A real directory.
    Directory,
    /// A regular file.
    File,
    /// Anything else (socket, FIFO, device, ...).
    Other,
}

/// Minimal set of filesystem operations needed to deploy an artifact.
#[cfg_attr(test, mockall::automock)]
pub trait FileSystem {
    /// Return the kind of the entry at `path` without following symlinks.
    ///
    /// Returns `Ok(None)` when nothing exists at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error for any failure other than "not found".
    fn entry_kind(&self, path: &Path) -> io::Result<Option<EntryKind>>;

    /// Return `true` if `path` is a directory, following symlinks.
    fn is_dir(&self, path: &Path) -> bool;

    /// Read the raw value of the symlink at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` is not a symlink or cannot be read.
    fn read_link(&self, path: &Path) -> io::Result<PathBuf>;

    /// Create `path` and all missing ancestors.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be created.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Create a directory link at `link` pointing to `original`.
    ///
    /// # Errors
    ///
    /// Returns an error if the link cannot be created.
    fn symlink_dir(&self, original: &Path, link: &Path) -> io::Result<()>;

    /// Remove a file or symlink.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry is missing or cannot be removed.
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Remove a directory and everything beneath it.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry is missing or cannot be removed.
    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Copy the content of `from` (following symlinks) to `to`.
    ///
    /// # Errors
    ///
    /// Returns an error if `from` cannot be read or `to` cannot be written.
    fn copy_file(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// List the direct children of the directory at `path`, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` is not a readable directory.
    fn list_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    /// Write `contents` to the file at `path`, replacing it if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    fn write_file(&self, path: &Path, contents: &[u8]) -> io::Result<()>;
}
