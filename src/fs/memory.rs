//! In-memory [`FileSystem`] fake for unit tests.
//!
//! Paths are stored exactly as given, so tests should use absolute,
//! already-normalised paths.  Symlinks are resolved (up to a small depth)
//! for the operations that follow them: `is_dir`, `copy_file`, `list_dir`.
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use super::{EntryKind, FileSystem};
use crate::deploy::paths::normalize;

const MAX_LINK_DEPTH: usize = 8;

/// A single entry in the fake tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Regular file with its content.
    File(Vec<u8>),
    /// Directory (children are the entries whose parent is this path).
    Dir,
    /// Symbolic link with its raw target.
    Symlink(PathBuf),
}

/// Filesystem fake holding the whole tree in a sorted map.
#[derive(Debug, Default)]
pub struct MemoryFs {
    nodes: RefCell<BTreeMap<PathBuf, Node>>,
}

impl MemoryFs {
    /// Create an empty filesystem containing only `/`.
    #[must_use]
    pub fn new() -> Self {
        let fs = Self::default();
        fs.nodes.borrow_mut().insert(PathBuf::from("/"), Node::Dir);
        fs
    }

    /// Add a directory (and its ancestors).
    #[must_use]
    pub fn with_dir(self, path: &str) -> Self {
        self.insert_with_parents(Path::new(path), Node::Dir);
        self
    }

    /// Add a file (and its ancestor directories).
    #[must_use]
    pub fn with_file(self, path: &str, contents: &str) -> Self {
        self.insert_with_parents(Path::new(path), Node::File(contents.as_bytes().to_vec()));
        self
    }

    /// Add a symlink (and its ancestor directories).
    #[must_use]
    pub fn with_symlink(self, path: &str, target: &str) -> Self {
        self.insert_with_parents(Path::new(path), Node::Symlink(PathBuf::from(target)));
        self
    }

    /// Return the node stored at `path`, without following symlinks.
    #[must_use]
    pub fn node(&self, path: &str) -> Option<Node> {
        self.nodes.borrow().get(Path::new(path)).cloned()
    }

    /// Return the content of the file at `path`, if any.
    #[must_use]
    pub fn read(&self, path: &str) -> Option<String> {
        match self.node(path) {
            Some(Node::File(bytes)) => Some(String::from_utf8_lossy(&bytes).into_owned()),
            _ => None,
        }
    }

    /// Copy of the whole tree, for before/after comparisons.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<PathBuf, Node> {
        self.nodes.borrow().clone()
    }

    fn insert_with_parents(&self, path: &Path, node: Node) {
        let mut nodes = self.nodes.borrow_mut();
        for ancestor in path.ancestors().skip(1) {
            nodes.entry(ancestor.to_path_buf()).or_insert(Node::Dir);
        }
        nodes.insert(path.to_path_buf(), node);
    }

    /// Follow symlinks at `path` until a non-link node is reached.
    fn resolve(&self, path: &Path) -> io::Result<(PathBuf, Node)> {
        let nodes = self.nodes.borrow();
        let mut current = path.to_path_buf();
        for _ in 0..MAX_LINK_DEPTH {
            match nodes.get(&current) {
                None => return Err(not_found(&current)),
                Some(Node::Symlink(target)) => {
                    current = if target.is_absolute() {
                        target.clone()
                    } else {
                        normalize(&current.parent().unwrap_or_else(|| Path::new("/")).join(target))
                    };
                }
                Some(node) => return Ok((current, node.clone())),
            }
        }
        Err(io::Error::other(format!(
            "too many levels of symbolic links: {}",
            path.display()
        )))
    }

    fn require_parent_dir(&self, path: &Path) -> io::Result<()> {
        let parent = path.parent().unwrap_or_else(|| Path::new("/"));
        match self.resolve(parent) {
            Ok((_, Node::Dir)) => Ok(()),
            Ok(_) => Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("not a directory: {}", parent.display()),
            )),
            Err(e) => Err(e),
        }
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("no such file or directory: {}", path.display()),
    )
}

impl FileSystem for MemoryFs {
    fn entry_kind(&self, path: &Path) -> io::Result<Option<EntryKind>> {
        Ok(self.nodes.borrow().get(path).map(|node| match node {
            Node::File(_) => EntryKind::File,
            Node::Dir => EntryKind::Directory,
            Node::Symlink(_) => EntryKind::Symlink,
        }))
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.resolve(path), Ok((_, Node::Dir)))
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        match self.nodes.borrow().get(path) {
            Some(Node::Symlink(target)) => Ok(target.clone()),
            Some(_) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a symlink: {}", path.display()),
            )),
            None => Err(not_found(path)),
        }
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut nodes = self.nodes.borrow_mut();
        let mut ancestors: Vec<&Path> = path.ancestors().collect();
        ancestors.reverse();
        for dir in ancestors {
            match nodes.get(dir) {
                None => {
                    nodes.insert(dir.to_path_buf(), Node::Dir);
                }
                Some(Node::Dir | Node::Symlink(_)) => {}
                Some(Node::File(_)) => {
                    return Err(io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        format!("file exists: {}", dir.display()),
                    ));
                }
            }
        }
        Ok(())
    }

    fn symlink_dir(&self, original: &Path, link: &Path) -> io::Result<()> {
        self.require_parent_dir(link)?;
        let mut nodes = self.nodes.borrow_mut();
        if nodes.contains_key(link) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("file exists: {}", link.display()),
            ));
        }
        nodes.insert(link.to_path_buf(), Node::Symlink(original.to_path_buf()));
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        let mut nodes = self.nodes.borrow_mut();
        match nodes.get(path) {
            None => Err(not_found(path)),
            Some(Node::Dir) => Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("is a directory: {}", path.display()),
            )),
            Some(_) => {
                nodes.remove(path);
                Ok(())
            }
        }
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut nodes = self.nodes.borrow_mut();
        if !nodes.contains_key(path) {
            return Err(not_found(path));
        }
        nodes.retain(|key, _| !key.starts_with(path));
        Ok(())
    }

    fn copy_file(&self, from: &Path, to: &Path) -> io::Result<()> {
        let (_, node) = self.resolve(from)?;
        let Node::File(bytes) = node else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a file: {}", from.display()),
            ));
        };
        self.require_parent_dir(to)?;
        self.nodes
            .borrow_mut()
            .insert(to.to_path_buf(), Node::File(bytes));
        Ok(())
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let (resolved, node) = self.resolve(path)?;
        if node != Node::Dir {
            return Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("not a directory: {}", path.display()),
            ));
        }
        Ok(self
            .nodes
            .borrow()
            .keys()
            .filter(|key| key.parent() == Some(resolved.as_path()))
            .cloned()
            .collect())
    }

    fn write_file(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        self.require_parent_dir(path)?;
        self.nodes
            .borrow_mut()
            .insert(path.to_path_buf(), Node::File(contents.to_vec()));
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn builder_creates_ancestors() {
        let fs = MemoryFs::new().with_file("/a/b/c.txt", "c");
        assert_eq!(fs.node("/a"), Some(Node::Dir));
        assert_eq!(fs.node("/a/b"), Some(Node::Dir));
        assert_eq!(fs.read("/a/b/c.txt").as_deref(), Some("c"));
    }

    #[test]
    fn is_dir_follows_relative_symlink() {
        let fs = MemoryFs::new()
            .with_dir("/project/dist")
            .with_symlink("/project/out", "dist");
        assert!(fs.is_dir(Path::new("/project/out")));
        assert_eq!(
            fs.entry_kind(Path::new("/project/out")).unwrap(),
            Some(EntryKind::Symlink)
        );
    }

    #[test]
    fn remove_dir_all_removes_descendants_only() {
        let fs = MemoryFs::new()
            .with_file("/a/x/1", "1")
            .with_file("/a/xy", "keep");
        fs.remove_dir_all(Path::new("/a/x")).unwrap();
        assert_eq!(fs.node("/a/x"), None);
        assert_eq!(fs.node("/a/x/1"), None);
        assert_eq!(fs.read("/a/xy").as_deref(), Some("keep"));
    }

    #[test]
    fn list_dir_returns_direct_children_sorted() {
        let fs = MemoryFs::new()
            .with_file("/d/b", "")
            .with_file("/d/a", "")
            .with_file("/d/sub/c", "");
        let children = fs.list_dir(Path::new("/d")).unwrap();
        assert_eq!(
            children,
            [
                PathBuf::from("/d/a"),
                PathBuf::from("/d/b"),
                PathBuf::from("/d/sub")
            ]
        );
    }

    #[test]
    fn symlink_dir_requires_parent() {
        let fs = MemoryFs::new().with_dir("/src");
        let err = fs
            .symlink_dir(Path::new("/src"), Path::new("/missing/link"))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
