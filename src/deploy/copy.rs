//! Recursive directory copy.
use anyhow::{Context as _, Result};
use std::path::Path;

use crate::fs::FileSystem;

/// Counts of what a [`copy_tree`] call materialised beneath the destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyStats {
    /// Regular files copied.
    pub files: usize,
    /// Directories created (not counting the destination root).
    pub dirs: usize,
}

/// Recursively copy the directory tree at `src` into `dst`.
///
/// Symlinks within the source tree are *followed*: directory links are
/// recursed into and file links are copied as regular files holding the
/// resolved content.  Empty directories are created.  There is no rollback;
/// the first failure is returned and leaves `dst` partially populated.
///
/// # Errors
///
/// Returns an error if a directory cannot be created or read, or a file
/// cannot be copied.
pub fn copy_tree(fs: &dyn FileSystem, src: &Path, dst: &Path) -> Result<CopyStats> {
    let mut stats = CopyStats::default();
    copy_dir(fs, src, dst, &mut stats)?;
    Ok(stats)
}

fn copy_dir(fs: &dyn FileSystem, src: &Path, dst: &Path, stats: &mut CopyStats) -> Result<()> {
    fs.create_dir_all(dst)
        .with_context(|| format!("creating directory {}", dst.display()))?;
    let entries = fs
        .list_dir(src)
        .with_context(|| format!("reading directory {}", src.display()))?;
    for src_path in entries {
        let Some(name) = src_path.file_name() else {
            continue;
        };
        let dst_path = dst.join(name);
        if fs.is_dir(&src_path) {
            stats.dirs += 1;
            copy_dir(fs, &src_path, &dst_path, stats)?;
        } else {
            fs.copy_file(&src_path, &dst_path).with_context(|| {
                format!("copying {} to {}", src_path.display(), dst_path.display())
            })?;
            stats.files += 1;
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::fs::memory::{MemoryFs, Node};
    use crate::fs::{MockFileSystem, RealFs};
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn copies_files_and_subdirectories() {
        let fs = MemoryFs::new()
            .with_file("/src/a.txt", "aaa")
            .with_file("/src/sub/b.txt", "bbb")
            .with_file("/src/sub/deeper/c.txt", "ccc");

        let stats = copy_tree(&fs, Path::new("/src"), Path::new("/out")).unwrap();

        assert_eq!(stats, CopyStats { files: 3, dirs: 2 });
        assert_eq!(fs.read("/out/a.txt").as_deref(), Some("aaa"));
        assert_eq!(fs.read("/out/sub/b.txt").as_deref(), Some("bbb"));
        assert_eq!(fs.read("/out/sub/deeper/c.txt").as_deref(), Some("ccc"));
    }

    #[test]
    fn creates_empty_directories() {
        let fs = MemoryFs::new().with_dir("/src/empty").with_dir("/src/also/empty");

        let stats = copy_tree(&fs, Path::new("/src"), Path::new("/out")).unwrap();

        assert_eq!(stats, CopyStats { files: 0, dirs: 3 });
        assert_eq!(fs.node("/out/empty"), Some(Node::Dir));
        assert_eq!(fs.node("/out/also/empty"), Some(Node::Dir));
    }

    #[test]
    fn symlinks_are_materialised() {
        let fs = MemoryFs::new()
            .with_file("/shared/readme.md", "shared")
            .with_file("/shared/lib/x.js", "x")
            .with_symlink("/src/readme.md", "/shared/readme.md")
            .with_symlink("/src/lib", "/shared/lib");

        copy_tree(&fs, Path::new("/src"), Path::new("/out")).unwrap();

        assert_eq!(
            fs.node("/out/readme.md"),
            Some(Node::File(b"shared".to_vec()))
        );
        assert_eq!(fs.node("/out/lib"), Some(Node::Dir));
        assert_eq!(fs.read("/out/lib/x.js").as_deref(), Some("x"));
    }

    #[test]
    fn failure_propagates_without_cleanup() {
        let mut fs = MockFileSystem::new();
        fs.expect_create_dir_all().returning(|_| Ok(()));
        fs.expect_list_dir().returning(|_| {
            Ok(vec![PathBuf::from("/src/a.txt"), PathBuf::from("/src/b.txt")])
        });
        fs.expect_is_dir().returning(|_| false);
        fs.expect_copy_file()
            .withf(|from: &Path, _: &Path| from == Path::new("/src/a.txt"))
            .times(1)
            .returning(|_, _| Ok(()));
        fs.expect_copy_file()
            .withf(|from: &Path, _: &Path| from == Path::new("/src/b.txt"))
            .times(1)
            .returning(|_, _| Err(io::Error::other("disk full")));
        fs.expect_remove_dir_all().never();

        let err = copy_tree(&fs, Path::new("/src"), Path::new("/out")).unwrap_err();
        assert!(err.to_string().contains("/src/b.txt"), "got: {err}");
    }

    #[test]
    fn copies_real_tree() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        std::fs::write(src.path().join("main.js"), b"code").unwrap();
        std::fs::create_dir(src.path().join("assets")).unwrap();
        std::fs::write(src.path().join("assets/icon.svg"), b"<svg/>").unwrap();

        let target = dst.path().join("out");
        let stats = copy_tree(&RealFs, src.path(), &target).unwrap();

        assert_eq!(stats, CopyStats { files: 2, dirs: 1 });
        assert_eq!(std::fs::read(target.join("main.js")).unwrap(), b"code");
        assert_eq!(
            std::fs::read(target.join("assets/icon.svg")).unwrap(),
            b"<svg/>"
        );
    }
}
