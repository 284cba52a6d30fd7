//! Target path resolution and lexical path identity.
use std::path::{Component, Path, PathBuf};

/// Directory inside the host namespace that holds one folder per plugin.
pub const PLUGINS_DIR: &str = "plugins";

/// Compute `<base>/.<namespace>/plugins/<plugin_id>`.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use plugin_deploy::deploy::paths::resolve_target;
///
/// let target = resolve_target(Path::new("/vault"), "obsidian", "my-plugin");
/// assert_eq!(target, Path::new("/vault/.obsidian/plugins/my-plugin"));
/// ```
#[must_use]
pub fn resolve_target(base: &Path, namespace: &str, plugin_id: &str) -> PathBuf {
    base.join(format!(".{namespace}"))
        .join(PLUGINS_DIR)
        .join(plugin_id)
}

/// Lexically normalise `path`: drop `.` components and resolve `..` against
/// the preceding component.  The filesystem is never consulted, so symlinks
/// are not followed.  Windows verbatim prefixes (`\\?\C:\`) are simplified
/// first so that `read_link` results compare equal to ordinary paths.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use plugin_deploy::deploy::paths::normalize;
///
/// assert_eq!(normalize(Path::new("/a/./b/../c/")), Path::new("/a/c"));
/// assert_eq!(normalize(Path::new("../x/..")), Path::new(".."));
/// ```
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in dunce::simplified(path).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `/..` is `/`
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Return `true` if `a` and `b` name the same location after lexical
/// normalisation.
#[must_use]
pub fn identical(a: &Path, b: &Path) -> bool {
    normalize(a) == normalize(b)
}

/// Return `true` if `inner` lies strictly below `outer` after lexical
/// normalisation.  Identical paths are not nested.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use plugin_deploy::deploy::paths::is_nested;
///
/// assert!(is_nested(Path::new("/p/dist"), Path::new("/p")));
/// assert!(!is_nested(Path::new("/p/dist2"), Path::new("/p/dist")));
/// ```
#[must_use]
pub fn is_nested(inner: &Path, outer: &Path) -> bool {
    let (inner, outer) = (normalize(inner), normalize(outer));
    inner != outer && inner.starts_with(&outer)
}

/// Return `true` if `name` can be used as exactly one path component.
#[must_use]
pub fn is_single_component(name: &str) -> bool {
    if name.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(c)), None) if c == name
    )
}
