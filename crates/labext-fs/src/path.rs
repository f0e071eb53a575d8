//! Lexical path helpers

use std::path::{Component, Path, PathBuf};

/// Lexically normalize a path.
///
/// Collapses `.` components and redundant separators, and resolves `..`
/// against preceding normal components. Leading `..` components of a
/// relative path are kept; `..` directly under the root is dropped. The
/// filesystem is never consulted, so symlinks are not resolved.
pub fn normalize(path: impl AsRef<Path>) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();

    for component in path.as_ref().components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        return PathBuf::from(".");
    }
    parts.iter().collect()
}

/// The final component of the normalized path, if it names something.
pub fn base_name(path: impl AsRef<Path>) -> Option<String> {
    normalize(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

/// Convert a `/`-separated module path (for example `my_ext/index`) into a
/// native relative path.
pub fn module_path_to_relative(module_path: &str) -> PathBuf {
    module_path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Whether a source string looks like a remote URL rather than a local path.
pub fn is_url(source: &str) -> bool {
    let lower = source.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("ftp://")
}
