//! Lexical path helpers
//!
//! Include identity is by absolute, lexically normalized path. Nothing here
//! touches the filesystem except [`absolute`], which only consults the
//! current directory.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Collapse `.` and `..` components without resolving symlinks
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                // `..` above the root stays at the root
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => components.push(component),
            },
            c => components.push(c),
        }
    }

    components.iter().collect()
}

/// Absolute, normalized form of `path`
pub fn absolute(path: &Path) -> io::Result<PathBuf> {
    std::path::absolute(path).map(|p| normalize_path(&p))
}

/// Relative path that leads from directory `base` to `target`
///
/// Both paths are expected to be absolute and normalized.
pub fn relative_path(target: &Path, base: &Path) -> PathBuf {
    let target: Vec<Component<'_>> = target.components().collect();
    let base: Vec<Component<'_>> = base.components().collect();

    let common = target.iter().zip(base.iter()).take_while(|(a, b)| a == b).count();

    let mut rel = PathBuf::new();
    for _ in common..base.len() {
        rel.push("..");
    }
    for component in &target[common..] {
        rel.push(component.as_os_str());
    }

    if rel.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        rel
    }
}

/// Render a path with forward slashes, for use inside markup
pub fn to_forward_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
