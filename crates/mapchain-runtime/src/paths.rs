/*
 * paths.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Lexical path helpers shared by hosts and the chain loader.
 *
 * None of these touch the filesystem: map sources routinely name files that
 * do not exist on this machine.
 */

use std::path::{Component, Path, PathBuf};

/// Convert backslashes to forward slashes
pub fn slash(path: &str) -> String {
    path.replace('\\', "/")
}

/// Whether `path` is absolute on any platform
///
/// A leading `/` or `\` counts even on Windows, where `Path::is_absolute`
/// would require a drive prefix.
pub fn is_absolute(path: &str) -> bool {
    path.starts_with('/') || path.starts_with('\\') || Path::new(path).is_absolute()
}

/// Remove `.` components and fold `..` into their parents
pub fn normalize(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    result.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    result.pop();
                } else if !result.has_root() {
                    result.push("..");
                }
            }
            _ => result.push(component),
        }
    }

    result
}

/// Resolve `path` against `base` (when relative) and normalize
pub fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() || path.has_root() {
        normalize(path)
    } else {
        normalize(&base.join(path))
    }
}

/// Path from directory `from` to `to`, using `..` where needed
///
/// Both paths are normalized first. Returns `.` when they are equal.
pub fn relative(from: &Path, to: &Path) -> PathBuf {
    let from = normalize(from);
    let to = normalize(to);
    let from_components: Vec<_> = from.components().collect();
    let to_components: Vec<_> = to.components().collect();

    let common_len = from_components
        .iter()
        .zip(to_components.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut result = PathBuf::new();
    for _ in common_len..from_components.len() {
        result.push("..");
    }
    for component in &to_components[common_len..] {
        result.push(component);
    }

    if result.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        result
    }
}

/// Lossy forward-slash rendering of a path
pub fn display_slash(path: &Path) -> String {
    slash(&path.to_string_lossy())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slash() {
        assert_eq!(slash("a\\b\\c.js"), "a/b/c.js");
        assert_eq!(slash("a/b"), "a/b");
    }

    #[test]
    fn test_is_absolute() {
        assert!(is_absolute("/abs/out.js"));
        assert!(is_absolute("\\abs\\out.js"));
        assert!(!is_absolute("out.js"));
        assert!(!is_absolute("./dist/out.js"));
        assert!(!is_absolute(""));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("/a/./b/../c.js")), PathBuf::from("/a/c.js"));
        assert_eq!(normalize(Path::new("a/../../b")), PathBuf::from("../b"));
        assert_eq!(normalize(Path::new("/../a")), PathBuf::from("/a"));
        assert_eq!(normalize(Path::new("./a")), PathBuf::from("a"));
    }

    #[test]
    fn test_resolve() {
        let base = Path::new("/project/dist");
        assert_eq!(
            resolve(base, Path::new("../src/a.ts")),
            PathBuf::from("/project/src/a.ts")
        );
        assert_eq!(resolve(base, Path::new("/other/b.ts")), PathBuf::from("/other/b.ts"));
    }

    #[test]
    fn test_relative() {
        assert_eq!(
            relative(Path::new("/project"), Path::new("/project/src/a.ts")),
            PathBuf::from("src/a.ts")
        );
        assert_eq!(
            relative(Path::new("/project/dist"), Path::new("/project/src/a.ts")),
            PathBuf::from("../src/a.ts")
        );
        assert_eq!(relative(Path::new("/a/b"), Path::new("/a/b")), PathBuf::from("."));
    }
}
