//! Virtual-path resolution for the served directory tree.
//!
//! Every client-visible path is an absolute path inside a virtual root
//! ("/" on the wire). These functions are pure string manipulation: the
//! single authority handlers must route relative arguments through before
//! touching the filesystem.

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SandboxError {
    #[error("path escapes the served directory")]
    Escape,
}

/// Resolves `input` against the virtual directory `cwd`.
///
/// An input starting with `/` resolves from the virtual root, anything else
/// from `cwd`. `.` segments are dropped, `..` pops one level, and popping
/// at the root is refused rather than clamped. The result is normalized:
/// single separators, no trailing separator except for the root itself.
pub fn join(cwd: &str, input: &str) -> Result<String, SandboxError> {
    let mut stack: Vec<&str> = if input.starts_with('/') {
        Vec::new()
    } else {
        cwd.split('/').filter(|s| !s.is_empty()).collect()
    };

    for segment in input.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if stack.pop().is_none() {
                    return Err(SandboxError::Escape);
                }
            }
            name => stack.push(name),
        }
    }

    if stack.is_empty() {
        Ok(String::from("/"))
    } else {
        Ok(format!("/{}", stack.join("/")))
    }
}

/// Normalizes an absolute virtual path, refusing attempts to climb above
/// the root.
pub fn normalize(path: &str) -> Result<String, SandboxError> {
    join("/", path)
}

/// Maps a normalized virtual path onto the real served directory.
pub fn to_real(root: &Path, virtual_path: &str) -> PathBuf {
    root.join(virtual_path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_segments_append() {
        assert_eq!(join("/a", "b").unwrap(), "/a/b");
        assert_eq!(join("/", "docs").unwrap(), "/docs");
    }

    #[test]
    fn dot_segments_are_dropped() {
        assert_eq!(join("/a", "./././b").unwrap(), "/a/b");
        assert_eq!(join("/a/b", ".").unwrap(), "/a/b");
    }

    #[test]
    fn dotdot_pops_one_level() {
        assert_eq!(join("/a/b", "../c").unwrap(), "/a/c");
        assert_eq!(join("/a/b", "..").unwrap(), "/a");
        assert_eq!(join("/a", "..").unwrap(), "/");
    }

    #[test]
    fn climbing_above_root_is_refused() {
        assert_eq!(join("/", ".."), Err(SandboxError::Escape));
        assert_eq!(join("/a/b", "../../../etc"), Err(SandboxError::Escape));
        assert_eq!(join("/a", "../../.."), Err(SandboxError::Escape));
    }

    #[test]
    fn leading_slash_resolves_from_root() {
        assert_eq!(join("/deep/down", "/top").unwrap(), "/top");
        assert_eq!(join("/deep/down", "/").unwrap(), "/");
    }

    #[test]
    fn repeated_separators_collapse() {
        assert_eq!(join("/", "a//b///c").unwrap(), "/a/b/c");
        assert_eq!(normalize("//a//b/").unwrap(), "/a/b");
    }

    #[test]
    fn no_trailing_separator_except_root() {
        assert_eq!(join("/", "a/b/").unwrap(), "/a/b");
        assert_eq!(join("/a", "/").unwrap(), "/");
    }

    #[test]
    fn normalize_refuses_escapes_too() {
        assert_eq!(normalize("/a/../.."), Err(SandboxError::Escape));
        assert_eq!(normalize("/a/./b/..").unwrap(), "/a");
    }

    #[test]
    fn maps_virtual_paths_under_the_real_root() {
        let root = Path::new("/srv/mftp");
        assert_eq!(to_real(root, "/"), PathBuf::from("/srv/mftp"));
        assert_eq!(to_real(root, "/a/b"), PathBuf::from("/srv/mftp/a/b"));
    }
}
