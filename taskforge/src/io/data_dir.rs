//! Read-only, path-confined access to the data directory.
//!
//! Every requested path is normalized before the containment check: `.` and
//! `..` segments are resolved lexically, then the path is canonicalized so
//! symbolic links cannot point a read outside the root. Error values carry
//! only the binary fact of invalidity or absence, never resolved paths or
//! directory contents.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::debug;

/// Rejection taxonomy for confined reads.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The path does not lie within the data directory after normalization,
    /// or does not name a regular file's legal location.
    #[error("path is outside the data directory")]
    InvalidPath,
    /// The path lies within the data directory but no regular file exists
    /// there.
    #[error("no such file in the data directory")]
    NotFound,
    /// The file exists but could not be read.
    #[error("failed to read file")]
    Io(#[source] io::Error),
}

/// Read-only view of a single root directory.
///
/// Construct once from configuration; the root is canonicalized up front and
/// never changes afterwards.
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    /// Canonicalize `root` and confine all subsequent reads to it.
    pub fn new(root: &Path) -> Result<Self> {
        let root = root
            .canonicalize()
            .with_context(|| format!("resolve data root {}", root.display()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read the file at `requested`, which may be absolute or relative to
    /// the root. Write and delete operations are deliberately not offered.
    pub fn read(&self, requested: &str) -> Result<String, ReadError> {
        let requested = Path::new(requested);
        let candidate = if requested.is_absolute() {
            requested.to_path_buf()
        } else {
            self.root.join(requested)
        };

        let normalized = lexical_normalize(&candidate).ok_or(ReadError::InvalidPath)?;
        if !normalized.starts_with(&self.root) {
            debug!("rejected path outside data root");
            return Err(ReadError::InvalidPath);
        }

        // Lexical containment is not enough: a symlink inside the root can
        // still point anywhere. Canonicalize and re-check.
        match normalized.canonicalize() {
            Ok(real) => {
                if !real.starts_with(&self.root) {
                    debug!("rejected symlink escaping data root");
                    return Err(ReadError::InvalidPath);
                }
                if !real.is_file() {
                    return Err(ReadError::NotFound);
                }
                fs::read_to_string(&real).map_err(ReadError::Io)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Err(ReadError::NotFound),
            Err(err) => Err(ReadError::Io(err)),
        }
    }
}

/// Resolve `.` and `..` segments without touching the filesystem.
///
/// Returns `None` when a `..` segment would climb above the filesystem root.
fn lexical_normalize(path: &Path) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    let mut depth = 0usize;
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => out.push(prefix.as_os_str()),
            Component::RootDir => out.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return None;
                }
                out.pop();
                depth -= 1;
            }
            Component::Normal(name) => {
                out.push(name);
                depth += 1;
            }
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_dir_with(files: &[(&str, &str)]) -> (tempfile::TempDir, DataDir) {
        let temp = tempfile::tempdir().expect("tempdir");
        for (name, contents) in files {
            let path = temp.path().join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).expect("mkdir");
            }
            fs::write(path, contents).expect("write");
        }
        let dir = DataDir::new(temp.path()).expect("data dir");
        (temp, dir)
    }

    #[test]
    fn reads_file_inside_root() {
        let (_temp, dir) = data_dir_with(&[("report.csv", "a,b\n")]);
        assert_eq!(dir.read("report.csv").expect("read"), "a,b\n");
    }

    #[test]
    fn reads_absolute_path_inside_root() {
        let (_temp, dir) = data_dir_with(&[("report.csv", "a,b\n")]);
        let absolute = dir.root().join("report.csv");
        let content = dir.read(absolute.to_str().expect("utf8")).expect("read");
        assert_eq!(content, "a,b\n");
    }

    #[test]
    fn missing_file_inside_root_is_not_found() {
        let (_temp, dir) = data_dir_with(&[]);
        assert!(matches!(dir.read("report.csv"), Err(ReadError::NotFound)));
    }

    #[test]
    fn absolute_path_outside_root_is_invalid() {
        let (_temp, dir) = data_dir_with(&[]);
        assert!(matches!(
            dir.read("/etc/passwd"),
            Err(ReadError::InvalidPath)
        ));
    }

    #[test]
    fn parent_traversal_is_invalid() {
        let (_temp, dir) = data_dir_with(&[("inner/file.txt", "x")]);
        assert!(matches!(
            dir.read("inner/../../outside.txt"),
            Err(ReadError::InvalidPath)
        ));
    }

    #[test]
    fn traversal_that_returns_inside_root_is_allowed() {
        let (_temp, dir) = data_dir_with(&[("file.txt", "ok")]);
        assert_eq!(dir.read("inner/../file.txt").expect("read"), "ok");
    }

    #[test]
    fn directory_inside_root_is_not_found() {
        let (_temp, dir) = data_dir_with(&[("inner/file.txt", "x")]);
        assert!(matches!(dir.read("inner"), Err(ReadError::NotFound)));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_escaping_root_is_invalid() {
        let outside = tempfile::tempdir().expect("outside");
        let secret = outside.path().join("secret.txt");
        fs::write(&secret, "secret").expect("write");

        let (_temp, dir) = data_dir_with(&[]);
        std::os::unix::fs::symlink(&secret, dir.root().join("link.txt")).expect("symlink");

        assert!(matches!(
            dir.read("link.txt"),
            Err(ReadError::InvalidPath)
        ));
    }

    #[test]
    fn error_messages_do_not_leak_paths() {
        let (_temp, dir) = data_dir_with(&[]);
        let err = dir.read("/etc/passwd").unwrap_err();
        assert!(!err.to_string().contains("passwd"));
    }
}
