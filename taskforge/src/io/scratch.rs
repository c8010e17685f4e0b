//! Per-request scratch directories for materialized units.
//!
//! Every inbound task request gets its own directory under the scratch base,
//! named with a timestamp plus a random suffix, so concurrent requests can
//! never clobber each other's materialized script. Within the directory the
//! unit keeps a fixed file name; each repair attempt rewrites it, replacing
//! the previous unit.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use rand::{Rng, distributions::Alphanumeric};
use tracing::debug;

/// File name of the materialized unit inside a scratch directory.
pub const UNIT_FILE_NAME: &str = "task.py";

/// An isolated working directory owned by one task request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScratchDir {
    root: PathBuf,
    name: String,
}

impl ScratchDir {
    /// Create a fresh scratch directory under `base`.
    pub fn create(base: &Path) -> Result<Self> {
        let name = format!("{}_{}", generate_timestamp(), generate_short_id());
        let root = base.join(&name);
        fs::create_dir_all(&root)
            .with_context(|| format!("create scratch directory {}", root.display()))?;
        debug!(scratch = %root.display(), "created scratch directory");
        Ok(Self { root, name })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Directory name; doubles as the request identifier in reports.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Write (or replace) the materialized unit, returning its path.
    pub fn write_unit(&self, unit: &str) -> Result<PathBuf> {
        let path = self.root.join(UNIT_FILE_NAME);
        fs::write(&path, unit).with_context(|| format!("write unit {}", path.display()))?;
        Ok(path)
    }

    /// Remove the scratch directory and everything in it.
    pub fn cleanup(&self) -> Result<()> {
        if self.root.exists() {
            fs::remove_dir_all(&self.root)
                .with_context(|| format!("remove scratch directory {}", self.root.display()))?;
        }
        Ok(())
    }
}

fn generate_timestamp() -> String {
    Utc::now().format("%Y%m%d_%H%M%S").to_string()
}

fn generate_short_id() -> String {
    let mut rng = rand::thread_rng();
    std::iter::repeat_with(|| rng.sample(Alphanumeric))
        .map(char::from)
        .take(6)
        .collect::<String>()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn creates_unique_directories() {
        let temp = tempdir().expect("tempdir");
        let a = ScratchDir::create(temp.path()).expect("scratch a");
        let b = ScratchDir::create(temp.path()).expect("scratch b");

        assert!(a.path().is_dir());
        assert!(b.path().is_dir());
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn write_unit_replaces_previous_unit() {
        let temp = tempdir().expect("tempdir");
        let scratch = ScratchDir::create(temp.path()).expect("scratch");

        let first = scratch.write_unit("print(1)\n").expect("write");
        let second = scratch.write_unit("print(2)\n").expect("write");

        assert_eq!(first, second);
        assert_eq!(fs::read_to_string(&second).expect("read"), "print(2)\n");
    }

    #[test]
    fn cleanup_removes_directory() {
        let temp = tempdir().expect("tempdir");
        let scratch = ScratchDir::create(temp.path()).expect("scratch");
        scratch.write_unit("pass\n").expect("write");

        scratch.cleanup().expect("cleanup");
        assert!(!scratch.path().exists());
    }

    #[test]
    fn cleanup_is_idempotent() {
        let temp = tempdir().expect("tempdir");
        let scratch = ScratchDir::create(temp.path()).expect("scratch");
        scratch.cleanup().expect("first cleanup");
        scratch.cleanup().expect("second cleanup");
    }
}
