//! Scoped scratch directory for downloaded and extracted test data.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::Result;

/// Working area for one harness run.
///
/// Owns a temporary directory that is removed when the value drops, so
/// repeated runs never see stale extracted case files. The handle is
/// passed explicitly to everything that needs disk space; nothing in the
/// harness writes to a well-known shared location.
pub struct Scratch {
    root: TempDir,
}

impl Scratch {
    /// Create a fresh scratch directory.
    pub fn new() -> Result<Self> {
        let root = tempfile::Builder::new().prefix("labtest-").tempdir()?;
        tracing::debug!(path = %root.path().display(), "created scratch directory");
        Ok(Self { root })
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Fresh, empty subdirectory for one test bundle. Recreated if a
    /// previous extraction already used the name.
    pub fn subdir(&self, name: &str) -> Result<PathBuf> {
        let dir = self.root.path().join(name);
        if dir.exists() {
            std::fs::remove_dir_all(&dir)?;
        }
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}
