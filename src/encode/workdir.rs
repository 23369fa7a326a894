use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::ReelResult;

/// Isolated per-job temporary directory.
///
/// Removed by [`WorkDir::finish`]; if the job unwinds or returns early the directory is still
/// removed when the value is dropped.
#[derive(Debug)]
pub struct WorkDir {
    dir: tempfile::TempDir,
}

impl WorkDir {
    /// Create a fresh directory under `root` (system temp dir when `None`).
    pub fn new(root: Option<&Path>) -> ReelResult<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("stillreel-");
        let dir = match root {
            Some(root) => {
                std::fs::create_dir_all(root)
                    .with_context(|| format!("create temp root '{}'", root.display()))?;
                builder
                    .tempdir_in(root)
                    .with_context(|| format!("create work dir in '{}'", root.display()))?
            }
            None => builder.tempdir().context("create work dir")?,
        };
        tracing::debug!(path = %dir.path().display(), "work dir created");
        Ok(Self { dir })
    }

    /// Directory path.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a required input artifact; failure is fatal for the job.
    ///
    /// Relative names land inside the directory; absolute paths are used as given.
    pub fn write(&self, name: impl AsRef<Path>, bytes: &[u8]) -> ReelResult<PathBuf> {
        let path = self.dir.path().join(name);
        std::fs::write(&path, bytes)
            .with_context(|| format!("write job input '{}'", path.display()))?;
        Ok(path)
    }

    /// Best-effort removal of an intermediate file.
    pub fn discard(&self, path: &Path) {
        if let Err(e) = std::fs::remove_file(path) {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove intermediate");
        }
    }

    /// Remove the directory now, logging (not failing) on error.
    pub fn finish(self) {
        let path = self.dir.path().to_path_buf();
        if let Err(e) = self.dir.close() {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove work dir");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/workdir.rs"]
mod tests;
