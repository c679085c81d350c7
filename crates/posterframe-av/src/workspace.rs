//! Per-call scratch directories.
//!
//! A [`Workspace`] owns a uniquely-named directory under the system temp
//! root. The directory and everything inside it are removed when the
//! workspace is dropped, so every exit path of a pipeline call (success,
//! failure, cancellation, panic unwind) releases it exactly once.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::{Error, Result};

const PREFIX: &str = "posterframe-";

/// Scratch directory for one pipeline invocation.
///
/// # Example
///
/// ```no_run
/// use posterframe_av::Workspace;
///
/// let workspace = Workspace::acquire()?;
/// let poster = workspace.temp_file("poster.png");
/// // ... write intermediate files ...
/// workspace.release();
/// # Ok::<(), posterframe_av::Error>(())
/// ```
#[derive(Debug)]
pub struct Workspace {
    temp_dir: Option<TempDir>,
    path: PathBuf,
}

impl Workspace {
    /// Create a new, uniquely-named directory under the system temp root.
    pub fn acquire() -> Result<Self> {
        Self::acquire_in(std::env::temp_dir())
    }

    /// Create a new, uniquely-named directory under `root`.
    pub fn acquire_in<P: AsRef<Path>>(root: P) -> Result<Self> {
        let temp_dir = tempfile::Builder::new()
            .prefix(PREFIX)
            .tempdir_in(root)
            .map_err(|e| Error::Workspace(format!("failed to create temp dir: {e}")))?;
        let path = temp_dir.path().to_path_buf();

        tracing::debug!(workspace = %path.display(), "workspace acquired");

        Ok(Self {
            temp_dir: Some(temp_dir),
            path,
        })
    }

    /// Path to the workspace directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create a path for a named file inside the workspace.
    pub fn temp_file(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    /// Remove the workspace and its contents now.
    ///
    /// Removal errors are logged and otherwise ignored.
    pub fn release(mut self) {
        self.remove();
    }

    fn remove(&mut self) {
        let Some(temp_dir) = self.temp_dir.take() else {
            return;
        };

        match temp_dir.close() {
            Ok(()) => tracing::debug!(workspace = %self.path.display(), "workspace released"),
            Err(e) => tracing::warn!(
                workspace = %self.path.display(),
                error = %e,
                "failed to remove workspace"
            ),
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        self.remove();
    }
}
