//! Video input and materialization onto disk.

use std::path::{Path, PathBuf};

use crate::{Error, Result, Workspace};

/// Where the video to thumbnail comes from.
///
/// The decoder only reads files, so [`VideoSource::Bytes`] is written into
/// the call's workspace before extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoSource {
    /// A caller-owned file already on disk.
    Path(PathBuf),
    /// Opaque in-memory video data.
    Bytes(Vec<u8>),
}

impl VideoSource {
    /// Reference a video file on disk.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    /// Wrap in-memory video data.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(bytes.into())
    }
}

impl From<PathBuf> for VideoSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for VideoSource {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<Vec<u8>> for VideoSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

/// Make `source` available as a filesystem path.
///
/// Paths are returned unchanged after checking that they exist. Bytes are
/// written verbatim to a uniquely-named file inside `workspace`.
pub async fn materialize(source: &VideoSource, workspace: &Workspace) -> Result<PathBuf> {
    match source {
        VideoSource::Path(path) => {
            match tokio::fs::metadata(path).await {
                Ok(_) => Ok(path.clone()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    Err(Error::source_unavailable(path))
                }
                Err(e) => Err(e.into()),
            }
        }
        VideoSource::Bytes(bytes) => {
            let path = workspace.temp_file(&format!("source-{}", uuid::Uuid::new_v4()));
            tokio::fs::write(&path, bytes).await?;
            tracing::debug!(
                path = %path.display(),
                len = bytes.len(),
                "materialized in-memory source"
            );
            Ok(path)
        }
    }
}
