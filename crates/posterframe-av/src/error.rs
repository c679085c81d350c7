//! Error types for posterframe-av.

use std::path::PathBuf;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while producing a poster frame.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The caller's cancellation token fired while the decoder was running.
    #[error("thumbnail extraction aborted")]
    Aborted,

    /// The input video does not exist.
    #[error("source not found: {}", path.display())]
    SourceUnavailable { path: PathBuf },

    /// The decoder ran but exited unsuccessfully.
    #[error("decoder failed (code: {code:?}, signal: {signal:?})")]
    DecoderFailed {
        code: Option<i32>,
        signal: Option<i32>,
    },

    /// The extracted frame could not be decoded, resized or encoded.
    #[error("image conversion failed: {0}")]
    ConversionFailed(String),

    /// The decoder executable could not be started.
    #[error("failed to spawn {program}: {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The temporary workspace could not be created.
    #[error("workspace error: {0}")]
    Workspace(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a source unavailable error.
    pub fn source_unavailable(path: impl Into<PathBuf>) -> Self {
        Self::SourceUnavailable { path: path.into() }
    }

    /// Create a conversion failed error.
    pub fn conversion(message: impl std::fmt::Display) -> Self {
        Self::ConversionFailed(message.to_string())
    }

    /// Whether this error is the result of caller-requested cancellation.
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted)
    }

    /// Short, stable name of the error kind, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Aborted => "aborted",
            Self::SourceUnavailable { .. } => "source_unavailable",
            Self::DecoderFailed { .. } => "decoder_failed",
            Self::ConversionFailed(_) => "conversion_failed",
            Self::SpawnFailed { .. } => "spawn_failed",
            Self::Workspace(_) => "workspace",
            Self::Io(_) => "io",
        }
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::ConversionFailed(err.to_string())
    }
}
