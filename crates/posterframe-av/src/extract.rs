//! Poster-frame extraction through an external decoder.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::command::ToolCommand;
use crate::Result;

/// Executable name looked up on `PATH` when no explicit path is given.
pub const DEFAULT_DECODER: &str = "ffmpeg";

/// What to pull out of the video.
#[derive(Debug, Clone, Default)]
pub struct FrameRequest {
    /// Seek position; a seek is only issued when this is strictly positive.
    pub timestamp_seconds: f64,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub cancellation: Option<CancellationToken>,
}

/// Something that can write a single still frame of a video to disk.
#[async_trait]
pub trait FrameExtractor: Send + Sync {
    /// Decode one frame of `input` and write it as a still image to `output`.
    async fn extract_frame(&self, input: &Path, output: &Path, request: &FrameRequest)
        -> Result<()>;
}

/// [`FrameExtractor`] backed by the `ffmpeg` command-line tool.
#[derive(Debug, Clone)]
pub struct FfmpegExtractor {
    program: PathBuf,
}

impl Default for FfmpegExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_DECODER)
    }
}

impl FfmpegExtractor {
    /// Use the given executable (a bare name is resolved through `PATH`).
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The executable this extractor spawns.
    pub fn program(&self) -> &Path {
        &self.program
    }
}

#[async_trait]
impl FrameExtractor for FfmpegExtractor {
    async fn extract_frame(
        &self,
        input: &Path,
        output: &Path,
        request: &FrameRequest,
    ) -> Result<()> {
        let args = decoder_args(input, output, request);

        tracing::debug!(
            program = %self.program.display(),
            args = ?args,
            "extracting poster frame"
        );

        let mut cmd = ToolCommand::new(self.program.clone());
        cmd.args(args);
        cmd.cancel_on(request.cancellation.clone());
        cmd.execute().await?;

        Ok(())
    }
}

/// Build the decoder argument list.
///
/// `-ss` goes before `-i` so the decoder seeks on the input rather than
/// decoding up to the timestamp.
pub fn decoder_args(input: &Path, output: &Path, request: &FrameRequest) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-y".into()];

    if request.timestamp_seconds > 0.0 {
        args.push("-ss".into());
        args.push(format!("{:.3}", request.timestamp_seconds).into());
    }

    args.push("-i".into());
    args.push(input.into());
    args.push("-frames:v".into());
    args.push("1".into());

    if let Some(filter) = scale_filter(request.width, request.height) {
        args.push("-vf".into());
        args.push(filter.into());
    }

    args.push("-f".into());
    args.push("image2".into());
    args.push(output.into());
    args
}

/// `scale=<w>:<h>:flags=lanczos`, with `-1` for the axis left to the
/// decoder. `None` when neither axis is requested.
pub fn scale_filter(width: Option<u32>, height: Option<u32>) -> Option<String> {
    if width.is_none() && height.is_none() {
        return None;
    }

    let axis = |v: Option<u32>| v.map_or_else(|| "-1".to_string(), |v| v.to_string());
    Some(format!(
        "scale={}:{}:flags=lanczos",
        axis(width),
        axis(height)
    ))
}
