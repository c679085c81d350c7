//! Poster-frame pipeline: workspace, source, extraction, conversion.

use std::path::Path;

use crate::convert::{self, ConvertRequest};
use crate::extract::{FfmpegExtractor, FrameExtractor, FrameRequest};
use crate::options::{ThumbnailOptions, ThumbnailResult};
use crate::source::{self, VideoSource};
use crate::{Error, Result, Workspace};

const POSTER_FILE: &str = "poster.png";

/// Produces thumbnails from videos using a pluggable [`FrameExtractor`].
///
/// Every call gets its own [`Workspace`]; calls share no state and can run
/// concurrently.
#[derive(Debug, Clone)]
pub struct ThumbnailPipeline<E = FfmpegExtractor> {
    extractor: E,
    temp_root: Option<std::path::PathBuf>,
}

impl Default for ThumbnailPipeline<FfmpegExtractor> {
    fn default() -> Self {
        Self::new(FfmpegExtractor::default())
    }
}

impl<E: FrameExtractor> ThumbnailPipeline<E> {
    pub fn new(extractor: E) -> Self {
        Self {
            extractor,
            temp_root: None,
        }
    }

    /// Create workspaces under `root` instead of the system temp directory.
    pub fn with_temp_root(mut self, root: impl Into<std::path::PathBuf>) -> Self {
        self.temp_root = Some(root.into());
        self
    }

    pub fn extractor(&self) -> &E {
        &self.extractor
    }

    /// Generate a thumbnail, collapsing every failure except cancellation
    /// into `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Only [`Error::Aborted`].
    pub async fn generate(
        &self,
        source: &VideoSource,
        options: &ThumbnailOptions,
    ) -> Result<Option<ThumbnailResult>> {
        match self.try_generate(source, options).await {
            Ok(result) => Ok(Some(result)),
            Err(Error::Aborted) => {
                tracing::info!("thumbnail generation aborted");
                Err(Error::Aborted)
            }
            Err(e @ Error::SourceUnavailable { .. }) => {
                tracing::debug!(kind = e.kind(), error = %e, "no thumbnail");
                Ok(None)
            }
            Err(e) => {
                tracing::warn!(kind = e.kind(), error = %e, "thumbnail generation failed");
                Ok(None)
            }
        }
    }

    /// Generate a thumbnail, reporting the reason for any failure.
    pub async fn try_generate(
        &self,
        source: &VideoSource,
        options: &ThumbnailOptions,
    ) -> Result<ThumbnailResult> {
        let timestamp_seconds = options.effective_timestamp();
        let format = options.effective_format();

        let workspace = match &self.temp_root {
            Some(root) => Workspace::acquire_in(root)?,
            None => Workspace::acquire()?,
        };

        // `workspace` is dropped, and the directory removed, on every
        // return path below.
        let input = source::materialize(source, &workspace).await?;
        let poster = workspace.temp_file(POSTER_FILE);

        let request = FrameRequest {
            timestamp_seconds,
            width: options.width,
            height: options.height,
            cancellation: options.cancellation.clone(),
        };
        self.extractor
            .extract_frame(&input, &poster, &request)
            .await?;

        let raw = read_poster(&poster).await?;
        let convert_request = ConvertRequest {
            width: options.width,
            height: options.height,
            format,
            quality: options.quality,
        };
        let converted =
            tokio::task::spawn_blocking(move || convert::convert(&raw, &convert_request))
                .await
                .map_err(|e| Error::conversion(format!("conversion task failed: {e}")))??;

        workspace.release();

        tracing::info!(
            width = converted.width,
            height = converted.height,
            format = %format,
            timestamp_seconds,
            "thumbnail generated"
        );

        Ok(ThumbnailResult {
            bytes: converted.bytes,
            width: converted.width,
            height: converted.height,
            format,
            timestamp_seconds,
            quality: converted.quality,
        })
    }
}

/// Read the extracted frame. A decoder that exits cleanly without writing
/// anything (e.g. a seek past the end) counts as a decoder failure.
async fn read_poster(path: &Path) -> Result<Vec<u8>> {
    let no_frame = || Error::DecoderFailed {
        code: Some(0),
        signal: None,
    };

    match tokio::fs::read(path).await {
        Ok(bytes) if bytes.is_empty() => Err(no_frame()),
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(no_frame()),
        Err(e) => Err(e.into()),
    }
}

/// Generate a thumbnail with the `ffmpeg` found on `PATH`.
///
/// Returns `Ok(None)` when no thumbnail could be produced; the only error
/// is [`Error::Aborted`].
///
/// # Example
///
/// ```no_run
/// use posterframe_av::{generate_video_thumbnail, ThumbnailOptions, VideoSource};
///
/// # async fn example() -> posterframe_av::Result<()> {
/// let source = VideoSource::from_path("/videos/clip.mp4");
/// let options = ThumbnailOptions::new().at(2.0).width(320);
/// if let Some(thumb) = generate_video_thumbnail(&source, &options).await? {
///     println!("{}x{} {}", thumb.width, thumb.height, thumb.format);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn generate_video_thumbnail(
    source: &VideoSource,
    options: &ThumbnailOptions,
) -> Result<Option<ThumbnailResult>> {
    ThumbnailPipeline::default().generate(source, options).await
}
