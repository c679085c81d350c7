//! # posterframe-av
//!
//! Poster-frame extraction for video files.
//!
//! Given a video on disk or in memory, this crate seeks to a timestamp,
//! pulls one frame out with an external decoder (`ffmpeg`), then resizes
//! and re-encodes it as JPEG, PNG or WebP:
//!
//! - [`Workspace`] -- per-call temp directory, removed on every exit path
//! - [`VideoSource`] -- path or bytes, written to the workspace when needed
//! - [`FrameExtractor`] / [`FfmpegExtractor`] -- the decoder seam
//! - [`convert`] -- fit-inside resize and encoding
//! - [`ThumbnailPipeline`] / [`generate_video_thumbnail`] -- the whole flow
//! - [`is_decoder_available`] -- feature-gating probe
//!
//! ## Example
//!
//! ```no_run
//! use posterframe_av::{generate_video_thumbnail, OutputFormat, ThumbnailOptions, VideoSource};
//!
//! # async fn example() -> posterframe_av::Result<()> {
//! let options = ThumbnailOptions::new().at(2.0).width(320).format(OutputFormat::Webp);
//! match generate_video_thumbnail(&VideoSource::from_path("clip.mp4"), &options).await? {
//!     Some(thumb) => std::fs::write("clip.webp", &thumb.bytes)?,
//!     None => println!("no thumbnail available"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod convert;
mod error;
pub mod extract;
pub mod options;
pub mod pipeline;
pub mod source;
pub mod tools;
pub mod workspace;

// Re-exports
pub use command::ToolCommand;
pub use error::{Error, Result};
pub use extract::{FfmpegExtractor, FrameExtractor, FrameRequest};
pub use options::{OutputFormat, ThumbnailOptions, ThumbnailResult};
pub use pipeline::{generate_video_thumbnail, ThumbnailPipeline};
pub use source::VideoSource;
pub use tools::{decoder_info, is_decoder_available, resolve_decoder, ToolInfo};
pub use workspace::Workspace;

pub use tokio_util::sync::CancellationToken;
