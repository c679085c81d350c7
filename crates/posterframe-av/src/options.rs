//! Thumbnail request options and results.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// Timestamp used when the caller gives none, or one that is not a finite,
/// non-negative number.
pub const DEFAULT_TIMESTAMP_SECS: f64 = 1.0;

/// Encoder quality used for WebP when none is requested.
pub const DEFAULT_WEBP_QUALITY: u8 = 75;

/// Encoder quality used for JPEG when none is requested.
pub const DEFAULT_JPEG_QUALITY: u8 = 92;

/// Image format of the produced thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
    Webp,
}

impl OutputFormat {
    /// File extension without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }

    /// MIME type of the encoded image.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
        }
    }

    /// Encoder quality (1-100) for a requested 0.0-1.0 quality.
    ///
    /// PNG is lossless and has no quality knob.
    pub fn encoder_quality(&self, quality: Option<f64>) -> Option<u8> {
        let scaled = quality
            .filter(|q| q.is_finite())
            .map(|q| (q.clamp(0.0, 1.0) * 100.0).round() as u8);

        match self {
            Self::Png => None,
            Self::Webp => Some(scaled.unwrap_or(DEFAULT_WEBP_QUALITY)),
            Self::Jpeg => Some(scaled.unwrap_or(DEFAULT_JPEG_QUALITY).max(1)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Webp => "webp",
        };
        f.write_str(name)
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            "webp" => Ok(Self::Webp),
            other => Err(format!("unsupported output format: {other}")),
        }
    }
}

/// Options for a single thumbnail request.
#[derive(Debug, Clone, Default)]
pub struct ThumbnailOptions {
    /// Seek position in seconds. Defaults to 1 second.
    pub timestamp_seconds: Option<f64>,
    /// Target width; omit to derive it from the height and aspect ratio.
    pub width: Option<u32>,
    /// Target height; omit to derive it from the width and aspect ratio.
    pub height: Option<u32>,
    /// Output encoding. Defaults to JPEG.
    pub output_format: Option<OutputFormat>,
    /// 0.0-1.0, ignored for PNG.
    pub quality: Option<f64>,
    /// Signal that aborts the decoder while it is running.
    pub cancellation: Option<CancellationToken>,
}

impl ThumbnailOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(mut self, seconds: f64) -> Self {
        self.timestamp_seconds = Some(seconds);
        self
    }

    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    pub fn format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    pub fn quality(mut self, quality: f64) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// The timestamp the pipeline will actually seek to.
    pub fn effective_timestamp(&self) -> f64 {
        normalize_timestamp(self.timestamp_seconds)
    }

    /// The format the pipeline will actually encode.
    pub fn effective_format(&self) -> OutputFormat {
        self.output_format.unwrap_or_default()
    }
}

/// Use `timestamp` only if it is a finite, non-negative number.
pub fn normalize_timestamp(timestamp: Option<f64>) -> f64 {
    match timestamp {
        Some(t) if t.is_finite() && t >= 0.0 => t,
        _ => DEFAULT_TIMESTAMP_SECS,
    }
}

/// A produced thumbnail and the parameters actually used.
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailResult {
    /// Encoded image.
    pub bytes: Vec<u8>,
    /// Final pixel width.
    pub width: u32,
    /// Final pixel height.
    pub height: u32,
    pub format: OutputFormat,
    pub timestamp_seconds: f64,
    /// Encoder quality used, `None` for PNG.
    pub quality: Option<u8>,
}
