use posterframe_av::{OutputFormat, ThumbnailOptions};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub thumbnail: ThumbnailConfig,
}

/// Paths to external tools. Unset or missing paths fall back to `PATH`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,
}

/// Defaults applied to every `thumbnail` run unless overridden on the
/// command line.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ThumbnailConfig {
    /// Seek position in seconds (default: 1)
    #[serde(default)]
    pub timestamp_seconds: Option<f64>,

    #[serde(default)]
    pub width: Option<u32>,

    #[serde(default)]
    pub height: Option<u32>,

    /// jpeg, png or webp (default: jpeg)
    #[serde(default)]
    pub format: Option<OutputFormat>,

    /// 0.0-1.0, ignored for png
    #[serde(default)]
    pub quality: Option<f64>,

    /// Cancel extraction after this many seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ThumbnailConfig {
    /// Options built from these defaults.
    pub fn to_options(&self) -> ThumbnailOptions {
        ThumbnailOptions {
            timestamp_seconds: self.timestamp_seconds,
            width: self.width,
            height: self.height,
            output_format: self.format,
            quality: self.quality,
            cancellation: None,
        }
    }
}
