mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config = parse_config(&content)
        .with_context(|| format!("Failed to load config file: {:?}", path))?;

    Ok(config)
}

/// Parse and validate configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).context("Failed to parse config")?;
    validate_config(&config)?;
    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./posterframe.toml",
        "~/.config/posterframe/config.toml",
        "/etc/posterframe/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if let Some(path) = &config.tools.ffmpeg_path {
        if !path.exists() {
            tracing::warn!("Configured ffmpeg path does not exist: {:?}", path);
        }
    }

    let thumb = &config.thumbnail;

    if let Some(q) = thumb.quality {
        if !(0.0..=1.0).contains(&q) {
            anyhow::bail!("thumbnail.quality must be between 0.0 and 1.0, got {}", q);
        }
    }

    if thumb.width == Some(0) || thumb.height == Some(0) {
        anyhow::bail!("thumbnail.width and thumbnail.height cannot be 0");
    }

    if thumb.timeout_secs == Some(0) {
        anyhow::bail!("thumbnail.timeout_secs cannot be 0");
    }

    Ok(())
}
