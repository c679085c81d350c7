//! Decoder discovery and availability checks.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use serde::Serialize;
use tokio::process::Command;

use crate::command::ToolCommand;
use crate::extract::DEFAULT_DECODER;

/// Information about an external tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    /// Name of the tool.
    pub name: String,
    /// Whether the tool is available.
    pub available: bool,
    /// Version string if available.
    pub version: Option<String>,
    /// Path to the tool executable.
    pub path: Option<PathBuf>,
}

/// Whether `ffmpeg` on `PATH` can be run at all.
pub async fn is_decoder_available() -> bool {
    is_tool_available(Path::new(DEFAULT_DECODER)).await
}

/// Run `program -version` with silenced stdio; `true` only on a clean
/// exit. Never fails.
pub async fn is_tool_available(program: &Path) -> bool {
    match ToolCommand::new(program.to_path_buf())
        .arg("-version")
        .execute()
        .await
    {
        Ok(_) => true,
        Err(e) => {
            tracing::debug!(program = %program.display(), error = %e, "decoder not available");
            false
        }
    }
}

/// Pick the decoder executable: a configured path if it exists, else the
/// bare `ffmpeg` name resolved through `PATH` at spawn time.
pub fn resolve_decoder(config_path: Option<&Path>) -> PathBuf {
    if let Some(path) = config_path {
        if path.exists() {
            return path.to_path_buf();
        }
        tracing::warn!(
            path = %path.display(),
            "configured decoder path does not exist, falling back to PATH"
        );
    }

    PathBuf::from(DEFAULT_DECODER)
}

/// Check `program` and report its first version line and resolved path.
pub async fn decoder_info(program: &Path) -> ToolInfo {
    let name = program
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| program.to_string_lossy().to_string());

    let output = Command::new(program)
        .arg("-version")
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await;

    match output {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .map(|s| s.to_string());

            ToolInfo {
                name,
                available: true,
                version,
                path: which::which(program).ok(),
            }
        }
        _ => ToolInfo {
            name,
            available: false,
            version: None,
            path: None,
        },
    }
}
