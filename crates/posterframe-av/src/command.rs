//! Builder for running an external tool with silenced stdio and optional
//! cancellation.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use crate::{Error, Result};

/// A builder for constructing and executing external tool invocations.
///
/// The child's stdin, stdout and stderr are all attached to the null
/// device; nothing the tool prints reaches the caller.
///
/// # Example
///
/// ```no_run
/// use posterframe_av::ToolCommand;
/// use std::path::PathBuf;
///
/// # async fn example() -> posterframe_av::Result<()> {
/// ToolCommand::new(PathBuf::from("ffmpeg"))
///     .arg("-version")
///     .execute()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<OsString>,
    cancel: Option<CancellationToken>,
}

impl ToolCommand {
    /// Create a new command for the given program path.
    pub fn new(program: PathBuf) -> Self {
        Self {
            program,
            args: Vec::new(),
            cancel: None,
        }
    }

    /// Append a single argument.
    pub fn arg(&mut self, s: impl Into<OsString>) -> &mut Self {
        self.args.push(s.into());
        self
    }

    /// Append multiple arguments.
    pub fn args(&mut self, iter: impl IntoIterator<Item = impl Into<OsString>>) -> &mut Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    /// Kill the child and fail with [`Error::Aborted`] if `token` fires
    /// before it exits.
    pub fn cancel_on(&mut self, token: Option<CancellationToken>) -> &mut Self {
        self.cancel = token;
        self
    }

    fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }

    /// Run the command to completion.
    ///
    /// # Errors
    ///
    /// - [`Error::SpawnFailed`] if the process cannot be started.
    /// - [`Error::Aborted`] if the cancellation token fires while the
    ///   process is running. The child is killed first.
    /// - [`Error::DecoderFailed`] if the process exits non-zero or is
    ///   terminated by a signal.
    pub async fn execute(&self) -> Result<ExitStatus> {
        let program_name = self.program_name();

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| Error::SpawnFailed {
                program: program_name.clone(),
                source,
            })?;

        tracing::debug!(tool = %program_name, pid = ?child.id(), "spawned");

        // The cancellation future only lives inside this select, so nothing
        // can act on the child once it has settled.
        let waited = match &self.cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => None,
                    status = child.wait() => Some(status),
                }
            }
            None => Some(child.wait().await),
        };

        let status = match waited {
            Some(status) => status?,
            None => {
                tracing::debug!(tool = %program_name, "cancelled, killing child");
                if let Err(e) = child.kill().await {
                    tracing::warn!(tool = %program_name, error = %e, "failed to kill child");
                }
                return Err(Error::Aborted);
            }
        };

        if !status.success() {
            return Err(Error::DecoderFailed {
                code: status.code(),
                signal: exit_signal(&status),
            });
        }

        Ok(status)
    }
}

#[cfg(unix)]
fn exit_signal(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn exit_signal(_status: &ExitStatus) -> Option<i32> {
    None
}
