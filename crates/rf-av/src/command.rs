//! Builder for executing external tool commands.

use std::ffi::{OsStr, OsString};
use std::path::PathBuf;
use std::process::ExitStatus;

use tokio::process::Command;

/// Output captured from a tool execution.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Process exit status.
    pub status: ExitStatus,
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
}

impl ToolOutput {
    /// Numeric exit code; `-1` when the process was terminated by a signal.
    pub fn code(&self) -> i32 {
        self.status.code().unwrap_or(-1)
    }
}

/// A builder for constructing and executing external tool invocations.
///
/// Arguments are passed to the process directly (no shell), so paths with
/// spaces or quotes need no escaping.
///
/// # Example
///
/// ```no_run
/// use rf_av::ToolCommand;
/// use std::path::PathBuf;
///
/// # async fn example() -> rf_core::Result<()> {
/// let output = ToolCommand::new(PathBuf::from("ffprobe"))
///     .arg("-v").arg("quiet")
///     .arg("-print_format").arg("json")
///     .arg("-show_format")
///     .arg("-show_streams")
///     .arg("/path/to/clip.mp4")
///     .execute()
///     .await?;
/// println!("{}", output.stdout);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<OsString>,
}

impl ToolCommand {
    /// Create a new command for the given program path.
    pub fn new(program: PathBuf) -> Self {
        Self {
            program,
            args: Vec::new(),
        }
    }

    /// Append a single argument. Paths pass through without conversion.
    pub fn arg(&mut self, s: impl AsRef<OsStr>) -> &mut Self {
        self.args.push(s.as_ref().to_os_string());
        self
    }

    /// Append multiple arguments.
    pub fn args(&mut self, iter: impl IntoIterator<Item = impl AsRef<OsStr>>) -> &mut Self {
        self.args
            .extend(iter.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// The arguments collected so far.
    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    /// Render the invocation for logging (lossy for non-UTF-8 arguments).
    pub fn display(&self) -> String {
        let mut s = self.program.display().to_string();
        for a in &self.args {
            let a = a.to_string_lossy();
            s.push(' ');
            if a.contains(' ') {
                s.push('"');
                s.push_str(&a);
                s.push('"');
            } else {
                s.push_str(&a);
            }
        }
        s
    }

    fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }

    /// Run the command to completion and capture its output, whatever the
    /// exit status.
    ///
    /// # Errors
    ///
    /// Returns [`rf_core::Error::Tool`] only if the process cannot be spawned
    /// or waited on. A non-zero exit is reported through
    /// [`ToolOutput::status`].
    pub async fn output(&self) -> rf_core::Result<ToolOutput> {
        let program_name = self.program_name();

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd.stdin(std::process::Stdio::null());
        cmd.stdout(std::process::Stdio::piped());
        cmd.stderr(std::process::Stdio::piped());

        let child = cmd.spawn().map_err(|e| rf_core::Error::Tool {
            tool: program_name.clone(),
            message: format!("failed to spawn: {e}"),
        })?;

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| rf_core::Error::Tool {
                tool: program_name,
                message: format!("I/O error waiting for process: {e}"),
            })?;

        Ok(ToolOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    /// Execute the command, capturing stdout and stderr, and require success.
    ///
    /// # Errors
    ///
    /// - Returns [`rf_core::Error::Tool`] if spawning the process fails.
    /// - Returns [`rf_core::Error::Tool`] if the process exits with a non-zero
    ///   status (message includes stderr).
    pub async fn execute(&self) -> rf_core::Result<ToolOutput> {
        let output = self.output().await?;
        if !output.status.success() {
            return Err(rf_core::Error::Tool {
                tool: self.program_name(),
                message: format!(
                    "exited with status {}: {}",
                    output.status,
                    output.stderr.trim()
                ),
            });
        }
        Ok(output)
    }
}
