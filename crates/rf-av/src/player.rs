//! Interactive preview sessions backed by ffplay.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tokio::process::{Child, Command};
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

/// How a preview session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEnd {
    /// The player exited on its own with this status (`-1` for a signal).
    Exited(i32),
    /// The stop token fired before the player finished.
    Stopped,
}

/// A running preview.
pub trait PlayerSession: Send {
    /// Block until the player exits or `stop` is cancelled.
    fn wait(&mut self, stop: &CancellationToken) -> rf_core::Result<PlaybackEnd>;

    /// Make sure the player is no longer running. Idempotent.
    fn terminate(&mut self) -> rf_core::Result<()>;
}

/// Build the ffplay argument list. The window stays visible; the player
/// quits when playback finishes unless looping.
pub fn ffplay_args(file: &Path, looping: bool) -> Vec<OsString> {
    let mut args = vec![OsString::from("-autoexit")];
    if looping {
        args.push("-loop".into());
        args.push("0".into());
    }
    args.push(file.as_os_str().to_os_string());
    args
}

/// An ffplay child process. Killed on drop if still running.
#[derive(Debug)]
pub struct FfplaySession {
    child: Child,
    runtime: Handle,
    file: PathBuf,
}

impl FfplaySession {
    /// Spawn ffplay for `file`.
    ///
    /// # Errors
    ///
    /// [`rf_core::Error::PlayerLaunch`] if the process cannot be started.
    pub fn spawn(
        ffplay: &Path,
        file: &Path,
        looping: bool,
        runtime: Handle,
    ) -> rf_core::Result<Self> {
        let args = ffplay_args(file, looping);
        tracing::info!(player = %ffplay.display(), file = %file.display(), looping, "Launching preview");

        // Child processes register with the reactor of the current runtime.
        let _guard = runtime.enter();
        let child = Command::new(ffplay)
            .args(&args)
            .stdin(std::process::Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                rf_core::Error::PlayerLaunch(format!("{}: {e}", ffplay.display()))
            })?;

        Ok(Self {
            child,
            runtime: runtime.clone(),
            file: file.to_path_buf(),
        })
    }
}

impl PlayerSession for FfplaySession {
    fn wait(&mut self, stop: &CancellationToken) -> rf_core::Result<PlaybackEnd> {
        let child = &mut self.child;
        let end = self.runtime.block_on(async {
            tokio::select! {
                status = child.wait() => status.map(|s| PlaybackEnd::Exited(s.code().unwrap_or(-1))),
                _ = stop.cancelled() => Ok(PlaybackEnd::Stopped),
            }
        })?;
        tracing::debug!(file = %self.file.display(), ?end, "Preview finished");
        Ok(end)
    }

    fn terminate(&mut self) -> rf_core::Result<()> {
        if self.child.try_wait()?.is_some() {
            return Ok(());
        }
        tracing::debug!(file = %self.file.display(), "Stopping preview player");
        self.child.start_kill()?;
        let child = &mut self.child;
        self.runtime.block_on(child.wait())?;
        Ok(())
    }
}
