//! Interactive preview.

use std::path::PathBuf;

use rf_av::PlaybackEnd;
use rf_core::Error;

use crate::context::EngineContext;
use crate::handler::{Handler, HandlerOutcome};

#[derive(Debug)]
pub struct PreviewHandler {
    file: PathBuf,
    looping: bool,
}

impl PreviewHandler {
    pub fn new(file: PathBuf, looping: bool) -> Self {
        Self { file, looping }
    }
}

impl Handler for PreviewHandler {
    fn name(&self) -> &'static str {
        "preview"
    }

    fn execute(&self, ctx: &EngineContext) -> rf_core::Result<HandlerOutcome> {
        if ctx.dry_run {
            tracing::info!(
                file = %self.file.display(),
                looping = self.looping,
                "[DRY RUN] Would preview"
            );
            return Ok(HandlerOutcome {
                output: None,
                summary: format!("Would preview {}", self.file.display()),
            });
        }

        if !ctx.transcoder.player_available() {
            return Err(Error::PlayerUnavailable(
                "no ffplay next to ffmpeg or on PATH".into(),
            ));
        }

        let stop = ctx.stop.arm();
        let mut session = ctx.transcoder.launch_player(&self.file, self.looping)?;
        tracing::info!(
            file = %self.file.display(),
            "Preview started. Close the player to continue, or press Enter to stop early"
        );

        let ended = session.wait(&stop);
        let terminated = session.terminate();
        let summary = match ended? {
            PlaybackEnd::Exited(code) => format!("Preview exited with status {code}"),
            PlaybackEnd::Stopped => "Preview stopped early".to_string(),
        };
        terminated?;

        Ok(HandlerOutcome {
            output: None,
            summary,
        })
    }
}
