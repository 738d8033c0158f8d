//! Timed overlay.

use std::path::PathBuf;

use rf_av::{Anchor, TransformRequest};

use crate::context::EngineContext;
use crate::handler::{Handler, HandlerOutcome, OutputTarget};

#[derive(Debug)]
pub struct OverlayHandler {
    input: PathBuf,
    overlay: PathBuf,
    start: f64,
    end: f64,
    scale: f64,
    position: Anchor,
    output: OutputTarget,
}

impl OverlayHandler {
    pub fn new(
        input: PathBuf,
        overlay: PathBuf,
        start: f64,
        end: f64,
        scale: f64,
        position: Anchor,
        output: OutputTarget,
    ) -> Self {
        Self {
            input,
            overlay,
            start,
            end,
            scale,
            position,
            output,
        }
    }
}

impl Handler for OverlayHandler {
    fn name(&self) -> &'static str {
        "overlay"
    }

    fn execute(&self, ctx: &EngineContext) -> rf_core::Result<HandlerOutcome> {
        let output = self.output.resolve(ctx);
        ctx.transform(TransformRequest::OverlayCompose {
            input: ctx.input(&self.input),
            overlay: ctx.input(&self.overlay),
            start: self.start,
            end: self.end,
            scale: self.scale,
            position: self.position,
            output: output.clone(),
        })?;
        Ok(HandlerOutcome {
            summary: format!(
                "Overlaid {} at {} from {:.2}s to {:.2}s",
                self.overlay.display(),
                self.position,
                self.start,
                self.end
            ),
            output: Some(output),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testing::context;
    use assert_matches::assert_matches;
    use rf_av::fake::RecordingTranscoder;
    use std::sync::Arc;

    #[test]
    fn single_compose_request() {
        let dir = tempfile::tempdir().unwrap();
        let fake = Arc::new(RecordingTranscoder::new());
        let ctx = context(&fake, dir.path());
        let out = dir.path().join("custom.mp4");
        let handler = OverlayHandler::new(
            "base.mp4".into(),
            "logo.gif".into(),
            2.0,
            4.0,
            0.5,
            Anchor::BottomLeft,
            OutputTarget::new(Some(&out), "overlay_out.mp4"),
        );

        let outcome = handler.execute(&ctx).unwrap();
        assert_eq!(outcome.output, Some(out));
        let reqs = fake.requests();
        assert_eq!(reqs.len(), 1);
        assert_matches!(
            &reqs[0],
            TransformRequest::OverlayCompose { position: Anchor::BottomLeft, scale, .. } if *scale == 0.5
        );
    }
}
