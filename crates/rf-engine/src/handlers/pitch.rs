//! Duration-preserving pitch shift.

use std::path::PathBuf;

use rf_av::TransformRequest;

use crate::context::EngineContext;
use crate::handler::{Handler, HandlerOutcome, OutputTarget};

#[derive(Debug)]
pub struct PitchHandler {
    input: PathBuf,
    semitones: f64,
    output: OutputTarget,
}

impl PitchHandler {
    pub fn new(input: PathBuf, semitones: f64, output: OutputTarget) -> Self {
        Self {
            input,
            semitones,
            output,
        }
    }
}

impl Handler for PitchHandler {
    fn name(&self) -> &'static str {
        "pitch"
    }

    fn execute(&self, ctx: &EngineContext) -> rf_core::Result<HandlerOutcome> {
        let output = self.output.resolve(ctx);
        ctx.transform(TransformRequest::PitchShift {
            input: ctx.input(&self.input),
            semitones: self.semitones,
            output: output.clone(),
        })?;
        Ok(HandlerOutcome {
            summary: format!("Shifted pitch by {:+.2} semitones", self.semitones),
            output: Some(output),
        })
    }
}
