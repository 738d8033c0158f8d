//! Repeat-stutter: one short fragment played back to back.

use std::path::PathBuf;

use rf_av::TransformRequest;

use crate::context::EngineContext;
use crate::handler::{Handler, HandlerOutcome, OutputTarget};

const FRAGMENT: &str = "stutter_fragment.mp4";
const LIST: &str = "stutter_list.txt";

#[derive(Debug)]
pub struct StutterHandler {
    input: PathBuf,
    start: f64,
    duration: f64,
    repeats: u32,
    output: OutputTarget,
}

impl StutterHandler {
    pub fn new(input: PathBuf, start: f64, duration: f64, repeats: u32, output: OutputTarget) -> Self {
        Self {
            input,
            start,
            duration,
            repeats,
            output,
        }
    }
}

impl Handler for StutterHandler {
    fn name(&self) -> &'static str {
        "stutter"
    }

    fn execute(&self, ctx: &EngineContext) -> rf_core::Result<HandlerOutcome> {
        let fragment = ctx.work_file(FRAGMENT);
        let output = self.output.resolve(ctx);

        ctx.transform(TransformRequest::ExtractFragment {
            input: ctx.input(&self.input),
            start: self.start,
            duration: self.duration,
            output: fragment.clone(),
        })?;

        let list = ctx.write_list(LIST, &vec![fragment; self.repeats as usize])?;
        ctx.transform(TransformRequest::ConcatFromList {
            list,
            output: output.clone(),
        })?;

        Ok(HandlerOutcome {
            summary: format!(
                "Repeated {:.3}s at {:.3}s {} times",
                self.duration, self.start, self.repeats
            ),
            output: Some(output),
        })
    }
}
