//! Stream-copy concatenation.

use std::path::PathBuf;

use rf_av::TransformRequest;

use crate::context::EngineContext;
use crate::handler::{Handler, HandlerOutcome, OutputTarget};

const LIST: &str = "concat_list.txt";

#[derive(Debug)]
pub struct ConcatHandler {
    inputs: Vec<PathBuf>,
    output: OutputTarget,
}

impl ConcatHandler {
    pub fn new(inputs: Vec<PathBuf>, output: OutputTarget) -> Self {
        Self { inputs, output }
    }
}

impl Handler for ConcatHandler {
    fn name(&self) -> &'static str {
        "concat"
    }

    fn execute(&self, ctx: &EngineContext) -> rf_core::Result<HandlerOutcome> {
        let output = self.output.resolve(ctx);
        let inputs: Vec<PathBuf> = self.inputs.iter().map(|p| ctx.input(p)).collect();
        let list = ctx.write_list(LIST, &inputs)?;
        ctx.transform(TransformRequest::ConcatFromList {
            list,
            output: output.clone(),
        })?;
        Ok(HandlerOutcome {
            summary: format!("Concatenated {} inputs", inputs.len()),
            output: Some(output),
        })
    }
}
