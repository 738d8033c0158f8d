//! Interval muting.

use std::path::PathBuf;

use rf_av::{MuteExpression, TimeRange, TransformRequest};
use rf_core::Error;
use rf_rules::BleepRange;

use crate::context::EngineContext;
use crate::handler::{Handler, HandlerOutcome, OutputTarget};

#[derive(Debug)]
pub struct BleepHandler {
    input: PathBuf,
    expr: MuteExpression,
    output: OutputTarget,
}

impl BleepHandler {
    /// # Errors
    ///
    /// [`Error::EmptyBleepRanges`] when `ranges` is empty.
    pub fn new(input: PathBuf, ranges: &[BleepRange], output: OutputTarget) -> rf_core::Result<Self> {
        let expr = MuteExpression::new(
            ranges
                .iter()
                .map(|r| TimeRange::new(r.start, r.end))
                .collect(),
        )
        .ok_or(Error::EmptyBleepRanges)?;
        Ok(Self {
            input,
            expr,
            output,
        })
    }
}

impl Handler for BleepHandler {
    fn name(&self) -> &'static str {
        "bleep"
    }

    fn execute(&self, ctx: &EngineContext) -> rf_core::Result<HandlerOutcome> {
        let output = self.output.resolve(ctx);
        ctx.transform(TransformRequest::MuteByExpression {
            input: ctx.input(&self.input),
            expr: self.expr.clone(),
            output: output.clone(),
        })?;
        Ok(HandlerOutcome {
            summary: format!("Muted {} ranges", self.expr.ranges().len()),
            output: Some(output),
        })
    }
}
