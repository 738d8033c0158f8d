//! Operation engine: runs a rules document's operations in order, fail-fast.

use std::path::PathBuf;

use rf_rules::{OperationSlot, RuleDocument};

use crate::context::EngineContext;
use crate::factory::create_handler;

/// What a completed run did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Operations that ran to success.
    pub executed: usize,
    /// Entries skipped for a missing or unrecognized `type`.
    pub skipped: usize,
    /// Files written by the executed operations, in order.
    pub outputs: Vec<PathBuf>,
}

/// Dispatches each operation of a [`RuleDocument`] to its handler.
#[derive(Debug)]
pub struct OperationEngine {
    ctx: EngineContext,
}

impl OperationEngine {
    pub fn new(ctx: EngineContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &EngineContext {
        &self.ctx
    }

    /// Run every operation of `doc` in document order.
    ///
    /// Each operation is checked when the run reaches it. Unknown types are
    /// skipped with a warning. The first failing operation ends the run;
    /// outputs of earlier operations are left in place.
    ///
    /// # Errors
    ///
    /// The first parameter error, or the first handler failure. A transcoder
    /// exit status surfaces as [`rf_core::Error::Transform`] carrying it.
    pub fn run(&self, doc: &RuleDocument) -> rf_core::Result<RunSummary> {
        let ctx = self.ctx.scoped(doc);

        if !ctx.dry_run {
            std::fs::create_dir_all(&ctx.workdir)?;
        }

        tracing::info!(
            workdir = %ctx.workdir.display(),
            operations = doc.operations.len(),
            dry_run = ctx.dry_run,
            "Running rules"
        );

        let mut summary = RunSummary::default();
        for slot in &doc.operations {
            let (index, op) = match slot {
                OperationSlot::Known { index, op } => (*index, op),
                OperationSlot::Unknown { index, kind } => {
                    match kind {
                        Some(kind) => tracing::warn!(index, kind = %kind, "Unknown operation type; skipping"),
                        None => tracing::warn!(index, "Operation has no type; skipping"),
                    }
                    summary.skipped += 1;
                    continue;
                }
            };

            let outcome = create_handler(index, op).and_then(|handler| {
                tracing::info!(index, op = handler.name(), "Starting");
                let outcome = handler.execute(&ctx)?;
                tracing::info!(index, op = handler.name(), "{}", outcome.summary);
                Ok(outcome)
            });
            match outcome {
                Ok(outcome) => {
                    summary.executed += 1;
                    summary.outputs.extend(outcome.output);
                }
                Err(e) => {
                    tracing::error!(index, op = op.kind(), "Operation failed: {e}");
                    return Err(e);
                }
            }
        }

        tracing::info!(
            executed = summary.executed,
            skipped = summary.skipped,
            "Rules complete"
        );
        Ok(summary)
    }
}
