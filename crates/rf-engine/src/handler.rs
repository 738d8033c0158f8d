//! The [`Handler`] trait: one operation of a rules document, ready to run.

use std::path::{Path, PathBuf};

use crate::context::EngineContext;

/// Result of a successfully executed handler.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerOutcome {
    /// File produced by this handler, if any.
    pub output: Option<PathBuf>,
    /// Human-readable summary of what the handler did.
    pub summary: String,
}

/// A single operation of a run.
///
/// Handlers are built by [`crate::create_handler`] after their parameters
/// have been checked, so `execute` only deals with run-time failures.
pub trait Handler: Send + Sync {
    /// The operation `type` this handler implements (e.g. "stutter").
    fn name(&self) -> &'static str;

    /// Perform the operation.
    ///
    /// Every transcoder call goes through [`EngineContext::transform`], so in
    /// dry-run mode a handler issues no calls and writes nothing.
    fn execute(&self, ctx: &EngineContext) -> rf_core::Result<HandlerOutcome>;
}

/// Where a handler writes: the operation's explicit `output`, or a fixed name
/// inside the run's work directory.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputTarget {
    explicit: Option<PathBuf>,
    default_name: &'static str,
}

impl OutputTarget {
    pub fn new(explicit: Option<&Path>, default_name: &'static str) -> Self {
        Self {
            explicit: explicit.map(Path::to_path_buf),
            default_name,
        }
    }

    pub fn resolve(&self, ctx: &EngineContext) -> PathBuf {
        self.explicit
            .clone()
            .unwrap_or_else(|| ctx.work_file(self.default_name))
    }
}
