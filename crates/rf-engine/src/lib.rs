//! # rf-engine
//!
//! Executes the operations of a rules document.
//!
//! - [`Handler`] -- one operation, built by [`create_handler`] after its
//!   parameters are checked.
//! - [`EngineContext`] -- transcoder, work directory, dry-run flag, random
//!   source and catalog shared by all handlers.
//! - [`OperationEngine`] -- checks every operation, then runs them in
//!   document order and stops at the first failure.
//! - [`StopSignal`] -- operator-driven early stop for previews.

pub mod chop;
pub mod concat_list;
pub mod context;
pub mod engine;
pub mod factory;
pub mod handler;
pub mod handlers;
pub mod stop;

pub use chop::{ChopPlan, Segment};
pub use context::EngineContext;
pub use engine::{OperationEngine, RunSummary};
pub use factory::create_handler;
pub use handler::{Handler, HandlerOutcome, OutputTarget};
pub use stop::{NeverStop, StdinStop, StopSignal};
