//! # rf-av
//!
//! Media toolchain access for remixforge.
//!
//! This crate provides:
//!
//! - **Tool discovery** ([`ToolRegistry`]) -- locate ffmpeg, ffprobe and
//!   ffplay from config, next to ffmpeg, or on `PATH`.
//! - **Command execution** ([`ToolCommand`]) -- async builder for running
//!   external processes and capturing their output.
//! - **Probing** ([`probe::FfprobeProber`]) -- ffprobe JSON to
//!   [`MediaMetadata`], raw document preserved.
//! - **Transforms** ([`TransformRequest`], [`Transcoder`],
//!   [`FfmpegTranscoder`]) -- the blocking seam used by the catalog and
//!   engine, and its ffmpeg implementation.
//! - **Preview** ([`PlayerSession`]) -- ffplay sessions that can be stopped
//!   early.
//!
//! With the `test-util` feature, [`fake::RecordingTranscoder`] stands in for
//! the real tools.

pub mod command;
pub mod filters;
pub mod player;
pub mod probe;
pub mod request;
pub mod tools;
pub mod transcoder;

#[cfg(any(test, feature = "test-util"))]
pub mod fake;

// ---- Re-exports for convenience ----

pub use command::{ToolCommand, ToolOutput};
pub use filters::{Anchor, MuteExpression, TimeRange};
pub use player::{FfplaySession, PlaybackEnd, PlayerSession};
pub use probe::{FfprobeProber, MediaMetadata, StreamInfo};
pub use request::{ProcessResult, TransformRequest};
pub use tools::{ToolConfig, ToolInfo, ToolRegistry, ToolSource};
pub use transcoder::{FfmpegTranscoder, Transcoder};
