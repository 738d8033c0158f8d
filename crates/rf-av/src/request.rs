//! Transform requests and their results.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::filters::{Anchor, MuteExpression};

/// One media transform handed to a [`Transcoder`](crate::Transcoder).
///
/// Each variant is a complete, self-describing job: the transcoder decides how
/// to encode it, callers only say what they want.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TransformRequest {
    /// Cut `[start, start+duration)` out of `input`, re-encoding video.
    ExtractFragment {
        input: PathBuf,
        start: f64,
        duration: f64,
        output: PathBuf,
    },
    /// Join the files named in a concat list by stream copy.
    ConcatFromList { list: PathBuf, output: PathBuf },
    /// Fit into a fixed box, pad, resample fps.
    Normalize {
        input: PathBuf,
        width: u32,
        height: u32,
        fps: f64,
        output: PathBuf,
    },
    /// Draw `overlay` on top of `input` during `[start, end)`.
    OverlayCompose {
        input: PathBuf,
        overlay: PathBuf,
        start: f64,
        end: f64,
        scale: f64,
        position: Anchor,
        output: PathBuf,
    },
    /// Shift audio pitch without changing duration.
    PitchShift {
        input: PathBuf,
        semitones: f64,
        output: PathBuf,
    },
    /// Cut a randomly placed segment, re-encoding both audio and video.
    RandomFragment {
        input: PathBuf,
        start: f64,
        duration: f64,
        output: PathBuf,
    },
    /// Silence audio wherever the expression says so.
    MuteByExpression {
        input: PathBuf,
        expr: MuteExpression,
        output: PathBuf,
    },
}

impl TransformRequest {
    /// Short stable name used in logs and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ExtractFragment { .. } => "extract-fragment",
            Self::ConcatFromList { .. } => "concat-from-list",
            Self::Normalize { .. } => "normalize",
            Self::OverlayCompose { .. } => "overlay-compose",
            Self::PitchShift { .. } => "pitch-shift",
            Self::RandomFragment { .. } => "random-fragment",
            Self::MuteByExpression { .. } => "mute-by-expression",
        }
    }

    /// The file this request writes.
    pub fn output(&self) -> &Path {
        match self {
            Self::ExtractFragment { output, .. }
            | Self::ConcatFromList { output, .. }
            | Self::Normalize { output, .. }
            | Self::OverlayCompose { output, .. }
            | Self::PitchShift { output, .. }
            | Self::RandomFragment { output, .. }
            | Self::MuteByExpression { output, .. } => output,
        }
    }
}

/// Completion status and captured output of a transform.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessResult {
    /// Process exit status; `-1` when killed by a signal.
    pub exit_status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessResult {
    pub fn success() -> Self {
        Self::default()
    }

    pub fn failed(exit_status: i32) -> Self {
        Self {
            exit_status,
            ..Self::default()
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_status == 0
    }

    /// Turn a non-zero status into [`rf_core::Error::Transform`] tagged with
    /// `step`.
    pub fn check(self, step: &str) -> rf_core::Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(rf_core::Error::transform(step, self.exit_status))
        }
    }
}

impl From<crate::command::ToolOutput> for ProcessResult {
    fn from(out: crate::command::ToolOutput) -> Self {
        Self {
            exit_status: out.code(),
            stdout: out.stdout,
            stderr: out.stderr,
        }
    }
}
