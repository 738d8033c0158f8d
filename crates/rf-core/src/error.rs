//! Unified error type for the remixforge application.
//!
//! All crates funnel their failures into [`Error`], which carries enough context
//! for the binary to derive a process exit code via [`Error::exit_code`].

use std::path::PathBuf;

/// Unified error type covering all failure modes in remixforge.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required startup input (tool binary, rules path) is missing.
    #[error("Missing input: {0}")]
    MissingInput(String),

    /// The rules document could not be read from disk.
    #[error("Unable to read rules document {}: {source}", path.display())]
    RulesUnreadable {
        /// Path that was being read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The rules document is not valid JSON.
    #[error("Rules parse error: {0}")]
    RulesParse(String),

    /// The rules document has no `operations` array.
    #[error("Rules document has no operations array")]
    MissingOperations,

    /// An operation of a recognized type is missing a required field or
    /// carries a field of the wrong shape.
    #[error("Invalid operation #{index} ({kind}): {reason}")]
    InvalidOperation {
        /// Zero-based position in the operations array.
        index: usize,
        /// The operation's `type` tag.
        kind: String,
        /// Human-readable description.
        reason: String,
    },

    /// A bleep operation was given an empty list of ranges.
    #[error("bleep: no timestamp ranges provided")]
    EmptyBleepRanges,

    /// The preview player binary could not be located.
    #[error("Preview player unavailable: {0}")]
    PlayerUnavailable(String),

    /// The preview player was found but could not be started.
    #[error("Preview launch failed: {0}")]
    PlayerLaunch(String),

    /// A transform ran to completion but exited with a non-zero status.
    #[error("Transform [{step}] exited with status {status}")]
    Transform {
        /// The request kind that failed (e.g. "concat-from-list").
        step: String,
        /// Exit status reported by the transcoder.
        status: i32,
    },

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// An external tool (ffmpeg, ffprobe, ffplay) could not be run.
    #[error("Tool error [{tool}]: {message}")]
    Tool {
        /// Name of the tool that failed.
        tool: String,
        /// Human-readable error description.
        message: String,
    },

    /// Media probing failed.
    #[error("Probe error: {0}")]
    Probe(String),

    /// Input data failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to the process exit code reported by the CLI.
    ///
    /// Transform failures propagate the transcoder's status verbatim; every
    /// other category has its own fixed code.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::MissingInput(_) => 1,
            Error::RulesUnreadable { .. } => 2,
            Error::RulesParse(_) => 3,
            Error::MissingOperations => 4,
            Error::InvalidOperation { .. } => 5,
            Error::EmptyBleepRanges => 6,
            Error::PlayerUnavailable(_) => 7,
            Error::PlayerLaunch(_) => 8,
            Error::Transform { status, .. } => *status,
            Error::Io { .. } => 1,
            Error::Tool { .. } => 1,
            Error::Probe(_) => 1,
            Error::Validation(_) => 1,
            Error::Internal(_) => 1,
        }
    }

    /// Convenience constructor for [`Error::Tool`].
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::InvalidOperation`].
    pub fn invalid_operation(
        index: usize,
        kind: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Error::InvalidOperation {
            index,
            kind: kind.into(),
            reason: reason.into(),
        }
    }

    /// Convenience constructor for [`Error::Transform`].
    pub fn transform(step: impl Into<String>, status: i32) -> Self {
        Error::Transform {
            step: step.into(),
            status,
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
