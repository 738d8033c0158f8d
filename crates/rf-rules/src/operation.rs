//! Operations a rules document can request.

use std::path::{Path, PathBuf};

use rf_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Every operation `type` the engine understands.
pub const KNOWN_KINDS: &[&str] = &[
    "stutter",
    "overlay",
    "pitch",
    "random_chop",
    "concat",
    "bleep",
    "preview",
];

/// One step of a rules document.
///
/// Optional fields fall back to the defaults below when omitted. An omitted
/// `output` resolves to a fixed file name inside the work directory (see
/// [`Operation::resolved_output`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
    /// Repeat one short fragment back to back.
    Stutter {
        input: PathBuf,
        #[serde(default)]
        start: f64,
        #[serde(default = "default_stutter_duration")]
        duration: f64,
        #[serde(default = "default_repeats")]
        repeats: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        output: Option<PathBuf>,
    },
    /// Draw a scaled image, GIF or video on top of the input for a time window.
    Overlay {
        input: PathBuf,
        overlay: PathBuf,
        #[serde(default)]
        start: f64,
        #[serde(default = "default_overlay_end")]
        end: f64,
        /// Overlay width as a fraction of its own width.
        #[serde(rename = "overlay_scale", alias = "scale", default = "default_overlay_scale")]
        scale: f64,
        /// `topright`, `topleft`, `bottomright`, `bottomleft`; anything else
        /// centres the overlay.
        #[serde(default = "default_position")]
        position: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        output: Option<PathBuf>,
    },
    /// Shift audio pitch, keeping duration.
    Pitch {
        input: PathBuf,
        #[serde(default)]
        semitones: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        output: Option<PathBuf>,
    },
    /// Cut random segments and splice them back together.
    RandomChop {
        input: PathBuf,
        #[serde(default = "default_chop_count")]
        count: u32,
        #[serde(default = "default_min_len")]
        min_len: f64,
        #[serde(default = "default_max_len")]
        max_len: f64,
        #[serde(default = "default_true")]
        shuffle: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        output: Option<PathBuf>,
    },
    /// Join files end to end without re-encoding.
    Concat {
        inputs: Vec<PathBuf>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        output: Option<PathBuf>,
    },
    /// Silence audio inside the given ranges.
    Bleep {
        input: PathBuf,
        #[serde(default)]
        ranges: Vec<BleepRange>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        output: Option<PathBuf>,
    },
    /// Play a file and wait for it to finish or be stopped.
    Preview {
        file: PathBuf,
        #[serde(rename = "loop", default)]
        looping: bool,
    },
}

fn default_stutter_duration() -> f64 {
    0.25
}
fn default_repeats() -> u32 {
    8
}
fn default_overlay_end() -> f64 {
    9999.0
}
fn default_overlay_scale() -> f64 {
    0.2
}
fn default_position() -> String {
    "topright".into()
}
fn default_chop_count() -> u32 {
    8
}
fn default_min_len() -> f64 {
    0.05
}
fn default_max_len() -> f64 {
    0.5
}
fn default_true() -> bool {
    true
}

/// A mute range. `end` defaults to half a second after `start`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawRange")]
pub struct BleepRange {
    pub start: f64,
    pub end: f64,
}

#[derive(Deserialize)]
struct RawRange {
    #[serde(default)]
    start: f64,
    end: Option<f64>,
}

impl From<RawRange> for BleepRange {
    fn from(raw: RawRange) -> Self {
        Self {
            start: raw.start,
            end: raw.end.unwrap_or(raw.start + 0.5),
        }
    }
}

impl Operation {
    /// The `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Stutter { .. } => "stutter",
            Self::Overlay { .. } => "overlay",
            Self::Pitch { .. } => "pitch",
            Self::RandomChop { .. } => "random_chop",
            Self::Concat { .. } => "concat",
            Self::Bleep { .. } => "bleep",
            Self::Preview { .. } => "preview",
        }
    }

    /// The explicit `output` field, if any.
    pub fn output(&self) -> Option<&Path> {
        match self {
            Self::Stutter { output, .. }
            | Self::Overlay { output, .. }
            | Self::Pitch { output, .. }
            | Self::RandomChop { output, .. }
            | Self::Concat { output, .. }
            | Self::Bleep { output, .. } => output.as_deref(),
            Self::Preview { .. } => None,
        }
    }

    /// File name used when `output` is omitted.
    pub fn default_output_name(&self) -> Option<&'static str> {
        match self {
            Self::Stutter { .. } => Some("stutter_out.mp4"),
            Self::Overlay { .. } => Some("overlay_out.mp4"),
            Self::Pitch { .. } => Some("pitch_out.mp4"),
            Self::RandomChop { .. } => Some("rand_out.mp4"),
            Self::Concat { .. } => Some("concat_out.mp4"),
            Self::Bleep { .. } => Some("bleep_out.mp4"),
            Self::Preview { .. } => None,
        }
    }

    /// Where this operation writes, given the effective work directory.
    /// `None` for operations that produce no file.
    pub fn resolved_output(&self, workdir: &Path) -> Option<PathBuf> {
        self.output()
            .map(Path::to_path_buf)
            .or_else(|| self.default_output_name().map(|n| workdir.join(n)))
    }

    /// Reject parameter values no handler can act on.
    ///
    /// `index` is the operation's position in the document, for error
    /// reporting.
    pub fn check(&self, index: usize) -> Result<()> {
        let invalid =
            |reason: &str| -> Result<()> { Err(Error::invalid_operation(index, self.kind(), reason)) };
        match self {
            Self::Stutter {
                duration, repeats, ..
            } => {
                if !positive(*duration) {
                    return invalid("duration must be positive");
                }
                if *repeats == 0 {
                    return invalid("repeats must be at least 1");
                }
            }
            Self::Overlay { scale, .. } => {
                if !positive(*scale) {
                    return invalid("overlay_scale must be positive");
                }
            }
            Self::Pitch { semitones, .. } => {
                if !semitones.is_finite() {
                    return invalid("semitones must be a finite number");
                }
            }
            Self::RandomChop {
                count,
                min_len,
                max_len,
                ..
            } => {
                if *count == 0 {
                    return invalid("count must be at least 1");
                }
                if !positive(*min_len) {
                    return invalid("min_len must be positive");
                }
                if min_len > max_len {
                    return invalid("min_len must not exceed max_len");
                }
            }
            Self::Concat { inputs, .. } => {
                if inputs.is_empty() {
                    return invalid("inputs must not be empty");
                }
            }
            Self::Bleep { ranges, .. } => {
                if ranges.is_empty() {
                    return Err(Error::EmptyBleepRanges);
                }
                if let Some(r) = ranges.iter().find(|r| r.end < r.start) {
                    return Err(Error::invalid_operation(
                        index,
                        self.kind(),
                        format!("range end {} is before start {}", r.end, r.start),
                    ));
                }
            }
            Self::Preview { .. } => {}
        }
        Ok(())
    }
}

fn positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

/// A position in the operations array.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationSlot {
    /// A recognized, well-formed operation.
    Known { index: usize, op: Operation },
    /// An entry whose `type` is missing or not recognized. Skipped at run time.
    Unknown { index: usize, kind: Option<String> },
}

impl OperationSlot {
    pub fn index(&self) -> usize {
        match self {
            Self::Known { index, .. } | Self::Unknown { index, .. } => *index,
        }
    }

    /// Decode one element of the operations array.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidOperation`] when the `type` is known but a required
    /// field is missing or a field has the wrong shape.
    pub fn parse(index: usize, value: &serde_json::Value) -> Result<Self> {
        let kind = value.get("type").and_then(|t| t.as_str());
        match kind {
            Some(k) if KNOWN_KINDS.contains(&k) => {
                let op = serde_json::from_value::<Operation>(value.clone())
                    .map_err(|e| Error::invalid_operation(index, k, e.to_string()))?;
                Ok(Self::Known { index, op })
            }
            other => Ok(Self::Unknown {
                index,
                kind: other.map(str::to_string),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn parse(v: serde_json::Value) -> Result<OperationSlot> {
        OperationSlot::parse(0, &v)
    }

    fn op(v: serde_json::Value) -> Operation {
        match parse(v).unwrap() {
            OperationSlot::Known { op, .. } => op,
            other => panic!("expected known operation, got {other:?}"),
        }
    }

    #[test]
    fn stutter_defaults() {
        let o = op(json!({"type": "stutter", "input": "a.mp4"}));
        assert_eq!(
            o,
            Operation::Stutter {
                input: PathBuf::from("a.mp4"),
                start: 0.0,
                duration: 0.25,
                repeats: 8,
                output: None,
            }
        );
        assert_eq!(
            o.resolved_output(Path::new("/w")),
            Some(PathBuf::from("/w/stutter_out.mp4"))
        );
    }

    #[test]
    fn overlay_defaults_and_scale_key() {
        let o = op(json!({"type": "overlay", "input": "a.mp4", "overlay": "logo.png", "overlay_scale": 0.5}));
        assert_matches!(
            o,
            Operation::Overlay { start, end, scale, ref position, .. }
                if start == 0.0 && end == 9999.0 && scale == 0.5 && position == "topright"
        );
    }

    #[test]
    fn random_chop_defaults_and_output_name() {
        let o = op(json!({"type": "random_chop", "input": "a.mp4"}));
        assert_matches!(
            o,
            Operation::RandomChop { count: 8, shuffle: true, min_len, max_len, .. }
                if min_len == 0.05 && max_len == 0.5
        );
        assert_eq!(
            o.resolved_output(Path::new("w")),
            Some(PathBuf::from("w/rand_out.mp4"))
        );
    }

    #[test]
    fn explicit_output_wins() {
        let o = op(json!({"type": "pitch", "input": "a.mp4", "semitones": 3, "output": "/x/up.mp4"}));
        assert_eq!(o.resolved_output(Path::new("/w")), Some(PathBuf::from("/x/up.mp4")));
    }

    #[test]
    fn preview_loop_key() {
        let o = op(json!({"type": "preview", "file": "out.mp4", "loop": true}));
        assert_eq!(
            o,
            Operation::Preview {
                file: PathBuf::from("out.mp4"),
                looping: true
            }
        );
        assert_eq!(o.resolved_output(Path::new("/w")), None);
    }

    #[test]
    fn bleep_range_end_defaults() {
        let o = op(json!({"type": "bleep", "input": "a.mp4", "ranges": [{"start": 2.0}, {"start": 5, "end": 6}]}));
        assert_matches!(o, Operation::Bleep { ref ranges, .. } if ranges == &vec![
            BleepRange { start: 2.0, end: 2.5 },
            BleepRange { start: 5.0, end: 6.0 },
        ]);
    }

    #[test]
    fn missing_required_field_is_invalid() {
        let err = parse(json!({"type": "overlay", "input": "a.mp4"})).unwrap_err();
        assert_matches!(err, Error::InvalidOperation { ref kind, ref reason, .. }
            if kind == "overlay" && reason.contains("overlay"));
        assert_eq!(err.exit_code(), 5);

        assert_matches!(
            parse(json!({"type": "concat"})),
            Err(Error::InvalidOperation { .. })
        );
        assert_matches!(
            parse(json!({"type": "preview"})),
            Err(Error::InvalidOperation { .. })
        );
    }

    #[test]
    fn wrong_shape_is_invalid() {
        assert_matches!(
            parse(json!({"type": "random_chop", "input": "a.mp4", "count": -2})),
            Err(Error::InvalidOperation { .. })
        );
        assert_matches!(
            parse(json!({"type": "concat", "inputs": "a.mp4"})),
            Err(Error::InvalidOperation { .. })
        );
    }

    #[test]
    fn unknown_and_missing_types_are_slots() {
        assert_matches!(
            parse(json!({"type": "nonexistent_type"})),
            Ok(OperationSlot::Unknown { kind: Some(ref k), .. }) if k == "nonexistent_type"
        );
        assert_matches!(
            parse(json!({"input": "a.mp4"})),
            Ok(OperationSlot::Unknown { kind: None, .. })
        );
        assert_matches!(parse(json!(42)), Ok(OperationSlot::Unknown { kind: None, .. }));
    }

    #[test]
    fn check_rejects_empty_bleep_ranges() {
        let o = op(json!({"type": "bleep", "input": "a.mp4", "ranges": []}));
        assert_matches!(o.check(3), Err(Error::EmptyBleepRanges));
        let o = op(json!({"type": "bleep", "input": "a.mp4"}));
        assert_matches!(o.check(3), Err(Error::EmptyBleepRanges));
    }

    #[test]
    fn check_rejects_bad_chop_params() {
        let o = op(json!({"type": "random_chop", "input": "a.mp4", "min_len": 1.0, "max_len": 0.5}));
        assert_matches!(o.check(1), Err(Error::InvalidOperation { index: 1, .. }));
        let o = op(json!({"type": "random_chop", "input": "a.mp4", "count": 0}));
        assert!(o.check(1).is_err());
        let o = op(json!({"type": "random_chop", "input": "a.mp4", "min_len": 0.5, "max_len": 0.5}));
        assert!(o.check(1).is_ok());
    }

    #[test]
    fn check_rejects_reversed_bleep_range() {
        let o = op(json!({"type": "bleep", "input": "a.mp4", "ranges": [{"start": 4, "end": 3}]}));
        assert_matches!(o.check(0), Err(Error::InvalidOperation { .. }));
    }

    #[test]
    fn check_accepts_defaults() {
        for v in [
            json!({"type": "stutter", "input": "a.mp4"}),
            json!({"type": "overlay", "input": "a.mp4", "overlay": "b.gif"}),
            json!({"type": "pitch", "input": "a.mp4"}),
            json!({"type": "random_chop", "input": "a.mp4"}),
            json!({"type": "concat", "inputs": ["a.mp4", "b.mp4"]}),
            json!({"type": "bleep", "input": "a.mp4", "ranges": [{"start": 1}]}),
            json!({"type": "preview", "file": "a.mp4"}),
        ] {
            let o = op(v);
            assert!(o.check(0).is_ok(), "{}", o.kind());
        }
    }
}
