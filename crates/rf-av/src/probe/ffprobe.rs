//! ffprobe-backed metadata extraction.
//!
//! Shells out to `ffprobe -v quiet -print_format json -show_format -show_streams`
//! and maps the JSON output into [`MediaMetadata`], keeping the full document.

use std::path::{Path, PathBuf};

use rf_core::StreamKind;
use serde::Deserialize;

use super::metadata::{MediaMetadata, StreamInfo};
use crate::command::ToolCommand;

/// A prober backed by the `ffprobe` CLI.
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    ffprobe_path: PathBuf,
}

impl FfprobeProber {
    pub fn new(ffprobe_path: PathBuf) -> Self {
        Self { ffprobe_path }
    }

    /// Probe a file.
    ///
    /// # Errors
    ///
    /// [`rf_core::Error::Tool`] if ffprobe cannot run or exits non-zero,
    /// [`rf_core::Error::Probe`] if it prints nothing or invalid JSON.
    pub async fn probe(&self, path: &Path) -> rf_core::Result<MediaMetadata> {
        let mut cmd = ToolCommand::new(self.ffprobe_path.clone());
        cmd.args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ]);
        cmd.arg(path);

        let output = cmd.execute().await?;
        parse_probe_json(&output.stdout)
    }
}

// ---------------------------------------------------------------------------
// JSON structures
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    format: FfprobeFormat,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    duration: Option<String>,
}

// ---------------------------------------------------------------------------
// Parsing helpers
// ---------------------------------------------------------------------------

/// Parse ffprobe's JSON output into [`MediaMetadata`].
pub fn parse_probe_json(stdout: &str) -> rf_core::Result<MediaMetadata> {
    if stdout.trim().is_empty() {
        return Err(rf_core::Error::Probe("ffprobe produced no output".into()));
    }

    let raw: serde_json::Value = serde_json::from_str(stdout)
        .map_err(|e| rf_core::Error::Probe(format!("ffprobe JSON parse error: {e}")))?;
    let ff: FfprobeOutput = serde_json::from_value(raw.clone())
        .map_err(|e| rf_core::Error::Probe(format!("unexpected ffprobe document: {e}")))?;

    // Some containers (raw streams, GIFs) only report duration per stream.
    let duration = ff
        .format
        .duration
        .as_deref()
        .and_then(|s| s.parse::<f64>().ok())
        .or_else(|| {
            ff.streams
                .iter()
                .filter_map(|s| s.duration.as_deref()?.parse::<f64>().ok())
                .reduce(f64::max)
        });

    let streams = ff
        .streams
        .into_iter()
        .map(|s| {
            let kind = StreamKind::from_codec_type(s.codec_type.as_deref().unwrap_or(""));
            let fps = if kind == StreamKind::Video {
                s.avg_frame_rate
                    .as_deref()
                    .and_then(parse_frame_rate)
                    .filter(|f| *f > 0.0)
                    .or_else(|| s.r_frame_rate.as_deref().and_then(parse_frame_rate))
                    .unwrap_or(0.0)
            } else {
                0.0
            };
            StreamInfo {
                kind,
                codec: s.codec_name,
                width: s.width.unwrap_or(0),
                height: s.height.unwrap_or(0),
                fps,
            }
        })
        .collect();

    Ok(MediaMetadata {
        duration,
        streams,
        raw,
    })
}

/// Parse a rate like `"30000/1001"` or `"25"`.
fn parse_frame_rate(rate_str: &str) -> Option<f64> {
    match rate_str.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.parse().ok()?;
            let den: f64 = den.parse().ok()?;
            (den != 0.0).then(|| num / den)
        }
        None => rate_str.parse().ok(),
    }
}
