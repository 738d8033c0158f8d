//! The synchronous transcoder seam and its ffmpeg-backed implementation.

use std::ffi::OsString;
use std::path::Path;

use rf_core::config::EncodingConfig;
use tokio::runtime::Handle;

use crate::command::ToolCommand;
use crate::filters::{fmt_secs, normalize_filter, overlay_graph, pitch_filter};
use crate::player::{FfplaySession, PlayerSession};
use crate::probe::{FfprobeProber, MediaMetadata};
use crate::request::{ProcessResult, TransformRequest};
use crate::tools::{ToolRegistry, FFMPEG, FFPLAY, FFPROBE};

/// Everything the catalog and engine need from the media toolchain.
///
/// Calls block the current thread. Implementations must be shareable across
/// the normalization workers.
pub trait Transcoder: Send + Sync {
    /// Probe a file's container and streams.
    fn probe(&self, path: &Path) -> rf_core::Result<MediaMetadata>;

    /// Run one transform to completion.
    ///
    /// A transform that runs but fails is reported through
    /// [`ProcessResult::exit_status`]; `Err` means it could not be run at all.
    fn transform(&self, request: &TransformRequest) -> rf_core::Result<ProcessResult>;

    /// Whether an interactive player is installed.
    fn player_available(&self) -> bool;

    /// Start previewing `path`, optionally looping forever.
    fn launch_player(&self, path: &Path, looping: bool) -> rf_core::Result<Box<dyn PlayerSession>>;
}

/// [`Transcoder`] that drives the ffmpeg command-line tools.
///
/// Processes are spawned on the given tokio runtime; the blocking calls must
/// not be made from inside one of that runtime's async tasks.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    tools: ToolRegistry,
    encoding: EncodingConfig,
    runtime: Handle,
}

impl FfmpegTranscoder {
    pub fn new(tools: ToolRegistry, encoding: EncodingConfig, runtime: Handle) -> Self {
        Self {
            tools,
            encoding,
            runtime,
        }
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// ffmpeg arguments for `request`, excluding the program itself.
    ///
    /// Paths are passed through as `OsString`s, never re-encoded.
    pub fn build_args(&self, request: &TransformRequest) -> Vec<OsString> {
        let enc = &self.encoding;
        let mut a = Args(vec!["-y".into()]);

        match request {
            TransformRequest::ExtractFragment {
                input,
                start,
                duration,
                output,
            } => {
                a.push(&["-ss", &fmt_secs(*start), "-i"]).path(input);
                a.push(&["-t", &fmt_secs(*duration)]);
                a.push(&["-c:v", &enc.video_codec, "-crf", &enc.fragment_crf.to_string()]);
                a.push(&["-preset", &enc.preset]).path(output);
            }
            TransformRequest::ConcatFromList { list, output } => {
                a.push(&["-f", "concat", "-safe", "0", "-i"]).path(list);
                a.push(&["-c", "copy"]).path(output);
            }
            TransformRequest::Normalize {
                input,
                width,
                height,
                fps,
                output,
            } => {
                a.push(&["-i"]).path(input);
                a.push(&["-vf", &normalize_filter(*width, *height, *fps)]);
                a.push(&["-c:v", &enc.video_codec, "-crf", &enc.normalize_crf.to_string()]);
                a.push(&["-preset", &enc.preset]);
                a.push(&["-c:a", "aac", "-b:a", &enc.audio_bitrate]).path(output);
            }
            TransformRequest::OverlayCompose {
                input,
                overlay,
                start,
                end,
                scale,
                position,
                output,
            } => {
                a.push(&["-i"]).path(input);
                // Animated overlays (GIFs) loop for the whole window.
                a.push(&["-ignore_loop", "0", "-i"]).path(overlay);
                a.push(&["-filter_complex", &overlay_graph(*scale, *position, *start, *end)]);
                a.push(&["-map", "[outv]", "-map", "0:a?"]);
                a.push(&["-c:v", &enc.video_codec, "-crf", &enc.overlay_crf.to_string()]);
                a.push(&["-preset", &enc.preset, "-c:a", "copy"]);
                // Without this an infinitely looping overlay never ends.
                a.push(&["-shortest"]).path(output);
            }
            TransformRequest::PitchShift {
                input,
                semitones,
                output,
            } => {
                a.push(&["-i"]).path(input);
                a.push(&["-af", &pitch_filter(*semitones, enc.pitch_sample_rate)]);
                a.push(&["-c:v", "copy", "-c:a", "aac", "-b:a", &enc.effect_audio_bitrate])
                    .path(output);
            }
            TransformRequest::RandomFragment {
                input,
                start,
                duration,
                output,
            } => {
                a.push(&["-ss", &fmt_secs(*start), "-i"]).path(input);
                a.push(&["-t", &fmt_secs(*duration)]);
                a.push(&["-c:v", &enc.video_codec, "-crf", &enc.chop_crf.to_string()]);
                a.push(&["-preset", &enc.preset]);
                a.push(&["-c:a", "aac", "-b:a", &enc.audio_bitrate]).path(output);
            }
            TransformRequest::MuteByExpression {
                input,
                expr,
                output,
            } => {
                a.push(&["-i"]).path(input);
                a.push(&["-af", &expr.to_filter()]);
                a.push(&["-c:v", "copy", "-c:a", "aac", "-b:a", &enc.effect_audio_bitrate])
                    .path(output);
            }
        }
        a.0
    }
}

struct Args(Vec<OsString>);

impl Args {
    fn push(&mut self, items: &[&str]) -> &mut Self {
        self.0.extend(items.iter().map(|s| OsString::from(*s)));
        self
    }

    fn path(&mut self, p: &Path) -> &mut Self {
        self.0.push(p.as_os_str().to_os_string());
        self
    }
}
