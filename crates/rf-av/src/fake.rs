//! In-memory [`Transcoder`] for tests.
//!
//! Records every request, fakes probe results from a lookup table and writes
//! a placeholder file for each successful transform so downstream steps that
//! check for outputs behave as they would against ffmpeg.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rf_core::StreamKind;
use tokio_util::sync::CancellationToken;

use crate::player::{PlaybackEnd, PlayerSession};
use crate::probe::{MediaMetadata, StreamInfo};
use crate::request::{ProcessResult, TransformRequest};
use crate::transcoder::Transcoder;

#[derive(Debug, Default)]
struct State {
    requests: Vec<TransformRequest>,
    probes: Vec<PathBuf>,
    launches: Vec<(PathBuf, bool)>,
}

/// A recording fake transcoder.
#[derive(Debug)]
pub struct RecordingTranscoder {
    metadata: Mutex<HashMap<PathBuf, MediaMetadata>>,
    fail_kind: Mutex<Option<(&'static str, i32)>>,
    player: bool,
    state: Mutex<State>,
}

impl Default for RecordingTranscoder {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingTranscoder {
    pub fn new() -> Self {
        Self {
            metadata: Mutex::new(HashMap::new()),
            fail_kind: Mutex::new(None),
            player: true,
            state: Mutex::new(State::default()),
        }
    }

    /// Pretend no preview player is installed.
    pub fn without_player(mut self) -> Self {
        self.player = false;
        self
    }

    /// Return `metadata` when `path` is probed. Unknown paths fail to probe.
    pub fn with_metadata(self, path: impl Into<PathBuf>, metadata: MediaMetadata) -> Self {
        self.set_metadata(path, metadata);
        self
    }

    pub fn set_metadata(&self, path: impl Into<PathBuf>, metadata: MediaMetadata) {
        self.metadata.lock().insert(path.into(), metadata);
    }

    /// Make every request of `kind` exit with `status`.
    pub fn failing(self, kind: &'static str, status: i32) -> Self {
        *self.fail_kind.lock() = Some((kind, status));
        self
    }

    /// All transform requests, in call order.
    pub fn requests(&self) -> Vec<TransformRequest> {
        self.state.lock().requests.clone()
    }

    /// Kinds of all transform requests, in call order.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.state.lock().requests.iter().map(|r| r.kind()).collect()
    }

    pub fn transform_count(&self) -> usize {
        self.state.lock().requests.len()
    }

    pub fn probe_count(&self) -> usize {
        self.state.lock().probes.len()
    }

    /// `(file, looping)` for every player launch.
    pub fn launches(&self) -> Vec<(PathBuf, bool)> {
        self.state.lock().launches.clone()
    }

    /// Total calls of any kind.
    pub fn call_count(&self) -> usize {
        let s = self.state.lock();
        s.requests.len() + s.probes.len() + s.launches.len()
    }
}

impl Transcoder for RecordingTranscoder {
    fn probe(&self, path: &Path) -> rf_core::Result<MediaMetadata> {
        self.state.lock().probes.push(path.to_path_buf());
        self.metadata
            .lock()
            .get(path)
            .cloned()
            .ok_or_else(|| rf_core::Error::Probe(format!("no fake metadata for {}", path.display())))
    }

    fn transform(&self, request: &TransformRequest) -> rf_core::Result<ProcessResult> {
        self.state.lock().requests.push(request.clone());

        if let Some((kind, status)) = *self.fail_kind.lock() {
            if kind == request.kind() {
                return Ok(ProcessResult::failed(status));
            }
        }

        let out = request.output();
        if let Some(parent) = out.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(out, request.kind())?;
        Ok(ProcessResult::success())
    }

    fn player_available(&self) -> bool {
        self.player
    }

    fn launch_player(&self, path: &Path, looping: bool) -> rf_core::Result<Box<dyn PlayerSession>> {
        if !self.player {
            return Err(rf_core::Error::PlayerUnavailable("fake player disabled".into()));
        }
        self.state.lock().launches.push((path.to_path_buf(), looping));
        Ok(Box::new(FakePlayer))
    }
}

/// Player that finishes immediately unless the stop token already fired.
#[derive(Debug)]
pub struct FakePlayer;

impl PlayerSession for FakePlayer {
    fn wait(&mut self, stop: &CancellationToken) -> rf_core::Result<PlaybackEnd> {
        if stop.is_cancelled() {
            return Ok(PlaybackEnd::Stopped);
        }
        Ok(PlaybackEnd::Exited(0))
    }

    fn terminate(&mut self) -> rf_core::Result<()> {
        Ok(())
    }
}

/// Metadata for a video with a single video and audio stream.
pub fn video_metadata(duration: f64, width: u32, height: u32, fps: f64) -> MediaMetadata {
    MediaMetadata {
        duration: Some(duration),
        streams: vec![
            StreamInfo {
                kind: StreamKind::Video,
                codec: Some("h264".into()),
                width,
                height,
                fps,
            },
            StreamInfo {
                kind: StreamKind::Audio,
                codec: Some("aac".into()),
                width: 0,
                height: 0,
                fps: 0.0,
            },
        ],
        raw: serde_json::json!({
            "streams": [
                {"codec_type": "video", "codec_name": "h264", "width": width, "height": height},
                {"codec_type": "audio", "codec_name": "aac"}
            ],
            "format": {"duration": format!("{duration:.6}")}
        }),
    }
}

/// Metadata for an audio-only file.
pub fn audio_metadata(duration: f64) -> MediaMetadata {
    MediaMetadata {
        duration: Some(duration),
        streams: vec![StreamInfo {
            kind: StreamKind::Audio,
            codec: Some("mp3".into()),
            width: 0,
            height: 0,
            fps: 0.0,
        }],
        raw: serde_json::json!({
            "streams": [{"codec_type": "audio", "codec_name": "mp3"}],
            "format": {"duration": format!("{duration:.6}")}
        }),
    }
}
