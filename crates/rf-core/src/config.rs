//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from JSON and carries the
//! tool overrides, default directories, preprocessing targets, and encoder
//! settings. Every section defaults sensibly so a completely empty `{}` file
//! is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::Error;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tools: ToolsConfig,
    pub paths: PathsConfig,
    pub preprocessing: PreprocessingDefaults,
    pub encoding: EncodingConfig,
}

impl Config {
    /// Deserialize a `Config` from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| Error::Validation(format!("config parse error: {e}")))
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None` or the file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {}: {e}", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if let Some(ref p) = self.tools.ffmpeg_path {
            if !p.exists() {
                warnings.push(format!(
                    "tools.ffmpeg_path {} does not exist; PATH lookup will be used",
                    p.display()
                ));
            }
        }

        let pre = &self.preprocessing;
        if pre.target_width == 0 || pre.target_height == 0 {
            warnings.push("preprocessing target dimensions must be non-zero".into());
        }
        if pre.target_width % 2 == 1 || pre.target_height % 2 == 1 {
            warnings.push(format!(
                "preprocessing target {}x{} has an odd dimension; libx264 requires even sizes",
                pre.target_width, pre.target_height
            ));
        }
        if pre.target_fps < 0.0 {
            warnings.push("preprocessing.target_fps is negative; fps resampling disabled".into());
        }

        let enc = &self.encoding;
        for (name, crf) in [
            ("normalize_crf", enc.normalize_crf),
            ("fragment_crf", enc.fragment_crf),
            ("chop_crf", enc.chop_crf),
            ("overlay_crf", enc.overlay_crf),
        ] {
            if crf > 51 {
                warnings.push(format!("encoding.{name} {crf} is outside the x264 range 0-51"));
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Paths to external CLI tools.
///
/// Unset entries are resolved next to the ffmpeg binary first, then on `PATH`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg_path: Option<PathBuf>,
    pub ffprobe_path: Option<PathBuf>,
    pub ffplay_path: Option<PathBuf>,
}

/// Default locations used when the rules document does not override them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub assets_dir: PathBuf,
    pub workdir: PathBuf,
    /// File name of the persisted catalog index, relative to the workdir.
    pub index_file: String,
    /// Directory name for normalized outputs, relative to the workdir.
    pub normalized_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from("assets"),
            workdir: PathBuf::from("output"),
            index_file: "media_index.json".into(),
            normalized_dir: "normalized".into(),
        }
    }
}

/// Normalization targets used when a rules document omits them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessingDefaults {
    pub target_width: u32,
    pub target_height: u32,
    pub target_fps: f64,
    /// Worker count; `0` selects half the logical CPUs (at least one).
    pub workers: usize,
}

impl Default for PreprocessingDefaults {
    fn default() -> Self {
        Self {
            target_width: 1280,
            target_height: 720,
            target_fps: 30.0,
            workers: 0,
        }
    }
}

/// Encoder settings applied when building transform requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingConfig {
    pub video_codec: String,
    pub preset: String,
    pub normalize_crf: u32,
    pub fragment_crf: u32,
    pub chop_crf: u32,
    pub overlay_crf: u32,
    pub audio_bitrate: String,
    /// Bitrate for audio re-encoded by effects (pitch, bleep).
    pub effect_audio_bitrate: String,
    /// Base sample rate for the pitch-shift resampler.
    pub pitch_sample_rate: u32,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            video_codec: "libx264".into(),
            preset: "veryfast".into(),
            normalize_crf: 20,
            fragment_crf: 18,
            chop_crf: 24,
            overlay_crf: 18,
            audio_bitrate: "128k".into(),
            effect_audio_bitrate: "192k".into(),
            pitch_sample_rate: 48_000,
        }
    }
}
