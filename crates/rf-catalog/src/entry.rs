//! Catalog entries.

use std::path::{Path, PathBuf};

use rf_av::MediaMetadata;
use rf_core::MediaKind;
use serde::{Deserialize, Serialize};

use crate::fingerprint::fingerprint;

/// One scanned asset.
///
/// Serialized with the field names used by the on-disk index; the asset kind
/// is stored as `type` and the raw probe document as `probe`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaAssetEntry {
    pub path: PathBuf,
    #[serde(rename = "type", default)]
    pub kind: MediaKind,
    /// Seconds; `0.0` when the prober did not report it.
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub fps: f64,
    #[serde(default)]
    pub fingerprint: String,
    /// Normalized rendition. Only meaningful while [`Self::valid_normalized`]
    /// agrees.
    #[serde(default, with = "empty_as_none")]
    pub normalized_path: Option<PathBuf>,
    #[serde(rename = "probe", default)]
    pub raw_metadata: serde_json::Value,
}

impl MediaAssetEntry {
    /// Build an entry from a probe result. A failed probe still yields an
    /// entry; its kind then comes from the extension alone.
    pub fn from_probe(path: &Path, probe: Option<MediaMetadata>, fingerprint: String) -> Self {
        let kind = infer_kind(path, probe.as_ref());
        let (duration, width, height, fps, raw) = match probe {
            Some(meta) => {
                let video = meta.first_video();
                (
                    meta.duration.filter(|d| d.is_finite() && *d >= 0.0).unwrap_or(0.0),
                    video.map_or(0, |v| v.width),
                    video.map_or(0, |v| v.height),
                    video.map_or(0.0, |v| v.fps),
                    meta.raw,
                )
            }
            None => (0.0, 0, 0, 0.0, serde_json::Value::Null),
        };

        Self {
            path: path.to_path_buf(),
            kind,
            duration,
            width,
            height,
            fps,
            fingerprint,
            normalized_path: None,
            raw_metadata: raw,
        }
    }

    /// The normalized output, if it still exists and the source file has not
    /// changed since it was produced.
    pub fn valid_normalized(&self) -> Option<&Path> {
        let out = self.normalized_path.as_deref()?;
        if self.fingerprint.is_empty() || !out.exists() {
            return None;
        }
        (fingerprint(&self.path) == self.fingerprint).then_some(out)
    }
}

/// Extension first; otherwise the first audio or video stream decides.
pub fn infer_kind(path: &Path, probe: Option<&MediaMetadata>) -> MediaKind {
    if let Some(kind) = MediaKind::from_extension(path) {
        return kind;
    }
    match probe.and_then(MediaMetadata::first_av_kind) {
        Some(rf_core::StreamKind::Video) => MediaKind::Video,
        Some(rf_core::StreamKind::Audio) => MediaKind::Audio,
        _ => MediaKind::Unknown,
    }
}

/// Serde helpers storing `None` as `""`, the way the index has always
/// recorded "not normalized".
mod empty_as_none {
    use std::path::PathBuf;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<PathBuf>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(p) => serializer.serialize_str(&p.to_string_lossy()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<PathBuf>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = Option::<String>::deserialize(deserializer)?;
        Ok(s.filter(|s| !s.is_empty()).map(PathBuf::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rf_av::fake::{audio_metadata, video_metadata};

    #[test]
    fn from_probe_extracts_first_video_stream() {
        let meta = video_metadata(5.0, 1920, 1080, 30.0);
        let e = MediaAssetEntry::from_probe(Path::new("a/clip.mp4"), Some(meta), "10-1".into());
        assert_eq!(e.kind, MediaKind::Video);
        assert_eq!((e.width, e.height), (1920, 1080));
        assert!((e.duration - 5.0).abs() < 1e-9);
        assert!((e.fps - 30.0).abs() < 1e-9);
        assert!(e.raw_metadata.get("streams").is_some());
    }

    #[test]
    fn failed_probe_keeps_defaults() {
        let e = MediaAssetEntry::from_probe(Path::new("song.wav"), None, String::new());
        assert_eq!(e.kind, MediaKind::Audio);
        assert_eq!(e.duration, 0.0);
        assert_eq!(e.width, 0);
        assert!(e.raw_metadata.is_null());
    }

    #[test]
    fn unknown_extension_falls_back_to_streams() {
        let meta = audio_metadata(3.0);
        assert_eq!(infer_kind(Path::new("track.ogg"), Some(&meta)), MediaKind::Audio);
        let meta = video_metadata(3.0, 640, 480, 25.0);
        assert_eq!(infer_kind(Path::new("capture.ts"), Some(&meta)), MediaKind::Video);
        assert_eq!(infer_kind(Path::new("notes.txt"), None), MediaKind::Unknown);
    }

    #[test]
    fn extension_wins_over_streams() {
        let meta = video_metadata(3.0, 640, 480, 25.0);
        assert_eq!(infer_kind(Path::new("cover.png"), Some(&meta)), MediaKind::Image);
    }

    #[test]
    fn index_field_names() {
        let e = MediaAssetEntry::from_probe(Path::new("loop.gif"), None, "1-2".into());
        let v = serde_json::to_value(&e).unwrap();
        assert_eq!(v["type"], "gif");
        assert_eq!(v["normalized_path"], "");
        assert!(v.get("probe").is_some());

        let back: MediaAssetEntry = serde_json::from_value(v).unwrap();
        assert_eq!(back.normalized_path, None);
    }

    #[test]
    fn valid_normalized_requires_file_and_fingerprint() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("clip.mp4");
        let out = dir.path().join("clip_norm.mp4");
        std::fs::write(&src, b"source").unwrap();

        let mut e = MediaAssetEntry::from_probe(&src, None, fingerprint(&src));
        e.normalized_path = Some(out.clone());
        assert_eq!(e.valid_normalized(), None, "output missing");

        std::fs::write(&out, b"normalized").unwrap();
        assert_eq!(e.valid_normalized(), Some(out.as_path()));

        std::fs::write(&src, b"source, edited").unwrap();
        assert_eq!(e.valid_normalized(), None, "source changed");
    }
}
