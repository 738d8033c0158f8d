//! Probed media metadata.

use rf_core::StreamKind;
use serde::{Deserialize, Serialize};

/// One stream reported by the prober.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamInfo {
    pub kind: StreamKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codec: Option<String>,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    /// Frames per second, `0.0` when unknown or not a video stream.
    #[serde(default)]
    pub fps: f64,
}

/// Result of probing one media file.
///
/// The summary fields are extracted for convenience; `raw` keeps the prober's
/// full JSON document, key order included, so it can be persisted verbatim.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MediaMetadata {
    /// Container duration in seconds, if reported.
    pub duration: Option<f64>,
    /// Streams in the order the prober listed them.
    pub streams: Vec<StreamInfo>,
    pub raw: serde_json::Value,
}

impl MediaMetadata {
    /// First video stream in probe order.
    pub fn first_video(&self) -> Option<&StreamInfo> {
        self.streams.iter().find(|s| s.kind == StreamKind::Video)
    }

    /// Kind of the first audio or video stream in probe order.
    pub fn first_av_kind(&self) -> Option<StreamKind> {
        self.streams
            .iter()
            .map(|s| s.kind)
            .find(|k| matches!(k, StreamKind::Video | StreamKind::Audio))
    }

    /// Duration if it is known and strictly positive.
    pub fn positive_duration(&self) -> Option<f64> {
        self.duration.filter(|d| d.is_finite() && *d > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(kind: StreamKind) -> StreamInfo {
        StreamInfo {
            kind,
            codec: None,
            width: 0,
            height: 0,
            fps: 0.0,
        }
    }

    #[test]
    fn first_av_kind_follows_probe_order() {
        let meta = MediaMetadata {
            streams: vec![
                stream(StreamKind::Data),
                stream(StreamKind::Audio),
                stream(StreamKind::Video),
            ],
            ..Default::default()
        };
        assert_eq!(meta.first_av_kind(), Some(StreamKind::Audio));
        assert_eq!(meta.first_video().map(|s| s.kind), Some(StreamKind::Video));
    }

    #[test]
    fn positive_duration_filters_zero() {
        let mut meta = MediaMetadata::default();
        assert_eq!(meta.positive_duration(), None);
        meta.duration = Some(0.0);
        assert_eq!(meta.positive_duration(), None);
        meta.duration = Some(12.5);
        assert_eq!(meta.positive_duration(), Some(12.5));
    }
}
