//! Media-domain enums for asset kinds and probed stream types.
//!
//! All enums serialize in lowercase (via `serde(rename_all = "lowercase")`) and
//! implement `Display` manually for consistent string representation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

// ---------------------------------------------------------------------------
// MediaKind
// ---------------------------------------------------------------------------

/// Broad classification of a catalog asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
    Image,
    Gif,
    #[default]
    #[serde(other)]
    Unknown,
}

impl MediaKind {
    /// Classify a path by its extension alone (case-insensitive).
    ///
    /// Returns `None` when the extension is missing or not recognized, so the
    /// caller can fall back to probed stream types.
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "mp4" | "mov" | "mkv" | "webm" | "avi" => Some(Self::Video),
            "mp3" | "wav" | "aac" | "flac" | "m4a" => Some(Self::Audio),
            "gif" => Some(Self::Gif),
            "png" | "jpg" | "jpeg" | "bmp" => Some(Self::Image),
            _ => None,
        }
    }

    /// Whether assets of this kind are scheduled for normalization.
    pub fn is_normalizable(self) -> bool {
        matches!(self, Self::Video | Self::Gif)
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => write!(f, "video"),
            Self::Audio => write!(f, "audio"),
            Self::Image => write!(f, "image"),
            Self::Gif => write!(f, "gif"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

impl std::str::FromStr for MediaKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "video" => Ok(Self::Video),
            "audio" => Ok(Self::Audio),
            "image" => Ok(Self::Image),
            "gif" => Ok(Self::Gif),
            "unknown" => Ok(Self::Unknown),
            other => Err(crate::Error::Validation(format!(
                "unknown media kind '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// StreamKind
// ---------------------------------------------------------------------------

/// Stream type as reported by the prober's `codec_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Video,
    Audio,
    Subtitle,
    Data,
    #[serde(other)]
    Other,
}

impl StreamKind {
    /// Map an ffprobe `codec_type` string.
    pub fn from_codec_type(codec_type: &str) -> Self {
        match codec_type {
            "video" => Self::Video,
            "audio" => Self::Audio,
            "subtitle" => Self::Subtitle,
            "data" => Self::Data,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => write!(f, "video"),
            Self::Audio => write!(f, "audio"),
            Self::Subtitle => write!(f, "subtitle"),
            Self::Data => write!(f, "data"),
            Self::Other => write!(f, "other"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_classification() {
        assert_eq!(MediaKind::from_extension(Path::new("a/clip.MP4")), Some(MediaKind::Video));
        assert_eq!(MediaKind::from_extension(Path::new("song.flac")), Some(MediaKind::Audio));
        assert_eq!(MediaKind::from_extension(Path::new("loop.gif")), Some(MediaKind::Gif));
        assert_eq!(MediaKind::from_extension(Path::new("logo.jpeg")), Some(MediaKind::Image));
        assert_eq!(MediaKind::from_extension(Path::new("notes.txt")), None);
        assert_eq!(MediaKind::from_extension(Path::new("README")), None);
    }

    #[test]
    fn normalizable_kinds() {
        assert!(MediaKind::Video.is_normalizable());
        assert!(MediaKind::Gif.is_normalizable());
        assert!(!MediaKind::Audio.is_normalizable());
        assert!(!MediaKind::Image.is_normalizable());
        assert!(!MediaKind::Unknown.is_normalizable());
    }

    #[test]
    fn media_kind_display_and_serde() {
        assert_eq!(MediaKind::Gif.to_string(), "gif");
        let json = serde_json::to_string(&MediaKind::Video).unwrap();
        assert_eq!(json, r#""video""#);
        let back: MediaKind = serde_json::from_str(r#""audio""#).unwrap();
        assert_eq!(back, MediaKind::Audio);
        let odd: MediaKind = serde_json::from_str(r#""hologram""#).unwrap();
        assert_eq!(odd, MediaKind::Unknown);
    }

    #[test]
    fn media_kind_from_str() {
        assert_eq!("VIDEO".parse::<MediaKind>().unwrap(), MediaKind::Video);
        assert!("tape".parse::<MediaKind>().is_err());
    }

    #[test]
    fn stream_kind_mapping() {
        assert_eq!(StreamKind::from_codec_type("video"), StreamKind::Video);
        assert_eq!(StreamKind::from_codec_type("audio"), StreamKind::Audio);
        assert_eq!(StreamKind::from_codec_type("attachment"), StreamKind::Other);
    }
}
