//! Media probing via ffprobe.

pub mod ffprobe;
pub mod metadata;

pub use self::ffprobe::{parse_probe_json, FfprobeProber};
pub use self::metadata::{MediaMetadata, StreamInfo};
