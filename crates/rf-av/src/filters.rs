//! ffmpeg filter expressions used by the transform profiles.
//!
//! Numbers are always rendered with six decimals so the generated filter
//! graphs are stable regardless of how the input value was written.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Render a float the way every filter and seek argument expects it.
pub fn fmt_secs(v: f64) -> String {
    format!("{v:.6}")
}

// ---------------------------------------------------------------------------
// Overlay anchor
// ---------------------------------------------------------------------------

/// Corner (or centre) an overlay is pinned to.
///
/// Parsed leniently: any unrecognised string resolves to [`Anchor::Center`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Anchor {
    #[default]
    TopRight,
    TopLeft,
    BottomRight,
    BottomLeft,
    Center,
}

impl Anchor {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "topright" => Self::TopRight,
            "topleft" => Self::TopLeft,
            "bottomright" => Self::BottomRight,
            "bottomleft" => Self::BottomLeft,
            _ => Self::Center,
        }
    }

    /// `x=...:y=...` arguments for the overlay filter, with a 10px margin.
    pub fn overlay_xy(self) -> &'static str {
        match self {
            Self::TopRight => "x=main_w-overlay_w-10:y=10",
            Self::TopLeft => "x=10:y=10",
            Self::BottomRight => "x=main_w-overlay_w-10:y=main_h-overlay_h-10",
            Self::BottomLeft => "x=10:y=main_h-overlay_h-10",
            Self::Center => "x=(main_w-overlay_w)/2:y=(main_h-overlay_h)/2",
        }
    }
}

impl From<String> for Anchor {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<Anchor> for String {
    fn from(a: Anchor) -> Self {
        a.to_string()
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TopRight => write!(f, "topright"),
            Self::TopLeft => write!(f, "topleft"),
            Self::BottomRight => write!(f, "bottomright"),
            Self::BottomLeft => write!(f, "bottomleft"),
            Self::Center => write!(f, "center"),
        }
    }
}

/// `filter_complex` graph that scales input 1 relative to its own width and
/// shows it on input 0 during `[start, end)`. The composed stream is `[outv]`.
pub fn overlay_graph(scale: f64, anchor: Anchor, start: f64, end: f64) -> String {
    format!(
        "[1:v]scale=iw*{}:-1[ovr];[0:v][ovr]overlay={}:enable='gte(t,{})*lt(t,{})'[outv]",
        fmt_secs(scale),
        anchor.overlay_xy(),
        fmt_secs(start),
        fmt_secs(end),
    )
}

// ---------------------------------------------------------------------------
// Mute expression
// ---------------------------------------------------------------------------

/// An inclusive `[start, end]` interval in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, t: f64) -> bool {
        t >= self.start && t <= self.end
    }
}

/// Volume gate that silences audio while `t` lies in any of its ranges.
///
/// Ranges are OR-ed together; overlapping or unordered ranges are fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MuteExpression {
    ranges: Vec<TimeRange>,
}

impl MuteExpression {
    /// Build from a non-empty range list; `None` when empty.
    pub fn new(ranges: Vec<TimeRange>) -> Option<Self> {
        (!ranges.is_empty()).then_some(Self { ranges })
    }

    pub fn ranges(&self) -> &[TimeRange] {
        &self.ranges
    }

    /// Evaluate the gate at time `t` the same way ffmpeg will.
    pub fn is_muted(&self, t: f64) -> bool {
        self.ranges.iter().any(|r| r.contains(t))
    }

    /// The `volume` filter implementing this gate.
    pub fn to_filter(&self) -> String {
        let sum = self
            .ranges
            .iter()
            .map(|r| format!("between(t,{},{})", fmt_secs(r.start), fmt_secs(r.end)))
            .collect::<Vec<_>>()
            .join("+");
        format!("volume='if(gt({sum},0),0,1)':eval=frame")
    }
}

// ---------------------------------------------------------------------------
// Pitch shift
// ---------------------------------------------------------------------------

/// Frequency ratio for a shift of `semitones`.
pub fn pitch_factor(semitones: f64) -> f64 {
    2f64.powf(semitones / 12.0)
}

/// Split a tempo ratio into `atempo` stages that each lie in `[0.5, 2.0]`.
pub fn atempo_chain(tempo: f64) -> Vec<f64> {
    let mut stages = Vec::new();
    let mut rest = tempo;
    if !rest.is_finite() || rest <= 0.0 {
        return vec![1.0];
    }
    while rest > 2.0 {
        stages.push(2.0);
        rest /= 2.0;
    }
    while rest < 0.5 {
        stages.push(0.5);
        rest /= 0.5;
    }
    stages.push(rest);
    stages
}

/// Audio filter that shifts pitch by `semitones` while keeping duration.
pub fn pitch_filter(semitones: f64, sample_rate: u32) -> String {
    let factor = pitch_factor(semitones);
    let tempo = atempo_chain(1.0 / factor)
        .into_iter()
        .map(|t| format!("atempo={}", fmt_secs(t)))
        .collect::<Vec<_>>()
        .join(",");
    format!(
        "asetrate={sample_rate}*{},aresample={sample_rate},{tempo}",
        fmt_secs(factor)
    )
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Video filter that fits into `width`x`height`, pads centred, and resamples
/// the frame rate. A non-positive `fps` leaves the rate untouched.
pub fn normalize_filter(width: u32, height: u32, fps: f64) -> String {
    let mut vf = format!(
        "scale=w={width}:h={height}:force_original_aspect_ratio=decrease,\
         pad={width}:{height}:(ow-iw)/2:(oh-ih)/2"
    );
    if fps > 0.0 {
        vf.push_str(&format!(",fps={fps:.2}"));
    }
    vf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_parsing_is_lenient() {
        assert_eq!(Anchor::parse("TopLeft"), Anchor::TopLeft);
        assert_eq!(Anchor::parse("bottomright"), Anchor::BottomRight);
        assert_eq!(Anchor::parse("middle"), Anchor::Center);
        assert_eq!(Anchor::default(), Anchor::TopRight);

        let a: Anchor = serde_json::from_str(r#""bottomleft""#).unwrap();
        assert_eq!(a, Anchor::BottomLeft);
        assert_eq!(serde_json::to_string(&Anchor::Center).unwrap(), r#""center""#);
    }

    #[test]
    fn overlay_graph_gates_half_open_window() {
        let g = overlay_graph(0.2, Anchor::TopRight, 1.0, 4.5);
        assert_eq!(
            g,
            "[1:v]scale=iw*0.200000:-1[ovr];[0:v][ovr]overlay=x=main_w-overlay_w-10:y=10:\
             enable='gte(t,1.000000)*lt(t,4.500000)'[outv]"
        );
    }

    #[test]
    fn mute_expression_or_semantics() {
        let m = MuteExpression::new(vec![
            TimeRange::new(1.0, 2.0),
            TimeRange::new(1.5, 3.0),
            TimeRange::new(10.0, 11.0),
        ])
        .unwrap();
        assert!(m.is_muted(1.2));
        assert!(m.is_muted(2.5));
        assert!(m.is_muted(10.5));
        assert!(!m.is_muted(0.5));
        assert!(!m.is_muted(5.0));
        assert!(!m.is_muted(11.5));
    }

    #[test]
    fn mute_expression_rejects_empty() {
        assert!(MuteExpression::new(Vec::new()).is_none());
    }

    #[test]
    fn mute_filter_text() {
        let m = MuteExpression::new(vec![TimeRange::new(1.0, 1.5), TimeRange::new(4.0, 4.25)])
            .unwrap();
        assert_eq!(
            m.to_filter(),
            "volume='if(gt(between(t,1.000000,1.500000)+between(t,4.000000,4.250000),0),0,1)':eval=frame"
        );
    }

    #[test]
    fn atempo_chain_stays_in_range() {
        assert_eq!(atempo_chain(1.0), vec![1.0]);
        for tempo in [0.1, 0.3, 0.5, 0.74, 1.33, 2.0, 3.9, 8.0] {
            let chain = atempo_chain(tempo);
            assert!(chain.iter().all(|s| (0.5..=2.0).contains(s)), "{tempo}: {chain:?}");
            let product: f64 = chain.iter().product();
            assert!((product - tempo).abs() < 1e-9, "{tempo}: {product}");
        }
    }

    #[test]
    fn pitch_filter_compensates_tempo() {
        assert!((pitch_factor(12.0) - 2.0).abs() < 1e-12);
        let f = pitch_filter(12.0, 48_000);
        assert_eq!(
            f,
            "asetrate=48000*2.000000,aresample=48000,atempo=0.500000"
        );
        let f = pitch_filter(-24.0, 48_000);
        assert!(f.ends_with("atempo=2.000000,atempo=2.000000"), "{f}");
    }

    #[test]
    fn normalize_filter_text() {
        assert_eq!(
            normalize_filter(1280, 720, 30.0),
            "scale=w=1280:h=720:force_original_aspect_ratio=decrease,pad=1280:720:(ow-iw)/2:(oh-ih)/2,fps=30.00"
        );
        assert!(!normalize_filter(640, 360, 0.0).contains("fps="));
    }
}
