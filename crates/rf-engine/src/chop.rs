//! Segment planning for random chops.

use rand::seq::SliceRandom;
use rand::Rng;

/// Duration assumed when the input cannot be probed.
pub const FALLBACK_DURATION: f64 = 60.0;

/// One cut: `length` seconds starting at `start`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: f64,
    pub length: f64,
}

impl Segment {
    pub fn end(&self) -> f64 {
        self.start + self.length
    }
}

/// Parameters for [`ChopPlan::segments`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChopPlan {
    pub count: u32,
    pub min_len: f64,
    pub max_len: f64,
    pub shuffle: bool,
}

impl ChopPlan {
    /// Draw `count` segments from a source of `duration` seconds.
    ///
    /// Lengths are uniform in `[min_len, max_len]`, starts uniform in
    /// `[0, duration - min_len]`. A start that would run past the end is
    /// pulled back to `duration - length`. When a segment is longer than the
    /// whole source it starts at zero.
    pub fn segments<R: Rng>(&self, duration: f64, rng: &mut R) -> Vec<Segment> {
        let latest_start = (duration - self.min_len).max(0.0);
        let mut segments: Vec<Segment> = (0..self.count)
            .map(|_| {
                let length = rng.gen_range(self.min_len..=self.max_len);
                let mut start = rng.gen_range(0.0..=latest_start);
                if start + length > duration {
                    start = (duration - length).max(0.0);
                }
                Segment { start, length }
            })
            .collect();

        if self.shuffle {
            segments.shuffle(rng);
        }
        segments
    }
}
