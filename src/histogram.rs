//! Cumulative depth histogram for perceptually normalized visualization.
//!
//! Mapping raw depth linearly to brightness wastes most of the dynamic range
//! on empty space. Instead, each frame's depth values are ranked through a
//! cumulative histogram: a pixel's intensity is proportional to the fraction
//! of valid samples *farther* than it, so nearby objects come out bright
//! regardless of the absolute depth distribution.

use crate::frame::{DepthFrame, INVALID_DEPTH};

/// Number of histogram buckets; depth samples at or beyond this are ignored.
pub const MAX_DEPTH: u16 = 10_000;

/// Intensity assigned to the nearest possible sample.
pub const MAX_INTENSITY: u16 = i16::MAX as u16;

/// Per-frame depth histogram, remapped to visualization intensities.
///
/// The bucket array is allocated once and fully re-zeroed on every
/// [`update`][Self::update]; no state carries over between frames.
pub struct DepthHistogram {
    buckets: Vec<f32>,
    valid_samples: u64,
}

impl DepthHistogram {
    pub fn new() -> Self {
        Self {
            buckets: vec![0.0; MAX_DEPTH as usize],
            valid_samples: 0,
        }
    }

    /// Recomputes the histogram from `depth`.
    ///
    /// Samples equal to [`INVALID_DEPTH`] do not contribute.
    pub fn update(&mut self, depth: &DepthFrame) {
        self.buckets.fill(0.0);
        self.valid_samples = 0;

        for &sample in depth.samples() {
            if sample != INVALID_DEPTH && sample < MAX_DEPTH {
                self.buckets[sample as usize] += 1.0;
                self.valid_samples += 1;
            }
        }

        for i in 1..MAX_DEPTH as usize {
            self.buckets[i] += self.buckets[i - 1];
        }

        if self.valid_samples > 0 {
            let total = self.valid_samples as f32;
            for bucket in &mut self.buckets[1..] {
                *bucket = MAX_INTENSITY as f32 * (1.0 - *bucket / total);
            }
        }
    }

    /// Number of valid samples seen by the last [`update`][Self::update].
    #[inline]
    pub fn valid_samples(&self) -> u64 {
        self.valid_samples
    }

    /// Visualization intensity for a depth value.
    ///
    /// Invalid and out-of-range depths map to 0 (fully dark/transparent).
    #[inline]
    pub fn intensity(&self, depth: u16) -> u16 {
        if depth == INVALID_DEPTH || depth >= MAX_DEPTH {
            return 0;
        }
        self.buckets[depth as usize] as u16
    }

    /// Copies the whole intensity lookup table into `out`, one entry per
    /// depth bucket.
    pub fn intensity_lut(&self, out: &mut Vec<u16>) {
        out.clear();
        out.extend((0..MAX_DEPTH).map(|d| self.intensity(d)));
    }
}

impl Default for DepthHistogram {
    fn default() -> Self {
        Self::new()
    }
}
