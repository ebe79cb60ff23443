//! Depth-window thresholding into a binary mask.
//!
//! The thresholder selects pixels whose depth lies strictly inside a window,
//! restricted to a region of interest. Everything else stays background.
//! Bounding the search spatially and in depth keeps later blob extraction
//! cheap and rejects objects that would otherwise threshold positive.

use std::path::Path;

use image::GrayImage;

use crate::{
    frame::DepthFrame,
    rect::Rect,
    resolution::Resolution,
};

/// Mask value for pixels inside the depth window.
pub const FOREGROUND: u8 = 0xFF;

/// An exclusive depth window in millimeters: `min < depth < max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthWindow {
    pub min: u16,
    pub max: u16,
}

impl DepthWindow {
    pub fn new(min: u16, max: u16) -> Self {
        Self { min, max }
    }

    /// The window spanning `center ± half_extent`, saturating at the `u16`
    /// range.
    pub fn around(center: f32, half_extent: f32) -> Self {
        let min = (center - half_extent).max(0.0) as u16;
        let max = (center + half_extent).min(u16::MAX as f32) as u16;
        Self { min, max }
    }

    /// Whether `depth` lies strictly inside the window.
    ///
    /// Both bounds are exclusive, so an invalid depth of 0 can never pass a
    /// window with `min >= 0`.
    #[inline]
    pub fn contains(&self, depth: u16) -> bool {
        depth > self.min && depth < self.max
    }
}

/// A binary image: 0 background, [`FOREGROUND`] foreground.
pub struct Mask {
    buf: GrayImage,
}

impl Mask {
    pub fn new(resolution: Resolution) -> Self {
        Self {
            buf: GrayImage::new(resolution.width(), resolution.height()),
        }
    }

    #[inline]
    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.buf.width(), self.buf.height())
    }

    /// Returns a [`Rect`] covering this mask, positioned at `(0, 0)`.
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_top_left(0, 0, self.buf.width(), self.buf.height())
    }

    #[inline]
    pub fn is_foreground(&self, x: u32, y: u32) -> bool {
        self.buf[(x, y)].0[0] != 0
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, foreground: bool) {
        self.buf[(x, y)] = image::Luma([if foreground { FOREGROUND } else { 0 }]);
    }

    /// Resets every pixel to background.
    pub fn clear(&mut self) {
        self.buf.fill(0);
    }

    /// The raw mask bytes in raster order.
    #[inline]
    pub fn as_raw(&self) -> &[u8] {
        self.buf.as_raw()
    }

    /// Dumps the mask as a grayscale PNG, for debugging.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        self.buf.save(path)?;
        Ok(())
    }
}

/// Thresholds depth frames into an internally owned, reused [`Mask`].
pub struct Thresholder {
    mask: Mask,
}

impl Thresholder {
    pub fn new(resolution: Resolution) -> Self {
        Self {
            mask: Mask::new(resolution),
        }
    }

    /// Thresholds `depth` against `window` inside `roi`.
    ///
    /// The mask is zeroed first; only pixels inside `roi` clamped to the
    /// frame bounds are ever written, so everything outside stays
    /// background. The mask buffer is reused across calls and reallocated
    /// only when the frame resolution changes.
    pub fn apply(&mut self, depth: &DepthFrame, window: DepthWindow, roi: Rect) -> &Mask {
        if self.mask.resolution() != depth.resolution() {
            self.mask = Mask::new(depth.resolution());
        }
        self.mask.clear();

        let Some(clamped) = roi.intersection(&depth.rect()) else {
            return &self.mask;
        };

        for y in clamped.y()..clamped.bottom() {
            let row = depth.row(y as u32);
            for x in clamped.x()..clamped.right() {
                if window.contains(row[x as usize]) {
                    self.mask.set(x as u32, y as u32, true);
                }
            }
        }

        &self.mask
    }

    /// The mask produced by the last [`apply`][Self::apply].
    #[inline]
    pub fn mask(&self) -> &Mask {
        &self.mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolution::Resolution;

    fn uniform_frame(depth: u16) -> DepthFrame {
        let res = Resolution::new(16, 16);
        DepthFrame::from_vec(res, vec![depth; res.num_pixels()]).unwrap()
    }

    #[test]
    fn window_bounds_are_exclusive() {
        let window = DepthWindow::new(1000, 1200);
        assert!(!window.contains(1000));
        assert!(window.contains(1001));
        assert!(window.contains(1199));
        assert!(!window.contains(1200));
        assert!(!window.contains(0));
    }

    #[test]
    fn window_around_saturates() {
        let low = DepthWindow::around(50.0, 80.0);
        assert_eq!(low.min, 0);
        assert_eq!(low.max, 130);

        let high = DepthWindow::around(65_500.0, 80.0);
        assert_eq!(high.max, u16::MAX);
    }

    #[test]
    fn outside_roi_stays_background() {
        let frame = uniform_frame(1100);
        let mut thresholder = Thresholder::new(frame.resolution());
        let roi = Rect::from_top_left(4, 4, 4, 4);
        let mask = thresholder.apply(&frame, DepthWindow::new(1000, 1200), roi);

        for y in 0..16 {
            for x in 0..16 {
                let expected = roi.contains(x as i32, y as i32);
                assert_eq!(mask.is_foreground(x, y), expected, "at ({x},{y})");
            }
        }
    }

    #[test]
    fn roi_is_clamped_to_frame() {
        let frame = uniform_frame(1100);
        let mut thresholder = Thresholder::new(frame.resolution());
        let roi = Rect::from_top_left(-10, -10, 14, 14);
        let mask = thresholder.apply(&frame, DepthWindow::new(1000, 1200), roi);

        assert!(mask.is_foreground(0, 0));
        assert!(mask.is_foreground(3, 3));
        assert!(!mask.is_foreground(4, 4));
    }

    #[test]
    fn disjoint_roi_yields_empty_mask() {
        let frame = uniform_frame(1100);
        let mut thresholder = Thresholder::new(frame.resolution());
        let roi = Rect::from_top_left(100, 100, 8, 8);
        let mask = thresholder.apply(&frame, DepthWindow::new(1000, 1200), roi);
        assert!(mask.as_raw().iter().all(|&b| b == 0));
    }

    #[test]
    fn mask_is_rezeroed_between_frames() {
        let mut thresholder = Thresholder::new(Resolution::new(16, 16));
        let window = DepthWindow::new(1000, 1200);

        let frame = uniform_frame(1100);
        thresholder.apply(&frame, window, frame.rect());

        let empty = uniform_frame(0);
        let mask = thresholder.apply(&empty, window, empty.rect());
        assert!(mask.as_raw().iter().all(|&b| b == 0));
    }
}
