//! Scene-segmentation visualization.
//!
//! Maps per-pixel scene labels to a small fixed color palette so the UI
//! layer can overlay who-is-where on top of the depth view. Label 0 is
//! background and stays fully transparent.

use image::{Rgba, RgbaImage};

use crate::frame::LabelFrame;

/// The overlay palette, cycled by label id.
pub const PALETTE: [[u8; 4]; 10] = [
    [255, 0, 0, 255],    // red
    [0, 0, 255, 255],    // blue
    [0, 128, 0, 255],    // green
    [238, 130, 238, 255], // violet
    [255, 165, 0, 255],  // orange
    [255, 192, 203, 255], // pink
    [255, 0, 255, 255],  // magenta
    [0, 255, 0, 255],    // lime
    [255, 255, 0, 255],  // yellow
    [75, 0, 130, 255],   // indigo
];

/// Colorizes [`LabelFrame`]s into an internally owned, reused RGBA buffer.
pub struct SceneColorizer {
    out: RgbaImage,
}

impl SceneColorizer {
    pub fn new() -> Self {
        Self {
            out: RgbaImage::new(0, 0),
        }
    }

    /// Returns the color assigned to a label.
    #[inline]
    pub fn color_for(label: u16) -> [u8; 4] {
        if label == 0 {
            [0, 0, 0, 0]
        } else {
            PALETTE[label as usize % PALETTE.len()]
        }
    }

    /// Colorizes `labels`, returning the RGBA overlay image.
    ///
    /// The output buffer is reused across calls and reallocated only when
    /// the resolution changes.
    pub fn colorize(&mut self, labels: &LabelFrame) -> &RgbaImage {
        let res = labels.resolution();
        if (self.out.width(), self.out.height()) != (res.width(), res.height()) {
            self.out = RgbaImage::new(res.width(), res.height());
        }

        for (label, pixel) in labels.labels().iter().zip(self.out.pixels_mut()) {
            *pixel = Rgba(Self::color_for(*label));
        }

        &self.out
    }
}

impl Default for SceneColorizer {
    fn default() -> Self {
        Self::new()
    }
}
