//! Owned per-frame buffers delivered by the camera driver.
//!
//! This module provides:
//!
//! - [`DepthFrame`], a row-major `u16` depth map in millimeters.
//! - [`ColorFrame`], the paired RGB24 image.
//! - [`LabelFrame`], the per-pixel scene-segmentation labels.
//! - [`FrameSet`], one synchronized snapshot of all three.
//!
//! All accessors are bounds checked; buffer walks go through `(x, y)` to
//! linear-offset helpers with the stride computed from the resolution.

use anyhow::ensure;
use image::RgbImage;

use crate::{rect::Rect, resolution::Resolution};

/// Depth value denoting "no reading" (shadow or out of sensor range).
pub const INVALID_DEPTH: u16 = 0;

/// A row-major map of 16-bit depth samples in millimeters.
///
/// A sample of [`INVALID_DEPTH`] is never a valid distance.
#[derive(Clone)]
pub struct DepthFrame {
    resolution: Resolution,
    data: Vec<u16>,
}

impl DepthFrame {
    /// Wraps a raw depth buffer.
    ///
    /// Returns an error if `data` does not hold exactly one sample per pixel
    /// of `resolution`.
    pub fn from_vec(resolution: Resolution, data: Vec<u16>) -> anyhow::Result<Self> {
        ensure!(
            data.len() == resolution.num_pixels(),
            "depth buffer holds {} samples, expected {} for {}",
            data.len(),
            resolution.num_pixels(),
            resolution,
        );
        Ok(Self { resolution, data })
    }

    /// Creates a frame with every sample set to [`INVALID_DEPTH`].
    pub fn empty(resolution: Resolution) -> Self {
        Self {
            resolution,
            data: vec![INVALID_DEPTH; resolution.num_pixels()],
        }
    }

    #[inline]
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Returns a [`Rect`] covering this frame, positioned at `(0, 0)`.
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_top_left(0, 0, self.resolution.width(), self.resolution.height())
    }

    /// Returns the depth sample at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the frame.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u16 {
        assert!(x < self.resolution.width() && y < self.resolution.height());
        self.data[(y * self.resolution.width() + x) as usize]
    }

    /// Sets the depth sample at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the frame.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, depth: u16) {
        assert!(x < self.resolution.width() && y < self.resolution.height());
        self.data[(y * self.resolution.width() + x) as usize] = depth;
    }

    /// Returns the row of samples at `y`.
    #[inline]
    pub fn row(&self, y: u32) -> &[u16] {
        let w = self.resolution.width() as usize;
        &self.data[y as usize * w..][..w]
    }

    /// Returns all samples in raster order.
    #[inline]
    pub fn samples(&self) -> &[u16] {
        &self.data
    }
}

/// An RGB24 color image on the same pixel grid as the depth map.
#[derive(Clone)]
pub struct ColorFrame {
    buf: RgbImage,
}

impl ColorFrame {
    /// Wraps a raw RGB24 buffer (3 bytes per pixel, row-major).
    ///
    /// Returns an error if `data` does not hold exactly 3 bytes per pixel of
    /// `resolution`.
    pub fn from_raw(resolution: Resolution, data: Vec<u8>) -> anyhow::Result<Self> {
        ensure!(
            data.len() == resolution.num_pixels() * 3,
            "color buffer holds {} bytes, expected {} for {}",
            data.len(),
            resolution.num_pixels() * 3,
            resolution,
        );
        let buf = RgbImage::from_raw(resolution.width(), resolution.height(), data)
            .expect("buffer length was just validated");
        Ok(Self { buf })
    }

    /// Creates an all-black color frame.
    pub fn black(resolution: Resolution) -> Self {
        Self {
            buf: RgbImage::new(resolution.width(), resolution.height()),
        }
    }

    #[inline]
    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.buf.width(), self.buf.height())
    }

    /// Returns the `[r, g, b]` triplet at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the frame.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> [u8; 3] {
        self.buf[(x, y)].0
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        self.buf[(x, y)] = image::Rgb(rgb);
    }
}

/// Per-pixel scene-segmentation labels (0 = background).
#[derive(Clone)]
pub struct LabelFrame {
    resolution: Resolution,
    data: Vec<u16>,
}

impl LabelFrame {
    /// Wraps a raw label buffer.
    pub fn from_vec(resolution: Resolution, data: Vec<u16>) -> anyhow::Result<Self> {
        ensure!(
            data.len() == resolution.num_pixels(),
            "label buffer holds {} samples, expected {} for {}",
            data.len(),
            resolution.num_pixels(),
            resolution,
        );
        Ok(Self { resolution, data })
    }

    #[inline]
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u16 {
        assert!(x < self.resolution.width() && y < self.resolution.height());
        self.data[(y * self.resolution.width() + x) as usize]
    }

    #[inline]
    pub fn labels(&self) -> &[u16] {
        &self.data
    }
}

/// One synchronized snapshot of depth, color and (optionally) scene labels.
pub struct FrameSet {
    pub frame_id: u64,
    pub depth: DepthFrame,
    pub color: ColorFrame,
    pub labels: Option<LabelFrame>,
}
