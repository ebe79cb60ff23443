//! Types for representing frame resolutions.

use std::fmt;

/// Resolution (`width x height`) of a depth, color, or label frame.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    width: u32,
    height: u32,
}

impl Resolution {
    /// VGA resolution: `640x480`, the native mode of most structured-light
    /// sensors.
    pub const RES_VGA: Self = Self {
        width: 640,
        height: 480,
    };

    /// QVGA resolution: `320x240`.
    pub const RES_QVGA: Self = Self {
        width: 320,
        height: 240,
    };

    /// Creates a new [`Resolution`] of `width x height`.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns the width of this [`Resolution`].
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of this [`Resolution`].
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn num_pixels(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl fmt::Debug for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_num_pixels() {
        assert_eq!(Resolution::RES_VGA.num_pixels(), 640 * 480);
        assert_eq!(Resolution::new(0, 480).num_pixels(), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(Resolution::RES_VGA.to_string(), "640x480");
    }
}
