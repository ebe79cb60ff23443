//! The camera model: calibration constants and coordinate conversions.
//!
//! Structured-light sensors report two calibration scalars, the *zero-plane
//! distance* (the reference depth, acting as a focal length proxy) and the
//! *zero-plane pixel size* (how many millimeters one pixel spans at that
//! reference depth). Together with the frame resolution they fully determine
//! the pinhole projection between projected coordinates (pixel x/y plus
//! depth) and real-world camera-space coordinates.

use nalgebra::{Matrix4, Point3};

use crate::resolution::Resolution;

/// Per-device calibration constants.
///
/// Read once from the device at session start and immutable afterwards.
#[derive(Debug, Clone, Copy)]
pub struct CameraIntrinsics {
    /// Zero-plane distance ("ZPD") in millimeters.
    pub zero_plane_distance: f32,
    /// Zero-plane pixel size ("ZPPS") in millimeters, as reported by the
    /// device for its full-resolution grid.
    pub zero_plane_pixel_size: f32,
    /// Focal length of the color camera in pixels.
    pub image_focal_length: f32,
    /// Affine transform aligning depth-camera space with color-camera space.
    pub depth_to_color: Matrix4<f32>,
}

impl CameraIntrinsics {
    /// Focal length of the color camera typically found on these devices.
    pub const DEFAULT_IMAGE_FOCAL_LENGTH: f32 = 525.0;

    /// Creates intrinsics from the two device-reported scalars.
    ///
    /// The color focal length defaults to
    /// [`DEFAULT_IMAGE_FOCAL_LENGTH`][Self::DEFAULT_IMAGE_FOCAL_LENGTH] and
    /// the depth-to-color transform to the small lateral offset between the
    /// two cameras measured on common hardware. Both fields are public and
    /// can be overridden with proper calibration data.
    pub fn new(zero_plane_distance: f32, zero_plane_pixel_size: f32) -> Self {
        Self {
            zero_plane_distance,
            zero_plane_pixel_size,
            image_focal_length: Self::DEFAULT_IMAGE_FOCAL_LENGTH,
            depth_to_color: Matrix4::new_translation(&nalgebra::Vector3::new(35.0, -15.0, 0.0)),
        }
    }

    /// Focal length of the depth camera in pixels:
    /// `zero_plane_distance / (zero_plane_pixel_size * 2)`.
    ///
    /// The factor 2 accounts for the device reporting the pixel size for its
    /// full-resolution grid while depth maps are produced at half
    /// resolution.
    #[inline]
    pub fn focal_length(&self) -> f32 {
        self.zero_plane_distance / (self.zero_plane_pixel_size * 2.0)
    }
}

/// A position in projected coordinates: pixel x/y plus depth in millimeters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    pub x: f32,
    pub y: f32,
    pub depth: f32,
}

impl ProjectedPoint {
    pub fn new(x: f32, y: f32, depth: f32) -> Self {
        Self { x, y, depth }
    }
}

/// [`CameraIntrinsics`] bound to a depth-map [`Resolution`].
///
/// Caches the principal point (the frame center) so that per-pixel
/// conversions only do arithmetic.
#[derive(Debug, Clone, Copy)]
pub struct CameraModel {
    intrinsics: CameraIntrinsics,
    resolution: Resolution,
    center_x: f32,
    center_y: f32,
}

impl CameraModel {
    pub fn new(intrinsics: CameraIntrinsics, resolution: Resolution) -> Self {
        Self {
            intrinsics,
            resolution,
            center_x: resolution.width() as f32 / 2.0,
            center_y: resolution.height() as f32 / 2.0,
        }
    }

    #[inline]
    pub fn intrinsics(&self) -> &CameraIntrinsics {
        &self.intrinsics
    }

    #[inline]
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Depth-camera focal length in pixels.
    #[inline]
    pub fn focal_length(&self) -> f32 {
        self.intrinsics.focal_length()
    }

    /// Millimeters spanned by one pixel at `depth` millimeters from the
    /// camera.
    #[inline]
    pub fn pixel_size(&self, depth: f32) -> f32 {
        depth / self.focal_length()
    }

    /// Converts a projected position to real-world camera space.
    ///
    /// Image rows grow downward while world Y grows upward, so the Y axis
    /// flips. A zero-depth input maps to the origin without dividing by
    /// anything.
    pub fn projected_to_real_world(&self, point: ProjectedPoint) -> Point3<f32> {
        let pixel_size = self.pixel_size(point.depth);
        Point3::new(
            (point.x - self.center_x) * pixel_size,
            (self.center_y - point.y) * pixel_size,
            point.depth,
        )
    }

    /// Converts a real-world camera-space position to projected coordinates.
    ///
    /// Returns `None` for points at or behind the camera plane (z ≤ 0),
    /// which have no projection.
    pub fn real_world_to_projected(&self, point: Point3<f32>) -> Option<ProjectedPoint> {
        if point.z <= 0.0 {
            return None;
        }

        let scale = self.focal_length() / point.z;
        Some(ProjectedPoint {
            x: self.center_x + point.x * scale,
            y: self.center_y - point.y * scale,
            depth: point.z,
        })
    }

    /// Maps a real-world point from depth-camera space into color-camera
    /// space.
    pub fn depth_to_color(&self, point: Point3<f32>) -> Point3<f32> {
        self.intrinsics.depth_to_color.transform_point(&point)
    }

    /// Projects a color-camera-space point onto the color image using the
    /// color camera's focal length.
    ///
    /// Returns `None` for z ≤ 0.
    pub fn color_space_to_pixel(&self, point: Point3<f32>) -> Option<(f32, f32)> {
        if point.z <= 0.0 {
            return None;
        }

        let scale = self.intrinsics.image_focal_length / point.z;
        Some((
            self.center_x + point.x * scale,
            self.center_y - point.y * scale,
        ))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn model() -> CameraModel {
        // Typical values reported by a structured-light sensor.
        CameraModel::new(CameraIntrinsics::new(120.0, 0.1042), Resolution::RES_VGA)
    }

    #[test]
    fn focal_length_formula() {
        let m = model();
        assert_relative_eq!(m.focal_length(), 120.0 / (0.1042 * 2.0));
    }

    #[test]
    fn principal_point_maps_to_axis() {
        let m = model();
        let world = m.projected_to_real_world(ProjectedPoint::new(320.0, 240.0, 1000.0));
        assert_relative_eq!(world.x, 0.0);
        assert_relative_eq!(world.y, 0.0);
        assert_relative_eq!(world.z, 1000.0);
    }

    #[test]
    fn y_axis_flips() {
        let m = model();
        // A pixel below the center has negative world Y.
        let world = m.projected_to_real_world(ProjectedPoint::new(320.0, 300.0, 1000.0));
        assert!(world.y < 0.0);
        // A pixel right of the center has positive world X.
        let world = m.projected_to_real_world(ProjectedPoint::new(400.0, 240.0, 1000.0));
        assert!(world.x > 0.0);
    }

    #[test]
    fn round_trip() {
        let m = model();
        for &(x, y, z) in &[
            (0.0, 0.0, 500.0),
            (123.0, -45.0, 800.0),
            (-200.5, 310.25, 2500.0),
            (1.0, 1.0, 9999.0),
        ] {
            let p = Point3::new(x, y, z);
            let projected = m.real_world_to_projected(p).unwrap();
            let back = m.projected_to_real_world(projected);
            assert_relative_eq!(back.x, p.x, max_relative = 1e-4);
            assert_relative_eq!(back.y, p.y, max_relative = 1e-4);
            assert_relative_eq!(back.z, p.z, max_relative = 1e-4);
        }
    }

    #[test]
    fn zero_depth_is_defined() {
        let m = model();
        assert_eq!(m.real_world_to_projected(Point3::new(10.0, 10.0, 0.0)), None);
        let world = m.projected_to_real_world(ProjectedPoint::new(100.0, 100.0, 0.0));
        assert_eq!(world, Point3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn depth_to_color_applies_transform() {
        let m = model();
        let mapped = m.depth_to_color(Point3::new(0.0, 0.0, 1000.0));
        assert_relative_eq!(mapped.x, 35.0);
        assert_relative_eq!(mapped.y, -15.0);
        assert_relative_eq!(mapped.z, 1000.0);
    }
}
