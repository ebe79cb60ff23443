//! Depth-to-point-cloud projection.
//!
//! Converts a depth/color frame pair into a dense vertex buffer for the
//! rendering layer: one vertex per depth pixel in raster order, so the pixel
//! grid topology survives and the renderer can build point or mesh
//! primitives without an index remap. Invalid pixels keep their slot with a
//! sentinel vertex instead of being compacted away.

use crate::{
    camera::{CameraModel, ProjectedPoint},
    frame::{ColorFrame, DepthFrame, INVALID_DEPTH},
};

/// One point-cloud vertex: camera-space position and RGBA color, both as
/// float quadruplets (32 bytes total, matching typical renderer vertex
/// strides).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// `[x, y, z, 1]` for valid samples, all zero for invalid ones.
    pub position: [f32; 4],
    /// `[r, g, b, 1]` normalized to `0..=1`, all zero for invalid samples.
    pub color: [f32; 4],
}

impl Vertex {
    /// The sentinel emitted for pixels without a depth reading.
    pub const INVALID: Self = Self {
        position: [0.0; 4],
        color: [0.0; 4],
    };

    /// Whether this vertex carries a real sample.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.position[3] != 0.0
    }
}

/// Projects depth/color frames into an internally owned, reused vertex
/// buffer.
pub struct PointCloudProjector {
    world_scale: f32,
    registered_color: bool,
    vertices: Vec<Vertex>,
}

impl PointCloudProjector {
    /// Default position scale: depth samples are millimeters, rendering
    /// wants centimeters.
    pub const DEFAULT_WORLD_SCALE: f32 = 0.1;

    pub fn new() -> Self {
        Self {
            world_scale: Self::DEFAULT_WORLD_SCALE,
            registered_color: true,
            vertices: Vec::new(),
        }
    }

    /// Sets the scale applied to vertex positions (and nothing else).
    pub fn set_world_scale(&mut self, scale: f32) {
        self.world_scale = scale;
    }

    /// Declares whether the color stream is already registered to the depth
    /// pixel grid.
    ///
    /// When it is not, each valid depth sample is mapped through the camera
    /// model's depth-to-color transform and the color image is sampled at
    /// the reprojected position instead of the same pixel index.
    pub fn set_registered_color(&mut self, registered: bool) {
        self.registered_color = registered;
    }

    /// Projects one frame pair, returning the filled vertex buffer.
    ///
    /// The output always holds exactly `width * height` vertices in raster
    /// order (row-major, origin top-left). The buffer is reused between
    /// calls; it only reallocates when the resolution changes.
    ///
    /// # Panics
    ///
    /// Panics if the depth and color resolutions differ, or if `model` was
    /// built for a different resolution. Sessions validate this once at
    /// startup.
    pub fn project(
        &mut self,
        model: &CameraModel,
        depth: &DepthFrame,
        color: &ColorFrame,
    ) -> &[Vertex] {
        assert_eq!(depth.resolution(), color.resolution());
        assert_eq!(depth.resolution(), model.resolution());

        let res = depth.resolution();
        self.vertices.clear();
        self.vertices.reserve(res.num_pixels());

        let scale = self.world_scale;
        for y in 0..res.height() {
            let row = depth.row(y);
            for x in 0..res.width() {
                let d = row[x as usize];
                if d == INVALID_DEPTH {
                    self.vertices.push(Vertex::INVALID);
                    continue;
                }

                let world =
                    model.projected_to_real_world(ProjectedPoint::new(x as f32, y as f32, d as f32));
                let rgb = if self.registered_color {
                    color.get(x, y)
                } else {
                    match model.color_space_to_pixel(model.depth_to_color(world)) {
                        Some((cx, cy)) => {
                            let cx = (cx.round() as i64).clamp(0, i64::from(res.width()) - 1);
                            let cy = (cy.round() as i64).clamp(0, i64::from(res.height()) - 1);
                            color.get(cx as u32, cy as u32)
                        }
                        None => color.get(x, y),
                    }
                };

                self.vertices.push(Vertex {
                    position: [world.x * scale, world.y * scale, world.z * scale, 1.0],
                    color: [
                        rgb[0] as f32 / 255.0,
                        rgb[1] as f32 / 255.0,
                        rgb[2] as f32 / 255.0,
                        1.0,
                    ],
                });
            }
        }

        &self.vertices
    }

    /// The vertex buffer filled by the last [`project`][Self::project].
    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }
}

impl Default for PointCloudProjector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::Matrix4;

    use super::*;
    use crate::{camera::CameraIntrinsics, resolution::Resolution};

    const RES: Resolution = Resolution::RES_QVGA;

    fn intrinsics() -> CameraIntrinsics {
        // focal length = 100 / (0.1 * 2) = 500 pixels
        let mut intr = CameraIntrinsics::new(100.0, 0.1);
        intr.image_focal_length = 500.0;
        intr.depth_to_color = Matrix4::identity();
        intr
    }

    fn model() -> CameraModel {
        CameraModel::new(intrinsics(), RES)
    }

    #[test]
    fn invalid_pixels_keep_their_slot() {
        let mut depth = DepthFrame::empty(RES);
        depth.set(10, 10, 1000);

        let mut projector = PointCloudProjector::new();
        let vertices = projector.project(&model(), &depth, &ColorFrame::black(RES));

        assert_eq!(vertices.len(), RES.num_pixels());
        assert_eq!(vertices[0], Vertex::INVALID);
        assert!(!vertices[0].is_valid());

        let v = vertices[(10 * RES.width() + 10) as usize];
        assert!(v.is_valid());
    }

    #[test]
    fn projection_matches_camera_model() {
        let mut depth = DepthFrame::empty(RES);
        depth.set(200, 60, 2000);

        let mut projector = PointCloudProjector::new();
        projector.set_world_scale(1.0);
        let vertices = projector.project(&model(), &depth, &ColorFrame::black(RES));

        let v = vertices[(60 * RES.width() + 200) as usize];
        // (200 - 160) pixels right of center, (120 - 60) rows above center,
        // pixel size 2000/500 = 4 mm.
        assert_relative_eq!(v.position[0], 40.0 * 4.0);
        assert_relative_eq!(v.position[1], 60.0 * 4.0);
        assert_relative_eq!(v.position[2], 2000.0);
        assert_relative_eq!(v.position[3], 1.0);
    }

    #[test]
    fn world_scale_touches_positions_only() {
        let mut depth = DepthFrame::empty(RES);
        depth.set(160, 120, 1000);
        let mut color = ColorFrame::black(RES);
        color.set(160, 120, [255, 128, 0]);

        let mut projector = PointCloudProjector::new();
        let vertices = projector.project(&model(), &depth, &color);
        let v = vertices[(120 * RES.width() + 160) as usize];

        assert_relative_eq!(v.position[2], 100.0); // 1000 mm -> 100 cm
        assert_relative_eq!(v.color[0], 1.0);
        assert_relative_eq!(v.color[1], 128.0 / 255.0);
        assert_relative_eq!(v.color[2], 0.0);
        assert_relative_eq!(v.color[3], 1.0);
    }

    #[test]
    fn unregistered_color_samples_through_transform() {
        let mut depth = DepthFrame::empty(RES);
        depth.set(160, 120, 1000);

        let mut color = ColorFrame::black(RES);
        // 4 mm lateral offset at 1000 mm with a 500 px focal length lands
        // 2 pixels to the right.
        color.set(162, 120, [10, 20, 30]);

        let mut intr = intrinsics();
        intr.depth_to_color = Matrix4::new_translation(&nalgebra::Vector3::new(4.0, 0.0, 0.0));
        let model = CameraModel::new(intr, RES);

        let mut projector = PointCloudProjector::new();
        projector.set_registered_color(false);
        let vertices = projector.project(&model, &depth, &color);

        let v = vertices[(120 * RES.width() + 160) as usize];
        assert_relative_eq!(v.color[0], 10.0 / 255.0);
        assert_relative_eq!(v.color[1], 20.0 / 255.0);
        assert_relative_eq!(v.color[2], 30.0 / 255.0);
    }

    #[test]
    fn buffer_is_reused_across_frames() {
        let mut depth = DepthFrame::empty(RES);
        depth.set(5, 5, 700);

        let mut projector = PointCloudProjector::new();
        projector.project(&model(), &depth, &ColorFrame::black(RES));
        let first = projector.vertices()[(5 * RES.width() + 5) as usize];
        assert!(first.is_valid());

        depth.set(5, 5, INVALID_DEPTH);
        projector.project(&model(), &depth, &ColorFrame::black(RES));
        assert_eq!(projector.vertices().len(), RES.num_pixels());
        assert_eq!(
            projector.vertices()[(5 * RES.width() + 5) as usize],
            Vertex::INVALID
        );
    }
}
