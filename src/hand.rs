//! Hand lifecycle events and tracked-hand geometry.
//!
//! The camera driver's gesture subsystem reports when a hand appears, moves,
//! or disappears; [`tracking::HandTracker`] turns those notifications plus
//! the raw depth stream into per-hand blob geometry.

pub mod tracking;

use nalgebra::Point3;

use crate::{camera::ProjectedPoint, rect::Rect};

/// ID assigned to a hand by the camera driver.
///
/// IDs are stable for as long as the driver keeps tracking the hand and may
/// be reused after the hand is lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandId(pub u32);

/// A lifecycle notification from the camera driver.
///
/// Events may be produced on an arbitrary thread; they are queued and only
/// consumed at frame boundaries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HandEvent {
    /// The driver started tracking a new hand at a real-world position (mm).
    Create { id: HandId, position: Point3<f32> },
    /// A known hand moved.
    Update { id: HandId, position: Point3<f32> },
    /// The driver lost the hand.
    Destroy { id: HandId },
}

/// Geometry of one tracked hand.
///
/// The convex hull and areas refresh whenever a candidate blob is found;
/// frames without a candidate leave them at their previous values.
#[derive(Debug, Clone, PartialEq)]
pub struct HandData {
    pub(crate) id: HandId,
    pub(crate) real_world: Point3<f32>,
    pub(crate) projected: ProjectedPoint,
    pub(crate) bounding_box: Rect,
    pub(crate) convex_hull: Vec<(i32, i32)>,
    pub(crate) hull_area: f64,
    pub(crate) blob_area: u32,
}

impl HandData {
    #[inline]
    pub fn id(&self) -> HandId {
        self.id
    }

    /// Last reported real-world position in millimeters.
    #[inline]
    pub fn real_world_position(&self) -> Point3<f32> {
        self.real_world
    }

    /// The real-world position projected onto the depth image.
    #[inline]
    pub fn projected_position(&self) -> ProjectedPoint {
        self.projected
    }

    /// Expected hand bounding box in projected pixels.
    #[inline]
    pub fn bounding_box(&self) -> Rect {
        self.bounding_box
    }

    /// Convex hull of the matched blob's boundary points (closed polygon).
    ///
    /// Empty until a candidate blob has been matched.
    #[inline]
    pub fn convex_hull(&self) -> &[(i32, i32)] {
        &self.convex_hull
    }

    /// Area enclosed by [`convex_hull`][Self::convex_hull], in pixels.
    #[inline]
    pub fn hull_area(&self) -> f64 {
        self.hull_area
    }

    /// Foreground pixel count of the matched blob.
    #[inline]
    pub fn blob_area(&self) -> u32 {
        self.blob_area
    }

    /// Fraction of the hull area covered by blob pixels.
    ///
    /// An open hand leaves large concave gaps between the fingers, so its
    /// ratio is low; a fist fills its hull almost completely. Comparing this
    /// against a threshold gives a simple open/closed heuristic. Returns
    /// `None` until a non-degenerate hull has been computed.
    pub fn fill_ratio(&self) -> Option<f64> {
        if self.hull_area == 0.0 {
            None
        } else {
            Some(f64::from(self.blob_area) / self.hull_area)
        }
    }
}
