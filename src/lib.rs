//! Grasp depth-camera perception library.
//!
//! Grasp consumes synchronized depth, RGB and scene-label frames from a
//! structured-light depth camera and turns them into renderable data: a
//! camera-space 3D point cloud, a perceptually normalized depth
//! visualization, and per-hand blob geometry (bounding box, convex hull,
//! areas) suitable for gesture heuristics.
//!
//! # 3D Coordinates
//!
//! Camera-space coordinates have X pointing to the right, Y pointing up, and
//! Z pointing from the camera into the scene. Depth samples are millimeters;
//! the point-cloud projector can rescale positions (and only positions) for
//! rendering.
//!
//! Depth value 0 means "no reading" (shadow or out of range). It is never a
//! valid distance and every component of this crate excludes it from
//! statistics and geometry.
//!
//! # Environment Variables
//!
//! Logging is configured through the usual `RUST_LOG` variable when
//! [`init_logger!`] is used.

use log::LevelFilter;

pub mod blob;
pub mod camera;
pub mod cloud;
pub mod frame;
pub mod hand;
pub mod histogram;
pub mod hull;
pub mod pipeline;
pub mod rect;
pub mod resolution;
pub mod scene;
pub mod session;
pub mod threshold;
pub mod timer;

/// macro-use only, not part of public API.
#[doc(hidden)]
pub fn init_logger(calling_crate: &'static str) {
    let log_level = LevelFilter::Debug;
    env_logger::Builder::new()
        .filter(Some(calling_crate), log_level)
        .filter(Some(env!("CARGO_PKG_NAME")), log_level)
        .parse_default_env()
        .try_init()
        .ok();
}

/// Initializes logging to *stderr*.
///
/// The calling crate and grasp will log at *debug* level; `RUST_LOG` can
/// override this.
///
/// If a global logger is already registered, this macro will do nothing.
#[macro_export]
macro_rules! init_logger {
    () => {
        $crate::init_logger(env!("CARGO_CRATE_NAME"))
    };
}
