//! Per-frame orchestration of the perception components.
//!
//! [`FramePipeline`] owns the camera model, the point-cloud projector, the
//! depth histogram and the hand tracker, and runs them in order over one
//! [`FrameSet`]. It is driven either directly (handy in tests and
//! single-threaded hosts) or by a [`session`](crate::session) worker
//! thread.

use crate::{
    camera::CameraModel,
    cloud::{PointCloudProjector, Vertex},
    frame::FrameSet,
    hand::{
        tracking::{HandEventSender, HandTracker},
        HandData,
    },
    histogram::DepthHistogram,
    timer::Timer,
};

/// Everything the presentation layer needs from one processed frame.
///
/// The buffers inside are plain `Vec`s so a consumer can hold on to an
/// output while the next frame is being produced; sessions recycle spent
/// outputs to avoid per-frame allocation.
#[derive(Default)]
pub struct FrameOutput {
    pub frame_id: u64,
    /// One vertex per depth pixel, raster order. See [`Vertex`].
    pub vertices: Vec<Vertex>,
    /// Visualization intensity per depth bucket; index with a raw depth
    /// value (0 for invalid depth).
    pub intensities: Vec<u16>,
    /// Geometry of every active hand.
    pub hands: Vec<HandData>,
}

/// Runs the full perception pipeline over successive frames.
pub struct FramePipeline {
    model: CameraModel,
    projector: PointCloudProjector,
    histogram: DepthHistogram,
    tracker: HandTracker,
    project_timer: Timer,
    track_timer: Timer,
}

impl FramePipeline {
    pub fn new(model: CameraModel) -> Self {
        Self {
            model,
            projector: PointCloudProjector::new(),
            histogram: DepthHistogram::new(),
            tracker: HandTracker::new(model),
            project_timer: Timer::new("project"),
            track_timer: Timer::new("track"),
        }
    }

    #[inline]
    pub fn model(&self) -> &CameraModel {
        &self.model
    }

    /// The point-cloud projector, for configuring scale and registration.
    #[inline]
    pub fn projector_mut(&mut self) -> &mut PointCloudProjector {
        &mut self.projector
    }

    /// The hand tracker driven by this pipeline.
    #[inline]
    pub fn tracker(&self) -> &HandTracker {
        &self.tracker
    }

    #[inline]
    pub fn tracker_mut(&mut self) -> &mut HandTracker {
        &mut self.tracker
    }

    /// Returns a handle for queueing hand lifecycle events from other
    /// threads.
    pub fn hand_events(&self) -> HandEventSender {
        self.tracker.event_sender()
    }

    /// Processes one frame, filling `out`.
    ///
    /// `out` is cleared and overwritten; passing a previously used output
    /// reuses its buffers.
    pub fn process(&mut self, frames: &FrameSet, out: &mut FrameOutput) {
        out.frame_id = frames.frame_id;

        {
            let _guard = self.project_timer.start();
            let vertices = self
                .projector
                .project(&self.model, &frames.depth, &frames.color);
            out.vertices.clear();
            out.vertices.extend_from_slice(vertices);
        }

        self.histogram.update(&frames.depth);
        self.histogram.intensity_lut(&mut out.intensities);

        self.track_timer.time(|| self.tracker.track(&frames.depth));
        out.hands.clear();
        out.hands.extend(self.tracker.hands().cloned());

        log::trace!(
            "frame {}: {}, {}",
            frames.frame_id,
            self.project_timer,
            self.track_timer
        );
    }
}
