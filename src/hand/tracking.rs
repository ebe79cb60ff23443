//! Per-frame hand tracking over the depth stream.
//!
//! For every active hand, the tracker thresholds the depth frame inside a
//! window around the hand's last known position, extracts blobs, picks the
//! one containing the hand pixel, and fits its convex hull. All expected
//! sizes scale with distance: a hand close to the sensor covers far more
//! pixels than the same hand two meters out.

use std::collections::BTreeMap;

use crossbeam::channel::{Receiver, Sender};

use crate::{
    blob::{BlobExtractor, BlobOrder},
    camera::CameraModel,
    frame::DepthFrame,
    hull::{convex_hull, polygon_area},
    rect::Rect,
    threshold::{DepthWindow, Thresholder},
};

use super::{HandData, HandEvent, HandId};

/// Queues [`HandEvent`]s for a [`HandTracker`] from any thread.
#[derive(Clone, Debug)]
pub struct HandEventSender {
    sender: Sender<HandEvent>,
}

impl HandEventSender {
    /// Enqueues an event.
    ///
    /// The event takes effect at the next frame boundary. If the tracker has
    /// been dropped the event is discarded.
    pub fn send(&self, event: HandEvent) {
        self.sender.send(event).ok();
    }
}

/// Tracks hand geometry across frames.
///
/// Owned by the frame loop; lifecycle notifications arrive through a
/// [`HandEventSender`] and are drained once per [`track`][Self::track] call,
/// never mid-computation. Scratch buffers (threshold mask, blob labels, edge
/// point lists) are owned by the tracker and reset between hands, so the
/// per-hand pipelines never share state.
pub struct HandTracker {
    model: CameraModel,
    hands: BTreeMap<HandId, HandData>,
    events: Receiver<HandEvent>,
    event_sender: Sender<HandEvent>,
    thresholder: Thresholder,
    extractor: BlobExtractor,
    left_edge: Vec<(i32, i32)>,
    right_edge: Vec<(i32, i32)>,
    edge_points: Vec<(i32, i32)>,
}

impl HandTracker {
    /// Half-extent of the depth window around the hand's Z, in millimeters.
    pub const DEPTH_WINDOW_MM: f32 = 80.0;

    /// Expected real-world extent of a hand, in millimeters.
    pub const HAND_EXTENT_MM: f32 = 240.0;

    /// Minimum real-world extent a blob must span to be a hand candidate.
    pub const MIN_BLOB_EXTENT_MM: f32 = 60.0;

    pub fn new(model: CameraModel) -> Self {
        let (event_sender, events) = crossbeam::channel::unbounded();
        let mut extractor = BlobExtractor::new();
        extractor.set_coupled_size_filtering(true);
        extractor.set_order(BlobOrder::Size);

        Self {
            model,
            hands: BTreeMap::new(),
            events,
            event_sender,
            thresholder: Thresholder::new(model.resolution()),
            extractor,
            left_edge: Vec::new(),
            right_edge: Vec::new(),
            edge_points: Vec::new(),
        }
    }

    /// Returns a handle for queueing lifecycle events from other threads.
    pub fn event_sender(&self) -> HandEventSender {
        HandEventSender {
            sender: self.event_sender.clone(),
        }
    }

    /// Applies a lifecycle event immediately.
    ///
    /// Create and update both upsert: the hand's real-world position is
    /// stored and reprojected onto the depth image. Events whose position
    /// cannot be projected (z ≤ 0) are dropped; the driver occasionally
    /// reports such positions while losing a hand.
    pub fn apply_event(&mut self, event: HandEvent) {
        match event {
            HandEvent::Create { id, position } | HandEvent::Update { id, position } => {
                let Some(projected) = self.model.real_world_to_projected(position) else {
                    log::warn!("dropping {:?} event with unprojectable position {position:?}", id);
                    return;
                };

                let hand = self.hands.entry(id).or_insert_with(|| {
                    log::debug!(
                        "new hand {:?} @ ({:.1},{:.1},{:.1})",
                        id,
                        position.x,
                        position.y,
                        position.z
                    );
                    HandData {
                        id,
                        real_world: position,
                        projected,
                        bounding_box: Rect::from_top_left(0, 0, 0, 0),
                        convex_hull: Vec::new(),
                        hull_area: 0.0,
                        blob_area: 0,
                    }
                });
                hand.real_world = position;
                hand.projected = projected;
            }
            HandEvent::Destroy { id } => {
                log::debug!("lost hand {:?}", id);
                self.hands.remove(&id);
            }
        }
    }

    /// Drains all queued events.
    pub fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.apply_event(event);
        }
    }

    /// Runs the per-frame pipeline.
    ///
    /// Queued lifecycle events are drained first; with no active hand
    /// afterwards, no thresholding or blob work happens at all. Each active
    /// hand is processed independently. A frame in which no blob contains
    /// the hand pixel leaves that hand's hull and areas at their previous
    /// values.
    pub fn track(&mut self, depth: &DepthFrame) {
        self.drain_events();
        if self.hands.is_empty() {
            return;
        }

        let Self {
            model,
            hands,
            thresholder,
            extractor,
            left_edge,
            right_edge,
            edge_points,
            ..
        } = self;

        for hand in hands.values_mut() {
            let window = DepthWindow::around(hand.real_world.z, Self::DEPTH_WINDOW_MM);

            // Real-world-to-projected scale at the hand's depth, in pixels
            // per millimeter.
            let r2p = model.focal_length() / hand.projected.depth;
            let extent = (Self::HAND_EXTENT_MM * r2p) as u32;
            let bbox = Rect::from_center(
                hand.projected.x as i32,
                hand.projected.y as i32,
                extent,
                extent,
            );
            hand.bounding_box = bbox;

            let mask = thresholder.apply(depth, window, bbox);

            let min_extent = (Self::MIN_BLOB_EXTENT_MM * r2p) as u32;
            extractor.set_min_size(min_extent, min_extent);
            extractor.process(mask);

            let (px, py) = (hand.projected.x as i32, hand.projected.y as i32);
            let Some(blob) = extractor.blobs().iter().find(|b| b.rect().contains(px, py))
            else {
                continue;
            };

            extractor.collect_edges(blob, left_edge, right_edge);
            edge_points.clear();
            edge_points.extend_from_slice(left_edge);
            edge_points.extend_from_slice(right_edge);

            let hull = convex_hull(edge_points);
            hand.hull_area = polygon_area(&hull);
            hand.convex_hull = hull;
            hand.blob_area = blob.area();
        }
    }

    /// Returns an iterator over the tracking data for each active hand.
    pub fn hands(&self) -> impl Iterator<Item = &HandData> {
        self.hands.values()
    }

    /// Returns the tracking data for one hand id.
    pub fn get(&self, id: HandId) -> Option<&HandData> {
        self.hands.get(&id)
    }
}
