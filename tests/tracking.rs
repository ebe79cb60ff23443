//! End-to-end scenarios over the full perception pipeline.

use nalgebra::Point3;

use grasp::blob::{BlobExtractor, BlobOrder};
use grasp::camera::{CameraIntrinsics, CameraModel};
use grasp::frame::{ColorFrame, DepthFrame, FrameSet};
use grasp::hand::{HandEvent, HandId};
use grasp::pipeline::{FrameOutput, FramePipeline};
use grasp::rect::Rect;
use grasp::resolution::Resolution;
use grasp::threshold::{DepthWindow, Thresholder};

const RES: Resolution = Resolution::RES_VGA;

/// Intrinsics giving a depth focal length of exactly 500 pixels.
fn intrinsics() -> CameraIntrinsics {
    CameraIntrinsics::new(100.0, 0.1)
}

fn fill(depth: &mut DepthFrame, rect: Rect, depth_mm: u16) {
    for y in rect.y()..rect.bottom() {
        for x in rect.x()..rect.right() {
            depth.set(x as u32, y as u32, depth_mm);
        }
    }
}

#[test]
fn single_block_threshold_and_extract() {
    // A lone 50x50 slab at 1.5 m; threshold bounds chosen around it and the
    // size filter below it must recover exactly that block.
    let mut depth = DepthFrame::empty(RES);
    let block = Rect::from_top_left(300, 220, 50, 50);
    fill(&mut depth, block, 1500);

    let mut thresholder = Thresholder::new(RES);
    let mask = thresholder.apply(&depth, DepthWindow::new(1400, 1600), depth.rect());

    let mut extractor = BlobExtractor::new();
    extractor.set_min_size(30, 30);
    extractor.set_coupled_size_filtering(true);
    extractor.set_order(BlobOrder::Size);
    extractor.process(mask);

    let blobs = extractor.blobs();
    assert_eq!(blobs.len(), 1);
    assert_eq!(blobs[0].rect(), block);
    assert_eq!(blobs[0].area(), 2500);
}

#[test]
fn pipeline_tracks_a_hand_over_a_block() {
    let model = CameraModel::new(intrinsics(), RES);
    let mut pipeline = FramePipeline::new(model);

    // The driver reports a hand dead center at 1.5 m; the depth frame holds
    // a 50x50 slab there.
    pipeline.hand_events().send(HandEvent::Create {
        id: HandId(7),
        position: Point3::new(0.0, 0.0, 1500.0),
    });

    let mut depth = DepthFrame::empty(RES);
    let block = Rect::from_center(320, 240, 50, 50);
    fill(&mut depth, block, 1500);

    let mut out = FrameOutput::default();
    pipeline.process(
        &FrameSet {
            frame_id: 1,
            depth: depth.clone(),
            color: ColorFrame::black(RES),
            labels: None,
        },
        &mut out,
    );

    assert_eq!(out.hands.len(), 1);
    let hand = &out.hands[0];
    assert_eq!(hand.id(), HandId(7));
    // At 1.5 m the 240 mm search box projects to 80 px.
    assert_eq!(hand.bounding_box(), Rect::from_center(320, 240, 80, 80));
    assert_eq!(hand.blob_area(), 2500);
    assert!((hand.hull_area() - 49.0 * 49.0).abs() < 1e-6);
    assert!(!hand.convex_hull().is_empty());

    // Point cloud: exactly the slab pixels are valid, everything else is
    // the sentinel.
    assert_eq!(out.vertices.len(), RES.num_pixels());
    let valid = out.vertices.iter().filter(|v| v.is_valid()).count();
    assert_eq!(valid, 2500);
    let center = &out.vertices[(240 * RES.width() + 320) as usize];
    assert!((center.position[2] - 150.0).abs() < 1e-3); // 1500 mm in cm

    // Depth visualization: the slab's bucket is lit, invalid depth is not.
    assert!(out.intensities[1500] > 0);
    assert_eq!(out.intensities[0], 0);

    // Losing the hand empties the next frame's geometry.
    pipeline.hand_events().send(HandEvent::Destroy { id: HandId(7) });
    pipeline.process(
        &FrameSet {
            frame_id: 2,
            depth,
            color: ColorFrame::black(RES),
            labels: None,
        },
        &mut out,
    );
    assert!(out.hands.is_empty());
}

#[test]
fn fill_ratio_separates_open_from_closed() {
    let model = CameraModel::new(intrinsics(), RES);

    // Closed hand: a solid slab.
    let mut closed = FramePipeline::new(model);
    closed.tracker_mut().apply_event(HandEvent::Create {
        id: HandId(1),
        position: Point3::new(0.0, 0.0, 1500.0),
    });
    let mut depth = DepthFrame::empty(RES);
    fill(&mut depth, Rect::from_center(320, 240, 40, 40), 1500);
    let mut out = FrameOutput::default();
    closed.process(
        &FrameSet {
            frame_id: 1,
            depth,
            color: ColorFrame::black(RES),
            labels: None,
        },
        &mut out,
    );
    let closed_ratio = out.hands[0].fill_ratio().expect("closed hand matched");

    // Open hand: a palm with splayed fingers, leaving gaps inside the
    // silhouette.
    let mut open = FramePipeline::new(model);
    open.tracker_mut().apply_event(HandEvent::Create {
        id: HandId(1),
        position: Point3::new(0.0, 0.0, 1500.0),
    });
    let mut depth = DepthFrame::empty(RES);
    fill(&mut depth, Rect::from_top_left(300, 250, 40, 30), 1500); // palm
    for finger in 0..5 {
        let x = 300 + finger * 8;
        fill(&mut depth, Rect::from_top_left(x, 215, 5, 35), 1500);
    }
    open.process(
        &FrameSet {
            frame_id: 1,
            depth,
            color: ColorFrame::black(RES),
            labels: None,
        },
        &mut out,
    );
    let open_ratio = out.hands[0].fill_ratio().expect("open hand matched");

    assert!(
        open_ratio < closed_ratio,
        "open {open_ratio} should fill less of its hull than closed {closed_ratio}"
    );
}
