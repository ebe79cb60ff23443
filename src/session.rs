//! Tracking sessions: the frame loop and its producer/consumer handoff.
//!
//! A session owns one worker thread that alternates between waiting on the
//! camera driver and running the [`FramePipeline`]. Finished outputs cross
//! to the presentation thread over a rendezvous channel, so the worker
//! cannot start waiting for the next frame until the previous output has
//! been accepted; the consumer therefore never observes a half-updated
//! buffer. Spent outputs can be recycled to keep the loop free of per-frame
//! allocation.

use std::{
    panic::resume_unwind,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
};

use anyhow::ensure;
use crossbeam::channel::{Receiver, Sender};

use crate::{
    camera::{CameraIntrinsics, CameraModel},
    frame::FrameSet,
    hand::tracking::HandEventSender,
    pipeline::{FrameOutput, FramePipeline},
    resolution::Resolution,
    timer::FpsCounter,
};

/// The camera-driver collaborator: supplies synchronized frame snapshots.
///
/// Device management, timeouts and retries all live behind this trait; the
/// session only ever sees fully-formed frames.
pub trait FrameSource: Send + 'static {
    /// Resolution of the depth stream.
    fn depth_resolution(&self) -> Resolution;

    /// Resolution of the color stream.
    fn color_resolution(&self) -> Resolution;

    /// Blocks until the next synchronized frame snapshot is available.
    ///
    /// Returning `Ok(None)` ends the session normally (end of stream);
    /// returning an error ends it with that error.
    fn wait_for_frames(&mut self) -> anyhow::Result<Option<FrameSet>>;
}

/// A running tracking session.
///
/// Dropping the session cancels it and joins the worker thread; use
/// [`stop`][Self::stop] to also observe the worker's result.
#[derive(Debug)]
pub struct Session {
    outputs: Option<Receiver<FrameOutput>>,
    recycle: Sender<FrameOutput>,
    cancel: Arc<AtomicBool>,
    hand_events: HandEventSender,
    thread: Option<JoinHandle<anyhow::Result<()>>>,
}

impl Session {
    /// Validates the source configuration and starts the tracking thread.
    ///
    /// A resolution mismatch between the depth and color streams is a fatal
    /// configuration error, reported here once; it is never retried per
    /// frame.
    pub fn spawn<S: FrameSource>(mut source: S, intrinsics: CameraIntrinsics) -> anyhow::Result<Self> {
        ensure!(
            source.depth_resolution() == source.color_resolution(),
            "depth and color streams must have the same resolution (got {} and {})",
            source.depth_resolution(),
            source.color_resolution(),
        );

        let model = CameraModel::new(intrinsics, source.depth_resolution());
        let mut pipeline = FramePipeline::new(model);
        let hand_events = pipeline.hand_events();

        let (output_tx, output_rx) = crossbeam::channel::bounded(0);
        let (recycle_tx, recycle_rx) = crossbeam::channel::bounded::<FrameOutput>(2);
        let cancel = Arc::new(AtomicBool::new(false));

        let cancel2 = cancel.clone();
        let thread = thread::Builder::new()
            .name("tracking".into())
            .spawn(move || -> anyhow::Result<()> {
                let mut fps = FpsCounter::new("tracking");
                log::debug!("tracking started at {}", model.resolution());

                // The cancellation flag is checked once per iteration; an
                // in-flight frame always completes before the loop exits.
                while !cancel2.load(Ordering::Relaxed) {
                    let frames = match source.wait_for_frames() {
                        Ok(Some(frames)) => frames,
                        Ok(None) => {
                            log::debug!("frame source ended");
                            break;
                        }
                        Err(err) => {
                            log::error!("frame source failed: {err:#}");
                            return Err(err);
                        }
                    };

                    let mut out = recycle_rx.try_recv().unwrap_or_default();
                    pipeline.process(&frames, &mut out);

                    if output_tx.send(out).is_err() {
                        // Consumer is gone; nothing left to produce for.
                        break;
                    }
                    fps.tick();
                }

                Ok(())
            })?;

        Ok(Self {
            outputs: Some(output_rx),
            recycle: recycle_tx,
            cancel,
            hand_events,
            thread: Some(thread),
        })
    }

    /// Returns a handle for queueing hand lifecycle events.
    pub fn hand_events(&self) -> HandEventSender {
        self.hand_events.clone()
    }

    /// Receives the next processed frame, blocking until the worker
    /// finishes one.
    ///
    /// Returns `None` once the session has ended (source exhausted, failed,
    /// or session stopped).
    pub fn recv(&self) -> Option<FrameOutput> {
        self.outputs.as_ref()?.recv().ok()
    }

    /// Hands a spent output back for reuse.
    ///
    /// Entirely optional: outputs that are simply dropped are replaced by
    /// fresh allocations.
    pub fn recycle(&self, output: FrameOutput) {
        self.recycle.try_send(output).ok();
    }

    /// Cancels the session and waits for the worker to exit, returning its
    /// result.
    pub fn stop(mut self) -> anyhow::Result<()> {
        self.cancel.store(true, Ordering::Relaxed);
        // Closing the output channel unblocks a worker stuck in the
        // rendezvous send.
        drop(self.outputs.take());

        match self.thread.take() {
            Some(handle) => match handle.join() {
                Ok(result) => result,
                Err(payload) => resume_unwind(payload),
            },
            None => Ok(()),
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.cancel.store(true, Ordering::Relaxed);
        drop(self.outputs.take());

        if let Some(handle) = self.thread.take() {
            match handle.join() {
                Ok(Ok(())) => {}
                Ok(Err(err)) => log::error!("tracking session failed: {err:#}"),
                Err(payload) => {
                    if !thread::panicking() {
                        resume_unwind(payload);
                    }
                }
            }
        }
    }
}
