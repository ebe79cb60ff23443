//! Performance measurement tools.

use std::{
    cell::Cell,
    fmt,
    time::{Duration, Instant},
};

/// A timer that measures and averages the time an operation takes.
///
/// Collected timings are averaged and reset when the timer is displayed
/// using `{}` ([`std::fmt::Display`]).
pub struct Timer {
    name: &'static str,
    recorded: Cell<(u32, Duration)>,
}

impl Timer {
    /// Creates a new timer.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            recorded: Cell::new((0, Duration::ZERO)),
        }
    }

    /// Invokes a closure, measuring and recording the time it takes.
    pub fn time<T>(&mut self, timee: impl FnOnce() -> T) -> T {
        let _guard = self.start();
        timee()
    }

    /// Starts timing an operation using a drop guard.
    ///
    /// When the returned [`TimerGuard`] is dropped, the time between the
    /// call to `start` and the drop is recorded.
    pub fn start(&mut self) -> TimerGuard<'_> {
        TimerGuard {
            start: Instant::now(),
            timer: self,
        }
    }

    fn stop(&mut self, start: Instant) {
        let (count, total) = self.recorded.get();
        self.recorded
            .set((count + 1, total + start.elapsed()));
    }
}

/// Displays the average recorded time and resets it.
impl fmt::Display for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (count, total) = self.recorded.take();
        if count == 0 {
            write!(f, "{}: -", self.name)
        } else {
            let avg_ms = total.as_secs_f32() * 1000.0 / count as f32;
            write!(f, "{}: {count}x{avg_ms:.01}ms", self.name)
        }
    }
}

/// Guard returned by [`Timer::start`]. Stops timing the operation when
/// dropped.
pub struct TimerGuard<'a> {
    start: Instant,
    timer: &'a mut Timer,
}

impl Drop for TimerGuard<'_> {
    fn drop(&mut self) {
        self.timer.stop(self.start);
    }
}

/// Logs frames per second.
pub struct FpsCounter {
    name: String,
    frames: u32,
    start: Instant,
}

impl FpsCounter {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            name: name.into(),
            frames: 0,
            start: Instant::now(),
        }
    }

    /// Advances the frame counter by 1 and logs FPS if one second has
    /// passed.
    pub fn tick(&mut self) {
        self.frames += 1;

        let elapsed = self.start.elapsed();
        if elapsed >= Duration::from_secs(1) {
            let fps = self.frames as f32 / elapsed.as_secs_f32();
            log::debug!("{}: {:.1} FPS", self.name, fps);
            self.frames = 0;
            self.start = Instant::now();
        }
    }
}
