//! Frame scheduling.
//!
//! The frame loop does not reschedule itself. An external driver (the window
//! event loop, or a test) asks [`FrameLoop::should_run`] before each frame and
//! stops asking once the loop is cancelled. Cancelling is idempotent and can be
//! done from anywhere that holds a [`CancelHandle`].
//!
//! [`ResizeDebouncer`] optionally coalesces bursts of resize events so that a
//! drag-resize triggers one particle rebuild instead of dozens.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared cancellation flag for a [`FrameLoop`].
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    /// Stop the loop. Calling this again has no further effect.
    ///
    /// Returns `true` only for the call that actually cancelled.
    pub fn cancel(&self) -> bool {
        !self.cancelled.swap(true, Ordering::AcqRel)
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Gate for the per-frame callback.
#[derive(Debug, Default)]
pub struct FrameLoop {
    handle: CancelHandle,
    started: bool,
    frames: u64,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle that can cancel this loop.
    pub fn handle(&self) -> CancelHandle {
        self.handle.clone()
    }

    /// Begin scheduling frames. Has no effect once cancelled.
    pub fn start(&mut self) {
        if !self.handle.is_cancelled() {
            self.started = true;
        }
    }

    /// Stop scheduling frames.
    pub fn cancel(&self) -> bool {
        self.handle.cancel()
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.started && !self.handle.is_cancelled()
    }

    /// Whether the driver should run a frame now. Counts the frame if so.
    pub fn should_run(&mut self) -> bool {
        if self.is_running() {
            self.frames += 1;
            true
        } else {
            false
        }
    }

    /// Frames run so far.
    #[inline]
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

/// What to do for one window resize.
///
/// The render surface always follows the window; only the particle rebuild
/// may be deferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizePlan {
    pub surface: (u32, u32),
    pub rebuild: Option<(u32, u32)>,
}

/// Coalesces resize events.
///
/// Without a delay every resize is passed straight through.
#[derive(Debug, Clone)]
pub struct ResizeDebouncer {
    delay: Option<Duration>,
    pending: Option<((u32, u32), Instant)>,
}

impl ResizeDebouncer {
    pub fn new(delay: Option<Duration>) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Record a resize at `now`. Returns the size to rebuild for immediately,
    /// or `None` if it was deferred.
    pub fn push(&mut self, size: (u32, u32), now: Instant) -> Option<(u32, u32)> {
        match self.delay {
            None => Some(size),
            Some(delay) => {
                self.pending = Some((size, now + delay));
                None
            }
        }
    }

    /// Record a window resize at `now` and split it into the surface size,
    /// applied straight away, and the rebuild size if it is not deferred.
    pub fn resized(&mut self, size: (u32, u32), now: Instant) -> ResizePlan {
        ResizePlan {
            surface: size,
            rebuild: self.push(size, now),
        }
    }

    /// Return the deferred size once its quiet period has passed.
    pub fn poll(&mut self, now: Instant) -> Option<(u32, u32)> {
        match self.pending {
            Some((size, deadline)) if now >= deadline => {
                self.pending = None;
                log::debug!("flushing debounced resize to {}x{}", size.0, size.1);
                Some(size)
            }
            _ => None,
        }
    }

    /// When the next deferred resize becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|(_, deadline)| deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loop_runs_after_start() {
        let mut frames = FrameLoop::new();
        assert!(!frames.should_run());
        frames.start();
        assert!(frames.should_run());
        assert!(frames.should_run());
        assert_eq!(frames.frames(), 2);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut frames = FrameLoop::new();
        frames.start();
        let handle = frames.handle();

        assert!(handle.cancel());
        assert!(!handle.cancel());
        assert!(!frames.cancel());
        assert!(!frames.should_run());
        assert!(!frames.is_running());
    }

    #[test]
    fn test_cannot_restart_after_cancel() {
        let mut frames = FrameLoop::new();
        frames.cancel();
        frames.start();
        assert!(!frames.should_run());
        assert_eq!(frames.frames(), 0);
    }

    #[test]
    fn test_cancel_from_other_thread() {
        let mut frames = FrameLoop::new();
        frames.start();
        let handle = frames.handle();
        std::thread::spawn(move || handle.cancel()).join().unwrap();
        assert!(!frames.should_run());
    }

    #[test]
    fn test_no_delay_passes_through() {
        let mut debounce = ResizeDebouncer::new(None);
        let now = Instant::now();
        assert_eq!(debounce.push((800, 600), now), Some((800, 600)));
        assert_eq!(debounce.poll(now), None);
        assert!(debounce.deadline().is_none());
    }

    #[test]
    fn test_burst_coalesced_to_last_size() {
        let mut debounce = ResizeDebouncer::new(Some(Duration::from_millis(100)));
        let t0 = Instant::now();

        assert_eq!(debounce.push((800, 600), t0), None);
        assert_eq!(debounce.push((810, 600), t0 + Duration::from_millis(30)), None);
        assert_eq!(debounce.push((820, 600), t0 + Duration::from_millis(60)), None);

        assert_eq!(debounce.poll(t0 + Duration::from_millis(120)), None);
        assert_eq!(debounce.deadline(), Some(t0 + Duration::from_millis(160)));
        assert_eq!(debounce.poll(t0 + Duration::from_millis(160)), Some((820, 600)));
        assert_eq!(debounce.poll(t0 + Duration::from_millis(500)), None);
    }

    #[test]
    fn test_surface_follows_every_resize_while_rebuild_waits() {
        let mut debounce = ResizeDebouncer::new(Some(Duration::from_millis(100)));
        let t0 = Instant::now();

        for (i, size) in [(800, 600), (900, 650), (1000, 700)].into_iter().enumerate() {
            let plan = debounce.resized(size, t0 + Duration::from_millis(i as u64 * 20));
            assert_eq!(plan.surface, size);
            assert_eq!(plan.rebuild, None);
        }
        assert_eq!(debounce.poll(t0 + Duration::from_millis(140)), Some((1000, 700)));
    }

    #[test]
    fn test_undelayed_resize_rebuilds_with_surface() {
        let mut debounce = ResizeDebouncer::new(None);
        let plan = debounce.resized((640, 480), Instant::now());
        assert_eq!(plan.surface, (640, 480));
        assert_eq!(plan.rebuild, Some((640, 480)));
    }
}
