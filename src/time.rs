//! Frame timing.
//!
//! [`Clock`] is the single source of time for the effect: frame delta, frame
//! count, a smoothed FPS reading, and the slowed-down "noise time" the flow
//! field drifts along.
//!
//! # Example
//!
//! ```ignore
//! use dissipate::time::Clock;
//!
//! let mut clock = Clock::new(0.0003);
//!
//! // In the frame callback:
//! clock.update();
//! let t = clock.noise_time(); // 0.3 per second
//! ```

use std::time::{Duration, Instant};

/// Weight of the newest frame in the FPS moving average.
const FPS_SMOOTHING: f32 = 0.1;

/// Wall clock for the frame loop, with pause support.
#[derive(Debug)]
pub struct Clock {
    start: Instant,
    last_frame: Instant,
    /// Total time spent paused, subtracted from the running time.
    paused_total: Duration,
    /// Frame timestamp at which [`pause`](Self::pause) was called.
    paused_at: Option<Instant>,
    running: Duration,
    step: Duration,
    frames: u64,
    fps: f32,
    /// Noise time units per elapsed millisecond.
    time_scale: f32,
}

impl Clock {
    /// Create a clock starting now.
    pub fn new(time_scale: f32) -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            paused_total: Duration::ZERO,
            paused_at: None,
            running: Duration::ZERO,
            step: Duration::ZERO,
            frames: 0,
            fps: 0.0,
            time_scale,
        }
    }

    /// Advance to now. Call once per frame.
    ///
    /// Returns `(elapsed, delta)` in seconds.
    pub fn update(&mut self) -> (f32, f32) {
        self.update_at(Instant::now())
    }

    /// Advance to `now`. While paused nothing moves and the delta is zero.
    pub fn update_at(&mut self, now: Instant) -> (f32, f32) {
        if self.paused_at.is_some() {
            self.step = Duration::ZERO;
            return (self.elapsed(), 0.0);
        }

        self.step = now.saturating_duration_since(self.last_frame);
        self.last_frame = now;
        self.running = now
            .saturating_duration_since(self.start)
            .saturating_sub(self.paused_total);
        self.frames += 1;

        let step = self.step.as_secs_f32();
        if step > 0.0 {
            let instant_fps = step.recip();
            self.fps = if self.fps == 0.0 {
                instant_fps
            } else {
                self.fps + (instant_fps - self.fps) * FPS_SMOOTHING
            };
        }

        (self.elapsed(), step)
    }

    /// Seconds since start, excluding paused time.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.running.as_secs_f32()
    }

    /// Seconds between the last two updates.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.step.as_secs_f32()
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.frames
    }

    /// Moving average of the frame rate.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Time coordinate for the flow field: elapsed milliseconds times the scale.
    #[inline]
    pub fn noise_time(&self) -> f32 {
        self.running.as_secs_f32() * 1000.0 * self.time_scale
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    /// Freeze elapsed time. The flow field stops drifting.
    pub fn pause(&mut self) {
        if self.paused_at.is_none() {
            self.paused_at = Some(self.last_frame);
        }
    }

    /// Resume after [`pause`](Self::pause). Paused time is not counted.
    pub fn resume(&mut self) {
        if let Some(at) = self.paused_at.take() {
            let now = Instant::now();
            self.paused_total += now.saturating_duration_since(at);
            self.last_frame = now;
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new(0.0003)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_new() {
        let clock = Clock::default();
        assert_eq!(clock.frame(), 0);
        assert_eq!(clock.noise_time(), 0.0);
        assert!(!clock.is_paused());
    }

    #[test]
    fn test_update_at_scales_noise_time() {
        let mut clock = Clock::new(0.0003);
        let start = clock.start;
        let (elapsed, delta) = clock.update_at(start + Duration::from_secs(2));

        assert!((elapsed - 2.0).abs() < 1e-4);
        assert!((delta - 2.0).abs() < 1e-4);
        // 2000 ms * 0.0003
        assert!((clock.noise_time() - 0.6).abs() < 1e-4);
        assert_eq!(clock.frame(), 1);
    }

    #[test]
    fn test_fps_tracks_frame_rate() {
        let mut clock = Clock::default();
        let start = clock.start;
        for i in 1..=30 {
            clock.update_at(start + Duration::from_millis(i * 1000 / 60));
        }
        assert!(clock.fps() > 50.0 && clock.fps() < 70.0, "fps {}", clock.fps());
    }

    #[test]
    fn test_resume_clears_pause() {
        let mut clock = Clock::default();
        clock.pause();
        clock.pause();
        assert!(clock.is_paused());
        clock.resume();
        assert!(!clock.is_paused());
    }

    #[test]
    fn test_pause_freezes_time() {
        let mut clock = Clock::default();
        let start = clock.start;
        clock.update_at(start + Duration::from_millis(100));
        clock.pause();

        let before = clock.elapsed();
        clock.update_at(start + Duration::from_millis(900));
        assert_eq!(clock.elapsed(), before);
        assert_eq!(clock.delta(), 0.0);
    }
}
