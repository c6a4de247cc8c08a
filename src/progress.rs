//! Pointer position to dissolve progress.
//!
//! Pointer events write a *target* progress; the frame loop reads it once per
//! frame and eases the *current* progress towards it:
//!
//! ```text
//! current += (target - current) * ease
//! ```
//!
//! The target lives in a [`ProgressTarget`], a shared atomic register, so the
//! event side and the frame side never need a lock even if they end up on
//! different threads.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Shared single-scalar register holding the target progress in `[0, 1]`.
///
/// Cloning shares the register.
#[derive(Debug, Clone, Default)]
pub struct ProgressTarget {
    bits: Arc<AtomicU32>,
}

impl ProgressTarget {
    /// A register holding `0.0`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a target, clamped to `[0, 1]`. NaN is ignored.
    pub fn set(&self, value: f32) {
        if value.is_nan() {
            return;
        }
        self.bits
            .store(value.clamp(0.0, 1.0).to_bits(), Ordering::Relaxed);
    }

    /// Current target.
    #[inline]
    pub fn get(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Relaxed))
    }

    /// Map a horizontal pointer coordinate to a target.
    ///
    /// `x` and `viewport_width` must be in the same units. Returns the stored
    /// target, or `None` if the viewport has no width.
    pub fn set_from_pointer(&self, x: f32, viewport_width: f32) -> Option<f32> {
        let target = normalize_pointer(x, viewport_width)?;
        self.set(target);
        Some(target)
    }
}

/// Pointer x divided by viewport width, clamped to `[0, 1]`.
#[inline]
pub fn normalize_pointer(x: f32, viewport_width: f32) -> Option<f32> {
    if viewport_width > 0.0 && x.is_finite() {
        Some((x / viewport_width).clamp(0.0, 1.0))
    } else {
        None
    }
}

/// Exponentially eased progress.
///
/// Approaches the target by a fixed fraction each frame: never overshoots and
/// only reaches it up to float precision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EasedProgress {
    current: f32,
    ease: f32,
}

impl EasedProgress {
    /// Start at 0 with the given easing factor in `(0, 1]`.
    pub fn new(ease: f32) -> Self {
        Self { current: 0.0, ease }
    }

    /// Current eased value.
    #[inline]
    pub fn current(&self) -> f32 {
        self.current
    }

    /// Easing factor.
    #[inline]
    pub fn ease(&self) -> f32 {
        self.ease
    }

    /// Change the easing factor without disturbing the current value.
    pub fn set_ease(&mut self, ease: f32) {
        self.ease = ease;
    }

    /// Move one frame towards `target` and return the new value.
    pub fn advance(&mut self, target: f32) -> f32 {
        self.current += (target - self.current) * self.ease;
        self.current
    }
}
