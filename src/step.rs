//! The per-frame, per-particle dissolve.
//!
//! Each particle derives its own progress from the global one:
//!
//! ```text
//! p = clamp(global * stagger - delay, 0, 1)
//! ```
//!
//! At `p == 0` the particle sits at its origin, opaque, at base size. Past
//! that it rises, drifts along the flow field sampled at its origin, grows,
//! and fades:
//!
//! ```text
//! angle = fbm(origin, t) * 2π
//! x     = origin.x + cos(angle) * spread * p
//! y     = origin.y - rise * p + sin(angle) * spread * p * vertical_swirl
//! size  = base * (1 + growth * p)
//! alpha = max(0, (1 - p^fade_exponent) * peak_alpha)
//! ```
//!
//! Nothing carries over between frames: the same inputs always produce the
//! same output.

use crate::config::DissolveConfig;
use crate::fractal::Fractal;
use crate::noise::Noise3;
use crate::particle::Particle;
use glam::Vec2;

/// Phase a particle is in for the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Resting at its origin.
    Solid,
    /// Rising and fading.
    Dissolving,
}

/// What to draw for one particle this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Splat {
    pub center: Vec2,
    pub radius: f32,
    pub alpha: f32,
    pub phase: Phase,
}

/// Inputs shared by every particle in a frame.
pub struct StepContext<'a, N: Noise3 + ?Sized> {
    pub noise: &'a N,
    pub fractal: &'a Fractal,
    pub dissolve: &'a DissolveConfig,
    /// Eased global progress in `[0, 1]`.
    pub progress: f32,
    /// Scaled noise time.
    pub time: f32,
}

/// Per-particle progress for a given global progress and delay.
#[inline]
pub fn particle_progress(global: f32, delay: f32, stagger: f32) -> f32 {
    (global * stagger - delay).clamp(0.0, 1.0)
}

/// Opacity of a dissolving particle at per-particle progress `p`.
///
/// Fades slowly at first and faster towards the end. Exactly 0 at `p = 1`.
#[inline]
pub fn dissolve_alpha(p: f32, dissolve: &DissolveConfig) -> f32 {
    ((1.0 - p.powf(dissolve.fade_exponent)) * dissolve.peak_alpha).max(0.0)
}

/// Advance one particle and return what to draw, if anything.
///
/// Writes the particle's `position` and `alpha` for this frame. Returns
/// `None` for dissolving particles at or below the visibility threshold.
pub fn step<N: Noise3 + ?Sized>(
    particle: &mut Particle,
    ctx: &StepContext<'_, N>,
) -> Option<Splat> {
    let d = ctx.dissolve;
    let p = particle_progress(ctx.progress, particle.delay, d.stagger);
    let origin = particle.origin_f32();

    if p <= 0.0 {
        particle.position = origin;
        particle.alpha = 1.0;
        return Some(Splat {
            center: origin,
            radius: particle.size / 2.0,
            alpha: 1.0,
            phase: Phase::Solid,
        });
    }

    // Sampled at the fixed origin so the swirl pattern keeps the silhouette's shape
    let angle = ctx.fractal.angle(ctx.noise, origin.x, origin.y, ctx.time);
    let rise = p * d.rise;
    let spread = p * d.spread;

    particle.position = Vec2::new(
        origin.x + angle.cos() * spread,
        origin.y - rise + angle.sin() * spread * d.vertical_swirl,
    );
    particle.alpha = dissolve_alpha(p, d);

    if particle.alpha <= d.min_alpha {
        return None;
    }

    let growth = 1.0 + p * d.growth;
    Some(Splat {
        center: particle.position,
        radius: particle.size * growth / 2.0,
        alpha: particle.alpha,
        phase: Phase::Dissolving,
    })
}
