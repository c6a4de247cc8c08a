//! A single sample point of the source silhouette.

use glam::{UVec2, Vec2};

/// One particle of the dissipation effect.
///
/// `origin` is where the particle was sampled from the image and never
/// changes. `position` and `alpha` are recomputed from scratch every frame;
/// nothing accumulates between frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Canvas pixel the particle was sampled from.
    pub origin: UVec2,
    /// Rendered position for the current frame.
    pub position: Vec2,
    /// Base diameter in pixels, jittered once at creation.
    pub size: f32,
    /// Opacity for the current frame, in `[0, 1]`.
    pub alpha: f32,
    /// Offset in `[0, max_delay)` subtracted from the staggered global progress.
    pub delay: f32,
    /// Reserved per-particle phase. Not read by the dissolve step.
    pub noise_offset: f32,
    /// Reserved velocity bias. Always zero; not read by the dissolve step.
    pub velocity: Vec2,
}

impl Particle {
    /// Create a particle resting at its origin at full opacity.
    pub fn new(origin: UVec2, size: f32, delay: f32, noise_offset: f32) -> Self {
        Self {
            origin,
            position: origin.as_vec2(),
            size,
            alpha: 1.0,
            delay,
            noise_offset,
            velocity: Vec2::ZERO,
        }
    }

    /// Origin as floating point canvas coordinates.
    #[inline]
    pub fn origin_f32(&self) -> Vec2 {
        self.origin.as_vec2()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_particle_rests_at_origin() {
        let p = Particle::new(UVec2::new(12, 30), 2.1, 0.25, 512.0);
        assert_eq!(p.position, Vec2::new(12.0, 30.0));
        assert_eq!(p.alpha, 1.0);
        assert_eq!(p.velocity, Vec2::ZERO);
        assert_eq!(p.origin_f32(), p.position);
    }
}
