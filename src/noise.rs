//! Gradient noise for the smoke flow field.
//!
//! [`SimplexNoise`] wraps the `noise` crate's seeded OpenSimplex generator.
//! Its permutation table is built once at construction and never mutated
//! afterwards, so a generator can be sampled any number of times and always
//! returns the same value for the same input.
//!
//! # Example
//!
//! ```ignore
//! use dissipate::noise::{Noise3, SimplexNoise};
//!
//! let noise = SimplexNoise::new(7);
//! let n = noise.noise3(12.0 * 0.003, 40.0 * 0.003, 0.25);
//! assert!((-1.0..=1.0).contains(&n));
//! ```

use ::noise::{NoiseFn, OpenSimplex};

/// A continuous scalar field over `(x, y, t)`.
///
/// Implementations must be pure: repeated calls with the same input return
/// the same value, and nearby inputs give nearby values.
pub trait Noise3 {
    /// Sample the field. Output is in `[-1, 1]`.
    fn noise3(&self, x: f32, y: f32, z: f32) -> f32;
}

/// Seeded 3D simplex noise.
#[derive(Clone)]
pub struct SimplexNoise {
    seed: u64,
    source: OpenSimplex,
}

impl SimplexNoise {
    /// Create a generator whose permutation table is derived from `seed`.
    pub fn new(seed: u64) -> Self {
        // Fold the high half in so seeds differing only there still differ
        let folded = (seed ^ (seed >> 32)) as u32;
        Self {
            seed,
            source: OpenSimplex::new(folded),
        }
    }

    /// Create a generator with a seed drawn from the OS entropy source.
    pub fn random() -> Self {
        Self::new(rand::random())
    }

    /// Seed the permutation table was built from.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Noise3 for SimplexNoise {
    #[inline]
    fn noise3(&self, x: f32, y: f32, z: f32) -> f32 {
        let n = self.source.get([x as f64, y as f64, z as f64]);
        (n as f32).clamp(-1.0, 1.0)
    }
}

impl std::fmt::Debug for SimplexNoise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimplexNoise").field("seed", &self.seed).finish()
    }
}
