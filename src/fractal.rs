//! Fractal Brownian motion over a [`Noise3`] source.
//!
//! The flow field driving the smoke is the sum of several noise octaves, each
//! at double the frequency and half the weight of the previous one:
//!
//! ```text
//! value = noise(p * f) * 1.0 + noise(p * 2f) * 0.5 + noise(p * 4f) * 0.25
//! ```
//!
//! With `f = 0.003` in canvas pixels this gives swirls a few hundred pixels
//! across with finer turbulence on top. Time is passed through unscaled so the
//! whole field drifts together.

use crate::noise::Noise3;
use std::f32::consts::TAU;

/// One layer of the fractal sum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Octave {
    /// Spatial frequency applied to x and y.
    pub frequency: f32,
    /// Weight of this layer in the sum.
    pub amplitude: f32,
}

/// Multi-octave accumulator.
#[derive(Debug, Clone, PartialEq)]
pub struct Fractal {
    octaves: Vec<Octave>,
}

impl Fractal {
    /// Build `octaves` layers starting at `base_frequency` with unit weight.
    ///
    /// Each subsequent layer multiplies the frequency by `lacunarity` and the
    /// weight by `gain`.
    pub fn new(base_frequency: f32, octaves: u32, lacunarity: f32, gain: f32) -> Self {
        let mut layers = Vec::with_capacity(octaves as usize);
        let mut frequency = base_frequency;
        let mut amplitude = 1.0;
        for _ in 0..octaves {
            layers.push(Octave {
                frequency,
                amplitude,
            });
            frequency *= lacunarity;
            amplitude *= gain;
        }
        Self { octaves: layers }
    }

    /// Build from explicit layers.
    pub fn from_octaves(octaves: Vec<Octave>) -> Self {
        Self { octaves }
    }

    /// The layers summed by [`sample`](Self::sample).
    pub fn octaves(&self) -> &[Octave] {
        &self.octaves
    }

    /// Largest magnitude the sum can reach for a unit-range noise source.
    pub fn max_amplitude(&self) -> f32 {
        self.octaves.iter().map(|o| o.amplitude.abs()).sum()
    }

    /// Sum all octaves at `(x, y)` and time `t`.
    pub fn sample<N: Noise3 + ?Sized>(&self, noise: &N, x: f32, y: f32, t: f32) -> f32 {
        self.octaves
            .iter()
            .map(|o| noise.noise3(x * o.frequency, y * o.frequency, t) * o.amplitude)
            .sum()
    }

    /// Flow direction in radians at `(x, y, t)`.
    #[inline]
    pub fn angle<N: Noise3 + ?Sized>(&self, noise: &N, x: f32, y: f32, t: f32) -> f32 {
        self.sample(noise, x, y, t) * TAU
    }
}

impl Default for Fractal {
    /// Three octaves from 0.003, doubling frequency and halving weight.
    fn default() -> Self {
        Self::new(0.003, 3, 2.0, 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::SimplexNoise;

    struct Constant(f32);

    impl Noise3 for Constant {
        fn noise3(&self, _x: f32, _y: f32, _z: f32) -> f32 {
            self.0
        }
    }

    /// Returns its (already frequency-scaled) x input.
    struct EchoX;

    impl Noise3 for EchoX {
        fn noise3(&self, x: f32, _y: f32, _z: f32) -> f32 {
            x
        }
    }

    #[test]
    fn test_default_octaves() {
        let fbm = Fractal::default();
        let o = fbm.octaves();
        assert_eq!(o.len(), 3);
        assert!((o[0].frequency - 0.003).abs() < 1e-9);
        assert!((o[1].frequency - 0.006).abs() < 1e-9);
        assert!((o[2].frequency - 0.012).abs() < 1e-9);
        assert_eq!(o[0].amplitude, 1.0);
        assert_eq!(o[1].amplitude, 0.5);
        assert_eq!(o[2].amplitude, 0.25);
    }

    #[test]
    fn test_weights_sum_to_max() {
        let fbm = Fractal::default();
        assert!((fbm.sample(&Constant(1.0), 3.0, 4.0, 0.0) - 1.75).abs() < 1e-6);
        assert!((fbm.sample(&Constant(-1.0), 3.0, 4.0, 0.0) + 1.75).abs() < 1e-6);
        assert!((fbm.max_amplitude() - 1.75).abs() < 1e-6);
    }

    #[test]
    fn test_frequencies_scale_coordinates() {
        // x=1000 gives octave inputs 3, 6, 12 weighted 1, 0.5, 0.25
        let fbm = Fractal::default();
        let v = fbm.sample(&EchoX, 1000.0, 0.0, 0.0);
        assert!((v - (3.0 + 3.0 + 3.0)).abs() < 1e-3);
    }

    #[test]
    fn test_angle_is_scaled_sample() {
        let fbm = Fractal::default();
        let noise = SimplexNoise::new(21);
        let s = fbm.sample(&noise, 120.0, 80.0, 0.4);
        let a = fbm.angle(&noise, 120.0, 80.0, 0.4);
        assert!((a - s * TAU).abs() < 1e-5);
    }

    #[test]
    fn test_nearby_points_similar_angles() {
        let fbm = Fractal::default();
        let noise = SimplexNoise::new(2);
        let a = fbm.angle(&noise, 400.0, 300.0, 1.0);
        let b = fbm.angle(&noise, 401.0, 300.0, 1.0);
        assert!((a - b).abs() < 0.5);
    }

    #[test]
    fn test_zero_octaves() {
        let fbm = Fractal::new(0.003, 0, 2.0, 0.5);
        assert_eq!(fbm.sample(&Constant(1.0), 1.0, 1.0, 1.0), 0.0);
        assert_eq!(fbm.max_amplitude(), 0.0);
    }
}
