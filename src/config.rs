//! Tunable constants of the effect.
//!
//! Every number that shapes the look of the dissolve lives here, grouped by
//! the stage that reads it. Configs serialize to JSON so a look can be saved
//! and handed to the `dissipate` binary.
//!
//! ```ignore
//! let mut config = DissipationConfig::default();
//! config.sampling.gap = 2;
//! config.appearance.base_color = [20, 20, 30];
//! config.save("dense.json")?;
//! ```

use crate::error::ConfigError;
use crate::fractal::Fractal;
use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// How the source image is laid out on the canvas and which pixels become particles.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SamplingConfig {
    /// Grid stride in pixels along both axes.
    pub gap: u32,
    /// A pixel is kept only if its alpha is strictly above this.
    pub min_alpha: u8,
    /// A pixel is kept only if `r + g + b` is strictly below this.
    pub max_brightness: u16,
    /// Fraction of the limiting canvas dimension the image is scaled to.
    pub fill: f32,
    /// Downward shift from vertical centering, as a fraction of canvas height.
    pub vertical_offset: f32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            gap: 3,
            min_alpha: 100,
            max_brightness: 650,
            fill: 0.75,
            vertical_offset: 0.15,
        }
    }
}

/// Per-particle randomized appearance and timing.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParticleConfig {
    /// Base diameter in pixels.
    pub size: f32,
    /// Random extra diameter in `[0, size_jitter)`.
    pub size_jitter: f32,
    /// Delays are drawn from `[0, max_delay)`.
    pub max_delay: f32,
    /// Reserved phase offsets are drawn from `[0, noise_offset_range)`.
    pub noise_offset_range: f32,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            size: 1.8,
            size_jitter: 1.0,
            max_delay: 0.5,
            noise_offset_range: 1000.0,
        }
    }
}

/// Shape of the fBm flow field.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FlowConfig {
    /// Frequency of the first octave, per canvas pixel.
    pub base_frequency: f32,
    /// Number of octaves summed.
    pub octaves: u32,
    /// Frequency multiplier between octaves.
    pub lacunarity: f32,
    /// Weight multiplier between octaves.
    pub gain: f32,
    /// Fixed noise seed. `None` picks a fresh one per run.
    pub seed: Option<u64>,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            base_frequency: 0.003,
            octaves: 3,
            lacunarity: 2.0,
            gain: 0.5,
            seed: None,
        }
    }
}

impl FlowConfig {
    /// Build the accumulator described by this config.
    pub fn to_fractal(&self) -> Fractal {
        Fractal::new(self.base_frequency, self.octaves, self.lacunarity, self.gain)
    }
}

/// Curves of the per-particle dissolve.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DissolveConfig {
    /// Global progress multiplier before the per-particle delay is subtracted.
    pub stagger: f32,
    /// Upward travel in pixels at full particle progress.
    pub rise: f32,
    /// Flow-field displacement radius in pixels at full particle progress.
    pub spread: f32,
    /// Damping of the vertical flow component.
    pub vertical_swirl: f32,
    /// Extra size multiple reached at full particle progress.
    pub growth: f32,
    /// Exponent of the fade curve.
    pub fade_exponent: f32,
    /// Opacity ceiling while dissolving.
    pub peak_alpha: f32,
    /// Particles at or below this opacity are not drawn.
    pub min_alpha: f32,
}

impl Default for DissolveConfig {
    fn default() -> Self {
        Self {
            stagger: 1.6,
            rise: 250.0,
            spread: 120.0,
            vertical_swirl: 0.5,
            growth: 4.0,
            fade_exponent: 0.8,
            peak_alpha: 0.7,
            min_alpha: 0.01,
        }
    }
}

/// How pointer input and wall time drive the effect.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MotionConfig {
    /// Fraction of the remaining distance to the target covered each frame.
    pub ease: f32,
    /// Noise time units per elapsed millisecond.
    pub time_scale: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            ease: 0.05,
            time_scale: 0.0003,
        }
    }
}

/// Colors and UI thresholds.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppearanceConfig {
    /// Particle color (sRGB, 0-255). Dark slate for a tobacco smoke look.
    pub base_color: [u8; 3],
    /// Clear color of the render surface (sRGB, 0-255).
    pub background: [u8; 3],
    /// The interaction hint hides once the pointer target exceeds this.
    pub hint_threshold: f32,
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        Self {
            base_color: [50, 55, 60],
            background: [243, 244, 246],
            hint_threshold: 0.1,
        }
    }
}

impl AppearanceConfig {
    /// Particle color as `0.0-1.0` RGB.
    pub fn particle_rgb(&self) -> Vec3 {
        rgb_to_vec3(self.base_color)
    }

    /// Background as `0.0-1.0` RGBA, fully opaque.
    pub fn background_rgba(&self) -> Vec4 {
        rgb_to_vec3(self.background).extend(1.0)
    }
}

fn rgb_to_vec3(rgb: [u8; 3]) -> Vec3 {
    Vec3::new(rgb[0] as f32, rgb[1] as f32, rgb[2] as f32) / 255.0
}

/// Complete effect configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DissipationConfig {
    pub sampling: SamplingConfig,
    pub particles: ParticleConfig,
    pub flow: FlowConfig,
    pub dissolve: DissolveConfig,
    pub motion: MotionConfig,
    pub appearance: AppearanceConfig,
    /// Coalesce resizes arriving within this many milliseconds into one
    /// rebuild. `None` rebuilds on every resize.
    pub resize_debounce_ms: Option<u64>,
}

impl DissipationConfig {
    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load a configuration from a JSON file. Missing keys take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Resize debounce window, if any.
    pub fn resize_debounce(&self) -> Option<Duration> {
        self.resize_debounce_ms.map(Duration::from_millis)
    }

    /// Reject values the effect cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: &'static str) -> Result<(), ConfigError> {
            Err(ConfigError::Invalid { field, reason })
        }

        if self.sampling.gap == 0 {
            return invalid("sampling.gap", "must be at least 1");
        }
        if !(self.sampling.fill > 0.0) {
            return invalid("sampling.fill", "must be positive");
        }
        if !(self.particles.size > 0.0) {
            return invalid("particles.size", "must be positive");
        }
        if self.particles.size_jitter < 0.0 || self.particles.max_delay < 0.0 {
            return invalid("particles", "jitter and delay ranges must not be negative");
        }
        if self.flow.octaves == 0 {
            return invalid("flow.octaves", "must be at least 1");
        }
        if !(self.flow.base_frequency > 0.0) {
            return invalid("flow.base_frequency", "must be positive");
        }
        if !(self.motion.ease > 0.0 && self.motion.ease <= 1.0) {
            return invalid("motion.ease", "must be in (0, 1]");
        }
        if !(self.dissolve.stagger > 0.0) {
            return invalid("dissolve.stagger", "must be positive");
        }
        if !(0.0..=1.0).contains(&self.dissolve.peak_alpha) {
            return invalid("dissolve.peak_alpha", "must be in [0, 1]");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let c = DissipationConfig::default();
        assert_eq!(c.sampling.gap, 3);
        assert_eq!(c.particles.size, 1.8);
        assert_eq!(c.motion.ease, 0.05);
        assert_eq!(c.appearance.base_color, [50, 55, 60]);
        assert!(c.resize_debounce().is_none());
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_gap() {
        let mut c = DissipationConfig::default();
        c.sampling.gap = 0;
        assert!(matches!(
            c.validate(),
            Err(ConfigError::Invalid { field: "sampling.gap", .. })
        ));
    }

    #[test]
    fn test_rejects_bad_ease() {
        let mut c = DissipationConfig::default();
        c.motion.ease = 0.0;
        assert!(c.validate().is_err());
        c.motion.ease = 1.5;
        assert!(c.validate().is_err());
        c.motion.ease = 1.0;
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let c: DissipationConfig =
            serde_json::from_str(r#"{ "sampling": { "gap": 5 }, "resize_debounce_ms": 120 }"#)
                .unwrap();
        assert_eq!(c.sampling.gap, 5);
        assert_eq!(c.sampling.min_alpha, 100);
        assert_eq!(c.dissolve.rise, 250.0);
        assert_eq!(c.resize_debounce(), Some(Duration::from_millis(120)));
    }

    #[test]
    fn test_save_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("look.json");

        let mut c = DissipationConfig::default();
        c.flow.seed = Some(99);
        c.appearance.background = [0, 0, 0];
        c.save(&path).unwrap();

        let loaded = DissipationConfig::load(&path).unwrap();
        assert_eq!(loaded, c);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{ "flow": { "octaves": 0 } }"#).unwrap();
        assert!(matches!(
            DissipationConfig::load(&path),
            Err(ConfigError::Invalid { field: "flow.octaves", .. })
        ));

        fs::write(&path, "not json").unwrap();
        assert!(matches!(DissipationConfig::load(&path), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_flow_builds_fractal() {
        let fbm = FlowConfig::default().to_fractal();
        assert_eq!(fbm.octaves().len(), 3);
        assert!((fbm.max_amplitude() - 1.75).abs() < 1e-6);
    }

    #[test]
    fn test_colors_normalized() {
        let a = AppearanceConfig::default();
        let rgb = a.particle_rgb();
        assert!((rgb.x - 50.0 / 255.0).abs() < 1e-6);
        assert_eq!(a.background_rgba().w, 1.0);
    }
}
