//! Building the particle set from a source image.
//!
//! The image is scaled to fit the canvas, drawn onto an offscreen
//! [`RasterCanvas`], and the result is sampled on a regular grid. Every grid
//! point that is both near-opaque and dark enough becomes one [`Particle`]:
//!
//! ```text
//! alpha > min_alpha (100)   &&   r + g + b < max_brightness (650)
//! ```
//!
//! A field is never updated in place. Loading a new image or resizing the
//! viewport builds a fresh one.
//!
//! # Example
//!
//! ```ignore
//! let image = SourceImage::open("silhouette.png")?;
//! let mut scratch = RasterCanvas::new(1280, 720);
//! let field = ParticleField::build(&image, &mut scratch, &config, &mut rng);
//! println!("{} particles", field.len());
//! ```

use crate::canvas::{Canvas, RasterCanvas};
use crate::config::{DissipationConfig, SamplingConfig};
use crate::particle::Particle;
use crate::source::SourceImage;
use glam::{UVec2, Vec2};
use image::{Rgba, RgbaImage};
use rand::Rng;

/// Where the scaled image lands on the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Top-left corner in canvas pixels.
    pub top_left: Vec2,
    /// Drawn size in canvas pixels.
    pub size: Vec2,
    /// Uniform scale applied to the image.
    pub scale: f32,
}

impl Placement {
    /// Fit an `image_size` image into `canvas_size`.
    ///
    /// The image is scaled uniformly to `fill` of the limiting dimension,
    /// centered horizontally, and pushed down from vertical center by
    /// `vertical_offset` of the canvas height. Returns `None` for empty inputs.
    pub fn fit(image_size: UVec2, canvas_size: UVec2, sampling: &SamplingConfig) -> Option<Self> {
        if image_size.x == 0 || image_size.y == 0 || canvas_size.x == 0 || canvas_size.y == 0 {
            return None;
        }

        let image = image_size.as_vec2();
        let canvas = canvas_size.as_vec2();
        let scale = (canvas.x / image.x).min(canvas.y / image.y) * sampling.fill;
        let size = image * scale;
        let top_left = Vec2::new(
            (canvas.x - size.x) / 2.0,
            (canvas.y - size.y) / 2.0 + canvas.y * sampling.vertical_offset,
        );

        Some(Self {
            top_left,
            size,
            scale,
        })
    }
}

/// Whether a pixel belongs to the dark silhouette.
#[inline]
pub fn is_silhouette_pixel(px: &Rgba<u8>, sampling: &SamplingConfig) -> bool {
    let [r, g, b, a] = px.0;
    let brightness = r as u16 + g as u16 + b as u16;
    a > sampling.min_alpha && brightness < sampling.max_brightness
}

/// The particle set for one image at one canvas size.
#[derive(Debug, Clone, Default)]
pub struct ParticleField {
    particles: Vec<Particle>,
    size: UVec2,
}

impl ParticleField {
    /// A field with no particles.
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            particles: Vec::new(),
            size: UVec2::new(width, height),
        }
    }

    /// Lay `image` out on `surface`, read it back, and sample it.
    ///
    /// `surface` is the offscreen scratch canvas; its size is the canvas size
    /// the field is built for. It is left cleared afterwards.
    pub fn build<R: Rng>(
        image: &SourceImage,
        surface: &mut RasterCanvas,
        config: &DissipationConfig,
        rng: &mut R,
    ) -> Self {
        let (width, height) = surface.size();
        surface.clear();

        if let Some(placement) = Placement::fit(
            UVec2::new(image.width(), image.height()),
            UVec2::new(width, height),
            &config.sampling,
        ) {
            surface.draw_image(image.pixels(), placement.top_left, placement.size);
        }

        let field = Self::sample(surface.pixels(), config, rng);
        surface.clear();

        if field.is_empty() {
            log::warn!(
                "no silhouette pixels found at {}x{}; rendering an empty field",
                width,
                height
            );
        } else {
            log::info!(
                "built particle field: {} particles ({}x{}, gap {})",
                field.len(),
                width,
                height,
                config.sampling.gap
            );
        }
        field
    }

    /// Build for a `width` x `height` canvas using a temporary scratch surface.
    pub fn build_sized<R: Rng>(
        image: &SourceImage,
        width: u32,
        height: u32,
        config: &DissipationConfig,
        rng: &mut R,
    ) -> Self {
        let mut surface = RasterCanvas::new(width, height);
        Self::build(image, &mut surface, config, rng)
    }

    /// Sample an already rasterized canvas on a `gap` pixel grid.
    pub fn sample<R: Rng>(
        pixels: &RgbaImage,
        config: &DissipationConfig,
        rng: &mut R,
    ) -> Self {
        let (width, height) = pixels.dimensions();
        let gap = config.sampling.gap.max(1) as usize;
        let jitter = &config.particles;
        let mut particles = Vec::new();

        for y in (0..height).step_by(gap) {
            for x in (0..width).step_by(gap) {
                if !is_silhouette_pixel(pixels.get_pixel(x, y), &config.sampling) {
                    continue;
                }
                let size = jitter.size + rng.gen::<f32>() * jitter.size_jitter;
                let delay = rng.gen::<f32>() * jitter.max_delay;
                let noise_offset = rng.gen::<f32>() * jitter.noise_offset_range;
                particles.push(Particle::new(UVec2::new(x, y), size, delay, noise_offset));
            }
        }

        Self {
            particles,
            size: UVec2::new(width, height),
        }
    }

    /// Canvas size the field was built for.
    #[inline]
    pub fn size(&self) -> UVec2 {
        self.size
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }
}
