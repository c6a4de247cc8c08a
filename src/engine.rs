//! The dissipation effect, independent of any window.
//!
//! [`Dissipation`] owns the particle field, the flow field and the progress
//! state. The host feeds it three kinds of events:
//!
//! - the decoded image (or the failure to get one) via [`Dissipation::on_image_loaded`]
//! - viewport size changes via [`Dissipation::resize`]
//! - pointer positions, written into [`Dissipation::target`] from anywhere
//!
//! and calls [`Dissipation::frame`] once per display frame with any
//! [`Canvas`] to draw on.
//!
//! # Example
//!
//! ```ignore
//! use dissipate::prelude::*;
//!
//! let mut effect = Dissipation::new(DissipationConfig::default(), 800, 600)?;
//! effect.on_image_loaded(SourceImage::open("silhouette.png"));
//!
//! let mut canvas = RasterCanvas::new(800, 600);
//! effect.target().set(0.5);
//! let stats = effect.frame(0.0, &mut canvas);
//! ```

use crate::animation::{CancelHandle, FrameLoop};
use crate::canvas::{Canvas, RasterCanvas};
use crate::config::DissipationConfig;
use crate::error::{ConfigError, ImageLoadError};
use crate::field::ParticleField;
use crate::fractal::Fractal;
use crate::noise::SimplexNoise;
use crate::progress::{EasedProgress, ProgressTarget};
use crate::source::SourceImage;
use crate::step::{step, Phase, StepContext};
use glam::UVec2;
use rand::rngs::SmallRng;
use rand::SeedableRng;

/// Status shown while the image is still on its way.
pub const LOADING_MESSAGE: &str = "Initializing FBM Smoke...";
/// Status shown when the image could not be loaded.
pub const FAILED_MESSAGE: &str = "Failed to load image.";
/// Interaction hint shown until the pointer has moved far enough.
pub const HINT_MESSAGE: &str = "Move cursor horizontally to disperse";

/// Whether the source image is available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// Waiting for the image.
    Loading,
    /// Image loaded; frames are being produced.
    Ready,
    /// Loading failed. Terminal.
    Failed(String),
}

impl LoadState {
    #[inline]
    pub fn is_failed(&self) -> bool {
        matches!(self, LoadState::Failed(_))
    }
}

/// Counts for one rendered frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    /// Eased global progress used for the frame.
    pub progress: f32,
    /// Particles drawn.
    pub drawn: usize,
    /// Particles skipped because they had faded out.
    pub hidden: usize,
    /// Drawn particles still resting at their origin.
    pub solid: usize,
}

/// The interactive particle dissipation effect.
pub struct Dissipation {
    config: DissipationConfig,
    noise: SimplexNoise,
    fractal: Fractal,
    field: ParticleField,
    image: Option<SourceImage>,
    /// Offscreen surface the image is drawn onto for sampling.
    scratch: RasterCanvas,
    viewport: UVec2,
    target: ProgressTarget,
    progress: EasedProgress,
    state: LoadState,
    rng: SmallRng,
    frames: FrameLoop,
}

impl Dissipation {
    /// Create the effect for a `width` x `height` viewport.
    ///
    /// The noise permutation is seeded from `config.flow.seed` when set,
    /// otherwise randomly.
    pub fn new(config: DissipationConfig, width: u32, height: u32) -> Result<Self, ConfigError> {
        config.validate()?;

        let noise = match config.flow.seed {
            Some(seed) => SimplexNoise::new(seed),
            None => SimplexNoise::random(),
        };

        Ok(Self {
            fractal: config.flow.to_fractal(),
            progress: EasedProgress::new(config.motion.ease),
            noise,
            field: ParticleField::empty(width, height),
            image: None,
            scratch: RasterCanvas::new(width, height),
            viewport: UVec2::new(width, height),
            target: ProgressTarget::new(),
            state: LoadState::Loading,
            rng: SmallRng::from_entropy(),
            frames: FrameLoop::new(),
            config,
        })
    }

    /// Make particle jitter and the flow field reproducible.
    ///
    /// An explicit `flow.seed` in the config still takes precedence for the
    /// flow field.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = SmallRng::seed_from_u64(seed);
        self.noise = SimplexNoise::new(self.config.flow.seed.unwrap_or(seed));
        if self.image.is_some() {
            self.rebuild();
        }
        self
    }

    // ========== Events ==========

    /// Deliver the result of loading the source image.
    ///
    /// Success builds the field and starts the frame loop. Failure is
    /// terminal: the loop never starts and the failure message is shown.
    pub fn on_image_loaded(&mut self, result: Result<SourceImage, ImageLoadError>) {
        if self.state.is_failed() {
            return;
        }
        match result {
            Ok(image) => {
                log::info!("source image loaded ({}x{})", image.width(), image.height());
                self.image = Some(image);
                self.rebuild();
                self.state = LoadState::Ready;
                self.frames.start();
            }
            Err(e) => {
                log::error!("{}", e);
                self.state = LoadState::Failed(FAILED_MESSAGE.to_string());
                self.frames.cancel();
            }
        }
    }

    /// The viewport changed size. Rebuilds the field; progress carries over.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.viewport == UVec2::new(width, height) {
            return;
        }
        self.viewport = UVec2::new(width, height);
        self.scratch.resize(width, height);
        if self.image.is_some() {
            self.rebuild();
        } else {
            self.field = ParticleField::empty(width, height);
        }
    }

    /// Resample the current image at the current viewport size.
    pub fn rebuild(&mut self) {
        if let Some(image) = &self.image {
            self.field =
                ParticleField::build(image, &mut self.scratch, &self.config, &mut self.rng);
        }
    }

    // ========== Frame ==========

    /// Advance progress one frame and draw every visible particle.
    ///
    /// `time` is the scaled noise time. Returns `None` without touching the
    /// canvas while loading, after a failure, or once cancelled.
    pub fn frame<C: Canvas + ?Sized>(&mut self, time: f32, canvas: &mut C) -> Option<FrameStats> {
        if !self.frames.should_run() {
            return None;
        }

        let progress = self.progress.advance(self.target.get());
        let color = self.config.appearance.particle_rgb();
        let ctx = StepContext {
            noise: &self.noise,
            fractal: &self.fractal,
            dissolve: &self.config.dissolve,
            progress,
            time,
        };

        canvas.clear();
        let mut stats = FrameStats {
            progress,
            ..Default::default()
        };
        for particle in self.field.particles_mut() {
            match step(particle, &ctx) {
                Some(splat) => {
                    canvas.fill_circle(splat.center, splat.radius, color.extend(splat.alpha));
                    stats.drawn += 1;
                    if splat.phase == Phase::Solid {
                        stats.solid += 1;
                    }
                }
                None => stats.hidden += 1,
            }
        }
        Some(stats)
    }

    // ========== Accessors ==========

    /// The register pointer input writes into.
    pub fn target(&self) -> ProgressTarget {
        self.target.clone()
    }

    /// Eased global progress after the last frame.
    #[inline]
    pub fn progress(&self) -> f32 {
        self.progress.current()
    }

    #[inline]
    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Whether the interaction hint should be shown.
    pub fn hint_visible(&self) -> bool {
        !self.state.is_failed() && self.target.get() <= self.config.appearance.hint_threshold
    }

    /// Loading or failure message, if any.
    pub fn status_text(&self) -> Option<&str> {
        match &self.state {
            LoadState::Loading => Some(LOADING_MESSAGE),
            LoadState::Failed(message) => Some(message.as_str()),
            LoadState::Ready => None,
        }
    }

    /// The status if there is one, otherwise the hint if visible.
    pub fn overlay_text(&self) -> Option<&str> {
        self.status_text()
            .or_else(|| self.hint_visible().then_some(HINT_MESSAGE))
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn config(&self) -> &DissipationConfig {
        &self.config
    }

    #[inline]
    pub fn viewport(&self) -> UVec2 {
        self.viewport
    }

    /// Handle that stops the frame loop.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.frames.handle()
    }

    /// Whether [`frame`](Self::frame) will draw.
    pub fn is_running(&self) -> bool {
        self.frames.is_running()
    }
}

impl std::fmt::Debug for Dissipation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dissipation")
            .field("state", &self.state)
            .field("viewport", &self.viewport)
            .field("particles", &self.field.len())
            .field("progress", &self.progress.current())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn dark_square(size: u32) -> SourceImage {
        SourceImage::from_rgba(RgbaImage::from_pixel(size, size, Rgba([20, 20, 20, 255])))
    }

    fn seeded(width: u32, height: u32) -> Dissipation {
        Dissipation::new(DissipationConfig::default(), width, height)
            .unwrap()
            .with_seed(7)
    }

    fn io_failure() -> ImageLoadError {
        ImageLoadError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"))
    }

    #[test]
    fn test_loading_state_draws_nothing() {
        let mut effect = seeded(60, 60);
        let mut canvas = RasterCanvas::new(60, 60);

        assert_eq!(effect.state(), &LoadState::Loading);
        assert_eq!(effect.status_text(), Some(LOADING_MESSAGE));
        assert!(effect.frame(0.0, &mut canvas).is_none());
        assert!(effect.field().is_empty());
    }

    #[test]
    fn test_load_builds_field_and_starts() {
        let mut effect = seeded(60, 60);
        effect.on_image_loaded(Ok(dark_square(20)));

        assert_eq!(effect.state(), &LoadState::Ready);
        assert!(effect.is_running());
        assert!(!effect.field().is_empty());
        assert_eq!(effect.status_text(), None);
        assert_eq!(effect.overlay_text(), Some(HINT_MESSAGE));
    }

    #[test]
    fn test_first_frame_all_solid() {
        let mut effect = seeded(60, 60);
        effect.on_image_loaded(Ok(dark_square(20)));
        let mut canvas = RasterCanvas::new(60, 60);

        let stats = effect.frame(0.0, &mut canvas).unwrap();
        assert_eq!(stats.progress, 0.0);
        assert_eq!(stats.drawn, effect.field().len());
        assert_eq!(stats.solid, stats.drawn);
        assert_eq!(stats.hidden, 0);
    }

    #[test]
    fn test_full_progress_hides_everything() {
        let mut effect = seeded(60, 60);
        effect.on_image_loaded(Ok(dark_square(20)));
        let mut canvas = RasterCanvas::new(60, 60);
        effect.target().set(1.0);

        let mut last = FrameStats::default();
        for _ in 0..200 {
            last = effect.frame(0.0, &mut canvas).unwrap();
        }
        assert!(last.progress > 0.999);
        assert_eq!(last.drawn, 0);
        assert_eq!(last.hidden, effect.field().len());
        assert!(!effect.hint_visible());
        assert_eq!(effect.overlay_text(), None);
    }

    #[test]
    fn test_failed_load_is_terminal() {
        let mut effect = seeded(60, 60);
        effect.on_image_loaded(Err(io_failure()));

        assert_eq!(effect.state(), &LoadState::Failed(FAILED_MESSAGE.to_string()));
        assert_eq!(effect.status_text(), Some(FAILED_MESSAGE));
        assert!(!effect.hint_visible());

        // A late success does not revive it
        effect.on_image_loaded(Ok(dark_square(20)));
        assert!(effect.state().is_failed());
        let mut canvas = RasterCanvas::new(60, 60);
        assert!(effect.frame(0.0, &mut canvas).is_none());
    }

    #[test]
    fn test_resize_keeps_progress() {
        let mut effect = seeded(60, 60);
        effect.on_image_loaded(Ok(dark_square(20)));
        let mut canvas = RasterCanvas::new(60, 60);
        effect.target().set(0.5);
        for _ in 0..10 {
            effect.frame(0.0, &mut canvas);
        }
        let before = effect.progress();
        let count = effect.field().len();

        effect.resize(120, 120);
        assert_eq!(effect.progress(), before);
        assert_eq!(effect.viewport(), UVec2::new(120, 120));
        assert_eq!(effect.field().size(), UVec2::new(120, 120));
        assert!(effect.field().len() > count);
    }

    #[test]
    fn test_cancel_stops_frames() {
        let mut effect = seeded(60, 60);
        effect.on_image_loaded(Ok(dark_square(20)));
        let handle = effect.cancel_handle();
        let mut canvas = RasterCanvas::new(60, 60);

        assert!(effect.frame(0.0, &mut canvas).is_some());
        handle.cancel();
        handle.cancel();
        assert!(effect.frame(0.0, &mut canvas).is_none());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = DissipationConfig::default();
        config.motion.ease = 0.0;
        assert!(Dissipation::new(config, 10, 10).is_err());
    }

    #[test]
    fn test_frame_draws_particle_color() {
        let mut effect = seeded(60, 60);
        effect.on_image_loaded(Ok(dark_square(20)));
        let mut canvas = RasterCanvas::new(60, 60);
        effect.frame(0.0, &mut canvas).unwrap();

        let origin = effect.field().particles()[0].origin;
        let px = canvas.pixels().get_pixel(origin.x, origin.y);
        assert_eq!(px.0, [50, 55, 60, 255]);
    }
}
