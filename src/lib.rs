//! # Dissipate
//!
//! An interactive particle dissipation effect: a silhouette image is sampled
//! into a point cloud, and moving the pointer horizontally dissolves it into
//! rising, noise-driven smoke.
//!
//! ## Quick Start
//!
//! ```ignore
//! use dissipate::prelude::*;
//!
//! fn main() -> Result<(), DissipationError> {
//!     Simulation::new("assets/silhouette.png")
//!         .with_title("Smoke")
//!         .run()
//! }
//! ```
//!
//! ## How it works
//!
//! 1. **Sampling.** The image is scaled to 75% of the viewport, drawn on an
//!    offscreen canvas, and read back on a 3 pixel grid. Every opaque, dark
//!    grid pixel becomes a [`Particle`] with a jittered size and start delay.
//! 2. **Progress.** The pointer's x position sets a target in `[0, 1]`; the
//!    global progress eases towards it each frame.
//! 3. **Dissolve.** Each particle turns the global progress into its own
//!    (delayed, staggered) progress, then rises, swirls along a 3-octave
//!    simplex fBm flow field, grows, and fades.
//!
//! Nothing accumulates between frames: a particle's appearance is a pure
//! function of its origin, its delay, the progress and the time.
//!
//! ## Headless use
//!
//! [`Dissipation`] does not need a window. Render frames onto a
//! [`RasterCanvas`] to inspect them or save them as PNG:
//!
//! ```ignore
//! let mut effect = Dissipation::new(DissipationConfig::default(), 800, 600)?;
//! effect.on_image_loaded(SourceImage::open("silhouette.png"));
//! effect.target().set(0.4);
//!
//! let mut canvas = RasterCanvas::with_background(800, 600, image::Rgba([243, 244, 246, 255]));
//! for _ in 0..60 {
//!     effect.frame(0.0, &mut canvas);
//! }
//! canvas.save("frame.png")?;
//! ```

pub mod animation;
pub mod canvas;
pub mod config;
pub mod engine;
pub mod error;
pub mod field;
pub mod fractal;
mod gpu;
pub mod input;
pub mod noise;
pub mod particle;
pub mod progress;
mod simulation;
pub mod source;
pub mod step;
pub mod time;
mod window;

pub use animation::{CancelHandle, FrameLoop, ResizeDebouncer, ResizePlan};
pub use canvas::{Canvas, RasterCanvas};
pub use config::DissipationConfig;
pub use engine::{Dissipation, FrameStats, LoadState};
pub use error::{ConfigError, DissipationError, GpuError, ImageLoadError};
pub use field::ParticleField;
pub use fractal::Fractal;
pub use glam::{UVec2, Vec2, Vec4};
pub use crate::noise::{Noise3, SimplexNoise};
pub use particle::Particle;
pub use progress::{EasedProgress, ProgressTarget};
pub use simulation::Simulation;
pub use source::{ImageSource, SourceImage};
pub use time::Clock;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use dissipate::prelude::*;
/// ```
pub mod prelude {
    pub use crate::canvas::{Canvas, RasterCanvas};
    pub use crate::config::DissipationConfig;
    pub use crate::engine::{Dissipation, FrameStats, LoadState};
    pub use crate::error::DissipationError;
    pub use crate::simulation::Simulation;
    pub use crate::source::{ImageSource, SourceImage};
    pub use crate::{Vec2, Vec4};
}
