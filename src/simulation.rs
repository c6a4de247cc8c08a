//! Simulation builder and runner

use crate::config::DissipationConfig;
use crate::engine::Dissipation;
use crate::error::DissipationError;
use crate::source::ImageSource;
use crate::window::{App, WINDOW_HEIGHT, WINDOW_WIDTH};
use winit::event_loop::{ControlFlow, EventLoop};

/// A windowed dissipation effect builder.
///
/// Use method chaining to configure, then call `.run()` to open the window.
///
/// # Example
///
/// ```ignore
/// use dissipate::prelude::*;
///
/// fn main() -> Result<(), DissipationError> {
///     Simulation::new("assets/silhouette.png")
///         .with_seed(42)
///         .with_title("Smoke")
///         .run()
/// }
/// ```
pub struct Simulation {
    source: ImageSource,
    config: DissipationConfig,
    seed: Option<u64>,
    title: String,
}

impl Simulation {
    /// Create a simulation for an image file or embedded image bytes.
    pub fn new(source: impl Into<ImageSource>) -> Self {
        Self {
            source: source.into(),
            config: DissipationConfig::default(),
            seed: None,
            title: "Dissipate".to_string(),
        }
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: DissipationConfig) -> Self {
        self.config = config;
        self
    }

    /// Seed particle jitter and the flow field for a reproducible run.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the window title. Status and hint text are appended to it.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Coalesce resize bursts arriving within `millis` of each other.
    pub fn with_resize_debounce(mut self, millis: u64) -> Self {
        self.config.resize_debounce_ms = Some(millis);
        self
    }

    /// The configuration the effect will run with.
    pub fn config(&self) -> &DissipationConfig {
        &self.config
    }

    /// Open the window and run until it is closed.
    ///
    /// Fails on an invalid configuration, or if the window or GPU context
    /// cannot be created. A missing or undecodable image is not an error: the
    /// window stays open showing the failure message.
    pub fn run(self) -> Result<(), DissipationError> {
        let mut effect = Dissipation::new(self.config, WINDOW_WIDTH, WINDOW_HEIGHT)?;
        if let Some(seed) = self.seed {
            effect = effect.with_seed(seed);
        }

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Wait);

        let mut app = App::new(self.title, self.source, effect);
        event_loop.run_app(&mut app)?;

        match app.take_error() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_chain() {
        let mut config = DissipationConfig::default();
        config.sampling.gap = 4;

        let sim = Simulation::new("missing.png")
            .with_config(config)
            .with_seed(3)
            .with_title("Test")
            .with_resize_debounce(150);

        assert_eq!(sim.config().sampling.gap, 4);
        assert_eq!(sim.config().resize_debounce_ms, Some(150));
        assert_eq!(sim.seed, Some(3));
        assert_eq!(sim.title, "Test");
        assert!(matches!(sim.source, ImageSource::Path(_)));
    }
}
