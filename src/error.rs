//! Error types for dissipate.
//!
//! Each stage that can fail has its own enum: opening the render context,
//! decoding the silhouette, reading a config file, and running the window.
//! [`DissipationError`] collects the ones that end the event loop.

use std::fmt;

/// The window could not get a render context.
#[derive(Debug)]
pub enum GpuError {
    /// The window handle was rejected as a render target.
    Surface(wgpu::CreateSurfaceError),
    /// No adapter can present to the window surface.
    NoAdapter,
    /// The adapter refused to open a device.
    Device(wgpu::RequestDeviceError),
    /// The surface reports no usable texture format for this adapter.
    UnsupportedSurface,
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::Surface(e) => write!(f, "window cannot be rendered to: {}", e),
            GpuError::NoAdapter => write!(f, "no graphics adapter can present to this window"),
            GpuError::Device(e) => write!(f, "graphics device request failed: {}", e),
            GpuError::UnsupportedSurface => {
                write!(f, "surface offers no texture format for this adapter")
            }
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::Surface(e) => Some(e),
            GpuError::Device(e) => Some(e),
            GpuError::NoAdapter | GpuError::UnsupportedSurface => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::Surface(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::Device(e)
    }
}

/// Errors that can occur while loading the source silhouette.
#[derive(Debug)]
pub enum ImageLoadError {
    /// The bytes could not be decoded as a supported raster format.
    Decode(image::ImageError),
    /// Failed to read the file from disk.
    Io(std::io::Error),
}

impl fmt::Display for ImageLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageLoadError::Decode(e) => write!(f, "Failed to decode image: {}", e),
            ImageLoadError::Io(e) => write!(f, "Failed to read image file: {}", e),
        }
    }
}

impl std::error::Error for ImageLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImageLoadError::Decode(e) => Some(e),
            ImageLoadError::Io(e) => Some(e),
        }
    }
}

impl From<image::ImageError> for ImageLoadError {
    fn from(e: image::ImageError) -> Self {
        ImageLoadError::Decode(e)
    }
}

impl From<std::io::Error> for ImageLoadError {
    fn from(e: std::io::Error) -> Self {
        ImageLoadError::Io(e)
    }
}

/// Errors that can occur when loading, saving, or validating a configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read or write the config file.
    Io(std::io::Error),
    /// The file is not valid config JSON.
    Json(serde_json::Error),
    /// A value is outside the range the effect can work with.
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Failed to access config file: {}", e),
            ConfigError::Json(e) => write!(f, "Failed to parse config: {}", e),
            ConfigError::Invalid { field, reason } => {
                write!(f, "Invalid config value for `{}`: {}", field, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Json(e) => Some(e),
            ConfigError::Invalid { .. } => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

/// Errors that can occur when running the windowed effect.
#[derive(Debug)]
pub enum DissipationError {
    /// The platform event loop could not start.
    EventLoop(winit::error::EventLoopError),
    /// The OS refused to open the window.
    WindowCreation(winit::error::OsError),
    /// GPU initialization failed (no render context).
    Gpu(GpuError),
    /// The configuration was rejected.
    Config(ConfigError),
}

impl fmt::Display for DissipationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DissipationError::EventLoop(e) => write!(f, "event loop error: {}", e),
            DissipationError::WindowCreation(e) => write!(f, "cannot open window: {}", e),
            DissipationError::Gpu(e) => write!(f, "GPU error: {}", e),
            DissipationError::Config(e) => write!(f, "Config error: {}", e),
        }
    }
}

impl std::error::Error for DissipationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DissipationError::EventLoop(e) => Some(e),
            DissipationError::WindowCreation(e) => Some(e),
            DissipationError::Gpu(e) => Some(e),
            DissipationError::Config(e) => Some(e),
        }
    }
}

impl From<winit::error::EventLoopError> for DissipationError {
    fn from(e: winit::error::EventLoopError) -> Self {
        DissipationError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for DissipationError {
    fn from(e: winit::error::OsError) -> Self {
        DissipationError::WindowCreation(e)
    }
}

impl From<GpuError> for DissipationError {
    fn from(e: GpuError) -> Self {
        DissipationError::Gpu(e)
    }
}

impl From<ConfigError> for DissipationError {
    fn from(e: ConfigError) -> Self {
        DissipationError::Config(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_config_error_display_names_field() {
        let err = ConfigError::Invalid {
            field: "gap",
            reason: "must be at least 1",
        };
        let msg = err.to_string();
        assert!(msg.contains("gap"));
        assert!(msg.contains("at least 1"));
        assert!(err.source().is_none());
    }

    #[test]
    fn test_image_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.png");
        let err = ImageLoadError::from(io);
        assert!(err.source().is_some());
        assert!(err.to_string().contains("missing.png"));
    }

    #[test]
    fn test_gpu_error_wraps_into_dissipation_error() {
        let err = DissipationError::from(GpuError::NoAdapter);
        assert!(matches!(err, DissipationError::Gpu(GpuError::NoAdapter)));
        assert!(err.to_string().starts_with("GPU error"));
    }
}
