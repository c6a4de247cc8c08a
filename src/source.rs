//! Loading the source silhouette.
//!
//! The effect needs one decoded RGBA bitmap. It can come from a file on disk
//! or from bytes already in memory (for example `include_bytes!` data):
//!
//! ```ignore
//! let from_disk = SourceImage::open("assets/silhouette.png")?;
//! let embedded = SourceImage::from_bytes(include_bytes!("silhouette.png"))?;
//! ```
//!
//! # Supported Formats
//!
//! - PNG (recommended, keeps transparency)
//! - JPEG

use crate::error::ImageLoadError;
use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where the source image comes from.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// A file on disk.
    Path(PathBuf),
    /// Encoded image bytes held in memory.
    Bytes(Arc<[u8]>),
}

impl ImageSource {
    /// Read and decode the image.
    pub fn load(&self) -> Result<SourceImage, ImageLoadError> {
        match self {
            ImageSource::Path(path) => SourceImage::open(path),
            ImageSource::Bytes(bytes) => SourceImage::from_bytes(bytes),
        }
    }

    /// Human readable description for logs.
    pub fn describe(&self) -> String {
        match self {
            ImageSource::Path(path) => path.display().to_string(),
            ImageSource::Bytes(bytes) => format!("<{} embedded bytes>", bytes.len()),
        }
    }
}

impl From<&str> for ImageSource {
    fn from(path: &str) -> Self {
        ImageSource::Path(PathBuf::from(path))
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        ImageSource::Path(path)
    }
}

impl From<&Path> for ImageSource {
    fn from(path: &Path) -> Self {
        ImageSource::Path(path.to_path_buf())
    }
}

impl From<&'static [u8]> for ImageSource {
    fn from(bytes: &'static [u8]) -> Self {
        ImageSource::Bytes(Arc::from(bytes))
    }
}

impl From<Vec<u8>> for ImageSource {
    fn from(bytes: Vec<u8>) -> Self {
        ImageSource::Bytes(Arc::from(bytes))
    }
}

/// A decoded RGBA8 bitmap.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pixels: RgbaImage,
}

impl SourceImage {
    /// Decode an image file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ImageLoadError> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_bytes(&bytes)
    }

    /// Decode an in-memory encoded image.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ImageLoadError> {
        let pixels = image::load_from_memory(bytes)?.into_rgba8();
        Ok(Self { pixels })
    }

    /// Wrap an already decoded bitmap.
    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// The decoded pixels.
    #[inline]
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}
