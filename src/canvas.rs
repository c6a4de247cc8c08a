//! Drawing surfaces.
//!
//! The effect only needs two drawing operations per frame: clear everything,
//! then fill a batch of circles. [`Canvas`] captures exactly that so the same
//! frame code drives the GPU window and the CPU [`RasterCanvas`].
//!
//! [`RasterCanvas`] additionally supports drawing a scaled image and reading
//! pixels back, which is what the particle field builder samples from.

use glam::{Vec2, Vec4};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use std::path::Path;

/// A 2D surface particles are drawn onto.
pub trait Canvas {
    /// Surface size in pixels.
    fn size(&self) -> (u32, u32);

    /// Erase the whole surface.
    fn clear(&mut self);

    /// Fill a circle. `color` is straight (non-premultiplied) RGBA in `0.0-1.0`.
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Vec4);
}

/// CPU raster surface backed by an RGBA8 buffer.
///
/// Circles are composited with source-over blending. Pixels whose centers
/// lie inside the circle are covered.
#[derive(Debug, Clone)]
pub struct RasterCanvas {
    pixels: RgbaImage,
    background: Rgba<u8>,
}

impl RasterCanvas {
    /// Create a fully transparent surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_background(width, height, Rgba([0, 0, 0, 0]))
    }

    /// Create a surface that clears to `background`.
    pub fn with_background(width: u32, height: u32, background: Rgba<u8>) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(width, height, background),
            background,
        }
    }

    /// Resize the surface, discarding its contents.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.pixels = RgbaImage::from_pixel(width, height, self.background);
    }

    /// Draw `image` scaled to `size` with its top-left corner at `top_left`.
    ///
    /// Positions and sizes are rounded to whole pixels. Pixels falling
    /// outside the surface are dropped.
    pub fn draw_image(&mut self, image: &RgbaImage, top_left: Vec2, size: Vec2) {
        let w = size.x.round().max(0.0) as u32;
        let h = size.y.round().max(0.0) as u32;
        if w == 0 || h == 0 || image.width() == 0 || image.height() == 0 {
            return;
        }

        let scaled = if (w, h) == image.dimensions() {
            image.clone()
        } else {
            imageops::resize(image, w, h, FilterType::Triangle)
        };
        imageops::overlay(
            &mut self.pixels,
            &scaled,
            top_left.x.round() as i64,
            top_left.y.round() as i64,
        );
    }

    /// Copy out a rectangular region, clipped to the surface.
    pub fn read_pixels(&self, x: u32, y: u32, width: u32, height: u32) -> RgbaImage {
        imageops::crop_imm(&self.pixels, x, y, width, height).to_image()
    }

    /// Borrow the whole surface.
    #[inline]
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Take ownership of the pixels.
    pub fn into_image(self) -> RgbaImage {
        self.pixels
    }

    /// Write the surface to an image file (format from the extension).
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), image::ImageError> {
        self.pixels.save(path)
    }
}

impl Canvas for RasterCanvas {
    fn size(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    fn clear(&mut self) {
        let bg = self.background;
        for px in self.pixels.pixels_mut() {
            *px = bg;
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Vec4) {
        let (width, height) = self.pixels.dimensions();
        if radius <= 0.0 || color.w <= 0.0 || width == 0 || height == 0 {
            return;
        }

        let min_x = (center.x - radius).floor().max(0.0) as u32;
        let min_y = (center.y - radius).floor().max(0.0) as u32;
        let max_x = (center.x + radius).ceil().min(width as f32) as u32;
        let max_y = (center.y + radius).ceil().min(height as f32) as u32;
        let r2 = radius * radius;

        for y in min_y..max_y {
            for x in min_x..max_x {
                let d = Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - center;
                if d.length_squared() <= r2 {
                    let dst = self.pixels.get_pixel_mut(x, y);
                    *dst = blend_over(*dst, color);
                }
            }
        }
    }
}

/// Source-over composite of a straight-alpha float color onto an RGBA8 pixel.
fn blend_over(dst: Rgba<u8>, src: Vec4) -> Rgba<u8> {
    let sa = src.w.clamp(0.0, 1.0);
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let channel = |s: f32, d: u8| {
        let d = d as f32 / 255.0;
        let c = (s.clamp(0.0, 1.0) * sa + d * da * (1.0 - sa)) / out_a;
        (c * 255.0).round() as u8
    };

    Rgba([
        channel(src.x, dst[0]),
        channel(src.y, dst[1]),
        channel(src.z, dst[2]),
        (out_a * 255.0).round() as u8,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_restores_background() {
        let bg = Rgba([10, 20, 30, 255]);
        let mut canvas = RasterCanvas::with_background(8, 8, bg);
        canvas.fill_circle(Vec2::new(4.0, 4.0), 3.0, Vec4::new(1.0, 1.0, 1.0, 1.0));
        assert_ne!(canvas.pixels().get_pixel(4, 4), &bg);
        canvas.clear();
        assert!(canvas.pixels().pixels().all(|p| *p == bg));
    }

    #[test]
    fn test_opaque_circle_covers_center_only() {
        let mut canvas = RasterCanvas::new(10, 10);
        canvas.fill_circle(Vec2::new(5.0, 5.0), 1.0, Vec4::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(canvas.pixels().get_pixel(4, 4), &Rgba([255, 0, 0, 255]));
        assert_eq!(canvas.pixels().get_pixel(0, 0), &Rgba([0, 0, 0, 0]));
        assert_eq!(canvas.pixels().get_pixel(9, 9), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_translucent_blend() {
        let mut canvas = RasterCanvas::with_background(4, 4, Rgba([255, 255, 255, 255]));
        canvas.fill_circle(Vec2::new(2.0, 2.0), 2.0, Vec4::new(0.0, 0.0, 0.0, 0.5));
        let px = canvas.pixels().get_pixel(1, 1);
        assert_eq!(px[3], 255);
        assert!((126..=129).contains(&px[0]), "got {:?}", px);
    }

    #[test]
    fn test_circle_clipped_at_edges() {
        let mut canvas = RasterCanvas::new(4, 4);
        canvas.fill_circle(Vec2::new(-1.0, -1.0), 3.0, Vec4::ONE);
        canvas.fill_circle(Vec2::new(100.0, 100.0), 3.0, Vec4::ONE);
        assert_eq!(canvas.pixels().get_pixel(0, 0)[3], 255);
    }

    #[test]
    fn test_draw_image_scales_and_offsets() {
        let src = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));
        let mut canvas = RasterCanvas::new(10, 10);
        canvas.draw_image(&src, Vec2::new(3.0, 4.0), Vec2::new(4.0, 4.0));

        assert!(canvas.pixels().get_pixel(3, 4)[3] >= 250);
        assert!(canvas.pixels().get_pixel(6, 7)[3] >= 250);
        assert_eq!(canvas.pixels().get_pixel(2, 4)[3], 0);
        assert_eq!(canvas.pixels().get_pixel(7, 4)[3], 0);
    }

    #[test]
    fn test_read_pixels_region() {
        let mut canvas = RasterCanvas::new(6, 6);
        canvas.fill_circle(Vec2::new(5.5, 5.5), 0.5, Vec4::ONE);
        let region = canvas.read_pixels(4, 4, 2, 2);
        assert_eq!(region.dimensions(), (2, 2));
        assert_eq!(region.get_pixel(1, 1)[3], 255);
        assert_eq!(region.get_pixel(0, 0)[3], 0);
    }
}
