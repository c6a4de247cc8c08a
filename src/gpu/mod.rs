//! Window rendering through wgpu.
//!
//! [`GpuState`] implements [`Canvas`] by collecting circles into an instance
//! list during the frame and drawing them all in one instanced pass on
//! [`render`](GpuState::render).

mod dots;

use std::sync::Arc;

use glam::{Vec2, Vec4};
use winit::window::Window;

use dots::{DotInstance, DotRenderer};

use crate::canvas::Canvas;
use crate::error::GpuError;

pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    dots: DotRenderer,
    instances: Vec<DotInstance>,
    /// Background in the surface's color space.
    clear_color: wgpu::Color,
    /// Surface stores sRGB; incoming colors are converted to linear.
    srgb_surface: bool,
}

impl GpuState {
    /// Create the surface, device and pipeline for `window`.
    ///
    /// `background` is straight sRGB RGBA in `0.0-1.0`.
    pub async fn new(window: Arc<Window>, background: Vec4) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(GpuError::UnsupportedSurface)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        log::info!(
            "GPU ready: {} ({:?}), surface {:?} {}x{}",
            adapter.get_info().name,
            adapter.get_info().backend,
            surface_format,
            config.width,
            config.height
        );

        let srgb_surface = surface_format.is_srgb();
        let background = to_surface_color(background, srgb_surface);
        let dots = DotRenderer::new(&device, surface_format);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            dots,
            instances: Vec::new(),
            clear_color: wgpu::Color {
                r: background.x as f64,
                g: background.y as f64,
                b: background.z as f64,
                a: background.w as f64,
            },
            srgb_surface,
        })
    }

    /// Reconfigure the surface. Zero sizes (minimized windows) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Reconfigure with the current size, after the surface was lost.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Clear the surface and draw every queued circle.
    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.dots.prepare(
            &self.device,
            &self.queue,
            (self.config.width, self.config.height),
            &self.instances,
        );

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.dots.draw(&mut render_pass);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

impl Canvas for GpuState {
    fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    fn clear(&mut self) {
        self.instances.clear();
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Vec4) {
        if radius <= 0.0 || color.w <= 0.0 {
            return;
        }
        self.instances.push(DotInstance {
            center: center.to_array(),
            radius,
            color: to_surface_color(color, self.srgb_surface).to_array(),
        });
    }
}

/// Convert straight sRGB RGBA to what the surface expects. Alpha is linear
/// either way.
fn to_surface_color(color: Vec4, srgb_surface: bool) -> Vec4 {
    if srgb_surface {
        Vec4::new(
            srgb_to_linear(color.x),
            srgb_to_linear(color.y),
            srgb_to_linear(color.z),
            color.w,
        )
    } else {
        color
    }
}

/// sRGB transfer function, inverse.
#[inline]
fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_srgb_to_linear_endpoints() {
        assert_eq!(srgb_to_linear(0.0), 0.0);
        assert!((srgb_to_linear(1.0) - 1.0).abs() < 1e-6);
        // Mid grey is much darker in linear light
        let mid = srgb_to_linear(0.5);
        assert!((mid - 0.214).abs() < 1e-3, "got {mid}");
    }

    #[test]
    fn test_surface_color_keeps_alpha() {
        let c = Vec4::new(0.5, 0.5, 0.5, 0.3);
        assert_eq!(to_surface_color(c, false), c);
        assert_eq!(to_surface_color(c, true).w, 0.3);
    }
}
