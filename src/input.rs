//! Pointer input.
//!
//! [`PointerInput`] turns raw window events into target progress. Both the
//! mouse cursor and the primary touch contact drive it; only the horizontal
//! coordinate matters. Events never render or rebuild anything, they only
//! write the shared [`ProgressTarget`].

use crate::progress::ProgressTarget;
use winit::event::{Touch, TouchPhase, WindowEvent};

/// Tracks the pointer and writes target progress.
#[derive(Debug)]
pub struct PointerInput {
    target: ProgressTarget,
    viewport_width: u32,
    /// Last horizontal pointer position in device pixels.
    pointer_x: Option<f32>,
    /// Touch id of the primary contact, if a touch is in progress.
    primary_touch: Option<u64>,
}

impl PointerInput {
    /// Create a tracker writing into `target`.
    pub fn new(target: ProgressTarget, viewport_width: u32) -> Self {
        Self {
            target,
            viewport_width,
            pointer_x: None,
            primary_touch: None,
        }
    }

    /// The register this tracker writes.
    pub fn target(&self) -> &ProgressTarget {
        &self.target
    }

    /// Last seen horizontal pointer position.
    pub fn pointer_x(&self) -> Option<f32> {
        self.pointer_x
    }

    /// Update the width pointer positions are normalized against.
    pub fn set_viewport_width(&mut self, width: u32) {
        self.viewport_width = width;
    }

    /// Mouse cursor moved to horizontal position `x`.
    pub fn pointer_moved(&mut self, x: f32) {
        self.pointer_x = Some(x);
        self.target.set_from_pointer(x, self.viewport_width as f32);
    }

    /// A touch contact changed. Only the first contact to start is followed.
    pub fn touch(&mut self, id: u64, phase: TouchPhase, x: f32) {
        match phase {
            TouchPhase::Started => {
                if self.primary_touch.is_none() {
                    self.primary_touch = Some(id);
                    self.pointer_moved(x);
                }
            }
            TouchPhase::Moved => {
                if self.primary_touch == Some(id) {
                    self.pointer_moved(x);
                }
            }
            TouchPhase::Ended | TouchPhase::Cancelled => {
                if self.primary_touch == Some(id) {
                    self.primary_touch = None;
                }
            }
        }
    }

    /// Process a winit window event.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.pointer_moved(position.x as f32);
            }
            WindowEvent::Touch(Touch {
                id,
                phase,
                location,
                ..
            }) => {
                self.touch(*id, *phase, location.x as f32);
            }
            WindowEvent::Resized(size) => {
                self.set_viewport_width(size.width);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_sets_target() {
        let target = ProgressTarget::new();
        let mut input = PointerInput::new(target.clone(), 1000);
        input.pointer_moved(250.0);
        assert_eq!(target.get(), 0.25);
        assert_eq!(input.pointer_x(), Some(250.0));

        input.pointer_moved(5000.0);
        assert_eq!(target.get(), 1.0);
    }

    #[test]
    fn test_zero_width_viewport_ignored() {
        let target = ProgressTarget::new();
        let mut input = PointerInput::new(target.clone(), 0);
        input.pointer_moved(100.0);
        assert_eq!(target.get(), 0.0);
    }

    #[test]
    fn test_primary_touch_only() {
        let target = ProgressTarget::new();
        let mut input = PointerInput::new(target.clone(), 100);

        input.touch(1, TouchPhase::Started, 10.0);
        input.touch(2, TouchPhase::Started, 90.0);
        assert_eq!(target.get(), 0.1);

        input.touch(2, TouchPhase::Moved, 80.0);
        assert_eq!(target.get(), 0.1);

        input.touch(1, TouchPhase::Moved, 50.0);
        assert_eq!(target.get(), 0.5);

        // Once the primary lifts, the next new contact takes over
        input.touch(1, TouchPhase::Ended, 50.0);
        input.touch(3, TouchPhase::Started, 20.0);
        assert_eq!(target.get(), 0.2);
    }

    #[test]
    fn test_resize_changes_normalization() {
        let target = ProgressTarget::new();
        let mut input = PointerInput::new(target.clone(), 100);
        input.set_viewport_width(400);
        input.pointer_moved(100.0);
        assert_eq!(target.get(), 0.25);
    }
}
