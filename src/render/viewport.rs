//! Viewport for 2D rendering
//!
//! Maps lattice units (y up) onto canvas pixels (y down) and back.

use glam::Vec2;

use crate::render::CanvasSize;

/// Scale at zoom 1.0: one lattice unit spans this many pixels
pub const PIXELS_PER_UNIT: f32 = 48.0;

/// Empty border kept around the lattice by `fit`, in lattice units
pub const FIT_PADDING: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Lattice point drawn at the canvas centre
    pub centre: Vec2,
    /// 1.0 = `PIXELS_PER_UNIT`
    pub zoom: f32,
    pub canvas: CanvasSize,
}

impl Viewport {
    pub fn new(canvas: CanvasSize) -> Self {
        Self {
            centre: Vec2::ZERO,
            zoom: 1.0,
            canvas,
        }
    }

    /// Centre on `bounds` and zoom so they fill the canvas with some padding
    pub fn fit(bounds: (Vec2, Vec2), canvas: CanvasSize) -> Self {
        let (min, max) = bounds;
        let extent = (max - min) + Vec2::splat(2.0 * FIT_PADDING);
        let zoom_x = canvas.width / (extent.x * PIXELS_PER_UNIT);
        let zoom_y = canvas.height / (extent.y * PIXELS_PER_UNIT);
        let zoom = zoom_x.min(zoom_y);
        Self {
            centre: (min + max) / 2.0,
            zoom: if zoom.is_finite() && zoom > 0.0 { zoom } else { 1.0 },
            canvas,
        }
    }

    fn scale(&self) -> f32 {
        self.zoom * PIXELS_PER_UNIT
    }

    /// Lattice units to canvas pixels
    pub fn to_canvas(&self, point: Vec2) -> Vec2 {
        let relative = point - self.centre;
        Vec2::new(
            relative.x * self.scale() + self.canvas.width / 2.0,
            -relative.y * self.scale() + self.canvas.height / 2.0,
        )
    }

    /// Canvas pixels to lattice units
    pub fn to_lattice(&self, pixel: Vec2) -> Vec2 {
        let x = (pixel.x - self.canvas.width / 2.0) / self.scale();
        let y = -(pixel.y - self.canvas.height / 2.0) / self.scale();
        Vec2::new(x, y) + self.centre
    }

    /// Length in lattice units to pixels
    pub fn length_to_canvas(&self, length: f32) -> f32 {
        length * self.scale()
    }

    /// Adjust zoom level, clamped to [0.1, 10.0]
    pub fn adjust_zoom(&mut self, delta: f32) {
        self.zoom = (self.zoom * (1.0 + delta)).clamp(0.1, 10.0);
    }
}
