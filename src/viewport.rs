//! Pan/zoom transform between screen space and canvas space.
//!
//! Every consumer converts through [`Viewport::to_canvas`] and
//! [`Viewport::to_screen`]:
//!
//! ```text
//! canvas = (screen - pan) / zoom
//! screen = canvas * zoom + pan
//! ```
//!
//! Zooming always goes through [`Viewport::zoom_about`] so the canvas point
//! under the anchor keeps its screen position.

use crate::geometry::{Point, Rect};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pan: Point,
    zoom: f32,
    min_zoom: f32,
    max_zoom: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(0.3, 2.0)
    }
}

impl Viewport {
    /// Identity transform with the given zoom limits.
    pub fn new(min_zoom: f32, max_zoom: f32) -> Self {
        let min_zoom = min_zoom.max(f32::EPSILON);
        let max_zoom = max_zoom.max(min_zoom);
        Self {
            pan: Point::ZERO,
            zoom: 1.0_f32.clamp(min_zoom, max_zoom),
            min_zoom,
            max_zoom,
        }
    }

    pub fn pan(&self) -> Point {
        self.pan
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn min_zoom(&self) -> f32 {
        self.min_zoom
    }

    pub fn max_zoom(&self) -> f32 {
        self.max_zoom
    }

    pub fn to_canvas(&self, screen: Point) -> Point {
        (screen - self.pan) / self.zoom
    }

    pub fn to_screen(&self, canvas: Point) -> Point {
        canvas * self.zoom + self.pan
    }

    pub fn rect_to_screen(&self, canvas: &Rect) -> Rect {
        let origin = self.to_screen(canvas.origin());
        Rect::new(
            origin.x,
            origin.y,
            canvas.width * self.zoom,
            canvas.height * self.zoom,
        )
    }

    pub fn rect_to_canvas(&self, screen: &Rect) -> Rect {
        Rect::from_corners(
            self.to_canvas(screen.top_left()),
            self.to_canvas(screen.bottom_right()),
        )
    }

    pub fn clamp_zoom(&self, zoom: f32) -> f32 {
        if zoom.is_finite() {
            zoom.clamp(self.min_zoom, self.max_zoom)
        } else {
            self.zoom
        }
    }

    /// Replace the zoom limits and re-clamp the current zoom about the origin.
    pub fn set_zoom_limits(&mut self, min_zoom: f32, max_zoom: f32) {
        self.min_zoom = min_zoom.min(max_zoom).max(f32::EPSILON);
        self.max_zoom = max_zoom.max(self.min_zoom);
        self.zoom = self.zoom.clamp(self.min_zoom, self.max_zoom);
    }

    pub fn set_pan(&mut self, pan: Point) {
        self.pan = pan;
    }

    /// Set zoom without moving the pan offset (the screen origin is the anchor).
    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = self.clamp_zoom(zoom);
    }

    /// Translate by a screen-space delta. Panning is not zoom-compensated.
    pub fn pan_by(&mut self, delta: Point) {
        self.pan = self.pan + delta;
    }

    /// Change zoom while keeping the canvas point under `anchor` fixed on screen.
    ///
    /// Returns `true` if the zoom actually changed.
    pub fn zoom_about(&mut self, anchor: Point, new_zoom: f32) -> bool {
        let new_zoom = self.clamp_zoom(new_zoom);
        if (new_zoom - self.zoom).abs() <= f32::EPSILON {
            return false;
        }
        let canvas = self.to_canvas(anchor);
        let delta = new_zoom - self.zoom;
        self.pan = self.pan - canvas * delta;
        self.zoom = new_zoom;
        true
    }

    /// Multiply zoom by `factor` about `anchor`.
    pub fn zoom_by(&mut self, anchor: Point, factor: f32) -> bool {
        self.zoom_about(anchor, self.zoom * factor)
    }

    /// Zoom one step in about the center of a canvas of `size` screen px.
    pub fn zoom_in(&mut self, size: Point, step: f32) -> bool {
        self.zoom_by(size * 0.5, step)
    }

    pub fn zoom_out(&mut self, size: Point, step: f32) -> bool {
        self.zoom_by(size * 0.5, 1.0 / step)
    }

    pub fn reset(&mut self) {
        self.pan = Point::ZERO;
        self.zoom = self.clamp_zoom(1.0);
    }

    /// Fit `bounds` (canvas space) into a screen area of `size` with `padding` px margins.
    pub fn zoom_to_fit(&mut self, bounds: &Rect, size: Point, padding: f32) {
        let avail_w = (size.x - padding * 2.0).max(1.0);
        let avail_h = (size.y - padding * 2.0).max(1.0);
        let zoom = if bounds.width <= 0.0 || bounds.height <= 0.0 {
            1.0
        } else {
            (avail_w / bounds.width).min(avail_h / bounds.height)
        };
        self.zoom = self.clamp_zoom(zoom);
        let center = bounds.center();
        self.pan = size * 0.5 - center * self.zoom;
    }
}
