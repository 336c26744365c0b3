//! Multi-touch gesture recognition.
//!
//! One finger pans, two fingers pinch-zoom about their current midpoint, and
//! a short touch with almost no movement is a tap. The recognizer never owns
//! the viewport: it reads it and reports what the viewport should become.

use crate::config::EngineConfig;
use crate::geometry::Point;
use crate::input::{TouchEvent, TouchPoint};
use crate::viewport::Viewport;
use std::time::Duration;

/// Output of the recognizer, applied by the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    /// Screen-space pan delta (not zoom compensated).
    Pan { delta: Point },
    /// New viewport values after a pinch frame.
    Zoom { zoom: f32, pan: Point },
    /// Single tap released at this screen position.
    Tap { position: Point },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    Idle,
    Pan { last: Point },
    Pinch { start_distance: f32, start_zoom: f32 },
}

#[derive(Debug, Clone)]
pub struct GestureRecognizer {
    enabled: bool,
    node_drag_active: bool,
    mode: Mode,
    move_count: u32,
    pinched: bool,
    last_tap: Option<Duration>,
    tap_max_moves: u32,
    double_tap_window: Duration,
}

impl Default for GestureRecognizer {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

fn pinch_metrics(a: &TouchPoint, b: &TouchPoint) -> (f32, Point) {
    (a.position.distance(b.position), a.position.midpoint(b.position))
}

impl GestureRecognizer {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            enabled: true,
            node_drag_active: false,
            mode: Mode::Idle,
            move_count: 0,
            pinched: false,
            last_tap: None,
            tap_max_moves: config.tap_max_moves,
            double_tap_window: config.double_tap_window,
        }
    }

    /// Disable single-finger panning (pinch and tap stay active).
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// While a node drag owns the single finger, it must not pan.
    pub fn set_node_drag_active(&mut self, active: bool) {
        self.node_drag_active = active;
        if active {
            if let Mode::Pan { .. } = self.mode {
                self.mode = Mode::Idle;
            }
        }
    }

    pub fn is_pinching(&self) -> bool {
        matches!(self.mode, Mode::Pinch { .. })
    }

    pub fn is_panning(&self) -> bool {
        matches!(self.mode, Mode::Pan { .. })
    }

    /// Reclassify from the fingers currently down.
    fn classify(&mut self, touches: &[TouchPoint], viewport: &Viewport) {
        self.mode = match touches {
            [] => Mode::Idle,
            [single] => {
                if self.enabled && !self.node_drag_active {
                    Mode::Pan {
                        last: single.position,
                    }
                } else {
                    Mode::Idle
                }
            }
            [a, b, ..] => {
                self.pinched = true;
                let (distance, _) = pinch_metrics(a, b);
                Mode::Pinch {
                    start_distance: distance,
                    start_zoom: viewport.zoom(),
                }
            }
        };
        log::trace!("gesture mode -> {:?}", self.mode);
    }

    pub fn touch_start(&mut self, event: &TouchEvent, viewport: &Viewport) {
        if matches!(self.mode, Mode::Idle) && event.touches.len() <= event.changed_touches.len() {
            // First finger(s) of a new gesture
            self.move_count = 0;
            self.pinched = false;
        }
        self.classify(&event.touches, viewport);
    }

    pub fn touch_move(&mut self, event: &TouchEvent, viewport: &Viewport) -> Option<GestureEvent> {
        self.move_count = self.move_count.saturating_add(1);
        match (&mut self.mode, event.touches.as_slice()) {
            (Mode::Pan { last }, [touch]) => {
                let delta = touch.position - *last;
                *last = touch.position;
                Some(GestureEvent::Pan { delta })
            }
            (
                Mode::Pinch {
                    start_distance,
                    start_zoom,
                },
                [a, b, ..],
            ) => {
                if *start_distance <= f32::EPSILON {
                    return None;
                }
                let (distance, center) = pinch_metrics(a, b);
                let scale = distance / *start_distance;
                let mut next = *viewport;
                next.zoom_about(center, *start_zoom * scale);
                Some(GestureEvent::Zoom {
                    zoom: next.zoom(),
                    pan: next.pan(),
                })
            }
            _ => None,
        }
    }

    pub fn touch_end(&mut self, event: &TouchEvent, viewport: &Viewport) -> Option<GestureEvent> {
        if !event.touches.is_empty() {
            // 2 -> 1 restarts pan from the remaining finger; 3 -> 2 re-bases the pinch
            self.classify(&event.touches, viewport);
            return None;
        }

        self.mode = Mode::Idle;
        let is_tap = !self.pinched && self.move_count < self.tap_max_moves;
        if !is_tap {
            return None;
        }
        // The released finger is only listed in changed_touches
        let position = event.changed_touches.first()?.position;
        if let Some(prev) = self.last_tap {
            if event.time.saturating_sub(prev) < self.double_tap_window {
                log::debug!("double tap at {:?} suppressed", position);
                self.last_tap = None;
                return None;
            }
        }
        self.last_tap = Some(event.time);
        Some(GestureEvent::Tap { position })
    }

    pub fn touch_cancel(&mut self) {
        self.mode = Mode::Idle;
        self.pinched = false;
        self.move_count = 0;
    }
}
