//! Engine tunables.

use crate::routing::LayoutMode;
use std::time::Duration;

/// Default node size in canvas units.
pub const DEFAULT_NODE_WIDTH: f32 = 160.0;
pub const DEFAULT_NODE_HEIGHT: f32 = 64.0;
/// Nodes never shrink below this size.
pub const MIN_NODE_WIDTH: f32 = 80.0;
pub const MIN_NODE_HEIGHT: f32 = 40.0;

/// Configuration for [`CanvasEngine`](crate::engine::CanvasEngine).
///
/// Distances are in canvas units unless the field name says `screen`.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct EngineConfig {
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Pointer-to-center radius that makes a node a snap candidate.
    pub snap_distance: f32,
    /// Padding around a node's bounds that also counts as "near".
    pub snap_padding: f32,
    /// Rubber-band rectangles this small (both sides, screen px) are clicks.
    pub area_select_threshold: f32,
    /// A touch gesture with fewer recorded moves than this can be a tap.
    pub tap_max_moves: u32,
    pub double_tap_window: Duration,
    /// Center-offset band in which the previously chosen anchor side is kept.
    pub anchor_hysteresis: f32,
    /// Minimum distance of bezier control points from their anchor.
    pub bezier_min_offset: f32,
    /// Side length of resize handles in screen px.
    pub handle_size_screen: f32,
    /// Zoom factor per wheel delta unit for ctrl+wheel.
    pub wheel_zoom_speed: f32,
    /// Multiplicative step for zoom in / zoom out buttons.
    pub zoom_step: f32,
    pub layout_mode: LayoutMode,
    /// Passed to `duplicate_node` / `delete_node`; drag never realigns.
    pub auto_align: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.3,
            max_zoom: 2.0,
            snap_distance: 60.0,
            snap_padding: 20.0,
            area_select_threshold: 10.0,
            tap_max_moves: 5,
            double_tap_window: Duration::from_millis(300),
            anchor_hysteresis: 8.0,
            bezier_min_offset: 40.0,
            handle_size_screen: 8.0,
            wheel_zoom_speed: 0.0015,
            zoom_step: 1.2,
            layout_mode: LayoutMode::MindFlow,
            auto_align: true,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the zoom range. Swapped bounds are reordered.
    pub fn with_zoom_range(mut self, min_zoom: f32, max_zoom: f32) -> Self {
        self.min_zoom = min_zoom.min(max_zoom);
        self.max_zoom = max_zoom.max(min_zoom);
        self
    }

    pub fn with_layout_mode(mut self, mode: LayoutMode) -> Self {
        self.layout_mode = mode;
        self
    }

    pub fn with_auto_align(mut self, auto_align: bool) -> Self {
        self.auto_align = auto_align;
        self
    }

    pub fn with_snap_distance(mut self, distance: f32) -> Self {
        self.snap_distance = distance;
        self
    }

    pub fn with_anchor_hysteresis(mut self, epsilon: f32) -> Self {
        self.anchor_hysteresis = epsilon.max(0.0);
        self
    }

    pub fn with_bezier_min_offset(mut self, offset: f32) -> Self {
        self.bezier_min_offset = offset;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.min_zoom, 0.3);
        assert_eq!(config.max_zoom, 2.0);
        assert_eq!(config.snap_distance, 60.0);
        assert_eq!(config.double_tap_window, Duration::from_millis(300));
    }

    #[test]
    fn test_zoom_range_reorders() {
        let config = EngineConfig::new().with_zoom_range(4.0, 0.5);
        assert_eq!(config.min_zoom, 0.5);
        assert_eq!(config.max_zoom, 4.0);
    }
}
