//! Manual "draw a link from A to B" mode.
//!
//! While active, every pointer move re-evaluates which node the live preview
//! snaps to. A click on a distinct target reparents the target under the
//! source; the mode then stays active so several children can be linked in a
//! row. It ends on Escape, a background click, or an explicit cancel.

use crate::error::{EngineError, Result};
use crate::geometry::Point;
use crate::hit_test::find_snap_target;
use crate::node::NodeId;
use crate::path::Curve;
use crate::registry::NodeRegistry;
use crate::routing::{facing_anchor, Anchor};
use slint::Color;

/// Live connection-mode state. Positions are canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConnectionState {
    pub active: bool,
    pub source_id: Option<NodeId>,
    pub pointer: Point,
    pub snap_target: Option<NodeId>,
    pub snap_anchor: Option<Anchor>,
}

/// How the preview edge should be drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewStyle {
    pub dashed: bool,
    pub glow: bool,
    pub color: Color,
    pub width: f32,
}

impl PreviewStyle {
    pub fn snapped() -> Self {
        Self {
            dashed: false,
            glow: true,
            color: Color::from_rgb_u8(34, 197, 94),
            width: 2.5,
        }
    }

    pub fn free() -> Self {
        Self {
            dashed: true,
            glow: false,
            color: Color::from_rgb_u8(100, 116, 139),
            width: 1.5,
        }
    }
}

/// Preview edge in canvas space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectionPreview {
    pub curve: Curve,
    pub snapped: bool,
    pub style: PreviewStyle,
}

#[derive(Debug, Default, Clone)]
pub struct ConnectionController {
    state: ConnectionState,
}

impl ConnectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.active
    }

    pub fn source(&self) -> Option<NodeId> {
        self.state.source_id.filter(|_| self.state.active)
    }

    /// Enter connection mode from `source`. Fails if the source is unknown.
    pub fn begin(&mut self, source: NodeId, registry: &NodeRegistry) -> Result<()> {
        let node = registry.get(source).ok_or(EngineError::NodeNotFound(source))?;
        self.state = ConnectionState {
            active: true,
            source_id: Some(source),
            pointer: node.center(),
            snap_target: None,
            snap_anchor: None,
        };
        log::debug!("connection mode started from {}", source);
        Ok(())
    }

    pub fn cancel(&mut self) {
        if self.state.active {
            log::debug!("connection mode ended");
        }
        self.state = ConnectionState::default();
    }

    /// Track the pointer (canvas space) and recompute the snap target.
    pub fn update_pointer(
        &mut self,
        pointer: Point,
        registry: &NodeRegistry,
        snap_distance: f32,
        padding: f32,
    ) {
        if !self.state.active {
            return;
        }
        self.state.pointer = pointer;
        let Some(source) = self.state.source_id.and_then(|id| registry.get(id)) else {
            // Source vanished underneath us
            self.cancel();
            return;
        };
        let source_center = source.center();
        let target = find_snap_target(pointer, source.id, registry.iter(), snap_distance, padding);
        self.state.snap_target = target;
        self.state.snap_anchor = target
            .and_then(|id| registry.get(id))
            .map(|node| facing_anchor(&node.rect(), source_center));
    }

    /// Node a click should connect: the node under the pointer, else the
    /// current snap target. Always read at click time.
    pub fn click_target(&self, hit: Option<NodeId>) -> Option<NodeId> {
        hit.or(self.state.snap_target)
    }

    /// Check that `target` may become a child of the source.
    pub fn validate(&self, target: NodeId, registry: &NodeRegistry) -> Result<NodeId> {
        let source = self
            .source()
            .ok_or(EngineError::NodeNotFound(target))?;
        registry.check_reparent(target, source)?;
        Ok(source)
    }

    /// Preview edge from the source to the snap anchor or the pointer.
    pub fn preview(&self, registry: &NodeRegistry, min_offset: f32) -> Option<ConnectionPreview> {
        let source = registry.get(self.source()?)?;
        let source_rect = source.rect();

        if let (Some(target), Some(end)) = (
            self.state.snap_target.and_then(|id| registry.get(id)),
            self.state.snap_anchor,
        ) {
            let start = facing_anchor(&source_rect, target.center());
            return Some(ConnectionPreview {
                curve: Curve::bezier(
                    start.point,
                    start.side.normal(),
                    end.point,
                    end.side.normal(),
                    min_offset,
                ),
                snapped: true,
                style: PreviewStyle::snapped(),
            });
        }

        let start = facing_anchor(&source_rect, self.state.pointer);
        let normal = start.side.normal();
        Some(ConnectionPreview {
            curve: Curve::bezier(start.point, normal, self.state.pointer, -normal, min_offset * 0.5),
            snapped: false,
            style: PreviewStyle::free(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use crate::routing::Side;

    fn registry() -> NodeRegistry {
        NodeRegistry::from_nodes(vec![
            Node::new(1, 100.0, 100.0),
            Node::new(2, 400.0, 100.0),
            Node::new(3, 100.0, 400.0).with_parent(1),
        ])
        .unwrap()
    }

    #[test]
    fn test_begin_requires_existing_source() {
        let reg = registry();
        let mut ctrl = ConnectionController::new();
        assert_eq!(ctrl.begin(9, &reg), Err(EngineError::NodeNotFound(9)));
        assert!(!ctrl.is_active());
        ctrl.begin(1, &reg).unwrap();
        assert_eq!(ctrl.source(), Some(1));
    }

    #[test]
    fn test_pointer_near_target_snaps() {
        let reg = registry();
        let mut ctrl = ConnectionController::new();
        ctrl.begin(1, &reg).unwrap();
        ctrl.update_pointer(Point::new(470.0, 140.0), &reg, 60.0, 20.0);
        assert_eq!(ctrl.state().snap_target, Some(2));
        // Anchor on node 2 faces the source on its left
        let anchor = ctrl.state().snap_anchor.unwrap();
        assert_eq!(anchor.side, Side::Left);
        assert_eq!(anchor.point, Point::new(400.0, 132.0));
    }

    #[test]
    fn test_pointer_far_from_everything_clears_snap() {
        let reg = registry();
        let mut ctrl = ConnectionController::new();
        ctrl.begin(1, &reg).unwrap();
        ctrl.update_pointer(Point::new(470.0, 140.0), &reg, 60.0, 20.0);
        ctrl.update_pointer(Point::new(900.0, 900.0), &reg, 60.0, 20.0);
        assert_eq!(ctrl.state().snap_target, None);
        assert_eq!(ctrl.state().snap_anchor, None);
    }

    #[test]
    fn test_source_never_snaps_to_itself() {
        let reg = registry();
        let mut ctrl = ConnectionController::new();
        ctrl.begin(1, &reg).unwrap();
        ctrl.update_pointer(Point::new(180.0, 132.0), &reg, 60.0, 20.0);
        assert_eq!(ctrl.state().snap_target, None);
    }

    #[test]
    fn test_validate_rejects_self_and_cycles() {
        let reg = registry();
        let mut ctrl = ConnectionController::new();
        ctrl.begin(3, &reg).unwrap();
        assert_eq!(ctrl.validate(3, &reg), Err(EngineError::SelfConnection(3)));
        // 1 is 3's parent; making 1 a child of 3 would loop
        assert!(matches!(
            ctrl.validate(1, &reg),
            Err(EngineError::WouldCreateCycle { .. })
        ));
        assert_eq!(ctrl.validate(2, &reg), Ok(3));
    }

    #[test]
    fn test_click_target_prefers_hit_node() {
        let reg = registry();
        let mut ctrl = ConnectionController::new();
        ctrl.begin(1, &reg).unwrap();
        ctrl.update_pointer(Point::new(470.0, 140.0), &reg, 60.0, 20.0);
        assert_eq!(ctrl.click_target(Some(3)), Some(3));
        assert_eq!(ctrl.click_target(None), Some(2));
    }

    #[test]
    fn test_preview_styles() {
        let reg = registry();
        let mut ctrl = ConnectionController::new();
        assert!(ctrl.preview(&reg, 40.0).is_none());
        ctrl.begin(1, &reg).unwrap();
        ctrl.update_pointer(Point::new(700.0, 600.0), &reg, 60.0, 20.0);
        let free = ctrl.preview(&reg, 40.0).unwrap();
        assert!(!free.snapped && free.style.dashed);
        assert_eq!(free.curve.end(), Point::new(700.0, 600.0));

        ctrl.update_pointer(Point::new(470.0, 140.0), &reg, 60.0, 20.0);
        let snapped = ctrl.preview(&reg, 40.0).unwrap();
        assert!(snapped.snapped && snapped.style.glow && !snapped.style.dashed);
        assert_eq!(snapped.curve.start(), Point::new(260.0, 132.0));
        assert_eq!(snapped.curve.end(), Point::new(400.0, 132.0));
    }

    #[test]
    fn test_update_cancels_when_source_deleted() {
        let mut reg = registry();
        let mut ctrl = ConnectionController::new();
        ctrl.begin(2, &reg).unwrap();
        reg.remove(2, crate::registry::DeletePolicy::Cascade).unwrap();
        ctrl.update_pointer(Point::new(0.0, 0.0), &reg, 60.0, 20.0);
        assert!(!ctrl.is_active());
    }
}
