//! Screen-space positions of floating controls.
//!
//! Nothing here keeps state: every position is projected from canvas
//! geometry through the current viewport, so controls follow pan, zoom and
//! drag frames automatically.

use crate::geometry::{Point, Rect};
use crate::hit_test::{connect_handle_position, ResizeHandle};
use crate::layout::{placement, Placement};
use crate::node::{Node, NodeId};
use crate::registry::NodeRegistry;
use crate::routing::{ChildHints, LayoutMode};
use crate::selection::SelectionState;
use crate::viewport::Viewport;

/// Distance of an add-child button from the node edge, screen px.
pub const ADD_BUTTON_OFFSET: f32 = 20.0;
pub const TOOLBAR_HEIGHT: f32 = 40.0;
pub const TOOLBAR_GAP: f32 = 12.0;
pub const CONTEXT_MENU_SIZE: Point = Point::new(200.0, 240.0);

/// An open context menu. `position` is where it was requested, screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContextMenu {
    pub node: Option<NodeId>,
    pub position: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    AddChild(Placement),
    Toolbar,
    ConnectHandle,
    ResizeHandle(ResizeHandle),
    ContextMenu,
}

/// One control to draw. `position` is its center, except for the toolbar
/// and context menu where it is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatingControl {
    pub kind: ControlKind,
    pub node: Option<NodeId>,
    pub position: Point,
}

/// Center of the add-child button, on the side the next child would go.
pub fn add_child_button(
    viewport: &Viewport,
    registry: &NodeRegistry,
    node: &Node,
    mode: LayoutMode,
) -> (Placement, Point) {
    let index = registry.children(node.id).len();
    let side = placement(mode, ChildHints::default(), index);
    let r = viewport.rect_to_screen(&node.rect());
    let c = r.center();
    let p = match side {
        Placement::Right => Point::new(r.right() + ADD_BUTTON_OFFSET, c.y),
        Placement::Left => Point::new(r.x - ADD_BUTTON_OFFSET, c.y),
        Placement::Below => Point::new(c.x, r.bottom() + ADD_BUTTON_OFFSET),
    };
    (side, p)
}

/// Top-left of a toolbar centered above `selection` (screen rect).
///
/// Flips below the selection when there is no room above the canvas top.
pub fn toolbar_position(selection: &Rect, toolbar_width: f32) -> Point {
    let x = selection.center().x - toolbar_width * 0.5;
    let above = selection.y - TOOLBAR_GAP - TOOLBAR_HEIGHT;
    if above >= 0.0 {
        Point::new(x, above)
    } else {
        Point::new(x, selection.bottom() + TOOLBAR_GAP)
    }
}

/// Keep a popup of `size` fully inside a canvas of `canvas_size`.
pub fn clamp_to_canvas(position: Point, size: Point, canvas_size: Point) -> Point {
    let max_x = (canvas_size.x - size.x).max(0.0);
    let max_y = (canvas_size.y - size.y).max(0.0);
    Point::new(position.x.clamp(0.0, max_x), position.y.clamp(0.0, max_y))
}

/// All floating controls for the current state.
pub fn floating_controls(
    viewport: &Viewport,
    registry: &NodeRegistry,
    selection: &SelectionState,
    mode: LayoutMode,
    context_menu: Option<&ContextMenu>,
    canvas_size: Point,
    toolbar_width: f32,
) -> Vec<FloatingControl> {
    let mut out = Vec::new();

    let selected: Vec<&Node> = selection.iter().filter_map(|id| registry.get(id)).collect();
    if let Some(bounds) = selected
        .iter()
        .map(|n| n.rect())
        .reduce(|acc, r| acc.union(&r))
    {
        out.push(FloatingControl {
            kind: ControlKind::Toolbar,
            node: selection.selected_id(),
            position: toolbar_position(&viewport.rect_to_screen(&bounds), toolbar_width),
        });
    }

    // Handles only make sense for a single selection
    if let [node] = selected.as_slice() {
        let (side, p) = add_child_button(viewport, registry, node, mode);
        out.push(FloatingControl {
            kind: ControlKind::AddChild(side),
            node: Some(node.id),
            position: p,
        });
        out.push(FloatingControl {
            kind: ControlKind::ConnectHandle,
            node: Some(node.id),
            position: connect_handle_position(viewport, &node.rect()),
        });
        let screen = viewport.rect_to_screen(&node.rect());
        out.extend(ResizeHandle::ALL.iter().map(|&h| FloatingControl {
            kind: ControlKind::ResizeHandle(h),
            node: Some(node.id),
            position: h.position(&screen),
        }));
    }

    if let Some(menu) = context_menu {
        out.push(FloatingControl {
            kind: ControlKind::ContextMenu,
            node: menu.node,
            position: clamp_to_canvas(menu.position, CONTEXT_MENU_SIZE, canvas_size),
        });
    }

    out
}
