//! Child placement and tree auto-alignment.
//!
//! Where a child sits relative to its parent follows from the same routing
//! table the connectors use: a strategy that routes left/right stacks children
//! beside the parent, the org-chart strategy stacks them underneath.
//!
//! With the `layout` feature, [`layered_positions`] additionally offers a
//! layered (Sugiyama) arrangement via `rust-sugiyama`.

use std::collections::HashSet;

use crate::config::{DEFAULT_NODE_HEIGHT, DEFAULT_NODE_WIDTH};
use crate::geometry::{Point, Rect};
use crate::node::{AxisSide, Node, NodeId};
use crate::registry::NodeRegistry;
use crate::routing::{routing_rule, AnchorStrategy, ChildHints, LayoutMode};

/// Gap between a parent's side and its horizontally placed children.
pub const HORIZONTAL_GAP: f32 = 80.0;
/// Gap between stacked siblings beside a parent.
pub const SIBLING_GAP: f32 = 24.0;
/// Gap between a parent's bottom and its children in org-chart placement.
pub const LEVEL_GAP: f32 = 72.0;
/// Gap between siblings side by side under a parent.
pub const TREE_SIBLING_GAP: f32 = 32.0;

/// Which side of its parent a child is placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Right,
    Left,
    Below,
}

/// Placement of the `index`th child under `mode`.
pub fn placement(mode: LayoutMode, hints: ChildHints, index: usize) -> Placement {
    match routing_rule(mode).resolve(hints).strategy {
        AnchorStrategy::OrgChart => Placement::Below,
        AnchorStrategy::ByAxisSide => match hints.axis_side {
            AxisSide::Left => Placement::Left,
            AxisSide::Right => Placement::Right,
        },
        // Orbit balances children on both sides
        AnchorStrategy::Nearest if index % 2 == 1 => Placement::Left,
        _ => Placement::Right,
    }
}

fn max_of(values: impl Iterator<Item = f32>) -> Option<f32> {
    values.fold(None, |acc, v| Some(acc.map_or(v, |a: f32| a.max(v))))
}

/// Default top-left position for a new child of `parent_id`.
///
/// The child goes after the last sibling already on the same side, or level
/// with the parent when it is the first one there.
pub fn child_position(
    registry: &NodeRegistry,
    parent_id: NodeId,
    mode: LayoutMode,
    hints: ChildHints,
) -> Option<Point> {
    let parent = registry.get(parent_id)?;
    let siblings: Vec<&Node> = registry
        .children(parent_id)
        .into_iter()
        .filter_map(|id| registry.get(id))
        .collect();
    let side = placement(mode, hints, siblings.len());
    let group = siblings
        .iter()
        .enumerate()
        .filter(|(i, n)| placement(mode, ChildHints::from(**n), *i) == side)
        .map(|(_, n)| n.rect());

    let center = parent.center();
    let position = match side {
        Placement::Right | Placement::Left => {
            let x = if side == Placement::Right {
                parent.rect().right() + HORIZONTAL_GAP
            } else {
                parent.x - HORIZONTAL_GAP - DEFAULT_NODE_WIDTH
            };
            let y = max_of(group.map(|r| r.bottom()))
                .map_or(center.y - DEFAULT_NODE_HEIGHT * 0.5, |b| b + SIBLING_GAP);
            Point::new(x, y)
        }
        Placement::Below => {
            let x = max_of(group.map(|r| r.right()))
                .map_or(center.x - DEFAULT_NODE_WIDTH * 0.5, |r| r + TREE_SIBLING_GAP);
            Point::new(x, parent.rect().bottom() + LEVEL_GAP)
        }
    };
    Some(position)
}

/// Offsets of a laid-out subtree relative to its root's top-left corner.
struct Subtree {
    offsets: Vec<(NodeId, Point)>,
    bounds: Rect,
}

impl Subtree {
    fn merge(&mut self, child: Subtree, origin: Point) {
        self.bounds = self.bounds.union(&child.bounds.translate(origin));
        self.offsets
            .extend(child.offsets.into_iter().map(|(id, p)| (id, p + origin)));
    }
}

fn layout_subtree(
    registry: &NodeRegistry,
    id: NodeId,
    mode: LayoutMode,
    visited: &mut HashSet<NodeId>,
) -> Option<Subtree> {
    if !visited.insert(id) {
        return None;
    }
    let node = registry.get(id)?;
    let (w, h) = (node.width, node.height);

    let mut beside: [Vec<Subtree>; 2] = [Vec::new(), Vec::new()];
    let mut below = Vec::new();
    for (index, child_id) in registry.children(id).into_iter().enumerate() {
        let Some(child) = registry.get(child_id) else {
            continue;
        };
        let side = placement(mode, ChildHints::from(child), index);
        if let Some(sub) = layout_subtree(registry, child_id, mode, visited) {
            match side {
                Placement::Right => beside[0].push(sub),
                Placement::Left => beside[1].push(sub),
                Placement::Below => below.push(sub),
            }
        }
    }

    let mut tree = Subtree {
        offsets: vec![(id, Point::ZERO)],
        bounds: Rect::new(0.0, 0.0, w, h),
    };

    for (i, group) in beside.into_iter().enumerate() {
        if group.is_empty() {
            continue;
        }
        let total = group.iter().map(|s| s.bounds.height).sum::<f32>()
            + SIBLING_GAP * (group.len() - 1) as f32;
        let mut cursor = h * 0.5 - total * 0.5;
        for sub in group {
            let x = if i == 0 {
                w + HORIZONTAL_GAP - sub.bounds.x
            } else {
                -HORIZONTAL_GAP - sub.bounds.right()
            };
            let origin = Point::new(x, cursor - sub.bounds.y);
            cursor += sub.bounds.height + SIBLING_GAP;
            tree.merge(sub, origin);
        }
    }

    if !below.is_empty() {
        let total = below.iter().map(|s| s.bounds.width).sum::<f32>()
            + TREE_SIBLING_GAP * (below.len() - 1) as f32;
        let mut cursor = w * 0.5 - total * 0.5;
        for sub in below {
            let origin = Point::new(cursor - sub.bounds.x, h + LEVEL_GAP - sub.bounds.y);
            cursor += sub.bounds.width + TREE_SIBLING_GAP;
            tree.merge(sub, origin);
        }
    }

    Some(tree)
}

/// Tidy positions for every non-root node. Roots stay where they are.
pub fn tidy_positions(registry: &NodeRegistry, mode: LayoutMode) -> Vec<(NodeId, Point)> {
    let mut visited = HashSet::new();
    let mut out = Vec::new();
    for root in registry.roots() {
        let Some(origin) = registry.get(root).map(Node::position) else {
            continue;
        };
        if let Some(tree) = layout_subtree(registry, root, mode, &mut visited) {
            out.extend(
                tree.offsets
                    .into_iter()
                    .filter(|(id, _)| *id != root)
                    .map(|(id, offset)| (id, origin + offset)),
            );
        }
    }
    out
}

/// Move every non-root node to its tidy position. Returns how many moved.
pub fn auto_align(registry: &mut NodeRegistry, mode: LayoutMode) -> usize {
    let mut moved = 0;
    for (id, p) in tidy_positions(registry, mode) {
        let changed = registry.get(id).is_some_and(|n| n.position() != p);
        if changed && registry.set_position(id, p.x, p.y).is_ok() {
            moved += 1;
        }
    }
    log::debug!("auto-align ({}) moved {} nodes", mode.key(), moved);
    moved
}

#[cfg(feature = "layout")]
pub use layered::{layered_positions, Direction, LayeredConfig};

#[cfg(feature = "layout")]
mod layered {
    use std::collections::HashMap;

    use crate::geometry::Point;
    use crate::node::NodeId;
    use crate::registry::NodeRegistry;

    /// Flow direction of the layers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    #[non_exhaustive]
    pub enum Direction {
        #[default]
        TopToBottom,
        LeftToRight,
    }

    #[derive(Debug, Clone, Copy, Default)]
    #[non_exhaustive]
    pub struct LayeredConfig {
        /// Minimum spacing between vertices; 0 keeps the `rust-sugiyama` default.
        pub vertex_spacing: f64,
        pub direction: Direction,
    }

    impl LayeredConfig {
        pub fn with_direction(mut self, direction: Direction) -> Self {
            self.direction = direction;
            self
        }

        pub fn with_vertex_spacing(mut self, spacing: f64) -> Self {
            self.vertex_spacing = spacing;
            self
        }
    }

    /// Layered positions for every node, parents in earlier layers.
    ///
    /// `rust-sugiyama` works on dense `u32` indices and `f64`; ids and
    /// coordinates are mapped back before returning.
    pub fn layered_positions(
        registry: &NodeRegistry,
        config: &LayeredConfig,
    ) -> Vec<(NodeId, Point)> {
        if registry.is_empty() {
            return Vec::new();
        }
        let horizontal = config.direction == Direction::LeftToRight;

        let ids: Vec<NodeId> = registry.iter().map(|n| n.id).collect();
        let index: HashMap<NodeId, u32> = ids
            .iter()
            .enumerate()
            .map(|(i, &id)| (id, i as u32))
            .collect();

        // Swap the axes for left-to-right so layers are spaced by width
        let vertices: Vec<(u32, (f64, f64))> = registry
            .iter()
            .enumerate()
            .map(|(i, n)| {
                let (w, h) = (f64::from(n.width), f64::from(n.height));
                (i as u32, if horizontal { (h, w) } else { (w, h) })
            })
            .collect();
        let edges: Vec<(u32, u32)> = registry
            .edges()
            .into_iter()
            .filter_map(|(parent, child)| Some((*index.get(&parent)?, *index.get(&child)?)))
            .collect();

        let mut sg_config = rust_sugiyama::configure::Config::default();
        if config.vertex_spacing > 0.0 {
            sg_config.vertex_spacing = config.vertex_spacing;
        }

        let subgraphs = rust_sugiyama::from_vertices_and_edges(&vertices, &edges, &sg_config);

        let mut out = Vec::with_capacity(ids.len());
        for (layout, _width, _height) in &subgraphs {
            for &(idx, (x, y)) in layout {
                if let Some(&id) = ids.get(idx) {
                    let (px, py) = if horizontal { (y, x) } else { (x, y) };
                    out.push((id, Point::new(px as f32, py as f32)));
                }
            }
        }
        out
    }

}
