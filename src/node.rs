//! Node records and their presentation variants.
//!
//! Node types and shapes are closed enums; everything the renderer needs to
//! know about a variant lives in a static descriptor table resolved once via
//! [`NodeType::descriptor`] / [`NodeShape::descriptor`].

use crate::config::{DEFAULT_NODE_HEIGHT, DEFAULT_NODE_WIDTH, MIN_NODE_HEIGHT, MIN_NODE_WIDTH};
use crate::geometry::{Point, Rect};
use slint::Color;

/// Opaque node identifier. Ids are positive and stable for a node's lifetime.
pub type NodeId = i32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NodeType {
    #[default]
    Default,
    DashedLine,
    ProjectLink,
    Task,
}

/// Static render strategy for a [`NodeType`].
#[derive(Debug)]
pub struct NodeTypeDescriptor {
    pub node_type: NodeType,
    pub key: &'static str,
    /// Border is always dashed regardless of the node's own border style.
    pub force_dashed_border: bool,
    pub icon: Option<&'static str>,
    /// Shows a completion checkbox.
    pub completable: bool,
}

static NODE_TYPES: [NodeTypeDescriptor; 4] = [
    NodeTypeDescriptor {
        node_type: NodeType::Default,
        key: "default",
        force_dashed_border: false,
        icon: None,
        completable: false,
    },
    NodeTypeDescriptor {
        node_type: NodeType::DashedLine,
        key: "dashed-line",
        force_dashed_border: true,
        icon: None,
        completable: false,
    },
    NodeTypeDescriptor {
        node_type: NodeType::ProjectLink,
        key: "project-link",
        force_dashed_border: false,
        icon: Some("folder-link"),
        completable: false,
    },
    NodeTypeDescriptor {
        node_type: NodeType::Task,
        key: "task",
        force_dashed_border: false,
        icon: Some("check-square"),
        completable: true,
    },
];

impl NodeType {
    pub fn descriptor(self) -> &'static NodeTypeDescriptor {
        &NODE_TYPES[self as usize]
    }

    pub fn from_key(key: &str) -> Option<NodeType> {
        NODE_TYPES.iter().find(|d| d.key == key).map(|d| d.node_type)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NodeShape {
    Rectangle,
    #[default]
    Rounded,
    Pill,
    Ellipse,
    Diamond,
}

/// Static geometry strategy for a [`NodeShape`].
pub struct ShapeDescriptor {
    pub shape: NodeShape,
    pub key: &'static str,
    /// Corner radius as a fraction of the node height.
    pub corner_radius_ratio: f32,
    outline: fn(&Rect, f32) -> String,
}

impl std::fmt::Debug for ShapeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShapeDescriptor")
            .field("shape", &self.shape)
            .field("key", &self.key)
            .field("corner_radius_ratio", &self.corner_radius_ratio)
            .finish()
    }
}

impl ShapeDescriptor {
    /// SVG outline of the shape filling `rect`.
    pub fn outline(&self, rect: &Rect) -> String {
        (self.outline)(rect, rect.height * self.corner_radius_ratio)
    }
}

static SHAPES: [ShapeDescriptor; 5] = [
    ShapeDescriptor {
        shape: NodeShape::Rectangle,
        key: "rectangle",
        corner_radius_ratio: 0.0,
        outline: rounded_outline,
    },
    ShapeDescriptor {
        shape: NodeShape::Rounded,
        key: "rounded",
        corner_radius_ratio: 0.15,
        outline: rounded_outline,
    },
    ShapeDescriptor {
        shape: NodeShape::Pill,
        key: "pill",
        corner_radius_ratio: 0.5,
        outline: rounded_outline,
    },
    ShapeDescriptor {
        shape: NodeShape::Ellipse,
        key: "ellipse",
        corner_radius_ratio: 0.5,
        outline: ellipse_outline,
    },
    ShapeDescriptor {
        shape: NodeShape::Diamond,
        key: "diamond",
        corner_radius_ratio: 0.0,
        outline: diamond_outline,
    },
];

impl NodeShape {
    pub fn descriptor(self) -> &'static ShapeDescriptor {
        &SHAPES[self as usize]
    }

    pub fn from_key(key: &str) -> Option<NodeShape> {
        SHAPES.iter().find(|d| d.key == key).map(|d| d.shape)
    }
}

fn rounded_outline(r: &Rect, radius: f32) -> String {
    let radius = radius.min(r.width * 0.5).min(r.height * 0.5);
    if radius <= 0.0 {
        return format!(
            "M {} {} L {} {} L {} {} L {} {} Z",
            r.x,
            r.y,
            r.right(),
            r.y,
            r.right(),
            r.bottom(),
            r.x,
            r.bottom()
        );
    }
    format!(
        "M {} {} L {} {} A {radius} {radius} 0 0 1 {} {} L {} {} A {radius} {radius} 0 0 1 {} {} L {} {} A {radius} {radius} 0 0 1 {} {} L {} {} A {radius} {radius} 0 0 1 {} {} Z",
        r.x + radius,
        r.y,
        r.right() - radius,
        r.y,
        r.right(),
        r.y + radius,
        r.right(),
        r.bottom() - radius,
        r.right() - radius,
        r.bottom(),
        r.x + radius,
        r.bottom(),
        r.x,
        r.bottom() - radius,
        r.x,
        r.y + radius,
        r.x + radius,
        r.y,
    )
}

fn ellipse_outline(r: &Rect, _radius: f32) -> String {
    let rx = r.width * 0.5;
    let ry = r.height * 0.5;
    let cy = r.y + ry;
    format!(
        "M {} {cy} A {rx} {ry} 0 1 0 {} {cy} A {rx} {ry} 0 1 0 {} {cy} Z",
        r.x,
        r.right(),
        r.x
    )
}

fn diamond_outline(r: &Rect, _radius: f32) -> String {
    let c = r.center();
    format!(
        "M {} {} L {} {} L {} {} L {} {} Z",
        c.x,
        r.y,
        r.right(),
        c.y,
        c.x,
        r.bottom(),
        r.x,
        c.y
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// Child placement axis, consulted only by the hybrid layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChildDirection {
    #[default]
    Horizontal,
    Vertical,
}

/// Side of the root axis a node hangs on, consulted only by the axis layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisSide {
    Left,
    #[default]
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeStyle {
    pub shape: NodeShape,
    pub fill: Color,
    pub text_color: Color,
    pub border_color: Color,
    pub border_style: BorderStyle,
    pub border_width: f32,
    pub text_align: TextAlign,
}

impl Default for NodeStyle {
    fn default() -> Self {
        Self {
            shape: NodeShape::default(),
            fill: Color::from_rgb_u8(255, 255, 255),
            text_color: Color::from_rgb_u8(33, 37, 41),
            border_color: Color::from_rgb_u8(120, 144, 156),
            border_style: BorderStyle::Solid,
            border_width: 1.5,
            text_align: TextAlign::Center,
        }
    }
}

/// A node on the canvas. Geometry is in canvas space.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub parent_id: Option<NodeId>,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub text: String,
    pub node_type: NodeType,
    pub style: NodeStyle,
    pub completed: bool,
    pub icon: Option<String>,
    pub comment: Option<String>,
    pub links: Vec<String>,
    pub reminder: bool,
    pub child_direction: ChildDirection,
    pub axis_side: AxisSide,
}

impl Node {
    /// Create a root node of default size with its top-left corner at `(x, y)`.
    pub fn new(id: NodeId, x: f32, y: f32) -> Self {
        Self {
            id,
            parent_id: None,
            x,
            y,
            width: DEFAULT_NODE_WIDTH,
            height: DEFAULT_NODE_HEIGHT,
            text: String::new(),
            node_type: NodeType::Default,
            style: NodeStyle::default(),
            completed: false,
            icon: None,
            comment: None,
            links: Vec::new(),
            reminder: false,
            child_direction: ChildDirection::default(),
            axis_side: AxisSide::default(),
        }
    }

    pub fn with_parent(mut self, parent_id: NodeId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.set_size(width, height);
        self
    }

    pub fn with_type(mut self, node_type: NodeType) -> Self {
        self.node_type = node_type;
        self
    }

    pub fn with_child_direction(mut self, direction: ChildDirection) -> Self {
        self.child_direction = direction;
        self
    }

    pub fn with_axis_side(mut self, side: AxisSide) -> Self {
        self.axis_side = side;
        self
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn center(&self) -> Point {
        self.rect().center()
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Set the size, clamped to the minimum node size.
    pub fn set_size(&mut self, width: f32, height: f32) {
        let (w, h) = clamp_size(width, height);
        self.width = w;
        self.height = h;
    }

    /// Border style after applying the node type's overrides.
    pub fn effective_border_style(&self) -> BorderStyle {
        if self.node_type.descriptor().force_dashed_border {
            BorderStyle::Dashed
        } else {
            self.style.border_style
        }
    }

    /// Icon key: the node's own icon wins over the type's default icon.
    pub fn effective_icon(&self) -> Option<&str> {
        self.icon.as_deref().or(self.node_type.descriptor().icon)
    }

    pub fn outline_path(&self) -> String {
        self.style.shape.descriptor().outline(&self.rect())
    }
}

/// Clamp a requested size to the minimum node size. Never fails.
pub fn clamp_size(width: f32, height: f32) -> (f32, f32) {
    let w = if width.is_finite() { width } else { MIN_NODE_WIDTH };
    let h = if height.is_finite() { height } else { MIN_NODE_HEIGHT };
    (w.max(MIN_NODE_WIDTH), h.max(MIN_NODE_HEIGHT))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_node_has_default_size() {
        let node = Node::new(1, 10.0, 20.0);
        assert_eq!(node.width, 160.0);
        assert_eq!(node.height, 64.0);
        assert!(node.is_root());
    }

    #[test]
    fn test_set_size_clamps_to_minimum() {
        let mut node = Node::new(1, 0.0, 0.0);
        node.set_size(10.0, -5.0);
        assert_eq!((node.width, node.height), (80.0, 40.0));
        node.set_size(f32::NAN, 100.0);
        assert_eq!((node.width, node.height), (80.0, 100.0));
    }

    #[test]
    fn test_descriptor_tables_are_indexed_by_variant() {
        for t in [NodeType::Default, NodeType::DashedLine, NodeType::ProjectLink, NodeType::Task] {
            assert_eq!(t.descriptor().node_type, t);
            assert_eq!(NodeType::from_key(t.descriptor().key), Some(t));
        }
        for s in [
            NodeShape::Rectangle,
            NodeShape::Rounded,
            NodeShape::Pill,
            NodeShape::Ellipse,
            NodeShape::Diamond,
        ] {
            assert_eq!(s.descriptor().shape, s);
            assert_eq!(NodeShape::from_key(s.descriptor().key), Some(s));
        }
        assert_eq!(NodeType::from_key("whiteboard"), None);
    }

    #[test]
    fn test_dashed_line_type_forces_dashed_border() {
        let node = Node::new(1, 0.0, 0.0).with_type(NodeType::DashedLine);
        assert_eq!(node.effective_border_style(), BorderStyle::Dashed);
        let plain = Node::new(2, 0.0, 0.0);
        assert_eq!(plain.effective_border_style(), BorderStyle::Solid);
    }

    #[test]
    fn test_effective_icon_prefers_node_icon() {
        let mut node = Node::new(1, 0.0, 0.0).with_type(NodeType::Task);
        assert_eq!(node.effective_icon(), Some("check-square"));
        node.icon = Some("star".into());
        assert_eq!(node.effective_icon(), Some("star"));
    }

    #[test]
    fn test_outlines() {
        let mut node = Node::new(1, 0.0, 0.0).with_size(100.0, 50.0);
        node.style.shape = NodeShape::Rectangle;
        assert_eq!(node.outline_path(), "M 0 0 L 100 0 L 100 50 L 0 50 Z");
        node.style.shape = NodeShape::Diamond;
        assert_eq!(node.outline_path(), "M 50 0 L 100 25 L 50 50 L 0 25 Z");
        node.style.shape = NodeShape::Pill;
        assert!(node.outline_path().contains(" A 25 25 "));
    }
}
