//! Connector routing between a parent and a child node.
//!
//! Which anchor strategy and which path family a layout uses is plain data in
//! [`ROUTING_TABLE`]; adding a layout means adding a row, nothing in the
//! drag or selection machinery has to change.
//!
//! Anchor choice is sticky: when a node sits within `hysteresis` canvas units
//! of the threshold where the preferred side would flip, the previously
//! chosen sides are kept. Callers that want this pass the last [`AnchorSides`]
//! back in (see [`ConnectorManager`](crate::links::ConnectorManager)).

use crate::geometry::{Point, Rect};
use crate::node::{AxisSide, ChildDirection, Node};
use crate::path::Curve;

/// Named layout strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LayoutMode {
    #[default]
    MindFlow,
    MindTree,
    MindHybrid,
    MindAxis,
    MindOrbit,
}

impl LayoutMode {
    pub const ALL: [LayoutMode; 5] = [
        LayoutMode::MindFlow,
        LayoutMode::MindTree,
        LayoutMode::MindHybrid,
        LayoutMode::MindAxis,
        LayoutMode::MindOrbit,
    ];

    pub fn key(self) -> &'static str {
        routing_rule(self).key
    }

    pub fn from_key(key: &str) -> Option<LayoutMode> {
        ROUTING_TABLE.iter().find(|r| r.key == key).map(|r| r.mode)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    /// Unit vector pointing out of the node on this side.
    pub fn normal(self) -> Point {
        match self {
            Side::Top => Point::new(0.0, -1.0),
            Side::Right => Point::new(1.0, 0.0),
            Side::Bottom => Point::new(0.0, 1.0),
            Side::Left => Point::new(-1.0, 0.0),
        }
    }

    pub fn opposite(self) -> Side {
        match self {
            Side::Top => Side::Bottom,
            Side::Right => Side::Left,
            Side::Bottom => Side::Top,
            Side::Left => Side::Right,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Side::Left | Side::Right)
    }

    /// Midpoint of this side of `rect`.
    pub fn anchor_on(self, rect: &Rect) -> Point {
        let c = rect.center();
        match self {
            Side::Top => Point::new(c.x, rect.y),
            Side::Right => Point::new(rect.right(), c.y),
            Side::Bottom => Point::new(c.x, rect.bottom()),
            Side::Left => Point::new(rect.x, c.y),
        }
    }
}

/// A point on a node boundary where a connector attaches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub point: Point,
    pub side: Side,
}

impl Anchor {
    pub fn on(rect: &Rect, side: Side) -> Self {
        Self {
            point: side.anchor_on(rect),
            side,
        }
    }
}

/// Sides chosen for one edge; fed back in as the hysteresis memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnchorSides {
    pub start: Side,
    pub end: Side,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorPair {
    pub start: Anchor,
    pub end: Anchor,
}

impl AnchorPair {
    pub fn sides(&self) -> AnchorSides {
        AnchorSides {
            start: self.start.side,
            end: self.end.side,
        }
    }
}

/// How anchors are picked for an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorStrategy {
    /// Facing left/right sides, mirrored when the child sits left of the parent.
    Horizontal,
    /// Parent bottom-center to child top-center, always.
    OrgChart,
    /// The child's `axis_side` picks which side of the parent the edge leaves.
    ByAxisSide,
    /// Facing sides along whichever axis separates the nodes more.
    Nearest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathFamily {
    Bezier,
    Elbow,
}

/// Anchor strategy and path family for a single edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeRouting {
    pub strategy: AnchorStrategy,
    pub family: PathFamily,
}

impl EdgeRouting {
    pub const fn new(strategy: AnchorStrategy, family: PathFamily) -> Self {
        Self { strategy, family }
    }
}

/// Routing of a layout, either fixed or chosen per child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutRouting {
    Fixed(EdgeRouting),
    /// The child's `child_direction` picks one of the two.
    ByChildDirection {
        horizontal: EdgeRouting,
        vertical: EdgeRouting,
    },
}

impl LayoutRouting {
    pub fn resolve(self, hints: ChildHints) -> EdgeRouting {
        match self {
            LayoutRouting::Fixed(routing) => routing,
            LayoutRouting::ByChildDirection {
                horizontal,
                vertical,
            } => match hints.direction {
                ChildDirection::Horizontal => horizontal,
                ChildDirection::Vertical => vertical,
            },
        }
    }
}

/// One row of the routing table.
#[derive(Debug)]
pub struct RoutingRule {
    pub mode: LayoutMode,
    pub key: &'static str,
    pub routing: LayoutRouting,
}

impl RoutingRule {
    /// Strategy and family for an edge to a child with `hints`.
    pub fn resolve(&self, hints: ChildHints) -> EdgeRouting {
        self.routing.resolve(hints)
    }
}

const FLOW: EdgeRouting = EdgeRouting::new(AnchorStrategy::Horizontal, PathFamily::Bezier);
const ORG_CHART: EdgeRouting = EdgeRouting::new(AnchorStrategy::OrgChart, PathFamily::Elbow);

/// Layout → routing mapping.
pub static ROUTING_TABLE: [RoutingRule; 5] = [
    RoutingRule {
        mode: LayoutMode::MindFlow,
        key: "mindflow",
        routing: LayoutRouting::Fixed(FLOW),
    },
    RoutingRule {
        mode: LayoutMode::MindTree,
        key: "mindtree",
        routing: LayoutRouting::Fixed(ORG_CHART),
    },
    RoutingRule {
        mode: LayoutMode::MindHybrid,
        key: "mindhybrid",
        routing: LayoutRouting::ByChildDirection {
            horizontal: FLOW,
            vertical: ORG_CHART,
        },
    },
    RoutingRule {
        mode: LayoutMode::MindAxis,
        key: "mindaxis",
        routing: LayoutRouting::Fixed(EdgeRouting::new(
            AnchorStrategy::ByAxisSide,
            PathFamily::Bezier,
        )),
    },
    RoutingRule {
        mode: LayoutMode::MindOrbit,
        key: "mindorbit",
        routing: LayoutRouting::Fixed(EdgeRouting::new(
            AnchorStrategy::Nearest,
            PathFamily::Bezier,
        )),
    },
];

pub fn routing_rule(mode: LayoutMode) -> &'static RoutingRule {
    &ROUTING_TABLE[mode as usize]
}

/// Per-child layout hints that some layouts consult.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChildHints {
    pub direction: ChildDirection,
    pub axis_side: AxisSide,
}

impl From<&Node> for ChildHints {
    fn from(node: &Node) -> Self {
        Self {
            direction: node.child_direction,
            axis_side: node.axis_side,
        }
    }
}

/// Tunables for routing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoutingParams {
    pub hysteresis: f32,
    pub bezier_min_offset: f32,
}

impl Default for RoutingParams {
    fn default() -> Self {
        Self {
            hysteresis: 8.0,
            bezier_min_offset: 40.0,
        }
    }
}

/// A routed edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Route {
    pub anchors: AnchorPair,
    pub family: PathFamily,
    pub curve: Curve,
}

/// Pick the facing sides along one axis. `delta` is child center minus parent
/// center on that axis.
fn facing_sides(
    horizontal: bool,
    delta: f32,
    previous: Option<AnchorSides>,
    hysteresis: f32,
) -> AnchorSides {
    if let Some(prev) = previous {
        if prev.start.is_horizontal() == horizontal
            && prev.end == prev.start.opposite()
            && delta.abs() < hysteresis
        {
            return prev;
        }
    }
    let start = match (horizontal, delta >= 0.0) {
        (true, true) => Side::Right,
        (true, false) => Side::Left,
        (false, true) => Side::Bottom,
        (false, false) => Side::Top,
    };
    AnchorSides {
        start,
        end: start.opposite(),
    }
}

/// Choose anchor points on `parent` and `child` for `mode`.
pub fn compute_anchors(
    parent: &Rect,
    child: &Rect,
    mode: LayoutMode,
    hints: ChildHints,
    previous: Option<AnchorSides>,
    hysteresis: f32,
) -> AnchorPair {
    let strategy = routing_rule(mode).resolve(hints).strategy;
    anchors_for_strategy(parent, child, strategy, hints, previous, hysteresis)
}

fn anchors_for_strategy(
    parent: &Rect,
    child: &Rect,
    strategy: AnchorStrategy,
    hints: ChildHints,
    previous: Option<AnchorSides>,
    hysteresis: f32,
) -> AnchorPair {
    let pc = parent.center();
    let cc = child.center();

    let sides = match strategy {
        AnchorStrategy::Horizontal => facing_sides(true, cc.x - pc.x, previous, hysteresis),
        AnchorStrategy::OrgChart => AnchorSides {
            start: Side::Bottom,
            end: Side::Top,
        },
        AnchorStrategy::ByAxisSide => match hints.axis_side {
            AxisSide::Left => AnchorSides {
                start: Side::Left,
                end: Side::Right,
            },
            AxisSide::Right => AnchorSides {
                start: Side::Right,
                end: Side::Left,
            },
        },
        AnchorStrategy::Nearest => {
            // Gap between the boxes along each axis; the larger gap wins.
            let gap_x = (cc.x - pc.x).abs() - (parent.width + child.width) * 0.5;
            let gap_y = (cc.y - pc.y).abs() - (parent.height + child.height) * 0.5;
            let prev_horizontal = previous.map(|p| p.start.is_horizontal());
            let horizontal = match prev_horizontal {
                Some(h) if (gap_x - gap_y).abs() < hysteresis => h,
                _ => gap_x >= gap_y,
            };
            if horizontal {
                facing_sides(true, cc.x - pc.x, previous, hysteresis)
            } else {
                facing_sides(false, cc.y - pc.y, previous, hysteresis)
            }
        }
    };

    AnchorPair {
        start: Anchor::on(parent, sides.start),
        end: Anchor::on(child, sides.end),
    }
}

/// Build the curve between two anchors for a path family.
pub fn build_path(anchors: &AnchorPair, family: PathFamily, min_offset: f32) -> Curve {
    match family {
        PathFamily::Bezier => Curve::bezier(
            anchors.start.point,
            anchors.start.side.normal(),
            anchors.end.point,
            anchors.end.side.normal(),
            min_offset,
        ),
        PathFamily::Elbow => Curve::elbow(anchors.start.point, anchors.end.point),
    }
}

/// Anchors plus curve for one parent → child edge.
pub fn route_edge(
    parent: &Rect,
    child: &Rect,
    mode: LayoutMode,
    hints: ChildHints,
    previous: Option<AnchorSides>,
    params: &RoutingParams,
) -> Route {
    let EdgeRouting { strategy, family } = routing_rule(mode).resolve(hints);
    let anchors = anchors_for_strategy(parent, child, strategy, hints, previous, params.hysteresis);
    Route {
        anchors,
        family,
        curve: build_path(&anchors, family, params.bezier_min_offset),
    }
}

/// Anchor on `rect` on the side that faces `toward`.
///
/// Offsets are normalized by the rect's half extents so wide nodes still
/// prefer their top/bottom sides for points mostly above or below them.
pub fn facing_anchor(rect: &Rect, toward: Point) -> Anchor {
    let c = rect.center();
    let dx = (toward.x - c.x) / (rect.width * 0.5).max(1.0);
    let dy = (toward.y - c.y) / (rect.height * 0.5).max(1.0);
    let side = if dx.abs() >= dy.abs() {
        if dx >= 0.0 {
            Side::Right
        } else {
            Side::Left
        }
    } else if dy >= 0.0 {
        Side::Bottom
    } else {
        Side::Top
    };
    Anchor::on(rect, side)
}
