//! Connector management.
//!
//! [`ConnectorManager`] routes every parent → child edge in the registry,
//! remembers which anchor sides each edge used last (the input that keeps
//! anchor choice from jittering), and can push screen-space paths into a
//! bound Slint `VecModel`.
//!
//! ```ignore
//! let mut connectors = ConnectorManager::new(engine.routing_params());
//! let model = Rc::new(VecModel::<Connector>::default());
//! connectors.bind_model(model.clone(), |c| Connector {
//!     child: c.child,
//!     path_commands: c.path,
//!     color: c.color,
//!     dashed: c.dashed,
//! });
//! window.set_connectors(ModelRc::from(model));
//!
//! // After every frame that moved nodes or the viewport
//! connectors.update(engine.bridge().registry(), engine.layout_mode(), engine.viewport());
//! ```

use std::collections::HashMap;
use std::rc::Rc;

use slint::{Color, Model, SharedString, VecModel};

use crate::geometry::Point;
use crate::node::{BorderStyle, NodeId};
use crate::registry::NodeRegistry;
use crate::routing::{route_edge, AnchorSides, ChildHints, LayoutMode, Route, RoutingParams};
use crate::viewport::Viewport;

/// Samples per bezier when hit testing connectors.
const HIT_SAMPLES: usize = 24;

/// One routed edge. The route is canvas space.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorPath {
    pub parent: NodeId,
    pub child: NodeId,
    pub route: Route,
    pub color: Color,
    pub dashed: bool,
}

/// Row handed to a bound model constructor.
#[derive(Debug, Clone)]
pub struct ConnectorRow {
    pub parent: NodeId,
    pub child: NodeId,
    /// Screen-space SVG path commands.
    pub path: SharedString,
    pub color: Color,
    pub dashed: bool,
}

trait ModelSyncer {
    fn sync(&self, rows: Vec<ConnectorRow>);
}

struct ConcreteModelSyncer<P, F> {
    model: Rc<VecModel<P>>,
    constructor: F,
}

impl<P, F> ModelSyncer for ConcreteModelSyncer<P, F>
where
    P: Clone + 'static,
    F: Fn(ConnectorRow) -> P,
{
    fn sync(&self, rows: Vec<ConnectorRow>) {
        let len = rows.len();
        for (i, row) in rows.into_iter().enumerate() {
            let item = (self.constructor)(row);
            if i < self.model.row_count() {
                self.model.set_row_data(i, item);
            } else {
                self.model.push(item);
            }
        }
        while self.model.row_count() > len {
            self.model.remove(self.model.row_count() - 1);
        }
    }
}

pub struct ConnectorManager {
    params: RoutingParams,
    paths: Vec<ConnectorPath>,
    /// Last anchor sides per `(parent, child)` edge.
    memory: HashMap<(NodeId, NodeId), AnchorSides>,
    syncer: Option<Box<dyn ModelSyncer>>,
}

impl Default for ConnectorManager {
    fn default() -> Self {
        Self::new(RoutingParams::default())
    }
}

impl ConnectorManager {
    pub fn new(params: RoutingParams) -> Self {
        Self {
            params,
            paths: Vec::new(),
            memory: HashMap::new(),
            syncer: None,
        }
    }

    pub fn set_params(&mut self, params: RoutingParams) {
        self.params = params;
    }

    /// Bind a Slint model; every [`update`](Self::update) then syncs it.
    pub fn bind_model<P, F>(&mut self, model: Rc<VecModel<P>>, constructor: F)
    where
        P: Clone + 'static,
        F: Fn(ConnectorRow) -> P + 'static,
    {
        self.syncer = Some(Box::new(ConcreteModelSyncer { model, constructor }));
    }

    /// Re-route every edge and sync the bound model.
    pub fn update(&mut self, registry: &NodeRegistry, mode: LayoutMode, viewport: &Viewport) {
        let mut memory = HashMap::with_capacity(self.memory.len());
        self.paths.clear();

        for (parent_id, child_id) in registry.edges() {
            let (Some(parent), Some(child)) = (registry.get(parent_id), registry.get(child_id)) else {
                continue;
            };
            let previous = self.memory.get(&(parent_id, child_id)).copied();
            let route = route_edge(
                &parent.rect(),
                &child.rect(),
                mode,
                ChildHints::from(child),
                previous,
                &self.params,
            );
            memory.insert((parent_id, child_id), route.anchors.sides());
            self.paths.push(ConnectorPath {
                parent: parent_id,
                child: child_id,
                route,
                color: child.style.border_color,
                dashed: child.effective_border_style() == BorderStyle::Dashed,
            });
        }
        // Edges that disappeared lose their memory
        self.memory = memory;

        if let Some(syncer) = &self.syncer {
            syncer.sync(self.rows(viewport));
        }
    }

    pub fn paths(&self) -> &[ConnectorPath] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Route of the edge into `child`.
    pub fn path_to(&self, child: NodeId) -> Option<&ConnectorPath> {
        self.paths.iter().find(|p| p.child == child)
    }

    /// Screen-space rows for rendering.
    pub fn rows(&self, viewport: &Viewport) -> Vec<ConnectorRow> {
        self.paths
            .iter()
            .map(|p| ConnectorRow {
                parent: p.parent,
                child: p.child,
                path: SharedString::from(p.route.curve.to_screen(viewport).to_svg()),
                color: p.color,
                dashed: p.dashed,
            })
            .collect()
    }

    /// Edge closest to a canvas point, within `tolerance` canvas units.
    pub fn find_edge_at(&self, point: Point, tolerance: f32) -> Option<(NodeId, NodeId)> {
        self.paths
            .iter()
            .map(|p| (p, p.route.curve.distance_to(point, HIT_SAMPLES)))
            .filter(|(_, d)| *d <= tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(p, _)| (p.parent, p.child))
    }
}
