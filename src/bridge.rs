//! The host capability object.
//!
//! The engine never owns node data. It reads the registry through
//! [`HostBridge::registry`] and asks the host for every change; the host is
//! expected to apply mutations synchronously (optimistically), so the next
//! read already observes them.
//!
//! [`MemoryBridge`] is a complete in-memory host for tests and for embedders
//! that do not bring their own store.

use crate::geometry::Point;
use crate::layout;
use crate::node::{Node, NodeId, NodeType};
use crate::registry::{DeletePolicy, NodeRegistry};
use crate::routing::{ChildHints, LayoutMode};

/// Extra data for [`HostBridge::add_child_node`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AddChildOptions {
    pub node_type: NodeType,
    pub text: String,
    pub hints: ChildHints,
    /// Re-run the tidy layout after inserting.
    pub auto_align: bool,
}

/// Mutation and notification contract between the engine and its host.
///
/// Hooks without a sensible default are required; pure notifications default
/// to doing nothing.
pub trait HostBridge {
    /// Current node data. Read fresh on every event.
    fn registry(&self) -> &NodeRegistry;

    fn update_node_position(&mut self, id: NodeId, x: f32, y: f32);

    /// `committed` is false for intermediate drag frames. `position` is set
    /// when the resize also moved the node (top or left handles).
    fn update_node_size(
        &mut self,
        id: NodeId,
        width: f32,
        height: f32,
        committed: bool,
        position: Option<Point>,
    );

    fn update_node_text(&mut self, id: NodeId, text: &str);

    /// Translate a group of nodes by one delta.
    fn move_selected_nodes(&mut self, ids: &[NodeId], dx: f32, dy: f32) {
        let targets: Vec<(NodeId, Point)> = ids
            .iter()
            .filter_map(|&id| self.registry().get(id).map(|n| (id, n.position())))
            .collect();
        for (id, p) in targets {
            self.update_node_position(id, p.x + dx, p.y + dy);
        }
    }

    /// Make `child` a child of `parent`. Returns false if the host refused.
    fn connect_nodes(&mut self, child: NodeId, parent: NodeId) -> bool;

    fn disconnect_node(&mut self, id: NodeId);

    fn add_child_node(
        &mut self,
        parent: NodeId,
        position: Point,
        options: AddChildOptions,
    ) -> Option<NodeId>;

    fn duplicate_node(&mut self, id: NodeId, auto_align: bool) -> Option<NodeId>;

    fn delete_node(&mut self, id: NodeId, auto_align: bool);

    fn update_node_type(&mut self, _id: NodeId, _node_type: NodeType) {}

    /// Undo checkpoint after a committed drag or resize.
    fn save_node_position_to_history(&mut self) {}

    fn undo(&mut self) {}

    fn redo(&mut self) {}

    fn on_select_node(&mut self, _id: NodeId) {}

    fn on_add_to_selection(&mut self, _id: NodeId) {}

    fn on_remove_from_selection(&mut self, _id: NodeId) {}

    /// Corners are canvas space.
    fn on_select_nodes_in_area(&mut self, _top_left: Point, _bottom_right: Point, _additive: bool) {}

    fn on_clear_selection(&mut self) {}

    fn set_pan(&mut self, _pan: Point) {}

    fn set_zoom(&mut self, _zoom: f32) {}
}

/// Offset of a duplicated root from its original.
const DUPLICATE_OFFSET: f32 = 40.0;

/// In-memory host with snapshot undo/redo.
///
/// Every structural change and every explicit history checkpoint pushes the
/// previous committed state; drag frames in between are not recorded.
#[derive(Debug, Clone)]
pub struct MemoryBridge {
    registry: NodeRegistry,
    committed: NodeRegistry,
    undo_stack: Vec<NodeRegistry>,
    redo_stack: Vec<NodeRegistry>,
    history_limit: usize,
    delete_policy: DeletePolicy,
    layout_mode: LayoutMode,
    pan: Point,
    zoom: f32,
}

impl Default for MemoryBridge {
    fn default() -> Self {
        Self::new(NodeRegistry::new())
    }
}

impl MemoryBridge {
    pub fn new(registry: NodeRegistry) -> Self {
        Self {
            committed: registry.clone(),
            registry,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            history_limit: 100,
            delete_policy: DeletePolicy::default(),
            layout_mode: LayoutMode::default(),
            pan: Point::ZERO,
            zoom: 1.0,
        }
    }

    pub fn with_delete_policy(mut self, policy: DeletePolicy) -> Self {
        self.delete_policy = policy;
        self
    }

    pub fn with_layout_mode(mut self, mode: LayoutMode) -> Self {
        self.layout_mode = mode;
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit.max(1);
        self
    }

    pub fn registry_mut(&mut self) -> &mut NodeRegistry {
        &mut self.registry
    }

    pub fn delete_policy(&self) -> DeletePolicy {
        self.delete_policy
    }

    pub fn set_delete_policy(&mut self, policy: DeletePolicy) {
        self.delete_policy = policy;
    }

    pub fn set_layout_mode(&mut self, mode: LayoutMode) {
        self.layout_mode = mode;
    }

    /// Last pan pushed by the engine.
    pub fn pan(&self) -> Point {
        self.pan
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Record the current state as a new undo step.
    pub fn checkpoint(&mut self) {
        let previous = std::mem::replace(&mut self.committed, self.registry.clone());
        self.undo_stack.push(previous);
        if self.undo_stack.len() > self.history_limit {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
    }

    fn realign(&mut self, auto_align: bool) {
        if auto_align {
            layout::auto_align(&mut self.registry, self.layout_mode);
        }
    }
}

impl HostBridge for MemoryBridge {
    fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    fn update_node_position(&mut self, id: NodeId, x: f32, y: f32) {
        if let Err(e) = self.registry.set_position(id, x, y) {
            log::debug!("update_node_position ignored: {}", e);
        }
    }

    fn update_node_size(
        &mut self,
        id: NodeId,
        width: f32,
        height: f32,
        _committed: bool,
        position: Option<Point>,
    ) {
        if let Err(e) = self.registry.set_size(id, width, height) {
            log::debug!("update_node_size ignored: {}", e);
            return;
        }
        if let Some(p) = position {
            let _ = self.registry.set_position(id, p.x, p.y);
        }
    }

    fn update_node_text(&mut self, id: NodeId, text: &str) {
        if self.registry.set_text(id, text).is_ok() {
            self.checkpoint();
        }
    }

    fn move_selected_nodes(&mut self, ids: &[NodeId], dx: f32, dy: f32) {
        self.registry.translate(ids, Point::new(dx, dy));
    }

    fn connect_nodes(&mut self, child: NodeId, parent: NodeId) -> bool {
        match self.registry.reparent(child, parent) {
            Ok(()) => {
                self.checkpoint();
                true
            }
            Err(e) => {
                log::debug!("connect refused: {}", e);
                false
            }
        }
    }

    fn disconnect_node(&mut self, id: NodeId) {
        if self.registry.detach(id).is_ok() {
            self.checkpoint();
        }
    }

    fn add_child_node(
        &mut self,
        parent: NodeId,
        position: Point,
        options: AddChildOptions,
    ) -> Option<NodeId> {
        if !self.registry.contains(parent) {
            return None;
        }
        let id = self.registry.allocate_id();
        let node = Node::new(id, position.x, position.y)
            .with_parent(parent)
            .with_text(options.text)
            .with_type(options.node_type)
            .with_child_direction(options.hints.direction)
            .with_axis_side(options.hints.axis_side);
        if let Err(e) = self.registry.insert(node) {
            log::debug!("add_child_node failed: {}", e);
            return None;
        }
        self.realign(options.auto_align);
        self.checkpoint();
        Some(id)
    }

    fn duplicate_node(&mut self, id: NodeId, auto_align: bool) -> Option<NodeId> {
        let source = self.registry.get(id)?.clone();
        let new_id = self.registry.allocate_id();
        let position = match source.parent_id {
            Some(parent) => {
                layout::child_position(&self.registry, parent, self.layout_mode, (&source).into())
            }
            None => None,
        }
        .unwrap_or(Point::new(source.x + DUPLICATE_OFFSET, source.y + DUPLICATE_OFFSET));
        let copy = Node {
            id: new_id,
            x: position.x,
            y: position.y,
            ..source
        };
        if let Err(e) = self.registry.insert(copy) {
            log::debug!("duplicate_node failed: {}", e);
            return None;
        }
        self.realign(auto_align);
        self.checkpoint();
        Some(new_id)
    }

    fn delete_node(&mut self, id: NodeId, auto_align: bool) {
        match self.registry.remove(id, self.delete_policy) {
            Ok(removed) => {
                log::debug!("deleted {:?} ({:?})", removed, self.delete_policy);
                self.realign(auto_align);
                self.checkpoint();
            }
            Err(e) => log::debug!("delete_node ignored: {}", e),
        }
    }

    fn update_node_type(&mut self, id: NodeId, node_type: NodeType) {
        if let Some(node) = self.registry.get_mut(id) {
            node.node_type = node_type;
            self.checkpoint();
        }
    }

    fn save_node_position_to_history(&mut self) {
        self.checkpoint();
    }

    fn undo(&mut self) {
        if let Some(previous) = self.undo_stack.pop() {
            let current = std::mem::replace(&mut self.registry, previous.clone());
            self.redo_stack.push(current);
            self.committed = previous;
        }
    }

    fn redo(&mut self) {
        if let Some(next) = self.redo_stack.pop() {
            let current = std::mem::replace(&mut self.registry, next.clone());
            self.undo_stack.push(current);
            self.committed = next;
        }
    }

    fn set_pan(&mut self, pan: Point) {
        self.pan = pan;
    }

    fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom;
    }
}
