//! Common test utilities for integration tests.

#![allow(dead_code)]

pub mod harness;

use mindmap_canvas::{
    AddChildOptions, HostBridge, MemoryBridge, NodeId, NodeRegistry, NodeType, Point,
};
use std::cell::RefCell;
use std::rc::Rc;

/// Selection notifications in the order the engine sent them.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionEvent {
    Select(NodeId),
    Add(NodeId),
    Remove(NodeId),
    Area {
        top_left: Point,
        bottom_right: Point,
        additive: bool,
    },
    Clear,
}

/// Tracks bridge calls for testing.
///
/// Each field records calls to the corresponding hook with their arguments.
/// Clones share the same records, so a test can keep one while the engine
/// owns the bridge.
#[derive(Default, Clone)]
pub struct CallbackTracker {
    /// (node_id, x, y)
    pub position_updates: Rc<RefCell<Vec<(NodeId, f32, f32)>>>,
    /// (node_id, width, height, committed, moved_to)
    pub size_updates: Rc<RefCell<Vec<(NodeId, f32, f32, bool, Option<Point>)>>>,
    /// (ids, dx, dy)
    pub group_moves: Rc<RefCell<Vec<(Vec<NodeId>, f32, f32)>>>,
    /// (node_id, text)
    pub text_updates: Rc<RefCell<Vec<(NodeId, String)>>>,
    /// (child, parent, accepted)
    pub connections: Rc<RefCell<Vec<(NodeId, NodeId, bool)>>>,
    pub disconnections: Rc<RefCell<Vec<NodeId>>>,
    /// (parent, position, new id)
    pub added_children: Rc<RefCell<Vec<(NodeId, Point, Option<NodeId>)>>>,
    pub duplicated: Rc<RefCell<Vec<NodeId>>>,
    /// (node_id, auto_align)
    pub deleted: Rc<RefCell<Vec<(NodeId, bool)>>>,
    pub type_updates: Rc<RefCell<Vec<(NodeId, NodeType)>>>,
    /// Count of save_node_position_to_history calls
    pub history_saves: Rc<RefCell<usize>>,
    pub undo_calls: Rc<RefCell<usize>>,
    pub redo_calls: Rc<RefCell<usize>>,
    pub selection_events: Rc<RefCell<Vec<SelectionEvent>>>,
    pub pan_updates: Rc<RefCell<Vec<Point>>>,
    pub zoom_updates: Rc<RefCell<Vec<f32>>>,
}

impl CallbackTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all recorded calls.
    pub fn clear(&self) {
        self.position_updates.borrow_mut().clear();
        self.size_updates.borrow_mut().clear();
        self.group_moves.borrow_mut().clear();
        self.text_updates.borrow_mut().clear();
        self.connections.borrow_mut().clear();
        self.disconnections.borrow_mut().clear();
        self.added_children.borrow_mut().clear();
        self.duplicated.borrow_mut().clear();
        self.deleted.borrow_mut().clear();
        self.type_updates.borrow_mut().clear();
        *self.history_saves.borrow_mut() = 0;
        *self.undo_calls.borrow_mut() = 0;
        *self.redo_calls.borrow_mut() = 0;
        self.selection_events.borrow_mut().clear();
        self.pan_updates.borrow_mut().clear();
        self.zoom_updates.borrow_mut().clear();
    }

    pub fn history_saves(&self) -> usize {
        *self.history_saves.borrow()
    }

    pub fn last_position_update(&self) -> Option<(NodeId, f32, f32)> {
        self.position_updates.borrow().last().copied()
    }

    pub fn last_size_update(&self) -> Option<(NodeId, f32, f32, bool, Option<Point>)> {
        self.size_updates.borrow().last().copied()
    }

    pub fn last_selection_event(&self) -> Option<SelectionEvent> {
        self.selection_events.borrow().last().cloned()
    }
}

/// A [`MemoryBridge`] that records every hook into a [`CallbackTracker`].
pub struct TrackingBridge {
    pub inner: MemoryBridge,
    pub tracker: CallbackTracker,
}

impl TrackingBridge {
    pub fn new(inner: MemoryBridge, tracker: CallbackTracker) -> Self {
        Self { inner, tracker }
    }
}

impl HostBridge for TrackingBridge {
    fn registry(&self) -> &NodeRegistry {
        self.inner.registry()
    }

    fn update_node_position(&mut self, id: NodeId, x: f32, y: f32) {
        self.tracker.position_updates.borrow_mut().push((id, x, y));
        self.inner.update_node_position(id, x, y);
    }

    fn update_node_size(
        &mut self,
        id: NodeId,
        width: f32,
        height: f32,
        committed: bool,
        position: Option<Point>,
    ) {
        self.tracker
            .size_updates
            .borrow_mut()
            .push((id, width, height, committed, position));
        self.inner
            .update_node_size(id, width, height, committed, position);
    }

    fn update_node_text(&mut self, id: NodeId, text: &str) {
        self.tracker
            .text_updates
            .borrow_mut()
            .push((id, text.to_string()));
        self.inner.update_node_text(id, text);
    }

    fn move_selected_nodes(&mut self, ids: &[NodeId], dx: f32, dy: f32) {
        self.tracker
            .group_moves
            .borrow_mut()
            .push((ids.to_vec(), dx, dy));
        self.inner.move_selected_nodes(ids, dx, dy);
    }

    fn connect_nodes(&mut self, child: NodeId, parent: NodeId) -> bool {
        let accepted = self.inner.connect_nodes(child, parent);
        self.tracker
            .connections
            .borrow_mut()
            .push((child, parent, accepted));
        accepted
    }

    fn disconnect_node(&mut self, id: NodeId) {
        self.tracker.disconnections.borrow_mut().push(id);
        self.inner.disconnect_node(id);
    }

    fn add_child_node(
        &mut self,
        parent: NodeId,
        position: Point,
        options: AddChildOptions,
    ) -> Option<NodeId> {
        let id = self.inner.add_child_node(parent, position, options);
        self.tracker
            .added_children
            .borrow_mut()
            .push((parent, position, id));
        id
    }

    fn duplicate_node(&mut self, id: NodeId, auto_align: bool) -> Option<NodeId> {
        self.tracker.duplicated.borrow_mut().push(id);
        self.inner.duplicate_node(id, auto_align)
    }

    fn delete_node(&mut self, id: NodeId, auto_align: bool) {
        self.tracker.deleted.borrow_mut().push((id, auto_align));
        self.inner.delete_node(id, auto_align);
    }

    fn update_node_type(&mut self, id: NodeId, node_type: NodeType) {
        self.tracker.type_updates.borrow_mut().push((id, node_type));
        self.inner.update_node_type(id, node_type);
    }

    fn save_node_position_to_history(&mut self) {
        *self.tracker.history_saves.borrow_mut() += 1;
        self.inner.save_node_position_to_history();
    }

    fn undo(&mut self) {
        *self.tracker.undo_calls.borrow_mut() += 1;
        self.inner.undo();
    }

    fn redo(&mut self) {
        *self.tracker.redo_calls.borrow_mut() += 1;
        self.inner.redo();
    }

    fn on_select_node(&mut self, id: NodeId) {
        self.tracker
            .selection_events
            .borrow_mut()
            .push(SelectionEvent::Select(id));
    }

    fn on_add_to_selection(&mut self, id: NodeId) {
        self.tracker
            .selection_events
            .borrow_mut()
            .push(SelectionEvent::Add(id));
    }

    fn on_remove_from_selection(&mut self, id: NodeId) {
        self.tracker
            .selection_events
            .borrow_mut()
            .push(SelectionEvent::Remove(id));
    }

    fn on_select_nodes_in_area(&mut self, top_left: Point, bottom_right: Point, additive: bool) {
        self.tracker
            .selection_events
            .borrow_mut()
            .push(SelectionEvent::Area {
                top_left,
                bottom_right,
                additive,
            });
    }

    fn on_clear_selection(&mut self) {
        self.tracker
            .selection_events
            .borrow_mut()
            .push(SelectionEvent::Clear);
    }

    fn set_pan(&mut self, pan: Point) {
        self.tracker.pan_updates.borrow_mut().push(pan);
        self.inner.set_pan(pan);
    }

    fn set_zoom(&mut self, zoom: f32) {
        self.tracker.zoom_updates.borrow_mut().push(zoom);
        self.inner.set_zoom(zoom);
    }
}
