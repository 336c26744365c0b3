use crate::geometry::{Point, Rect};
use crate::node::NodeId;
use slint::{Model, VecModel};
use std::collections::BTreeSet;

/// Result of resolving a click against the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Nothing changed (click on an already selected node or group member).
    Unchanged,
    /// The node replaced the selection.
    Selected(NodeId),
    /// Modifier click added the node to the selection.
    Added(NodeId),
    /// Modifier click removed the node from the selection.
    Removed(NodeId),
}

/// In-progress rubber-band rectangle in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaSelection {
    pub origin: Point,
    pub current: Point,
}

impl AreaSelection {
    pub fn rect(&self) -> Rect {
        Rect::from_corners(self.origin, self.current)
    }
}

/// Selection state: a single id XOR a multi-selection of two or more ids.
///
/// Going from one to two selected nodes moves the id into the set; dropping
/// back to one moves it out again, so exactly one representation is in use.
#[derive(Debug, Default, Clone)]
pub struct SelectionState {
    selected: Option<NodeId>,
    multi: BTreeSet<NodeId>,
    area: Option<AreaSelection>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a click on a node based on interaction modifiers
    pub fn handle_click(&mut self, id: NodeId, multi_modifier: bool) -> ClickOutcome {
        if multi_modifier {
            let mut ids: BTreeSet<NodeId> = self.iter().collect();
            let outcome = if ids.remove(&id) {
                ClickOutcome::Removed(id)
            } else {
                ids.insert(id);
                ClickOutcome::Added(id)
            };
            self.set_normalized(ids);
            return outcome;
        }
        if self.multi.contains(&id) || self.selected == Some(id) {
            return ClickOutcome::Unchanged;
        }
        self.select(id);
        ClickOutcome::Selected(id)
    }

    /// Replace the selection with a single node.
    pub fn select(&mut self, id: NodeId) {
        self.multi.clear();
        self.selected = Some(id);
    }

    /// Clear the current selection
    pub fn clear(&mut self) {
        self.selected = None;
        self.multi.clear();
    }

    /// Replace the current selection with a new set of IDs
    pub fn replace_selection<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = NodeId>,
    {
        self.set_normalized(ids.into_iter().collect());
    }

    /// Add IDs to the current selection
    pub fn extend_selection<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = NodeId>,
    {
        let mut all: BTreeSet<NodeId> = self.iter().collect();
        all.extend(ids);
        self.set_normalized(all);
    }

    /// Drop ids that no longer exist.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(NodeId) -> bool,
    {
        let ids: BTreeSet<NodeId> = self.iter().filter(|&id| keep(id)).collect();
        self.set_normalized(ids);
    }

    fn set_normalized(&mut self, ids: BTreeSet<NodeId>) {
        self.clear();
        match ids.len() {
            0 => {}
            1 => self.selected = ids.into_iter().next(),
            _ => self.multi = ids,
        }
    }

    /// Check if an ID is selected
    pub fn contains(&self, id: NodeId) -> bool {
        self.selected == Some(id) || self.multi.contains(&id)
    }

    /// The single selected node, if the selection is a single node.
    pub fn selected_id(&self) -> Option<NodeId> {
        self.selected
    }

    /// The multi-selection set; empty unless two or more nodes are selected.
    pub fn multi_selected_ids(&self) -> &BTreeSet<NodeId> {
        &self.multi
    }

    pub fn is_multi(&self) -> bool {
        !self.multi.is_empty()
    }

    /// Get an iterator over the selected IDs
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.selected.into_iter().chain(self.multi.iter().copied())
    }

    pub fn ids(&self) -> Vec<NodeId> {
        self.iter().collect()
    }

    /// Get the number of selected items
    pub fn len(&self) -> usize {
        self.multi.len() + usize::from(self.selected.is_some())
    }

    /// Check if the selection is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // === Rubber band ===

    pub fn begin_area(&mut self, origin: Point) {
        self.area = Some(AreaSelection {
            origin,
            current: origin,
        });
    }

    pub fn update_area(&mut self, current: Point) {
        if let Some(area) = self.area.as_mut() {
            area.current = current;
        }
    }

    pub fn area(&self) -> Option<&AreaSelection> {
        self.area.as_ref()
    }

    /// End the rubber band and return its screen-space rectangle.
    pub fn take_area(&mut self) -> Option<Rect> {
        self.area.take().map(|a| a.rect())
    }

    /// Sync the selected ids to a Slint VecModel
    pub fn sync_to_model(&self, model: &VecModel<NodeId>) {
        // Clear and repopulate to ensure exact match
        while model.row_count() > 0 {
            model.remove(0);
        }
        for id in self.iter() {
            model.push(id);
        }
    }
}
