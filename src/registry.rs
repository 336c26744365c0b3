//! Ordered node store with topology checks.
//!
//! Registry order is render order: later nodes are drawn on top and win hit
//! tests. Every mutation keeps two invariants: a non-null `parent_id` always
//! refers to a registered node, and the parent links form a forest.

use crate::error::{EngineError, Result};
use crate::geometry::{Point, Rect};
use crate::node::{clamp_size, Node, NodeId};
use std::collections::{HashMap, HashSet};

/// What happens to the children of a deleted node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeletePolicy {
    /// Delete the whole subtree.
    #[default]
    Cascade,
    /// Children move up to the deleted node's parent (or become roots).
    ReparentToGrandparent,
    /// Children become roots of their own trees.
    Orphan,
}

#[derive(Debug, Clone)]
pub struct NodeRegistry {
    nodes: Vec<Node>,
    index: HashMap<NodeId, usize>,
    next_id: NodeId,
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            next_id: 1,
        }
    }

    /// Build a registry from existing records, in order.
    ///
    /// Nodes may reference parents that appear later in the list; the
    /// topology is validated once everything is loaded.
    pub fn from_nodes(nodes: Vec<Node>) -> Result<Self> {
        let mut registry = Self::new();
        for node in nodes {
            if registry.index.contains_key(&node.id) {
                return Err(EngineError::DuplicateId(node.id));
            }
            registry.next_id = registry.next_id.max(node.id + 1);
            registry.index.insert(node.id, registry.nodes.len());
            registry.nodes.push(node);
        }
        for node in &registry.nodes {
            if let Some(parent) = node.parent_id {
                if !registry.index.contains_key(&parent) {
                    return Err(EngineError::InvalidParent(parent));
                }
                if registry.is_ancestor(node.id, parent) || parent == node.id {
                    return Err(EngineError::WouldCreateCycle {
                        child: node.id,
                        parent,
                    });
                }
            }
        }
        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.index.get(&id).map(|&i| &self.nodes[i])
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let i = *self.index.get(&id)?;
        Some(&mut self.nodes[i])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Reserve a fresh id.
    pub fn allocate_id(&mut self) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Append a node. Its parent, if any, must already be registered.
    pub fn insert(&mut self, mut node: Node) -> Result<NodeId> {
        if self.contains(node.id) {
            return Err(EngineError::DuplicateId(node.id));
        }
        if let Some(parent) = node.parent_id {
            if parent == node.id {
                return Err(EngineError::SelfConnection(node.id));
            }
            if !self.contains(parent) {
                return Err(EngineError::InvalidParent(parent));
            }
        }
        let (w, h) = clamp_size(node.width, node.height);
        node.width = w;
        node.height = h;
        let id = node.id;
        self.next_id = self.next_id.max(id + 1);
        self.index.insert(id, self.nodes.len());
        self.nodes.push(node);
        Ok(id)
    }

    pub fn set_position(&mut self, id: NodeId, x: f32, y: f32) -> Result<()> {
        let node = self.get_mut(id).ok_or(EngineError::NodeNotFound(id))?;
        node.x = x;
        node.y = y;
        Ok(())
    }

    /// Resize a node; the size is clamped to the minimum.
    pub fn set_size(&mut self, id: NodeId, width: f32, height: f32) -> Result<()> {
        let node = self.get_mut(id).ok_or(EngineError::NodeNotFound(id))?;
        node.set_size(width, height);
        Ok(())
    }

    pub fn set_text(&mut self, id: NodeId, text: &str) -> Result<()> {
        let node = self.get_mut(id).ok_or(EngineError::NodeNotFound(id))?;
        node.text = text.to_owned();
        Ok(())
    }

    /// Move every listed node by the same delta. Unknown ids are skipped.
    pub fn translate(&mut self, ids: &[NodeId], delta: Point) {
        for &id in ids {
            if let Some(node) = self.get_mut(id) {
                node.x += delta.x;
                node.y += delta.y;
            }
        }
    }

    /// True if `ancestor` appears on the parent chain of `id`.
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut seen = HashSet::new();
        let mut current = self.get(id).and_then(|n| n.parent_id);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            if !seen.insert(p) {
                break;
            }
            current = self.get(p).and_then(|n| n.parent_id);
        }
        false
    }

    /// Parent chain of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = self.get(id).and_then(|n| n.parent_id);
        while let Some(p) = current {
            if chain.contains(&p) {
                break;
            }
            chain.push(p);
            current = self.get(p).and_then(|n| n.parent_id);
        }
        chain
    }

    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).len()
    }

    /// Would making `parent` the parent of `child` break the forest?
    pub fn check_reparent(&self, child: NodeId, parent: NodeId) -> Result<()> {
        if child == parent {
            return Err(EngineError::SelfConnection(child));
        }
        if !self.contains(child) {
            return Err(EngineError::NodeNotFound(child));
        }
        if !self.contains(parent) {
            return Err(EngineError::NodeNotFound(parent));
        }
        if self.is_ancestor(child, parent) {
            return Err(EngineError::WouldCreateCycle { child, parent });
        }
        Ok(())
    }

    /// Reassign `child`'s parent. The previous edge is discarded.
    pub fn reparent(&mut self, child: NodeId, parent: NodeId) -> Result<()> {
        self.check_reparent(child, parent)?;
        if let Some(node) = self.get_mut(child) {
            node.parent_id = Some(parent);
        }
        Ok(())
    }

    /// Make `id` a root.
    pub fn detach(&mut self, id: NodeId) -> Result<()> {
        let node = self.get_mut(id).ok_or(EngineError::NodeNotFound(id))?;
        node.parent_id = None;
        Ok(())
    }

    /// Direct children of `id` in registry order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|n| n.parent_id == Some(id))
            .map(|n| n.id)
            .collect()
    }

    /// All descendants of `id`, breadth first.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut queue = std::collections::VecDeque::from(self.children(id));
        while let Some(next) = queue.pop_front() {
            if out.contains(&next) {
                continue;
            }
            out.push(next);
            queue.extend(self.children(next));
        }
        out
    }

    pub fn roots(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|n| n.parent_id.is_none())
            .map(|n| n.id)
            .collect()
    }

    /// `(parent, child)` pairs for every edge, in child registry order.
    pub fn edges(&self) -> Vec<(NodeId, NodeId)> {
        self.nodes
            .iter()
            .filter_map(|n| n.parent_id.map(|p| (p, n.id)))
            .collect()
    }

    /// Remove `id` and apply `policy` to its children.
    ///
    /// Returns every id that left the registry.
    pub fn remove(&mut self, id: NodeId, policy: DeletePolicy) -> Result<Vec<NodeId>> {
        let parent = self.get(id).ok_or(EngineError::NodeNotFound(id))?.parent_id;
        let mut removed = vec![id];
        match policy {
            DeletePolicy::Cascade => removed.extend(self.descendants(id)),
            DeletePolicy::ReparentToGrandparent => {
                for child in self.children(id) {
                    if let Some(node) = self.get_mut(child) {
                        node.parent_id = parent;
                    }
                }
            }
            DeletePolicy::Orphan => {
                for child in self.children(id) {
                    if let Some(node) = self.get_mut(child) {
                        node.parent_id = None;
                    }
                }
            }
        }
        let doomed: HashSet<NodeId> = removed.iter().copied().collect();
        self.nodes.retain(|n| !doomed.contains(&n.id));
        self.reindex();
        Ok(removed)
    }

    /// Bounding box of all nodes, or `None` when empty.
    pub fn bounds(&self) -> Option<Rect> {
        self.nodes
            .iter()
            .map(Node::rect)
            .reduce(|acc, r| acc.union(&r))
    }

    fn reindex(&mut self) {
        self.index = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id, i))
            .collect();
    }
}
