use crate::node::NodeId;
use thiserror::Error;

/// Reasons a registry or topology operation was refused.
///
/// These never cross the [`CanvasEngine`](crate::engine::CanvasEngine)
/// boundary: the state machine logs them and carries on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The id is not (or no longer) in the registry
    #[error("node {0} not found")]
    NodeNotFound(NodeId),
    /// Cannot connect a node to itself
    #[error("cannot connect node {0} to itself")]
    SelfConnection(NodeId),
    /// Reparenting `child` under `parent` would close a loop
    #[error("connecting {child} under {parent} would create a cycle")]
    WouldCreateCycle { child: NodeId, parent: NodeId },
    /// A node was inserted with a parent id the registry does not hold
    #[error("parent {0} does not exist")]
    InvalidParent(NodeId),
    /// A node with this id is already registered
    #[error("node {0} already exists")]
    DuplicateId(NodeId),
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;
