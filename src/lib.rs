//! # Mind Map Canvas
//!
//! Interaction engine for infinite-canvas mind map editors: a pan/zoom
//! viewport, a drag / resize / area-select / connect state machine, connector
//! routing per layout mode and touch gesture recognition.
//!
//! The engine does not own node data. It reads a [`NodeRegistry`] through a
//! [`HostBridge`] and reports every change back through the same bridge, so a
//! host can keep its own store, history and persistence. [`MemoryBridge`] is a
//! complete in-memory implementation with snapshot undo/redo.
//!
//! ## Quick Start
//!
//! ```ignore
//! use mindmap_canvas::{CanvasEngine, MemoryBridge, Node, NodeRegistry, PointerEvent};
//!
//! let registry = NodeRegistry::from_nodes(vec![
//!     Node::new(1, 100.0, 100.0).with_text("Root"),
//!     Node::new(2, 400.0, 100.0).with_parent(1),
//! ])?;
//! let mut engine = CanvasEngine::new(MemoryBridge::new(registry));
//!
//! engine.pointer_down(PointerEvent::at(450.0, 120.0));
//! engine.pointer_move(PointerEvent::at(500.0, 100.0));
//! engine.pointer_up(PointerEvent::at(500.0, 100.0));
//! ```
//!
//! ## Modules
//!
//! - [`engine`] - [`CanvasEngine`], the manipulation state machine
//! - [`viewport`] - screen ↔ canvas transform and zoom about a point
//! - [`routing`] / [`path`] - anchor selection and connector curves
//! - [`gesture`] - touch pan, pinch and tap classification
//! - [`links`] - [`ConnectorManager`], every edge routed and synced to a model
//! - [`controller`] - [`CanvasController`], a cloneable handle for UI callbacks
//!
//! Enable the `layout` feature for a layered auto-layout backed by
//! `rust-sugiyama`.

pub mod bridge;
pub mod config;
pub mod connection;
pub mod controller;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod input;
pub mod layout;
pub mod links;
pub mod node;
pub mod overlay;
pub mod path;
pub mod registry;
pub mod routing;
pub mod selection;
pub mod viewport;

pub use bridge::{AddChildOptions, HostBridge, MemoryBridge};
pub use config::EngineConfig;
pub use connection::{ConnectionPreview, ConnectionState, PreviewStyle};
pub use controller::CanvasController;
pub use engine::{CanvasEngine, InteractionMode, InteractionState};
pub use error::{EngineError, Result};
pub use geometry::{Point, Rect};
pub use gesture::{GestureEvent, GestureRecognizer};
pub use hit_test::{HitTarget, NodeGeometry, ResizeHandle, SimpleNodeGeometry};
pub use input::{
    Key, KeyEvent, Modifiers, PointerButton, PointerEvent, PointerSource, TouchEvent, TouchPoint,
    WheelEvent,
};
pub use layout::{auto_align, child_position, Placement};
pub use links::{ConnectorManager, ConnectorPath, ConnectorRow};
pub use node::{BorderStyle, Node, NodeId, NodeShape, NodeStyle, NodeType};
pub use overlay::{ContextMenu, ControlKind, FloatingControl};
pub use path::{CubicBezier, Curve, ElbowPath};
pub use registry::{DeletePolicy, NodeRegistry};
pub use routing::{
    AnchorSides, ChildHints, EdgeRouting, LayoutMode, LayoutRouting, PathFamily, Route,
    RoutingParams, RoutingRule, Side, ROUTING_TABLE,
};
pub use selection::{ClickOutcome, SelectionState};
pub use viewport::Viewport;
