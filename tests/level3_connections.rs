//! Level 3: Connection Mode & Connector Routing Tests
//!
//! Tests the manual "link A to B" flow (connect handle, snapping, staying
//! active across several links, cancellation) and the connector paths the
//! routing table produces for the resulting edges.

mod common;

use common::harness::EngineHarness;
use mindmap_canvas::routing::compute_anchors;
use mindmap_canvas::{
    ChildHints, ConnectorManager, Curve, DeletePolicy, InteractionState, Key, LayoutMode, Node,
    Point, RoutingParams, Side,
};

/// Select node 1 and press its connect handle.
fn start_from_a(harness: &mut EngineHarness) {
    harness.click(150.0, 120.0);
    harness.click(276.0, 100.0);
    assert_eq!(harness.engine.state(), InteractionState::Connecting);
}

fn three_roots() -> EngineHarness {
    EngineHarness::with_nodes(vec![
        Node::new(1, 100.0, 100.0),
        Node::new(2, 400.0, 100.0),
        Node::new(3, 400.0, 300.0),
    ])
}

// ============================================================================
// Completing connections
// ============================================================================

#[test]
fn test_connect_b_under_a_routes_horizontal_bezier() {
    let mut harness = EngineHarness::new();
    start_from_a(&mut harness);

    harness.click(450.0, 120.0);

    assert_eq!(harness.parent_of(2), Some(1));
    assert_eq!(
        harness.tracker.connections.borrow().as_slice(),
        &[(2, 1, true)]
    );

    let a = harness.node(1).rect();
    let b = harness.node(2).rect();
    let anchors = compute_anchors(&a, &b, LayoutMode::MindFlow, ChildHints::default(), None, 8.0);
    assert_eq!(anchors.start.side, Side::Right);
    assert_eq!(anchors.end.side, Side::Left);
    assert_eq!(anchors.start.point, Point::new(260.0, 132.0));
    assert_eq!(anchors.end.point, Point::new(400.0, 132.0));

    let mut connectors = ConnectorManager::new(RoutingParams::default());
    connectors.update(harness.registry(), LayoutMode::MindFlow, harness.engine.viewport());
    let edge = connectors.path_to(2).unwrap();
    assert_eq!(edge.parent, 1);
    assert!(matches!(edge.route.curve, Curve::Bezier(_)));
    assert_eq!(edge.route.curve.start(), Point::new(260.0, 132.0));
    assert_eq!(edge.route.curve.end(), Point::new(400.0, 132.0));
}

#[test]
fn test_mode_stays_active_for_several_children() {
    let mut harness = three_roots();
    start_from_a(&mut harness);

    harness.click(450.0, 120.0);
    assert_eq!(harness.engine.state(), InteractionState::Connecting);
    harness.click(450.0, 320.0);

    assert_eq!(harness.parent_of(2), Some(1));
    assert_eq!(harness.parent_of(3), Some(1));
    assert_eq!(harness.engine.connection().source_id, Some(1));
    assert!(harness.engine.connection().active);
}

#[test]
fn test_click_selects_nothing_while_connecting() {
    let mut harness = EngineHarness::new();
    start_from_a(&mut harness);
    harness.click(450.0, 120.0);
    assert_eq!(harness.selected(), vec![1]);
    assert!(harness.tracker.position_updates.borrow().is_empty());
}

#[test]
fn test_begin_connection_directly() {
    let mut harness = EngineHarness::new();
    harness.engine.begin_connection(2);
    harness.click(150.0, 120.0);
    assert_eq!(harness.parent_of(1), Some(2));
}

// ============================================================================
// Invalid targets
// ============================================================================

#[test]
fn test_self_connection_is_ignored_and_mode_stays() {
    let mut harness = EngineHarness::new();
    start_from_a(&mut harness);

    harness.click(150.0, 120.0);

    assert_eq!(harness.parent_of(1), None);
    assert!(harness.tracker.connections.borrow().is_empty());
    assert!(harness.engine.connection().active);
}

#[test]
fn test_cycle_is_ignored_and_mode_stays() {
    let mut harness = EngineHarness::tree();
    // Source 4 is a grandchild of root 1
    harness.engine.begin_connection(4);

    harness.click(150.0, 220.0);

    assert_eq!(harness.parent_of(1), None);
    assert!(harness.tracker.connections.borrow().is_empty());
    assert!(harness.engine.connection().active);
}

#[test]
fn test_unknown_source_does_not_start() {
    let mut harness = EngineHarness::new();
    harness.engine.begin_connection(42);
    assert_eq!(harness.engine.state(), InteractionState::Idle);
}

// ============================================================================
// Snapping & preview
// ============================================================================

#[test]
fn test_pointer_near_target_snaps() {
    let mut harness = EngineHarness::new();
    start_from_a(&mut harness);

    // Below node B, outside its bounds, within the snap radius
    harness.move_to(480.0, 190.0);

    let state = *harness.engine.connection();
    assert_eq!(state.snap_target, Some(2));
    let anchor = state.snap_anchor.unwrap();
    assert_eq!(anchor.side, Side::Left);
    assert_eq!(anchor.point, Point::new(400.0, 132.0));

    let preview = harness.engine.connection_preview().unwrap();
    assert!(preview.snapped);
    assert!(!preview.style.dashed);
    assert!(preview.style.glow);
    assert_eq!(preview.curve.end(), Point::new(400.0, 132.0));
}

#[test]
fn test_click_uses_snap_target_read_at_click_time() {
    let mut harness = EngineHarness::new();
    start_from_a(&mut harness);

    // No move in between: the click itself refreshes the snap target
    harness.click(480.0, 190.0);

    assert_eq!(harness.parent_of(2), Some(1));
    assert!(harness.engine.connection().active);
}

#[test]
fn test_free_preview_follows_pointer() {
    let mut harness = EngineHarness::new();
    start_from_a(&mut harness);
    harness.move_to(300.0, 500.0);

    let preview = harness.engine.connection_preview().unwrap();
    assert!(!preview.snapped);
    assert!(preview.style.dashed);
    assert_eq!(preview.curve.end(), Point::new(300.0, 500.0));
    assert_eq!(harness.engine.connection().snap_target, None);
}

#[test]
fn test_no_preview_outside_connection_mode() {
    let harness = EngineHarness::new();
    assert!(harness.engine.connection_preview().is_none());
}

// ============================================================================
// Cancellation
// ============================================================================

#[test]
fn test_background_click_cancels() {
    let mut harness = EngineHarness::new();
    start_from_a(&mut harness);

    harness.click(700.0, 500.0);

    assert!(!harness.engine.connection().active);
    assert_eq!(harness.engine.state(), InteractionState::Idle);
    assert!(harness.tracker.connections.borrow().is_empty());
    // The cancelling click does not also clear the selection
    assert_eq!(harness.selected(), vec![1]);
}

#[test]
fn test_escape_cancels_before_clearing_selection() {
    let mut harness = EngineHarness::new();
    start_from_a(&mut harness);

    assert!(harness.key(Key::Escape));
    assert!(!harness.engine.connection().active);
    assert_eq!(harness.selected(), vec![1]);

    assert!(harness.key(Key::Escape));
    assert!(harness.selected().is_empty());
}

#[test]
fn test_source_deleted_cancels_on_next_move() {
    let mut harness = EngineHarness::new();
    start_from_a(&mut harness);
    harness
        .engine
        .bridge_mut()
        .inner
        .registry_mut()
        .remove(1, DeletePolicy::Cascade)
        .unwrap();

    harness.move_to(450.0, 120.0);

    assert!(!harness.engine.connection().active);
    assert!(harness.engine.connection_preview().is_none());
}

// ============================================================================
// Disconnect & routing per layout
// ============================================================================

#[test]
fn test_disconnect_detaches_child() {
    let mut harness = EngineHarness::tree();
    harness.engine.disconnect(3);
    assert_eq!(harness.parent_of(3), None);
    assert_eq!(harness.tracker.disconnections.borrow().as_slice(), &[3]);

    // A root has nothing to disconnect
    harness.engine.disconnect(1);
    assert_eq!(harness.tracker.disconnections.borrow().len(), 1);
}

#[test]
fn test_tree_layout_routes_elbows() {
    let mut harness = EngineHarness::new();
    harness.engine.set_layout_mode(LayoutMode::MindTree);
    start_from_a(&mut harness);
    harness.click(450.0, 120.0);

    let mut connectors = ConnectorManager::default();
    connectors.update(harness.registry(), harness.engine.layout_mode(), harness.engine.viewport());
    let curve = connectors.path_to(2).unwrap().route.curve;
    assert!(matches!(curve, Curve::Elbow(_)));
    assert_eq!(curve.start(), Point::new(180.0, 164.0));
    assert_eq!(curve.end(), Point::new(480.0, 100.0));
}

#[test]
fn test_connectors_follow_dragged_child() {
    let mut harness = EngineHarness::tree();
    let mut connectors = ConnectorManager::default();
    connectors.update(harness.registry(), LayoutMode::MindFlow, harness.engine.viewport());
    assert_eq!(connectors.len(), 3);

    // Drag child 3 to the far left of the root
    harness.drag((450.0, 320.0), (-250.0, 320.0), 4);
    connectors.update(harness.registry(), LayoutMode::MindFlow, harness.engine.viewport());

    let route = &connectors.path_to(3).unwrap().route;
    assert_eq!(route.anchors.start.side, Side::Left);
    assert_eq!(route.anchors.end.side, Side::Right);
}
