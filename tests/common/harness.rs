//! Test harness driving a [`CanvasEngine`] through a recording bridge.
//!
//! Provides a small scene, helpers that simulate pointer, wheel, key and
//! touch input in screen coordinates, and accessors for the resulting node
//! data.

#![allow(dead_code)]

use super::{CallbackTracker, TrackingBridge};
use mindmap_canvas::{
    CanvasEngine, EngineConfig, HostBridge, Key, KeyEvent, MemoryBridge, Modifiers, Node, NodeId,
    NodeRegistry, Point, PointerButton, PointerEvent, TouchEvent, TouchPoint, WheelEvent,
};
use std::time::Duration;

/// Per-event clock advance for touch frames.
const FRAME: Duration = Duration::from_millis(16);

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-3,
        "expected {} but got {}",
        expected,
        actual
    );
}

pub fn assert_point_close(actual: Point, expected: Point) {
    assert!(
        (actual.x - expected.x).abs() < 1e-3 && (actual.y - expected.y).abs() < 1e-3,
        "expected {:?} but got {:?}",
        expected,
        actual
    );
}

/// Test harness around a [`CanvasEngine`].
///
/// Auto-align is off by default so positions stay predictable.
pub struct EngineHarness {
    pub engine: CanvasEngine<TrackingBridge>,
    pub tracker: CallbackTracker,
    touches: Vec<TouchPoint>,
    clock: Duration,
}

impl EngineHarness {
    /// Node A (1) at (100, 100) and node B (2) at (400, 100), both roots, 160×64.
    pub fn new() -> Self {
        Self::with_nodes(vec![
            Node::new(1, 100.0, 100.0).with_text("A"),
            Node::new(2, 400.0, 100.0).with_text("B"),
        ])
    }

    /// Root 1 at (100, 200); children 2 at (400, 100) and 3 at (400, 300);
    /// grandchild 4 at (700, 100) under 2.
    pub fn tree() -> Self {
        Self::with_nodes(vec![
            Node::new(1, 100.0, 200.0).with_text("Root"),
            Node::new(2, 400.0, 100.0).with_parent(1),
            Node::new(3, 400.0, 300.0).with_parent(1),
            Node::new(4, 700.0, 100.0).with_parent(2),
        ])
    }

    pub fn with_nodes(nodes: Vec<Node>) -> Self {
        Self::with_bridge(
            MemoryBridge::new(NodeRegistry::from_nodes(nodes).unwrap()),
            EngineConfig::new().with_auto_align(false),
        )
    }

    pub fn with_bridge(bridge: MemoryBridge, config: EngineConfig) -> Self {
        init_logging();
        let tracker = CallbackTracker::new();
        let engine = CanvasEngine::with_config(TrackingBridge::new(bridge, tracker.clone()), config);
        Self {
            engine,
            tracker,
            touches: Vec::new(),
            clock: Duration::from_secs(1),
        }
    }

    // === Node data ===

    pub fn registry(&self) -> &NodeRegistry {
        self.engine.bridge().registry()
    }

    pub fn node(&self, id: NodeId) -> Node {
        self.registry()
            .get(id)
            .cloned()
            .unwrap_or_else(|| panic!("node {} not found", id))
    }

    pub fn pos(&self, id: NodeId) -> Point {
        self.node(id).position()
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent_id
    }

    pub fn selected(&self) -> Vec<NodeId> {
        self.engine.selection().ids()
    }

    // === Pointer ===

    pub fn press(&mut self, x: f32, y: f32) {
        self.engine.pointer_down(PointerEvent::at(x, y));
    }

    pub fn press_with(&mut self, x: f32, y: f32, modifiers: Modifiers) {
        self.engine
            .pointer_down(PointerEvent::at(x, y).with_modifiers(modifiers));
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        self.engine.pointer_move(PointerEvent::at(x, y));
    }

    pub fn release(&mut self, x: f32, y: f32) {
        self.engine.pointer_up(PointerEvent::at(x, y));
    }

    pub fn release_with(&mut self, x: f32, y: f32, modifiers: Modifiers) {
        self.engine
            .pointer_up(PointerEvent::at(x, y).with_modifiers(modifiers));
    }

    pub fn click(&mut self, x: f32, y: f32) {
        self.press(x, y);
        self.release(x, y);
    }

    pub fn click_with(&mut self, x: f32, y: f32, modifiers: Modifiers) {
        self.press_with(x, y, modifiers);
        self.release(x, y);
    }

    pub fn double_click(&mut self, x: f32, y: f32) {
        self.click(x, y);
        self.engine
            .pointer_down(PointerEvent::at(x, y).with_click_count(2));
        self.release(x, y);
    }

    pub fn right_click(&mut self, x: f32, y: f32) {
        self.engine
            .pointer_down(PointerEvent::at(x, y).with_button(PointerButton::Secondary));
        self.release(x, y);
    }

    /// Press, move in `steps` equal frames, release.
    pub fn drag(&mut self, from: (f32, f32), to: (f32, f32), steps: u32) {
        self.drag_with(from, to, steps, Modifiers::NONE);
    }

    pub fn drag_with(&mut self, from: (f32, f32), to: (f32, f32), steps: u32, modifiers: Modifiers) {
        self.press_with(from.0, from.1, modifiers);
        let steps = steps.max(1);
        for i in 1..=steps {
            let t = i as f32 / steps as f32;
            self.move_to(from.0 + (to.0 - from.0) * t, from.1 + (to.1 - from.1) * t);
        }
        self.release_with(to.0, to.1, modifiers);
    }

    pub fn wheel(&mut self, x: f32, y: f32, dx: f32, dy: f32, modifiers: Modifiers) {
        self.engine.wheel(WheelEvent {
            position: Point::new(x, y),
            delta: Point::new(dx, dy),
            modifiers,
        });
    }

    // === Keyboard ===

    pub fn key(&mut self, key: Key) -> bool {
        self.engine.key_down(&KeyEvent::new(key))
    }

    pub fn key_with(&mut self, key: Key, modifiers: Modifiers) -> bool {
        self.engine
            .key_down(&KeyEvent::new(key).with_modifiers(modifiers))
    }

    // === Touch ===

    pub fn wait(&mut self, ms: u64) {
        self.clock += Duration::from_millis(ms);
    }

    fn frame(&mut self, changed: TouchPoint) -> TouchEvent {
        self.clock += FRAME;
        TouchEvent::new(self.touches.clone(), vec![changed], self.clock)
    }

    pub fn touch_down(&mut self, id: u64, x: f32, y: f32) {
        let touch = TouchPoint::new(id, x, y);
        self.touches.push(touch);
        let event = self.frame(touch);
        self.engine.touch_start(&event);
    }

    /// Two fingers landing in the same frame.
    pub fn touch_down_pair(&mut self, a: (f32, f32), b: (f32, f32)) {
        let ta = TouchPoint::new(1, a.0, a.1);
        let tb = TouchPoint::new(2, b.0, b.1);
        self.touches = vec![ta, tb];
        self.clock += FRAME;
        let event = TouchEvent::new(vec![ta, tb], vec![ta, tb], self.clock);
        self.engine.touch_start(&event);
    }

    pub fn touch_move(&mut self, id: u64, x: f32, y: f32) {
        let Some(slot) = self.touches.iter_mut().find(|t| t.id == id) else {
            panic!("touch {} is not down", id);
        };
        slot.position = Point::new(x, y);
        let touch = *slot;
        let event = self.frame(touch);
        self.engine.touch_move(&event);
    }

    /// Move both fingers of a pinch in one frame.
    pub fn touch_move_pair(&mut self, a: (f32, f32), b: (f32, f32)) {
        let ta = TouchPoint::new(1, a.0, a.1);
        let tb = TouchPoint::new(2, b.0, b.1);
        self.touches = vec![ta, tb];
        self.clock += FRAME;
        let event = TouchEvent::new(vec![ta, tb], vec![ta, tb], self.clock);
        self.engine.touch_move(&event);
    }

    pub fn touch_up(&mut self, id: u64) {
        let Some(index) = self.touches.iter().position(|t| t.id == id) else {
            panic!("touch {} is not down", id);
        };
        let touch = self.touches.remove(index);
        let event = self.frame(touch);
        self.engine.touch_end(&event);
    }

    pub fn tap(&mut self, x: f32, y: f32) {
        self.touch_down(9, x, y);
        self.touch_up(9);
    }
}
