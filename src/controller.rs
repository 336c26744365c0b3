//! Shared handle for wiring the engine into a Slint window.
//!
//! [`CanvasController`] keeps the engine, the connector manager and the
//! selection model behind `Rc<RefCell<_>>` so it can be cloned into every
//! callback closure. Screen coordinates come in as plain `f32`s.
//!
//! # Example
//!
//! ```ignore
//! use mindmap_canvas::{CanvasController, MemoryBridge};
//!
//! slint::include_modules!();
//!
//! fn main() {
//!     let window = MainWindow::new().unwrap();
//!     let ctrl = CanvasController::new(MemoryBridge::new(registry));
//!
//!     window.on_pointer_pressed(ctrl.pointer_down_callback());
//!     window.on_pointer_moved(ctrl.pointer_move_callback());
//!     window.on_pointer_released(ctrl.pointer_up_callback());
//!     window.on_scrolled(ctrl.wheel_callback());
//!     window.on_pointer_cancelled(ctrl.pointer_cancel_callback());
//!     window.on_touch_started(ctrl.touch_down_callback());
//!     window.on_touch_moved(ctrl.touch_move_callback());
//!     window.on_touch_ended(ctrl.touch_up_callback());
//!     window.on_touch_cancelled(ctrl.touch_cancel_callback());
//!     window.on_key_pressed(ctrl.key_pressed_callback());
//!     window.on_connector_path(ctrl.connector_path_callback());
//!     window.on_connection_preview_path(ctrl.connection_preview_callback());
//!
//!     window.set_selected_ids(ModelRc::from(ctrl.selection_model()));
//!     window.run().unwrap();
//! }
//! ```

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;
use std::time::{Duration, Instant};

use slint::{SharedString, VecModel};

use crate::bridge::HostBridge;
use crate::config::EngineConfig;
use crate::engine::CanvasEngine;
use crate::geometry::Point;
use crate::input::{
    Key, KeyEvent, Modifiers, PointerButton, PointerEvent, TouchEvent, TouchPoint, WheelEvent,
};
use crate::links::{ConnectorManager, ConnectorRow};
use crate::node::NodeId;

/// Cloneable handle shared across UI callbacks.
pub struct CanvasController<B: HostBridge> {
    engine: Rc<RefCell<CanvasEngine<B>>>,
    connectors: Rc<RefCell<ConnectorManager>>,
    selection_model: Rc<VecModel<NodeId>>,
    /// Fingers currently down, in the order they landed.
    touches: Rc<RefCell<Vec<TouchPoint>>>,
    epoch: Instant,
}

fn modifiers(shift: bool, control: bool, meta: bool) -> Modifiers {
    Modifiers {
        shift,
        control,
        meta,
        ..Modifiers::NONE
    }
}

impl<B: HostBridge> Clone for CanvasController<B> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            connectors: self.connectors.clone(),
            selection_model: self.selection_model.clone(),
            touches: self.touches.clone(),
            epoch: self.epoch,
        }
    }
}

impl<B: HostBridge + 'static> CanvasController<B> {
    pub fn new(bridge: B) -> Self {
        Self::with_config(bridge, EngineConfig::default())
    }

    pub fn with_config(bridge: B, config: EngineConfig) -> Self {
        let engine = CanvasEngine::with_config(bridge, config);
        let connectors = ConnectorManager::new(engine.routing_params());
        let ctrl = Self {
            engine: Rc::new(RefCell::new(engine)),
            connectors: Rc::new(RefCell::new(connectors)),
            selection_model: Rc::new(VecModel::default()),
            touches: Rc::new(RefCell::new(Vec::new())),
            epoch: Instant::now(),
        };
        ctrl.refresh();
        ctrl
    }

    pub fn engine(&self) -> Ref<'_, CanvasEngine<B>> {
        self.engine.borrow()
    }

    /// Mutable engine access. Call [`refresh`](Self::refresh) afterwards.
    pub fn engine_mut(&self) -> RefMut<'_, CanvasEngine<B>> {
        self.engine.borrow_mut()
    }

    pub fn connectors(&self) -> Ref<'_, ConnectorManager> {
        self.connectors.borrow()
    }

    /// Model of selected ids, kept in sync by [`refresh`](Self::refresh).
    pub fn selection_model(&self) -> Rc<VecModel<NodeId>> {
        self.selection_model.clone()
    }

    /// Bind a connector model; rows are screen space.
    pub fn bind_connectors<P, F>(&self, model: Rc<VecModel<P>>, constructor: F)
    where
        P: Clone + 'static,
        F: Fn(ConnectorRow) -> P + 'static,
    {
        self.connectors.borrow_mut().bind_model(model, constructor);
        self.refresh();
    }

    /// Run `f` against the engine, then refresh connectors and selection.
    pub fn update<R>(&self, f: impl FnOnce(&mut CanvasEngine<B>) -> R) -> R {
        let result = f(&mut self.engine.borrow_mut());
        self.refresh();
        result
    }

    /// Recompute connector paths and resync the selection model.
    pub fn refresh(&self) {
        let engine = self.engine.borrow();
        let mut connectors = self.connectors.borrow_mut();
        connectors.set_params(engine.routing_params());
        connectors.update(engine.bridge().registry(), engine.layout_mode(), engine.viewport());
        engine.selection().sync_to_model(&self.selection_model);
    }

    // === Direct handlers ===

    pub fn pointer_down(&self, x: f32, y: f32, button: PointerButton, modifiers: Modifiers, click_count: u8) {
        let event = PointerEvent::at(x, y)
            .with_button(button)
            .with_modifiers(modifiers)
            .with_click_count(click_count);
        self.update(|e| e.pointer_down(event));
    }

    pub fn pointer_move(&self, x: f32, y: f32) {
        self.update(|e| e.pointer_move(PointerEvent::at(x, y)));
    }

    pub fn pointer_up(&self, x: f32, y: f32, modifiers: Modifiers) {
        self.update(|e| e.pointer_up(PointerEvent::at(x, y).with_modifiers(modifiers)));
    }

    pub fn pointer_cancel(&self, x: f32, y: f32) {
        self.update(|e| e.pointer_cancel(PointerEvent::at(x, y)));
    }

    // Touch handlers take single-finger updates and keep the full finger
    // list, which the gesture recognizer needs on every event.

    pub fn touch_down(&self, id: u64, x: f32, y: f32, time: Duration) {
        let touch = TouchPoint::new(id, x, y);
        let event = {
            let mut touches = self.touches.borrow_mut();
            touches.retain(|t| t.id != id);
            touches.push(touch);
            TouchEvent::new(touches.clone(), vec![touch], time)
        };
        self.update(|e| e.touch_start(&event));
    }

    pub fn touch_move(&self, id: u64, x: f32, y: f32, time: Duration) {
        let event = {
            let mut touches = self.touches.borrow_mut();
            let Some(slot) = touches.iter_mut().find(|t| t.id == id) else {
                log::debug!("touch_move: finger {} is not down", id);
                return;
            };
            slot.position = Point::new(x, y);
            let touch = *slot;
            TouchEvent::new(touches.clone(), vec![touch], time)
        };
        self.update(|e| e.touch_move(&event));
    }

    pub fn touch_up(&self, id: u64, x: f32, y: f32, time: Duration) {
        let event = {
            let mut touches = self.touches.borrow_mut();
            let Some(index) = touches.iter().position(|t| t.id == id) else {
                log::debug!("touch_up: finger {} is not down", id);
                return;
            };
            touches.remove(index);
            TouchEvent::new(touches.clone(), vec![TouchPoint::new(id, x, y)], time)
        };
        self.update(|e| e.touch_end(&event));
    }

    pub fn touch_cancel(&self) {
        self.touches.borrow_mut().clear();
        self.update(|e| e.touch_cancel());
    }

    pub fn wheel(&self, x: f32, y: f32, dx: f32, dy: f32, modifiers: Modifiers) {
        let event = WheelEvent {
            position: Point::new(x, y),
            delta: Point::new(dx, dy),
            modifiers,
        };
        self.update(|e| e.wheel(event));
    }

    /// Returns whether the key was consumed.
    pub fn key_pressed(&self, text: &str, modifiers: Modifiers) -> bool {
        match Key::from_text(text) {
            Some(key) => self.update(|e| e.key_down(&KeyEvent::new(key).with_modifiers(modifiers))),
            None => false,
        }
    }

    /// Screen-space path into `child`, or an empty string.
    pub fn connector_path(&self, child: NodeId) -> SharedString {
        let engine = self.engine.borrow();
        self.connectors
            .borrow()
            .path_to(child)
            .map(|p| p.route.curve.to_screen(engine.viewport()).to_svg().into())
            .unwrap_or_default()
    }

    /// Screen-space connection preview, or an empty string outside connection mode.
    pub fn connection_preview_path(&self) -> SharedString {
        let engine = self.engine.borrow();
        engine
            .connection_preview()
            .map(|p| p.curve.to_screen(engine.viewport()).to_svg().into())
            .unwrap_or_default()
    }

    // === Callback factories ===

    /// Returns a callback for `pointer-pressed(x, y, button, shift, ctrl, meta, click-count)`.
    pub fn pointer_down_callback(
        &self,
    ) -> impl Fn(f32, f32, slint::platform::PointerEventButton, bool, bool, bool, i32) {
        let ctrl = self.clone();
        move |x, y, button, shift, control, meta, clicks| {
            let clicks = clicks.clamp(1, u8::MAX as i32) as u8;
            ctrl.pointer_down(x, y, button.into(), modifiers(shift, control, meta), clicks);
        }
    }

    pub fn pointer_move_callback(&self) -> impl Fn(f32, f32) {
        let ctrl = self.clone();
        move |x, y| ctrl.pointer_move(x, y)
    }

    /// Returns a callback for `pointer-released(x, y, shift, ctrl, meta)`.
    pub fn pointer_up_callback(&self) -> impl Fn(f32, f32, bool, bool, bool) {
        let ctrl = self.clone();
        move |x, y, shift, control, meta| ctrl.pointer_up(x, y, modifiers(shift, control, meta))
    }

    pub fn pointer_cancel_callback(&self) -> impl Fn(f32, f32) {
        let ctrl = self.clone();
        move |x, y| ctrl.pointer_cancel(x, y)
    }

    /// Returns a callback for `touch-started(finger-id, x, y)`.
    ///
    /// Touch callbacks are timestamped when they run.
    pub fn touch_down_callback(&self) -> impl Fn(i32, f32, f32) {
        let ctrl = self.clone();
        move |id, x, y| ctrl.touch_down(id as u64, x, y, ctrl.epoch.elapsed())
    }

    pub fn touch_move_callback(&self) -> impl Fn(i32, f32, f32) {
        let ctrl = self.clone();
        move |id, x, y| ctrl.touch_move(id as u64, x, y, ctrl.epoch.elapsed())
    }

    pub fn touch_up_callback(&self) -> impl Fn(i32, f32, f32) {
        let ctrl = self.clone();
        move |id, x, y| ctrl.touch_up(id as u64, x, y, ctrl.epoch.elapsed())
    }

    pub fn touch_cancel_callback(&self) -> impl Fn() {
        let ctrl = self.clone();
        move || ctrl.touch_cancel()
    }

    /// Returns a callback for `scrolled(x, y, dx, dy, ctrl, meta)`.
    pub fn wheel_callback(&self) -> impl Fn(f32, f32, f32, f32, bool, bool) {
        let ctrl = self.clone();
        move |x, y, dx, dy, control, meta| {
            ctrl.wheel(x, y, dx, dy, modifiers(false, control, meta));
        }
    }

    /// Returns a callback for `key-pressed(text, shift, ctrl, meta) -> bool`.
    pub fn key_pressed_callback(&self) -> impl Fn(SharedString, bool, bool, bool) -> bool {
        let ctrl = self.clone();
        move |text, shift, control, meta| {
            ctrl.key_pressed(text.as_str(), modifiers(shift, control, meta))
        }
    }

    /// Returns a callback for `connector-path(child-id, version) -> string`.
    ///
    /// `version` only exists so the UI re-evaluates the binding.
    pub fn connector_path_callback(&self) -> impl Fn(i32, i32) -> SharedString {
        let ctrl = self.clone();
        move |child, _version| ctrl.connector_path(child)
    }

    pub fn connection_preview_callback(&self) -> impl Fn(i32) -> SharedString {
        let ctrl = self.clone();
        move |_version| ctrl.connection_preview_path()
    }
}
