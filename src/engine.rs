//! The manipulation state machine.
//!
//! [`CanvasEngine`] owns the viewport, the selection, the connection mode and
//! exactly one active [`Interaction`]. Pointer, wheel, touch and key events
//! come in already normalized; everything that changes node data goes out
//! through the [`HostBridge`] and is written through on every frame.
//!
//! Stale ids are expected: the registry is owned by the host and may change
//! between pointer-down and pointer-up. Every handler re-reads the registry
//! and quietly no-ops on ids that are gone.

use crate::bridge::{AddChildOptions, HostBridge};
use crate::config::EngineConfig;
use crate::connection::{ConnectionController, ConnectionPreview, ConnectionState};
use crate::geometry::{Point, Rect};
use crate::gesture::{GestureEvent, GestureRecognizer};
use crate::hit_test::{hit_target, nodes_in_selection_box, HitTarget, ResizeHandle};
use crate::input::{Key, KeyEvent, PointerButton, PointerEvent, TouchEvent, WheelEvent};
use crate::layout;
use crate::node::{NodeId, NodeType};
use crate::overlay::{floating_controls, ContextMenu, FloatingControl};
use crate::routing::{ChildHints, LayoutMode, RoutingParams};
use crate::selection::{ClickOutcome, SelectionState};
use crate::viewport::Viewport;

/// What a background drag does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    /// Background drag draws a selection rectangle.
    #[default]
    Pointer,
    /// Background drag pans.
    Hand,
}

/// Public summary of the active state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionState {
    Idle,
    DraggingNode,
    Panning,
    Resizing,
    AreaSelecting,
    Connecting,
}

#[derive(Debug, Clone, PartialEq, Default)]
enum Interaction {
    #[default]
    Idle,
    DraggingNode {
        id: NodeId,
        /// Pointer minus node position at grab time, canvas space.
        offset: Point,
        /// Nodes moved together; just `[id]` outside a multi-selection.
        group: Vec<NodeId>,
        moved: bool,
    },
    Panning {
        last: Point,
        moved: bool,
        /// A click without movement clears the selection (hand mode).
        clear_on_click: bool,
    },
    Resizing {
        id: NodeId,
        handle: ResizeHandle,
        start_rect: Rect,
        start_pointer: Point,
        changed: bool,
    },
    AreaSelecting {
        additive: bool,
    },
}

/// Padding around the content for [`CanvasEngine::zoom_to_fit`], screen px.
const FIT_PADDING: f32 = 48.0;
/// Default toolbar width used for overlay placement.
const TOOLBAR_WIDTH: f32 = 240.0;

pub struct CanvasEngine<B: HostBridge> {
    bridge: B,
    config: EngineConfig,
    viewport: Viewport,
    selection: SelectionState,
    connection: ConnectionController,
    gestures: GestureRecognizer,
    interaction: Interaction,
    mode: InteractionMode,
    editing: Option<NodeId>,
    context_menu: Option<ContextMenu>,
    canvas_size: Point,
    /// Touch id currently driving a pointer interaction.
    touch_pointer: Option<u64>,
}

impl<B: HostBridge> CanvasEngine<B> {
    pub fn new(bridge: B) -> Self {
        Self::with_config(bridge, EngineConfig::default())
    }

    pub fn with_config(bridge: B, config: EngineConfig) -> Self {
        Self {
            bridge,
            viewport: Viewport::new(config.min_zoom, config.max_zoom),
            gestures: GestureRecognizer::new(&config),
            config,
            selection: SelectionState::new(),
            connection: ConnectionController::new(),
            interaction: Interaction::Idle,
            mode: InteractionMode::default(),
            editing: None,
            context_menu: None,
            canvas_size: Point::new(800.0, 600.0),
            touch_pointer: None,
        }
    }

    // === Accessors ===

    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    pub fn bridge_mut(&mut self) -> &mut B {
        &mut self.bridge
    }

    pub fn into_bridge(self) -> B {
        self.bridge
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn connection(&self) -> &ConnectionState {
        self.connection.state()
    }

    pub fn connection_preview(&self) -> Option<ConnectionPreview> {
        self.connection
            .preview(self.bridge.registry(), self.config.bezier_min_offset)
    }

    pub fn editing(&self) -> Option<NodeId> {
        self.editing
    }

    pub fn context_menu(&self) -> Option<&ContextMenu> {
        self.context_menu.as_ref()
    }

    pub fn interaction_mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn layout_mode(&self) -> LayoutMode {
        self.config.layout_mode
    }

    pub fn canvas_size(&self) -> Point {
        self.canvas_size
    }

    pub fn routing_params(&self) -> RoutingParams {
        RoutingParams {
            hysteresis: self.config.anchor_hysteresis,
            bezier_min_offset: self.config.bezier_min_offset,
        }
    }

    pub fn state(&self) -> InteractionState {
        match self.interaction {
            Interaction::DraggingNode { .. } => InteractionState::DraggingNode,
            Interaction::Panning { .. } => InteractionState::Panning,
            Interaction::Resizing { .. } => InteractionState::Resizing,
            Interaction::AreaSelecting { .. } => InteractionState::AreaSelecting,
            Interaction::Idle if self.connection.is_active() => InteractionState::Connecting,
            Interaction::Idle => InteractionState::Idle,
        }
    }

    /// Screen-space rubber band, while one is being drawn.
    pub fn area_rect(&self) -> Option<Rect> {
        self.selection.area().map(|a| a.rect())
    }

    /// Floating controls projected through the current viewport.
    pub fn overlay(&self) -> Vec<FloatingControl> {
        floating_controls(
            &self.viewport,
            self.bridge.registry(),
            &self.selection,
            self.config.layout_mode,
            self.context_menu.as_ref(),
            self.canvas_size,
            TOOLBAR_WIDTH,
        )
    }

    // === Settings ===

    pub fn set_interaction_mode(&mut self, mode: InteractionMode) {
        self.mode = mode;
    }

    pub fn set_layout_mode(&mut self, mode: LayoutMode) {
        self.config.layout_mode = mode;
    }

    pub fn set_canvas_size(&mut self, width: f32, height: f32) {
        self.canvas_size = Point::new(width.max(0.0), height.max(0.0));
    }

    pub fn set_zoom_limits(&mut self, min_zoom: f32, max_zoom: f32) {
        self.viewport.set_zoom_limits(min_zoom, max_zoom);
        self.config.min_zoom = self.viewport.min_zoom();
        self.config.max_zoom = self.viewport.max_zoom();
        self.push_viewport();
    }

    /// Enable or disable single-finger touch panning.
    pub fn set_touch_pan_enabled(&mut self, enabled: bool) {
        self.gestures.set_enabled(enabled);
    }

    // === Viewport ===

    fn push_viewport(&mut self) {
        self.bridge.set_pan(self.viewport.pan());
        self.bridge.set_zoom(self.viewport.zoom());
    }

    pub fn set_pan(&mut self, pan: Point) {
        self.viewport.set_pan(pan);
        self.bridge.set_pan(pan);
    }

    /// Zoom keeping the screen point `anchor` fixed.
    pub fn zoom_about(&mut self, anchor: Point, zoom: f32) {
        if self.viewport.zoom_about(anchor, zoom) {
            self.push_viewport();
        }
    }

    pub fn zoom_in(&mut self) {
        if self.viewport.zoom_in(self.canvas_size, self.config.zoom_step) {
            self.push_viewport();
        }
    }

    pub fn zoom_out(&mut self) {
        if self.viewport.zoom_out(self.canvas_size, self.config.zoom_step) {
            self.push_viewport();
        }
    }

    pub fn reset_zoom(&mut self) {
        self.viewport.reset();
        self.push_viewport();
    }

    pub fn zoom_to_fit(&mut self) {
        if let Some(bounds) = self.bridge.registry().bounds() {
            self.viewport
                .zoom_to_fit(&bounds, self.canvas_size, FIT_PADDING);
            self.push_viewport();
        }
    }

    // === Hit testing ===

    /// Resolve a screen point against the selected node's handles and all nodes.
    pub fn hit_test(&self, screen: Point) -> HitTarget {
        let registry = self.bridge.registry();
        let selected_id = self.selection.selected_id().filter(|id| registry.contains(*id));
        let selected_rect = selected_id.and_then(|id| registry.get(id)).map(|n| n.rect());
        hit_target(
            &self.viewport,
            screen,
            registry.iter(),
            selected_rect.as_ref(),
            selected_id,
            self.config.handle_size_screen,
        )
    }

    // === Selection ===

    /// Forget selected ids the host has deleted.
    fn prune_selection(&mut self) {
        let registry = self.bridge.registry();
        self.selection.retain(|id| registry.contains(id));
        if self.editing.is_some_and(|id| !registry.contains(id)) {
            self.editing = None;
        }
    }

    pub fn select_node(&mut self, id: NodeId) {
        if !self.bridge.registry().contains(id) {
            log::debug!("select_node: {} not found", id);
            return;
        }
        self.selection.select(id);
        self.bridge.on_select_node(id);
    }

    pub fn clear_selection(&mut self) {
        if self.selection.is_empty() {
            return;
        }
        self.selection.clear();
        self.bridge.on_clear_selection();
    }

    fn click_node(&mut self, id: NodeId, multi_modifier: bool) -> ClickOutcome {
        let outcome = self.selection.handle_click(id, multi_modifier);
        match outcome {
            ClickOutcome::Selected(id) => self.bridge.on_select_node(id),
            ClickOutcome::Added(id) => self.bridge.on_add_to_selection(id),
            ClickOutcome::Removed(id) => {
                self.bridge.on_remove_from_selection(id);
                if self.selection.is_empty() {
                    self.bridge.on_clear_selection();
                }
            }
            ClickOutcome::Unchanged => {}
        }
        outcome
    }

    // === Pointer ===

    pub fn pointer_down(&mut self, event: PointerEvent) {
        let target = self.hit_test(event.position);
        self.pointer_down_on(event, target);
    }

    /// Pointer down with an already resolved target.
    pub fn pointer_down_on(&mut self, event: PointerEvent, target: HitTarget) {
        self.prune_selection();
        self.reset_interaction();

        let node_hit = match target {
            HitTarget::ResizeHandle(id, _) | HitTarget::ConnectHandle(id) | HitTarget::Node(id) => {
                Some(id).filter(|id| self.bridge.registry().contains(*id))
            }
            HitTarget::Background => None,
        };

        if event.button != PointerButton::Secondary {
            self.context_menu = None;
        }

        match event.button {
            PointerButton::Secondary => {
                if let Some(id) = node_hit {
                    if !self.selection.contains(id) {
                        self.click_node(id, false);
                    }
                }
                self.open_context_menu(event.position, node_hit);
                return;
            }
            PointerButton::Middle => {
                self.begin_pan(event.position, false);
                return;
            }
            PointerButton::Primary => {}
        }

        // Connection mode takes the click before any drag can start
        if self.connection.is_active() {
            let canvas = self.viewport.to_canvas(event.position);
            self.connection.update_pointer(
                canvas,
                self.bridge.registry(),
                self.config.snap_distance,
                self.config.snap_padding,
            );
            match self.connection.click_target(node_hit) {
                Some(target) => self.complete_connection(target),
                None => self.cancel_connection(),
            }
            return;
        }

        match target {
            HitTarget::ResizeHandle(id, handle) if node_hit.is_some() => {
                if self.editing != Some(id) {
                    self.begin_resize(id, handle, event.position);
                }
            }
            HitTarget::ConnectHandle(id) if node_hit.is_some() => self.begin_connection(id),
            HitTarget::Node(id) if node_hit.is_some() => {
                if event.is_double_click() {
                    self.begin_text_edit(id);
                    return;
                }
                if self.editing == Some(id) {
                    return;
                }
                self.editing = None;
                let outcome = self.click_node(id, event.modifiers.multi_select());
                if !matches!(outcome, ClickOutcome::Removed(_)) {
                    self.begin_drag(id, event.position);
                }
            }
            _ => {
                self.editing = None;
                match self.mode {
                    InteractionMode::Hand => self.begin_pan(event.position, true),
                    InteractionMode::Pointer => {
                        self.selection.begin_area(event.position);
                        self.interaction = Interaction::AreaSelecting {
                            additive: event.modifiers.shift,
                        };
                        log::debug!("idle -> area-selecting");
                    }
                }
            }
        }
    }

    fn reset_interaction(&mut self) {
        if self.interaction != Interaction::Idle {
            log::debug!("discarding stale interaction {:?}", self.state());
        }
        self.interaction = Interaction::Idle;
        self.selection.take_area();
        self.gestures.set_node_drag_active(false);
    }

    fn begin_pan(&mut self, position: Point, clear_on_click: bool) {
        self.interaction = Interaction::Panning {
            last: position,
            moved: false,
            clear_on_click,
        };
        log::debug!("idle -> panning");
    }

    fn begin_drag(&mut self, id: NodeId, screen: Point) {
        let Some(node) = self.bridge.registry().get(id) else {
            return;
        };
        let offset = self.viewport.to_canvas(screen) - node.position();
        let group = if self.selection.is_multi() && self.selection.contains(id) {
            self.selection.ids()
        } else {
            vec![id]
        };
        log::debug!("idle -> dragging-node {} (group of {})", id, group.len());
        self.interaction = Interaction::DraggingNode {
            id,
            offset,
            group,
            moved: false,
        };
        self.gestures.set_node_drag_active(true);
    }

    fn begin_resize(&mut self, id: NodeId, handle: ResizeHandle, screen: Point) {
        let Some(node) = self.bridge.registry().get(id) else {
            return;
        };
        log::debug!("idle -> resizing {} ({:?})", id, handle);
        self.interaction = Interaction::Resizing {
            id,
            handle,
            start_rect: node.rect(),
            start_pointer: self.viewport.to_canvas(screen),
            changed: false,
        };
    }

    pub fn pointer_move(&mut self, event: PointerEvent) {
        let canvas = self.viewport.to_canvas(event.position);
        if self.connection.is_active() {
            self.connection.update_pointer(
                canvas,
                self.bridge.registry(),
                self.config.snap_distance,
                self.config.snap_padding,
            );
        }

        let mut interaction = std::mem::take(&mut self.interaction);
        let keep = match &mut interaction {
            Interaction::Idle => true,
            Interaction::DraggingNode {
                id,
                offset,
                group,
                moved,
            } => self.drag_frame(*id, canvas - *offset, group, moved),
            Interaction::Panning { last, moved, .. } => {
                let delta = event.position - *last;
                *last = event.position;
                if delta != Point::ZERO {
                    *moved = true;
                    self.viewport.pan_by(delta);
                    self.bridge.set_pan(self.viewport.pan());
                }
                true
            }
            Interaction::Resizing {
                id,
                handle,
                start_rect,
                start_pointer,
                changed,
            } => {
                if self.bridge.registry().contains(*id) {
                    let rect = handle.apply(start_rect, canvas - *start_pointer);
                    self.write_size(*id, &rect, *start_rect, false);
                    *changed = true;
                    true
                } else {
                    log::debug!("resize target {} vanished", id);
                    false
                }
            }
            Interaction::AreaSelecting { .. } => {
                self.selection.update_area(event.position);
                true
            }
        };
        if keep {
            self.interaction = interaction;
        } else {
            self.gestures.set_node_drag_active(false);
        }
    }

    /// One drag frame. Returns false if the dragged node is gone.
    fn drag_frame(&mut self, id: NodeId, target: Point, group: &[NodeId], moved: &mut bool) -> bool {
        let Some(current) = self.bridge.registry().get(id).map(|n| n.position()) else {
            log::debug!("drag target {} vanished", id);
            return false;
        };
        let delta = target - current;
        if delta == Point::ZERO {
            return true;
        }
        if group.len() > 1 {
            self.bridge.move_selected_nodes(group, delta.x, delta.y);
        } else {
            self.bridge.update_node_position(id, target.x, target.y);
        }
        *moved = true;
        true
    }

    fn write_size(&mut self, id: NodeId, rect: &Rect, start: Rect, committed: bool) {
        let position = (rect.origin() != start.origin()).then(|| rect.origin());
        self.bridge
            .update_node_size(id, rect.width, rect.height, committed, position);
    }

    pub fn pointer_up(&mut self, event: PointerEvent) {
        let interaction = std::mem::take(&mut self.interaction);
        self.gestures.set_node_drag_active(false);
        match interaction {
            Interaction::Idle => {}
            Interaction::DraggingNode { id, moved, .. } => {
                log::debug!("dragging-node {} -> idle (moved: {})", id, moved);
                if moved {
                    self.bridge.save_node_position_to_history();
                }
            }
            Interaction::Panning {
                moved,
                clear_on_click,
                ..
            } => {
                log::debug!("panning -> idle");
                if !moved && clear_on_click {
                    self.clear_selection();
                }
            }
            Interaction::Resizing {
                id,
                start_rect,
                changed,
                ..
            } => {
                log::debug!("resizing {} -> idle", id);
                let current = self.bridge.registry().get(id).map(|n| n.rect());
                if let (true, Some(rect)) = (changed, current) {
                    self.write_size(id, &rect, start_rect, true);
                    self.bridge.save_node_position_to_history();
                }
            }
            Interaction::AreaSelecting { additive } => {
                self.selection.update_area(event.position);
                // Shift may be pressed mid-drag; either end makes it additive
                self.finish_area_selection(additive || event.modifiers.shift);
            }
        }
    }

    /// Treat a cancelled pointer like a release: the last written value stands.
    pub fn pointer_cancel(&mut self, event: PointerEvent) {
        self.pointer_up(event);
    }

    fn finish_area_selection(&mut self, additive: bool) {
        let Some(rect) = self.selection.take_area() else {
            return;
        };
        let threshold = self.config.area_select_threshold;
        if rect.width <= threshold && rect.height <= threshold {
            log::debug!("area-selecting -> idle (click-through)");
            return;
        }
        let canvas = self.viewport.rect_to_canvas(&rect);
        let ids = nodes_in_selection_box(&canvas, self.bridge.registry().iter());
        log::debug!("area-selecting -> idle ({} nodes)", ids.len());
        if additive {
            self.selection.extend_selection(ids);
        } else {
            self.selection.replace_selection(ids);
        }
        self.bridge
            .on_select_nodes_in_area(canvas.top_left(), canvas.bottom_right(), additive);
    }

    // === Wheel ===

    pub fn wheel(&mut self, event: WheelEvent) {
        if event.modifiers.command() {
            let factor = (-event.delta.y * self.config.wheel_zoom_speed).exp();
            self.zoom_about(event.position, self.viewport.zoom() * factor);
        } else {
            self.viewport.pan_by(-event.delta);
            self.bridge.set_pan(self.viewport.pan());
        }
    }

    // === Touch ===

    pub fn touch_start(&mut self, event: &TouchEvent) {
        match (self.touch_pointer, event.touches.as_slice()) {
            (None, [touch]) => {
                let pointer = PointerEvent::from_touch(touch);
                let target = self.hit_test(pointer.position);
                // A finger on a node (or any finger in connect mode) is a pointer
                if target != HitTarget::Background || self.connection.is_active() {
                    self.touch_pointer = Some(touch.id);
                    self.pointer_down_on(pointer, target);
                }
            }
            (Some(id), touches) if touches.len() > 1 => {
                // A second finger turns the drag into a pinch
                if let Some(touch) = touches.iter().find(|t| t.id == id) {
                    self.pointer_up(PointerEvent::from_touch(touch));
                }
                self.touch_pointer = None;
            }
            _ => {}
        }
        self.gestures.touch_start(event, &self.viewport);
    }

    pub fn touch_move(&mut self, event: &TouchEvent) {
        if let Some(id) = self.touch_pointer {
            if let Some(touch) = event.touches.iter().find(|t| t.id == id) {
                self.pointer_move(PointerEvent::from_touch(touch));
            }
            let _ = self.gestures.touch_move(event, &self.viewport);
            return;
        }
        match self.gestures.touch_move(event, &self.viewport) {
            Some(GestureEvent::Pan { delta }) => {
                self.viewport.pan_by(delta);
                self.bridge.set_pan(self.viewport.pan());
            }
            Some(GestureEvent::Zoom { zoom, pan }) => {
                self.viewport.set_zoom(zoom);
                self.viewport.set_pan(pan);
                self.push_viewport();
            }
            Some(GestureEvent::Tap { .. }) | None => {}
        }
    }

    pub fn touch_end(&mut self, event: &TouchEvent) {
        let gesture = self.gestures.touch_end(event, &self.viewport);
        if let Some(id) = self.touch_pointer {
            if let Some(touch) = event.changed_touches.iter().find(|t| t.id == id) {
                self.touch_pointer = None;
                self.pointer_up(PointerEvent::from_touch(touch));
            }
            // Selection already happened on touch down
            return;
        }
        if let Some(GestureEvent::Tap { position }) = gesture {
            self.tap(position);
        }
    }

    pub fn touch_cancel(&mut self) {
        self.gestures.touch_cancel();
        if self.touch_pointer.take().is_some() {
            self.pointer_cancel(PointerEvent::at(0.0, 0.0));
        }
    }

    /// Single tap from the gesture recognizer.
    fn tap(&mut self, position: Point) {
        self.context_menu = None;
        match self.hit_test(position) {
            HitTarget::Background => {
                if self.connection.is_active() {
                    self.cancel_connection();
                } else {
                    self.clear_selection();
                }
            }
            HitTarget::Node(id) | HitTarget::ResizeHandle(id, _) | HitTarget::ConnectHandle(id) => {
                self.click_node(id, false);
            }
        }
    }

    // === Keyboard ===

    /// Returns true if the key was consumed.
    pub fn key_down(&mut self, event: &KeyEvent) -> bool {
        if self.editing.is_some() {
            if event.key == Key::Escape {
                self.cancel_text_edit();
                return true;
            }
            return false;
        }
        let command = event.modifiers.command();
        match &event.key {
            Key::Escape => {
                if self.connection.is_active() {
                    self.cancel_connection();
                } else if self.context_menu.is_some() {
                    self.context_menu = None;
                } else {
                    self.clear_selection();
                }
                true
            }
            Key::Delete | Key::Backspace => {
                self.delete_selected();
                true
            }
            Key::Tab => match self.selection.selected_id() {
                Some(id) => self.add_child(id).is_some(),
                None => false,
            },
            Key::Enter => match self.selection.selected_id() {
                Some(id) => self.add_sibling(id).is_some(),
                None => false,
            },
            Key::Character(c) if command => match c.to_ascii_lowercase() {
                'd' => {
                    self.duplicate_selected();
                    true
                }
                'z' if event.modifiers.shift => {
                    self.bridge.redo();
                    self.after_history();
                    true
                }
                'z' => {
                    self.bridge.undo();
                    self.after_history();
                    true
                }
                'y' => {
                    self.bridge.redo();
                    self.after_history();
                    true
                }
                _ => false,
            },
            Key::Character(_) => false,
        }
    }

    fn after_history(&mut self) {
        self.prune_selection();
        if self
            .connection
            .source()
            .is_some_and(|id| !self.bridge.registry().contains(id))
        {
            self.connection.cancel();
        }
    }

    // === Connection mode ===

    pub fn begin_connection(&mut self, source: NodeId) {
        self.reset_interaction();
        self.context_menu = None;
        if let Err(e) = self.connection.begin(source, self.bridge.registry()) {
            log::debug!("begin_connection ignored: {}", e);
        }
    }

    pub fn cancel_connection(&mut self) {
        self.connection.cancel();
    }

    /// Connect `target` under the connection source. Invalid targets are
    /// ignored and the mode stays active either way.
    fn complete_connection(&mut self, target: NodeId) {
        match self.connection.validate(target, self.bridge.registry()) {
            Ok(source) => {
                if self.bridge.connect_nodes(target, source) {
                    log::debug!("connected {} under {}", target, source);
                } else {
                    log::debug!("host refused connecting {} under {}", target, source);
                }
            }
            Err(e) => log::debug!("connection rejected: {}", e),
        }
    }

    // === Text editing ===

    pub fn begin_text_edit(&mut self, id: NodeId) {
        if !self.bridge.registry().contains(id) {
            return;
        }
        self.reset_interaction();
        if !self.selection.contains(id) {
            self.click_node(id, false);
        }
        self.editing = Some(id);
    }

    pub fn commit_text(&mut self, text: &str) {
        if let Some(id) = self.editing.take() {
            if self.bridge.registry().contains(id) {
                self.bridge.update_node_text(id, text);
            }
        }
    }

    pub fn cancel_text_edit(&mut self) {
        self.editing = None;
    }

    // === Structure ===

    fn add_options(&self, hints: ChildHints) -> AddChildOptions {
        AddChildOptions {
            hints,
            auto_align: self.config.auto_align,
            ..Default::default()
        }
    }

    /// Add a child at the layout's default position and select it.
    pub fn add_child(&mut self, parent: NodeId) -> Option<NodeId> {
        self.add_child_with(parent, ChildHints::default())
    }

    pub fn add_child_with(&mut self, parent: NodeId, hints: ChildHints) -> Option<NodeId> {
        let position =
            layout::child_position(self.bridge.registry(), parent, self.config.layout_mode, hints)?;
        let id = self
            .bridge
            .add_child_node(parent, position, self.add_options(hints))?;
        self.select_node(id);
        Some(id)
    }

    /// Add a node next to `id`. A root gets a child instead.
    pub fn add_sibling(&mut self, id: NodeId) -> Option<NodeId> {
        let node = self.bridge.registry().get(id)?;
        let hints = ChildHints::from(node);
        let parent = node.parent_id;
        match parent {
            Some(parent) => self.add_child_with(parent, hints),
            None => self.add_child(id),
        }
    }

    pub fn duplicate_selected(&mut self) -> Vec<NodeId> {
        self.prune_selection();
        let ids = self.selection.ids();
        let copies: Vec<NodeId> = ids
            .into_iter()
            .filter_map(|id| self.bridge.duplicate_node(id, self.config.auto_align))
            .collect();
        if !copies.is_empty() {
            self.selection.replace_selection(copies.iter().copied());
            if let [single] = copies.as_slice() {
                self.bridge.on_select_node(*single);
            } else {
                for &id in &copies {
                    self.bridge.on_add_to_selection(id);
                }
            }
        }
        copies
    }

    pub fn delete_selected(&mut self) {
        self.prune_selection();
        let ids = self.selection.ids();
        if ids.is_empty() {
            return;
        }
        self.reset_interaction();
        for id in ids {
            // An earlier cascade may already have taken it
            if self.bridge.registry().contains(id) {
                self.bridge.delete_node(id, self.config.auto_align);
            }
        }
        self.prune_selection();
        if self.selection.is_empty() {
            self.bridge.on_clear_selection();
        }
        self.after_history();
    }

    pub fn convert_node(&mut self, id: NodeId, node_type: NodeType) {
        if self.bridge.registry().contains(id) {
            self.bridge.update_node_type(id, node_type);
        }
    }

    pub fn disconnect(&mut self, id: NodeId) {
        match self.bridge.registry().get(id) {
            Some(node) if node.parent_id.is_some() => self.bridge.disconnect_node(id),
            _ => log::debug!("disconnect: {} has no parent", id),
        }
    }

    // === Context menu ===

    pub fn open_context_menu(&mut self, position: Point, node: Option<NodeId>) {
        self.context_menu = Some(ContextMenu { node, position });
    }

    pub fn close_context_menu(&mut self) {
        self.context_menu = None;
    }
}
