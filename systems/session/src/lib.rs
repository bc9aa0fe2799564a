#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Frame-synchronous facade over the office world, the layout editor and the camera.
//!
//! Hosts feed device-pixel pointer input, keyboard shortcuts and external agent
//! updates through discrete entry points, call [`OfficeSession::tick`] once per
//! frame, draw the [`Scene`] returned by [`OfficeSession::frame`] and hand the
//! drawn button bounds back through [`OfficeSession::store_interaction_bounds`].
//! Messages for the host accumulate in an outbox drained by
//! [`OfficeSession::drain_outbound`].

use std::time::Duration;

use anyhow::Result as AnyResult;
use glam::Vec2;
use pixel_office_core::{
    ActivityStatus, AgentId, BubbleKind, CellCoord, Command, Event, InteractionBounds,
    LayoutError, LayoutSnapshot, LayoutView, NamedSeatRecord, NamedSeats, PixelTextConfig,
    SeatAssignments,
};
use pixel_office_rendering::{
    CameraPresentation, CharacterPresentation, EditorOverlay, FurniturePresentation,
    RenderingBackend, RenderingError, Scene, SceneMode, SeatPresentation, SeatState,
    TileGridPresentation,
};
use pixel_office_system_camera::{Camera, CameraConfig};
use pixel_office_system_editor::{EditHistory, Editor, EditorConfig};
use pixel_office_world::{apply, query, SimulationConfig, World};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub use pixel_office_system_editor::{EditTool, EditorResponse, PointerButton};

/// Tunables of every subsystem driven by the session.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Character simulation tunables.
    pub simulation: SimulationConfig,
    /// Camera tunables.
    pub camera: CameraConfig,
    /// Layout editor tunables.
    pub editor: EditorConfig,
}

/// Interaction mode selected by the host UI.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SessionMode {
    /// Watching the office; clicks select characters.
    #[default]
    Normal,
    /// Clicking a seat binds it to the selected character.
    SeatAssignment,
    /// Pointer input edits the layout.
    Edit,
}

/// Keyboard shortcut forwarded by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionKey {
    /// Rotates the selected furniture or the pending placement.
    Rotate,
    /// Deletes the selected furniture.
    Delete,
    /// Cancels the pending label edit or clears the selection.
    Escape,
    /// Restores the layout before the last edit.
    Undo,
    /// Reapplies the last undone edit.
    Redo,
}

/// Message emitted for the host to act on or persist.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutboundMessage {
    /// The user clicked a character; the host should focus its session.
    FocusAgent {
        /// Clicked agent.
        id: AgentId,
    },
    /// Seat bindings changed and should be persisted by agent id.
    SaveAgentSeats {
        /// Bindings of every non-sub-agent character.
        seats: SeatAssignments,
    },
    /// Seat bindings changed and should be persisted by agent name.
    SaveAgentNames {
        /// Bindings of every named non-sub-agent character.
        names: NamedSeats,
    },
    /// The layout changed and should be persisted.
    SaveLayout {
        /// Layout after the edit.
        layout: LayoutSnapshot,
    },
}

#[derive(Debug)]
struct Gesture {
    before: LayoutSnapshot,
    changed: bool,
}

/// Owns the world, editor, camera and edit history of one office view.
#[derive(Debug)]
pub struct OfficeSession {
    world: World,
    editor: Editor,
    camera: Camera,
    history: EditHistory,
    mode: SessionMode,
    selected_agent: Option<AgentId>,
    hovered_agent: Option<AgentId>,
    hovered_tile: Option<CellCoord>,
    interaction_bounds: InteractionBounds,
    gesture: Option<Gesture>,
    outbound: Vec<OutboundMessage>,
}

impl Default for OfficeSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl OfficeSession {
    /// Creates a session over the default layout.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        let world = World::with_config(config.simulation);
        let mut camera = Camera::new(config.camera);
        let (columns, rows) = query::dimensions(&world);
        camera.set_map_size(columns, rows);

        Self {
            world,
            history: EditHistory::new(config.editor.history_depth),
            editor: Editor::new(config.editor),
            camera,
            mode: SessionMode::Normal,
            selected_agent: None,
            hovered_agent: None,
            hovered_tile: None,
            interaction_bounds: InteractionBounds::default(),
            gesture: None,
            outbound: Vec::new(),
        }
    }

    /// Authoritative world state.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Layout editor state.
    #[must_use]
    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    /// Layout editor state, for tool and palette selection by the host.
    pub fn editor_mut(&mut self) -> &mut Editor {
        &mut self.editor
    }

    /// Camera state.
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Undo and redo stacks of layout edits.
    #[must_use]
    pub fn history(&self) -> &EditHistory {
        &self.history
    }

    /// Active interaction mode.
    #[must_use]
    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    /// Selected character.
    #[must_use]
    pub fn selected_agent(&self) -> Option<AgentId> {
        self.selected_agent
    }

    /// Character under the pointer.
    #[must_use]
    pub fn hovered_agent(&self) -> Option<AgentId> {
        self.hovered_agent
    }

    /// Takes every message emitted since the previous call.
    pub fn drain_outbound(&mut self) -> Vec<OutboundMessage> {
        std::mem::take(&mut self.outbound)
    }

    /// Switches interaction mode, abandoning any edit gesture in progress.
    pub fn set_mode(&mut self, mode: SessionMode) {
        if self.mode == mode {
            return;
        }
        if self.mode == SessionMode::Edit {
            self.editor.pointer_left();
            self.settle_gesture();
            self.editor.reset();
        }
        if mode == SessionMode::Edit {
            self.editor.reset();
            self.hovered_agent = None;
        }
        debug!(from = ?self.mode, to = ?mode, "session mode changed");
        self.mode = mode;
    }

    /// Replaces the layout, keeping the previous one when the snapshot is malformed.
    pub fn load_layout(&mut self, layout: LayoutSnapshot) -> Result<(), LayoutError> {
        let events = self.execute(vec![Command::LoadLayout { layout }]);
        if let Some(reason) = events.iter().find_map(|event| match event {
            Event::LayoutRejected { reason } => Some(reason.clone()),
            _ => None,
        }) {
            return Err(reason);
        }
        self.history.clear();
        self.editor.reset();
        self.gesture = None;
        Ok(())
    }

    /// Creates the character of a new agent session, restoring its persisted seat.
    pub fn add_agent(
        &mut self,
        id: AgentId,
        label: Option<String>,
        restored: Option<NamedSeatRecord>,
    ) {
        let _ = self.execute(vec![Command::SpawnCharacter {
            id,
            parent: None,
            label,
            palette: restored.map(|record| record.palette),
            hue_shift: restored.map(|record| record.hue_shift),
            seat: restored.and_then(|record| record.seat_id),
        }]);
    }

    /// Creates the character of a sub-agent next to its parent.
    pub fn add_sub_agent(&mut self, id: AgentId, parent: AgentId, label: Option<String>) {
        let _ = self.execute(vec![Command::SpawnCharacter {
            id,
            parent: Some(parent),
            label,
            palette: None,
            hue_shift: None,
            seat: None,
        }]);
    }

    /// Removes the character of a closed agent session and its sub-agents.
    pub fn remove_agent(&mut self, id: AgentId) {
        let _ = self.execute(vec![Command::DespawnCharacter { id }]);
    }

    /// Applies an external activity update.
    pub fn set_agent_status(&mut self, id: AgentId, status: ActivityStatus, tool: Option<String>) {
        let _ = self.execute(vec![Command::SetCharacterActivity { id, status, tool }]);
    }

    /// Raises or clears a speech bubble.
    pub fn set_agent_bubble(&mut self, id: AgentId, bubble: Option<BubbleKind>) {
        let _ = self.execute(vec![Command::SetBubble { id, bubble }]);
    }

    /// Advances the simulation and the camera follow by one frame.
    pub fn tick(&mut self, dt: Duration) -> Vec<Event> {
        let events = self.execute(vec![Command::Tick { dt }]);
        let world = &self.world;
        self.camera
            .update(|id| query::character(world, id).map(|character| character.position));
        events
    }

    /// Updates the viewport size in device pixels.
    pub fn set_viewport(&mut self, size: Vec2) {
        self.camera.set_viewport(size);
    }

    /// Pans the camera manually, breaking any follow lock.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.camera.pan_by(delta);
    }

    /// Handles a wheel or trackpad scroll; with the zoom modifier held it steps zoom.
    pub fn scroll(&mut self, delta: Vec2, zoom_modifier: bool) {
        if zoom_modifier {
            let _ = self.camera.zoom_by_scroll(delta.y);
        } else {
            self.camera.pan_by(-delta);
        }
    }

    /// Tracks the pointer at a device-pixel position.
    pub fn pointer_moved(&mut self, device: Vec2) {
        let cell = self.camera.screen_to_tile(device);
        if self.mode != SessionMode::Edit {
            let point = self.camera.screen_to_world(device);
            self.hovered_agent = query::character_at(&self.world, point);
            self.hovered_tile = self.in_bounds(cell);
            return;
        }

        let hover = if self.editor.tool().paints_tiles() {
            Some(cell)
        } else {
            self.in_bounds(cell)
        };
        let mut commands = Vec::new();
        self.editor
            .pointer_moved(&query::layout_view(&self.world), hover, &mut commands);
        self.gesture_edit(commands);
    }

    /// Starts an edit gesture or triggers the action button under the pointer.
    pub fn pointer_down(&mut self, device: Vec2, button: PointerButton) -> EditorResponse {
        if self.mode != SessionMode::Edit {
            return EditorResponse::Nothing;
        }
        if button == PointerButton::Primary {
            if let Some(action) = self.editor.action_at(&self.interaction_bounds, device) {
                debug!(?action, "action button pressed");
                return self.single_edit(|editor, layout, out| editor.trigger(action, layout, out));
            }
        }

        if self.gesture.is_none() {
            self.gesture = Some(Gesture {
                before: query::layout_snapshot(&self.world),
                changed: false,
            });
        }
        let cell = self.camera.screen_to_tile(device);
        let mut commands = Vec::new();
        let response = self.editor.pointer_down(
            &query::layout_view(&self.world),
            cell,
            button,
            &mut commands,
        );
        self.gesture_edit(commands);
        self.settle_gesture();
        response
    }

    /// Finishes the edit gesture started by `button`.
    pub fn pointer_up(&mut self, button: PointerButton) -> EditorResponse {
        if self.mode != SessionMode::Edit {
            return EditorResponse::Nothing;
        }
        let mut commands = Vec::new();
        let response =
            self.editor
                .pointer_up(&query::layout_view(&self.world), button, &mut commands);
        self.gesture_edit(commands);
        self.settle_gesture();
        response
    }

    /// Cancels hover and any gesture when the pointer leaves the canvas.
    pub fn pointer_left(&mut self) {
        self.editor.pointer_left();
        self.settle_gesture();
        self.hovered_agent = None;
        self.hovered_tile = None;
    }

    /// Handles a primary click outside edit mode.
    pub fn click(&mut self, device: Vec2) {
        if self.mode == SessionMode::Edit {
            return;
        }
        let point = self.camera.screen_to_world(device);
        if let Some(id) = query::character_at(&self.world, point) {
            let _ = self.execute(vec![Command::DismissBubble { id }]);
            if self.selected_agent == Some(id) {
                self.clear_agent_selection();
            } else {
                self.selected_agent = Some(id);
                self.camera.follow(id);
            }
            if self.mode == SessionMode::Normal {
                self.outbound.push(OutboundMessage::FocusAgent { id });
            }
            return;
        }

        if self.mode == SessionMode::SeatAssignment && self.click_seat(device) {
            return;
        }
        self.clear_agent_selection();
    }

    /// Walks the selected character to the tile under the pointer.
    pub fn context_click(&mut self, device: Vec2) {
        if self.mode == SessionMode::Edit {
            return;
        }
        let Some(id) = self.selected_agent else {
            return;
        };
        let Some(cell) = self.in_bounds(self.camera.screen_to_tile(device)) else {
            return;
        };
        let _ = self.execute(vec![Command::WalkToTile { id, cell }]);
    }

    /// Handles a keyboard shortcut.
    pub fn key(&mut self, key: SessionKey) -> EditorResponse {
        if self.mode != SessionMode::Edit {
            if key == SessionKey::Escape {
                self.clear_agent_selection();
            }
            return EditorResponse::Nothing;
        }

        match key {
            SessionKey::Rotate => self.single_edit(|editor, layout, out| {
                editor.rotate(layout, out);
                EditorResponse::Nothing
            }),
            SessionKey::Delete => {
                self.single_edit(|editor, layout, out| editor.delete_selected(layout, out))
            }
            SessionKey::Escape => {
                if self.editor.pending_text_edit().is_some() {
                    self.editor.cancel_text();
                    EditorResponse::Nothing
                } else {
                    self.editor.deselect()
                }
            }
            SessionKey::Undo => {
                let _ = self.undo();
                EditorResponse::Nothing
            }
            SessionKey::Redo => {
                let _ = self.redo();
                EditorResponse::Nothing
            }
        }
    }

    /// Applies the label configuration confirmed in the host's text editor.
    pub fn confirm_text(&mut self, text: PixelTextConfig) {
        let _ = self.single_edit(|editor, _, out| {
            editor.confirm_text(text, out);
            EditorResponse::Nothing
        });
    }

    /// Discards the pending label edit.
    pub fn cancel_text(&mut self) {
        self.editor.cancel_text();
    }

    /// Restores the layout before the last edit. Returns whether a step was undone.
    pub fn undo(&mut self) -> bool {
        self.close_gesture();
        let current = query::layout_snapshot(&self.world);
        let Some(previous) = self.history.undo(current) else {
            return false;
        };
        self.restore(previous);
        true
    }

    /// Reapplies the last undone edit. Returns whether a step was redone.
    pub fn redo(&mut self) -> bool {
        self.close_gesture();
        let current = query::layout_snapshot(&self.world);
        let Some(next) = self.history.redo(current) else {
            return false;
        };
        self.restore(next);
        true
    }

    /// Stores the action button bounds drawn by the renderer for the next frame.
    pub fn store_interaction_bounds(&mut self, bounds: InteractionBounds) {
        self.interaction_bounds = bounds;
    }

    /// Composes the render snapshot of the current state.
    pub fn frame(&self) -> Result<Scene, RenderingError> {
        let layout = query::layout_snapshot(&self.world);
        let view = query::layout_view(&self.world);
        let grid =
            TileGridPresentation::new(layout.columns, layout.rows, layout.tiles, layout.tile_colors)?;
        let characters = query::character_view(&self.world)
            .iter()
            .map(|character| {
                CharacterPresentation::from_snapshot(
                    character,
                    self.selected_agent == Some(character.id),
                    self.hovered_agent == Some(character.id),
                )
            })
            .collect();
        let (mode, editor, hovered_tile) = match self.mode {
            SessionMode::Normal => (SceneMode::Normal, None, self.hovered_tile),
            SessionMode::SeatAssignment => (SceneMode::SeatAssignment, None, self.hovered_tile),
            SessionMode::Edit => (
                SceneMode::Edit,
                Some(EditorOverlay {
                    ghost: self.editor.ghost().cloned(),
                    selection: self.editor.selection_highlight(&view),
                }),
                self.editor.hover(),
            ),
        };

        Ok(Scene {
            grid,
            furniture: FurniturePresentation::from_layout(&view),
            characters,
            seats: self.seat_indicators(),
            camera: CameraPresentation {
                zoom: self.camera.zoom(),
                pan: self.camera.pan(),
                map_offset: self.camera.map_offset(),
                viewport: self.camera.viewport(),
            },
            mode,
            editor,
            hovered_tile,
        })
    }

    /// Draws one frame through the backend and keeps its button bounds.
    pub fn present<B: RenderingBackend>(&mut self, backend: &mut B) -> AnyResult<()> {
        let scene = self.frame()?;
        let bounds = backend.render(&scene)?;
        self.store_interaction_bounds(bounds);
        Ok(())
    }

    fn execute(&mut self, commands: Vec<Command>) -> Vec<Event> {
        let mut events = Vec::new();
        for command in commands {
            apply(&mut self.world, command, &mut events);
        }
        self.observe(&events);
        events
    }

    fn observe(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::LayoutLoaded { columns, rows } => {
                    self.camera.set_map_size(*columns, *rows);
                }
                Event::LayoutRejected { reason } => {
                    warn!(%reason, "inbound layout rejected");
                }
                Event::CharacterDespawned { id } => {
                    if self.selected_agent == Some(*id) {
                        self.selected_agent = None;
                    }
                    if self.hovered_agent == Some(*id) {
                        self.hovered_agent = None;
                    }
                }
                _ => {}
            }
        }
        self.editor.handle_events(events);
        self.editor.refresh_ghost(&query::layout_view(&self.world));
    }

    fn gesture_edit(&mut self, commands: Vec<Command>) {
        if commands.is_empty() {
            return;
        }
        let events = self.execute(commands);
        if changes_layout(&events) {
            if let Some(gesture) = self.gesture.as_mut() {
                gesture.changed = true;
            }
        }
    }

    fn settle_gesture(&mut self) {
        if self.editor.is_painting() || self.editor.is_dragging() {
            return;
        }
        if let Some(gesture) = self.gesture.take() {
            if gesture.changed {
                self.commit(gesture.before);
            }
        }
    }

    /// Ends an open gesture early so its edits form their own history step.
    fn close_gesture(&mut self) {
        if self.gesture.is_some() {
            self.editor.pointer_left();
            self.settle_gesture();
        }
    }

    fn single_edit<F>(&mut self, edit: F) -> EditorResponse
    where
        F: FnOnce(&mut Editor, &LayoutView<'_>, &mut Vec<Command>) -> EditorResponse,
    {
        let before = query::layout_snapshot(&self.world);
        let mut commands = Vec::new();
        let response = edit(
            &mut self.editor,
            &query::layout_view(&self.world),
            &mut commands,
        );
        if !commands.is_empty() && changes_layout(&self.execute(commands)) {
            self.commit(before);
        }
        response
    }

    fn commit(&mut self, before: LayoutSnapshot) {
        self.history.record(before);
        let layout = query::layout_snapshot(&self.world);
        info!(
            columns = layout.columns,
            rows = layout.rows,
            furniture = layout.furniture.len(),
            "layout edited"
        );
        self.outbound.push(OutboundMessage::SaveLayout { layout });
    }

    fn restore(&mut self, layout: LayoutSnapshot) {
        let _ = self.editor.deselect();
        let _ = self.execute(vec![Command::LoadLayout { layout }]);
        self.outbound.push(OutboundMessage::SaveLayout {
            layout: query::layout_snapshot(&self.world),
        });
    }

    fn click_seat(&mut self, device: Vec2) -> bool {
        let Some(id) = self.selected_agent else {
            return false;
        };
        let Some(character) = query::character(&self.world, id) else {
            return false;
        };
        if character.is_sub_agent() {
            return false;
        }
        let cell = self.camera.screen_to_tile(device);
        let Some(seat) = query::seat_at_tile(&self.world, cell) else {
            return false;
        };

        if character.seat == Some(seat) {
            let _ = self.execute(vec![Command::SendToSeat { id }]);
            self.clear_agent_selection();
            return true;
        }
        let assigned = query::seat_view(&self.world)
            .get(seat)
            .map_or(true, |snapshot| snapshot.is_assigned());
        if assigned {
            return false;
        }

        let _ = self.execute(vec![Command::ReassignSeat { id, seat }]);
        self.clear_agent_selection();
        info!(agent = id.get(), seat = seat.get(), "seat reassigned");
        self.outbound.push(OutboundMessage::SaveAgentSeats {
            seats: query::seat_assignments(&self.world),
        });
        self.outbound.push(OutboundMessage::SaveAgentNames {
            names: query::named_seats(&self.world),
        });
        true
    }

    fn clear_agent_selection(&mut self) {
        self.selected_agent = None;
        self.camera.release_follow();
    }

    fn seat_indicators(&self) -> Vec<SeatPresentation> {
        if self.mode != SessionMode::SeatAssignment {
            return Vec::new();
        }
        let Some(character) = self
            .selected_agent
            .and_then(|id| query::character(&self.world, id))
            .filter(|character| !character.is_sub_agent())
        else {
            return Vec::new();
        };

        query::seat_view(&self.world)
            .iter()
            .map(|seat| SeatPresentation {
                id: seat.id,
                cell: seat.cell,
                state: if character.seat == Some(seat.id) {
                    SeatState::Own
                } else if seat.is_assigned() {
                    SeatState::Taken
                } else {
                    SeatState::Available
                },
                hovered: self.hovered_tile == Some(seat.cell),
            })
            .collect()
    }

    fn in_bounds(&self, cell: CellCoord) -> Option<CellCoord> {
        let (columns, rows) = query::dimensions(&self.world);
        cell.in_bounds(columns, rows).then_some(cell)
    }
}

fn changes_layout(events: &[Event]) -> bool {
    events.iter().any(|event| {
        matches!(
            event,
            Event::LayoutLoaded { .. }
                | Event::TileChanged { .. }
                | Event::TileColorChanged { .. }
                | Event::FurniturePlaced { .. }
                | Event::FurnitureRemoved { .. }
                | Event::FurnitureMoved { .. }
                | Event::FurnitureRotated { .. }
                | Event::FurnitureLayerChanged { .. }
                | Event::FurnitureTextChanged { .. }
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixel_office_core::TileType;

    #[test]
    fn only_layout_events_count_as_edits() {
        assert!(!changes_layout(&[Event::TimeAdvanced {
            dt: Duration::from_millis(16)
        }]));
        assert!(changes_layout(&[Event::TileChanged {
            cell: CellCoord::new(0, 0),
            tile: TileType::Void,
        }]));
    }

    #[test]
    fn config_tables_are_optional() {
        let config: SessionConfig =
            serde_json::from_str(r#"{"camera": {"zoom_max": 6}}"#).expect("partial config");
        assert_eq!(config.camera.zoom_max, 6);
        assert_eq!(config.camera.zoom_min, CameraConfig::default().zoom_min);
        assert_eq!(config.editor, EditorConfig::default());
    }
}
