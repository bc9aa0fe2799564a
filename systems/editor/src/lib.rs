#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pointer-driven layout editor that translates tool input into world commands.
//!
//! The editor never mutates the layout itself. Every call receives a read-only
//! [`LayoutView`] of the current world and pushes [`Command`] values that the
//! caller applies; ghost validity is recomputed from that view on each call.

mod history;

pub use history::EditHistory;

use glam::Vec2;
use pixel_office_core::{
    ActionButton, CellCoord, CellRect, CellRectSize, Command, Event, FloorColor, FloorPattern,
    FurnitureKind, FurnitureRecord, FurnitureUid, GhostKind, GhostPreview, InteractionBounds,
    LayoutView, PixelTextConfig, Rotation, SelectionHighlight, TileType,
};
use pixel_office_system_placement::{can_place, wall_placement_row, PlacementRequest};
use serde::Deserialize;
use tracing::debug;

const DEFAULT_LABEL_TEXT: &str = "TEXT";

/// Tool currently driving pointer input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EditTool {
    /// Selects and drags existing furniture.
    #[default]
    Select,
    /// Paints floor tiles with the chosen pattern and colour.
    TilePaint,
    /// Adds or removes walls, decided by the first tile of a gesture.
    WallPaint,
    /// Turns tiles into void.
    Erase,
    /// Places the chosen furniture kind.
    FurniturePlace,
    /// Copies the kind of clicked furniture into the placement selection.
    FurniturePick,
}

impl EditTool {
    /// Reports whether the tool paints tiles.
    #[must_use]
    pub const fn paints_tiles(self) -> bool {
        matches!(self, Self::TilePaint | Self::WallPaint | Self::Erase)
    }
}

/// Pointer button that started a gesture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerButton {
    /// Left or primary button.
    Primary,
    /// Right or secondary button.
    Secondary,
}

/// Tunables of the layout editor.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    /// Number of undo steps kept.
    pub history_depth: usize,
    /// Extra radius granted to action buttons when hit-testing, in device pixels.
    pub button_padding: f32,
    /// Stacking layers cycled by the layer button.
    pub layer_cycle: Vec<i32>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_depth: 50,
            button_padding: 2.0,
            layer_cycle: vec![0, 1, 2],
        }
    }
}

/// Furniture chosen for placement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacementChoice {
    /// Kind to place.
    pub kind: FurnitureKind,
    /// Orientation to place with.
    pub rotation: Rotation,
    /// Label configuration for pixel-text furniture.
    pub text: Option<PixelTextConfig>,
}

impl PlacementChoice {
    fn new(kind: FurnitureKind) -> Self {
        Self {
            kind,
            rotation: Rotation::Down,
            text: kind
                .is_label()
                .then(|| PixelTextConfig::new(DEFAULT_LABEL_TEXT)),
        }
    }
}

/// Outcome of an editor call that the host UI may need to react to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum EditorResponse {
    /// Nothing the host needs to know about.
    #[default]
    Nothing,
    /// The furniture selection changed.
    SelectionChanged(Option<FurnitureUid>),
    /// A kind was picked from existing furniture.
    Picked(FurnitureKind),
    /// The host should open its label editor for the item.
    OpenTextEditor {
        /// Label being edited.
        uid: FurnitureUid,
        /// Current configuration of the label.
        text: PixelTextConfig,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum DragState {
    #[default]
    NotDragging,
    Painting {
        erase: bool,
        last: Option<CellCoord>,
        wall_adding: Option<bool>,
    },
    Candidate {
        uid: FurnitureUid,
        start: CellCoord,
        offset: (i32, i32),
    },
    Moving {
        uid: FurnitureUid,
        offset: (i32, i32),
    },
}

/// Editing state machine: tool, hover, ghost, selection and drag.
#[derive(Clone, Debug)]
pub struct Editor {
    config: EditorConfig,
    tool: EditTool,
    floor_pattern: FloorPattern,
    floor_color: Option<FloorColor>,
    placement: Option<PlacementChoice>,
    selection: Option<FurnitureUid>,
    hover: Option<CellCoord>,
    ghost: Option<GhostPreview>,
    drag: DragState,
    text_edit: Option<FurnitureUid>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    /// Creates an editor with the select tool active.
    #[must_use]
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config,
            tool: EditTool::Select,
            floor_pattern: FloorPattern::DEFAULT,
            floor_color: None,
            placement: None,
            selection: None,
            hover: None,
            ghost: None,
            drag: DragState::NotDragging,
            text_edit: None,
        }
    }

    /// Tunables the editor runs with.
    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Active tool.
    #[must_use]
    pub fn tool(&self) -> EditTool {
        self.tool
    }

    /// Activates a tool, cancelling any gesture in progress.
    pub fn select_tool(&mut self, tool: EditTool) {
        self.tool = tool;
        self.drag = DragState::NotDragging;
        self.ghost = None;
    }

    /// Floor pattern used by the tile paint tool.
    pub fn set_floor_pattern(&mut self, pattern: FloorPattern) {
        self.floor_pattern = pattern;
    }

    /// Floor colour used by the tile paint tool.
    pub fn set_floor_color(&mut self, color: Option<FloorColor>) {
        self.floor_color = color;
    }

    /// Chooses the furniture kind to place, or clears the choice.
    pub fn choose_furniture(&mut self, kind: Option<FurnitureKind>) {
        self.placement = kind.map(PlacementChoice::new);
    }

    /// Replaces the label configuration used when placing pixel text.
    pub fn set_placement_text(&mut self, text: PixelTextConfig) {
        if let Some(choice) = self.placement.as_mut().filter(|choice| choice.kind.is_label()) {
            choice.text = Some(text);
        }
    }

    /// Furniture chosen for placement.
    #[must_use]
    pub fn placement(&self) -> Option<&PlacementChoice> {
        self.placement.as_ref()
    }

    /// Currently selected furniture item.
    #[must_use]
    pub fn selection(&self) -> Option<FurnitureUid> {
        self.selection
    }

    /// Tile under the pointer.
    #[must_use]
    pub fn hover(&self) -> Option<CellCoord> {
        self.hover
    }

    /// Preview of the pending edit.
    #[must_use]
    pub fn ghost(&self) -> Option<&GhostPreview> {
        self.ghost.as_ref()
    }

    /// Label awaiting a confirmed configuration from the host.
    #[must_use]
    pub fn pending_text_edit(&self) -> Option<FurnitureUid> {
        self.text_edit
    }

    /// Reports whether a furniture drag gesture is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(
            self.drag,
            DragState::Candidate { .. } | DragState::Moving { .. }
        )
    }

    /// Reports whether a dragged item has left its starting tile.
    #[must_use]
    pub fn is_drag_moving(&self) -> bool {
        matches!(self.drag, DragState::Moving { .. })
    }

    /// Reports whether a paint gesture is in progress.
    #[must_use]
    pub fn is_painting(&self) -> bool {
        matches!(self.drag, DragState::Painting { .. })
    }

    fn acts_as_select(&self) -> bool {
        self.tool == EditTool::Select
            || (self.tool == EditTool::FurniturePlace && self.placement.is_none())
    }

    /// Tracks the pointer, painting new tiles and promoting drag candidates.
    pub fn pointer_moved(
        &mut self,
        layout: &LayoutView<'_>,
        cell: Option<CellCoord>,
        out: &mut Vec<Command>,
    ) {
        self.hover = cell;
        if let Some(cell) = cell {
            match self.drag {
                DragState::Candidate { uid, start, offset } if cell != start => {
                    self.drag = DragState::Moving { uid, offset };
                }
                DragState::Painting { .. } => self.paint(layout, cell, out),
                _ => {}
            }
        }
        self.refresh_ghost(layout);
    }

    /// Starts a gesture at the tile under the pointer.
    pub fn pointer_down(
        &mut self,
        layout: &LayoutView<'_>,
        cell: CellCoord,
        button: PointerButton,
        out: &mut Vec<Command>,
    ) -> EditorResponse {
        self.hover = Some(cell);
        if self.drag != DragState::NotDragging {
            return EditorResponse::Nothing;
        }

        if button == PointerButton::Secondary {
            if self.tool.paints_tiles() && layout.contains(cell) {
                self.drag = DragState::Painting {
                    erase: true,
                    last: None,
                    wall_adding: None,
                };
                self.paint(layout, cell, out);
            }
            return EditorResponse::Nothing;
        }

        let response = if self.acts_as_select() {
            self.press_select(layout, cell)
        } else {
            match self.tool {
                EditTool::FurniturePick => self.pick(layout, cell),
                EditTool::FurniturePlace => {
                    self.place(layout, cell, out);
                    EditorResponse::Nothing
                }
                EditTool::TilePaint | EditTool::WallPaint | EditTool::Erase => {
                    self.drag = DragState::Painting {
                        erase: false,
                        last: None,
                        wall_adding: None,
                    };
                    self.paint(layout, cell, out);
                    EditorResponse::Nothing
                }
                EditTool::Select => EditorResponse::Nothing,
            }
        };
        self.refresh_ghost(layout);
        response
    }

    /// Finishes the gesture started by `button`.
    pub fn pointer_up(
        &mut self,
        layout: &LayoutView<'_>,
        button: PointerButton,
        out: &mut Vec<Command>,
    ) -> EditorResponse {
        let response = match (self.drag, button) {
            (DragState::Painting { erase: true, .. }, PointerButton::Secondary)
            | (DragState::Painting { erase: false, .. }, PointerButton::Primary) => {
                self.drag = DragState::NotDragging;
                EditorResponse::Nothing
            }
            (DragState::Candidate { uid, .. }, PointerButton::Primary) => {
                self.drag = DragState::NotDragging;
                self.selection = if self.selection == Some(uid) {
                    None
                } else {
                    Some(uid)
                };
                EditorResponse::SelectionChanged(self.selection)
            }
            (DragState::Moving { uid, offset }, PointerButton::Primary) => {
                self.drag = DragState::NotDragging;
                if let Some(origin) = self.hover.map(|cell| cell.offset(-offset.0, -offset.1)) {
                    let valid = layout
                        .furniture_by_uid(uid)
                        .map_or(false, |record| can_place(layout, &move_request(record, origin)));
                    if valid {
                        out.push(Command::MoveFurniture { uid, origin });
                    } else {
                        debug!(uid = uid.get(), "drag released on invalid tile");
                    }
                }
                self.selection = None;
                EditorResponse::SelectionChanged(None)
            }
            _ => EditorResponse::Nothing,
        };
        self.refresh_ghost(layout);
        response
    }

    /// Cancels every gesture when the pointer leaves the canvas.
    pub fn pointer_left(&mut self) {
        self.drag = DragState::NotDragging;
        self.hover = None;
        self.ghost = None;
    }

    /// Action button under the device-pixel point, if an item is selected.
    #[must_use]
    pub fn action_at(&self, bounds: &InteractionBounds, point: Vec2) -> Option<ActionButton> {
        if self.selection.is_none() {
            return None;
        }
        bounds.hit(point, self.config.button_padding)
    }

    /// Runs an auxiliary action on the selection.
    pub fn trigger(
        &mut self,
        action: ActionButton,
        layout: &LayoutView<'_>,
        out: &mut Vec<Command>,
    ) -> EditorResponse {
        match action {
            ActionButton::Layer => {
                self.cycle_layer(layout, out);
                EditorResponse::Nothing
            }
            ActionButton::EditText => self.open_text_editor(layout),
            ActionButton::Rotate => {
                self.rotate(layout, out);
                EditorResponse::Nothing
            }
            ActionButton::Delete => self.delete_selected(layout, out),
        }
    }

    /// Rotates the selected item, or the pending placement when nothing is selected.
    pub fn rotate(&mut self, layout: &LayoutView<'_>, out: &mut Vec<Command>) {
        if let Some(record) = self.selected_record(layout) {
            if record.kind.catalog_entry().rotatable {
                out.push(Command::RotateFurniture { uid: record.uid });
            }
            return;
        }

        if let Some(choice) = self
            .placement
            .as_mut()
            .filter(|choice| choice.kind.catalog_entry().rotatable)
        {
            choice.rotation = choice.rotation.next();
            self.refresh_ghost(layout);
        }
    }

    /// Moves the selected item to the next layer of the configured cycle.
    pub fn cycle_layer(&mut self, layout: &LayoutView<'_>, out: &mut Vec<Command>) {
        let Some(record) = self.selected_record(layout) else {
            return;
        };
        let cycle = &self.config.layer_cycle;
        let Some(first) = cycle.first().copied() else {
            return;
        };
        let z_layer = cycle
            .iter()
            .position(|layer| *layer == record.z_layer)
            .and_then(|index| cycle.get(index + 1).copied())
            .unwrap_or(first);
        out.push(Command::SetFurnitureLayer {
            uid: record.uid,
            z_layer,
        });
    }

    /// Removes the selected item.
    pub fn delete_selected(
        &mut self,
        layout: &LayoutView<'_>,
        out: &mut Vec<Command>,
    ) -> EditorResponse {
        let Some(record) = self.selected_record(layout) else {
            return EditorResponse::Nothing;
        };
        out.push(Command::RemoveFurniture { uid: record.uid });
        self.selection = None;
        self.text_edit = None;
        EditorResponse::SelectionChanged(None)
    }

    /// Asks the host to open its label editor for the selected label.
    pub fn open_text_editor(&mut self, layout: &LayoutView<'_>) -> EditorResponse {
        let Some(record) = self.selected_record(layout) else {
            return EditorResponse::Nothing;
        };
        if !record.kind.is_label() {
            return EditorResponse::Nothing;
        }
        let uid = record.uid;
        let text = record
            .text
            .clone()
            .unwrap_or_else(|| PixelTextConfig::new(DEFAULT_LABEL_TEXT));
        self.text_edit = Some(uid);
        EditorResponse::OpenTextEditor { uid, text }
    }

    /// Applies the configuration confirmed in the host's label editor.
    pub fn confirm_text(&mut self, text: PixelTextConfig, out: &mut Vec<Command>) {
        if let Some(uid) = self.text_edit.take() {
            out.push(Command::SetFurnitureText { uid, text });
        }
    }

    /// Discards a pending label edit.
    pub fn cancel_text(&mut self) {
        self.text_edit = None;
    }

    /// Clears the selection.
    pub fn deselect(&mut self) -> EditorResponse {
        if self.selection.take().is_some() {
            EditorResponse::SelectionChanged(None)
        } else {
            EditorResponse::Nothing
        }
    }

    /// Drops references to furniture that the world removed.
    pub fn handle_events(&mut self, events: &[Event]) {
        for event in events {
            let Event::FurnitureRemoved { uid, .. } = event else {
                continue;
            };
            if self.selection == Some(*uid) {
                self.selection = None;
            }
            if self.text_edit == Some(*uid) {
                self.text_edit = None;
            }
            match self.drag {
                DragState::Candidate { uid: dragged, .. } | DragState::Moving { uid: dragged, .. }
                    if dragged == *uid =>
                {
                    self.drag = DragState::NotDragging;
                }
                _ => {}
            }
        }
    }

    /// Recomputes the ghost for the hovered tile against the current layout.
    pub fn refresh_ghost(&mut self, layout: &LayoutView<'_>) {
        self.ghost = self.hover.and_then(|cell| self.compute_ghost(layout, cell));
    }

    /// Highlight for the selected item.
    #[must_use]
    pub fn selection_highlight(&self, layout: &LayoutView<'_>) -> Option<SelectionHighlight> {
        if self.is_drag_moving() {
            return None;
        }
        let record = self.selected_record(layout)?;
        Some(SelectionHighlight {
            uid: record.uid,
            region: record.footprint(),
            rotatable: record.kind.catalog_entry().rotatable,
            editable_text: record.kind.is_label(),
            z_layer: record.z_layer,
        })
    }

    /// Returns to the idle state used when editing starts.
    pub fn reset(&mut self) {
        self.drag = DragState::NotDragging;
        self.hover = None;
        self.ghost = None;
        self.selection = None;
        self.text_edit = None;
    }

    fn selected_record<'a>(&self, layout: &LayoutView<'a>) -> Option<&'a FurnitureRecord> {
        self.selection.and_then(|uid| layout.furniture_by_uid(uid))
    }

    fn press_select(&mut self, layout: &LayoutView<'_>, cell: CellCoord) -> EditorResponse {
        match pick_furniture(layout, cell) {
            Some(record) => {
                let origin = record.origin;
                self.drag = DragState::Candidate {
                    uid: record.uid,
                    start: cell,
                    offset: (
                        cell.column() - origin.column(),
                        cell.row() - origin.row(),
                    ),
                };
                EditorResponse::Nothing
            }
            None => self.deselect(),
        }
    }

    fn pick(&mut self, layout: &LayoutView<'_>, cell: CellCoord) -> EditorResponse {
        let Some(record) = pick_furniture(layout, cell) else {
            return EditorResponse::Nothing;
        };
        let mut choice = PlacementChoice::new(record.kind);
        if let Some(text) = record.text.clone() {
            choice.text = Some(text);
        }
        self.placement = Some(choice);
        EditorResponse::Picked(record.kind)
    }

    fn place(&mut self, layout: &LayoutView<'_>, cell: CellCoord, out: &mut Vec<Command>) {
        let Some(choice) = self.placement.as_ref() else {
            return;
        };
        let origin = placement_origin(choice, cell);
        let request = PlacementRequest::new(choice.kind, origin)
            .with_rotation(choice.rotation)
            .with_text(choice.text.as_ref());
        if !can_place(layout, &request) {
            debug!(kind = ?choice.kind, column = origin.column(), row = origin.row(), "placement ghost invalid");
            return;
        }
        out.push(Command::AddFurniture {
            kind: choice.kind,
            origin,
            rotation: choice.rotation,
            text: choice.text.clone(),
        });
    }

    fn paint(&mut self, layout: &LayoutView<'_>, cell: CellCoord, out: &mut Vec<Command>) {
        let DragState::Painting {
            erase,
            last,
            wall_adding,
        } = self.drag
        else {
            return;
        };
        let Some(current) = layout.tile(cell) else {
            return;
        };
        if last == Some(cell) {
            return;
        }

        let mut wall_adding = wall_adding;
        if erase || self.tool == EditTool::Erase {
            if current != TileType::Void {
                out.push(Command::SetTile {
                    cell,
                    tile: TileType::Void,
                });
            }
        } else if self.tool == EditTool::TilePaint {
            let tile = TileType::Floor(self.floor_pattern);
            if current != tile {
                out.push(Command::SetTile { cell, tile });
            }
            out.push(Command::SetTileColor {
                cell,
                color: self.floor_color,
            });
        } else if self.tool == EditTool::WallPaint {
            let adding = *wall_adding.get_or_insert(current != TileType::Wall);
            if adding && current != TileType::Wall {
                out.push(Command::SetTile {
                    cell,
                    tile: TileType::Wall,
                });
            } else if !adding && current == TileType::Wall {
                out.push(Command::SetTile {
                    cell,
                    tile: TileType::FLOOR,
                });
            }
        }

        self.drag = DragState::Painting {
            erase,
            last: Some(cell),
            wall_adding,
        };
    }

    fn compute_ghost(&self, layout: &LayoutView<'_>, cell: CellCoord) -> Option<GhostPreview> {
        if let DragState::Moving { uid, offset } = self.drag {
            let record = layout.furniture_by_uid(uid)?;
            let request = move_request(record, cell.offset(-offset.0, -offset.1));
            return Some(GhostPreview {
                kind: GhostKind::Move {
                    uid,
                    kind: record.kind,
                },
                region: request.region(),
                valid: can_place(layout, &request),
            });
        }

        if self.tool.paints_tiles() {
            let columns = i64::from(layout.columns());
            let rows = i64::from(layout.rows());
            let column = i64::from(cell.column());
            let row = i64::from(cell.row());
            if column < -1 || row < -1 || column > columns || row > rows {
                return None;
            }
            return Some(GhostPreview {
                kind: GhostKind::TileBorder,
                region: CellRect::from_origin_and_size(cell, CellRectSize::new(1, 1)),
                valid: layout.contains(cell),
            });
        }

        if self.tool != EditTool::FurniturePlace {
            return None;
        }
        let choice = self.placement.as_ref()?;
        let request = PlacementRequest::new(choice.kind, placement_origin(choice, cell))
            .with_rotation(choice.rotation)
            .with_text(choice.text.as_ref());
        Some(GhostPreview {
            kind: GhostKind::Furniture {
                kind: choice.kind,
                rotation: choice.rotation,
                text: choice.text.clone(),
            },
            region: request.region(),
            valid: can_place(layout, &request),
        })
    }
}

fn placement_origin(choice: &PlacementChoice, cell: CellCoord) -> CellCoord {
    let row = wall_placement_row(choice.kind, choice.rotation, choice.text.as_ref(), cell.row());
    CellCoord::new(cell.column(), row)
}

fn move_request(record: &FurnitureRecord, origin: CellCoord) -> PlacementRequest<'_> {
    PlacementRequest::new(record.kind, origin)
        .with_rotation(record.rotation)
        .with_text(record.text.as_ref())
        .excluding(record.uid)
}

/// Furniture under the tile, preferring surface items stacked on top of hosts.
fn pick_furniture<'a>(layout: &LayoutView<'a>, cell: CellCoord) -> Option<&'a FurnitureRecord> {
    let mut hit = None;
    for item in layout.furniture_covering(cell) {
        if hit.is_none() || item.kind.catalog_entry().surface_item {
            hit = Some(item);
        }
    }
    hit
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixel_office_core::LayoutSnapshot;

    #[test]
    fn paint_ghost_extends_one_tile_past_the_edge() {
        let layout = LayoutSnapshot::filled(4, 4, TileType::FLOOR);
        let mut editor = Editor::default();
        editor.select_tool(EditTool::TilePaint);
        let mut out = Vec::new();

        editor.pointer_moved(&layout.view(), Some(CellCoord::new(-1, 4)), &mut out);
        let ghost = editor.ghost().expect("border ghost");
        assert_eq!(ghost.kind, GhostKind::TileBorder);
        assert!(!ghost.valid);

        editor.pointer_moved(&layout.view(), Some(CellCoord::new(-2, 0)), &mut out);
        assert!(editor.ghost().is_none());
        assert!(out.is_empty());
    }

    #[test]
    fn layer_cycle_wraps_and_recovers_from_unknown_layers() {
        let mut layout = LayoutSnapshot::filled(4, 4, TileType::FLOOR);
        let mut record =
            FurnitureRecord::new(FurnitureUid::new(1), FurnitureKind::Plant, CellCoord::new(1, 1));
        record.z_layer = 2;
        layout.furniture.push(record);

        let mut editor = Editor::default();
        editor.selection = Some(FurnitureUid::new(1));
        let mut out = Vec::new();
        editor.cycle_layer(&layout.view(), &mut out);

        layout.furniture[0].z_layer = 7;
        editor.cycle_layer(&layout.view(), &mut out);
        assert_eq!(
            out,
            vec![
                Command::SetFurnitureLayer {
                    uid: FurnitureUid::new(1),
                    z_layer: 0
                },
                Command::SetFurnitureLayer {
                    uid: FurnitureUid::new(1),
                    z_layer: 0
                },
            ]
        );
    }
}
