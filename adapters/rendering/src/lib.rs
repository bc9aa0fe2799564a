#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Pixel Office adapters.
//!
//! A [`Scene`] is an immutable per-frame snapshot composed by the session.
//! Backends draw it and hand back the [`InteractionBounds`] of the action
//! buttons they drew, which the session uses to hit-test the next frame.

use anyhow::Result as AnyResult;
use glam::Vec2;
use pixel_office_core::{
    AgentId, BubbleKind, ButtonBounds, CellCoord, CellRect, CharacterPose, CharacterSnapshot,
    Direction, FloorColor, FurnitureKind, FurnitureRecord, FurnitureUid, GhostPreview, HueShift,
    InteractionBounds, LayoutView, Palette, PixelTextConfig, Rotation, SeatId, SelectionHighlight,
    SpriteKey, TextColor, TileType, TILE_SIZE,
};
use thiserror::Error;

/// Radius of an action button in world pixels, scaled by zoom when drawn.
const ACTION_BUTTON_RADIUS: f32 = 3.0;

/// Smallest action button radius in device pixels.
const MIN_ACTION_BUTTON_RADIUS: f32 = 6.0;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }

    /// Returns the same color with a different alpha.
    #[must_use]
    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self { alpha, ..self }
    }
}

impl From<TextColor> for Color {
    fn from(color: TextColor) -> Self {
        Self::from_rgb_u8(color.red(), color.green(), color.blue())
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Tile grid with its per-tile floor colours.
#[derive(Clone, Debug, PartialEq)]
pub struct TileGridPresentation {
    /// Number of columns contained in the grid.
    pub columns: u32,
    /// Number of rows contained in the grid.
    pub rows: u32,
    /// Row-major tile types.
    pub tiles: Vec<TileType>,
    /// Row-major floor colour overrides; empty when no tile is coloured.
    pub tile_colors: Vec<Option<FloorColor>>,
}

impl TileGridPresentation {
    /// Creates a new tile grid descriptor.
    ///
    /// Returns an error when the tile or colour arrays do not match the dimensions.
    pub fn new(
        columns: u32,
        rows: u32,
        tiles: Vec<TileType>,
        tile_colors: Vec<Option<FloorColor>>,
    ) -> Result<Self, RenderingError> {
        let expected = columns as usize * rows as usize;
        if tiles.len() != expected {
            return Err(RenderingError::TileCountMismatch {
                expected,
                actual: tiles.len(),
            });
        }
        if !tile_colors.is_empty() && tile_colors.len() != expected {
            return Err(RenderingError::ColorCountMismatch {
                expected,
                actual: tile_colors.len(),
            });
        }

        Ok(Self {
            columns,
            rows,
            tiles,
            tile_colors,
        })
    }

    /// Tile at the cell, if inside the grid.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> Option<TileType> {
        let index = cell.index(self.columns, self.rows)?;
        self.tiles.get(index).copied()
    }

    /// Floor colour override at the cell, if any.
    #[must_use]
    pub fn tile_color(&self, cell: CellCoord) -> Option<FloorColor> {
        let index = cell.index(self.columns, self.rows)?;
        self.tile_colors.get(index).copied().flatten()
    }

    /// Total width of the grid in world pixels.
    #[must_use]
    pub fn width(&self) -> f32 {
        (self.columns * TILE_SIZE) as f32
    }

    /// Total height of the grid in world pixels.
    #[must_use]
    pub fn height(&self) -> f32 {
        (self.rows * TILE_SIZE) as f32
    }
}

/// Furniture item resolved for drawing.
#[derive(Clone, Debug, PartialEq)]
pub struct FurniturePresentation {
    /// Identifier of the item.
    pub uid: FurnitureUid,
    /// Catalog kind of the item.
    pub kind: FurnitureKind,
    /// Sprite to draw.
    pub sprite: SpriteKey,
    /// Effective footprint after rotation and text measurement.
    pub region: CellRect,
    /// Orientation of the item.
    pub rotation: Rotation,
    /// Stacking layer; higher layers draw above lower ones.
    pub z_layer: i32,
    /// Label configuration for pixel-text items.
    pub text: Option<PixelTextConfig>,
    /// Depth in world pixels used to interleave furniture with characters.
    pub depth: f32,
}

impl FurniturePresentation {
    /// Resolves every furniture item of the layout in registry order.
    #[must_use]
    pub fn from_layout(layout: &LayoutView<'_>) -> Vec<Self> {
        layout
            .furniture()
            .iter()
            .map(|record| Self::from_record(layout, record))
            .collect()
    }

    fn from_record(layout: &LayoutView<'_>, record: &FurnitureRecord) -> Self {
        let entry = record.kind.catalog_entry();
        let region = record.footprint();
        let mut depth = region_bottom(&region);
        if entry.surface_item {
            let host_bottom = layout
                .furniture()
                .iter()
                .filter(|host| host.kind.catalog_entry().hosts_surface_items)
                .map(FurnitureRecord::footprint)
                .filter(|host| host.intersects(&region))
                .map(|host| region_bottom(&host))
                .fold(depth, f32::max);
            depth = host_bottom + 0.5;
        }

        Self {
            uid: record.uid,
            kind: record.kind,
            sprite: entry.sprite,
            region,
            rotation: record.rotation,
            z_layer: record.z_layer,
            text: record.text.clone(),
            depth,
        }
    }

    /// Glyph colour of a label.
    #[must_use]
    pub fn label_color(&self) -> Option<Color> {
        self.text.as_ref().map(|text| Color::from(text.color))
    }
}

fn region_bottom(region: &CellRect) -> f32 {
    (region.end_row() * i64::from(TILE_SIZE)) as f32
}

/// Character resolved for drawing.
#[derive(Clone, Debug, PartialEq)]
pub struct CharacterPresentation {
    /// Identifier of the agent.
    pub id: AgentId,
    /// World-pixel position of the tile centre under the character.
    pub position: Vec2,
    /// Pose to draw.
    pub pose: CharacterPose,
    /// Direction the sprite faces.
    pub facing: Direction,
    /// Palette of the sprite.
    pub palette: Palette,
    /// Hue rotation of the sprite.
    pub hue_shift: HueShift,
    /// Speech bubble drawn above the character.
    pub bubble: Option<BubbleKind>,
    /// Whether the character belongs to a sub-agent.
    pub sub_agent: bool,
    /// Whether the character is selected.
    pub selected: bool,
    /// Whether the pointer hovers the character.
    pub hovered: bool,
}

impl CharacterPresentation {
    /// Builds the presentation of a character snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: &CharacterSnapshot, selected: bool, hovered: bool) -> Self {
        Self {
            id: snapshot.id,
            position: snapshot.position,
            pose: snapshot.pose(),
            facing: snapshot.facing,
            palette: snapshot.palette,
            hue_shift: snapshot.hue_shift,
            bubble: snapshot.bubble,
            sub_agent: snapshot.is_sub_agent(),
            selected,
            hovered,
        }
    }

    /// Depth in world pixels, measured at the character's feet.
    #[must_use]
    pub fn depth(&self) -> f32 {
        self.position.y + TILE_SIZE as f32 / 2.0
    }
}

/// Availability of a seat shown while assigning seats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SeatState {
    /// Free for the selected character.
    Available,
    /// Already bound to the selected character.
    Own,
    /// Bound to another character.
    Taken,
}

/// Seat indicator drawn while assigning seats.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SeatPresentation {
    /// Identifier of the seat.
    pub id: SeatId,
    /// Tile of the seat.
    pub cell: CellCoord,
    /// Availability for the selected character.
    pub state: SeatState,
    /// Whether the pointer hovers the seat tile.
    pub hovered: bool,
}

impl SeatPresentation {
    /// Tint of the seat indicator.
    #[must_use]
    pub fn tint(&self) -> Color {
        let base = match self.state {
            SeatState::Available => Color::from_rgb_u8(0x4c, 0xaf, 0x50),
            SeatState::Own => Color::from_rgb_u8(0x42, 0x8b, 0xf5),
            SeatState::Taken => Color::from_rgb_u8(0x80, 0x80, 0x80),
        };
        if self.hovered {
            base.lighten(0.35)
        } else {
            base
        }
    }
}

/// Camera state needed to map world pixels onto the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPresentation {
    /// Integer zoom factor.
    pub zoom: u32,
    /// Pan offset in device pixels.
    pub pan: Vec2,
    /// Device-pixel position of the map's top-left corner.
    pub map_offset: Vec2,
    /// Viewport size in device pixels.
    pub viewport: Vec2,
}

impl CameraPresentation {
    /// Converts a world-pixel position into device pixels.
    #[must_use]
    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        world * self.zoom as f32 + self.map_offset
    }
}

/// Editing overlay drawn on top of the office in edit mode.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EditorOverlay {
    /// Preview of the pending placement, move or paint.
    pub ghost: Option<GhostPreview>,
    /// Highlight and action buttons of the selected furniture.
    pub selection: Option<SelectionHighlight>,
}

impl EditorOverlay {
    /// Tint applied to the ghost, green when valid and red otherwise.
    #[must_use]
    pub fn ghost_tint(&self) -> Option<Color> {
        self.ghost.as_ref().map(|ghost| {
            if ghost.valid {
                Color::from_rgb_u8(0x00, 0xff, 0x00).with_alpha(0.25)
            } else {
                Color::from_rgb_u8(0xff, 0x00, 0x00).with_alpha(0.25)
            }
        })
    }
}

/// Interaction mode the scene was composed in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SceneMode {
    /// Watching the office.
    #[default]
    Normal,
    /// Assigning seats to characters.
    SeatAssignment,
    /// Editing the layout.
    Edit,
}

/// Entry of the depth-sorted draw list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawItem {
    /// Index into [`Scene::furniture`].
    Furniture(usize),
    /// Index into [`Scene::characters`].
    Character(usize),
}

/// Scene description combining the tile grid, furniture and characters.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Tile grid that composes the office floor.
    pub grid: TileGridPresentation,
    /// Furniture in registry order.
    pub furniture: Vec<FurniturePresentation>,
    /// Characters in id order.
    pub characters: Vec<CharacterPresentation>,
    /// Seat indicators, populated while assigning seats.
    pub seats: Vec<SeatPresentation>,
    /// Camera the frame is drawn through.
    pub camera: CameraPresentation,
    /// Interaction mode.
    pub mode: SceneMode,
    /// Editing overlay, present only in edit mode.
    pub editor: Option<EditorOverlay>,
    /// Tile under the pointer.
    pub hovered_tile: Option<CellCoord>,
}

impl Scene {
    /// Furniture and characters ordered back to front.
    ///
    /// Items sort by stacking layer, then by depth; furniture draws before a
    /// character at equal depth so seated characters appear on their chairs.
    #[must_use]
    pub fn draw_order(&self) -> Vec<DrawItem> {
        let mut items: Vec<(i32, f32, DrawItem)> = self
            .furniture
            .iter()
            .enumerate()
            .map(|(index, item)| (item.z_layer, item.depth, DrawItem::Furniture(index)))
            .chain(
                self.characters
                    .iter()
                    .enumerate()
                    .map(|(index, character)| (0, character.depth(), DrawItem::Character(index))),
            )
            .collect();
        items.sort_by(|left, right| left.0.cmp(&right.0).then(left.1.total_cmp(&right.1)));
        items.into_iter().map(|(_, _, item)| item).collect()
    }

    /// Screen bounds of the action buttons around the selected furniture.
    ///
    /// Rotate sits on the top-left corner, delete on the top-right, the label
    /// editor on the bottom-left and the layer toggle on the bottom-right.
    #[must_use]
    pub fn action_button_bounds(&self) -> InteractionBounds {
        let Some(selection) = self.editor.as_ref().and_then(|overlay| overlay.selection.as_ref())
        else {
            return InteractionBounds::default();
        };
        let tile = TILE_SIZE as f32;
        let origin = selection.region.origin();
        let size = selection.region.size();
        let top_left = Vec2::new(origin.column() as f32, origin.row() as f32) * tile;
        let bottom_right =
            top_left + Vec2::new(size.width() as f32, size.height() as f32) * tile;
        let top_left = self.camera.world_to_screen(top_left);
        let bottom_right = self.camera.world_to_screen(bottom_right);
        let radius = (ACTION_BUTTON_RADIUS * self.camera.zoom as f32).max(MIN_ACTION_BUTTON_RADIUS);
        let button = |center: Vec2| ButtonBounds { center, radius };

        InteractionBounds {
            layer: Some(button(bottom_right)),
            edit: selection
                .editable_text
                .then(|| button(Vec2::new(top_left.x, bottom_right.y))),
            rotate: selection.rotatable.then(|| button(top_left)),
            delete: Some(button(Vec2::new(bottom_right.x, top_left.y))),
        }
    }
}

/// Rendering backend capable of presenting Pixel Office scenes.
pub trait RenderingBackend {
    /// Draws one frame and returns the action button bounds it drew.
    fn render(&mut self, scene: &Scene) -> AnyResult<InteractionBounds>;
}

/// Backend that draws nothing and only lays out the action buttons.
#[derive(Clone, Debug, Default)]
pub struct HeadlessBackend {
    frames: u64,
}

impl HeadlessBackend {
    /// Number of frames presented so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl RenderingBackend for HeadlessBackend {
    fn render(&mut self, scene: &Scene) -> AnyResult<InteractionBounds> {
        if scene.camera.zoom == 0 {
            return Err(RenderingError::InvalidZoom.into());
        }
        self.frames += 1;
        Ok(scene.action_button_bounds())
    }
}

/// Errors that can occur when constructing or presenting rendering descriptors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum RenderingError {
    /// The tile array does not cover the grid.
    #[error("tile grid expects {expected} tiles but received {actual}")]
    TileCountMismatch {
        /// Number of tiles implied by the dimensions.
        expected: usize,
        /// Number of tiles supplied.
        actual: usize,
    },
    /// The colour array does not cover the grid.
    #[error("tile grid expects {expected} colours but received {actual}")]
    ColorCountMismatch {
        /// Number of colours implied by the dimensions.
        expected: usize,
        /// Number of colours supplied.
        actual: usize,
    },
    /// Zoom must be positive to map world pixels onto the viewport.
    #[error("zoom must be positive")]
    InvalidZoom,
}
