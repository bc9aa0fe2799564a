#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Pixel Office engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and the interaction systems. Adapters submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! describing what changed. Systems read immutable views and respond with new
//! command batches; they never hold references into live world state.

use std::{collections::BTreeMap, time::Duration};

use glam::Vec2;
use serde::{Deserialize, Serialize};

mod catalog;
mod layout;

pub use catalog::{
    CatalogEntry, ColorParseError, FurnitureKind, GlyphMetrics, Mounting, PixelFont,
    PixelTextConfig, Rotation, SpriteKey, TextColor, MAX_PIXEL_SCALE,
};
pub use layout::{
    FloorColor, FloorPattern, FurnitureRecord, LayoutError, LayoutSnapshot, LayoutView, TileType,
    UnknownTileCode, LAYOUT_VERSION,
};

/// Edge length of a square tile measured in world pixels.
pub const TILE_SIZE: u32 = 16;

/// Width of the character hit box in world pixels.
pub const CHARACTER_HIT_WIDTH: f32 = 16.0;

/// Height of the character hit box in world pixels.
pub const CHARACTER_HIT_HEIGHT: f32 = 24.0;

/// Tool names that put a working character into the reading pose.
pub const READING_TOOLS: [&str; 5] = ["Read", "Grep", "Glob", "WebFetch", "WebSearch"];

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the active layout after structural validation.
    LoadLayout {
        /// Snapshot describing the new layout.
        layout: LayoutSnapshot,
    },
    /// Overwrites the type of a single tile.
    SetTile {
        /// Tile to overwrite.
        cell: CellCoord,
        /// New tile type.
        tile: TileType,
    },
    /// Sets or clears the floor colour override of a single tile.
    SetTileColor {
        /// Tile to recolour.
        cell: CellCoord,
        /// New colour override, `None` to restore the pattern colours.
        color: Option<FloorColor>,
    },
    /// Requests placement of a new furniture item.
    AddFurniture {
        /// Catalog kind to place.
        kind: FurnitureKind,
        /// Top-left anchor tile of the footprint.
        origin: CellCoord,
        /// Initial orientation.
        rotation: Rotation,
        /// Label configuration for pixel-text furniture.
        text: Option<PixelTextConfig>,
    },
    /// Removes a furniture item.
    RemoveFurniture {
        /// Identifier of the item to remove.
        uid: FurnitureUid,
    },
    /// Relocates a furniture item to a new anchor tile.
    MoveFurniture {
        /// Identifier of the item to move.
        uid: FurnitureUid,
        /// New top-left anchor tile.
        origin: CellCoord,
    },
    /// Advances a rotatable furniture item to its next orientation.
    RotateFurniture {
        /// Identifier of the item to rotate.
        uid: FurnitureUid,
    },
    /// Changes the stacking layer of a furniture item.
    SetFurnitureLayer {
        /// Identifier of the item to restack.
        uid: FurnitureUid,
        /// New stacking layer.
        z_layer: i32,
    },
    /// Replaces the label configuration of a pixel-text item.
    SetFurnitureText {
        /// Identifier of the label to update.
        uid: FurnitureUid,
        /// New label configuration.
        text: PixelTextConfig,
    },
    /// Creates a character for an agent or sub-agent session.
    SpawnCharacter {
        /// Identifier of the agent.
        id: AgentId,
        /// Parent agent for sub-agents.
        parent: Option<AgentId>,
        /// Display name used for name-to-seat persistence.
        label: Option<String>,
        /// Persisted palette, if known.
        palette: Option<Palette>,
        /// Persisted hue shift, if known.
        hue_shift: Option<HueShift>,
        /// Persisted seat preference, if known.
        seat: Option<SeatId>,
    },
    /// Removes a character and, for parent agents, its sub-agents.
    DespawnCharacter {
        /// Identifier of the agent.
        id: AgentId,
    },
    /// Applies an external activity update to a character.
    SetCharacterActivity {
        /// Identifier of the agent.
        id: AgentId,
        /// Latest externally reported status.
        status: ActivityStatus,
        /// Name of the tool currently in use, if any.
        tool: Option<String>,
    },
    /// Raises or clears the speech bubble of a character.
    SetBubble {
        /// Identifier of the agent.
        id: AgentId,
        /// Bubble to show, `None` to clear.
        bubble: Option<BubbleKind>,
    },
    /// Clears the speech bubble of a character unconditionally.
    DismissBubble {
        /// Identifier of the agent.
        id: AgentId,
    },
    /// Sends a character walking toward a tile.
    WalkToTile {
        /// Identifier of the agent.
        id: AgentId,
        /// Destination tile.
        cell: CellCoord,
    },
    /// Sends a character walking back to its assigned seat.
    SendToSeat {
        /// Identifier of the agent.
        id: AgentId,
    },
    /// Binds a character to a seat, evicting any previous occupant.
    ReassignSeat {
        /// Identifier of the agent.
        id: AgentId,
        /// Seat to bind.
        seat: SeatId,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a new layout became active.
    LayoutLoaded {
        /// Number of tile columns in the new layout.
        columns: u32,
        /// Number of tile rows in the new layout.
        rows: u32,
    },
    /// Reports that an inbound layout was malformed and the previous one stays active.
    LayoutRejected {
        /// Structural problem found in the inbound layout.
        reason: LayoutError,
    },
    /// Confirms that a tile changed type.
    TileChanged {
        /// Tile that changed.
        cell: CellCoord,
        /// New tile type.
        tile: TileType,
    },
    /// Confirms that a tile's colour override changed.
    TileColorChanged {
        /// Tile that changed.
        cell: CellCoord,
        /// New colour override.
        color: Option<FloorColor>,
    },
    /// Reports that a tile edit was rejected.
    TileEditRejected {
        /// Tile named in the request.
        cell: CellCoord,
        /// Specific reason the edit failed.
        reason: TileEditError,
    },
    /// Confirms that a furniture item was placed.
    FurniturePlaced {
        /// Identifier assigned to the item by the world.
        uid: FurnitureUid,
        /// Kind of the placed item.
        kind: FurnitureKind,
        /// Region covered by the item.
        region: CellRect,
    },
    /// Confirms that a furniture item was removed.
    FurnitureRemoved {
        /// Identifier of the removed item.
        uid: FurnitureUid,
        /// Region previously covered by the item.
        region: CellRect,
    },
    /// Confirms that a furniture item moved.
    FurnitureMoved {
        /// Identifier of the moved item.
        uid: FurnitureUid,
        /// Region covered before the move.
        from: CellRect,
        /// Region covered after the move.
        to: CellRect,
    },
    /// Confirms that a furniture item rotated.
    FurnitureRotated {
        /// Identifier of the rotated item.
        uid: FurnitureUid,
        /// Orientation after the rotation.
        rotation: Rotation,
        /// Region covered after the rotation.
        region: CellRect,
    },
    /// Confirms that a furniture item changed stacking layer.
    FurnitureLayerChanged {
        /// Identifier of the restacked item.
        uid: FurnitureUid,
        /// New stacking layer.
        z_layer: i32,
    },
    /// Confirms that a label's configuration changed.
    FurnitureTextChanged {
        /// Identifier of the label.
        uid: FurnitureUid,
        /// Region covered with the new text.
        region: CellRect,
    },
    /// Reports that a furniture mutation failed placement validation.
    FurniturePlacementRejected {
        /// Existing item targeted by the request, `None` for new placements.
        uid: Option<FurnitureUid>,
        /// Kind of the item.
        kind: FurnitureKind,
        /// Anchor tile evaluated by the validator.
        origin: CellCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Reports that a seat disappeared and its occupant lost the binding.
    SeatReleased {
        /// Seat that no longer exists.
        seat: SeatId,
        /// Character that was bound to the seat.
        occupant: AgentId,
    },
    /// Confirms that a character was created.
    CharacterSpawned {
        /// Identifier of the agent.
        id: AgentId,
        /// Tile the character starts on.
        cell: CellCoord,
        /// Seat bound at spawn time.
        seat: Option<SeatId>,
        /// Palette chosen for the character.
        palette: Palette,
        /// Hue shift chosen for the character.
        hue_shift: HueShift,
    },
    /// Confirms that a character was removed.
    CharacterDespawned {
        /// Identifier of the agent.
        id: AgentId,
    },
    /// Confirms that a character started walking.
    WalkStarted {
        /// Identifier of the agent.
        id: AgentId,
        /// Destination tile of the walk.
        destination: CellCoord,
    },
    /// Confirms that a character reached the end of its path.
    CharacterArrived {
        /// Identifier of the agent.
        id: AgentId,
        /// Tile the character stopped on.
        cell: CellCoord,
        /// Whether the character sat down on its own seat.
        seated: bool,
    },
    /// Confirms that the externally reported status of a character changed.
    ActivityChanged {
        /// Identifier of the agent.
        id: AgentId,
        /// New status.
        status: ActivityStatus,
    },
    /// Confirms that the speech bubble of a character changed.
    BubbleChanged {
        /// Identifier of the agent.
        id: AgentId,
        /// Bubble now shown, if any.
        bubble: Option<BubbleKind>,
    },
    /// Confirms that a character was bound to a seat.
    SeatReassigned {
        /// Identifier of the agent.
        id: AgentId,
        /// Seat now bound to the character.
        seat: SeatId,
        /// Seat the character held before, if any.
        previous: Option<SeatId>,
        /// Character evicted from the seat, if any.
        evicted: Option<AgentId>,
    },
}

/// Cardinal directions used for facing and grid stepping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward decreasing rows.
    North,
    /// Toward increasing columns.
    East,
    /// Toward increasing rows.
    South,
    /// Toward decreasing columns.
    West,
}

impl Direction {
    /// Column and row deltas of a single step in this direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }
}

/// Unique identifier of an agent character.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(u32);

impl AgentId {
    /// Creates a new identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier of a committed furniture item. Never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FurnitureUid(u32);

impl FurnitureUid {
    /// Creates a new identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier of a seat. Seats are provided by chairs and share their uid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeatId(u32);

impl SeatId {
    /// Creates a new identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl From<FurnitureUid> for SeatId {
    fn from(uid: FurnitureUid) -> Self {
        Self(uid.get())
    }
}

/// Location of a single tile measured in whole tiles.
///
/// Coordinates are signed so drag ghosts may hover outside the grid; committed
/// furniture and tile edits are always bounds-checked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    #[serde(rename = "col")]
    column: i32,
    row: i32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Cell displaced by the provided column and row deltas.
    #[must_use]
    pub const fn offset(self, columns: i32, rows: i32) -> Self {
        Self::new(
            self.column.saturating_add(columns),
            self.row.saturating_add(rows),
        )
    }

    /// Neighbouring cell one step in the given direction.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (columns, rows) = direction.delta();
        self.offset(columns, rows)
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column.abs_diff(other.column) + self.row.abs_diff(other.row)
    }

    /// Reports whether the cell lies within a `columns × rows` grid.
    #[must_use]
    pub fn in_bounds(self, columns: u32, rows: u32) -> bool {
        u32::try_from(self.column).map_or(false, |column| column < columns)
            && u32::try_from(self.row).map_or(false, |row| row < rows)
    }

    /// Row-major index of the cell within a `columns × rows` grid.
    #[must_use]
    pub fn index(self, columns: u32, rows: u32) -> Option<usize> {
        if !self.in_bounds(columns, rows) {
            return None;
        }
        let column = usize::try_from(self.column).ok()?;
        let row = usize::try_from(self.row).ok()?;
        let width = usize::try_from(columns).ok()?;
        Some(row * width + column)
    }

    /// Cell at the provided row-major index.
    #[must_use]
    pub fn from_index(index: usize, columns: u32) -> Option<Self> {
        let width = usize::try_from(columns).ok().filter(|width| *width > 0)?;
        let column = i32::try_from(index % width).ok()?;
        let row = i32::try_from(index / width).ok()?;
        Some(Self::new(column, row))
    }

    /// Tile containing the provided world-pixel position.
    #[must_use]
    pub fn containing(point: Vec2) -> Self {
        let size = TILE_SIZE as f32;
        Self::new(
            (point.x / size).floor() as i32,
            (point.y / size).floor() as i32,
        )
    }

    /// World-pixel position of the tile centre.
    #[must_use]
    pub fn center(self) -> Vec2 {
        let size = TILE_SIZE as f32;
        Vec2::new(
            (self.column as f32 + 0.5) * size,
            (self.row as f32 + 0.5) * size,
        )
    }
}

/// Rectangular region of tiles anchored at its top-left cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRect {
    origin: CellCoord,
    size: CellRectSize,
}

impl CellRect {
    /// Creates a rectangle from its top-left cell and dimensions.
    #[must_use]
    pub const fn from_origin_and_size(origin: CellCoord, size: CellRectSize) -> Self {
        Self { origin, size }
    }

    /// Top-left cell of the rectangle.
    #[must_use]
    pub const fn origin(&self) -> CellCoord {
        self.origin
    }

    /// Dimensions of the rectangle.
    #[must_use]
    pub const fn size(&self) -> CellRectSize {
        self.size
    }

    /// Exclusive column bound of the rectangle.
    #[must_use]
    pub fn end_column(&self) -> i64 {
        i64::from(self.origin.column()) + i64::from(self.size.width())
    }

    /// Exclusive row bound of the rectangle.
    #[must_use]
    pub fn end_row(&self) -> i64 {
        i64::from(self.origin.row()) + i64::from(self.size.height())
    }

    /// Reports whether the rectangle covers the cell.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        i64::from(cell.column()) >= i64::from(self.origin.column())
            && i64::from(cell.column()) < self.end_column()
            && i64::from(cell.row()) >= i64::from(self.origin.row())
            && i64::from(cell.row()) < self.end_row()
    }

    /// Reports whether the rectangles share at least one cell.
    #[must_use]
    pub fn intersects(&self, other: &CellRect) -> bool {
        i64::from(self.origin.column()) < other.end_column()
            && i64::from(other.origin.column()) < self.end_column()
            && i64::from(self.origin.row()) < other.end_row()
            && i64::from(other.origin.row()) < self.end_row()
    }

    /// Iterates every covered cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let origin = self.origin;
        let width = i32::try_from(self.size.width()).unwrap_or(i32::MAX);
        let height = i32::try_from(self.size.height()).unwrap_or(i32::MAX);
        (0..height).flat_map(move |row| (0..width).map(move |column| origin.offset(column, row)))
    }

    /// Iterates the cells of the bottom row.
    pub fn bottom_row_cells(&self) -> impl Iterator<Item = CellCoord> {
        let origin = self.origin;
        let width = i32::try_from(self.size.width()).unwrap_or(i32::MAX);
        let last_row = i32::try_from(self.size.height())
            .unwrap_or(i32::MAX)
            .saturating_sub(1);
        (0..width).map(move |column| origin.offset(column, last_row))
    }
}

/// Dimensions of a rectangular region measured in tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRectSize {
    width: u32,
    height: u32,
}

impl CellRectSize {
    /// Creates a new size descriptor.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width in tiles.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in tiles.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}

/// Externally reported activity of an agent session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityStatus {
    /// The agent is not doing anything.
    #[default]
    Idle,
    /// The agent is running tools or producing output.
    Active,
    /// The agent finished its turn and waits for the user.
    Waiting,
    /// The agent is blocked on a permission prompt.
    NeedsApproval,
}

/// Speech bubble overlay shown above a character.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BubbleKind {
    /// The agent needs the user to approve a tool call.
    Permission,
    /// The agent waits for user input.
    Waiting,
}

/// Motion state owned by the character simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MotionState {
    /// Standing still away from its seat.
    #[default]
    Idle,
    /// Following a path.
    Walking,
    /// Sitting on its assigned seat.
    Seated,
}

/// Sprite pose derived from motion and activity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CharacterPose {
    /// Standing still.
    Standing,
    /// Walking; carries the walk-cycle frame.
    Walking {
        /// Frame index within the walk cycle.
        frame: u8,
    },
    /// Seated without work in progress.
    Sitting,
    /// Seated and typing.
    Typing,
    /// Seated and reading.
    Reading,
}

/// Reports whether the named tool puts a working character into the reading pose.
#[must_use]
pub fn is_reading_tool(tool: &str) -> bool {
    READING_TOOLS.contains(&tool)
}

/// Index of one of the built-in character palettes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Palette(u8);

impl Palette {
    /// Number of built-in palettes.
    pub const COUNT: u8 = 6;

    /// Creates a palette index, wrapping values beyond [`Palette::COUNT`].
    #[must_use]
    pub const fn new(index: u8) -> Self {
        Self(index % Self::COUNT)
    }

    /// Returns the palette index.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }
}

/// Hue rotation in degrees applied on top of a palette.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HueShift(i16);

impl HueShift {
    /// No hue rotation.
    pub const NONE: HueShift = HueShift(0);

    /// Creates a hue shift measured in degrees.
    #[must_use]
    pub const fn new(degrees: i16) -> Self {
        Self(degrees)
    }

    /// Returns the rotation in degrees.
    #[must_use]
    pub const fn get(&self) -> i16 {
        self.0
    }
}

/// Immutable representation of a single character's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct CharacterSnapshot {
    /// Unique identifier of the agent.
    pub id: AgentId,
    /// Parent agent for sub-agents.
    pub parent: Option<AgentId>,
    /// Display name of the agent.
    pub label: Option<String>,
    /// Continuous world-pixel position of the tile centre under the character.
    pub position: Vec2,
    /// Tile the character currently stands on.
    pub cell: CellCoord,
    /// Direction the sprite faces.
    pub facing: Direction,
    /// Motion state owned by the simulation.
    pub motion: MotionState,
    /// Externally reported activity.
    pub activity: ActivityStatus,
    /// Tool currently in use, if reported.
    pub tool: Option<String>,
    /// Speech bubble currently shown.
    pub bubble: Option<BubbleKind>,
    /// Seat bound to the character.
    pub seat: Option<SeatId>,
    /// Palette of the sprite.
    pub palette: Palette,
    /// Hue rotation of the sprite.
    pub hue_shift: HueShift,
    /// Frame index within the walk cycle.
    pub walk_frame: u8,
    /// Final tile of the active path, if walking.
    pub destination: Option<CellCoord>,
}

impl CharacterSnapshot {
    /// Reports whether the character belongs to a sub-agent.
    #[must_use]
    pub const fn is_sub_agent(&self) -> bool {
        self.parent.is_some()
    }

    /// Pose the renderer should draw.
    #[must_use]
    pub fn pose(&self) -> CharacterPose {
        match self.motion {
            MotionState::Walking => CharacterPose::Walking {
                frame: self.walk_frame,
            },
            MotionState::Seated if self.activity == ActivityStatus::Active => {
                match self.tool.as_deref() {
                    Some(tool) if is_reading_tool(tool) => CharacterPose::Reading,
                    _ => CharacterPose::Typing,
                }
            }
            MotionState::Seated => CharacterPose::Sitting,
            MotionState::Idle => CharacterPose::Standing,
        }
    }

    /// World-pixel position of the character's feet.
    #[must_use]
    pub fn feet(&self) -> Vec2 {
        self.position + Vec2::new(0.0, TILE_SIZE as f32 / 2.0)
    }

    /// Reports whether the world-pixel point lies inside the character's hit box.
    #[must_use]
    pub fn hit_test(&self, point: Vec2) -> bool {
        let feet = self.feet();
        let half_width = CHARACTER_HIT_WIDTH / 2.0;
        point.x >= feet.x - half_width
            && point.x <= feet.x + half_width
            && point.y >= feet.y - CHARACTER_HIT_HEIGHT
            && point.y <= feet.y
    }
}

/// Read-only snapshot describing all characters in the office.
#[derive(Clone, Debug, Default)]
pub struct CharacterView {
    snapshots: Vec<CharacterSnapshot>,
}

impl CharacterView {
    /// Creates a new character view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<CharacterSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &CharacterSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a single character.
    #[must_use]
    pub fn get(&self, id: AgentId) -> Option<&CharacterSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<CharacterSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a seat.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeatSnapshot {
    /// Identifier of the seat.
    pub id: SeatId,
    /// Tile a seated character occupies.
    pub cell: CellCoord,
    /// Direction a seated character faces.
    pub facing: Direction,
    /// Character bound to the seat.
    pub occupant: Option<AgentId>,
}

impl SeatSnapshot {
    /// Reports whether a character is bound to the seat.
    #[must_use]
    pub const fn is_assigned(&self) -> bool {
        self.occupant.is_some()
    }
}

/// Read-only snapshot describing all seats in the office.
#[derive(Clone, Debug, Default)]
pub struct SeatView {
    snapshots: Vec<SeatSnapshot>,
}

impl SeatView {
    /// Creates a new seat view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<SeatSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &SeatSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a single seat.
    #[must_use]
    pub fn get(&self, id: SeatId) -> Option<&SeatSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<SeatSnapshot> {
        self.snapshots
    }
}

/// Persisted seat binding of a single agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatRecord {
    /// Palette of the agent.
    pub palette: Palette,
    /// Seat bound to the agent.
    pub seat_id: Option<SeatId>,
}

/// Seat persistence payload keyed by agent id. Sub-agents are never included.
pub type SeatAssignments = BTreeMap<AgentId, SeatRecord>;

/// Persisted seat and appearance of a named agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedSeatRecord {
    /// Seat bound to the agent.
    pub seat_id: Option<SeatId>,
    /// Palette of the agent.
    pub palette: Palette,
    /// Hue rotation of the agent.
    pub hue_shift: HueShift,
}

/// Name-to-seat persistence payload keyed by agent display name.
pub type NamedSeats = BTreeMap<String, NamedSeatRecord>;

/// Reasons a furniture placement may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// Part of the footprint lies outside the grid.
    OutOfBounds,
    /// Part of the footprint covers a void tile.
    VoidTile,
    /// A wall-mounted item's bottom row does not sit on wall tiles.
    WallRequired,
    /// A floor item would cover a wall tile.
    WallBlocked,
    /// The footprint overlaps furniture that does not accept it.
    Occupied,
}

/// Reasons a tile edit may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileEditError {
    /// The tile lies outside the grid.
    OutOfBounds,
}

/// Screen-space circle of an action button drawn by the renderer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ButtonBounds {
    /// Centre in device pixels.
    pub center: Vec2,
    /// Radius in device pixels.
    pub radius: f32,
}

impl ButtonBounds {
    /// Reports whether the device-pixel point lies inside the padded circle.
    #[must_use]
    pub fn contains(&self, point: Vec2, padding: f32) -> bool {
        let reach = self.radius + padding;
        self.center.distance_squared(point) <= reach * reach
    }
}

/// Auxiliary action offered next to the selected furniture item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionButton {
    /// Cycles the stacking layer.
    Layer,
    /// Opens the label editor.
    EditText,
    /// Rotates the item.
    Rotate,
    /// Deletes the item.
    Delete,
}

/// Action button bounds produced by the renderer for the next frame's hit-testing.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InteractionBounds {
    /// Layer toggle button.
    pub layer: Option<ButtonBounds>,
    /// Label editor button.
    pub edit: Option<ButtonBounds>,
    /// Rotate button.
    pub rotate: Option<ButtonBounds>,
    /// Delete button.
    pub delete: Option<ButtonBounds>,
}

impl InteractionBounds {
    /// First button hit by the point, checked in layer, edit, rotate, delete order.
    #[must_use]
    pub fn hit(&self, point: Vec2, padding: f32) -> Option<ActionButton> {
        [
            (self.layer, ActionButton::Layer),
            (self.edit, ActionButton::EditText),
            (self.rotate, ActionButton::Rotate),
            (self.delete, ActionButton::Delete),
        ]
        .into_iter()
        .find_map(|(bounds, button)| {
            bounds
                .filter(|bounds| bounds.contains(point, padding))
                .map(|_| button)
        })
    }
}

/// What a ghost preview stands for.
#[derive(Clone, Debug, PartialEq)]
pub enum GhostKind {
    /// Hovered tile of a paint tool, possibly one tile beyond the grid edge.
    TileBorder,
    /// New furniture pending placement.
    Furniture {
        /// Kind pending placement.
        kind: FurnitureKind,
        /// Orientation pending placement.
        rotation: Rotation,
        /// Label configuration pending placement.
        text: Option<PixelTextConfig>,
    },
    /// Existing furniture being dragged.
    Move {
        /// Identifier of the dragged item.
        uid: FurnitureUid,
        /// Kind of the dragged item.
        kind: FurnitureKind,
    },
}

/// Transient, non-committed preview of a pending edit.
#[derive(Clone, Debug, PartialEq)]
pub struct GhostPreview {
    /// What the ghost stands for.
    pub kind: GhostKind,
    /// Region the ghost covers.
    pub region: CellRect,
    /// Whether committing the edit here would succeed.
    pub valid: bool,
}

/// Highlight drawn around the selected furniture item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelectionHighlight {
    /// Identifier of the selected item.
    pub uid: FurnitureUid,
    /// Region covered by the item.
    pub region: CellRect,
    /// Whether the rotate button should be offered.
    pub rotatable: bool,
    /// Whether the label editor button should be offered.
    pub editable_text: bool,
    /// Stacking layer shown on the layer button.
    pub z_layer: i32,
}
