//! Tile layout contracts: tile types, furniture records and the load/save snapshot.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{CellCoord, CellRect, FurnitureKind, FurnitureUid, PixelTextConfig, Rotation};

/// Version tag written into every [`LayoutSnapshot`].
pub const LAYOUT_VERSION: u32 = 1;

/// Numeric code of the wall tile.
const WALL_CODE: u8 = 0;
/// Numeric code of the void tile.
const VOID_CODE: u8 = 8;

/// Floor texture pattern index in `1..=FloorPattern::COUNT`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FloorPattern(u8);

impl FloorPattern {
    /// Number of floor patterns shipped with the tile set.
    pub const COUNT: u8 = 7;

    /// Pattern used when a tool needs a floor and none was chosen.
    pub const DEFAULT: FloorPattern = FloorPattern(1);

    /// Creates a pattern, rejecting indices outside `1..=COUNT`.
    #[must_use]
    pub const fn new(index: u8) -> Option<Self> {
        if index >= 1 && index <= Self::COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Numeric pattern index.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }
}

/// Kind of a single grid tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TileType {
    /// Wall tile; wall-mounted furniture anchors here.
    Wall,
    /// Walkable floor using the given texture pattern.
    Floor(FloorPattern),
    /// Empty space outside the office; unwalkable and unplaceable.
    Void,
}

impl TileType {
    /// Default floor tile.
    pub const FLOOR: TileType = TileType::Floor(FloorPattern::DEFAULT);

    /// Numeric code used by the layout file format.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Wall => WALL_CODE,
            Self::Floor(pattern) => pattern.get(),
            Self::Void => VOID_CODE,
        }
    }

    /// Reports whether the tile is a floor tile.
    #[must_use]
    pub const fn is_floor(self) -> bool {
        matches!(self, Self::Floor(_))
    }
}

impl TryFrom<u8> for TileType {
    type Error = UnknownTileCode;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            WALL_CODE => Ok(Self::Wall),
            VOID_CODE => Ok(Self::Void),
            other => FloorPattern::new(other)
                .map(Self::Floor)
                .ok_or(UnknownTileCode(other)),
        }
    }
}

impl From<TileType> for u8 {
    fn from(tile: TileType) -> Self {
        tile.code()
    }
}

/// Raised when a layout file contains a tile code outside the known range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("unknown tile code {0}")]
pub struct UnknownTileCode(pub u8);

/// Per-tile floor colour adjustment applied on top of the floor pattern.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FloorColor {
    /// Hue rotation in degrees.
    #[serde(rename = "h")]
    pub hue: f32,
    /// Saturation adjustment in percent.
    #[serde(rename = "s")]
    pub saturation: f32,
    /// Brightness adjustment in percent.
    #[serde(rename = "b")]
    pub brightness: f32,
    /// Contrast adjustment in percent.
    #[serde(rename = "c")]
    pub contrast: f32,
    /// Whether the hue replaces rather than rotates the source colours.
    #[serde(default)]
    pub colorize: bool,
}

/// Committed furniture instance as stored in the layout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FurnitureRecord {
    /// Stable identifier assigned at creation.
    pub uid: FurnitureUid,
    /// Catalog kind of the instance.
    pub kind: FurnitureKind,
    /// Top-left anchor tile of the footprint.
    pub origin: CellCoord,
    /// Orientation; ignored by non-rotatable kinds.
    #[serde(default)]
    pub rotation: Rotation,
    /// Stacking order used to disambiguate overlapping sprites.
    #[serde(default)]
    pub z_layer: i32,
    /// Label configuration, present only on pixel-text furniture.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<PixelTextConfig>,
}

impl FurnitureRecord {
    /// Creates a record in the default orientation on layer zero.
    #[must_use]
    pub fn new(uid: FurnitureUid, kind: FurnitureKind, origin: CellCoord) -> Self {
        Self {
            uid,
            kind,
            origin,
            rotation: Rotation::default(),
            z_layer: 0,
            text: None,
        }
    }

    /// Attaches a label configuration.
    #[must_use]
    pub fn with_text(mut self, text: PixelTextConfig) -> Self {
        self.text = Some(text);
        self
    }

    /// Overrides the orientation.
    #[must_use]
    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Region covered by the effective footprint.
    #[must_use]
    pub fn footprint(&self) -> CellRect {
        let size = self
            .kind
            .catalog_entry()
            .effective_footprint(self.rotation, self.text.as_ref());
        CellRect::from_origin_and_size(self.origin, size)
    }
}

/// Complete, self-contained description of an office layout.
///
/// This is the by-value contract used to load, replace, persist and restore
/// the world; it never references live world state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    /// Format version, see [`LAYOUT_VERSION`].
    pub version: u32,
    /// Number of tile columns.
    #[serde(rename = "cols")]
    pub columns: u32,
    /// Number of tile rows.
    pub rows: u32,
    /// Row-major tile types, `columns * rows` entries.
    pub tiles: Vec<TileType>,
    /// Row-major sparse colour overrides; empty or `columns * rows` entries.
    #[serde(default)]
    pub tile_colors: Vec<Option<FloorColor>>,
    /// Committed furniture.
    #[serde(default)]
    pub furniture: Vec<FurnitureRecord>,
}

impl LayoutSnapshot {
    /// Creates a layout filled with a single tile type and no furniture.
    #[must_use]
    pub fn filled(columns: u32, rows: u32, tile: TileType) -> Self {
        let count = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        Self {
            version: LAYOUT_VERSION,
            columns,
            rows,
            tiles: vec![tile; count],
            tile_colors: Vec::new(),
            furniture: Vec::new(),
        }
    }

    /// Checks the structural invariants that must hold before a layout becomes active.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.version != LAYOUT_VERSION {
            return Err(LayoutError::UnsupportedVersion {
                version: self.version,
            });
        }
        if self.columns == 0 || self.rows == 0 {
            return Err(LayoutError::EmptyGrid {
                columns: self.columns,
                rows: self.rows,
            });
        }

        let expected = usize::try_from(u64::from(self.columns) * u64::from(self.rows))
            .map_err(|_| LayoutError::EmptyGrid {
                columns: self.columns,
                rows: self.rows,
            })?;
        if self.tiles.len() != expected {
            return Err(LayoutError::TileCountMismatch {
                expected,
                actual: self.tiles.len(),
            });
        }
        if !self.tile_colors.is_empty() && self.tile_colors.len() != expected {
            return Err(LayoutError::ColorCountMismatch {
                expected,
                actual: self.tile_colors.len(),
            });
        }

        let mut seen = HashSet::with_capacity(self.furniture.len());
        for item in &self.furniture {
            if !seen.insert(item.uid) {
                return Err(LayoutError::DuplicateFurnitureUid { uid: item.uid });
            }
        }

        Ok(())
    }

    /// Read-only view used by placement validation.
    #[must_use]
    pub fn view(&self) -> LayoutView<'_> {
        LayoutView::new(self.columns, self.rows, &self.tiles, &self.furniture)
    }
}

/// Structural problems that prevent an inbound layout from becoming active.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// The snapshot was written by an unknown format version.
    #[error("layout version {version} is not supported")]
    UnsupportedVersion {
        /// Version found in the snapshot.
        version: u32,
    },
    /// The grid has no tiles.
    #[error("layout grid {columns}x{rows} has no tiles")]
    EmptyGrid {
        /// Declared column count.
        columns: u32,
        /// Declared row count.
        rows: u32,
    },
    /// `tiles.len()` differs from `columns * rows`.
    #[error("layout declares {expected} tiles but contains {actual}")]
    TileCountMismatch {
        /// Tile count implied by the dimensions.
        expected: usize,
        /// Tile count found in the snapshot.
        actual: usize,
    },
    /// `tile_colors` is neither empty nor one entry per tile.
    #[error("layout declares {expected} tiles but carries {actual} colour entries")]
    ColorCountMismatch {
        /// Tile count implied by the dimensions.
        expected: usize,
        /// Colour entry count found in the snapshot.
        actual: usize,
    },
    /// Two furniture records share a uid.
    #[error("furniture uid {} appears more than once", .uid.get())]
    DuplicateFurnitureUid {
        /// Uid found twice.
        uid: FurnitureUid,
    },
}

/// Read-only view over a tile grid and its furniture.
#[derive(Clone, Copy, Debug)]
pub struct LayoutView<'a> {
    columns: u32,
    rows: u32,
    tiles: &'a [TileType],
    furniture: &'a [FurnitureRecord],
}

impl<'a> LayoutView<'a> {
    /// Captures a view over the provided row-major tiles and furniture.
    #[must_use]
    pub fn new(
        columns: u32,
        rows: u32,
        tiles: &'a [TileType],
        furniture: &'a [FurnitureRecord],
    ) -> Self {
        Self {
            columns,
            rows,
            tiles,
            furniture,
        }
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Reports whether the cell lies inside `[0, columns) × [0, rows)`.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        cell.in_bounds(self.columns, self.rows)
    }

    /// Row-major index of the cell, if in bounds.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        cell.index(self.columns, self.rows)
    }

    /// Tile type at the cell, if in bounds.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> Option<TileType> {
        self.index(cell)
            .and_then(|index| self.tiles.get(index).copied())
    }

    /// All row-major tiles.
    #[must_use]
    pub fn tiles(&self) -> &'a [TileType] {
        self.tiles
    }

    /// Committed furniture in registry order.
    #[must_use]
    pub fn furniture(&self) -> &'a [FurnitureRecord] {
        self.furniture
    }

    /// Looks up a furniture record by uid.
    #[must_use]
    pub fn furniture_by_uid(&self, uid: FurnitureUid) -> Option<&'a FurnitureRecord> {
        self.furniture.iter().find(|item| item.uid == uid)
    }

    /// Furniture whose footprint covers the cell, in registry order.
    pub fn furniture_covering(
        &self,
        cell: CellCoord,
    ) -> impl Iterator<Item = &'a FurnitureRecord> + 'a {
        self.furniture
            .iter()
            .filter(move |item| item.footprint().contains(cell))
    }
}
