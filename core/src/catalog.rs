//! Static furniture catalog and pixel-text footprint measurement.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{CellRectSize, Direction, TILE_SIZE};

/// Kinds of furniture that can be placed in the office.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FurnitureKind {
    /// Work desk that hosts surface items.
    Desk,
    /// Tall bookshelf standing on the floor.
    Bookshelf,
    /// Potted plant.
    Plant,
    /// Water cooler.
    Cooler,
    /// Whiteboard hung on a wall.
    Whiteboard,
    /// Framed painting hung on a wall.
    Painting,
    /// Wall clock.
    Clock,
    /// Office chair. Every chair doubles as a seat.
    Chair,
    /// Desktop computer placed on a desk.
    Pc,
    /// Desk lamp placed on a desk.
    Lamp,
    /// Two-tile sofa.
    Sofa,
    /// Free-form pixel-text label whose footprint depends on its text.
    PixelText,
}

impl FurnitureKind {
    /// Every furniture kind in catalog order.
    pub const ALL: [FurnitureKind; 12] = [
        Self::Desk,
        Self::Bookshelf,
        Self::Plant,
        Self::Cooler,
        Self::Whiteboard,
        Self::Painting,
        Self::Clock,
        Self::Chair,
        Self::Pc,
        Self::Lamp,
        Self::Sofa,
        Self::PixelText,
    ];

    /// Static catalog entry describing the kind.
    #[must_use]
    pub const fn catalog_entry(self) -> CatalogEntry {
        match self {
            Self::Desk => CatalogEntry::floor(self, 2, 2, "desk").hosting_surface_items(),
            Self::Bookshelf => CatalogEntry::floor(self, 1, 2, "bookshelf"),
            Self::Plant => CatalogEntry::floor(self, 1, 1, "plant"),
            Self::Cooler => CatalogEntry::floor(self, 1, 1, "cooler"),
            Self::Whiteboard => CatalogEntry::wall(self, 2, 2, "whiteboard"),
            Self::Painting => CatalogEntry::wall(self, 1, 1, "painting"),
            Self::Clock => CatalogEntry::wall(self, 1, 1, "clock"),
            Self::Chair => CatalogEntry::floor(self, 1, 1, "chair").rotatable().seat(),
            Self::Pc => CatalogEntry::floor(self, 1, 1, "pc")
                .rotatable()
                .surface_item(),
            Self::Lamp => CatalogEntry::floor(self, 1, 1, "lamp").surface_item(),
            Self::Sofa => CatalogEntry::floor(self, 2, 1, "sofa").rotatable(),
            Self::PixelText => CatalogEntry {
                mounting: Mounting::Anywhere,
                ..CatalogEntry::floor(self, 1, 1, "pixel_text")
            },
        }
    }

    /// Reports whether the kind is a pixel-text label.
    #[must_use]
    pub const fn is_label(self) -> bool {
        matches!(self, Self::PixelText)
    }
}

/// Opaque reference to a sprite owned by the external asset pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SpriteKey(&'static str);

impl SpriteKey {
    /// Name the asset pipeline registers the sprite under.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.0
    }
}

/// Where a furniture kind may be anchored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mounting {
    /// Stands on floor tiles and may not cover walls.
    Floor,
    /// Hangs on the wall line; its bottom row must sit on wall tiles.
    Wall,
    /// May cover any non-void tile.
    Anywhere,
}

/// Static description of a furniture kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Kind described by the entry.
    pub kind: FurnitureKind,
    /// Footprint in the default orientation.
    pub footprint: CellRectSize,
    /// Anchoring rule for the kind.
    pub mounting: Mounting,
    /// Whether the kind can be rotated.
    pub rotatable: bool,
    /// Whether surface items may be stacked on top of the kind.
    pub hosts_surface_items: bool,
    /// Whether the kind is a surface item that may sit on a host.
    pub surface_item: bool,
    /// Whether every instance of the kind provides a seat.
    pub seat: bool,
    /// Base sprite of the kind.
    pub sprite: SpriteKey,
}

impl CatalogEntry {
    const fn floor(kind: FurnitureKind, width: u32, height: u32, sprite: &'static str) -> Self {
        Self {
            kind,
            footprint: CellRectSize::new(width, height),
            mounting: Mounting::Floor,
            rotatable: false,
            hosts_surface_items: false,
            surface_item: false,
            seat: false,
            sprite: SpriteKey(sprite),
        }
    }

    const fn wall(kind: FurnitureKind, width: u32, height: u32, sprite: &'static str) -> Self {
        Self {
            mounting: Mounting::Wall,
            ..Self::floor(kind, width, height, sprite)
        }
    }

    const fn rotatable(self) -> Self {
        Self {
            rotatable: true,
            ..self
        }
    }

    const fn hosting_surface_items(self) -> Self {
        Self {
            hosts_surface_items: true,
            ..self
        }
    }

    const fn surface_item(self) -> Self {
        Self {
            surface_item: true,
            ..self
        }
    }

    const fn seat(self) -> Self {
        Self { seat: true, ..self }
    }

    /// Reports whether the kind must hang on a wall.
    #[must_use]
    pub const fn wall_mounted(&self) -> bool {
        matches!(self.mounting, Mounting::Wall)
    }

    /// Reports whether instances of the kind stop characters from walking through.
    ///
    /// Surface items, labels and wall-mounted items never block; seats block
    /// everyone except their assigned occupant.
    #[must_use]
    pub const fn blocks_walking(&self) -> bool {
        matches!(self.mounting, Mounting::Floor) && !self.surface_item
    }

    /// Footprint after applying rotation and, for labels, the text measurement.
    #[must_use]
    pub fn effective_footprint(
        &self,
        rotation: Rotation,
        text: Option<&PixelTextConfig>,
    ) -> CellRectSize {
        if self.kind.is_label() {
            return text.map_or(CellRectSize::new(1, 1), PixelTextConfig::footprint);
        }

        if self.rotatable && rotation.is_quarter_turn() {
            CellRectSize::new(self.footprint.height(), self.footprint.width())
        } else {
            self.footprint
        }
    }
}

/// Discrete orientation of rotatable furniture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rotation {
    /// Front faces toward increasing rows.
    #[default]
    Down,
    /// Front faces toward decreasing columns.
    Left,
    /// Front faces toward decreasing rows.
    Up,
    /// Front faces toward increasing columns.
    Right,
}

impl Rotation {
    /// Next orientation in the clockwise cycle.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Down => Self::Left,
            Self::Left => Self::Up,
            Self::Up => Self::Right,
            Self::Right => Self::Down,
        }
    }

    /// Whether the orientation swaps footprint width and height.
    #[must_use]
    pub const fn is_quarter_turn(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    /// Direction a character sitting on furniture with this orientation faces.
    #[must_use]
    pub const fn facing(self) -> Direction {
        match self {
            Self::Down => Direction::South,
            Self::Left => Direction::West,
            Self::Up => Direction::North,
            Self::Right => Direction::East,
        }
    }
}

/// Bitmap font used to render pixel-text labels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelFont {
    /// 3×5 pixel glyphs.
    #[default]
    #[serde(rename = "3x5")]
    Small,
    /// 5×7 pixel glyphs.
    #[serde(rename = "5x7")]
    Large,
}

impl PixelFont {
    /// Base glyph cell measurements of the font.
    #[must_use]
    pub const fn metrics(self) -> GlyphMetrics {
        match self {
            Self::Small => GlyphMetrics {
                glyph_width: 3,
                glyph_height: 5,
                spacing: 1,
            },
            Self::Large => GlyphMetrics {
                glyph_width: 5,
                glyph_height: 7,
                spacing: 1,
            },
        }
    }
}

/// Unscaled glyph measurements of a [`PixelFont`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlyphMetrics {
    /// Width of a single glyph in pixels.
    pub glyph_width: u32,
    /// Height of a single glyph in pixels.
    pub glyph_height: u32,
    /// Horizontal gap between adjacent glyphs in pixels.
    pub spacing: u32,
}

/// Largest pixel scale accepted for labels.
pub const MAX_PIXEL_SCALE: u8 = 5;

/// Text, font, scale and colour of a pixel-text label.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelTextConfig {
    /// Text rendered by the label.
    pub text: String,
    /// Font used for the glyphs.
    #[serde(default)]
    pub font: PixelFont,
    /// Integer magnification applied to every glyph pixel.
    #[serde(default = "default_pixel_scale")]
    pub pixel_scale: u8,
    /// Colour of the glyph pixels.
    #[serde(default)]
    pub color: TextColor,
}

fn default_pixel_scale() -> u8 {
    1
}

impl PixelTextConfig {
    /// Creates a label configuration with the default font, scale and colour.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font: PixelFont::default(),
            pixel_scale: default_pixel_scale(),
            color: TextColor::default(),
        }
    }

    /// Overrides the font.
    #[must_use]
    pub fn with_font(mut self, font: PixelFont) -> Self {
        self.font = font;
        self
    }

    /// Overrides the pixel scale, clamped to `1..=MAX_PIXEL_SCALE`.
    #[must_use]
    pub fn with_pixel_scale(mut self, pixel_scale: u8) -> Self {
        self.pixel_scale = pixel_scale.clamp(1, MAX_PIXEL_SCALE);
        self
    }

    /// Overrides the colour.
    #[must_use]
    pub fn with_color(mut self, color: TextColor) -> Self {
        self.color = color;
        self
    }

    /// Size of the rendered text in world pixels, before tile rounding.
    #[must_use]
    pub fn pixel_size(&self) -> (u32, u32) {
        let glyphs = u32::try_from(self.text.to_uppercase().chars().count()).unwrap_or(u32::MAX);
        if glyphs == 0 {
            return (0, 0);
        }

        let metrics = self.font.metrics();
        let scale = u32::from(self.pixel_scale.max(1));
        let base_width = glyphs
            .saturating_mul(metrics.glyph_width)
            .saturating_add((glyphs - 1).saturating_mul(metrics.spacing));
        (
            base_width.saturating_mul(scale),
            metrics.glyph_height.saturating_mul(scale),
        )
    }

    /// Footprint of the label in whole tiles, never smaller than 1×1.
    #[must_use]
    pub fn footprint(&self) -> CellRectSize {
        let (width, height) = self.pixel_size();
        CellRectSize::new(
            width.div_ceil(TILE_SIZE).max(1),
            height.div_ceil(TILE_SIZE).max(1),
        )
    }
}

/// Opaque RGB colour serialised as `#RRGGBB`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TextColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl Default for TextColor {
    fn default() -> Self {
        Self::from_rgb(0xff, 0xff, 0xff)
    }
}

impl TextColor {
    /// Creates a colour from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Parses a `#RRGGBB` hex string.
    pub fn parse_hex(value: &str) -> Result<Self, ColorParseError> {
        let digits = value
            .strip_prefix('#')
            .filter(|digits| digits.len() == 6 && digits.is_ascii())
            .ok_or_else(|| ColorParseError(value.to_owned()))?;
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|_| ColorParseError(value.to_owned()))
        };
        Ok(Self::from_rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Red component of the colour.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the colour.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the colour.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

impl TryFrom<String> for TextColor {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_hex(&value)
    }
}

impl From<TextColor> for String {
    fn from(color: TextColor) -> Self {
        format!("#{:02X}{:02X}{:02X}", color.red, color.green, color.blue)
    }
}

/// Raised when a label colour is not a `#RRGGBB` string.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("`{0}` is not a #RRGGBB colour")]
pub struct ColorParseError(String);
