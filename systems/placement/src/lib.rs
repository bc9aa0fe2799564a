#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure placement rules deciding whether furniture may occupy a footprint.
//!
//! The validator never mutates the layout and keeps no caches, so editors may
//! call it on every pointer move and always observe the current layout.

use pixel_office_core::{
    CellCoord, CellRect, FurnitureKind, FurnitureUid, LayoutView, Mounting, PixelTextConfig,
    PlacementError, Rotation, TileType,
};

/// Describes a furniture item that should be validated at a given anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacementRequest<'a> {
    /// Kind of the furniture item.
    pub kind: FurnitureKind,
    /// Top-left anchor tile of the footprint.
    pub origin: CellCoord,
    /// Orientation of the item.
    pub rotation: Rotation,
    /// Label configuration for pixel-text furniture.
    pub text: Option<&'a PixelTextConfig>,
    /// Existing item ignored by the overlap rule, used while dragging it.
    pub exclude: Option<FurnitureUid>,
}

impl<'a> PlacementRequest<'a> {
    /// Creates a request in the default orientation without exclusions.
    #[must_use]
    pub const fn new(kind: FurnitureKind, origin: CellCoord) -> Self {
        Self {
            kind,
            origin,
            rotation: Rotation::Down,
            text: None,
            exclude: None,
        }
    }

    /// Overrides the orientation.
    #[must_use]
    pub const fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Attaches a label configuration.
    #[must_use]
    pub const fn with_text(mut self, text: Option<&'a PixelTextConfig>) -> Self {
        self.text = text;
        self
    }

    /// Ignores the provided item when checking overlaps.
    #[must_use]
    pub const fn excluding(mut self, uid: FurnitureUid) -> Self {
        self.exclude = Some(uid);
        self
    }

    /// Region the request would cover.
    #[must_use]
    pub fn region(&self) -> CellRect {
        let size = self
            .kind
            .catalog_entry()
            .effective_footprint(self.rotation, self.text);
        CellRect::from_origin_and_size(self.origin, size)
    }
}

/// Validates a placement request and returns the region it would cover.
///
/// Rules are evaluated in order: footprint resolution, bounds and void
/// tiles, wall mounting, then overlap with existing furniture.
pub fn check_placement(
    layout: &LayoutView<'_>,
    request: &PlacementRequest<'_>,
) -> Result<CellRect, PlacementError> {
    let entry = request.kind.catalog_entry();
    let region = request.region();

    for cell in region.cells() {
        match layout.tile(cell) {
            None => return Err(PlacementError::OutOfBounds),
            Some(TileType::Void) => return Err(PlacementError::VoidTile),
            Some(_) => {}
        }
    }

    match entry.mounting {
        Mounting::Wall => {
            let on_wall = region
                .bottom_row_cells()
                .all(|cell| layout.tile(cell) == Some(TileType::Wall));
            if !on_wall {
                return Err(PlacementError::WallRequired);
            }
        }
        Mounting::Floor => {
            if region
                .cells()
                .any(|cell| layout.tile(cell) == Some(TileType::Wall))
            {
                return Err(PlacementError::WallBlocked);
            }
        }
        Mounting::Anywhere => {}
    }

    for existing in layout.furniture() {
        if Some(existing.uid) == request.exclude {
            continue;
        }
        if !existing.footprint().intersects(&region) {
            continue;
        }

        let stacks = entry.surface_item && existing.kind.catalog_entry().hosts_surface_items;
        if !stacks {
            return Err(PlacementError::Occupied);
        }
    }

    Ok(region)
}

/// Reports whether the request satisfies every placement rule.
#[must_use]
pub fn can_place(layout: &LayoutView<'_>, request: &PlacementRequest<'_>) -> bool {
    check_placement(layout, request).is_ok()
}

/// Anchor row used when the pointer hovers `row`.
///
/// Wall-mounted kinds snap so the bottom row of their footprint sits on the
/// hovered row; every other kind anchors at the hovered row itself.
#[must_use]
pub fn wall_placement_row(
    kind: FurnitureKind,
    rotation: Rotation,
    text: Option<&PixelTextConfig>,
    row: i32,
) -> i32 {
    let entry = kind.catalog_entry();
    if !entry.wall_mounted() {
        return row;
    }

    let height = entry.effective_footprint(rotation, text).height();
    let lift = i32::try_from(height.saturating_sub(1)).unwrap_or(0);
    row.saturating_sub(lift)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixel_office_core::{FurnitureRecord, LayoutSnapshot};

    fn floor_layout(columns: u32, rows: u32) -> LayoutSnapshot {
        LayoutSnapshot::filled(columns, rows, TileType::FLOOR)
    }

    fn with_item(
        layout: &mut LayoutSnapshot,
        uid: u32,
        kind: FurnitureKind,
        column: i32,
        row: i32,
    ) -> FurnitureUid {
        let uid = FurnitureUid::new(uid);
        layout
            .furniture
            .push(FurnitureRecord::new(uid, kind, CellCoord::new(column, row)));
        uid
    }

    #[test]
    fn footprint_must_stay_inside_grid() {
        let layout = floor_layout(4, 4);
        let request = PlacementRequest::new(FurnitureKind::Desk, CellCoord::new(3, 0));
        assert_eq!(
            check_placement(&layout.view(), &request),
            Err(PlacementError::OutOfBounds)
        );

        let ghost = PlacementRequest::new(FurnitureKind::Plant, CellCoord::new(-1, 2));
        assert_eq!(
            check_placement(&layout.view(), &ghost),
            Err(PlacementError::OutOfBounds)
        );
    }

    #[test]
    fn void_tiles_reject_every_kind() {
        let mut layout = floor_layout(4, 4);
        layout.tiles[5] = TileType::Void;
        for kind in FurnitureKind::ALL {
            let request = PlacementRequest::new(kind, CellCoord::new(1, 1));
            assert!(
                !can_place(&layout.view(), &request),
                "{kind:?} accepted a void tile"
            );
        }
    }

    #[test]
    fn floor_items_cannot_cover_walls() {
        let mut layout = floor_layout(4, 4);
        layout.tiles[0] = TileType::Wall;
        let request = PlacementRequest::new(FurnitureKind::Plant, CellCoord::new(0, 0));
        assert_eq!(
            check_placement(&layout.view(), &request),
            Err(PlacementError::WallBlocked)
        );
    }

    #[test]
    fn wall_items_require_wall_under_bottom_row() {
        // Row 1 is the wall line; the 2x2 board hangs from row 0 down onto it.
        let mut layout = floor_layout(4, 4);
        layout.tiles[4] = TileType::Wall;
        layout.tiles[5] = TileType::Wall;

        let board = PlacementRequest::new(FurnitureKind::Whiteboard, CellCoord::new(0, 0));
        assert!(can_place(&layout.view(), &board));

        let half_on_wall = PlacementRequest::new(FurnitureKind::Whiteboard, CellCoord::new(1, 0));
        assert_eq!(
            check_placement(&layout.view(), &half_on_wall),
            Err(PlacementError::WallRequired)
        );
    }

    #[test]
    fn labels_accept_walls_and_floors() {
        let mut layout = floor_layout(4, 4);
        layout.tiles[0] = TileType::Wall;
        let text = PixelTextConfig::new("HI");
        let request = PlacementRequest::new(FurnitureKind::PixelText, CellCoord::new(0, 0))
            .with_text(Some(&text));
        assert!(can_place(&layout.view(), &request));
    }

    #[test]
    fn surface_items_stack_only_on_hosts() {
        let mut layout = floor_layout(6, 6);
        let _ = with_item(&mut layout, 1, FurnitureKind::Desk, 1, 1);
        let _ = with_item(&mut layout, 2, FurnitureKind::Sofa, 4, 4);

        let on_desk = PlacementRequest::new(FurnitureKind::Pc, CellCoord::new(2, 2));
        assert!(can_place(&layout.view(), &on_desk));

        let on_sofa = PlacementRequest::new(FurnitureKind::Lamp, CellCoord::new(4, 4));
        assert_eq!(
            check_placement(&layout.view(), &on_sofa),
            Err(PlacementError::Occupied)
        );

        let desk_on_desk = PlacementRequest::new(FurnitureKind::Desk, CellCoord::new(2, 2));
        assert!(!can_place(&layout.view(), &desk_on_desk));
    }

    #[test]
    fn excluded_item_does_not_block_itself() {
        let mut layout = floor_layout(6, 6);
        let uid = with_item(&mut layout, 1, FurnitureKind::Desk, 1, 1);

        let shifted = PlacementRequest::new(FurnitureKind::Desk, CellCoord::new(2, 1));
        assert!(!can_place(&layout.view(), &shifted));
        assert!(can_place(&layout.view(), &shifted.excluding(uid)));
    }

    #[test]
    fn rotation_changes_validated_footprint() {
        let layout = floor_layout(3, 3);
        let sofa = PlacementRequest::new(FurnitureKind::Sofa, CellCoord::new(2, 0));
        assert!(!can_place(&layout.view(), &sofa));
        assert!(can_place(
            &layout.view(),
            &sofa.with_rotation(Rotation::Left)
        ));
    }

    #[test]
    fn wall_items_snap_to_hovered_row() {
        assert_eq!(
            wall_placement_row(FurnitureKind::Painting, Rotation::Down, None, 4),
            4
        );
        assert_eq!(
            wall_placement_row(FurnitureKind::Whiteboard, Rotation::Down, None, 4),
            3
        );
        assert_eq!(
            wall_placement_row(FurnitureKind::Bookshelf, Rotation::Down, None, 4),
            4,
            "floor items anchor at the hovered row"
        );
    }
}
