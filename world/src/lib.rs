#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative office state: tile layout, furniture, seats and characters.

mod characters;
mod seats;

use std::{collections::BTreeMap, time::Duration};

use pixel_office_core::{
    ActivityStatus, AgentId, CellCoord, Command, Event, FloorColor, FurnitureKind, FurnitureRecord,
    FurnitureUid, HueShift, LayoutSnapshot, LayoutView, MotionState, Palette, PixelTextConfig,
    PlacementError, Rotation, SeatId, TileEditError, TileType,
};
use pixel_office_system_movement::{closest_walkable, plan_path};
use pixel_office_system_placement::{check_placement, PlacementRequest};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;
use tracing::{debug, info, warn};

use characters::{least_used_palette, Character};
use seats::{carry_over, derive_seats, Seat};

const DEFAULT_COLUMNS: u32 = 20;
const DEFAULT_ROWS: u32 = 11;
const DEFAULT_WALK_SPEED: f32 = 48.0;
const DEFAULT_WALK_FRAME_SECONDS: f32 = 0.15;
const DEFAULT_SEED: u64 = 0x5eed_0ff1_ce00_0001;
const DEFAULT_LABEL_TEXT: &str = "TEXT";
const HUE_SHIFT_MIN: i16 = 45;
const HUE_SHIFT_MAX: i16 = 315;

/// Tunables of the character simulation.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Walking speed in world pixels per second.
    pub walk_speed: f32,
    /// Seconds each walk-cycle frame is shown.
    pub walk_frame_seconds: f32,
    /// Seed of the generator used for hue shifts.
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            walk_speed: DEFAULT_WALK_SPEED,
            walk_frame_seconds: DEFAULT_WALK_FRAME_SECONDS,
            seed: DEFAULT_SEED,
        }
    }
}

impl SimulationConfig {
    /// Duration each walk-cycle frame is shown.
    #[must_use]
    pub fn walk_frame_duration(&self) -> Duration {
        Duration::try_from_secs_f32(self.walk_frame_seconds)
            .unwrap_or_else(|_| Duration::from_secs_f32(DEFAULT_WALK_FRAME_SECONDS))
    }
}

/// Layout used until a real one is loaded: a wall row above open floor.
#[must_use]
pub fn default_layout() -> LayoutSnapshot {
    let mut layout = LayoutSnapshot::filled(DEFAULT_COLUMNS, DEFAULT_ROWS, TileType::FLOOR);
    for tile in layout.tiles.iter_mut().take(DEFAULT_COLUMNS as usize) {
        *tile = TileType::Wall;
    }
    layout
}

/// Represents the authoritative office world state.
#[derive(Debug)]
pub struct World {
    columns: u32,
    rows: u32,
    tiles: Vec<TileType>,
    tile_colors: Vec<Option<FloorColor>>,
    furniture: Vec<FurnitureRecord>,
    next_uid: u32,
    seats: BTreeMap<SeatId, Seat>,
    characters: BTreeMap<AgentId, Character>,
    config: SimulationConfig,
    rng: ChaCha8Rng,
}

impl World {
    /// Creates a world with the default layout and simulation tunables.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(SimulationConfig::default())
    }

    /// Creates a world with the default layout and the provided tunables.
    #[must_use]
    pub fn with_config(config: SimulationConfig) -> Self {
        let mut world = Self {
            columns: 0,
            rows: 0,
            tiles: Vec::new(),
            tile_colors: Vec::new(),
            furniture: Vec::new(),
            next_uid: 1,
            seats: BTreeMap::new(),
            characters: BTreeMap::new(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
        };
        let mut events = Vec::new();
        world.install_layout(default_layout(), &mut events);
        world
    }

    fn view(&self) -> LayoutView<'_> {
        LayoutView::new(self.columns, self.rows, &self.tiles, &self.furniture)
    }

    fn install_layout(&mut self, layout: LayoutSnapshot, out_events: &mut Vec<Event>) {
        let tile_count = layout.tiles.len();
        self.columns = layout.columns;
        self.rows = layout.rows;
        self.tiles = layout.tiles;
        self.tile_colors = if layout.tile_colors.is_empty() {
            vec![None; tile_count]
        } else {
            layout.tile_colors
        };
        self.furniture = layout.furniture;
        let highest = self
            .furniture
            .iter()
            .map(|item| item.uid.get())
            .max()
            .unwrap_or(0);
        self.next_uid = self.next_uid.max(highest.saturating_add(1));
        self.sync_seats(out_events);

        let mask = self.walk_mask(None);
        let (columns, rows) = (self.columns, self.rows);
        for character in self.characters.values_mut() {
            if character.motion == MotionState::Seated {
                continue;
            }
            character.stand();
            if mask_allows(&mask, character.cell, columns, rows) {
                continue;
            }
            let anchor = character.cell;
            let cell = closest_walkable(anchor, columns, rows, |cell| {
                mask_allows(&mask, cell, columns, rows)
            })
            .unwrap_or(CellCoord::new(0, 0));
            character.teleport(cell);
        }
    }

    fn allocate_uid(&mut self) -> FurnitureUid {
        let uid = FurnitureUid::new(self.next_uid);
        self.next_uid = self.next_uid.saturating_add(1);
        uid
    }

    /// Walkability per tile; the excepted seat stays walkable for its occupant.
    fn walk_mask(&self, seat_exception: Option<SeatId>) -> Vec<bool> {
        let mut mask: Vec<bool> = self.tiles.iter().map(|tile| tile.is_floor()).collect();
        for item in &self.furniture {
            if !item.kind.catalog_entry().blocks_walking() {
                continue;
            }
            if seat_exception == Some(SeatId::from(item.uid)) {
                continue;
            }
            for cell in item.footprint().cells() {
                if let Some(slot) = cell
                    .index(self.columns, self.rows)
                    .and_then(|index| mask.get_mut(index))
                {
                    *slot = false;
                }
            }
        }
        mask
    }

    /// Re-derives seats from the furniture, keeping assignments of surviving seats.
    fn sync_seats(&mut self, out_events: &mut Vec<Event>) {
        let mut next = derive_seats(&self.furniture);
        let released = carry_over(&self.seats, &mut next);
        self.seats = next;

        for (seat, occupant) in released {
            if let Some(character) = self.characters.get_mut(&occupant) {
                character.seat = None;
            }
            debug!(seat = seat.get(), agent = occupant.get(), "seat removed");
            out_events.push(Event::SeatReleased { seat, occupant });
        }

        for character in self.characters.values_mut() {
            if character.motion != MotionState::Seated {
                continue;
            }
            match character.seat.and_then(|id| self.seats.get(&id)) {
                Some(seat) if seat.cell == character.cell => character.facing = seat.facing,
                _ => character.stand(),
            }
        }
    }

    fn spawn(
        &mut self,
        id: AgentId,
        parent: Option<AgentId>,
        label: Option<String>,
        palette: Option<Palette>,
        hue_shift: Option<HueShift>,
        seat: Option<SeatId>,
        out_events: &mut Vec<Event>,
    ) {
        if self.characters.contains_key(&id) {
            debug!(agent = id.get(), "character already present");
            return;
        }

        let parent_state = parent
            .and_then(|parent| self.characters.get(&parent))
            .map(|character| (character.cell, character.palette, character.hue_shift));

        let (palette, hue_shift) = match (palette, parent_state) {
            (Some(palette), _) => (palette, hue_shift.unwrap_or(HueShift::NONE)),
            (None, Some((_, palette, inherited))) => (palette, hue_shift.unwrap_or(inherited)),
            (None, None) => {
                let (palette, saturated) = least_used_palette(
                    self.characters
                        .values()
                        .filter(|character| !character.is_sub_agent())
                        .map(|character| character.palette),
                );
                let hue_shift = match hue_shift {
                    Some(shift) => shift,
                    None if saturated => {
                        HueShift::new(self.rng.gen_range(HUE_SHIFT_MIN..HUE_SHIFT_MAX))
                    }
                    None => HueShift::NONE,
                };
                (palette, hue_shift)
            }
        };

        let seat = if parent.is_some() {
            None
        } else {
            seat.filter(|requested| {
                self.seats
                    .get(requested)
                    .map_or(false, |entry| entry.occupant.is_none())
            })
            .or_else(|| {
                self.seats
                    .values()
                    .find(|entry| entry.occupant.is_none())
                    .map(|entry| entry.id)
            })
        };

        let mut character = Character::new(
            id,
            parent,
            label,
            CellCoord::new(0, 0),
            palette,
            hue_shift,
        );
        match seat.and_then(|seat| self.seats.get_mut(&seat)) {
            Some(entry) => {
                entry.occupant = Some(id);
                character.seat = Some(entry.id);
                character.sit(entry.cell, entry.facing);
            }
            None => {
                let mask = self.walk_mask(None);
                let (columns, rows) = (self.columns, self.rows);
                let cell = match parent_state {
                    Some((anchor, ..)) => closest_walkable(anchor, columns, rows, |cell| {
                        cell != anchor && mask_allows(&mask, cell, columns, rows)
                    })
                    .or(Some(anchor)),
                    None => mask
                        .iter()
                        .position(|walkable| *walkable)
                        .and_then(|index| CellCoord::from_index(index, columns)),
                };
                character.teleport(cell.unwrap_or(CellCoord::new(0, 0)));
            }
        }

        info!(
            agent = id.get(),
            parent = ?parent.map(|parent| parent.get()),
            seat = ?character.seat.map(|seat| seat.get()),
            palette = palette.get(),
            "character spawned"
        );
        out_events.push(Event::CharacterSpawned {
            id,
            cell: character.cell,
            seat: character.seat,
            palette,
            hue_shift,
        });
        let _ = self.characters.insert(id, character);
    }

    fn despawn(&mut self, id: AgentId, out_events: &mut Vec<Event>) {
        let Some(character) = self.characters.remove(&id) else {
            return;
        };
        self.release_seat(&character);
        info!(agent = id.get(), "character despawned");
        out_events.push(Event::CharacterDespawned { id });

        let children: Vec<AgentId> = self
            .characters
            .values()
            .filter(|child| child.parent == Some(id))
            .map(|child| child.id)
            .collect();
        for child in children {
            if let Some(character) = self.characters.remove(&child) {
                self.release_seat(&character);
                out_events.push(Event::CharacterDespawned { id: child });
            }
        }
    }

    fn release_seat(&mut self, character: &Character) {
        if let Some(seat) = character.seat.and_then(|seat| self.seats.get_mut(&seat)) {
            if seat.occupant == Some(character.id) {
                seat.occupant = None;
            }
        }
    }

    fn walk_to(&mut self, id: AgentId, destination: CellCoord, out_events: &mut Vec<Event>) {
        let Some(character) = self.characters.get(&id) else {
            return;
        };
        let own_seat = character.seat;
        let mask = self.walk_mask(own_seat);
        let (columns, rows) = (self.columns, self.rows);
        let Some(path) = plan_path(character.cell, destination, columns, rows, |cell| {
            mask_allows(&mask, cell, columns, rows)
        }) else {
            debug!(
                agent = id.get(),
                column = destination.column(),
                row = destination.row(),
                "walk target unreachable"
            );
            return;
        };

        let seat_target = own_seat
            .and_then(|seat| self.seats.get(&seat))
            .filter(|seat| seat.cell == destination)
            .map(|seat| (seat.cell, seat.facing));
        let Some(character) = self.characters.get_mut(&id) else {
            return;
        };

        if !path.is_empty() {
            character.start_walk(path);
            out_events.push(Event::WalkStarted { id, destination });
            return;
        }

        if character.position != destination.center() {
            character.start_walk(vec![destination]);
            out_events.push(Event::WalkStarted { id, destination });
            return;
        }

        if let Some((cell, facing)) = seat_target {
            if character.motion != MotionState::Seated {
                character.sit(cell, facing);
                out_events.push(Event::CharacterArrived {
                    id,
                    cell,
                    seated: true,
                });
            }
        }
    }

    fn send_to_seat(&mut self, id: AgentId, out_events: &mut Vec<Event>) {
        let seat_cell = self
            .characters
            .get(&id)
            .and_then(|character| character.seat)
            .and_then(|seat| self.seats.get(&seat))
            .map(|seat| seat.cell);
        if let Some(cell) = seat_cell {
            self.walk_to(id, cell, out_events);
        }
    }

    fn reassign_seat(&mut self, id: AgentId, seat_id: SeatId, out_events: &mut Vec<Event>) {
        let Some(character) = self.characters.get(&id) else {
            return;
        };
        if character.is_sub_agent() {
            debug!(agent = id.get(), "sub-agents never take seats");
            return;
        }
        let Some(seat) = self.seats.get(&seat_id) else {
            return;
        };

        let previous = character.seat;
        if previous == Some(seat_id) {
            self.send_to_seat(id, out_events);
            return;
        }
        let evicted = seat.occupant.filter(|occupant| *occupant != id);

        if let Some(old_seat) = previous.and_then(|seat| self.seats.get_mut(&seat)) {
            old_seat.occupant = None;
        }
        if let Some(other) = evicted.and_then(|other| self.characters.get_mut(&other)) {
            other.seat = None;
            if other.motion == MotionState::Seated {
                other.stand();
            }
        }
        if let Some(seat) = self.seats.get_mut(&seat_id) {
            seat.occupant = Some(id);
        }
        if let Some(character) = self.characters.get_mut(&id) {
            character.seat = Some(seat_id);
            if character.motion == MotionState::Seated {
                character.stand();
            }
        }

        info!(
            agent = id.get(),
            seat = seat_id.get(),
            evicted = ?evicted.map(|other| other.get()),
            "seat reassigned"
        );
        out_events.push(Event::SeatReassigned {
            id,
            seat: seat_id,
            previous,
            evicted,
        });
        self.send_to_seat(id, out_events);
    }

    fn reject_placement(
        uid: Option<FurnitureUid>,
        kind: FurnitureKind,
        origin: CellCoord,
        reason: PlacementError,
        out_events: &mut Vec<Event>,
    ) {
        debug!(
            uid = ?uid.map(|uid| uid.get()),
            ?kind,
            column = origin.column(),
            row = origin.row(),
            ?reason,
            "furniture placement rejected"
        );
        out_events.push(Event::FurniturePlacementRejected {
            uid,
            kind,
            origin,
            reason,
        });
    }

    fn record(&self, uid: FurnitureUid) -> Option<&FurnitureRecord> {
        self.furniture.iter().find(|item| item.uid == uid)
    }

    fn record_mut(&mut self, uid: FurnitureUid) -> Option<&mut FurnitureRecord> {
        self.furniture.iter_mut().find(|item| item.uid == uid)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

fn mask_allows(mask: &[bool], cell: CellCoord, columns: u32, rows: u32) -> bool {
    cell.index(columns, rows)
        .and_then(|index| mask.get(index).copied())
        .unwrap_or(false)
}

fn reject_tile_edit(cell: CellCoord, out_events: &mut Vec<Event>) {
    debug!(
        column = cell.column(),
        row = cell.row(),
        "tile edit out of bounds"
    );
    out_events.push(Event::TileEditRejected {
        cell,
        reason: TileEditError::OutOfBounds,
    });
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Commands naming unknown characters, seats or furniture are silent no-ops.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::LoadLayout { layout } => {
            if let Err(reason) = layout.validate() {
                warn!(%reason, "rejected malformed layout");
                out_events.push(Event::LayoutRejected { reason });
                return;
            }
            let (columns, rows) = (layout.columns, layout.rows);
            world.install_layout(layout, out_events);
            info!(
                columns,
                rows,
                furniture = world.furniture.len(),
                seats = world.seats.len(),
                "layout loaded"
            );
            out_events.push(Event::LayoutLoaded { columns, rows });
        }
        Command::SetTile { cell, tile } => {
            let Some(slot) = cell
                .index(world.columns, world.rows)
                .and_then(|index| world.tiles.get_mut(index))
            else {
                reject_tile_edit(cell, out_events);
                return;
            };
            if *slot != tile {
                *slot = tile;
                out_events.push(Event::TileChanged { cell, tile });
            }
        }
        Command::SetTileColor { cell, color } => {
            let Some(slot) = cell
                .index(world.columns, world.rows)
                .and_then(|index| world.tile_colors.get_mut(index))
            else {
                reject_tile_edit(cell, out_events);
                return;
            };
            if *slot != color {
                *slot = color;
                out_events.push(Event::TileColorChanged { cell, color });
            }
        }
        Command::AddFurniture {
            kind,
            origin,
            rotation,
            text,
        } => {
            let entry = kind.catalog_entry();
            let rotation = if entry.rotatable {
                rotation
            } else {
                Rotation::Down
            };
            let text = kind
                .is_label()
                .then(|| text.unwrap_or_else(|| PixelTextConfig::new(DEFAULT_LABEL_TEXT)));
            let request = PlacementRequest::new(kind, origin)
                .with_rotation(rotation)
                .with_text(text.as_ref());
            match check_placement(&world.view(), &request) {
                Ok(region) => {
                    let uid = world.allocate_uid();
                    let mut record = FurnitureRecord::new(uid, kind, origin).with_rotation(rotation);
                    record.text = text;
                    world.furniture.push(record);
                    debug!(uid = uid.get(), ?kind, "furniture placed");
                    out_events.push(Event::FurniturePlaced { uid, kind, region });
                    world.sync_seats(out_events);
                }
                Err(reason) => World::reject_placement(None, kind, origin, reason, out_events),
            }
        }
        Command::RemoveFurniture { uid } => {
            let Some(position) = world.furniture.iter().position(|item| item.uid == uid) else {
                return;
            };
            let record = world.furniture.remove(position);
            debug!(uid = uid.get(), kind = ?record.kind, "furniture removed");
            out_events.push(Event::FurnitureRemoved {
                uid,
                region: record.footprint(),
            });
            world.sync_seats(out_events);
        }
        Command::MoveFurniture { uid, origin } => {
            let Some(record) = world.record(uid) else {
                return;
            };
            let kind = record.kind;
            let from = record.footprint();
            let request = PlacementRequest::new(kind, origin)
                .with_rotation(record.rotation)
                .with_text(record.text.as_ref())
                .excluding(uid);
            match check_placement(&world.view(), &request) {
                Ok(to) => {
                    if let Some(record) = world.record_mut(uid) {
                        record.origin = origin;
                    }
                    out_events.push(Event::FurnitureMoved { uid, from, to });
                    world.sync_seats(out_events);
                }
                Err(reason) => World::reject_placement(Some(uid), kind, origin, reason, out_events),
            }
        }
        Command::RotateFurniture { uid } => {
            let Some(record) = world.record(uid) else {
                return;
            };
            let kind = record.kind;
            if !kind.catalog_entry().rotatable {
                debug!(uid = uid.get(), ?kind, "furniture kind does not rotate");
                return;
            }
            let origin = record.origin;
            let rotation = record.rotation.next();
            let request = PlacementRequest::new(kind, origin)
                .with_rotation(rotation)
                .with_text(record.text.as_ref())
                .excluding(uid);
            match check_placement(&world.view(), &request) {
                Ok(region) => {
                    if let Some(record) = world.record_mut(uid) {
                        record.rotation = rotation;
                    }
                    out_events.push(Event::FurnitureRotated {
                        uid,
                        rotation,
                        region,
                    });
                    world.sync_seats(out_events);
                }
                Err(reason) => World::reject_placement(Some(uid), kind, origin, reason, out_events),
            }
        }
        Command::SetFurnitureLayer { uid, z_layer } => {
            if let Some(record) = world.record_mut(uid) {
                if record.z_layer != z_layer {
                    record.z_layer = z_layer;
                    out_events.push(Event::FurnitureLayerChanged { uid, z_layer });
                }
            }
        }
        Command::SetFurnitureText { uid, text } => {
            let Some(record) = world.record(uid) else {
                return;
            };
            let kind = record.kind;
            if !kind.is_label() {
                return;
            }
            let origin = record.origin;
            let request = PlacementRequest::new(kind, origin)
                .with_text(Some(&text))
                .excluding(uid);
            match check_placement(&world.view(), &request) {
                Ok(region) => {
                    if let Some(record) = world.record_mut(uid) {
                        record.text = Some(text);
                    }
                    out_events.push(Event::FurnitureTextChanged { uid, region });
                }
                Err(reason) => World::reject_placement(Some(uid), kind, origin, reason, out_events),
            }
        }
        Command::SpawnCharacter {
            id,
            parent,
            label,
            palette,
            hue_shift,
            seat,
        } => world.spawn(id, parent, label, palette, hue_shift, seat, out_events),
        Command::DespawnCharacter { id } => world.despawn(id, out_events),
        Command::SetCharacterActivity { id, status, tool } => {
            let seat_cell = world
                .characters
                .get(&id)
                .and_then(|character| character.seat)
                .and_then(|seat| world.seats.get(&seat))
                .map(|seat| seat.cell);
            let Some(character) = world.characters.get_mut(&id) else {
                return;
            };
            let update = character.apply_activity(status, tool);
            if update.status_changed {
                out_events.push(Event::ActivityChanged { id, status });
            }
            if update.bubble_changed {
                out_events.push(Event::BubbleChanged {
                    id,
                    bubble: character.bubble,
                });
            }

            let heading_home = seat_cell.is_some() && character.destination() == seat_cell;
            if update.status_changed
                && status == ActivityStatus::Active
                && seat_cell.is_some()
                && character.motion != MotionState::Seated
                && !heading_home
            {
                world.send_to_seat(id, out_events);
            }
        }
        Command::SetBubble { id, bubble } => {
            if let Some(character) = world.characters.get_mut(&id) {
                if character.bubble != bubble {
                    character.bubble = bubble;
                    out_events.push(Event::BubbleChanged { id, bubble });
                }
            }
        }
        Command::DismissBubble { id } => {
            if let Some(character) = world.characters.get_mut(&id) {
                if character.bubble.take().is_some() {
                    out_events.push(Event::BubbleChanged { id, bubble: None });
                }
            }
        }
        Command::WalkToTile { id, cell } => world.walk_to(id, cell, out_events),
        Command::SendToSeat { id } => world.send_to_seat(id, out_events),
        Command::ReassignSeat { id, seat } => world.reassign_seat(id, seat, out_events),
        Command::Tick { dt } => {
            out_events.push(Event::TimeAdvanced { dt });

            let speed = world.config.walk_speed;
            let frame = world.config.walk_frame_duration();
            for character in world.characters.values_mut() {
                let Some(cell) = character.advance(dt, speed, frame) else {
                    continue;
                };
                let seat = character
                    .seat
                    .and_then(|seat| world.seats.get(&seat))
                    .filter(|seat| seat.cell == cell);
                let seated = match seat {
                    Some(seat) => {
                        character.sit(seat.cell, seat.facing);
                        true
                    }
                    None => false,
                };
                out_events.push(Event::CharacterArrived {
                    id: character.id,
                    cell,
                    seated,
                });
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use glam::Vec2;
    use pixel_office_core::{
        AgentId, CellCoord, CharacterSnapshot, CharacterView, FloorColor, FurnitureRecord,
        FurnitureUid, LayoutSnapshot, LayoutView, NamedSeatRecord, NamedSeats, SeatAssignments,
        SeatId, SeatRecord, SeatView, TileType, LAYOUT_VERSION,
    };

    use super::{mask_allows, SimulationConfig, World};

    /// Grid dimensions as `(columns, rows)`.
    #[must_use]
    pub fn dimensions(world: &World) -> (u32, u32) {
        (world.columns, world.rows)
    }

    /// Read-only view over the tiles and furniture, as consumed by the placement validator.
    #[must_use]
    pub fn layout_view(world: &World) -> LayoutView<'_> {
        world.view()
    }

    /// Captures the current layout by value.
    #[must_use]
    pub fn layout_snapshot(world: &World) -> LayoutSnapshot {
        let tile_colors = if world.tile_colors.iter().all(Option::is_none) {
            Vec::new()
        } else {
            world.tile_colors.clone()
        };
        LayoutSnapshot {
            version: LAYOUT_VERSION,
            columns: world.columns,
            rows: world.rows,
            tiles: world.tiles.clone(),
            tile_colors,
            furniture: world.furniture.clone(),
        }
    }

    /// Tile type at the cell, if in bounds.
    #[must_use]
    pub fn tile_at(world: &World, cell: CellCoord) -> Option<TileType> {
        world.view().tile(cell)
    }

    /// Floor colour override at the cell, if any.
    #[must_use]
    pub fn tile_color_at(world: &World, cell: CellCoord) -> Option<FloorColor> {
        cell.index(world.columns, world.rows)
            .and_then(|index| world.tile_colors.get(index).copied().flatten())
    }

    /// Committed furniture in placement order.
    #[must_use]
    pub fn furniture(world: &World) -> &[FurnitureRecord] {
        &world.furniture
    }

    /// Looks up a furniture record by uid.
    #[must_use]
    pub fn furniture_by_uid(world: &World, uid: FurnitureUid) -> Option<&FurnitureRecord> {
        world.record(uid)
    }

    /// Furniture under the tile, preferring surface items stacked on top of hosts.
    #[must_use]
    pub fn furniture_at(world: &World, cell: CellCoord) -> Option<FurnitureUid> {
        let mut hit: Option<&FurnitureRecord> = None;
        for item in world.view().furniture_covering(cell) {
            if hit.is_none() || item.kind.catalog_entry().surface_item {
                hit = Some(item);
            }
        }
        hit.map(|item| item.uid)
    }

    /// Captures a read-only view of every character.
    #[must_use]
    pub fn character_view(world: &World) -> CharacterView {
        CharacterView::from_snapshots(
            world
                .characters
                .values()
                .map(super::Character::snapshot)
                .collect(),
        )
    }

    /// Snapshot of a single character.
    #[must_use]
    pub fn character(world: &World, id: AgentId) -> Option<CharacterSnapshot> {
        world.characters.get(&id).map(super::Character::snapshot)
    }

    /// Character whose hit box contains the world-pixel point.
    ///
    /// When several overlap, the one drawn in front (largest y) wins.
    #[must_use]
    pub fn character_at(world: &World, point: Vec2) -> Option<AgentId> {
        world
            .characters
            .values()
            .map(super::Character::snapshot)
            .filter(|snapshot| snapshot.hit_test(point))
            .max_by(|left, right| {
                left.position
                    .y
                    .total_cmp(&right.position.y)
                    .then_with(|| right.id.cmp(&left.id))
            })
            .map(|snapshot| snapshot.id)
    }

    /// Captures a read-only view of every seat.
    #[must_use]
    pub fn seat_view(world: &World) -> SeatView {
        SeatView::from_snapshots(world.seats.values().map(|seat| seat.snapshot()).collect())
    }

    /// Seat anchored on the tile, if any.
    #[must_use]
    pub fn seat_at_tile(world: &World, cell: CellCoord) -> Option<SeatId> {
        world
            .seats
            .values()
            .find(|seat| seat.cell == cell)
            .map(|seat| seat.id)
    }

    /// Reports whether characters without a seat there may stand on the tile.
    #[must_use]
    pub fn is_walkable(world: &World, cell: CellCoord) -> bool {
        mask_allows(&world.walk_mask(None), cell, world.columns, world.rows)
    }

    /// Seat persistence payload for every non-sub-agent character.
    #[must_use]
    pub fn seat_assignments(world: &World) -> SeatAssignments {
        world
            .characters
            .values()
            .filter(|character| !character.is_sub_agent())
            .map(|character| {
                (
                    character.id,
                    SeatRecord {
                        palette: character.palette,
                        seat_id: character.seat,
                    },
                )
            })
            .collect()
    }

    /// Name-to-seat persistence payload for every named non-sub-agent character.
    #[must_use]
    pub fn named_seats(world: &World) -> NamedSeats {
        world
            .characters
            .values()
            .filter(|character| !character.is_sub_agent())
            .filter_map(|character| {
                let name = character.label.clone()?;
                Some((
                    name,
                    NamedSeatRecord {
                        seat_id: character.seat,
                        palette: character.palette,
                        hue_shift: character.hue_shift,
                    },
                ))
            })
            .collect()
    }

    /// Simulation tunables the world runs with.
    #[must_use]
    pub fn config(world: &World) -> &SimulationConfig {
        &world.config
    }
}
