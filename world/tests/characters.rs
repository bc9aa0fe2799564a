use std::time::Duration;

use glam::Vec2;
use pixel_office_core::{
    ActivityStatus, AgentId, BubbleKind, CellCoord, CharacterPose, Command, Direction, Event,
    FurnitureKind, FurnitureUid, HueShift, LayoutSnapshot, MotionState, Palette, Rotation, SeatId,
    TileType,
};
use pixel_office_world::{self as world, query, World};

fn apply(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    events
}

fn add_chair(world: &mut World, column: i32, row: i32) -> SeatId {
    let events = apply(
        world,
        Command::AddFurniture {
            kind: FurnitureKind::Chair,
            origin: CellCoord::new(column, row),
            rotation: Rotation::Down,
            text: None,
        },
    );
    let uid = events
        .iter()
        .find_map(|event| match event {
            Event::FurniturePlaced { uid, .. } => Some(*uid),
            _ => None,
        })
        .expect("chair placed");
    SeatId::from(uid)
}

fn spawn(world: &mut World, id: u32) -> Vec<Event> {
    apply(
        world,
        Command::SpawnCharacter {
            id: AgentId::new(id),
            parent: None,
            label: None,
            palette: None,
            hue_shift: None,
            seat: None,
        },
    )
}

fn tick_until_idle(world: &mut World, id: AgentId) -> Vec<Event> {
    let mut events = Vec::new();
    for _ in 0..200 {
        world::apply(
            world,
            Command::Tick {
                dt: Duration::from_millis(50),
            },
            &mut events,
        );
        let walking = query::character(world, id)
            .map_or(false, |character| character.motion == MotionState::Walking);
        if !walking {
            break;
        }
    }
    events
}

fn two_seat_office() -> (World, SeatId, SeatId) {
    let mut world = World::new();
    let first = add_chair(&mut world, 2, 3);
    let second = add_chair(&mut world, 6, 3);
    (world, first, second)
}

#[test]
fn characters_take_free_seats_in_order() {
    let (mut world, first, second) = two_seat_office();

    let events = spawn(&mut world, 1);
    assert_eq!(
        events,
        vec![Event::CharacterSpawned {
            id: AgentId::new(1),
            cell: CellCoord::new(2, 3),
            seat: Some(first),
            palette: Palette::new(0),
            hue_shift: HueShift::NONE,
        }]
    );
    let _ = spawn(&mut world, 2);
    let _ = spawn(&mut world, 3);

    let seated = query::character(&world, AgentId::new(2)).expect("second agent");
    assert_eq!(seated.seat, Some(second));
    assert_eq!(seated.motion, MotionState::Seated);
    assert_eq!(seated.facing, Direction::South);

    let standing = query::character(&world, AgentId::new(3)).expect("third agent");
    assert_eq!(standing.seat, None);
    assert_eq!(standing.cell, CellCoord::new(0, 1), "first walkable tile");
    assert_eq!(standing.motion, MotionState::Idle);
}

#[test]
fn persisted_seat_preference_is_honoured_when_free() {
    let (mut world, _, second) = two_seat_office();
    let _ = apply(
        &mut world,
        Command::SpawnCharacter {
            id: AgentId::new(5),
            parent: None,
            label: Some("alice".into()),
            palette: Some(Palette::new(4)),
            hue_shift: Some(HueShift::new(90)),
            seat: Some(second),
        },
    );

    let character = query::character(&world, AgentId::new(5)).expect("agent");
    assert_eq!(character.seat, Some(second));
    assert_eq!(character.palette, Palette::new(4));
    assert_eq!(character.hue_shift, HueShift::new(90));

    let named = query::named_seats(&world);
    let record = named.get("alice").expect("named record");
    assert_eq!(record.seat_id, Some(second));
    assert_eq!(record.hue_shift, HueShift::new(90));
}

#[test]
fn reassignment_is_exclusive() {
    let (mut world, first, second) = two_seat_office();
    let _ = spawn(&mut world, 1);
    let _ = spawn(&mut world, 2);

    let events = apply(
        &mut world,
        Command::ReassignSeat {
            id: AgentId::new(1),
            seat: second,
        },
    );
    assert_eq!(
        events,
        vec![
            Event::SeatReassigned {
                id: AgentId::new(1),
                seat: second,
                previous: Some(first),
                evicted: Some(AgentId::new(2)),
            },
            Event::WalkStarted {
                id: AgentId::new(1),
                destination: CellCoord::new(6, 3),
            },
        ]
    );

    let seats = query::seat_view(&world);
    assert_eq!(
        seats.get(second).and_then(|seat| seat.occupant),
        Some(AgentId::new(1))
    );
    assert_eq!(seats.get(first).and_then(|seat| seat.occupant), None);

    let evicted = query::character(&world, AgentId::new(2)).expect("evicted agent");
    assert_eq!(evicted.seat, None);
    assert_eq!(evicted.motion, MotionState::Idle);

    let assignments = query::seat_assignments(&world);
    assert_eq!(
        assignments.get(&AgentId::new(1)).and_then(|record| record.seat_id),
        Some(second)
    );
    assert_eq!(
        assignments.get(&AgentId::new(2)).and_then(|record| record.seat_id),
        None
    );
    let bound: Vec<_> = seats.iter().filter(|seat| seat.is_assigned()).collect();
    assert_eq!(bound.len(), 1, "exactly one seat bound after reassignment");
}

#[test]
fn reassigned_character_walks_and_sits_down() {
    let (mut world, _, second) = two_seat_office();
    let _ = spawn(&mut world, 1);
    let _ = apply(
        &mut world,
        Command::ReassignSeat {
            id: AgentId::new(1),
            seat: second,
        },
    );

    let walking = query::character(&world, AgentId::new(1)).expect("agent");
    assert_eq!(walking.destination, Some(CellCoord::new(6, 3)));

    let events = tick_until_idle(&mut world, AgentId::new(1));
    assert!(events.contains(&Event::CharacterArrived {
        id: AgentId::new(1),
        cell: CellCoord::new(6, 3),
        seated: true,
    }));

    let seated = query::character(&world, AgentId::new(1)).expect("agent");
    assert_eq!(seated.motion, MotionState::Seated);
    assert_eq!(seated.position, CellCoord::new(6, 3).center());
    assert_eq!(seated.pose(), CharacterPose::Sitting);
}

#[test]
fn sub_agents_inherit_palette_and_never_sit() {
    let (mut world, first, _) = two_seat_office();
    let _ = spawn(&mut world, 1);
    let _ = apply(
        &mut world,
        Command::SpawnCharacter {
            id: AgentId::new(10),
            parent: Some(AgentId::new(1)),
            label: None,
            palette: None,
            hue_shift: None,
            seat: Some(first),
        },
    );

    let parent = query::character(&world, AgentId::new(1)).expect("parent");
    let child = query::character(&world, AgentId::new(10)).expect("sub-agent");
    assert!(child.is_sub_agent());
    assert_eq!(child.palette, parent.palette);
    assert_eq!(child.seat, None);
    assert_eq!(child.cell, CellCoord::new(2, 2), "nearest free tile to the parent");

    let events = apply(
        &mut world,
        Command::ReassignSeat {
            id: AgentId::new(10),
            seat: first,
        },
    );
    assert!(events.is_empty());
    assert!(!query::seat_assignments(&world).contains_key(&AgentId::new(10)));
}

#[test]
fn despawning_a_parent_removes_its_sub_agents() {
    let (mut world, first, _) = two_seat_office();
    let _ = spawn(&mut world, 1);
    let _ = apply(
        &mut world,
        Command::SpawnCharacter {
            id: AgentId::new(10),
            parent: Some(AgentId::new(1)),
            label: None,
            palette: None,
            hue_shift: None,
            seat: None,
        },
    );

    let events = apply(
        &mut world,
        Command::DespawnCharacter {
            id: AgentId::new(1),
        },
    );
    assert_eq!(
        events,
        vec![
            Event::CharacterDespawned {
                id: AgentId::new(1)
            },
            Event::CharacterDespawned {
                id: AgentId::new(10)
            },
        ]
    );
    assert!(query::character_view(&world).iter().next().is_none());
    assert_eq!(
        query::seat_view(&world)
            .get(first)
            .and_then(|seat| seat.occupant),
        None
    );
}

#[test]
fn palettes_spread_before_hue_shifting() {
    let mut world = World::new();
    for id in 0..u32::from(Palette::COUNT) {
        let _ = spawn(&mut world, id);
    }
    let view = query::character_view(&world);
    for (index, character) in view.iter().enumerate() {
        assert_eq!(usize::from(character.palette.get()), index);
        assert_eq!(character.hue_shift, HueShift::NONE);
    }

    let _ = spawn(&mut world, 99);
    let extra = query::character(&world, AgentId::new(99)).expect("extra agent");
    assert_eq!(extra.palette, Palette::new(0));
    assert!((45..315).contains(&extra.hue_shift.get()));
}

#[test]
fn walking_follows_the_grid_and_animates() {
    let mut world = World::new();
    let id = AgentId::new(1);
    let _ = spawn(&mut world, 1);

    let events = apply(
        &mut world,
        Command::WalkToTile {
            id,
            cell: CellCoord::new(0, 0),
        },
    );
    assert!(events.is_empty(), "walls are never a destination");

    let events = apply(
        &mut world,
        Command::WalkToTile {
            id,
            cell: CellCoord::new(3, 1),
        },
    );
    assert_eq!(
        events,
        vec![Event::WalkStarted {
            id,
            destination: CellCoord::new(3, 1),
        }]
    );

    let _ = apply(
        &mut world,
        Command::Tick {
            dt: Duration::from_millis(500),
        },
    );
    let midway = query::character(&world, id).expect("agent");
    assert_eq!(midway.motion, MotionState::Walking);
    assert!(matches!(midway.pose(), CharacterPose::Walking { .. }));
    assert_eq!(midway.facing, Direction::East);
    assert_eq!(midway.position, Vec2::new(32.0, 24.0));

    let events = apply(
        &mut world,
        Command::Tick {
            dt: Duration::from_millis(600),
        },
    );
    assert!(events.contains(&Event::CharacterArrived {
        id,
        cell: CellCoord::new(3, 1),
        seated: false,
    }));
    let arrived = query::character(&world, id).expect("agent");
    assert_eq!(arrived.motion, MotionState::Idle);
    assert_eq!(arrived.cell, CellCoord::new(3, 1));
}

#[test]
fn activity_updates_drive_bubbles_and_seating() {
    let (mut world, _, _) = two_seat_office();
    let id = AgentId::new(1);
    let _ = spawn(&mut world, 1);

    let events = apply(
        &mut world,
        Command::SetCharacterActivity {
            id,
            status: ActivityStatus::NeedsApproval,
            tool: Some("Bash".into()),
        },
    );
    assert_eq!(
        events,
        vec![
            Event::ActivityChanged {
                id,
                status: ActivityStatus::NeedsApproval,
            },
            Event::BubbleChanged {
                id,
                bubble: Some(BubbleKind::Permission),
            },
        ]
    );

    let events = apply(&mut world, Command::DismissBubble { id });
    assert_eq!(events, vec![Event::BubbleChanged { id, bubble: None }]);

    let _ = apply(
        &mut world,
        Command::WalkToTile {
            id,
            cell: CellCoord::new(2, 6),
        },
    );
    let _ = tick_until_idle(&mut world, id);
    assert_eq!(
        query::character(&world, id).map(|character| character.cell),
        Some(CellCoord::new(2, 6))
    );

    let events = apply(
        &mut world,
        Command::SetCharacterActivity {
            id,
            status: ActivityStatus::Active,
            tool: Some("Read".into()),
        },
    );
    assert!(events.contains(&Event::WalkStarted {
        id,
        destination: CellCoord::new(2, 3),
    }));

    let _ = tick_until_idle(&mut world, id);
    let character = query::character(&world, id).expect("agent");
    assert_eq!(character.motion, MotionState::Seated);
    assert_eq!(character.pose(), CharacterPose::Reading);
}

#[test]
fn removing_a_chair_releases_its_occupant() {
    let (mut world, first, _) = two_seat_office();
    let id = AgentId::new(1);
    let _ = spawn(&mut world, 1);

    let events = apply(
        &mut world,
        Command::RemoveFurniture {
            uid: FurnitureUid::new(first.get()),
        },
    );
    assert!(events.contains(&Event::SeatReleased {
        seat: first,
        occupant: id,
    }));
    let character = query::character(&world, id).expect("agent");
    assert_eq!(character.seat, None);
    assert_eq!(character.motion, MotionState::Idle);
    assert!(query::is_walkable(&world, CellCoord::new(2, 3)));
}

#[test]
fn moving_an_occupied_chair_keeps_the_binding() {
    let (mut world, first, _) = two_seat_office();
    let id = AgentId::new(1);
    let _ = spawn(&mut world, 1);

    let _ = apply(
        &mut world,
        Command::MoveFurniture {
            uid: FurnitureUid::new(first.get()),
            origin: CellCoord::new(2, 7),
        },
    );
    let character = query::character(&world, id).expect("agent");
    assert_eq!(character.seat, Some(first));
    assert_eq!(character.motion, MotionState::Idle);

    let _ = apply(&mut world, Command::SendToSeat { id });
    let _ = tick_until_idle(&mut world, id);
    let character = query::character(&world, id).expect("agent");
    assert_eq!(character.cell, CellCoord::new(2, 7));
    assert_eq!(character.motion, MotionState::Seated);
}

#[test]
fn loading_a_smaller_layout_relocates_characters() {
    let mut world = World::new();
    let id = AgentId::new(1);
    let _ = spawn(&mut world, 1);
    let _ = apply(
        &mut world,
        Command::WalkToTile {
            id,
            cell: CellCoord::new(15, 5),
        },
    );
    let _ = tick_until_idle(&mut world, id);

    let events = apply(
        &mut world,
        Command::LoadLayout {
            layout: LayoutSnapshot::filled(10, 5, TileType::FLOOR),
        },
    );
    assert_eq!(events, vec![Event::LayoutLoaded { columns: 10, rows: 5 }]);
    assert_eq!(
        query::character(&world, id).map(|character| character.cell),
        Some(CellCoord::new(9, 4))
    );
}

#[test]
fn front_most_character_wins_hit_tests() {
    let mut world = World::new();
    let _ = spawn(&mut world, 1);
    let _ = spawn(&mut world, 2);
    let _ = apply(
        &mut world,
        Command::WalkToTile {
            id: AgentId::new(2),
            cell: CellCoord::new(0, 2),
        },
    );
    let _ = tick_until_idle(&mut world, AgentId::new(2));

    assert_eq!(
        query::character_at(&world, Vec2::new(8.0, 12.0)),
        Some(AgentId::new(1))
    );
    assert_eq!(
        query::character_at(&world, Vec2::new(8.0, 28.0)),
        Some(AgentId::new(2))
    );
    assert_eq!(query::character_at(&world, Vec2::new(100.0, 100.0)), None);
}

#[test]
fn seat_payload_serialises_with_string_keys() {
    let (mut world, first, _) = two_seat_office();
    let _ = spawn(&mut world, 7);
    let json = serde_json::to_string(&query::seat_assignments(&world)).expect("serialise");
    assert_eq!(
        json,
        format!("{{\"7\":{{\"palette\":0,\"seatId\":{}}}}}", first.get())
    );
}
