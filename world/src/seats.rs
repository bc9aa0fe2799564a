//! Seat registry derived from the chairs in the layout.

use std::collections::BTreeMap;

use pixel_office_core::{AgentId, CellCoord, Direction, FurnitureRecord, SeatId, SeatSnapshot};

/// Seat provided by a chair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Seat {
    pub(crate) id: SeatId,
    pub(crate) cell: CellCoord,
    pub(crate) facing: Direction,
    pub(crate) occupant: Option<AgentId>,
}

impl Seat {
    pub(crate) fn snapshot(&self) -> SeatSnapshot {
        SeatSnapshot {
            id: self.id,
            cell: self.cell,
            facing: self.facing,
            occupant: self.occupant,
        }
    }
}

/// Seats described by the furniture, without any occupants.
pub(crate) fn derive_seats(furniture: &[FurnitureRecord]) -> BTreeMap<SeatId, Seat> {
    furniture
        .iter()
        .filter(|item| item.kind.catalog_entry().seat)
        .map(|item| {
            let id = SeatId::from(item.uid);
            let seat = Seat {
                id,
                cell: item.origin,
                facing: item.rotation.facing(),
                occupant: None,
            };
            (id, seat)
        })
        .collect()
}

/// Carries occupants of surviving seats over to a freshly derived registry.
///
/// Returns the seats that disappeared together with the occupant they lost.
pub(crate) fn carry_over(
    previous: &BTreeMap<SeatId, Seat>,
    next: &mut BTreeMap<SeatId, Seat>,
) -> Vec<(SeatId, AgentId)> {
    let mut released = Vec::new();
    for (id, seat) in previous {
        let Some(occupant) = seat.occupant else {
            continue;
        };
        match next.get_mut(id) {
            Some(survivor) => survivor.occupant = Some(occupant),
            None => released.push((*id, occupant)),
        }
    }
    released
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixel_office_core::{FurnitureKind, FurnitureUid, Rotation};

    #[test]
    fn chairs_become_seats_facing_their_rotation() {
        let furniture = vec![
            FurnitureRecord::new(FurnitureUid::new(4), FurnitureKind::Desk, CellCoord::new(0, 0)),
            FurnitureRecord::new(FurnitureUid::new(5), FurnitureKind::Chair, CellCoord::new(2, 3))
                .with_rotation(Rotation::Up),
        ];
        let seats = derive_seats(&furniture);
        assert_eq!(seats.len(), 1);
        let seat = seats.get(&SeatId::new(5)).expect("chair seat");
        assert_eq!(seat.cell, CellCoord::new(2, 3));
        assert_eq!(seat.facing, Direction::North);
        assert_eq!(seat.occupant, None);
    }

    #[test]
    fn carry_over_keeps_survivors_and_reports_losses() {
        let chairs = vec![
            FurnitureRecord::new(FurnitureUid::new(1), FurnitureKind::Chair, CellCoord::new(0, 0)),
            FurnitureRecord::new(FurnitureUid::new(2), FurnitureKind::Chair, CellCoord::new(1, 0)),
        ];
        let mut previous = derive_seats(&chairs);
        for (seat, agent) in [(1, 10), (2, 20)] {
            if let Some(entry) = previous.get_mut(&SeatId::new(seat)) {
                entry.occupant = Some(AgentId::new(agent));
            }
        }

        let mut next = derive_seats(&chairs[..1]);
        let released = carry_over(&previous, &mut next);
        assert_eq!(released, vec![(SeatId::new(2), AgentId::new(20))]);
        assert_eq!(
            next.get(&SeatId::new(1)).and_then(|seat| seat.occupant),
            Some(AgentId::new(10))
        );
    }
}
