#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Grid-stepped path planning and per-tick path following for characters.

use std::collections::VecDeque;

use glam::Vec2;
use pixel_office_core::{CellCoord, Direction};

/// Plans a shortest cardinal path from `from` to `to`.
///
/// The returned path excludes the starting cell and ends with `to`; it is
/// empty when both cells coincide. Intermediate cells and the destination must
/// satisfy `is_walkable`; the start cell is exempt so characters may leave a
/// tile that became blocked underneath them. Ties between equally short paths
/// resolve deterministically by neighbour order.
pub fn plan_path<F>(
    from: CellCoord,
    to: CellCoord,
    columns: u32,
    rows: u32,
    is_walkable: F,
) -> Option<Vec<CellCoord>>
where
    F: Fn(CellCoord) -> bool,
{
    if !to.in_bounds(columns, rows) || !is_walkable(to) {
        return None;
    }
    if from == to {
        return Some(Vec::new());
    }

    let start = from.index(columns, rows)?;
    let node_count = usize::try_from(u64::from(columns) * u64::from(rows)).ok()?;
    let mut came_from: Vec<Option<usize>> = vec![None; node_count];
    let mut visited = vec![false; node_count];
    let mut frontier = VecDeque::new();
    visited[start] = true;
    frontier.push_back(from);

    while let Some(cell) = frontier.pop_front() {
        let Some(current) = cell.index(columns, rows) else {
            continue;
        };
        if cell == to {
            return Some(reconstruct(&came_from, start, current, columns));
        }

        for neighbor in cardinal_neighbors(cell, columns, rows) {
            let Some(index) = neighbor.index(columns, rows) else {
                continue;
            };
            if visited[index] || !is_walkable(neighbor) {
                continue;
            }
            visited[index] = true;
            came_from[index] = Some(current);
            frontier.push_back(neighbor);
        }
    }

    None
}

fn reconstruct(
    came_from: &[Option<usize>],
    start: usize,
    end: usize,
    columns: u32,
) -> Vec<CellCoord> {
    let mut path = Vec::new();
    let mut cursor = end;
    while cursor != start {
        if let Some(cell) = CellCoord::from_index(cursor, columns) {
            path.push(cell);
        }
        match came_from.get(cursor).copied().flatten() {
            Some(previous) => cursor = previous,
            None => break,
        }
    }
    path.reverse();
    path
}

/// Walkable cell nearest to `anchor` by Manhattan distance.
///
/// Ties resolve in row-major order.
pub fn closest_walkable<F>(
    anchor: CellCoord,
    columns: u32,
    rows: u32,
    is_walkable: F,
) -> Option<CellCoord>
where
    F: Fn(CellCoord) -> bool,
{
    let width = i32::try_from(columns).ok()?;
    let height = i32::try_from(rows).ok()?;
    (0..height)
        .flat_map(|row| (0..width).map(move |column| CellCoord::new(column, row)))
        .filter(|cell| is_walkable(*cell))
        .min_by_key(|cell| anchor.manhattan_distance(*cell))
}

/// Result of advancing a character along its path for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Advance {
    /// Position after the advance.
    pub position: Vec2,
    /// Last tile centre reached during the advance, if any.
    pub reached: Option<CellCoord>,
    /// Direction of the most recent segment travelled.
    pub facing: Option<Direction>,
    /// Whether the path is now exhausted.
    pub arrived: bool,
}

/// Moves `position` up to `distance` world pixels along the queued tile centres.
///
/// Reached waypoints are popped from `path`.
pub fn advance_along(position: Vec2, path: &mut VecDeque<CellCoord>, distance: f32) -> Advance {
    let mut position = position;
    let mut remaining = distance.max(0.0);
    let mut reached = None;
    let mut facing = None;

    while let Some(next) = path.front().copied() {
        let target = next.center();
        let delta = target - position;
        let length = delta.length();
        if let Some(direction) = heading(delta) {
            facing = Some(direction);
        }

        if length <= remaining {
            position = target;
            remaining -= length;
            reached = Some(next);
            let _ = path.pop_front();
        } else {
            position += delta / length * remaining;
            break;
        }
    }

    Advance {
        position,
        reached,
        facing,
        arrived: path.is_empty(),
    }
}

/// Cardinal direction of the dominant axis of `delta`.
#[must_use]
pub fn heading(delta: Vec2) -> Option<Direction> {
    if delta.x == 0.0 && delta.y == 0.0 {
        return None;
    }
    if delta.x.abs() > delta.y.abs() {
        Some(if delta.x > 0.0 {
            Direction::East
        } else {
            Direction::West
        })
    } else {
        Some(if delta.y > 0.0 {
            Direction::South
        } else {
            Direction::North
        })
    }
}

/// Direction of a single cardinal step between adjacent cells.
#[must_use]
pub fn direction_between(from: CellCoord, to: CellCoord) -> Option<Direction> {
    let column_diff = from.column().abs_diff(to.column());
    let row_diff = from.row().abs_diff(to.row());
    if column_diff + row_diff != 1 {
        return None;
    }

    if column_diff == 1 {
        if to.column() > from.column() {
            Some(Direction::East)
        } else {
            Some(Direction::West)
        }
    } else if to.row() > from.row() {
        Some(Direction::South)
    } else {
        Some(Direction::North)
    }
}

fn cardinal_neighbors(cell: CellCoord, columns: u32, rows: u32) -> NeighborIter {
    let mut neighbors = NeighborIter::default();

    for direction in [
        Direction::North,
        Direction::West,
        Direction::East,
        Direction::South,
    ] {
        let neighbor = cell.step(direction);
        if neighbor.in_bounds(columns, rows) {
            neighbors.push(neighbor);
        }
    }

    neighbors
}

#[derive(Clone, Debug, Default)]
struct NeighborIter {
    buffer: [Option<CellCoord>; 4],
    len: usize,
    cursor: usize,
}

impl NeighborIter {
    fn push(&mut self, cell: CellCoord) {
        if self.len < self.buffer.len() {
            self.buffer[self.len] = Some(cell);
            self.len += 1;
        }
    }
}

impl Iterator for NeighborIter {
    type Item = CellCoord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.len {
            return None;
        }

        let value = self.buffer[self.cursor];
        self.cursor += 1;
        value
    }
}
