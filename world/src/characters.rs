//! Character state owned by the world.

use std::{collections::VecDeque, time::Duration};

use glam::Vec2;
use pixel_office_core::{
    ActivityStatus, AgentId, BubbleKind, CellCoord, CharacterSnapshot, Direction, HueShift,
    MotionState, Palette, SeatId,
};
use pixel_office_system_movement::advance_along;

/// Number of frames in the walk cycle.
pub(crate) const WALK_FRAME_COUNT: u8 = 4;

/// Simulation state of a single agent character.
#[derive(Clone, Debug)]
pub(crate) struct Character {
    pub(crate) id: AgentId,
    pub(crate) parent: Option<AgentId>,
    pub(crate) label: Option<String>,
    pub(crate) position: Vec2,
    pub(crate) cell: CellCoord,
    pub(crate) facing: Direction,
    pub(crate) motion: MotionState,
    pub(crate) activity: ActivityStatus,
    pub(crate) tool: Option<String>,
    pub(crate) bubble: Option<BubbleKind>,
    pub(crate) seat: Option<SeatId>,
    pub(crate) palette: Palette,
    pub(crate) hue_shift: HueShift,
    path: VecDeque<CellCoord>,
    walk_elapsed: Duration,
    walk_frame: u8,
}

/// Changes produced by an external activity update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ActivityUpdate {
    pub(crate) status_changed: bool,
    pub(crate) bubble_changed: bool,
}

impl Character {
    pub(crate) fn new(
        id: AgentId,
        parent: Option<AgentId>,
        label: Option<String>,
        cell: CellCoord,
        palette: Palette,
        hue_shift: HueShift,
    ) -> Self {
        Self {
            id,
            parent,
            label,
            position: cell.center(),
            cell,
            facing: Direction::South,
            motion: MotionState::Idle,
            activity: ActivityStatus::Idle,
            tool: None,
            bubble: None,
            seat: None,
            palette,
            hue_shift,
            path: VecDeque::new(),
            walk_elapsed: Duration::ZERO,
            walk_frame: 0,
        }
    }

    pub(crate) const fn is_sub_agent(&self) -> bool {
        self.parent.is_some()
    }

    pub(crate) fn destination(&self) -> Option<CellCoord> {
        self.path.back().copied()
    }

    pub(crate) fn start_walk(&mut self, path: Vec<CellCoord>) {
        self.path = path.into();
        self.motion = MotionState::Walking;
        self.walk_elapsed = Duration::ZERO;
    }

    /// Drops any active path and stands on the current tile.
    pub(crate) fn stand(&mut self) {
        self.path.clear();
        self.motion = MotionState::Idle;
        self.walk_frame = 0;
    }

    pub(crate) fn sit(&mut self, cell: CellCoord, facing: Direction) {
        self.path.clear();
        self.cell = cell;
        self.position = cell.center();
        self.facing = facing;
        self.motion = MotionState::Seated;
        self.walk_frame = 0;
    }

    /// Places the character on a tile without walking there.
    pub(crate) fn teleport(&mut self, cell: CellCoord) {
        self.stand();
        self.cell = cell;
        self.position = cell.center();
    }

    /// Advances along the active path; returns the final tile once the path is exhausted.
    pub(crate) fn advance(
        &mut self,
        dt: Duration,
        walk_speed: f32,
        frame_duration: Duration,
    ) -> Option<CellCoord> {
        if self.motion != MotionState::Walking {
            return None;
        }

        let step = advance_along(self.position, &mut self.path, walk_speed * dt.as_secs_f32());
        self.position = step.position;
        if let Some(cell) = step.reached {
            self.cell = cell;
        }
        if let Some(facing) = step.facing {
            self.facing = facing;
        }

        if step.arrived {
            self.stand();
            return Some(self.cell);
        }

        self.walk_elapsed = self.walk_elapsed.saturating_add(dt);
        if !frame_duration.is_zero() {
            while self.walk_elapsed >= frame_duration {
                self.walk_elapsed -= frame_duration;
                self.walk_frame = (self.walk_frame + 1) % WALK_FRAME_COUNT;
            }
        }
        None
    }

    /// Applies an externally reported status and derives the bubble it implies.
    pub(crate) fn apply_activity(
        &mut self,
        status: ActivityStatus,
        tool: Option<String>,
    ) -> ActivityUpdate {
        self.tool = tool;
        let status_changed = self.activity != status;
        self.activity = status;

        let bubble = bubble_for(status);
        let bubble_changed = self.bubble != bubble;
        self.bubble = bubble;

        ActivityUpdate {
            status_changed,
            bubble_changed,
        }
    }

    pub(crate) fn snapshot(&self) -> CharacterSnapshot {
        CharacterSnapshot {
            id: self.id,
            parent: self.parent,
            label: self.label.clone(),
            position: self.position,
            cell: self.cell,
            facing: self.facing,
            motion: self.motion,
            activity: self.activity,
            tool: self.tool.clone(),
            bubble: self.bubble,
            seat: self.seat,
            palette: self.palette,
            hue_shift: self.hue_shift,
            walk_frame: self.walk_frame,
            destination: self.destination(),
        }
    }
}

/// Bubble implied by an externally reported status.
pub(crate) const fn bubble_for(status: ActivityStatus) -> Option<BubbleKind> {
    match status {
        ActivityStatus::NeedsApproval => Some(BubbleKind::Permission),
        ActivityStatus::Waiting => Some(BubbleKind::Waiting),
        ActivityStatus::Idle | ActivityStatus::Active => None,
    }
}

/// Least-used palette among `used`, ties resolved toward the lowest index.
///
/// The flag reports whether every palette was already in use, in which case
/// callers add a hue shift to keep characters distinguishable.
pub(crate) fn least_used_palette(used: impl Iterator<Item = Palette>) -> (Palette, bool) {
    let mut counts = [0_usize; Palette::COUNT as usize];
    for palette in used {
        if let Some(count) = counts.get_mut(usize::from(palette.get())) {
            *count += 1;
        }
    }

    let (index, count) = counts
        .iter()
        .enumerate()
        .min_by_key(|(_, count)| **count)
        .map_or((0, 0), |(index, count)| (index, *count));
    let palette = Palette::new(u8::try_from(index).unwrap_or(0));
    (palette, count > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walker() -> Character {
        Character::new(
            AgentId::new(1),
            None,
            None,
            CellCoord::new(0, 0),
            Palette::new(0),
            HueShift::NONE,
        )
    }

    #[test]
    fn least_used_palette_prefers_lowest_index() {
        let (palette, saturated) = least_used_palette(std::iter::empty());
        assert_eq!(palette, Palette::new(0));
        assert!(!saturated);

        let used = [0, 1, 1, 3].map(Palette::new);
        let (palette, saturated) = least_used_palette(used.into_iter());
        assert_eq!(palette, Palette::new(2));
        assert!(!saturated);

        let everyone = (0..Palette::COUNT).map(Palette::new).chain([Palette::new(0)]);
        let (palette, saturated) = least_used_palette(everyone);
        assert_eq!(palette, Palette::new(1));
        assert!(saturated);
    }

    #[test]
    fn status_drives_bubble() {
        let mut character = walker();
        let update = character.apply_activity(ActivityStatus::NeedsApproval, None);
        assert!(update.status_changed && update.bubble_changed);
        assert_eq!(character.bubble, Some(BubbleKind::Permission));

        let update = character.apply_activity(ActivityStatus::NeedsApproval, Some("Bash".into()));
        assert!(!update.status_changed && !update.bubble_changed);
        assert_eq!(character.tool.as_deref(), Some("Bash"));

        let _ = character.apply_activity(ActivityStatus::Active, None);
        assert_eq!(character.bubble, None);
    }

    #[test]
    fn walk_animation_cycles_while_walking() {
        let mut character = walker();
        character.start_walk(vec![
            CellCoord::new(1, 0),
            CellCoord::new(2, 0),
            CellCoord::new(3, 0),
        ]);
        let frame = Duration::from_millis(150);

        // 10 px/s keeps the character walking for the whole check.
        let arrived = character.advance(Duration::from_millis(300), 10.0, frame);
        assert_eq!(arrived, None);
        assert_eq!(character.walk_frame, 2);
        assert_eq!(character.facing, Direction::East);

        let arrived = character.advance(Duration::from_secs(60), 10.0, frame);
        assert_eq!(arrived, Some(CellCoord::new(3, 0)));
        assert_eq!(character.motion, MotionState::Idle);
        assert_eq!(character.walk_frame, 0);
        assert_eq!(character.position, CellCoord::new(3, 0).center());
    }
}
