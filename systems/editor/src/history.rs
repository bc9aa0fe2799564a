//! Bounded undo/redo stacks of layout snapshots.

use std::collections::VecDeque;

use pixel_office_core::LayoutSnapshot;

/// Undo and redo stacks holding whole layout snapshots.
#[derive(Clone, Debug)]
pub struct EditHistory {
    undo: VecDeque<LayoutSnapshot>,
    redo: Vec<LayoutSnapshot>,
    depth: usize,
}

impl EditHistory {
    /// Creates an empty history keeping at most `depth` undo steps.
    #[must_use]
    pub fn new(depth: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            depth,
        }
    }

    /// Records the layout as it was before an edit and clears the redo stack.
    pub fn record(&mut self, before: LayoutSnapshot) {
        if self.depth == 0 {
            return;
        }
        if self.undo.back() == Some(&before) {
            return;
        }
        while self.undo.len() >= self.depth {
            let _ = self.undo.pop_front();
        }
        self.undo.push_back(before);
        self.redo.clear();
    }

    /// Steps back, returning the layout to restore.
    pub fn undo(&mut self, current: LayoutSnapshot) -> Option<LayoutSnapshot> {
        let previous = self.undo.pop_back()?;
        self.redo.push(current);
        Some(previous)
    }

    /// Steps forward again, returning the layout to restore.
    pub fn redo(&mut self, current: LayoutSnapshot) -> Option<LayoutSnapshot> {
        let next = self.redo.pop()?;
        self.undo.push_back(current);
        Some(next)
    }

    /// Reports whether an undo step is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Reports whether a redo step is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Forgets every recorded step.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixel_office_core::TileType;

    fn layout(columns: u32) -> LayoutSnapshot {
        LayoutSnapshot::filled(columns, 1, TileType::FLOOR)
    }

    #[test]
    fn undo_and_redo_walk_the_stacks() {
        let mut history = EditHistory::new(10);
        history.record(layout(1));
        history.record(layout(2));

        assert_eq!(history.undo(layout(3)), Some(layout(2)));
        assert_eq!(history.undo(layout(2)), Some(layout(1)));
        assert_eq!(history.undo(layout(1)), None);
        assert_eq!(history.redo(layout(1)), Some(layout(2)));
        assert_eq!(history.redo(layout(2)), Some(layout(3)));
        assert!(!history.can_redo());
    }

    #[test]
    fn new_edits_clear_redo_and_depth_is_bounded() {
        let mut history = EditHistory::new(2);
        for columns in 1..=4 {
            history.record(layout(columns));
        }
        assert_eq!(history.undo(layout(5)), Some(layout(4)));
        history.record(layout(9));
        assert!(!history.can_redo());

        assert_eq!(history.undo(layout(10)), Some(layout(9)));
        assert_eq!(history.undo(layout(9)), Some(layout(3)));
        assert_eq!(history.undo(layout(3)), None);
    }
}
