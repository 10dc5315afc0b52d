//! Per-branch search state: where the branch stands and where it just came from.

use crate::board::Position;

/// The two most recently visited positions of a branch.
///
/// This is a plain `Copy` value. Every branch of the walk receives its own copy,
/// so sibling branches never observe each other's history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct History {
    /// Most recent first
    slots: [Option<Position>; 2],
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new history with `position` as the most recent entry,
    /// dropping the older of the two current entries.
    #[must_use]
    pub fn push(self, position: Position) -> Self {
        History {
            slots: [Some(position), self.slots[0]],
        }
    }

    /// True when `position` is the same cell as one of the last two visited.
    pub fn is_looping(&self, position: &Position) -> bool {
        self.slots
            .iter()
            .flatten()
            .any(|previous| previous.same_cell(position))
    }

    /// Recorded positions, most recent first.
    pub fn recent(&self) -> impl Iterator<Item = &Position> {
        self.slots.iter().flatten()
    }
}

/// The current position of a branch together with its history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathState {
    pub position: Position,
    pub history: History,
    /// Number of steps taken from the origin
    pub depth: usize,
}

impl PathState {
    /// Starts a branch at an origin cell with an empty history.
    pub fn origin(position: Position) -> Self {
        PathState {
            position,
            history: History::new(),
            depth: 0,
        }
    }

    /// True when moving to `candidate` would step straight back onto one of
    /// the two previous cells.
    pub fn is_backtrack(&self, candidate: &Position) -> bool {
        self.history.is_looping(candidate)
    }

    /// The state of the child branch after stepping to `next`.
    #[must_use]
    pub fn advance(&self, next: Position) -> PathState {
        PathState {
            position: next,
            history: self.history.push(self.position),
            depth: self.depth + 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Player;

    fn at(row: usize, col: usize) -> Position {
        Position::new(row, col, Player::X)
    }

    #[test]
    fn test_new_history_rejects_nothing() {
        let history = History::new();
        assert!(!history.is_looping(&at(0, 0)));
        assert_eq!(history.recent().count(), 0);
    }

    #[test]
    fn test_history_keeps_last_two() {
        let history = History::new().push(at(0, 0)).push(at(0, 1)).push(at(0, 2));
        assert!(history.is_looping(&at(0, 2)));
        assert!(history.is_looping(&at(0, 1)));
        assert!(!history.is_looping(&at(0, 0)));
        let recent: Vec<_> = history.recent().copied().collect();
        assert_eq!(recent, vec![at(0, 2), at(0, 1)]);
    }

    #[test]
    fn test_history_ignores_traced_player() {
        let history = History::new().push(Position::new(1, 1, Player::O));
        assert!(history.is_looping(&Position::new(1, 1, Player::X)));
    }

    #[test]
    fn test_advance_leaves_parent_untouched() {
        let parent = PathState::origin(at(2, 2)).advance(at(2, 1));
        let left = parent.advance(at(2, 0));
        let up = parent.advance(at(1, 1));

        assert_eq!(parent.depth, 1);
        assert_eq!(left.depth, 2);
        assert!(parent.is_backtrack(&at(2, 2)));
        assert!(!parent.is_backtrack(&at(2, 0)));
        assert!(left.is_backtrack(&at(2, 1)));
        assert!(left.is_backtrack(&at(2, 2)));
        assert!(!left.is_backtrack(&at(1, 1)));
        assert!(up.is_backtrack(&at(2, 1)));
        assert!(!up.is_backtrack(&at(2, 0)));
    }
}
