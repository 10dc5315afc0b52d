//! # Search Worker
//!
//! Depth-first traversal from a single origin cell toward the traced player's
//! goal edge. One worker runs per origin and walks its chain sequentially on a
//! heap-allocated work stack, so board size is not limited by thread stacks.
//!
//! ## Pruning
//! - Moves back onto either of the last two cells of the branch are skipped
//!   (see [`PathState::is_backtrack`]).
//! - Each worker owns an explored grid and enters a cell at most once, which
//!   bounds one worker to `rows * cols` steps even on cyclic chains.
//!
//! ## Stopping
//! Every step of the walk consults the shared [`SearchControl`]. Once the
//! coordinator has settled on an answer, or a lower-ranked origin has already
//! won, the worker unwinds with [`SearchOutcome::Cancelled`].

use crate::board::{Board, Player, Position};
use crate::path::PathState;
use connect_shared::MOVES;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tracing::trace;

/// Stop signal shared by every worker of one resolution.
#[derive(Debug)]
pub struct SearchControl {
    cancelled: AtomicBool,
    /// Lowest origin index that has reported a win, `usize::MAX` if none
    best_win: AtomicUsize,
    /// Whether workers ranked after a known win may give up early
    prune_after_win: bool,
}

impl SearchControl {
    /// Creates a control in the running state.
    ///
    /// With `prune_after_win`, a worker stops as soon as a worker with a lower
    /// origin index has won, because its own result can no longer be chosen.
    pub fn new(prune_after_win: bool) -> Self {
        SearchControl {
            cancelled: AtomicBool::new(false),
            best_win: AtomicUsize::new(usize::MAX),
            prune_after_win,
        }
    }

    /// Tells every worker to stop at its next step.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Records that the worker for origin `index` reached its goal edge.
    pub fn record_win(&self, index: usize) {
        self.best_win.fetch_min(index, Ordering::AcqRel);
    }

    /// Lowest winning origin index seen so far.
    pub fn best_win(&self) -> Option<usize> {
        match self.best_win.load(Ordering::Acquire) {
            usize::MAX => None,
            index => Some(index),
        }
    }

    /// True when the worker for origin `index` should stop.
    pub fn should_stop(&self, index: usize) -> bool {
        if self.is_cancelled() {
            return true;
        }
        self.prune_after_win && self.best_win().is_some_and(|best| index > best)
    }
}

/// How a single worker finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The traced player reached its goal edge.
    Won(Player),
    /// Every reachable cell was tried without reaching the goal edge.
    Exhausted,
    /// The worker was told to stop before finishing.
    Cancelled,
}

/// The single message a worker sends to the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerReport {
    /// Rank of the origin in scan order
    pub index: usize,
    pub origin: Position,
    pub outcome: SearchOutcome,
    /// Cells entered by this worker
    pub cells_visited: usize,
}

/// One branch on the work stack of [`SearchWorker::explore`].
struct Frame {
    state: PathState,
    /// Index into [`MOVES`] of the next move to try
    next_move: usize,
}

/// Depth-first search from one origin cell.
pub struct SearchWorker<'a> {
    board: &'a Board,
    control: &'a SearchControl,
    index: usize,
    /// Row-major flags for cells this worker has entered
    explored: Vec<bool>,
    cells_visited: usize,
}

impl<'a> SearchWorker<'a> {
    pub fn new(board: &'a Board, control: &'a SearchControl, index: usize) -> Self {
        SearchWorker {
            board,
            control,
            index,
            explored: vec![false; board.rows() * board.cols()],
            cells_visited: 0,
        }
    }

    /// Runs the search to completion and builds the report.
    ///
    /// An origin that does not hold its traced player is reported as
    /// exhausted without searching.
    pub fn run(mut self, origin: Position) -> WorkerReport {
        let outcome = if self.board.is_connected(&origin) {
            self.explore(PathState::origin(origin))
        } else {
            SearchOutcome::Exhausted
        };

        if let SearchOutcome::Won(_) = outcome {
            self.control.record_win(self.index);
        }
        trace!(
            index = self.index,
            row = origin.row,
            col = origin.col,
            ?outcome,
            cells = self.cells_visited,
            "worker finished"
        );

        WorkerReport {
            index: self.index,
            origin,
            outcome,
            cells_visited: self.cells_visited,
        }
    }

    /// Walks the chain depth-first from `origin` on an explicit work stack.
    ///
    /// Each frame holds a branch state and the next move to try from it, so
    /// moves are tried in table order exactly as a recursive walk would, but
    /// path length is bounded by heap memory rather than the thread stack.
    ///
    /// The branch history is the cheap first filter against stepping straight
    /// back. The explored grid is what bounds the search: every history cell
    /// has already been entered, so the grid alone would reject the same move.
    fn explore(&mut self, origin: PathState) -> SearchOutcome {
        if self.control.should_stop(self.index) {
            return SearchOutcome::Cancelled;
        }
        if let Some(outcome) = self.enter(&origin.position) {
            return outcome;
        }

        let mut stack = vec![Frame {
            state: origin,
            next_move: 0,
        }];
        loop {
            if self.control.should_stop(self.index) {
                return SearchOutcome::Cancelled;
            }
            let (state, move_index) = match stack.last_mut() {
                Some(frame) => {
                    let move_index = frame.next_move;
                    frame.next_move += 1;
                    (frame.state, move_index)
                }
                None => return SearchOutcome::Exhausted,
            };
            let Some(&offset) = MOVES.get(move_index) else {
                stack.pop();
                continue;
            };

            let Some(next) = self.board.step(&state.position, offset) else {
                continue;
            };
            if state.is_backtrack(&next) || self.is_explored(&next) {
                continue;
            }
            if let Some(outcome) = self.enter(&next) {
                return outcome;
            }
            stack.push(Frame {
                state: state.advance(next),
                next_move: 0,
            });
        }
    }

    /// Marks `position` as entered; `Some` when it ends the search.
    fn enter(&mut self, position: &Position) -> Option<SearchOutcome> {
        self.mark_explored(position);
        self.cells_visited += 1;
        position.has_won().then_some(SearchOutcome::Won(position.player))
    }

    fn cell_index(&self, position: &Position) -> usize {
        position.row * self.board.cols() + position.col
    }

    fn mark_explored(&mut self, position: &Position) {
        let idx = self.cell_index(position);
        self.explored[idx] = true;
    }

    fn is_explored(&self, position: &Position) -> bool {
        self.explored[self.cell_index(position)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search(rows: &[&str], origin: Position) -> WorkerReport {
        let board = Board::from_rows(rows).unwrap();
        let control = SearchControl::new(true);
        SearchWorker::new(&board, &control, 0).run(origin)
    }

    #[test]
    fn test_origin_on_goal_edge_wins_immediately() {
        let report = search(&["X"], Position::new(0, 0, Player::X));
        assert_eq!(report.outcome, SearchOutcome::Won(Player::X));
        assert_eq!(report.cells_visited, 1);
    }

    #[test]
    fn test_straight_row_wins() {
        let report = search(&["...", "XXX", "..."], Position::new(1, 2, Player::X));
        assert_eq!(report.outcome, SearchOutcome::Won(Player::X));
    }

    #[test]
    fn test_hex_diagonal_chain_wins() {
        // Only the (-1, +1) diagonal links these stones.
        let report = search(&["..O", ".O.", "O.."], Position::new(2, 0, Player::O));
        assert_eq!(report.outcome, SearchOutcome::Won(Player::O));
    }

    #[test]
    fn test_non_hex_diagonal_is_not_a_link() {
        let report = search(&["O..", ".O.", "..O"], Position::new(2, 2, Player::O));
        assert_eq!(report.outcome, SearchOutcome::Exhausted);
        assert_eq!(report.cells_visited, 1);
    }

    #[test]
    fn test_gap_exhausts() {
        let report = search(&["X.X", "..X", "..X"], Position::new(2, 2, Player::X));
        assert_eq!(report.outcome, SearchOutcome::Exhausted);
        assert_eq!(report.cells_visited, 3);
    }

    #[test]
    fn test_wrong_origin_is_exhausted_without_search() {
        let report = search(&["O"], Position::new(0, 0, Player::X));
        assert_eq!(report.outcome, SearchOutcome::Exhausted);
        assert_eq!(report.cells_visited, 0);
    }

    #[test]
    fn test_ring_terminates() {
        // Six O stones around the centre form a closed loop that never
        // touches the top row.
        let rows = [
            ".....",
            "..OO.",
            ".O.O.",
            ".OO..",
            ".O...",
        ];
        let report = search(&rows, Position::new(4, 1, Player::O));
        assert_eq!(report.outcome, SearchOutcome::Exhausted);
        assert_eq!(report.cells_visited, 7);
    }

    #[test]
    fn test_long_chain_runs_on_a_small_thread_stack() {
        // A filled board makes the walk snake through every cell before it
        // reaches column 0, so the branch is 40_000 cells deep.
        let rows: Vec<String> = (0..200).map(|_| "X".repeat(200)).collect();
        let board = Board::from_rows(&rows).unwrap();
        let report = std::thread::Builder::new()
            .stack_size(256 * 1024)
            .spawn(move || {
                let control = SearchControl::new(true);
                SearchWorker::new(&board, &control, 0).run(Position::new(0, 199, Player::X))
            })
            .unwrap()
            .join()
            .unwrap();
        assert_eq!(report.outcome, SearchOutcome::Won(Player::X));
        assert_eq!(report.cells_visited, 200 * 200 - 199);
    }

    #[test]
    fn test_cancelled_control_stops_worker() {
        let board = Board::from_rows(&["XXX"]).unwrap();
        let control = SearchControl::new(false);
        control.cancel();
        let report = SearchWorker::new(&board, &control, 0).run(Position::new(0, 2, Player::X));
        assert_eq!(report.outcome, SearchOutcome::Cancelled);
        assert_eq!(report.cells_visited, 0);
    }

    #[test]
    fn test_control_prunes_only_later_origins() {
        let control = SearchControl::new(true);
        assert_eq!(control.best_win(), None);
        control.record_win(3);
        control.record_win(5);
        assert_eq!(control.best_win(), Some(3));
        assert!(!control.should_stop(2));
        assert!(!control.should_stop(3));
        assert!(control.should_stop(4));

        let racing = SearchControl::new(false);
        racing.record_win(0);
        assert!(!racing.should_stop(7));
        racing.cancel();
        assert!(racing.should_stop(0));
    }

    #[test]
    fn test_win_is_recorded_on_control() {
        let board = Board::from_rows(&["XX"]).unwrap();
        let control = SearchControl::new(true);
        SearchWorker::new(&board, &control, 4).run(Position::new(0, 1, Player::X));
        assert_eq!(control.best_win(), Some(4));
    }
}
