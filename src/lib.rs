//! # Connection Game Winner Resolver
//!
//! Decides which player, if any, has joined their two edges on a finished
//! rhombic (Hex-like) board.
//!
//! A [`Resolver`] owns a rayon thread pool. For each board it starts one
//! [`search::SearchWorker`] per origin cell, collects their reports over a
//! rendezvous channel and stops the remaining workers as soon as the answer is
//! settled. Every worker has reported before `resolve` returns, so no search
//! outlives the call.
//!
//! ```
//! assert_eq!(connect::result_of(&["OXX", "XOO", "XXO"]).unwrap(), "X");
//! assert_eq!(connect::result_of(&["X"]).unwrap(), "X");
//! ```

pub mod board;
pub mod config;
pub mod error;
pub mod path;
pub mod search;

use crate::board::{Board, Marks, Player, Position};
use crate::config::{ResolverConfig, TieBreak};
use crate::error::ResolveError;
use crate::search::{SearchControl, SearchOutcome, SearchWorker, WorkerReport};
use parking_lot::Mutex;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::mpsc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Resolves a board given as rows of `X`, `O` and empty marks.
///
/// Returns the winner's mark, or an empty string when nobody has connected.
///
/// Each call starts and tears down its own thread pool. Callers resolving
/// many boards should build one [`Resolver`] and reuse it:
///
/// ```
/// use connect::config::ResolverConfig;
/// use connect::Resolver;
///
/// let resolver = Resolver::new(&ResolverConfig::default()).unwrap();
/// for rows in [["XX", ".."], ["O.", "O."]] {
///     let board = resolver.board(&rows).unwrap();
///     assert!(resolver.resolve(&board).unwrap().is_some());
/// }
/// assert_eq!(resolver.statistics().resolutions, 2);
/// ```
pub fn result_of<S: AsRef<str>>(rows: &[S]) -> Result<String, ResolveError> {
    let board = Board::from_rows(rows)?;
    let resolver = Resolver::new(&ResolverConfig::default())?;
    let winner = resolver.resolve(&board)?;
    Ok(board.marks().render(winner))
}

/// Counters describing the work done by one or more resolutions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchStatistics {
    /// Boards resolved
    pub resolutions: u64,
    /// Workers started, one per origin
    pub origins: u64,
    /// Cells entered across all workers
    pub cells_visited: u64,
    pub winning_workers: u64,
    pub exhausted_workers: u64,
    pub cancelled_workers: u64,
    /// Wall-clock time spent resolving
    pub elapsed: Duration,
}

impl SearchStatistics {
    fn record(&mut self, report: &WorkerReport) {
        self.cells_visited += report.cells_visited as u64;
        match report.outcome {
            SearchOutcome::Won(_) => self.winning_workers += 1,
            SearchOutcome::Exhausted => self.exhausted_workers += 1,
            SearchOutcome::Cancelled => self.cancelled_workers += 1,
        }
    }

    fn merge(&mut self, other: &SearchStatistics) {
        self.resolutions += other.resolutions;
        self.origins += other.origins;
        self.cells_visited += other.cells_visited;
        self.winning_workers += other.winning_workers;
        self.exhausted_workers += other.exhausted_workers;
        self.cancelled_workers += other.cancelled_workers;
        self.elapsed += other.elapsed;
    }
}

/// The answer for one board together with how it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub winner: Option<Player>,
    /// Origin cell of the search that produced the winner
    pub winning_origin: Option<Position>,
    pub statistics: SearchStatistics,
}

/// Coordinator life cycle for one resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Dispatching,
    AwaitingFirstResult,
    Resolved,
}

fn transition(phase: &mut Phase, next: Phase) {
    debug!(from = ?phase, to = ?next, "resolver phase");
    *phase = next;
}

/// Collects worker reports and decides when the answer is settled.
struct Tally {
    tie_break: TieBreak,
    /// Outcome per origin index, `None` until that worker reports
    outcomes: Vec<Option<SearchOutcome>>,
    /// First winning index received, in arrival order
    first_reported: Option<usize>,
}

impl Tally {
    fn new(origins: usize, tie_break: TieBreak) -> Self {
        Tally {
            tie_break,
            outcomes: vec![None; origins],
            first_reported: None,
        }
    }

    fn record(&mut self, report: &WorkerReport) {
        self.outcomes[report.index] = Some(report.outcome);
        if matches!(report.outcome, SearchOutcome::Won(_)) && self.first_reported.is_none() {
            self.first_reported = Some(report.index);
        }
    }

    /// Index of the winning origin once no later report can change it.
    fn decision(&self) -> Option<usize> {
        match self.tie_break {
            TieBreak::FirstReported => self.first_reported,
            TieBreak::ScanOrder => {
                for (index, outcome) in self.outcomes.iter().enumerate() {
                    match outcome {
                        None => return None,
                        Some(SearchOutcome::Won(_)) => return Some(index),
                        Some(_) => continue,
                    }
                }
                None
            }
        }
    }
}

/// Parallel winner resolver.
pub struct Resolver {
    /// Pool the search workers run on
    pool: ThreadPool,
    tie_break: TieBreak,
    marks: Marks,
    /// Running totals over every resolution made with this resolver
    totals: Mutex<SearchStatistics>,
}

impl Resolver {
    /// Creates a resolver and starts its thread pool.
    ///
    /// # Errors
    /// - [`ResolveError::Config`] if `config` fails [`ResolverConfig::validate`]
    /// - [`ResolveError::ThreadPool`] if rayon cannot start the threads
    pub fn new(config: &ResolverConfig) -> Result<Self, ResolveError> {
        config.validate()?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.effective_threads())
            .stack_size(config.stack_size_mib * 1024 * 1024)
            .thread_name(|i| format!("connect-search-{}", i))
            .build()
            .map_err(|e| ResolveError::ThreadPool(e.to_string()))?;
        Ok(Resolver {
            pool,
            tie_break: config.tie_break,
            marks: config.marks,
            totals: Mutex::new(SearchStatistics::default()),
        })
    }

    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    /// Number of threads in the search pool.
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Builds a board from rows written with this resolver's marks.
    pub fn board<S: AsRef<str>>(&self, rows: &[S]) -> Result<Board, ResolveError> {
        Board::from_rows_with_marks(rows, self.marks)
    }

    /// Returns the winner of `board`, or `None` when no chain joins a
    /// player's edges.
    pub fn resolve(&self, board: &Board) -> Result<Option<Player>, ResolveError> {
        Ok(self.resolve_with_report(board)?.winner)
    }

    /// Totals accumulated over every call to this resolver.
    pub fn statistics(&self) -> SearchStatistics {
        self.totals.lock().clone()
    }

    /// Resolves `board` and reports the work done.
    ///
    /// Must not be called from a thread of this resolver's own pool: the
    /// calling thread waits on the result channel while the workers run.
    pub fn resolve_with_report(&self, board: &Board) -> Result<Resolution, ResolveError> {
        if board.rows() == 0 {
            return Err(ResolveError::EmptyBoard);
        }

        let start = Instant::now();
        let mut phase = Phase::Idle;
        let origins = board.origins();
        let mut statistics = SearchStatistics {
            resolutions: 1,
            origins: origins.len() as u64,
            ..Default::default()
        };

        let decided = if origins.is_empty() {
            None
        } else {
            self.dispatch(board, &origins, &mut phase, &mut statistics)
        };
        transition(&mut phase, Phase::Resolved);

        let winning_origin = decided.map(|index| origins[index]);
        let winner = winning_origin.map(|origin| origin.player);
        statistics.elapsed = start.elapsed();
        debug!(
            winner = %self.marks.render(winner),
            origins = statistics.origins,
            cells = statistics.cells_visited,
            cancelled = statistics.cancelled_workers,
            "board resolved"
        );

        self.totals.lock().merge(&statistics);
        Ok(Resolution {
            winner,
            winning_origin,
            statistics,
        })
    }

    /// Runs one worker per origin and returns the index of the winning origin.
    ///
    /// Keeps draining the channel after the answer is settled so that every
    /// worker gets to send its report and finish.
    fn dispatch(
        &self,
        board: &Board,
        origins: &[Position],
        phase: &mut Phase,
        statistics: &mut SearchStatistics,
    ) -> Option<usize> {
        let control = SearchControl::new(self.tie_break == TieBreak::ScanOrder);
        let (tx, rx) = mpsc::sync_channel::<WorkerReport>(0);
        let mut tally = Tally::new(origins.len(), self.tie_break);
        let mut decided = None;

        transition(phase, Phase::Dispatching);
        self.pool.in_place_scope(|scope| {
            for (index, &origin) in origins.iter().enumerate() {
                let tx = tx.clone();
                let control = &control;
                tracing::trace!(
                    index,
                    row = origin.row,
                    col = origin.col,
                    player = %origin.player,
                    "spawning worker"
                );
                scope.spawn(move |_| {
                    let report = SearchWorker::new(board, control, index).run(origin);
                    // The receiver stays open until every sender is dropped.
                    let _ = tx.send(report);
                });
            }
            drop(tx);
            transition(phase, Phase::AwaitingFirstResult);

            for report in rx {
                statistics.record(&report);
                tally.record(&report);
                if decided.is_none() {
                    decided = tally.decision();
                    if let Some(index) = decided {
                        debug!(index, "answer settled, cancelling remaining workers");
                        control.cancel();
                    }
                }
            }
        });

        decided
    }
}
