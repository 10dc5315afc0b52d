//! # Board Model
//!
//! Immutable view over a finished connection-game board.
//!
//! The board is a rectangular grid of single-character marks. It is read as a
//! rhombus: row 0 is the top edge, the last row the bottom edge, column 0 the
//! left edge and the last column the right edge.
//!
//! ## Players
//! - **X**: connects the right edge to the left edge
//! - **O**: connects the bottom edge to the top edge
//!
//! Any character that is not a player's mark counts as an empty cell.

use crate::error::ResolveError;
use connect_shared::{in_bounds, is_hex_step, Offset};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the two players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    /// Owner of the left and right edges.
    X,
    /// Owner of the top and bottom edges.
    O,
}

/// Contents of a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    Stone(Player),
}

/// The characters used to write a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Marks {
    /// Mark of the player connecting left and right.
    pub owner_a: char,
    /// Mark of the player connecting top and bottom.
    pub owner_b: char,
    /// Mark written for empty cells when rendering.
    pub empty: char,
}

impl Default for Marks {
    fn default() -> Self {
        Marks {
            owner_a: 'X',
            owner_b: 'O',
            empty: '.',
        }
    }
}

impl Marks {
    /// Classifies a character read from the board.
    pub fn cell(&self, ch: char) -> Cell {
        if ch == self.owner_a {
            Cell::Stone(Player::X)
        } else if ch == self.owner_b {
            Cell::Stone(Player::O)
        } else {
            Cell::Empty
        }
    }

    pub fn mark(&self, player: Player) -> char {
        match player {
            Player::X => self.owner_a,
            Player::O => self.owner_b,
        }
    }

    /// Renders a resolution outcome: the winner's mark, or an empty string.
    pub fn render(&self, outcome: Option<Player>) -> String {
        outcome.map(|p| self.mark(p).to_string()).unwrap_or_default()
    }
}

/// A cell being traced on behalf of a player.
///
/// The player is whose connectivity is followed, not necessarily the
/// occupant of the cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub row: usize,
    pub col: usize,
    pub player: Player,
}

impl Position {
    pub fn new(row: usize, col: usize, player: Player) -> Self {
        Position { row, col, player }
    }

    /// True when this position sits on the player's goal edge.
    ///
    /// X wins on column 0, O wins on row 0.
    pub fn has_won(&self) -> bool {
        match self.player {
            Player::X => self.col == 0,
            Player::O => self.row == 0,
        }
    }

    /// True when `other` is the same cell, regardless of the traced player.
    pub fn same_cell(&self, other: &Position) -> bool {
        self.row == other.row && self.col == other.col
    }
}

/// A validated, rectangular board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Cells in row-major order
    cells: Vec<Cell>,
    rows: usize,
    cols: usize,
    marks: Marks,
}

impl Board {
    /// Builds a board from rows written with the default marks.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, ResolveError> {
        Self::from_rows_with_marks(rows, Marks::default())
    }

    /// Builds a board from rows, one character per cell.
    ///
    /// # Errors
    /// * [`ResolveError::EmptyBoard`] when there are no rows
    /// * [`ResolveError::MalformedBoard`] when rows differ in length
    pub fn from_rows_with_marks<S: AsRef<str>>(
        rows: &[S],
        marks: Marks,
    ) -> Result<Self, ResolveError> {
        let first = rows.first().ok_or(ResolveError::EmptyBoard)?;
        let cols = first.as_ref().chars().count();
        let mut cells = Vec::with_capacity(rows.len() * cols);

        for (row, line) in rows.iter().enumerate() {
            let before = cells.len();
            cells.extend(line.as_ref().chars().map(|ch| marks.cell(ch)));
            let found = cells.len() - before;
            if found != cols {
                return Err(ResolveError::MalformedBoard {
                    row,
                    expected: cols,
                    found,
                });
            }
        }

        Ok(Board {
            cells,
            rows: rows.len(),
            cols,
            marks,
        })
    }

    /// Parses the text form of a board with custom marks.
    ///
    /// Whitespace inside a line is ignored, so the skewed rhombus layout
    /// (`". O . X ."` with growing indentation) reads the same as the dense one.
    /// Blank lines are skipped.
    pub fn parse_with_marks(text: &str, marks: Marks) -> Result<Self, ResolveError> {
        let rows: Vec<String> = text
            .lines()
            .map(|line| line.chars().filter(|c| !c.is_whitespace()).collect::<String>())
            .filter(|line| !line.is_empty())
            .collect();
        Self::from_rows_with_marks(&rows, marks)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn marks(&self) -> Marks {
        self.marks
    }

    /// Gets the cell at `(row, col)`, or `None` outside the board.
    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        if in_bounds(row, col, self.rows, self.cols) {
            Some(self.cells[row * self.cols + col])
        } else {
            None
        }
    }

    /// True when the position lies inside the board.
    pub fn contains(&self, position: &Position) -> bool {
        in_bounds(position.row, position.col, self.rows, self.cols)
    }

    /// True when the board holds the position's player at its cell.
    ///
    /// Out-of-bounds positions are never connected.
    pub fn is_connected(&self, position: &Position) -> bool {
        self.get(position.row, position.col) == Some(Cell::Stone(position.player))
    }

    /// Moves `from` by `offset`, keeping the traced player.
    ///
    /// Returns the destination only if it is inside the board, is a true hex
    /// neighbour and holds the same player.
    pub fn step(&self, from: &Position, offset: Offset) -> Option<Position> {
        if !is_hex_step((from.row, from.col), offset) {
            return None;
        }
        let (row, col) = offset.apply(from.row, from.col)?;
        let to = Position::new(row, col, from.player);
        (self.contains(&to) && self.is_connected(&to)).then_some(to)
    }

    /// Enumerates search origins in scan order.
    ///
    /// O stones on the bottom row come first, left to right, then X stones on
    /// the right column, top to bottom. Each origin lies on the edge opposite
    /// its player's goal edge.
    pub fn origins(&self) -> Vec<Position> {
        if self.rows == 0 || self.cols == 0 {
            return Vec::new();
        }
        let bottom = self.rows - 1;
        let right = self.cols - 1;

        let o_origins = (0..self.cols)
            .map(|col| Position::new(bottom, col, Player::O))
            .filter(|p| self.is_connected(p));
        let x_origins = (0..self.rows)
            .map(|row| Position::new(row, right, Player::X))
            .filter(|p| self.is_connected(p));

        o_origins.chain(x_origins).collect()
    }
}

impl FromStr for Board {
    type Err = ResolveError;

    /// Parses a board written with the default marks.
    ///
    /// # Examples
    /// ```
    /// use connect::board::Board;
    /// let board: Board = ". O .\n O X O\n  X X .".parse().unwrap();
    /// assert_eq!(board.rows(), 3);
    /// assert_eq!(board.cols(), 3);
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_with_marks(s, Marks::default())
    }
}

impl fmt::Display for Board {
    /// Writes the board in the skewed rhombus layout.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.rows {
            write!(f, "{:indent$}", "", indent = r)?;
            for c in 0..self.cols {
                let symbol = match self.cells[r * self.cols + c] {
                    Cell::Stone(player) => self.marks.mark(player),
                    Cell::Empty => self.marks.empty,
                };
                if c > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", symbol)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Marks::default().mark(*self))
    }
}
