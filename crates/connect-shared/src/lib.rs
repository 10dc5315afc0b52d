#![no_std]

//! Adjacency primitives for the rhombic connection board.
//!
//! The board is stored as a plain rectangular grid. Hex adjacency is recovered
//! from the eight grid directions by discarding the two diagonals that do not
//! keep `row + col` constant.

/// A single step on the grid, as (row delta, column delta).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Offset {
    pub dr: isize,
    pub dc: isize,
}

impl Offset {
    pub const fn new(dr: isize, dc: isize) -> Self {
        Offset { dr, dc }
    }

    /// True when both components are nonzero.
    ///
    /// Expressed on the sum of the deltas: orthogonal unit steps sum to +1 or -1,
    /// every diagonal sums to -2, 0 or +2.
    pub const fn is_diagonal(self) -> bool {
        let delta = self.dr + self.dc;
        delta != 1 && delta != -1
    }

    /// Applies the offset to `(row, col)`, returning `None` on underflow.
    pub fn apply(self, row: usize, col: usize) -> Option<(usize, usize)> {
        Some((row.checked_add_signed(self.dr)?, col.checked_add_signed(self.dc)?))
    }
}

/// The eight candidate directions, in the order the search tries them.
pub const MOVES: [Offset; 8] = [
    Offset::new(-1, 0),
    Offset::new(1, 0),
    Offset::new(0, -1),
    Offset::new(0, 1),
    Offset::new(1, 1),
    Offset::new(-1, -1),
    Offset::new(1, -1),
    Offset::new(-1, 1),
];

/// Checks that two cells lie on the same anti-diagonal (`row + col` equal).
pub fn valid_diagonal(from: (usize, usize), to: (usize, usize)) -> bool {
    from.0 + from.1 == to.0 + to.1
}

/// Checks whether `offset` from `from` is a true hex neighbour step.
///
/// Containment is not checked here; see [`in_bounds`].
pub fn is_hex_step(from: (usize, usize), offset: Offset) -> bool {
    match offset.apply(from.0, from.1) {
        Some(to) => !offset.is_diagonal() || valid_diagonal(from, to),
        None => false,
    }
}

/// Checks that `(row, col)` lies inside a `rows` x `cols` grid.
pub fn in_bounds(row: usize, col: usize, rows: usize, cols: usize) -> bool {
    row < rows && col < cols
}
