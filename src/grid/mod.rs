//! Grid geometry: dimensions, move adjacency, start cells and the board.
//!
//! Cells are addressed row-major by a single index in `0..rows*cols`.

pub mod board;
pub mod moves;
pub mod symmetry;

pub use board::Board;
pub use moves::MoveTable;
pub use symmetry::reduced_start_cells;

/// Dimensions of the grid being searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Grid {
    pub rows: usize,
    pub cols: usize,
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Number of cells, which is also the highest label placed on a full board.
    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Row-major index of `(row, col)`.
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    /// `(row, col)` of a row-major index.
    pub fn coords(&self, index: usize) -> (usize, usize) {
        (index / self.cols, index % self.cols)
    }
}

impl std::fmt::Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}
