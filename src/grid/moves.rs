//! Precomputed move adjacency.

use super::Grid;

/// Relative `(row, col)` offsets of the legal moves, in the order neighbors are tried:
/// up, right, down, left, up-right, down-right, down-left, up-left.
pub const MOVE_OFFSETS: [(isize, isize); 8] = [
    (-3, 0),
    (0, 3),
    (3, 0),
    (0, -3),
    (-2, 2),
    (2, 2),
    (2, -2),
    (-2, -2),
];

/// For every cell, the cells reachable in one legal move.
///
/// Built once before the search starts and only read afterwards, so workers share it
/// behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveTable {
    grid: Grid,
    neighbors: Vec<Vec<usize>>,
}

impl MoveTable {
    /// Build the table for `grid`. Offsets that leave the grid are dropped, so a cell may
    /// have anywhere from zero to eight neighbors.
    pub fn build(grid: Grid) -> Self {
        let mut neighbors = Vec::with_capacity(grid.cell_count());

        for row in 0..grid.rows {
            for col in 0..grid.cols {
                let cell_moves = MOVE_OFFSETS
                    .iter()
                    .filter_map(|&(dr, dc)| {
                        let r = row.checked_add_signed(dr)?;
                        let c = col.checked_add_signed(dc)?;
                        (r < grid.rows && c < grid.cols).then(|| grid.index(r, c))
                    })
                    .collect();
                neighbors.push(cell_moves);
            }
        }

        Self { grid, neighbors }
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    /// Neighbors of `cell`, in offset order.
    #[inline]
    pub fn neighbors(&self, cell: usize) -> &[usize] {
        &self.neighbors[cell]
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    /// Whether `to` is one legal move away from `from`.
    pub fn is_move(&self, from: usize, to: usize) -> bool {
        self.neighbors
            .get(from)
            .is_some_and(|moves| moves.contains(&to))
    }
}

impl std::fmt::Display for MoveTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let width = self.grid.cell_count().saturating_sub(1).to_string().len();
        for (cell, moves) in self.neighbors.iter().enumerate() {
            let list: Vec<String> = moves.iter().map(|m| m.to_string()).collect();
            writeln!(f, "{:>width$}: [{}]", cell, list.join(", "))?;
        }
        Ok(())
    }
}
