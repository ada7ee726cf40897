//! Start cell reduction using the quarter-turn symmetry of square grids.
//!
//! Rotating a solution of a square grid by 90 degrees yields another solution, so it is
//! enough to start from one cell of every rotation orbit. Each concentric ring contributes
//! the top edge of its quarter (every top-edge cell except the last column), and an odd
//! sized grid adds its center cell.
//!
//! Mirror symmetries are not used, and rectangular grids get no reduction at all.

use super::Grid;

/// Start cells to search from, in ascending order.
pub fn reduced_start_cells(grid: Grid) -> Vec<usize> {
    if !grid.is_square() {
        return (0..grid.cell_count()).collect();
    }

    let n = grid.cols;
    let mut starts = Vec::new();
    if n == 0 {
        return starts;
    }

    // `first..last` is the top edge of the current ring without its last column.
    let mut first = 0;
    let mut last = n - 1;
    while first < last {
        starts.extend(first..last);
        first += n + 1;
        last += n - 1;
    }
    if first == last {
        starts.push(first);
    }

    starts
}

/// The 90 degree clockwise rotation of `cell` on a square grid.
pub fn rotate_quarter(grid: Grid, cell: usize) -> usize {
    let (row, col) = grid.coords(cell);
    grid.index(col, grid.rows - 1 - row)
}
