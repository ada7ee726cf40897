//! The mutable board a single search runs on.

use super::{Grid, MoveTable};

/// Cell labels of one search, `0` meaning the cell is not visited yet.
///
/// During a search the non-zero labels are always exactly `1..=depth`, each once. A board
/// is owned by one worker for the whole lifetime of a task; anything that outlives a
/// callback gets a clone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    grid: Grid,
    cells: Vec<u32>,
}

impl Board {
    /// An empty board.
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            cells: vec![0; grid.cell_count()],
        }
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    #[inline]
    pub fn get(&self, cell: usize) -> u32 {
        self.cells[cell]
    }

    #[inline]
    pub fn set(&mut self, cell: usize, label: u32) {
        self.cells[cell] = label;
    }

    #[inline]
    pub fn is_empty_cell(&self, cell: usize) -> bool {
        self.cells[cell] == 0
    }

    pub fn cells(&self) -> &[u32] {
        &self.cells
    }

    /// Number of labels placed so far.
    pub fn placed(&self) -> usize {
        self.cells.iter().filter(|&&label| label != 0).count()
    }

    /// Whether this board is a complete number sequence: every label `1..=cells` appears
    /// exactly once and consecutive labels are one legal move apart.
    pub fn is_solution(&self, moves: &MoveTable) -> bool {
        let count = self.cells.len();
        let mut position = vec![usize::MAX; count + 1];

        for (cell, &label) in self.cells.iter().enumerate() {
            let label = label as usize;
            if label == 0 || label > count || position[label] != usize::MAX {
                return false;
            }
            position[label] = cell;
        }

        (1..count).all(|label| moves.is_move(position[label], position[label + 1]))
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let width = self.grid.cell_count().to_string().len();
        for row in self.cells.chunks(self.grid.cols.max(1)) {
            let line: Vec<String> = row.iter().map(|label| format!("{label:>width$}")).collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}
