//! Depth-first backtracking over a single reused board.
//!
//! The engine places the next label on every empty neighbor of the current cell in move
//! table order, recurses, and clears the cell again before trying the next neighbor. When
//! a call returns, the board is exactly as it was on entry. No board is allocated per step.
//!
//! The only pruning is the occupancy check. Recursion depth equals the number of cells, one
//! small frame per placed label.

use crate::grid::{Board, MoveTable};

/// Receives callbacks from a running search.
pub trait SearchObserver {
    /// Called on every search node, terminal or not, with the board as it is at that node.
    ///
    /// The board keeps changing after the call returns; clone it to keep anything.
    fn on_visit(&mut self, _board: &Board) {}

    /// Called with a copy of every complete board.
    fn on_solution(&mut self, _solution: Board) {}
}

/// Observer that ignores every callback.
impl SearchObserver for () {}

/// Backtracking search over one move table.
pub struct SearchEngine<'a> {
    moves: &'a MoveTable,
    cell_count: u32,
    nodes: u64,
    solutions: u64,
}

impl<'a> SearchEngine<'a> {
    pub fn new(moves: &'a MoveTable) -> Self {
        Self {
            moves,
            // Grid size is validated to fit in a label before any engine is built.
            cell_count: moves.len() as u32,
            nodes: 0,
            solutions: 0,
        }
    }

    /// Search nodes visited since construction or the last [`reset`](Self::reset).
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Solutions found since construction or the last [`reset`](Self::reset).
    pub fn solutions(&self) -> u64 {
        self.solutions
    }

    pub fn reset(&mut self) {
        self.nodes = 0;
        self.solutions = 0;
    }

    /// Count the solutions reachable from `cell`, which must already hold `next_label - 1`.
    ///
    /// Returns the number of complete boards found below this node.
    pub fn search<O: SearchObserver>(
        &mut self,
        board: &mut Board,
        cell: usize,
        next_label: u32,
        observer: &mut O,
    ) -> u64 {
        self.nodes += 1;
        observer.on_visit(board);

        if next_label > self.cell_count {
            self.solutions += 1;
            observer.on_solution(board.clone());
            return 1;
        }

        let moves = self.moves;
        let mut found = 0;
        for &next in moves.neighbors(cell) {
            if board.is_empty_cell(next) {
                board.set(next, next_label);
                found += self.search(board, next, next_label + 1, observer);
                board.set(next, 0);
            }
        }
        found
    }

    /// Run a full search rooted at `start` on a fresh board.
    pub fn search_from<O: SearchObserver>(&mut self, start: usize, observer: &mut O) -> u64 {
        let mut board = Board::new(self.moves.grid());
        board.set(start, 1);
        self.search(&mut board, start, 2, observer)
    }
}
