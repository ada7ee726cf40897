//! Exhaustive search for number sequence paths.
//!
//! A number sequence labels every cell of a `rows x cols` grid with `1..=rows*cols` so
//! that consecutive labels are one legal move apart. Legal moves jump three cells
//! horizontally or vertically, or two cells along a diagonal.
//!
//! - [`grid`] builds the move table, the symmetry-reduced start cells and the board.
//! - [`search`] holds the backtracking engine and the parallel coordinator.

pub mod grid;
pub mod search;

pub use grid::{Board, Grid, MoveTable};
pub use search::parallel::{CancelToken, ParallelConfig, solve};
pub use search::{SearchConfig, SolveError, SolveReport};
