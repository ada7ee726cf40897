//! Search result types and statistics

use crate::grid::{Board, Grid};
use std::time::Duration;

/// Final result of one start cell's search.
#[derive(Debug, Clone)]
pub struct TaskOutcome {
    /// Position of the start cell in the start set.
    pub start_index: usize,
    pub start_cell: usize,
    pub solutions: u64,
    pub nodes: u64,
    /// The most recent solution found from this start cell.
    pub last_solution: Option<Board>,
}

/// Scale a solution count from the reduced start set up to the whole grid.
///
/// Assumes every reduced start cell carries an equal share of the solutions, which is an
/// approximation when the start set was reduced by rotation.
pub fn project_total(solutions: u64, grid: Grid, start_count: usize) -> u64 {
    if start_count == 0 {
        return 0;
    }
    let scaled = solutions as u128 * grid.cell_count() as u128 / start_count as u128;
    u64::try_from(scaled).unwrap_or(u64::MAX)
}

/// Statistics from a solve
#[derive(Debug, Clone, Default)]
pub struct SearchStatistics {
    /// Total time spent searching
    pub elapsed_time: Duration,
    /// Search nodes visited by finished tasks and the latest snapshots of running ones
    pub nodes_visited: u64,
    /// Start cells whose search ran to completion
    pub tasks_completed: usize,
    /// Size of the start set
    pub tasks_total: usize,
    /// Number of workers in the pool
    pub workers: usize,
}

impl SearchStatistics {
    /// Get search nodes visited per second
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed_time.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.nodes_visited as f64 / secs
        }
    }

    /// Format statistics as a human-readable string
    pub fn format_summary(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!("Time: {:.2?}\n", self.elapsed_time));
        s.push_str(&format!("Workers: {}\n", self.workers));
        s.push_str(&format!(
            "Start cells searched: {}/{}\n",
            self.tasks_completed, self.tasks_total
        ));
        s.push_str(&format!("Nodes visited: {:.2e}\n", self.nodes_visited as f64));
        s.push_str(&format!("Rate: {:.2e} nodes/s\n", self.throughput()));
        s
    }
}

/// Report handed back to the caller when a solve finishes or is interrupted.
#[derive(Debug, Clone)]
pub struct SolveReport {
    pub grid: Grid,
    /// Start cells, in search order.
    pub start_cells: Vec<usize>,
    /// Solutions per start cell, aligned with `start_cells`. Unfinished cells hold the
    /// count of their latest snapshot, or zero.
    pub per_start_solutions: Vec<u64>,
    /// Sum of `per_start_solutions` projected onto the whole grid.
    pub total_solution_estimate: u64,
    pub last_solution: Option<Board>,
    /// Whether the solve was interrupted before every start cell finished.
    pub cancelled: bool,
    pub statistics: SearchStatistics,
}

impl SolveReport {
    /// Solutions found from the searched start cells, before projection.
    pub fn raw_solutions(&self) -> u64 {
        self.per_start_solutions.iter().sum()
    }

    pub fn found_solution(&self) -> bool {
        self.last_solution.is_some()
    }
}

impl std::fmt::Display for SolveReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.last_solution {
            None if self.cancelled => writeln!(f, "No solutions found yet..."),
            None => writeln!(f, "No solutions found..."),
            Some(board) => {
                let label = if self.cancelled {
                    "solutions so far"
                } else {
                    "solutions"
                };
                writeln!(f, "{label}: {}", self.total_solution_estimate)?;
                writeln!(f, "last solution:")?;
                write!(f, "{board}")
            }
        }
    }
}
