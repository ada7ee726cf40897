//! Configuration types for the grid search

use crate::grid::Grid;
use std::fmt;

/// Search nodes between two progress snapshots of a worker.
///
/// Sampling on every node slows the search down by orders of magnitude, so the interval is
/// a node count rather than a wall-clock check.
pub const DEFAULT_SNAPSHOT_INTERVAL: u64 = 1_000_000;

/// Invalid search or pool configuration, reported before any search starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A grid dimension is zero.
    EmptyDimension { rows: usize, cols: usize },
    /// `rows * cols` does not fit in a label.
    GridTooLarge { rows: usize, cols: usize },
    /// The worker pool has no workers.
    NoWorkers,
    /// The snapshot interval is zero.
    ZeroSnapshotInterval,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyDimension { rows, cols } => {
                write!(f, "grid dimensions must be positive (got {rows}x{cols})")
            }
            ConfigError::GridTooLarge { rows, cols } => {
                write!(f, "grid {rows}x{cols} has too many cells")
            }
            ConfigError::NoWorkers => write!(f, "worker count must be positive"),
            ConfigError::ZeroSnapshotInterval => {
                write!(f, "snapshot interval must be positive")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// What to search: the grid and how often workers report progress.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub rows: usize,
    pub cols: usize,
    /// Search nodes between progress snapshots.
    pub snapshot_interval: u64,
}

impl SearchConfig {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            snapshot_interval: DEFAULT_SNAPSHOT_INTERVAL,
        }
    }

    pub fn with_snapshot_interval(mut self, interval: u64) -> Self {
        self.snapshot_interval = interval;
        self
    }

    /// Check the configuration and return the grid it describes.
    pub fn validate(&self) -> Result<Grid, ConfigError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(ConfigError::EmptyDimension {
                rows: self.rows,
                cols: self.cols,
            });
        }

        let too_large = ConfigError::GridTooLarge {
            rows: self.rows,
            cols: self.cols,
        };
        let cells = self.rows.checked_mul(self.cols).ok_or(too_large.clone())?;
        if u32::try_from(cells).is_err() {
            return Err(too_large);
        }

        if self.snapshot_interval == 0 {
            return Err(ConfigError::ZeroSnapshotInterval);
        }

        Ok(Grid::new(self.rows, self.cols))
    }
}
