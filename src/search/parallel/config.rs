//! Configuration for parallel search execution.

use crate::grid::Grid;
use crate::search::config::ConfigError;
use std::time::Duration;

/// Smallest stack handed to a worker thread.
const MIN_WORKER_STACK: usize = 2 * 1024 * 1024;
/// Generous upper bound on the stack used by one recursion frame of the engine.
const STACK_PER_CELL: usize = 256;

/// Configuration for parallel search execution.
#[derive(Debug, Clone)]
pub struct ParallelConfig {
    /// Number of worker threads to spawn.
    pub num_workers: usize,
    /// How long the coordinator waits on an empty channel before checking for cancellation.
    pub poll_interval: Duration,
    /// Capacity of the worker-to-coordinator channel. Snapshots that do not fit are dropped.
    pub channel_capacity: usize,
    /// Stack size of worker threads (None = derived from the grid size).
    pub worker_stack_size: Option<usize>,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            num_workers: num_cpus::get(),
            poll_interval: Duration::from_millis(100),
            channel_capacity: 1024,
            worker_stack_size: None,
        }
    }
}

impl ParallelConfig {
    /// Set the number of workers. Zero is rejected by [`validate`](Self::validate).
    pub fn with_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = num_workers;
        self
    }

    /// Set the number of workers from an Option, keeping the default for None.
    pub fn with_workers_option(mut self, num_workers: Option<usize>) -> Self {
        if let Some(n) = num_workers {
            self.num_workers = n;
        }
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    pub fn with_stack_size(mut self, bytes: usize) -> Self {
        self.worker_stack_size = Some(bytes);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        Ok(())
    }

    /// Workers actually spawned: never more than there are start cells, and at least one.
    pub fn effective_workers(&self, tasks: usize) -> usize {
        self.num_workers.min(tasks).max(1)
    }

    /// Stack size for workers searching `grid`. Recursion depth equals the cell count.
    pub fn stack_size_for(&self, grid: Grid) -> usize {
        self.worker_stack_size.unwrap_or_else(|| {
            grid.cell_count()
                .saturating_mul(STACK_PER_CELL)
                .saturating_add(MIN_WORKER_STACK)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ParallelConfig::default();
        assert!(config.num_workers >= 1);
        assert_eq!(config.poll_interval, Duration::from_millis(100));
        assert!(config.worker_stack_size.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = ParallelConfig::default()
            .with_workers(4)
            .with_poll_interval(Duration::from_millis(5))
            .with_channel_capacity(0)
            .with_stack_size(1 << 20);

        assert_eq!(config.num_workers, 4);
        assert_eq!(config.poll_interval, Duration::from_millis(5));
        assert_eq!(config.channel_capacity, 1);
        assert_eq!(config.stack_size_for(Grid::new(10, 10)), 1 << 20);
    }

    #[test]
    fn test_workers_option() {
        let default_workers = ParallelConfig::default().num_workers;
        assert_eq!(
            ParallelConfig::default().with_workers_option(None).num_workers,
            default_workers
        );
        assert_eq!(
            ParallelConfig::default()
                .with_workers_option(Some(3))
                .num_workers,
            3
        );
    }

    #[test]
    fn test_zero_workers_rejected() {
        let config = ParallelConfig::default().with_workers(0);
        assert_eq!(config.validate(), Err(ConfigError::NoWorkers));
    }

    #[test]
    fn test_effective_workers() {
        let config = ParallelConfig::default().with_workers(8);
        assert_eq!(config.effective_workers(3), 3);
        assert_eq!(config.effective_workers(20), 8);
        assert_eq!(config.effective_workers(0), 1);
    }

    #[test]
    fn test_stack_grows_with_grid() {
        let config = ParallelConfig::default();
        let small = config.stack_size_for(Grid::new(1, 1));
        let large = config.stack_size_for(Grid::new(100, 100));
        assert!(small >= MIN_WORKER_STACK);
        assert!(large > small);
    }
}
