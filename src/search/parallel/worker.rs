//! Worker loop: one search engine run per start cell.

use crate::grid::{Board, MoveTable};
use crate::search::engine::{SearchEngine, SearchObserver};
use crate::search::parallel::channel::{Task, WorkerChannels, WorkerMessage, WorkerSnapshot};
use crate::search::result::TaskOutcome;
use std::time::Instant;

/// Observer that counts solutions and emits a snapshot every `interval` nodes.
struct SnapshotReporter<'a> {
    worker_id: usize,
    start_index: usize,
    channels: &'a WorkerChannels,
    interval: u64,
    until_snapshot: u64,
    seq: &'a mut u64,
    nodes: u64,
    solutions: u64,
    last_solution: Option<Board>,
    sample_start: Instant,
    sample_nodes: u64,
}

impl<'a> SnapshotReporter<'a> {
    fn new(
        worker_id: usize,
        start_index: usize,
        channels: &'a WorkerChannels,
        interval: u64,
        seq: &'a mut u64,
    ) -> Self {
        Self {
            worker_id,
            start_index,
            channels,
            interval,
            until_snapshot: interval,
            seq,
            nodes: 0,
            solutions: 0,
            last_solution: None,
            sample_start: Instant::now(),
            sample_nodes: 0,
        }
    }

    fn emit(&mut self, board: &Board, running: bool) {
        let now = Instant::now();
        let secs = now.duration_since(self.sample_start).as_secs_f64();
        let throughput = if secs > 0.0 {
            (self.nodes - self.sample_nodes) as f64 / secs
        } else {
            0.0
        };
        self.sample_start = now;
        self.sample_nodes = self.nodes;

        *self.seq += 1;
        self.channels.offer(WorkerSnapshot {
            worker_id: self.worker_id,
            seq: *self.seq,
            start_index: self.start_index,
            throughput,
            nodes: self.nodes,
            solutions: self.solutions,
            board: board.clone(),
            last_solution: self.last_solution.clone(),
            running,
        });
    }
}

impl SearchObserver for SnapshotReporter<'_> {
    #[inline]
    fn on_visit(&mut self, board: &Board) {
        self.nodes += 1;
        self.until_snapshot -= 1;
        if self.until_snapshot == 0 {
            self.until_snapshot = self.interval;
            self.emit(board, true);
        }
    }

    fn on_solution(&mut self, solution: Board) {
        self.solutions += 1;
        self.last_solution = Some(solution);
    }
}

/// Search every start cell from the queue until it is drained or cancellation is requested.
///
/// Returns the outcome of every task this worker completed.
pub fn run_worker(
    worker_id: usize,
    moves: &MoveTable,
    snapshot_interval: u64,
    channels: WorkerChannels,
) -> Vec<TaskOutcome> {
    let mut outcomes = Vec::new();
    let mut seq = 0;

    while let Some(task) = channels.next_task() {
        log::debug!(
            "Worker {} starting at cell {} (start #{})",
            worker_id,
            task.start_cell,
            task.start_index
        );
        channels.send(WorkerMessage::Started { worker_id, task });

        let outcome = run_task(worker_id, moves, task, snapshot_interval, &channels, &mut seq);

        log::debug!(
            "Worker {} finished cell {}: {} solutions, {} nodes",
            worker_id,
            task.start_cell,
            outcome.solutions,
            outcome.nodes
        );
        channels.send(WorkerMessage::Finished {
            worker_id,
            task,
            solutions: outcome.solutions,
            nodes: outcome.nodes,
            last_solution: outcome.last_solution.clone(),
        });
        outcomes.push(outcome);
    }

    if channels.cancel.is_cancelled() {
        log::debug!("Worker {} stopping on cancellation", worker_id);
    }
    outcomes
}

/// Search one start cell on a fresh board, ending with a stopped snapshot of the task.
fn run_task(
    worker_id: usize,
    moves: &MoveTable,
    task: Task,
    snapshot_interval: u64,
    channels: &WorkerChannels,
    seq: &mut u64,
) -> TaskOutcome {
    let mut reporter = SnapshotReporter::new(
        worker_id,
        task.start_index,
        channels,
        snapshot_interval.max(1),
        seq,
    );
    let mut engine = SearchEngine::new(moves);

    let mut board = Board::new(moves.grid());
    board.set(task.start_cell, 1);
    let solutions = engine.search(&mut board, task.start_cell, 2, &mut reporter);
    reporter.emit(&board, false);

    TaskOutcome {
        start_index: task.start_index,
        start_cell: task.start_cell,
        solutions,
        nodes: engine.nodes(),
        last_solution: reporter.last_solution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use crate::search::parallel::cancel::CancelToken;
    use crate::search::parallel::channel::create_channels;

    #[test]
    fn test_worker_drains_queue_in_order() {
        let grid = Grid::new(1, 1);
        let moves = MoveTable::build(grid);
        let (coordinator, mut workers) = create_channels(&[0], 1, 16, CancelToken::new());

        let outcomes = run_worker(0, &moves, 1, workers.remove(0));

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].solutions, 1);
        assert_eq!(outcomes[0].last_solution.as_ref().unwrap().cells(), &[1]);

        let messages: Vec<_> = coordinator.from_workers.try_iter().collect();
        assert!(matches!(messages.first(), Some(WorkerMessage::Started { .. })));
        assert!(matches!(messages.last(), Some(WorkerMessage::Finished { solutions: 1, .. })));
        // interval 1: one snapshot per node, then the stopped one
        let snapshots: Vec<&WorkerSnapshot> = messages
            .iter()
            .filter_map(|m| match m {
                WorkerMessage::Snapshot(s) => Some(s),
                _ => None,
            })
            .collect();
        assert_eq!(snapshots.len(), 2);
        assert!(snapshots[0].running);
        assert!(!snapshots[1].running);
        assert_eq!(snapshots[1].solutions, 1);
        assert_eq!(snapshots[1].board.cells(), &[1]);
    }

    #[test]
    fn test_snapshots_are_throttled() {
        let grid = Grid::new(4, 4);
        let moves = MoveTable::build(grid);
        let starts: Vec<usize> = (0..16).collect();
        let (coordinator, mut workers) = create_channels(&starts, 1, 1 << 16, CancelToken::new());

        let outcomes = run_worker(0, &moves, 10, workers.remove(0));
        let total_nodes: u64 = outcomes.iter().map(|o| o.nodes).sum();

        let mut last_seq = 0;
        let mut periodic = 0;
        let mut stopped = Vec::new();
        for msg in coordinator.from_workers.try_iter() {
            if let WorkerMessage::Snapshot(s) = msg {
                assert!(s.seq > last_seq);
                last_seq = s.seq;
                if s.running {
                    periodic += 1;
                } else {
                    stopped.push(s);
                }
            }
        }
        let expected: u64 = outcomes.iter().map(|o| o.nodes / 10).sum();
        assert_eq!(periodic, expected);
        assert!(periodic <= total_nodes / 10);

        // One stopped snapshot per task, carrying its final counts.
        assert_eq!(stopped.len(), outcomes.len());
        for (snapshot, outcome) in stopped.iter().zip(&outcomes) {
            assert_eq!(snapshot.start_index, outcome.start_index);
            assert_eq!(snapshot.nodes, outcome.nodes);
            assert_eq!(snapshot.solutions, outcome.solutions);
            assert_eq!(snapshot.board.placed(), 1);
        }
    }

    #[test]
    fn test_cancelled_worker_takes_no_task() {
        let moves = MoveTable::build(Grid::new(3, 3));
        let cancel = CancelToken::new();
        let (coordinator, mut workers) = create_channels(&[0, 1, 4], 1, 16, cancel.clone());
        cancel.cancel();

        let outcomes = run_worker(0, &moves, 1, workers.remove(0));

        assert!(outcomes.is_empty());
        assert_eq!(coordinator.from_workers.try_iter().count(), 0);
    }
}
