//! Channels between the coordinator and its workers.
//!
//! Start cells are handed out through a pre-filled task queue. Workers report back over a
//! single bounded channel: lifecycle messages block until the coordinator takes them, while
//! progress snapshots are dropped when the channel is full.

use crate::grid::Board;
use crate::search::parallel::cancel::CancelToken;
use crossbeam_channel::{Receiver, Sender, TrySendError, bounded, unbounded};

/// One start cell to search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Task {
    /// Position of the cell in the start set.
    pub start_index: usize,
    pub start_cell: usize,
}

/// Point-in-time progress of one worker's current task.
#[derive(Debug, Clone)]
pub struct WorkerSnapshot {
    pub worker_id: usize,
    /// Per-worker sequence number, increasing with every snapshot.
    pub seq: u64,
    pub start_index: usize,
    /// Search nodes per second since the previous snapshot.
    pub throughput: f64,
    /// Search nodes visited by the current task so far.
    pub nodes: u64,
    /// Solutions found by the current task so far.
    pub solutions: u64,
    /// The board being searched at the moment of the snapshot.
    pub board: Board,
    pub last_solution: Option<Board>,
    /// False on the snapshot a worker sends once its task's search has returned.
    pub running: bool,
}

/// Message sent from workers to the coordinator.
#[derive(Debug, Clone)]
pub enum WorkerMessage {
    /// Worker picked up a task.
    Started { worker_id: usize, task: Task },
    /// Throttled progress of a running task.
    Snapshot(WorkerSnapshot),
    /// Worker finished a task.
    Finished {
        worker_id: usize,
        task: Task,
        solutions: u64,
        nodes: u64,
        last_solution: Option<Board>,
    },
}

impl WorkerMessage {
    pub fn worker_id(&self) -> usize {
        match self {
            WorkerMessage::Started { worker_id, .. } | WorkerMessage::Finished { worker_id, .. } => {
                *worker_id
            }
            WorkerMessage::Snapshot(snapshot) => snapshot.worker_id,
        }
    }
}

/// Channel endpoints for a worker.
pub struct WorkerChannels {
    /// Send messages to coordinator.
    pub to_coordinator: Sender<WorkerMessage>,
    /// Start cells still waiting for a worker.
    pub tasks: Receiver<Task>,
    /// Checked before every new task.
    pub cancel: CancelToken,
}

impl WorkerChannels {
    /// Send a lifecycle message. Fails only once the coordinator has stopped listening,
    /// in which case the message is no longer needed.
    pub fn send(&self, msg: WorkerMessage) {
        let _ = self.to_coordinator.send(msg);
    }

    /// Offer a snapshot without blocking. Returns false if it was dropped.
    pub fn offer(&self, snapshot: WorkerSnapshot) -> bool {
        match self.to_coordinator.try_send(WorkerMessage::Snapshot(snapshot)) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// Take the next task, unless cancellation was requested or the queue is drained.
    pub fn next_task(&self) -> Option<Task> {
        if self.cancel.is_cancelled() {
            return None;
        }
        self.tasks.try_recv().ok()
    }
}

/// Channel endpoints for the coordinator.
pub struct CoordinatorChannels {
    /// Receive messages from workers. Disconnects once every worker has exited.
    pub from_workers: Receiver<WorkerMessage>,
    pub cancel: CancelToken,
}

/// Create channels for `num_workers` workers sharing the given start cells.
pub fn create_channels(
    start_cells: &[usize],
    num_workers: usize,
    capacity: usize,
    cancel: CancelToken,
) -> (CoordinatorChannels, Vec<WorkerChannels>) {
    // Every task is queued up front, so workers never wait on the queue.
    let (task_tx, task_rx) = unbounded();
    for (start_index, &start_cell) in start_cells.iter().enumerate() {
        let _ = task_tx.send(Task {
            start_index,
            start_cell,
        });
    }
    drop(task_tx);

    let (worker_tx, coordinator_rx) = bounded(capacity.max(1));

    let worker_channels = (0..num_workers)
        .map(|_| WorkerChannels {
            to_coordinator: worker_tx.clone(),
            tasks: task_rx.clone(),
            cancel: cancel.clone(),
        })
        .collect();

    let coordinator = CoordinatorChannels {
        from_workers: coordinator_rx,
        cancel,
    };

    (coordinator, worker_channels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;

    fn snapshot(worker_id: usize, seq: u64) -> WorkerSnapshot {
        WorkerSnapshot {
            worker_id,
            seq,
            start_index: 0,
            throughput: 0.0,
            nodes: seq,
            solutions: 0,
            board: Board::new(Grid::new(2, 2)),
            last_solution: None,
            running: true,
        }
    }

    #[test]
    fn test_tasks_queued_in_order() {
        let (_coordinator, workers) = create_channels(&[0, 1, 4], 2, 8, CancelToken::new());

        assert_eq!(workers.len(), 2);
        let first = workers[0].next_task().unwrap();
        let second = workers[1].next_task().unwrap();
        let third = workers[0].next_task().unwrap();
        assert_eq!(first, Task { start_index: 0, start_cell: 0 });
        assert_eq!(second, Task { start_index: 1, start_cell: 1 });
        assert_eq!(third, Task { start_index: 2, start_cell: 4 });
        assert!(workers[1].next_task().is_none());
    }

    #[test]
    fn test_cancel_stops_task_handout() {
        let cancel = CancelToken::new();
        let (_coordinator, workers) = create_channels(&[0, 1], 1, 8, cancel.clone());

        cancel.cancel();
        assert!(workers[0].next_task().is_none());
    }

    #[test]
    fn test_full_channel_drops_snapshots() {
        let (coordinator, workers) = create_channels(&[0], 1, 2, CancelToken::new());

        assert!(workers[0].offer(snapshot(0, 1)));
        assert!(workers[0].offer(snapshot(0, 2)));
        assert!(!workers[0].offer(snapshot(0, 3)));

        let received = coordinator.from_workers.try_recv().unwrap();
        assert_eq!(received.worker_id(), 0);
        match received {
            WorkerMessage::Snapshot(s) => assert_eq!(s.seq, 1),
            other => panic!("Unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_disconnect_after_workers_drop() {
        let (coordinator, workers) = create_channels(&[0], 2, 4, CancelToken::new());
        workers[0].send(WorkerMessage::Started {
            worker_id: 0,
            task: Task { start_index: 0, start_cell: 0 },
        });
        drop(workers);

        assert!(coordinator.from_workers.recv().is_ok());
        assert!(coordinator.from_workers.recv().is_err());
    }

    #[test]
    fn test_offer_after_coordinator_gone() {
        let (coordinator, workers) = create_channels(&[0], 1, 4, CancelToken::new());
        drop(coordinator);
        assert!(!workers[0].offer(snapshot(0, 1)));
        // Lifecycle sends must not panic either.
        workers[0].send(WorkerMessage::Started {
            worker_id: 0,
            task: Task { start_index: 0, start_cell: 0 },
        });
    }
}
