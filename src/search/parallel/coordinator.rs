//! Parallel search coordinator that manages worker threads.

use crate::grid::{Board, Grid, MoveTable, reduced_start_cells};
use crate::search::config::SearchConfig;
use crate::search::error::SolveError;
use crate::search::parallel::cancel::CancelToken;
use crate::search::parallel::channel::{
    CoordinatorChannels, WorkerMessage, WorkerSnapshot, create_channels,
};
use crate::search::parallel::config::ParallelConfig;
use crate::search::parallel::worker::run_worker;
use crate::search::result::{SearchStatistics, SolveReport, TaskOutcome, project_total};
use crossbeam_channel::RecvTimeoutError;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Progress handed to a [`ProgressSink`] after every merged snapshot.
///
/// Counts and board come from the same merge point.
#[derive(Debug, Clone)]
pub struct Progress {
    pub elapsed: Duration,
    /// Combined nodes per second of the running workers.
    pub rate: f64,
    pub nodes_visited: u64,
    /// Solutions so far, projected onto the whole grid.
    pub solution_estimate: u64,
    /// A board being searched right now, or the last solution if none is known.
    pub board: Option<Board>,
    pub running_workers: usize,
    pub tasks_completed: usize,
    pub tasks_total: usize,
}

/// Consumer of periodic progress, such as a terminal renderer.
pub trait ProgressSink {
    fn on_progress(&mut self, progress: &Progress);
}

impl<F: FnMut(&Progress)> ProgressSink for F {
    fn on_progress(&mut self, progress: &Progress) {
        self(progress)
    }
}

/// Sink that discards all progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl ProgressSink for Silent {
    fn on_progress(&mut self, _progress: &Progress) {}
}

/// Result of a task as announced over the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FinishedTask {
    solutions: u64,
    nodes: u64,
}

/// The coordinator's merged view of its workers.
///
/// Snapshots are last-write-wins per worker; stale or duplicate ones are ignored. Totals
/// are derived on demand.
#[derive(Debug, Default)]
pub struct AggregateState {
    /// Latest snapshot of every worker with a task in progress.
    running: BTreeMap<usize, WorkerSnapshot>,
    /// Worker id to the start index it is working on.
    active: BTreeMap<usize, usize>,
    /// Start index to the result announced by its worker.
    finished: BTreeMap<usize, FinishedTask>,
    /// Most recent solution seen in any message.
    latest_solution: Option<Board>,
}

impl AggregateState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one worker message. Returns true if it changed the running view.
    pub fn apply(&mut self, msg: WorkerMessage) -> bool {
        match msg {
            WorkerMessage::Started { worker_id, task } => {
                self.running.remove(&worker_id);
                self.active.insert(worker_id, task.start_index);
                true
            }
            WorkerMessage::Snapshot(snapshot) => self.merge_snapshot(snapshot),
            WorkerMessage::Finished {
                worker_id,
                task,
                solutions,
                nodes,
                last_solution,
            } => {
                if self.active.get(&worker_id) == Some(&task.start_index) {
                    self.active.remove(&worker_id);
                    self.running.remove(&worker_id);
                }
                self.finished
                    .insert(task.start_index, FinishedTask { solutions, nodes });
                if last_solution.is_some() {
                    self.latest_solution = last_solution;
                }
                true
            }
        }
    }

    fn merge_snapshot(&mut self, snapshot: WorkerSnapshot) -> bool {
        if self.finished.contains_key(&snapshot.start_index) {
            return false;
        }
        if let Some(current) = self.running.get(&snapshot.worker_id) {
            if current.seq >= snapshot.seq {
                return false;
            }
        }
        if let Some(solution) = &snapshot.last_solution {
            self.latest_solution = Some(solution.clone());
        }
        self.running.insert(snapshot.worker_id, snapshot);
        true
    }

    /// Workers that announced a task and have not reported it stopped or finished.
    pub fn running_workers(&self) -> usize {
        self.active
            .keys()
            .filter(|id| self.running.get(id).map_or(true, |s| s.running))
            .count()
    }

    pub fn tasks_completed(&self) -> usize {
        self.finished.len()
    }

    pub fn is_finished(&self, start_index: usize) -> bool {
        self.finished.contains_key(&start_index)
    }

    /// Solutions from finished tasks plus the latest counts of running ones.
    pub fn solutions_so_far(&self) -> u64 {
        let finished: u64 = self.finished.values().map(|t| t.solutions).sum();
        let running: u64 = self.running.values().map(|s| s.solutions).sum();
        finished + running
    }

    pub fn nodes_so_far(&self) -> u64 {
        let finished: u64 = self.finished.values().map(|t| t.nodes).sum();
        let running: u64 = self.running.values().map(|s| s.nodes).sum();
        finished + running
    }

    /// Combined throughput of the running workers.
    pub fn throughput(&self) -> f64 {
        self.running
            .values()
            .filter(|s| s.running)
            .map(|s| s.throughput)
            .sum()
    }

    /// Best available solution count per start index.
    pub fn per_start_solutions(&self, tasks: usize) -> Vec<u64> {
        let mut counts = vec![0; tasks];
        for snapshot in self.running.values() {
            if let Some(slot) = counts.get_mut(snapshot.start_index) {
                *slot = snapshot.solutions;
            }
        }
        for (&index, task) in &self.finished {
            if let Some(slot) = counts.get_mut(index) {
                *slot = task.solutions;
            }
        }
        counts
    }

    pub fn latest_solution(&self) -> Option<&Board> {
        self.latest_solution.as_ref()
    }

    /// A board currently being searched, falling back to the latest solution.
    pub fn current_board(&self) -> Option<&Board> {
        self.running
            .values()
            .next()
            .map(|s| &s.board)
            .or(self.latest_solution.as_ref())
    }
}

/// Search every start cell of the configured grid across a pool of worker threads.
///
/// Returns early with a best-effort report if `cancel` is triggered. Workers still inside a
/// search at that point are not joined; they stop when the process exits.
pub fn solve<S: ProgressSink>(
    search_config: &SearchConfig,
    parallel_config: &ParallelConfig,
    cancel: &CancelToken,
    sink: &mut S,
) -> Result<SolveReport, SolveError> {
    let start_time = Instant::now();
    let grid = search_config.validate()?;
    parallel_config.validate()?;

    let moves = Arc::new(MoveTable::build(grid));
    let start_cells = reduced_start_cells(grid);
    let num_workers = parallel_config.effective_workers(start_cells.len());

    log::info!(
        "Searching {} grid from {} start cells with {} workers",
        grid,
        start_cells.len(),
        num_workers
    );

    let (coordinator_channels, worker_channels) = create_channels(
        &start_cells,
        num_workers,
        parallel_config.channel_capacity,
        cancel.clone(),
    );

    let stack_size = parallel_config.stack_size_for(grid);
    let mut worker_handles: Vec<JoinHandle<Vec<TaskOutcome>>> = Vec::with_capacity(num_workers);
    for (worker_id, channels) in worker_channels.into_iter().enumerate() {
        let moves = Arc::clone(&moves);
        let interval = search_config.snapshot_interval;
        let spawned = thread::Builder::new()
            .name(format!("numseq-worker-{worker_id}"))
            .stack_size(stack_size)
            .spawn(move || run_worker(worker_id, &moves, interval, channels));

        match spawned {
            Ok(handle) => worker_handles.push(handle),
            Err(e) => {
                log::warn!("Failed to spawn worker {}: {}", worker_id, e);
                // Already running workers stop at their next task boundary.
                cancel.cancel();
                cancel.mark_stopped();
                return Err(SolveError::Spawn(e));
            }
        }
    }

    let aggregate = run_coordinator(
        grid,
        start_cells.len(),
        coordinator_channels,
        parallel_config.poll_interval,
        start_time,
        sink,
    );

    let all_finished = (0..start_cells.len()).all(|i| aggregate.is_finished(i));
    let report = if cancel.is_cancelled() && !all_finished {
        log::info!(
            "Search interrupted after {}/{} start cells",
            aggregate.tasks_completed(),
            start_cells.len()
        );
        // Abandon running workers rather than wait for a search that cannot be paused.
        drop(worker_handles);
        partial_report(grid, start_cells, &aggregate, num_workers, start_time)
    } else {
        let outcomes = join_workers(worker_handles);
        final_report(grid, start_cells, outcomes, &aggregate, num_workers, start_time)
    };
    cancel.mark_stopped();

    Ok(report)
}

/// Coordinator loop that drains worker messages until every worker exits or cancellation.
fn run_coordinator<S: ProgressSink>(
    grid: Grid,
    tasks_total: usize,
    channels: CoordinatorChannels,
    poll_interval: Duration,
    start_time: Instant,
    sink: &mut S,
) -> AggregateState {
    let mut aggregate = AggregateState::new();

    loop {
        if channels.cancel.is_cancelled() {
            // Results already queued are still part of the best-effort report.
            while let Ok(msg) = channels.from_workers.try_recv() {
                aggregate.apply(msg);
            }
            break;
        }

        match channels.from_workers.recv_timeout(poll_interval) {
            Ok(msg) => {
                let is_snapshot = matches!(msg, WorkerMessage::Snapshot(_));
                if aggregate.apply(msg) && is_snapshot {
                    sink.on_progress(&progress(&aggregate, grid, tasks_total, start_time));
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                // All senders dropped, we're done
                break;
            }
        }
    }

    aggregate
}

fn progress(
    aggregate: &AggregateState,
    grid: Grid,
    tasks_total: usize,
    start_time: Instant,
) -> Progress {
    Progress {
        elapsed: start_time.elapsed(),
        rate: aggregate.throughput(),
        nodes_visited: aggregate.nodes_so_far(),
        solution_estimate: project_total(aggregate.solutions_so_far(), grid, tasks_total),
        board: aggregate.current_board().cloned(),
        running_workers: aggregate.running_workers(),
        tasks_completed: aggregate.tasks_completed(),
        tasks_total,
    }
}

/// Wait for every worker and collect their task outcomes.
fn join_workers(handles: Vec<JoinHandle<Vec<TaskOutcome>>>) -> Vec<TaskOutcome> {
    let mut outcomes = Vec::new();
    for handle in handles {
        let name = handle.thread().name().unwrap_or("worker").to_string();
        match handle.join() {
            Ok(worker_outcomes) => outcomes.extend(worker_outcomes),
            Err(_) => log::warn!("{} panicked; using its last reported results", name),
        }
    }
    outcomes
}

fn final_report(
    grid: Grid,
    start_cells: Vec<usize>,
    outcomes: Vec<TaskOutcome>,
    aggregate: &AggregateState,
    workers: usize,
    start_time: Instant,
) -> SolveReport {
    let tasks_total = start_cells.len();
    // Announced results cover any worker that died before returning.
    let mut per_start_solutions = aggregate.per_start_solutions(tasks_total);
    let mut completed: Vec<bool> = (0..tasks_total).map(|i| aggregate.is_finished(i)).collect();

    let mut nodes_from_outcomes = 0;
    let mut last_solution: Option<(usize, Board)> = None;
    for outcome in outcomes {
        per_start_solutions[outcome.start_index] = outcome.solutions;
        completed[outcome.start_index] = true;
        nodes_from_outcomes += outcome.nodes;
        if let Some(board) = outcome.last_solution {
            let newer = match &last_solution {
                Some((index, _)) => outcome.start_index > *index,
                None => true,
            };
            if newer {
                last_solution = Some((outcome.start_index, board));
            }
        }
    }

    let raw: u64 = per_start_solutions.iter().sum();
    let tasks_completed = completed.iter().filter(|&&c| c).count();
    let statistics = SearchStatistics {
        elapsed_time: start_time.elapsed(),
        nodes_visited: nodes_from_outcomes.max(aggregate.nodes_so_far()),
        tasks_completed,
        tasks_total,
        workers,
    };

    log::info!(
        "Search finished: {} raw solutions from {} start cells in {:.2?}",
        raw,
        tasks_total,
        statistics.elapsed_time
    );

    SolveReport {
        grid,
        start_cells,
        total_solution_estimate: project_total(raw, grid, tasks_total),
        per_start_solutions,
        last_solution: last_solution
            .map(|(_, board)| board)
            .or_else(|| aggregate.latest_solution().cloned()),
        cancelled: tasks_completed < tasks_total,
        statistics,
    }
}

fn partial_report(
    grid: Grid,
    start_cells: Vec<usize>,
    aggregate: &AggregateState,
    workers: usize,
    start_time: Instant,
) -> SolveReport {
    let tasks_total = start_cells.len();
    let per_start_solutions = aggregate.per_start_solutions(tasks_total);
    let raw: u64 = per_start_solutions.iter().sum();

    SolveReport {
        grid,
        start_cells,
        total_solution_estimate: project_total(raw, grid, tasks_total),
        per_start_solutions,
        last_solution: aggregate.latest_solution().cloned(),
        cancelled: true,
        statistics: SearchStatistics {
            elapsed_time: start_time.elapsed(),
            nodes_visited: aggregate.nodes_so_far(),
            tasks_completed: aggregate.tasks_completed(),
            tasks_total,
            workers,
        },
    }
}
