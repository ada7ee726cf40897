use number_sequence::grid::{Grid, MoveTable};
use number_sequence::search::parallel::{
    CancelState, CancelToken, ParallelConfig, Progress, Silent, solve,
};
use number_sequence::search::{SearchConfig, SolveReport};
use std::time::Duration;

fn run(rows: usize, cols: usize, workers: usize) -> SolveReport {
    let parallel = ParallelConfig::default()
        .with_workers(workers)
        .with_poll_interval(Duration::from_millis(10));
    solve(
        &SearchConfig::new(rows, cols),
        &parallel,
        &CancelToken::new(),
        &mut Silent,
    )
    .expect("solve failed")
}

#[test]
fn test_5x5_solution_is_valid() {
    let report = run(5, 5, 4);

    assert_eq!(report.start_cells, vec![0, 1, 2, 3, 6, 7, 12]);
    assert_eq!(report.per_start_solutions, vec![552, 548, 552, 548, 412, 400, 352]);
    assert_eq!(report.raw_solutions(), 3364);
    // 3364 * 25 / 7, truncated
    assert_eq!(report.total_solution_estimate, 12014);
    assert!(!report.cancelled);

    let board = report.last_solution.expect("5x5 has solutions");
    let mut labels = board.cells().to_vec();
    labels.sort_unstable();
    assert_eq!(labels, (1..=25).collect::<Vec<u32>>());
    assert!(board.is_solution(&MoveTable::build(Grid::new(5, 5))));
    // Last start cell in search order is the center.
    assert_eq!(board.get(12), 1);
}

#[test]
fn test_1x1_trivial_solution() {
    let report = run(1, 1, 1);
    assert_eq!(report.start_cells, vec![0]);
    assert_eq!(report.per_start_solutions, vec![1]);
    assert_eq!(report.total_solution_estimate, 1);
    assert_eq!(report.last_solution.unwrap().cells(), &[1]);
}

#[test]
fn test_3x3_worker_count_does_not_change_result() {
    let single = run(3, 3, 1);
    let pooled = run(3, 3, 4);

    assert_eq!(single.per_start_solutions, pooled.per_start_solutions);
    assert_eq!(single.total_solution_estimate, pooled.total_solution_estimate);
    assert_eq!(single.total_solution_estimate, 0);
    assert_eq!(single.to_string(), "No solutions found...\n");
}

#[test]
fn test_rectangular_grid_counts() {
    let single = run(4, 5, 1);
    let pooled = run(4, 5, 3);

    assert_eq!(single.start_cells.len(), 20);
    assert_eq!(single.raw_solutions(), 144);
    // No reduction: the projection is the raw count.
    assert_eq!(single.total_solution_estimate, 144);
    assert_eq!(single.per_start_solutions, pooled.per_start_solutions);
    assert_eq!(single.statistics.nodes_visited, pooled.statistics.nodes_visited);
}

#[test]
fn test_repeated_runs_are_identical() {
    let first = run(5, 4, 2);
    let second = run(5, 4, 2);
    assert_eq!(first.per_start_solutions, second.per_start_solutions);
    assert_eq!(first.last_solution, second.last_solution);
}

#[test]
fn test_interrupt_before_any_task() {
    let cancel = CancelToken::new();
    cancel.cancel();

    let report = solve(
        &SearchConfig::new(5, 5),
        &ParallelConfig::default().with_workers(2),
        &cancel,
        &mut Silent,
    )
    .unwrap();

    assert!(report.cancelled);
    assert!(!report.found_solution());
    assert_eq!(report.per_start_solutions, vec![0; 7]);
    assert_eq!(report.to_string(), "No solutions found yet...\n");
    assert_eq!(cancel.state(), CancelState::Stopped);
}

#[test]
fn test_interrupt_from_progress_does_not_hang() {
    let cancel = CancelToken::new();
    let trigger = cancel.clone();
    let search = SearchConfig::new(5, 5).with_snapshot_interval(1000);
    let parallel = ParallelConfig::default()
        .with_workers(1)
        .with_poll_interval(Duration::from_millis(10));

    let report = solve(&search, &parallel, &cancel, &mut |_: &Progress| {
        trigger.cancel();
    })
    .unwrap();

    // The single worker was mid-search when the coordinator stopped waiting.
    assert!(report.cancelled);
    assert!(report.statistics.tasks_completed < report.start_cells.len());
    assert_eq!(cancel.state(), CancelState::Stopped);
}
