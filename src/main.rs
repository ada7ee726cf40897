use clap::Parser;
use number_sequence::grid::{Grid, MoveTable, reduced_start_cells};
use number_sequence::search::config::DEFAULT_SNAPSHOT_INTERVAL;
use number_sequence::search::parallel::{
    CancelToken, ParallelConfig, Progress, ProgressSink, Silent, solve,
};
use number_sequence::search::{SearchConfig, SolveReport};
use std::time::{Duration, Instant};

// --- Command Line Arguments ---

#[derive(Parser)]
#[command(name = "numseq")]
#[command(about = "numseq - exhaustive number sequence search")]
#[command(version)]
#[command(arg_required_else_help = true)]
struct Args {
    /// Number of grid rows
    rows: usize,
    /// Number of grid columns
    cols: usize,
    /// Number of worker threads (defaults to the number of CPUs)
    #[arg(long, short = 'j')]
    workers: Option<usize>,
    /// Search nodes between two progress snapshots of a worker
    #[arg(long, default_value_t = DEFAULT_SNAPSHOT_INTERVAL)]
    snapshot_interval: u64,
    /// Print the table of allowed moves before searching
    #[arg(long)]
    show_moves: bool,
    /// Do not print progress while searching
    #[arg(long, short)]
    quiet: bool,
    /// Enable debug logging
    #[arg(long, short)]
    verbose: bool,
}

/// Prints progress lines, at most one per `min_gap`.
struct TerminalRenderer {
    min_gap: Duration,
    last_print: Option<Instant>,
}

impl TerminalRenderer {
    fn new(min_gap: Duration) -> Self {
        Self {
            min_gap,
            last_print: None,
        }
    }
}

impl ProgressSink for TerminalRenderer {
    fn on_progress(&mut self, progress: &Progress) {
        if self.last_print.is_some_and(|t| t.elapsed() < self.min_gap) {
            return;
        }
        self.last_print = Some(Instant::now());

        println!(
            "[{:.1?}] start cells {}/{} ({} running)",
            progress.elapsed,
            progress.tasks_completed,
            progress.tasks_total,
            progress.running_workers
        );
        println!("total moves:      {:.2e}", progress.nodes_visited as f64);
        println!("rate:             {:.2e} moves/s", progress.rate);
        println!("solutions so far: {}", progress.solution_estimate);
        if let Some(board) = &progress.board {
            print!("{board}");
        }
        println!();
    }
}

fn print_report(report: &SolveReport) {
    println!();
    println!("total moves: {}", report.statistics.nodes_visited);
    print!("{report}");
    println!();
    print!("{}", report.statistics.format_summary());
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let search_config =
        SearchConfig::new(args.rows, args.cols).with_snapshot_interval(args.snapshot_interval);
    let parallel_config = ParallelConfig::default().with_workers_option(args.workers);

    let grid: Grid = search_config.validate()?;
    parallel_config.validate()?;

    if args.show_moves {
        println!("Table of the allowed moves as a function of current position");
        print!("{}", MoveTable::build(grid));
    }

    if grid.is_square() {
        println!("Rotational symmetry of a square board reduces the search space");
    } else {
        println!("Symmetries uncalculated, optimizations might be possible");
    }
    println!("Search space of starting positions:");
    println!("{:?}", reduced_start_cells(grid));

    let cancel = CancelToken::new();
    cancel.install_interrupt_handler()?;
    println!("\nPress Ctrl+C to stop execution\n");

    let report = if args.quiet {
        solve(&search_config, &parallel_config, &cancel, &mut Silent)?
    } else {
        let mut renderer = TerminalRenderer::new(Duration::from_secs(1));
        solve(&search_config, &parallel_config, &cancel, &mut renderer)?
    };

    if report.cancelled {
        println!("\nYou pressed Ctrl+C!");
        print_report(&report);
        // Workers still inside a search cannot be paused; exiting ends them.
        std::process::exit(0);
    }

    print_report(&report);
    Ok(())
}

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::init_from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, default_level),
    );

    if let Err(e) = run(args) {
        log::error!("{e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
