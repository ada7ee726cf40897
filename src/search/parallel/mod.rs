//! Parallel search execution over the start cells of a grid.
//!
//! # Architecture
//!
//! The parallel search system consists of:
//! - A **coordinator** that spawns a fixed pool of worker threads, drains their messages
//!   into an [`AggregateState`] and builds the final report
//! - **Workers** that take start cells from a shared queue and run one backtracking
//!   search per cell on a board they own
//! - A **channel system**: a pre-filled task queue and a bounded channel for lifecycle
//!   messages and throttled progress snapshots
//! - A [`CancelToken`] checked by workers before every new start cell
//!
//! Workers share nothing but the read-only move table.
//!
//! # Example
//!
//! ```no_run
//! use number_sequence::search::parallel::{CancelToken, ParallelConfig, Silent, solve};
//! use number_sequence::search::SearchConfig;
//!
//! let config = ParallelConfig::default().with_workers(4);
//! let report = solve(&SearchConfig::new(5, 5), &config, &CancelToken::new(), &mut Silent)?;
//! println!("{report}");
//! # Ok::<(), number_sequence::SolveError>(())
//! ```

pub mod cancel;
pub mod channel;
pub mod config;
pub mod coordinator;
pub mod worker;

pub use cancel::{CancelState, CancelToken};
pub use config::ParallelConfig;
pub use coordinator::{AggregateState, Progress, ProgressSink, Silent, solve};
