//! Search for number sequences
//!
//! - [`engine`]: single-threaded backtracking over one reused board
//! - [`parallel`]: a worker pool that runs one engine per start cell and a coordinator that
//!   merges their progress into a final report

pub mod config;
pub mod engine;
pub mod error;
pub mod parallel;
pub mod result;

pub use config::{ConfigError, SearchConfig};
pub use engine::{SearchEngine, SearchObserver};
pub use error::SolveError;
pub use result::{SearchStatistics, SolveReport, TaskOutcome};
