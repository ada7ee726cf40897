//! Cooperative cancellation of a solve.
//!
//! The search itself never yields, so a request only takes effect when a worker is about to
//! pick up its next start cell. Tasks already running are left to the process: the
//! coordinator stops waiting for them and reports what it has seen so far.

use crate::search::error::SolveError;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle of a solve with respect to cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelState {
    Running,
    CancelRequested,
    /// The coordinator returned its best-effort report.
    Stopped,
}

impl CancelState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => CancelState::Running,
            1 => CancelState::CancelRequested,
            _ => CancelState::Stopped,
        }
    }
}

/// Shared cancellation flag, cloned into every worker.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    state: Arc<AtomicU8>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CancelState {
        CancelState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Request cancellation. Returns true if this call moved the token out of `Running`.
    pub fn cancel(&self) -> bool {
        self.state
            .compare_exchange(0, 1, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Check if cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.state() != CancelState::Running
    }

    /// Record that the coordinator has produced its report after a cancellation.
    pub fn mark_stopped(&self) {
        let _ = self
            .state
            .compare_exchange(1, 2, Ordering::SeqCst, Ordering::SeqCst);
    }

    /// Cancel this token on Ctrl+C. Can only be installed once per process.
    pub fn install_interrupt_handler(&self) -> Result<(), SolveError> {
        let token = self.clone();
        ctrlc::set_handler(move || {
            if token.cancel() {
                log::info!("Interrupt received, stopping search");
            }
        })?;
        Ok(())
    }
}
