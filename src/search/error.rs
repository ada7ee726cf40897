//! Errors that stop a solve before or while it starts.

use crate::search::config::ConfigError;
use std::fmt;

#[derive(Debug)]
pub enum SolveError {
    /// The configuration was rejected; no search was started.
    Config(ConfigError),
    /// A worker thread could not be spawned.
    Spawn(std::io::Error),
    /// The Ctrl+C handler could not be installed.
    Interrupt(ctrlc::Error),
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveError::Config(e) => write!(f, "invalid configuration: {e}"),
            SolveError::Spawn(e) => write!(f, "failed to spawn worker thread: {e}"),
            SolveError::Interrupt(e) => write!(f, "failed to install interrupt handler: {e}"),
        }
    }
}

impl std::error::Error for SolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SolveError::Config(e) => Some(e),
            SolveError::Spawn(e) => Some(e),
            SolveError::Interrupt(e) => Some(e),
        }
    }
}

impl From<ConfigError> for SolveError {
    fn from(e: ConfigError) -> Self {
        SolveError::Config(e)
    }
}

impl From<std::io::Error> for SolveError {
    fn from(e: std::io::Error) -> Self {
        SolveError::Spawn(e)
    }
}

impl From<ctrlc::Error> for SolveError {
    fn from(e: ctrlc::Error) -> Self {
        SolveError::Interrupt(e)
    }
}
