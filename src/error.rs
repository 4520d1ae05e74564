//! Error taxonomy for the integration engine
//!
//! Every failure here is fatal for the operation that raised it: they are
//! deterministic functions of the simulation state or its environment, so
//! nothing is retried.

use std::fmt;
use std::io;
use std::path::PathBuf;

#[derive(Debug)]
pub enum SimError {
    /// Two bodies share a position, the force between them is undefined
    DegenerateSeparation { i: usize, j: usize },
    /// The two massive bodies' saved trajectories are out of lockstep
    HistoryLengthMismatch { left: usize, right: usize },
    /// Pericentre requested before anything was integrated
    EmptyHistory,
    /// Malformed or truncated snapshot line
    CheckpointParseError { path: PathBuf, line: usize, reason: String },
    /// Snapshot could not be opened or listed
    CheckpointReadError { path: PathBuf, source: io::Error },
    /// Snapshot (or report) could not be persisted
    CheckpointWriteError { path: PathBuf, source: io::Error },
    /// Checkpoint directory holds no completed run
    IncompleteRun { dir: PathBuf },
    /// Scenario values that cannot produce a valid run
    InvalidConfig(String),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::DegenerateSeparation { i, j } => {
                write!(f, "bodies {i} and {j} occupy the same position")
            }
            SimError::HistoryLengthMismatch { left, right } => {
                write!(f, "saved histories differ in length ({left} vs {right})")
            }
            SimError::EmptyHistory => write!(f, "no saved positions to analyse"),
            SimError::CheckpointParseError { path, line, reason } => {
                write!(f, "{}:{line}: {reason}", path.display())
            }
            SimError::CheckpointReadError { path, source } => {
                write!(f, "failed to read checkpoint {}: {source}", path.display())
            }
            SimError::CheckpointWriteError { path, source } => {
                write!(f, "failed to write {}: {source}", path.display())
            }
            SimError::IncompleteRun { dir } => {
                write!(f, "no completed run recorded in {}", dir.display())
            }
            SimError::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimError::CheckpointReadError { source, .. } | SimError::CheckpointWriteError { source, .. } => {
                Some(source)
            }
            _ => None,
        }
    }
}

pub type SimResult<T> = Result<T, SimError>;
