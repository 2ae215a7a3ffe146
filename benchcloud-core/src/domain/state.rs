//! Run state as reported by the cloud master

use serde::{Deserialize, Serialize};

/// State of a submitted run
///
/// Only the service knows this state; the client observes it by polling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    Running,
    Finished,
    /// The service does not know the run, e.g. after a restart. Its result
    /// may still be retrievable.
    Unknown,
    Other(String),
}

impl RunState {
    /// Parses the plain-text body of a state response
    pub fn parse(body: &str) -> Self {
        match body.trim() {
            "RUNNING" => RunState::Running,
            "FINISHED" => RunState::Finished,
            "UNKNOWN" => RunState::Unknown,
            other => RunState::Other(other.to_string()),
        }
    }

    /// Whether result retrieval should be attempted
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Finished | RunState::Unknown)
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunState::Running => write!(f, "RUNNING"),
            RunState::Finished => write!(f, "FINISHED"),
            RunState::Unknown => write!(f, "UNKNOWN"),
            RunState::Other(state) => write!(f, "{}", state),
        }
    }
}
