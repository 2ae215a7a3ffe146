//! Error types for the runner engine

use benchcloud_client::ClientError;
use benchcloud_core::options::OptionError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors ending a benchmark execution
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Execution was interrupted; outstanding runs have been stopped
    #[error("benchmark execution was interrupted")]
    Interrupted,

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Reasons a single run could not be submitted
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("command {options:?} contains an option that is not usable with the cloud master: {source}")]
    InvalidOptions {
        options: Vec<String>,
        #[source]
        source: OptionError,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SubmitError {
    /// Hint shown to the user next to the error
    pub fn remedy(&self) -> &'static str {
        match self {
            SubmitError::Client(err) => err.remedy().unwrap_or(""),
            _ => "",
        }
    }
}
