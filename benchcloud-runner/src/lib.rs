//! Benchcloud Runner
//!
//! Executes benchmarks on the cloud master instead of the local machine.
//!
//! Architecture:
//! - Connection: one persistent service connection per active worker
//! - Scheduler: bounded submission pool, lifecycle polling, cancellation
//! - Service: result retrieval with in-round retries
//! - Result: parsing of the result archive and extraction of its files
//!
//! Runs are submitted over a worker pool, then a single control flow polls
//! their state once per round and downloads results as runs finish. An
//! interrupt stops submitting and asks the service to stop every run that
//! is still outstanding.

pub mod config;
pub mod connection;
pub mod error;
pub mod outstanding;
pub mod output;
pub mod result;
pub mod runner;
pub mod scheduler;
pub mod service;

#[cfg(test)]
mod testing;

pub use config::RunnerConfig;
pub use connection::{Connector, HttpConnector};
pub use error::{RunnerError, SubmitError};
pub use outstanding::OutstandingRuns;
pub use output::{OutputHandler, TracingOutputHandler};
pub use runner::{CloudRunner, init_client_config};
