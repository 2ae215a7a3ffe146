//! Result retriever
//!
//! Downloads the result archive of a finished run with a bounded number of
//! attempts per polling round. A run whose result cannot be downloaded stays
//! outstanding and is tried again in the next round; there is no limit on
//! the number of rounds.

use benchcloud_client::RunService;
use benchcloud_core::domain::run::RunDescriptor;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::outstanding::OutstandingRuns;
use crate::output::OutputHandler;
use crate::result::{ArchiveError, unpack};

/// Outcome of one retrieval round for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retrieval {
    /// The run is settled, whether or not its result was usable
    Done,
    /// Every attempt failed; the run stays outstanding
    RetryNextRound,
}

/// Fetches and unpacks results of finished runs
pub struct ResultRetriever {
    attempts: u32,
    retry_delay: Duration,
    outstanding: OutstandingRuns,
}

impl ResultRetriever {
    pub fn new(attempts: u32, retry_delay: Duration, outstanding: OutstandingRuns) -> Self {
        Self {
            attempts,
            retry_delay,
            outstanding,
        }
    }

    /// Retrieves the result of `run`, known to be in a terminal state
    pub async fn retrieve(
        &self,
        service: &dyn RunService,
        run_id: &str,
        run: &RunDescriptor,
        handler: &dyn OutputHandler,
    ) -> Retrieval {
        for attempt in 1..=self.attempts {
            match service.run_result(run_id).await {
                Ok(archive) => {
                    if !self.outstanding.remove(run_id) {
                        debug!("Run {} was stopped meanwhile, discarding its result", run_id);
                        return Retrieval::Done;
                    }
                    self.handle_archive(&archive, run, handler);
                    return Retrieval::Done;
                }
                Err(e) => {
                    info!(
                        "Could not get result of run {} (attempt {}/{}): {}",
                        run.identifier, attempt, self.attempts, e
                    );
                    if attempt < self.attempts {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }

        warn!(
            "Could not get run result, run is not finished: {}",
            run_id
        );
        Retrieval::RetryNextRound
    }

    fn handle_archive(&self, archive: &[u8], run: &RunDescriptor, handler: &dyn OutputHandler) {
        match unpack(archive, run, handler) {
            Ok(Some(result)) => {
                handler.output_before_run(run);
                handler.output_after_run(run, &result);
            }
            Ok(None) => {}
            Err(ArchiveError::Corrupt(e)) => {
                warn!(
                    "Server returned illegal zip file with results of run {}: {}",
                    run.identifier, e
                );
                let dump = run.debug_archive_file();
                if let Err(e) = std::fs::write(&dump, archive) {
                    warn!("Could not write {}: {}", dump.display(), e);
                }
            }
            Err(e) => {
                warn!("Error while writing results of run {}: {}", run.identifier, e);
            }
        }
    }
}
