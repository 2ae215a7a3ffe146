//! Lifecycle tracker
//!
//! Polls the state of every outstanding run once per round and retrieves
//! results of runs that reached a terminal state. Runs on a single control
//! flow with one connection; each round lasts at least the poll interval
//! to bound the request rate against the service.

use benchcloud_client::RunService;
use benchcloud_core::domain::run::RunDescriptor;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, Instant};
use tracing::{debug, warn};

use crate::outstanding::OutstandingRuns;
use crate::output::OutputHandler;
use crate::service::{ResultRetriever, Retrieval};

/// Polls runs until every result has been retrieved
pub struct LifecycleTracker {
    poll_interval: Duration,
    retriever: ResultRetriever,
    outstanding: OutstandingRuns,
}

impl LifecycleTracker {
    pub fn new(poll_interval: Duration, retriever: ResultRetriever, outstanding: OutstandingRuns) -> Self {
        Self {
            poll_interval,
            retriever,
            outstanding,
        }
    }

    /// Tracks `runs` until none is left
    ///
    /// Runs stopped by someone else in the meantime are dropped.
    pub async fn track(
        &self,
        service: &dyn RunService,
        mut runs: HashMap<String, Arc<RunDescriptor>>,
        handler: &dyn OutputHandler,
    ) {
        while !runs.is_empty() {
            let start = Instant::now();

            runs.retain(|run_id, _| {
                let outstanding = self.outstanding.contains(run_id);
                if !outstanding {
                    debug!("Run {} is no longer outstanding", run_id);
                }
                outstanding
            });

            let mut finished = Vec::new();
            for (run_id, run) in &runs {
                if !self.is_terminal(service, run_id).await {
                    continue;
                }
                if self.retriever.retrieve(service, run_id, run, handler).await == Retrieval::Done {
                    finished.push(run_id.clone());
                }
            }

            for run_id in finished {
                runs.remove(&run_id);
            }

            let elapsed = start.elapsed();
            if elapsed < self.poll_interval {
                time::sleep(self.poll_interval - elapsed).await;
            }
        }
    }

    /// Whether results of the run can be retrieved
    ///
    /// A failed query counts as still running.
    async fn is_terminal(&self, service: &dyn RunService, run_id: &str) -> bool {
        match service.run_state(run_id).await {
            Ok(state) if state.is_terminal() => {
                debug!("Run {} is {}, retrieving result", run_id, state);
                true
            }
            Ok(_) => false,
            Err(e) => {
                warn!("Could not get run state {}: {}", run_id, e);
                false
            }
        }
    }
}
