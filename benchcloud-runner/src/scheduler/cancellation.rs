//! Cancellation coordinator
//!
//! Asks the service to stop every outstanding run, using the same bounded
//! worker pool as submission. Each stop is independent: a failure is logged
//! and the run stays in the outstanding set.

use benchcloud_client::RunService;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::pool::run_pool;
use crate::connection::Connector;
use crate::outstanding::OutstandingRuns;

/// Number of stop requests by outcome
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StopSummary {
    pub stopped: usize,
    pub failed: usize,
}

/// Stops outstanding runs on the service
pub struct CancellationCoordinator {
    max_workers: usize,
    connector: Arc<dyn Connector>,
    outstanding: OutstandingRuns,
}

impl CancellationCoordinator {
    pub fn new(max_workers: usize, connector: Arc<dyn Connector>, outstanding: OutstandingRuns) -> Self {
        Self {
            max_workers,
            connector,
            outstanding,
        }
    }

    /// Issues one stop request per currently outstanding run
    ///
    /// Returns once every request has completed or failed.
    pub async fn stop_all(&self) -> StopSummary {
        let run_ids = self.outstanding.snapshot();
        debug!("Stopping {} run(s)...", run_ids.len());

        let outstanding = self.outstanding.clone();
        let task = move |service: Arc<dyn RunService>, run_id: String| {
            let outstanding = outstanding.clone();
            async move {
                match service.stop_run(&run_id).await {
                    Ok(()) => {
                        outstanding.remove(&run_id);
                        true
                    }
                    Err(e) if e.is_not_found() => {
                        debug!(
                            "Could not delete run {}: {}. {}",
                            run_id,
                            e,
                            e.remedy().unwrap_or_default()
                        );
                        false
                    }
                    Err(e) => {
                        warn!("Could not delete run {}: {}", run_id, e);
                        false
                    }
                }
            }
        };

        let outcome = run_pool(
            Arc::clone(&self.connector),
            self.max_workers,
            run_ids,
            CancellationToken::new(),
            task,
        )
        .await;

        let stopped = outcome.results.iter().filter(|stopped| **stopped).count();
        let summary = StopSummary {
            stopped,
            failed: outcome.results.len() - stopped + outcome.abandoned.len(),
        };

        debug!(
            "Stopped all tasks ({} stopped, {} failed).",
            summary.stopped, summary.failed
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, ScriptedConnector, ScriptedService};
    use benchcloud_client::ClientError;
    use std::collections::HashSet;
    use std::time::Duration;
    use tokio::time::Instant;

    #[tokio::test]
    async fn test_one_stop_per_outstanding_run() {
        let outstanding = OutstandingRuns::new();
        for i in 0..7 {
            outstanding.insert(&format!("run-{}", i));
        }
        let service = ScriptedService::new();
        service.fail_stop("run-2", ClientError::from_status(404, "gone"));
        service.fail_stop("run-5", ClientError::from_status(500, "oops"));
        let connector = ScriptedConnector::new(service.clone());
        let coordinator = CancellationCoordinator::new(3, connector.clone(), outstanding.clone());

        let summary = coordinator.stop_all().await;

        assert_eq!(summary, StopSummary { stopped: 5, failed: 2 });
        let stops: Vec<String> = service
            .calls()
            .into_iter()
            .filter_map(|(c, _)| match c {
                Call::Stop(id) => Some(id),
                _ => None,
            })
            .collect();
        assert_eq!(stops.len(), 7);
        assert_eq!(stops.iter().collect::<HashSet<_>>().len(), 7);
        assert!(connector.connections() <= 3);

        let mut remaining = outstanding.snapshot();
        remaining.sort();
        assert_eq!(remaining, vec!["run-2", "run-5"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_every_stop() {
        let outstanding = OutstandingRuns::new();
        for i in 0..7 {
            outstanding.insert(&format!("run-{}", i));
        }
        let service = ScriptedService::new();
        service.delay_stops(Duration::from_secs(5));
        let connector = ScriptedConnector::new(service.clone());
        let coordinator = CancellationCoordinator::new(3, connector, outstanding.clone());
        let start = Instant::now();

        let summary = coordinator.stop_all().await;

        assert_eq!(summary.stopped, 7);
        assert_eq!(service.completed_stops(), 7);
        assert!(start.elapsed() >= Duration::from_secs(15));
        assert!(outstanding.is_empty());
    }

    #[tokio::test]
    async fn test_nothing_outstanding() {
        let service = ScriptedService::new();
        let connector = ScriptedConnector::new(service.clone());
        let coordinator = CancellationCoordinator::new(5, connector, OutstandingRuns::new());

        let summary = coordinator.stop_all().await;

        assert_eq!(summary, StopSummary::default());
        assert!(service.calls().is_empty());
    }
}
