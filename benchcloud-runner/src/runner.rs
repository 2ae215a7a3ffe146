//! Benchmark execution on the cloud master
//!
//! Wires the coordinators together: for each run set, submit all runs, then
//! track them until every result is in. An interrupt ends submission and
//! tracking, reports what was collected so far and stops every outstanding
//! run before returning [`RunnerError::Interrupted`].

use benchcloud_client::{ClientConfig, CloudClient, Credentials, RunService};
use benchcloud_core::domain::run::{Benchmark, SUPPORTED_TOOL, ToolVersion};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::RunnerConfig;
use crate::connection::{Connector, HttpConnector};
use crate::error::RunnerError;
use crate::outstanding::OutstandingRuns;
use crate::output::OutputHandler;
use crate::scheduler::{CancellationCoordinator, LifecycleTracker, StopSummary, SubmissionCoordinator};
use crate::service::ResultRetriever;

/// Establishes the client configuration once at startup
///
/// Resolves the requested tool revision (`branch[:revision]`, default
/// `trunk:HEAD`) against the service. The resolved version is attached to
/// submissions only if a revision was requested; a failed resolution is
/// logged and leaves the version unset.
pub async fn init_client_config(
    cloud_master: &str,
    credentials: Option<Credentials>,
    revision: Option<&str>,
) -> Result<ClientConfig, RunnerError> {
    let config = ClientConfig::new(cloud_master, credentials)?;
    info!("Using cloud master at {}", config.base_url());

    let (branch, symbolic_revision) = ToolVersion::parse_spec(revision);
    let client = CloudClient::new(Arc::new(config.clone()))?;

    match client.resolve_tool_version(&branch, &symbolic_revision).await {
        Ok(resolved) => {
            let version = ToolVersion {
                branch,
                revision: resolved,
            };
            info!("Using tool version {}", version);
            if revision.is_some() {
                return Ok(config.with_tool_version(version));
            }
        }
        Err(e) => {
            warn!(
                "Could not resolve {}:{}: {} {}",
                branch,
                symbolic_revision,
                e,
                e.remedy().unwrap_or_default()
            );
        }
    }

    Ok(config)
}

/// Executes benchmarks on the cloud master
pub struct CloudRunner {
    connector: Arc<dyn Connector>,
    outstanding: OutstandingRuns,
    submission: SubmissionCoordinator,
    tracker: LifecycleTracker,
    cancellation: CancellationCoordinator,
}

impl CloudRunner {
    /// Creates a runner talking HTTP to the configured cloud master
    pub fn new(config: RunnerConfig, client_config: Arc<ClientConfig>) -> Self {
        let connector = Arc::new(HttpConnector::new(Arc::clone(&client_config)));
        Self::with_connector(config, client_config, connector)
    }

    /// Creates a runner using `connector` for all connections
    pub fn with_connector(
        config: RunnerConfig,
        client_config: Arc<ClientConfig>,
        connector: Arc<dyn Connector>,
    ) -> Self {
        let outstanding = OutstandingRuns::new();

        let submission = SubmissionCoordinator::new(
            config.max_workers,
            client_config,
            Arc::clone(&connector),
            outstanding.clone(),
        );
        let retriever = ResultRetriever::new(
            config.retrieval_attempts,
            config.retrieval_retry_delay,
            outstanding.clone(),
        );
        let tracker = LifecycleTracker::new(config.poll_interval, retriever, outstanding.clone());
        let cancellation =
            CancellationCoordinator::new(config.max_workers, Arc::clone(&connector), outstanding.clone());

        Self {
            connector,
            outstanding,
            submission,
            tracker,
            cancellation,
        }
    }

    /// Runs that are submitted but not yet retrieved or stopped
    pub fn outstanding(&self) -> &OutstandingRuns {
        &self.outstanding
    }

    /// Executes all run sets of `benchmark`, reporting to `handler`
    ///
    /// `output_after_benchmark` is always called once the benchmark was
    /// started. When `cancel` fires, outstanding runs are stopped and
    /// [`RunnerError::Interrupted`] is returned. Outstanding runs are also
    /// stopped when execution fails for any other reason.
    pub async fn execute_benchmark(
        &self,
        benchmark: &Benchmark,
        handler: &dyn OutputHandler,
        cancel: CancellationToken,
    ) -> Result<(), RunnerError> {
        if benchmark.tool_name != SUPPORTED_TOOL {
            warn!("The cloud master only supports {}.", SUPPORTED_TOOL);
            return Ok(());
        }

        let outcome = self.execute_run_sets(benchmark, handler, &cancel).await;
        let interrupted = matches!(outcome, Err(RunnerError::Interrupted));

        handler.output_after_benchmark(interrupted);

        if outcome.is_err() {
            self.stop().await;
        }
        outcome
    }

    async fn execute_run_sets(
        &self,
        benchmark: &Benchmark,
        handler: &dyn OutputHandler,
        cancel: &CancellationToken,
    ) -> Result<(), RunnerError> {
        let mut connection: Option<Arc<dyn RunService>> = None;

        for run_set in &benchmark.run_sets {
            if !run_set.should_be_executed {
                handler.output_for_skipping_run_set(run_set);
                continue;
            }

            handler.output_before_run_set(run_set);

            let runs = self
                .submission
                .submit_all(&run_set.runs, &benchmark.settings, cancel)
                .await;
            if cancel.is_cancelled() {
                return Err(RunnerError::Interrupted);
            }

            let service = match &connection {
                Some(service) => Arc::clone(service),
                None => {
                    let service = self.connector.connect()?;
                    connection = Some(Arc::clone(&service));
                    service
                }
            };

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(RunnerError::Interrupted),
                _ = self.tracker.track(service.as_ref(), runs, handler) => {}
            }

            handler.output_after_run_set(run_set);
        }

        Ok(())
    }

    /// Stops every outstanding run and waits for all stop requests
    pub async fn stop(&self) -> StopSummary {
        self.cancellation.stop_all().await
    }
}
