//! Submission coordinator
//!
//! Submits all runs of a run set over the worker pool. Every accepted run
//! enters the outstanding set right away, so an interrupt during submission
//! stops it too. A run that cannot be submitted is logged and left out; it
//! never affects the other runs.

use benchcloud_client::{ClientConfig, RunService};
use benchcloud_core::domain::run::{BenchmarkSettings, RunDescriptor, ToolVersion};
use benchcloud_core::dto::submission::RunSubmission;
use benchcloud_core::options;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::pool::run_pool;
use crate::connection::Connector;
use crate::error::SubmitError;
use crate::outstanding::OutstandingRuns;

/// Dispatches run submissions to the cloud master
pub struct SubmissionCoordinator {
    max_workers: usize,
    client_config: Arc<ClientConfig>,
    connector: Arc<dyn Connector>,
    outstanding: OutstandingRuns,
}

impl SubmissionCoordinator {
    pub fn new(
        max_workers: usize,
        client_config: Arc<ClientConfig>,
        connector: Arc<dyn Connector>,
        outstanding: OutstandingRuns,
    ) -> Self {
        Self {
            max_workers,
            client_config,
            connector,
            outstanding,
        }
    }

    /// Submits `runs` and maps each assigned remote identifier to its run
    ///
    /// Runs that were not started when `cancel` fired are dropped.
    pub async fn submit_all(
        &self,
        runs: &[Arc<RunDescriptor>],
        settings: &BenchmarkSettings,
        cancel: &CancellationToken,
    ) -> HashMap<String, Arc<RunDescriptor>> {
        info!("Submitting runs");

        let total = runs.len();
        let counter = Arc::new(AtomicUsize::new(0));
        let settings = Arc::new(settings.clone());
        let tool_version = self.client_config.tool_version().cloned();
        let outstanding = self.outstanding.clone();

        let task = move |service: Arc<dyn RunService>, run: Arc<RunDescriptor>| {
            let counter = Arc::clone(&counter);
            let settings = Arc::clone(&settings);
            let tool_version = tool_version.clone();
            let outstanding = outstanding.clone();

            async move {
                let submitted =
                    submit_run(service.as_ref(), &run, &settings, tool_version.as_ref()).await;
                let number = counter.fetch_add(1, Ordering::SeqCst) + 1;

                match submitted {
                    Ok(run_id) => {
                        if !outstanding.insert(&run_id) {
                            warn!(
                                "Service assigned id {} to run {} although it is still in use",
                                run_id, run.identifier
                            );
                            return None;
                        }
                        info!("Submitted run {}/{} with id {}", number, total, run_id);
                        Some((run_id, run))
                    }
                    Err(e) => {
                        warn!(
                            "Could not submit run {}: {}. {}",
                            run.identifier,
                            e,
                            e.remedy()
                        );
                        None
                    }
                }
            }
        };

        let outcome = run_pool(
            Arc::clone(&self.connector),
            self.max_workers,
            runs.to_vec(),
            cancel.clone(),
            task,
        )
        .await;

        if !outcome.abandoned.is_empty() {
            info!("{} run(s) were not submitted", outcome.abandoned.len());
        }

        outcome.results.into_iter().flatten().collect()
    }
}

/// Builds the submission of a single run and sends it
async fn submit_run(
    service: &dyn RunService,
    run: &RunDescriptor,
    settings: &BenchmarkSettings,
    tool_version: Option<&ToolVersion>,
) -> Result<String, SubmitError> {
    let submission = load_submission(run, settings, tool_version).await?;
    Ok(service.submit_run(&submission).await?)
}

async fn read_text(path: &Path) -> Result<String, SubmitError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SubmitError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Reads the inputs of `run` and translates its options
pub async fn load_submission(
    run: &RunDescriptor,
    settings: &BenchmarkSettings,
    tool_version: Option<&ToolVersion>,
) -> Result<RunSubmission, SubmitError> {
    let translated =
        options::translate(&run.options, &settings.limits).map_err(|source| {
            SubmitError::InvalidOptions {
                options: run.options.clone(),
                source,
            }
        })?;

    let mut program_texts = Vec::with_capacity(run.source_files.len());
    for path in &run.source_files {
        program_texts.push(read_text(path).await?);
    }

    let property_text = match &run.property_file {
        Some(path) => Some(read_text(path).await?),
        None => None,
    };

    let error_witness_text = match &translated.error_witness_file {
        Some(path) => Some(read_text(path).await?),
        None => None,
    };

    Ok(RunSubmission {
        run_identifier: run.identifier.clone(),
        program_texts,
        property_text,
        error_witness_text,
        settings: settings.clone(),
        tool_version: tool_version.cloned(),
        translated,
    })
}
