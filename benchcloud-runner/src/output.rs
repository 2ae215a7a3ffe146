//! Output handler seam
//!
//! Results are not rendered by the runner. They are handed to an
//! [`OutputHandler`] supplied by the caller.

use benchcloud_core::domain::result::{HostInfo, RunResult};
use benchcloud_core::domain::run::{RunDescriptor, RunSet};
use tracing::info;

/// Consumer of benchmark progress and results
pub trait OutputHandler: Send + Sync {
    fn output_before_run_set(&self, run_set: &RunSet);

    /// Called instead of the before/after hooks for run sets not executed
    fn output_for_skipping_run_set(&self, run_set: &RunSet);

    fn output_after_run_set(&self, run_set: &RunSet);

    fn output_before_run(&self, run: &RunDescriptor);

    fn output_after_run(&self, run: &RunDescriptor, result: &RunResult);

    /// Receives the description of the machine a run was executed on
    fn store_system_info(&self, host: &HostInfo);

    /// Called once at the end, also when execution was interrupted
    fn output_after_benchmark(&self, stopped_by_interrupt: bool);
}

/// Output handler that only logs
#[derive(Debug, Default)]
pub struct TracingOutputHandler;

impl OutputHandler for TracingOutputHandler {
    fn output_before_run_set(&self, run_set: &RunSet) {
        info!("Executing run set {} ({} runs)", run_set.name, run_set.runs.len());
    }

    fn output_for_skipping_run_set(&self, run_set: &RunSet) {
        info!("Skipping run set {}", run_set.name);
    }

    fn output_after_run_set(&self, run_set: &RunSet) {
        info!("Run set {} done", run_set.name);
    }

    fn output_before_run(&self, _run: &RunDescriptor) {}

    fn output_after_run(&self, run: &RunDescriptor, result: &RunResult) {
        info!(
            "{}: exit code {}, cpu time {:.2}s, wall time {:.2}s",
            run.identifier, result.exit_code, result.cputime, result.walltime
        );
    }

    fn store_system_info(&self, host: &HostInfo) {
        info!(
            "Host {}: {} cores of {} at {}, {}",
            host.name,
            host.cores.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string()),
            host.cpu_model,
            host.frequency,
            host.os
        );
    }

    fn output_after_benchmark(&self, stopped_by_interrupt: bool) {
        if stopped_by_interrupt {
            info!("Benchmark interrupted");
        } else {
            info!("Benchmark finished");
        }
    }
}
