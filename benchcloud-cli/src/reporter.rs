//! Console reporting
//!
//! [`Reporter`] collects every result for the optional JSON dump and
//! forwards each event to a display: the colored console or the log.

use anyhow::{Context, Result};
use benchcloud_core::domain::result::{HostInfo, RunResult};
use benchcloud_core::domain::run::{RunDescriptor, RunSet};
use benchcloud_runner::OutputHandler;
use benchcloud_runner::result::HIDDEN_PREFIX;
use colored::*;
use serde::Serialize;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

/// A finished run as written to the results file
#[derive(Debug, Clone, Serialize)]
pub struct ReportedRun {
    pub run_set: String,
    pub identifier: String,
    #[serde(flatten)]
    pub result: RunResult,
}

/// Prints progress and results in color
pub struct ConsoleOutput;

impl OutputHandler for ConsoleOutput {
    fn output_before_run_set(&self, run_set: &RunSet) {
        println!(
            "{}",
            format!("Executing run set {} ({} run(s))", run_set.name, run_set.runs.len()).bold()
        );
    }

    fn output_for_skipping_run_set(&self, run_set: &RunSet) {
        println!("{}", format!("Skipping run set {}", run_set.name).yellow());
    }

    fn output_after_run_set(&self, run_set: &RunSet) {
        println!("{}", format!("Run set {} done", run_set.name).green());
        println!();
    }

    fn output_before_run(&self, _run: &RunDescriptor) {}

    fn output_after_run(&self, run: &RunDescriptor, result: &RunResult) {
        let exit_code = if result.exit_code == 0 {
            result.exit_code.to_string().green()
        } else {
            result.exit_code.to_string().red()
        };
        println!(
            "  {:<40} exit {}  {:>8.2}s wall  {:>8.2}s cpu",
            run.identifier.cyan(),
            exit_code,
            result.walltime,
            result.cputime
        );
        for (key, value) in &result.values {
            if !key.starts_with(HIDDEN_PREFIX) {
                println!("    {}: {}", key.dimmed(), value);
            }
        }
    }

    fn store_system_info(&self, host: &HostInfo) {
        println!(
            "  {} {} ({}, {} cores)",
            "Host:".dimmed(),
            host.name,
            host.cpu_model,
            host.cores.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string())
        );
    }

    fn output_after_benchmark(&self, stopped_by_interrupt: bool) {
        if stopped_by_interrupt {
            println!("{}", "Benchmark interrupted, partial results only.".yellow().bold());
        } else {
            println!("{}", "Benchmark finished.".green().bold());
        }
    }
}

/// Collects results and forwards every event to `display`
pub struct Reporter {
    display: Box<dyn OutputHandler>,
    current_run_set: Mutex<String>,
    runs: Mutex<Vec<ReportedRun>>,
}

impl Reporter {
    pub fn new(display: Box<dyn OutputHandler>) -> Self {
        Self {
            display,
            current_run_set: Mutex::new(String::new()),
            runs: Mutex::new(Vec::new()),
        }
    }

    /// Results reported so far
    pub fn runs(&self) -> Vec<ReportedRun> {
        self.runs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Writes all collected results to `path` as JSON
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.runs())?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write results to {}", path.display()))
    }
}

impl OutputHandler for Reporter {
    fn output_before_run_set(&self, run_set: &RunSet) {
        *self
            .current_run_set
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = run_set.name.clone();
        self.display.output_before_run_set(run_set);
    }

    fn output_for_skipping_run_set(&self, run_set: &RunSet) {
        self.display.output_for_skipping_run_set(run_set);
    }

    fn output_after_run_set(&self, run_set: &RunSet) {
        self.display.output_after_run_set(run_set);
    }

    fn output_before_run(&self, run: &RunDescriptor) {
        self.display.output_before_run(run);
    }

    fn output_after_run(&self, run: &RunDescriptor, result: &RunResult) {
        let run_set = self
            .current_run_set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        self.runs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ReportedRun {
                run_set,
                identifier: run.identifier.clone(),
                result: result.clone(),
            });
        self.display.output_after_run(run, result);
    }

    fn store_system_info(&self, host: &HostInfo) {
        self.display.store_system_info(host);
    }

    fn output_after_benchmark(&self, stopped_by_interrupt: bool) {
        self.display.output_after_benchmark(stopped_by_interrupt);
    }
}
