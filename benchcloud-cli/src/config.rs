//! Command-line configuration
//!
//! Turns the parsed arguments into the benchmark handed to the runner.

use anyhow::{Result, bail};
use benchcloud_core::domain::run::{
    Benchmark, BenchmarkSettings, ResourceLimits, RunDescriptor, RunSet, SUPPORTED_TOOL,
};
use clap::Parser;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "benchcloud")]
#[command(about = "Execute verification runs on a cloud master", long_about = None)]
pub struct Cli {
    /// URL of the cloud master
    #[arg(long, env = "BENCHCLOUD_MASTER")]
    pub cloud_master: String,

    /// Credentials as user:password
    #[arg(long, env = "BENCHCLOUD_USER")]
    pub cloud_user: Option<String>,

    /// Tool revision as branch[:revision]
    #[arg(long)]
    pub revision: Option<String>,

    /// Required CPU model of the worker machines
    #[arg(long)]
    pub cpu_model: Option<String>,

    /// Memory limit in MB
    #[arg(long)]
    pub memory_limit: Option<u64>,

    /// CPU time limit in seconds
    #[arg(long)]
    pub time_limit: Option<u64>,

    /// Time limit passed on to the tool, in seconds
    #[arg(long)]
    pub soft_time_limit: Option<u64>,

    /// Number of CPU cores per run
    #[arg(long)]
    pub core_limit: Option<u32>,

    /// Tool option; repeat for each command-line token
    #[arg(long = "option", allow_hyphen_values = true)]
    pub options: Vec<String>,

    /// Property file checked by every run
    #[arg(long)]
    pub property_file: Option<PathBuf>,

    /// Directory for logs and run output
    #[arg(long, default_value = "results")]
    pub output_dir: PathBuf,

    /// Write all results as JSON to this file
    #[arg(long)]
    pub results_json: Option<PathBuf>,

    /// Report through the log instead of the console
    #[arg(long)]
    pub plain: bool,

    /// Source files, one run each
    #[arg(required = true)]
    pub sources: Vec<PathBuf>,
}

impl Cli {
    /// Builds a single-run-set benchmark from the arguments
    pub fn benchmark(&self) -> Result<Benchmark> {
        if self.memory_limit == Some(0) || self.time_limit == Some(0) || self.core_limit == Some(0) {
            bail!("Resource limits must be greater than 0");
        }

        let runs = self
            .sources
            .iter()
            .map(|source| self.run_for(source))
            .collect();

        Ok(Benchmark {
            tool_name: SUPPORTED_TOOL.to_string(),
            run_sets: vec![RunSet::new("default", runs)],
            settings: BenchmarkSettings {
                limits: ResourceLimits {
                    memory_mb: self.memory_limit,
                    time_secs: self.time_limit,
                    soft_time_secs: self.soft_time_limit,
                    cores: self.core_limit,
                },
                cpu_model: self.cpu_model.clone(),
                revision: self.revision.clone(),
            },
        })
    }

    fn run_for(&self, source: &Path) -> RunDescriptor {
        let identifier = source.display().to_string();
        let name = source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| identifier.clone());
        let log_file = self.output_dir.join(format!("{}.log", name));

        let run = RunDescriptor::new(identifier, vec![source.to_path_buf()], log_file)
            .with_options(self.options.clone());
        match &self.property_file {
            Some(property_file) => run.with_property_file(property_file.clone()),
            None => run,
        }
    }
}
