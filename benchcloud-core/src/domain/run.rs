//! Run domain types
//!
//! A benchmark consists of run sets, each holding independent runs. The
//! runner engine only reads these values; they are produced by whoever
//! loads the benchmark definition.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Name of the only tool the cloud master can execute
pub const SUPPORTED_TOOL: &str = "CPAchecker";

/// Executable reported in reconstructed command lines
pub const TOOL_EXECUTABLE: &str = "scripts/cpa.sh";

/// A single verification task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunDescriptor {
    /// Human readable identifier, usually the first source file
    pub identifier: String,
    /// Program files whose contents are sent inline
    pub source_files: Vec<PathBuf>,
    /// Optional property file sent as `propertyText`
    pub property_file: Option<PathBuf>,
    /// Tool options, translated before submission
    pub options: Vec<String>,
    /// Where the tool log is written; other artifacts are named after it
    pub log_file: PathBuf,
}

impl RunDescriptor {
    /// Creates a run for the given sources, naming the log after the first one
    pub fn new(identifier: impl Into<String>, source_files: Vec<PathBuf>, log_file: PathBuf) -> Self {
        Self {
            identifier: identifier.into(),
            source_files,
            property_file: None,
            options: Vec::new(),
            log_file,
        }
    }

    pub fn with_property_file(mut self, property_file: impl Into<PathBuf>) -> Self {
        self.property_file = Some(property_file.into());
        self
    }

    pub fn with_options(mut self, options: Vec<String>) -> Self {
        self.options = options;
        self
    }

    /// Command line the remote tool was started with, used as log header
    pub fn cmdline(&self) -> Vec<String> {
        let mut cmdline = vec![TOOL_EXECUTABLE.to_string()];
        cmdline.extend(self.options.iter().cloned());
        if let Some(property_file) = &self.property_file {
            cmdline.push("-spec".to_string());
            cmdline.push(property_file.display().to_string());
        }
        cmdline.extend(self.source_files.iter().map(|p| p.display().to_string()));
        cmdline
    }

    /// Path the error stream of the run is moved to
    pub fn stderr_file(&self) -> PathBuf {
        with_suffix(&self.log_file, ".stdError")
    }

    /// Directory receiving additional result files
    pub fn output_dir(&self) -> PathBuf {
        with_suffix(&self.log_file, ".output")
    }

    /// Where an unreadable result archive is dumped for inspection
    pub fn debug_archive_file(&self) -> PathBuf {
        with_suffix(&self.log_file, ".zip")
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// A group of runs reported together
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSet {
    pub name: String,
    pub runs: Vec<Arc<RunDescriptor>>,
    /// Run sets filtered out by the user are reported as skipped
    pub should_be_executed: bool,
}

impl RunSet {
    pub fn new(name: impl Into<String>, runs: Vec<RunDescriptor>) -> Self {
        Self {
            name: name.into(),
            runs: runs.into_iter().map(Arc::new).collect(),
            should_be_executed: true,
        }
    }
}

/// Resource limits applied to every run of a benchmark
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceLimits {
    /// Memory limit in MB
    pub memory_mb: Option<u64>,
    /// CPU time limit in seconds
    pub time_secs: Option<u64>,
    /// Time limit the tool enforces itself, in seconds
    pub soft_time_secs: Option<u64>,
    /// Number of CPU cores
    pub cores: Option<u32>,
}

/// Benchmark-wide settings shared by every submission
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkSettings {
    pub limits: ResourceLimits,
    /// Requested CPU model of the worker machine
    pub cpu_model: Option<String>,
    /// Requested tool revision as `branch[:revision]`
    pub revision: Option<String>,
}

/// A complete benchmark
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Benchmark {
    pub tool_name: String,
    pub run_sets: Vec<RunSet>,
    pub settings: BenchmarkSettings,
}

/// A concrete tool version on the service side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolVersion {
    pub branch: String,
    pub revision: String,
}

impl ToolVersion {
    /// Splits a `branch[:revision]` spec, defaulting to `trunk:HEAD`
    ///
    /// The returned revision may still be symbolic (e.g. `HEAD`) and is
    /// resolved against the service before use.
    pub fn parse_spec(spec: Option<&str>) -> (String, String) {
        match spec {
            Some(spec) => match spec.split_once(':') {
                Some((branch, revision)) => (branch.to_string(), revision.to_string()),
                None => (spec.to_string(), "HEAD".to_string()),
            },
            None => ("trunk".to_string(), "HEAD".to_string()),
        }
    }
}

impl std::fmt::Display for ToolVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.branch, self.revision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_paths_derive_from_log_file() {
        let run = RunDescriptor::new("a.c", vec!["a.c".into()], "logs/a.c.log".into());
        assert_eq!(run.stderr_file(), PathBuf::from("logs/a.c.log.stdError"));
        assert_eq!(run.output_dir(), PathBuf::from("logs/a.c.log.output"));
        assert_eq!(run.debug_archive_file(), PathBuf::from("logs/a.c.log.zip"));
    }

    #[test]
    fn test_cmdline() {
        let run = RunDescriptor::new("a.c", vec!["a.c".into()], "a.log".into())
            .with_options(vec!["-64".to_string()])
            .with_property_file("unreach.prp");
        assert_eq!(
            run.cmdline(),
            vec!["scripts/cpa.sh", "-64", "-spec", "unreach.prp", "a.c"]
        );
    }

    #[test]
    fn test_parse_revision_spec() {
        assert_eq!(
            ToolVersion::parse_spec(None),
            ("trunk".to_string(), "HEAD".to_string())
        );
        assert_eq!(
            ToolVersion::parse_spec(Some("branches/foo")),
            ("branches/foo".to_string(), "HEAD".to_string())
        );
        assert_eq!(
            ToolVersion::parse_spec(Some("trunk:12345")),
            ("trunk".to_string(), "12345".to_string())
        );
    }
}
