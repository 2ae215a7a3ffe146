//! Parsed run results

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Measurements and metadata of a finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub exit_code: i32,
    /// Wall time in seconds
    pub walltime: f64,
    /// CPU time in seconds
    pub cputime: f64,
    /// Peak memory usage in bytes
    pub memory_usage: Option<u64>,
    /// Machine the run was executed on
    pub host: Option<HostInfo>,
    /// Additional columns; keys starting with the hidden prefix are
    /// normally not displayed
    pub values: BTreeMap<String, String>,
}

/// Description of the worker machine that executed a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostInfo {
    pub name: String,
    pub os: String,
    pub cpu_model: String,
    pub cores: Option<u32>,
    pub frequency: String,
    /// Installed memory in bytes
    pub memory: Option<u64>,
}
