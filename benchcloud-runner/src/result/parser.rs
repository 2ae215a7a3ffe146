//! Parser for the `key=value` result files
//!
//! Keys that are displayed by default keep their name. All others get the
//! [`HIDDEN_PREFIX`] so reporting can tell them apart.

use benchcloud_core::domain::result::{HostInfo, RunResult};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::warn;

/// Prefix marking values that are normally hidden
pub const HIDDEN_PREFIX: &str = "@vcloud-";

/// Keys kept under their original name
const RESULT_KEYS: &[&str] = &["cputime", "walltime"];
const ENERGY_PREFIX: &str = "energy";

/// Run information keys not worth reporting (command line and limits)
const REDUNDANT_RUN_KEYS: &[&str] = &["command", "timeLimit", "coreLimit", "memoryLimit"];

/// Placeholder for host values the service did not report
const MISSING: &str = "-";

/// Errors in a result file
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("missing value '{0}'")]
    MissingKey(&'static str),

    #[error("invalid value '{value}' for '{key}'")]
    InvalidValue { key: &'static str, value: String },
}

/// Name a key is stored under
pub fn qualified_key(key: &str) -> String {
    if RESULT_KEYS.contains(&key) || key.starts_with(ENERGY_PREFIX) {
        key.to_string()
    } else {
        format!("{}{}", HIDDEN_PREFIX, key)
    }
}

fn hidden(key: &str) -> String {
    format!("{}{}", HIDDEN_PREFIX, key)
}

/// Parses one `key=value` pair per line
///
/// Values are trimmed; lines without `=` are skipped.
pub fn parse_values(text: &str) -> BTreeMap<String, String> {
    let mut values = BTreeMap::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match line.split_once('=') {
            Some((key, value)) => {
                values.insert(qualified_key(key), value.trim().to_string());
            }
            None => warn!("Ignoring malformed result line '{}'", line),
        }
    }

    values
}

/// Parses a duration like `1.23s` into seconds
pub fn parse_seconds(value: &str) -> Option<f64> {
    value.strip_suffix('s').unwrap_or(value).trim().parse().ok()
}

/// Parses a byte count like `1048576B`
pub fn parse_bytes(value: &str) -> Option<u64> {
    value.strip_suffix('B').unwrap_or(value).trim().parse().ok()
}

fn take_required<T>(
    values: &mut BTreeMap<String, String>,
    stored_as: &str,
    key: &'static str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<T, ParseError> {
    let value = values.remove(stored_as).ok_or(ParseError::MissingKey(key))?;
    parse(&value).ok_or(ParseError::InvalidValue { key, value })
}

/// Parses `runInformation.txt`
///
/// The returned result carries no host; remaining keys end up in `values`.
pub fn parse_run_information(text: &str) -> Result<RunResult, ParseError> {
    let mut values = parse_values(text);

    let exit_code = take_required(&mut values, &hidden("exitcode"), "exitcode", |v| {
        v.trim().parse::<i32>().ok()
    })?;
    let walltime = take_required(&mut values, "walltime", "walltime", parse_seconds)?;
    let cputime = take_required(&mut values, "cputime", "cputime", parse_seconds)?;

    let memory_usage = match values.remove(&hidden("memory")) {
        Some(value) => Some(parse_bytes(&value).ok_or(ParseError::InvalidValue {
            key: "memory",
            value,
        })?),
        None => None,
    };

    for key in REDUNDANT_RUN_KEYS {
        values.remove(&hidden(key));
    }

    Ok(RunResult {
        exit_code,
        walltime,
        cputime,
        memory_usage,
        host: None,
        values,
    })
}

/// Parses `hostInformation.txt`
///
/// Returns the host description and the remaining values, including the
/// host name under `host`.
pub fn parse_host_information(text: &str) -> (HostInfo, BTreeMap<String, String>) {
    let mut values = parse_values(text);
    let mut take = |key: &str| values.remove(&hidden(key));

    let name = take("name").unwrap_or_else(|| MISSING.to_string());
    let os = take("os").unwrap_or_else(|| MISSING.to_string());
    let memory = take("memory").and_then(|v| parse_bytes(&v));
    let cpu_model = take("cpuModel").unwrap_or_else(|| MISSING.to_string());
    let frequency = take("frequency").unwrap_or_else(|| MISSING.to_string());
    let cores = take("cores").and_then(|v| v.trim().parse().ok());

    values.insert("host".to_string(), name.clone());

    let host = HostInfo {
        name,
        os,
        cpu_model,
        cores,
        frequency,
        memory,
    };
    (host, values)
}
