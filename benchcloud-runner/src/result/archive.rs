//! Result archive unpacking
//!
//! Measurement files are parsed, the tool log and error stream are moved
//! next to the run's log file and everything else is extracted into the
//! run's output directory.

use benchcloud_core::domain::result::RunResult;
use benchcloud_core::domain::run::RunDescriptor;
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{self, Cursor, Read, Seek, Write};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};
use zip::ZipArchive;
use zip::result::ZipError;

use super::parser;
use crate::output::OutputHandler;

pub const RESULT_FILE_LOG: &str = "output.log";
pub const RESULT_FILE_STDERR: &str = "stderr";
pub const RESULT_FILE_RUN_INFO: &str = "runInformation.txt";
pub const RESULT_FILE_HOST_INFO: &str = "hostInformation.txt";
pub const RESULT_FILE_RUN_DESCRIPTION: &str = "runDescription.txt";

/// Entries handled individually instead of being extracted
const SPECIAL_RESULT_FILES: &[&str] = &[
    RESULT_FILE_LOG,
    RESULT_FILE_STDERR,
    RESULT_FILE_RUN_INFO,
    RESULT_FILE_HOST_INFO,
    RESULT_FILE_RUN_DESCRIPTION,
];

/// Width of the separator line below the log header
const LOG_HEADER_WIDTH: usize = 80;

/// Errors while unpacking a result archive
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The downloaded bytes are not a readable zip archive, or an entry is
    /// damaged (bad checksum, truncated data)
    #[error("illegal zip file: {0}")]
    Corrupt(#[from] ZipError),

    /// Writing an artifact failed
    #[error("{0}")]
    Io(#[from] io::Error),
}

/// Unpacks the result archive of `run`
///
/// Host information is passed to `handler` as soon as it is parsed. Returns
/// `None` if the archive carries no usable run information. Missing or
/// malformed entries are logged and do not stop the remaining entries from
/// being processed.
pub fn unpack(
    bytes: &[u8],
    run: &RunDescriptor,
    handler: &dyn OutputHandler,
) -> Result<Option<RunResult>, ArchiveError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let names: BTreeSet<String> = archive.file_names().map(str::to_string).collect();

    let mut result = if names.contains(RESULT_FILE_RUN_INFO) {
        let text = read_text(&mut archive, RESULT_FILE_RUN_INFO)?;
        match parser::parse_run_information(&text) {
            Ok(result) => Some(result),
            Err(e) => {
                warn!("Invalid run information for {}: {}", run.identifier, e);
                None
            }
        }
    } else {
        warn!("Missing result for {}.", run.identifier);
        None
    };

    if names.contains(RESULT_FILE_HOST_INFO) {
        let text = read_text(&mut archive, RESULT_FILE_HOST_INFO)?;
        let (host, values) = parser::parse_host_information(&text);
        handler.store_system_info(&host);
        if let Some(result) = result.as_mut() {
            result.values.extend(values);
            result.host = Some(host);
        }
    } else {
        warn!("Missing host information for run {}.", run.identifier);
    }

    if names.contains(RESULT_FILE_LOG) {
        let log = read_entry(&mut archive.by_name(RESULT_FILE_LOG)?)?;
        write_log(&log, run)?;
    } else {
        warn!("Missing log file for run {}.", run.identifier);
    }

    if names.contains(RESULT_FILE_STDERR) {
        let stderr = read_entry(&mut archive.by_name(RESULT_FILE_STDERR)?)?;
        create_file(&run.stderr_file())?.write_all(&stderr)?;
    }

    let others: BTreeSet<&str> = names
        .iter()
        .map(String::as_str)
        .filter(|name| !SPECIAL_RESULT_FILES.contains(name))
        .collect();
    if !others.is_empty() {
        extract_all(&mut archive, &others, run)?;
    }

    Ok(result)
}

/// Reads a whole entry; any read failure means the archive is damaged
fn read_entry(entry: &mut impl Read) -> Result<Vec<u8>, ArchiveError> {
    let mut content = Vec::new();
    entry
        .read_to_end(&mut content)
        .map_err(|e| ArchiveError::Corrupt(ZipError::Io(e)))?;
    Ok(content)
}

fn read_text<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<String, ArchiveError> {
    let content = read_entry(&mut archive.by_name(name)?)?;
    Ok(String::from_utf8_lossy(&content).into_owned())
}

fn create_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    File::create(path)
}

/// Writes the tool log prefixed with the command line of the run
fn write_log(log: &[u8], run: &RunDescriptor) -> io::Result<()> {
    let mut file = create_file(&run.log_file)?;

    let header = format!(
        "{}\n\n\n{}\n",
        run.cmdline().join(" "),
        "-".repeat(LOG_HEADER_WIDTH)
    );
    file.write_all(header.as_bytes())?;
    file.write_all(log)
}

fn extract_all<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    names: &BTreeSet<&str>,
    run: &RunDescriptor,
) -> Result<(), ArchiveError> {
    let output_dir = run.output_dir();

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if !names.contains(entry.name()) {
            continue;
        }

        let Some(relative) = entry.enclosed_name() else {
            warn!(
                "Skipping result file {} of run {}: path leaves the output directory",
                entry.name(),
                run.identifier
            );
            continue;
        };
        let target = output_dir.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            debug!("Extracting {}", target.display());
            let content = read_entry(&mut entry)?;
            create_file(&target)?.write_all(&content)?;
        }
    }

    Ok(())
}
