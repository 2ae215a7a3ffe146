//! Test doubles for the runner engine
//!
//! [`ScriptedService`] answers requests from per-run scripts and records
//! every call with the (tokio) time it was made, so tests can run against
//! paused time.

use async_trait::async_trait;
use benchcloud_client::{ClientError, Result, RunService};
use benchcloud_core::domain::result::{HostInfo, RunResult};
use benchcloud_core::domain::run::{RunDescriptor, RunSet};
use benchcloud_core::domain::state::RunState;
use benchcloud_core::dto::submission::RunSubmission;
use std::collections::{HashMap, VecDeque};
use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::connection::Connector;
use crate::output::OutputHandler;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Submit(String),
    State(String),
    Result(String),
    Stop(String),
}

/// Replays scripted answers; the last answer of a script repeats forever
#[derive(Default)]
pub struct ScriptedService {
    submit_failures: Mutex<HashMap<String, ClientError>>,
    submit_delay: Mutex<Option<Duration>>,
    states: Mutex<HashMap<String, VecDeque<Result<RunState>>>>,
    results: Mutex<HashMap<String, VecDeque<Result<Vec<u8>>>>>,
    stop_failures: Mutex<HashMap<String, ClientError>>,
    stop_delay: Mutex<Option<Duration>>,
    completed_stops: AtomicUsize,
    calls: Mutex<Vec<(Call, Instant)>>,
    next_id: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_submission(&self, run_identifier: &str, err: ClientError) {
        self.submit_failures
            .lock()
            .unwrap()
            .insert(run_identifier.to_string(), err);
    }

    pub fn delay_submissions(&self, delay: Duration) {
        *self.submit_delay.lock().unwrap() = Some(delay);
    }

    pub fn script_states(&self, run_id: &str, states: Vec<Result<RunState>>) {
        self.states
            .lock()
            .unwrap()
            .insert(run_id.to_string(), states.into());
    }

    pub fn script_results(&self, run_id: &str, results: Vec<Result<Vec<u8>>>) {
        self.results
            .lock()
            .unwrap()
            .insert(run_id.to_string(), results.into());
    }

    pub fn fail_stop(&self, run_id: &str, err: ClientError) {
        self.stop_failures
            .lock()
            .unwrap()
            .insert(run_id.to_string(), err);
    }

    pub fn delay_stops(&self, delay: Duration) {
        *self.stop_delay.lock().unwrap() = Some(delay);
    }

    /// Stop requests that have returned
    pub fn completed_stops(&self) -> usize {
        self.completed_stops.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<(Call, Instant)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|(call, _)| matches(call)).count()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push((call, Instant::now()));
    }

    fn next<T: Clone>(scripts: &Mutex<HashMap<String, VecDeque<T>>>, run_id: &str) -> Option<T> {
        let mut scripts = scripts.lock().unwrap();
        let script = scripts.get_mut(run_id)?;
        if script.len() > 1 {
            script.pop_front()
        } else {
            script.front().cloned()
        }
    }
}

#[async_trait]
impl RunService for ScriptedService {
    async fn submit_run(&self, submission: &RunSubmission) -> Result<String> {
        self.record(Call::Submit(submission.run_identifier.clone()));

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        let delay = *self.submit_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(err) = self
            .submit_failures
            .lock()
            .unwrap()
            .get(&submission.run_identifier)
        {
            return Err(err.clone());
        }
        Ok(format!("run-{}", self.next_id.fetch_add(1, Ordering::SeqCst)))
    }

    async fn run_state(&self, run_id: &str) -> Result<RunState> {
        self.record(Call::State(run_id.to_string()));
        Self::next(&self.states, run_id).unwrap_or(Ok(RunState::Running))
    }

    async fn run_result(&self, run_id: &str) -> Result<Vec<u8>> {
        self.record(Call::Result(run_id.to_string()));
        Self::next(&self.results, run_id)
            .unwrap_or_else(|| Err(ClientError::from_status(404, "no result")))
    }

    async fn stop_run(&self, run_id: &str) -> Result<()> {
        self.record(Call::Stop(run_id.to_string()));
        let delay = *self.stop_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.completed_stops.fetch_add(1, Ordering::SeqCst);
        match self.stop_failures.lock().unwrap().get(run_id) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

/// Hands out the shared scripted service and counts connections
pub struct ScriptedConnector {
    service: Arc<ScriptedService>,
    connections: AtomicUsize,
}

impl ScriptedConnector {
    pub fn new(service: Arc<ScriptedService>) -> Arc<Self> {
        Arc::new(Self {
            service,
            connections: AtomicUsize::new(0),
        })
    }

    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

impl Connector for ScriptedConnector {
    fn connect(&self) -> std::result::Result<Arc<dyn RunService>, ClientError> {
        self.connections.fetch_add(1, Ordering::SeqCst);
        Ok(self.service.clone())
    }
}

/// Records what the runner reports
#[derive(Default)]
pub struct RecordingHandler {
    results: Mutex<Vec<(String, RunResult)>>,
    system_infos: Mutex<Vec<HostInfo>>,
    run_sets: Mutex<Vec<String>>,
    skipped: Mutex<Vec<String>>,
    finished: Mutex<Option<bool>>,
}

impl RecordingHandler {
    pub fn results(&self) -> Vec<(String, RunResult)> {
        self.results.lock().unwrap().clone()
    }

    pub fn system_infos(&self) -> Vec<HostInfo> {
        self.system_infos.lock().unwrap().clone()
    }

    pub fn run_sets(&self) -> Vec<String> {
        self.run_sets.lock().unwrap().clone()
    }

    pub fn skipped(&self) -> Vec<String> {
        self.skipped.lock().unwrap().clone()
    }

    /// `Some(stopped_by_interrupt)` once the benchmark was reported finished
    pub fn finished(&self) -> Option<bool> {
        *self.finished.lock().unwrap()
    }
}

impl OutputHandler for RecordingHandler {
    fn output_before_run_set(&self, _run_set: &RunSet) {}

    fn output_for_skipping_run_set(&self, run_set: &RunSet) {
        self.skipped.lock().unwrap().push(run_set.name.clone());
    }

    fn output_after_run_set(&self, run_set: &RunSet) {
        self.run_sets.lock().unwrap().push(run_set.name.clone());
    }

    fn output_before_run(&self, _run: &RunDescriptor) {}

    fn output_after_run(&self, run: &RunDescriptor, result: &RunResult) {
        self.results
            .lock()
            .unwrap()
            .push((run.identifier.clone(), result.clone()));
    }

    fn store_system_info(&self, host: &HostInfo) {
        self.system_infos.lock().unwrap().push(host.clone());
    }

    fn output_after_benchmark(&self, stopped_by_interrupt: bool) {
        *self.finished.lock().unwrap() = Some(stopped_by_interrupt);
    }
}

/// Builds a zip archive from `(name, content)` pairs
pub fn build_archive(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    for (name, content) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Flips a byte inside the stored data of the entry holding `content`,
/// leaving the archive structure intact
pub fn damage_entry(mut archive: Vec<u8>, content: &str) -> Vec<u8> {
    let at = archive
        .windows(content.len())
        .position(|window| window == content.as_bytes())
        .unwrap();
    archive[at] ^= 0x01;
    archive
}

/// A typical archive of a successful run
pub fn sample_archive() -> Vec<u8> {
    build_archive(&[
        ("runInformation.txt", "walltime=2.0s\ncputime=1.5s\nexitcode=0\n"),
        ("output.log", "Verification result: TRUE\n"),
    ])
}
