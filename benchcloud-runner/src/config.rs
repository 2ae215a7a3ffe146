//! Runner configuration
//!
//! Defines the concurrency and retry parameters of the runner engine. The
//! connection settings of the cloud master live in
//! [`benchcloud_client::ClientConfig`].

use std::time::Duration;

/// Runner configuration
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Size of the submission and cancellation worker pools
    pub max_workers: usize,

    /// Minimum duration of one polling round over all outstanding runs
    pub poll_interval: Duration,

    /// Result download attempts per polling round
    pub retrieval_attempts: u32,

    /// Pause between two failed result downloads
    pub retrieval_retry_delay: Duration,
}

impl RunnerConfig {
    /// Creates configuration from environment variables
    ///
    /// Expected environment variables (all optional):
    /// - BENCHCLOUD_MAX_WORKERS (default: 5)
    /// - BENCHCLOUD_POLL_INTERVAL_MS (default: 1000)
    /// - BENCHCLOUD_RETRIEVAL_ATTEMPTS (default: 10)
    /// - BENCHCLOUD_RETRIEVAL_DELAY_SECS (default: 10)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let max_workers = std::env::var("BENCHCLOUD_MAX_WORKERS")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(defaults.max_workers);

        let poll_interval = std::env::var("BENCHCLOUD_POLL_INTERVAL_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.poll_interval);

        let retrieval_attempts = std::env::var("BENCHCLOUD_RETRIEVAL_ATTEMPTS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(defaults.retrieval_attempts);

        let retrieval_retry_delay = std::env::var("BENCHCLOUD_RETRIEVAL_DELAY_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.retrieval_retry_delay);

        Self {
            max_workers,
            poll_interval,
            retrieval_attempts,
            retrieval_retry_delay,
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_workers == 0 {
            return Err("max_workers must be greater than 0".to_string());
        }

        if self.poll_interval.is_zero() {
            return Err("poll_interval must be greater than 0".to_string());
        }

        if self.retrieval_attempts == 0 {
            return Err("retrieval_attempts must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_workers: 5,
            poll_interval: Duration::from_secs(1),
            retrieval_attempts: 10,
            retrieval_retry_delay: Duration::from_secs(10),
        }
    }
}
