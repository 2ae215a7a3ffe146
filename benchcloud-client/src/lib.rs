//! Benchcloud HTTP Client
//!
//! Protocol layer for the cloud master, the remote service that executes
//! verification runs.
//!
//! A [`CloudClient`] owns exactly one persistent keep-alive connection and
//! is meant to be used by a single worker for its whole lifetime. All
//! workers share the same immutable [`ClientConfig`].
//!
//! # Example
//!
//! ```no_run
//! use benchcloud_client::{ClientConfig, CloudClient, Credentials, RunService};
//! use std::sync::Arc;
//!
//! # async fn example() -> benchcloud_client::Result<()> {
//! let config = ClientConfig::new(
//!     "https://vcloud.example.org/cpachecker",
//!     Some(Credentials::parse("alice:secret")),
//! )?;
//! let client = CloudClient::new(Arc::new(config))?;
//!
//! let state = client.run_state("4f2a").await?;
//! println!("Run is {}", state);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
mod runs;
mod tool;

// Re-export commonly used types
pub use config::{ClientConfig, Credentials};
pub use error::{ClientError, Result};
pub use runs::encode_body;

use async_trait::async_trait;
use benchcloud_core::domain::state::RunState;
use benchcloud_core::dto::submission::RunSubmission;
use reqwest::{Client, RequestBuilder, StatusCode};
use std::sync::Arc;
use std::time::Duration;

/// Operations the runner engine needs from the cloud master
///
/// Every method maps to one request. Implementations are used by a single
/// worker at a time, but must be shareable across tasks.
#[async_trait]
pub trait RunService: Send + Sync {
    /// Submits a run and returns the identifier assigned by the service
    async fn submit_run(&self, submission: &RunSubmission) -> Result<String>;

    /// Queries the current state of a run
    async fn run_state(&self, run_id: &str) -> Result<RunState>;

    /// Downloads the zipped result of a finished run
    async fn run_result(&self, run_id: &str) -> Result<Vec<u8>>;

    /// Stops a run and discards it on the service side
    async fn stop_run(&self, run_id: &str) -> Result<()>;
}

/// HTTP client for the cloud master API
///
/// Each instance keeps at most one idle connection to the service, so a
/// worker that owns a client reuses the same connection for all requests.
#[derive(Debug, Clone)]
pub struct CloudClient {
    config: Arc<ClientConfig>,
    /// HTTP client instance
    client: Client,
}

impl CloudClient {
    /// Creates a client with its own connection
    pub fn new(config: Arc<ClientConfig>) -> Result<Self> {
        let client = Client::builder()
            .pool_max_idle_per_host(1)
            .tcp_keepalive(Duration::from_secs(60))
            .build()?;

        Ok(Self::with_client(config, client))
    }

    /// Create a client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(config: Arc<ClientConfig>, client: Client) -> Self {
        Self { config, client }
    }

    /// Get the base URL of the cloud master
    pub fn base_url(&self) -> &str {
        self.config.base_url()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Attaches basic-auth credentials if configured
    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.config.credentials() {
            Some(credentials) => request.basic_auth(&credentials.user, credentials.password.as_ref()),
            None => request,
        }
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Checks the status code against the accepted ones
    ///
    /// On failure the response body is read and kept as diagnostic message.
    async fn expect_status(
        response: reqwest::Response,
        accepted: &[StatusCode],
    ) -> Result<reqwest::Response> {
        let status = response.status();

        if !accepted.contains(&status) {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::from_status(status.as_u16(), error_text));
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let config = ClientConfig::new("http://localhost:8080/webclient", None).unwrap();
        let client = CloudClient::new(Arc::new(config)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/webclient/");
    }

    #[test]
    fn test_client_with_custom_client() {
        let config = ClientConfig::new("http://localhost:8080/", None).unwrap();
        let client = CloudClient::with_client(Arc::new(config), Client::new());
        assert_eq!(client.base_url(), "http://localhost:8080/");
        assert!(client.config().credentials().is_none());
    }
}
