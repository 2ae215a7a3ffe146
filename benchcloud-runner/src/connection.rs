//! Connection provider
//!
//! Every concurrently active worker opens its own connection when it picks
//! up its first request and keeps it until it finishes. Connections are
//! never shared between workers.

use benchcloud_client::{ClientConfig, ClientError, CloudClient, RunService};
use std::sync::Arc;
use tracing::debug;

/// Opens service connections for workers
pub trait Connector: Send + Sync {
    /// Opens a new connection owned by the calling worker
    fn connect(&self) -> Result<Arc<dyn RunService>, ClientError>;
}

/// Connects to the cloud master over HTTP
pub struct HttpConnector {
    config: Arc<ClientConfig>,
}

impl HttpConnector {
    pub fn new(config: Arc<ClientConfig>) -> Self {
        Self { config }
    }
}

impl Connector for HttpConnector {
    fn connect(&self) -> Result<Arc<dyn RunService>, ClientError> {
        debug!("Opening connection to {}", self.config.base_url());
        let client = CloudClient::new(Arc::clone(&self.config))?;
        Ok(Arc::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_connector_opens_client() {
        let config = ClientConfig::new("http://localhost:8080/cloud", None).unwrap();
        let connector = HttpConnector::new(Arc::new(config));
        assert!(connector.connect().is_ok());
    }
}
