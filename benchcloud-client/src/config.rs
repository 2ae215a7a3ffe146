//! Client configuration
//!
//! Established once before any request is issued and shared read-only by
//! every connection afterwards.

use benchcloud_core::domain::run::ToolVersion;

use crate::error::{ClientError, Result};

/// Basic-auth credentials for the cloud master
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: Option<String>,
}

impl Credentials {
    /// Parses `user:password`; the password may itself contain colons
    pub fn parse(spec: &str) -> Self {
        match spec.split_once(':') {
            Some((user, password)) => Self {
                user: user.to_string(),
                password: Some(password.to_string()),
            },
            None => Self {
                user: spec.to_string(),
                password: None,
            },
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Immutable connection settings
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL, always ending in `/`
    base_url: String,
    credentials: Option<Credentials>,
    tool_version: Option<ToolVersion>,
}

impl ClientConfig {
    /// Creates a configuration for the cloud master at `base_url`
    ///
    /// Only `http` and `https` URLs are accepted.
    pub fn new(base_url: impl Into<String>, credentials: Option<Credentials>) -> Result<Self> {
        let mut base_url = base_url.into();

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ClientError::Malformed(format!(
                "unknown protocol in cloud master URL '{}'",
                base_url
            )));
        }
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self {
            base_url,
            credentials,
            tool_version: None,
        })
    }

    /// Attaches the resolved tool version sent with every submission
    pub fn with_tool_version(mut self, tool_version: ToolVersion) -> Self {
        self.tool_version = Some(tool_version);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn tool_version(&self) -> Option<&ToolVersion> {
        self.tool_version.as_ref()
    }
}
