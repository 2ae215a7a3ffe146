//! Error types for the cloud master client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when talking to the cloud master
///
/// The set of kinds is closed; callers decide what to do with a failed
/// request by matching on it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// Credentials missing or rejected (HTTP 401)
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Unknown path, usually a wrong service URL (HTTP 404)
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other failed request, including transport errors
    #[error("request failed{}: {message}", status_suffix(.status))]
    Transient {
        /// HTTP status code, absent for transport errors
        status: Option<u16>,
        /// Diagnostic text returned by the service
        message: String,
    },

    /// Request could not be built or response could not be used
    #[error("malformed: {0}")]
    Malformed(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    status
        .map(|status| format!(" (status {})", status))
        .unwrap_or_default()
}

impl ClientError {
    /// Classifies a non-success response
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 => Self::Unauthorized(message),
            404 => Self::NotFound(message),
            _ => Self::Transient {
                status: Some(status),
                message,
            },
        }
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Hint shown to the user for errors caused by local configuration
    pub fn remedy(&self) -> Option<&'static str> {
        match self {
            Self::Unauthorized(_) => Some("Please specify username and password with --cloud-user."),
            Self::NotFound(_) => Some("Please check the URL given to --cloud-master."),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            return Self::Malformed(err.to_string());
        }
        Self::Transient {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        assert!(matches!(
            ClientError::from_status(401, ""),
            ClientError::Unauthorized(_)
        ));
        assert!(ClientError::from_status(404, "").is_not_found());
        assert_eq!(
            ClientError::from_status(503, "maintenance"),
            ClientError::Transient {
                status: Some(503),
                message: "maintenance".to_string()
            }
        );
    }

    #[test]
    fn test_remedy() {
        assert!(
            ClientError::from_status(401, "")
                .remedy()
                .unwrap()
                .contains("--cloud-user")
        );
        assert!(
            ClientError::from_status(404, "")
                .remedy()
                .unwrap()
                .contains("--cloud-master")
        );
        assert!(ClientError::from_status(500, "").remedy().is_none());
    }

    #[test]
    fn test_display() {
        let err = ClientError::from_status(500, "boom");
        assert_eq!(err.to_string(), "request failed (status 500): boom");

        let err = ClientError::Transient {
            status: None,
            message: "connection reset".to_string(),
        };
        assert_eq!(err.to_string(), "request failed: connection reset");
    }
}
