//! Error types.
//!
//! None of these escape the request operations of [`crate::AuthClient`]; they
//! are folded into [`crate::ValidationResult`] at the API boundary. They do
//! surface from configuration loading and client construction.

use std::io;
use std::path::PathBuf;

/// Invalid or unreadable client configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required field was blank.
    #[error("{0} cannot be empty")]
    Missing(&'static str),

    /// Base URL that is not an absolute http:// or https:// URL.
    #[error("base_url must be an http:// or https:// URL, got {0}")]
    InvalidBaseUrl(String),

    /// A numeric setting out of range.
    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },

    /// Config file could not be read.
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Config file is not valid JSON for the schema.
    #[error("failed to parse config: {0}")]
    Parse(#[source] serde_json::Error),

    /// Executable path lookup failed.
    #[error("failed to get executable path: {0}")]
    ExePath(#[source] io::Error),

    /// The HTTP client could not be built.
    #[error("failed to create HTTP client: {0}")]
    HttpClient(String),
}

/// Transport-level failure. Anything that prevented an HTTP status from
/// being received.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// DNS, refused connection, TLS handshake and similar.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The request exceeded its deadline.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Any other failure while building, sending or reading the request:
    /// malformed URL, redirect loop, undecodable body.
    #[error("request failed: {0}")]
    Request(String),
}

impl TransportError {
    /// Only connection failures and timeouts can succeed on a later attempt
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connect(_) | Self::Timeout(_))
    }
}

/// Credential store failure. Only ever logged.
#[derive(Debug, thiserror::Error)]
pub(crate) enum StoreError {
    #[error("no data directory available for credential storage")]
    NoDataDir,

    #[error("invalid credential: {0}")]
    InvalidCredential(&'static str),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to persist {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("serialization failed: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("stored data is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("stored data could not be deciphered")]
    Cipher,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_messages() {
        assert_eq!(
            ConfigError::Missing("developer_id").to_string(),
            "developer_id cannot be empty"
        );
        assert_eq!(
            ConfigError::NotPositive { field: "max_attempts" }.to_string(),
            "max_attempts must be greater than zero"
        );
    }

    #[test]
    fn test_transport_error_messages() {
        let err = TransportError::Timeout("deadline elapsed".to_string());
        assert_eq!(err.to_string(), "request timed out: deadline elapsed");
    }

    #[test]
    fn test_only_connect_and_timeout_retryable() {
        assert!(TransportError::Connect("refused".to_string()).is_retryable());
        assert!(TransportError::Timeout("elapsed".to_string()).is_retryable());
        assert!(!TransportError::Request("builder error".to_string()).is_retryable());
    }
}
