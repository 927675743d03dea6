//! Error types for the Juke backend client.

use juke_core::GatewayError;
use thiserror::Error;

/// Errors that can occur when talking to the Juke backend.
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Backend is offline, unreachable or timed out
    #[error("Backend unreachable: {0}")]
    Unreachable(String),

    /// Auth token missing, expired or rejected
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// No streaming account linked for the requested provider
    #[error("Provider not linked: {0}")]
    ProviderNotLinked(String),

    /// Backend returned an error response
    #[error("Backend error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Invalid backend URL
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse backend response
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

impl ClientError {
    /// Classify a transport failure
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            Self::Unreachable(err.to_string())
        } else {
            Self::Request(err)
        }
    }
}

impl From<ClientError> for GatewayError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Unauthorized(message) => GatewayError::Unauthorized(message),
            ClientError::ProviderNotLinked(message) => GatewayError::ProviderNotLinked(message),
            ClientError::Api { status, message } => GatewayError::provider(status, message),
            ClientError::ParseError(message) => GatewayError::invalid_response(message),
            ClientError::Unreachable(message) => GatewayError::network(message),
            other @ (ClientError::Request(_) | ClientError::InvalidUrl(_)) => {
                GatewayError::network(other.to_string())
            }
        }
    }
}
