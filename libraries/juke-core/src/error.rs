/// Gateway error types for remote playback control
use thiserror::Error;

/// Result type alias using `GatewayError`
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Failure reported by a `RemoteControlGateway` call.
///
/// Every variant carries a message that is safe to show to the user as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The backend rejected the auth token
    #[error("{0}")]
    Unauthorized(String),

    /// The user has not linked the requested streaming provider
    #[error("{0}")]
    ProviderNotLinked(String),

    /// The backend or provider answered with a non-success status
    #[error("{message}")]
    Provider { status: u16, message: String },

    /// Transport failure (connect, timeout, reset)
    #[error("{0}")]
    Network(String),

    /// A success response whose body could not be understood
    #[error("{0}")]
    InvalidResponse(String),
}

/// Coarse classification of a `GatewayError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayErrorKind {
    Unauthorized,
    ProviderNotLinked,
    Provider,
    Network,
    InvalidResponse,
}

impl GatewayErrorKind {
    /// Convert to string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::ProviderNotLinked => "provider_not_linked",
            Self::Provider => "provider",
            Self::Network => "network",
            Self::InvalidResponse => "invalid_response",
        }
    }
}

impl std::fmt::Display for GatewayErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl GatewayError {
    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a provider error
    pub fn provider(status: u16, msg: impl Into<String>) -> Self {
        Self::Provider {
            status,
            message: msg.into(),
        }
    }

    /// Create an invalid response error
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Classify the error
    #[must_use]
    pub fn kind(&self) -> GatewayErrorKind {
        match self {
            Self::Unauthorized(_) => GatewayErrorKind::Unauthorized,
            Self::ProviderNotLinked(_) => GatewayErrorKind::ProviderNotLinked,
            Self::Provider { .. } => GatewayErrorKind::Provider,
            Self::Network(_) => GatewayErrorKind::Network,
            Self::InvalidResponse(_) => GatewayErrorKind::InvalidResponse,
        }
    }

    /// Human-readable message, passed through to the UI verbatim
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Unauthorized(msg)
            | Self::ProviderNotLinked(msg)
            | Self::Network(msg)
            | Self::InvalidResponse(msg)
            | Self::Provider { message: msg, .. } => msg,
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}
