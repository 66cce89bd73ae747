//! Error types used throughout the application

use std::time::Duration;

use http::StatusCode;
use thiserror::Error;

use crate::types::ResponseEnvelope;

/// Main error type for façade operations.
///
/// Every variant reaches the caller unmodified: nothing in the client layer
/// retries, remaps or swallows these.
#[derive(Error, Debug)]
pub enum ApiError {
    /// No response was received (connection refused, DNS, TLS, reset).
    #[error("Network error: {0}")]
    Network(String),

    /// The client-level timeout elapsed before a response arrived.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The server answered with a non-2xx status.
    #[error("HTTP {}", .0.status)]
    Status(Box<ResponseEnvelope>),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl ApiError {
    /// Status code of the failed response, if one was received.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status(response) => Some(response.status),
            _ => None,
        }
    }

    /// The full response that carried a non-2xx status.
    #[must_use]
    pub fn response(&self) -> Option<&ResponseEnvelope> {
        match self {
            Self::Status(response) => Some(response),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// Whether the request never produced a response.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout(_))
    }

    /// Stable label suitable for structured logging.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Timeout(_) => "timeout",
            Self::Status(_) => "status",
            Self::InvalidRequest(_) => "invalid_request",
            Self::Encode(_) => "encode",
            Self::Decode(_) => "decode",
            Self::Config(_) => "config",
            Self::Storage(_) => "storage",
        }
    }
}

/// Result type alias for façade operations
pub type Result<T> = std::result::Result<T, ApiError>;
