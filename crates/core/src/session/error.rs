//! Login failures, classified for display

use http::StatusCode;
use opsassist_domain::ApiError;
use serde_json::Value;
use thiserror::Error;

const FALLBACK_REJECTION: &str = "Authentication failed.";

/// Why a sign-in attempt did not produce a session.
#[derive(Error, Debug)]
pub enum LoginError {
    #[error("Incorrect user ID or password. Please try again.")]
    InvalidCredentials,

    #[error("Access denied. Please check your credentials.")]
    AccessDenied,

    #[error("Server error. Please try again later.")]
    Server(StatusCode),

    /// Any other status, including 2xx answers other than 200.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    /// The credential check never got a response.
    #[error("Network error. Please check your connection and try again.")]
    Network(#[source] ApiError),

    #[error("ServiceNow verification URL is not configured")]
    MissingVerifyUrl,

    /// Request building or session persistence failed.
    #[error(transparent)]
    Api(ApiError),
}

impl LoginError {
    /// Rejection for a response that arrived but is not a 200.
    pub(crate) fn rejected(status: StatusCode, data: &Value) -> Self {
        let message = data
            .pointer("/error/message")
            .and_then(Value::as_str)
            .filter(|message| !message.is_empty())
            .unwrap_or(FALLBACK_REJECTION)
            .to_string();
        Self::Rejected { status, message }
    }

    /// Status of the failed credential check, if one was received.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::InvalidCredentials => Some(StatusCode::UNAUTHORIZED),
            Self::AccessDenied => Some(StatusCode::FORBIDDEN),
            Self::Server(status) | Self::Rejected { status, .. } => Some(*status),
            Self::Network(_) | Self::MissingVerifyUrl | Self::Api(_) => None,
        }
    }
}

impl From<ApiError> for LoginError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Status(response) => match response.status {
                StatusCode::UNAUTHORIZED => Self::InvalidCredentials,
                StatusCode::FORBIDDEN => Self::AccessDenied,
                status if status.is_server_error() => Self::Server(status),
                status => Self::rejected(status, &response.data),
            },
            err @ (ApiError::Network(_) | ApiError::Timeout(_)) => Self::Network(err),
            err => Self::Api(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use opsassist_domain::ResponseEnvelope;
    use serde_json::json;

    use super::*;

    fn status_error(status: u16, data: Value) -> ApiError {
        let status = StatusCode::from_u16(status).unwrap();
        ApiError::Status(Box::new(ResponseEnvelope::new(status, data)))
    }

    #[test]
    fn statuses_map_to_user_facing_kinds() {
        assert!(matches!(
            LoginError::from(status_error(401, Value::Null)),
            LoginError::InvalidCredentials
        ));
        assert!(matches!(
            LoginError::from(status_error(403, Value::Null)),
            LoginError::AccessDenied
        ));
        assert!(matches!(
            LoginError::from(status_error(503, Value::Null)),
            LoginError::Server(StatusCode::SERVICE_UNAVAILABLE)
        ));
    }

    #[test]
    fn other_statuses_carry_server_message() {
        let err = LoginError::from(status_error(
            400,
            json!({"error": {"message": "User is locked out", "detail": null}}),
        ));
        assert_eq!(err.to_string(), "User is locked out");
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));

        let err = LoginError::from(status_error(404, json!("<html>not found</html>")));
        assert_eq!(err.to_string(), "Authentication failed.");
    }

    #[test]
    fn transport_failures_are_network_errors() {
        let err = LoginError::from(ApiError::Timeout(Duration::from_secs(30)));
        assert!(matches!(err, LoginError::Network(ApiError::Timeout(_))));
        assert!(err.status().is_none());

        let err = LoginError::from(ApiError::Storage("disk full".into()));
        assert_eq!(err.to_string(), "Storage error: disk full");
    }
}
