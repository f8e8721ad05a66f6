//! Error types for the invoicing API client.

use reqwest::StatusCode;
use thiserror::Error;

/// Transport error information captured from reqwest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpErrorInfo {
    /// Error message.
    pub message: String,
    /// HTTP status code (if one was received).
    pub status_code: Option<u16>,
    /// Whether the error was a timeout.
    pub is_timeout: bool,
    /// Whether the error was a connection failure.
    pub is_connect: bool,
}

impl From<reqwest::Error> for HttpErrorInfo {
    fn from(err: reqwest::Error) -> Self {
        Self {
            message: err.to_string(),
            status_code: err.status().map(|status| status.as_u16()),
            is_timeout: err.is_timeout(),
            is_connect: err.is_connect(),
        }
    }
}

/// Error type for API client operations.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Transport-level error (timeout, connection refused, ...).
    #[error("HTTP error: {0:?}")]
    Http(HttpErrorInfo),

    /// Non-success HTTP status.
    #[error("HTTP status {status} with body: {body}")]
    Status {
        /// HTTP status code.
        status: StatusCode,
        /// Response body (truncated if needed).
        body: String,
    },

    /// JSON decode error.
    #[error("JSON error: {0}")]
    Json(String),

    /// A 2xx response whose body lacks an expected field.
    #[error("response missing expected field `{field}`")]
    MissingField {
        /// Dotted path of the missing field.
        field: &'static str,
    },

    /// A value could not be encoded as an HTTP header.
    #[error("invalid header value for {name}")]
    InvalidHeader {
        /// Header name.
        name: &'static str,
    },
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(HttpErrorInfo::from(err))
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl ApiError {
    /// Returns `true` if retrying the call could plausibly succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(info) => info.is_timeout || info.is_connect,
            Self::Status { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            _ => false,
        }
    }

    /// Returns `true` if the error is a definitive 404.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Status {
                status: StatusCode::NOT_FOUND,
                ..
            }
        )
    }

    /// The HTTP status carried by the error, when one was received.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(info) => info
                .status_code
                .and_then(|code| StatusCode::from_u16(code).ok()),
            _ => None,
        }
    }
}
