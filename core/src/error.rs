//! Error types for the API client.
//!
//! # Design
//! Every failed call yields exactly one `ApiError`. The variant records which
//! status class the server answered with (or `Internal` when no status was
//! obtained) and carries the raw response body, or the local failure
//! message, untouched. Nothing here is retried; callers own that policy.

use std::fmt;

use thiserror::Error;

/// Errors returned by `OvhClient` calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// HTTP 400: malformed body or parameters.
    #[error("bad parameters: {0}")]
    BadParameters(String),

    /// HTTP 403: bad signature, expired timestamp or missing rights.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// HTTP 404.
    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    /// HTTP 409.
    #[error("resource conflict: {0}")]
    ResourceConflict(String),

    /// Any other non-200 status.
    #[error("API error: {0}")]
    Api(String),

    /// Local failure before a status was obtained (DNS, connect, read).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Tag identifying an `ApiError` variant without its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadParameters,
    Auth,
    ResourceNotFound,
    ResourceConflict,
    Api,
    Internal,
}

impl ErrorKind {
    /// Classify a non-200 status code.
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => ErrorKind::BadParameters,
            403 => ErrorKind::Auth,
            404 => ErrorKind::ResourceNotFound,
            409 => ErrorKind::ResourceConflict,
            _ => ErrorKind::Api,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::BadParameters => "BAD_PARAMETERS_ERROR",
            ErrorKind::Auth => "AUTH_ERROR",
            ErrorKind::ResourceNotFound => "RESOURCE_NOT_FOUND",
            ErrorKind::ResourceConflict => "RESOURCE_CONFLICT_ERROR",
            ErrorKind::Api => "API_ERROR",
            ErrorKind::Internal => "INTERNAL_ERROR",
        }
    }

    /// Attach a message, producing the matching `ApiError`.
    pub fn with_message(self, message: impl Into<String>) -> ApiError {
        let message = message.into();
        match self {
            ErrorKind::BadParameters => ApiError::BadParameters(message),
            ErrorKind::Auth => ApiError::Auth(message),
            ErrorKind::ResourceNotFound => ApiError::ResourceNotFound(message),
            ErrorKind::ResourceConflict => ApiError::ResourceConflict(message),
            ErrorKind::Api => ApiError::Api(message),
            ErrorKind::Internal => ApiError::Internal(message),
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::BadParameters(_) => ErrorKind::BadParameters,
            ApiError::Auth(_) => ErrorKind::Auth,
            ApiError::ResourceNotFound(_) => ErrorKind::ResourceNotFound,
            ApiError::ResourceConflict(_) => ErrorKind::ResourceConflict,
            ApiError::Api(_) => ErrorKind::Api,
            ApiError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Raw server body, or the local failure message for `Internal`.
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadParameters(m)
            | ApiError::Auth(m)
            | ApiError::ResourceNotFound(m)
            | ApiError::ResourceConflict(m)
            | ApiError::Api(m)
            | ApiError::Internal(m) => m,
        }
    }
}

/// Errors raised while loading or validating a `ClientConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration field `{0}` must not be blank")]
    Blank(&'static str),

    #[error("configuration field `{field}` is not a valid millisecond count: {value:?}")]
    InvalidTimeout { field: &'static str, value: String },

    #[error("configuration could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),
}
