//! Error types for the catalog client
//!
//! Every failed call produces exactly one [`ApiError`], built at the HTTP
//! boundary:
//! - `Validation`: rejected locally, nothing was sent
//! - `Server`: the API answered with an error status
//! - `Network`: no response was received
//! - `Unknown`: anything else

use crate::validation::FieldErrors;
use serde::Deserialize;

/// Message used for every transport-level failure
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection.";

/// Coarse classification of an [`ApiError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Client-side validation failure
    Validation,
    /// Error payload from the server
    Server,
    /// No response received
    Network,
    /// Anything else
    Unknown,
}

/// Normalized catalog API error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// Payload failed client-side validation
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// Server responded with an error status
    #[error("{message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Message from the error payload
        message: String,
    },

    /// Request never produced a response
    #[error("{0}")]
    Network(String),

    /// Any other failure
    #[error("{0}")]
    Unknown(String),
}

/// Shape of an error response body
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ApiError {
    /// Network error with the standard message
    #[inline]
    #[must_use]
    pub fn network() -> Self {
        Self::Network(NETWORK_ERROR_MESSAGE.to_string())
    }

    /// Server error
    #[inline]
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    /// 404 server error
    #[inline]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::server(404, message)
    }

    /// Unknown error
    #[inline]
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown(message.into())
    }

    /// Build a server error from a non-success status and its raw body
    ///
    /// Uses the body's `message`, then `error`, then a status-derived text.
    #[must_use]
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();
        let message = parsed
            .message
            .or(parsed.error)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("Request failed with status code {status}"));
        Self::Server { status, message }
    }

    /// Classify a transport error
    ///
    /// A body cut off after the status line counts as no response.
    #[must_use]
    pub fn from_transport(error: &reqwest::Error) -> Self {
        if error.is_builder() {
            return Self::Unknown(error.to_string());
        }
        if error.is_connect()
            || error.is_timeout()
            || error.is_request()
            || error.is_body()
            || error.is_decode()
        {
            return Self::network();
        }
        Self::Unknown(error.to_string())
    }

    /// Coarse classification
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Server { .. } => ErrorKind::Server,
            Self::Network(_) => ErrorKind::Network,
            Self::Unknown(_) => ErrorKind::Unknown,
        }
    }

    /// Text suitable for a user-facing notification
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Validation(errors) => errors.to_string(),
            Self::Server { message, .. } => message.clone(),
            Self::Network(message) | Self::Unknown(message) => message.clone(),
        }
    }

    /// Whether the server reported the resource as absent
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Server { status: 404, .. })
    }

    /// HTTP status, when the server answered
    #[inline]
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Field errors, when validation failed
    #[inline]
    #[must_use]
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

/// Errors while building client configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable held an unusable value
    #[error("invalid value for {key}: '{value}'")]
    InvalidValue {
        /// Variable name
        key: String,
        /// Raw value
        value: String,
    },

    /// Base URL was empty
    #[error("base URL must not be empty")]
    EmptyBaseUrl,

    /// The HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Result type alias for catalog API calls
pub type ApiResult<T> = Result<T, ApiError>;
