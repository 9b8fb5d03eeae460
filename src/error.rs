//! Error types for the Bubble extractor
//!
//! Every non-success API response is turned into an [`ApiError`] carrying a
//! single [`ErrorKind`]. Everything else the crate can fail with (configuration,
//! decoding, I/O) lives on the top-level [`Error`] enum.

use serde_json::Value;
use thiserror::Error;

/// The main error type for the extractor
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // API Errors
    // ============================================================================
    #[error(transparent)]
    Api(#[from] ApiError),

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Data Processing Errors
    // ============================================================================
    #[error("Failed to decode response from endpoint '{endpoint}': {message}")]
    Decode { endpoint: String, message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Output error: {message}")]
    Output { message: String },

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create an output error
    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }

    /// The typed API error, if this is one
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            Error::Api(e) => Some(e),
            _ => None,
        }
    }

    /// Kind of the typed API error, if this is one
    pub fn kind(&self) -> Option<ErrorKind> {
        self.as_api().map(|e| e.kind)
    }
}

/// Result type alias for the extractor
pub type Result<T> = std::result::Result<T, Error>;

// ============================================================================
// Typed API Errors
// ============================================================================

/// Classification of a failed API call, one per HTTP status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    MethodNotAllowed,
    NotAcceptable,
    Conflict,
    Gone,
    LengthRequired,
    PreconditionFailed,
    RequestEntityTooLarge,
    UnsupportedMediaType,
    RequestedRangeNotSatisfiable,
    UnprocessableEntity,
    TooManyRequests,
    InternalServerError,
    NotImplemented,
    ServiceUnavailable,
    GatewayTimeout,
    InsufficientStorage,
    BandwidthLimitExceeded,
    /// Any status without a dedicated kind
    UnknownError,
    /// Connection-level failure that survived every retry
    TransportError,
}

impl ErrorKind {
    /// Map an HTTP status code to its error kind
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            405 => Self::MethodNotAllowed,
            406 => Self::NotAcceptable,
            409 => Self::Conflict,
            410 => Self::Gone,
            411 => Self::LengthRequired,
            412 => Self::PreconditionFailed,
            413 => Self::RequestEntityTooLarge,
            415 => Self::UnsupportedMediaType,
            416 => Self::RequestedRangeNotSatisfiable,
            422 => Self::UnprocessableEntity,
            429 => Self::TooManyRequests,
            500 => Self::InternalServerError,
            501 => Self::NotImplemented,
            503 => Self::ServiceUnavailable,
            504 => Self::GatewayTimeout,
            507 => Self::InsufficientStorage,
            509 => Self::BandwidthLimitExceeded,
            _ => Self::UnknownError,
        }
    }

    /// Whether the transport retries responses of this kind before they
    /// reach the classifier
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::TooManyRequests
                | Self::InternalServerError
                | Self::ServiceUnavailable
                | Self::GatewayTimeout
                | Self::TransportError
        )
    }

    /// Name of the kind as used in log and summary output
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BadRequest => "BadRequest",
            Self::Unauthorized => "Unauthorized",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "NotFound",
            Self::MethodNotAllowed => "MethodNotAllowed",
            Self::NotAcceptable => "NotAcceptable",
            Self::Conflict => "Conflict",
            Self::Gone => "Gone",
            Self::LengthRequired => "LengthRequired",
            Self::PreconditionFailed => "PreconditionFailed",
            Self::RequestEntityTooLarge => "RequestEntityTooLarge",
            Self::UnsupportedMediaType => "UnsupportedMediaType",
            Self::RequestedRangeNotSatisfiable => "RequestedRangeNotSatisfiable",
            Self::UnprocessableEntity => "UnprocessableEntity",
            Self::TooManyRequests => "TooManyRequests",
            Self::InternalServerError => "InternalServerError",
            Self::NotImplemented => "NotImplemented",
            Self::ServiceUnavailable => "ServiceUnavailable",
            Self::GatewayTimeout => "GatewayTimeout",
            Self::InsufficientStorage => "InsufficientStorage",
            Self::BandwidthLimitExceeded => "BandwidthLimitExceeded",
            Self::UnknownError => "UnknownError",
            Self::TransportError => "TransportError",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed call against an endpoint
///
/// Built once by the response classifier and never mutated afterwards.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind}: {message}")]
pub struct ApiError {
    /// What went wrong
    pub kind: ErrorKind,
    /// Endpoint (resource name) that was being called
    pub endpoint: String,
    /// Human-readable message
    pub message: String,
    /// Decoded response body, when there was one
    pub body: Option<Value>,
}

impl ApiError {
    /// Create a new API error
    pub fn new(
        kind: ErrorKind,
        endpoint: impl Into<String>,
        message: impl Into<String>,
        body: Option<Value>,
    ) -> Self {
        Self {
            kind,
            endpoint: endpoint.into(),
            message: message.into(),
            body,
        }
    }

    /// Create a transport error for a connection that never produced a response
    pub fn transport(endpoint: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        let endpoint = endpoint.into();
        let message = format!("Calling endpoint {endpoint} failed. Error: {cause}");
        Self::new(ErrorKind::TransportError, endpoint, message, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::missing_field("#api_token");
        assert_eq!(err.to_string(), "Missing required config field: #api_token");

        let err = Error::decode("user", "missing results");
        assert_eq!(
            err.to_string(),
            "Failed to decode response from endpoint 'user': missing results"
        );
    }

    #[test]
    fn test_api_error_display_is_transparent() {
        let api = ApiError::new(ErrorKind::Forbidden, "user", "Calling endpoint user failed", None);
        let err = Error::from(api.clone());

        assert_eq!(err.to_string(), "Forbidden: Calling endpoint user failed");
        assert_eq!(err.kind(), Some(ErrorKind::Forbidden));
        assert_eq!(err.as_api(), Some(&api));
    }

    #[test]
    fn test_from_status_defaults_to_unknown() {
        assert_eq!(ErrorKind::from_status(418), ErrorKind::UnknownError);
        assert_eq!(ErrorKind::from_status(502), ErrorKind::UnknownError);
        assert_eq!(ErrorKind::from_status(999), ErrorKind::UnknownError);
    }

    #[test]
    fn test_is_retryable() {
        assert!(ErrorKind::TooManyRequests.is_retryable());
        assert!(ErrorKind::ServiceUnavailable.is_retryable());
        assert!(ErrorKind::TransportError.is_retryable());

        assert!(!ErrorKind::BadRequest.is_retryable());
        assert!(!ErrorKind::Unauthorized.is_retryable());
        assert!(!ErrorKind::NotFound.is_retryable());
    }

    #[test]
    fn test_transport_error_message() {
        let err = ApiError::transport("user", "connection reset");
        assert_eq!(err.kind, ErrorKind::TransportError);
        assert_eq!(err.message, "Calling endpoint user failed. Error: connection reset");
        assert!(err.body.is_none());
    }

    #[test]
    fn test_kind_is_none_for_other_errors() {
        assert_eq!(Error::config("x").kind(), None);
        assert!(Error::Other("x".into()).as_api().is_none());
    }
}
