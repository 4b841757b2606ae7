//! Error types for vizinha-link.
//!
//! Every backend failure is classified once, at the transport edge, into a
//! structured kind. Callers branch on the variant (for example with
//! [`VizinhaLinkError::is_degradable`]) instead of inspecting message text.

use thiserror::Error;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, VizinhaLinkError>;

/// Errors that can occur in vizinha-link operations
#[derive(Error, Debug)]
pub enum VizinhaLinkError {
    /// Error reported by the backend that fits no narrower kind.
    /// The message is preserved verbatim.
    #[error("Server error ({status_code}): {message}")]
    ServerError { status_code: u16, message: String },

    /// An operation that should affect exactly one row affected zero rows.
    /// Synthesized locally, never reported by the backend itself.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The backend rejected the request because a relation, foreign key,
    /// column or function it references does not exist
    #[error("Schema error: {0}")]
    SchemaError(String),

    /// The backend rejected the request due to a permission or row policy
    #[error("Permission error: {0}")]
    PermissionError(String),

    /// Transport-level failure (connection refused, DNS, broken pipe, ...)
    #[error("Network error: {0}")]
    NetworkError(String),

    /// A request or an operation-level deadline expired
    #[error("Timeout: {0}")]
    TimeoutError(String),

    /// Failure from the auth endpoints (sign in/up/out, password operations)
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// Request or response body could not be (de)serialized
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// The client was built or called with invalid configuration
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Client-side input validation failed (for example a storage upload
    /// that is not an image)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// A write that should have returned rows returned none
    #[error("Query error: {0}")]
    QueryError(String),
}

impl VizinhaLinkError {
    /// True for errors that allow the degraded relation-less retry:
    /// the backend could not resolve something in the query shape
    /// (missing relation, column, function) or refused it by policy,
    /// so the same logical fetch without the embed may still succeed.
    pub fn is_degradable(&self) -> bool {
        matches!(
            self,
            Self::SchemaError(_) | Self::PermissionError(_)
        )
    }

    /// True when this is a locally synthesized zero-rows error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// True for transport and deadline failures
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::NetworkError(_) | Self::TimeoutError(_))
    }
}

impl From<reqwest::Error> for VizinhaLinkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::TimeoutError(err.to_string())
        } else if err.is_decode() {
            Self::SerializationError(err.to_string())
        } else {
            Self::NetworkError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for VizinhaLinkError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

/// Markers that identify a permission/policy rejection in a backend message
const PERMISSION_MARKERS: &[&str] = &["permission", "policy", "row-level security"];

/// Markers that identify a missing relation/column/function in a backend
/// message. The backend phrases these several ways depending on version.
const SCHEMA_MARKERS: &[&str] = &[
    "relation",
    "foreign key",
    "column",
    "function",
    "does not exist",
    "could not find",
];

/// Classify a non-success backend response into a structured error kind.
///
/// The message is matched case-insensitively against known marker phrases;
/// anything unrecognized stays a [`VizinhaLinkError::ServerError`] with the
/// backend message preserved.
pub fn classify_backend_error(status_code: u16, message: &str) -> VizinhaLinkError {
    let lowered = message.to_lowercase();

    if PERMISSION_MARKERS.iter().any(|m| lowered.contains(m)) {
        return VizinhaLinkError::PermissionError(message.to_string());
    }
    if SCHEMA_MARKERS.iter().any(|m| lowered.contains(m)) {
        return VizinhaLinkError::SchemaError(message.to_string());
    }

    VizinhaLinkError::ServerError {
        status_code,
        message: message.to_string(),
    }
}

/// Extract the human-readable message from a backend error body.
///
/// The backend reports errors as `{"message": "...", "code": "...", ...}`;
/// auth endpoints use `error_description` or `msg`. Falls back to the raw
/// body so no error text is ever discarded.
pub fn extract_error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error_description", "msg", "error"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                return text.to_string();
            }
        }
    }
    if body.trim().is_empty() {
        "unknown error".to_string()
    } else {
        body.trim().to_string()
    }
}
