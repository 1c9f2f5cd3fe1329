//! Error types for the SDK.

use thiserror::Error;

/// SDK error type.
///
/// The variants map onto the failure classes a caller has to handle
/// differently: local validation, missing credentials, transport-level
/// failures, and server-reported errors (with the expired-session case
/// split out because it carries a global side effect).
#[derive(Error, Debug)]
pub enum Error {
    /// A request failed local validation and was never sent.
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// An authenticated operation was attempted with no stored token.
    #[error("authentication required")]
    AuthRequired,

    /// Transport failure or timeout. No server payload is available, so
    /// the displayed message is deliberately generic; `detail` is for
    /// logging only.
    #[error("network error occurred")]
    Network {
        /// Low-level description of what went wrong.
        detail: String,
    },

    /// API returned a non-2xx response with a decodable error body.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the API.
        message: String,
    },

    /// The server rejected the session (HTTP 401). The client has already
    /// cleared the token store and notified the session-invalidated hook
    /// by the time this surfaces.
    #[error("session expired: {message}")]
    SessionExpired {
        /// Error message from the API, if any.
        message: String,
    },

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// HTTP status associated with this error, if it came from a response.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::SessionExpired { .. } => Some(401),
            _ => None,
        }
    }

    /// Validation messages, if this is a validation failure.
    #[must_use]
    pub fn validation_messages(&self) -> Option<&[String]> {
        match self {
            Self::Validation(msgs) => Some(msgs),
            _ => None,
        }
    }

    /// The message to show a user, without status codes or low-level detail.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msgs) => msgs.join("; "),
            Self::AuthRequired => "Please log in to save tours to your account".to_string(),
            Self::Network { .. } => "network error occurred".to_string(),
            Self::Api { message, .. } => message.clone(),
            Self::SessionExpired { .. } => "Your session has expired, please log in again".to_string(),
            Self::InvalidUrl(_) | Self::Json(_) | Self::Config(_) => self.to_string(),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Network {
            detail: err.to_string(),
        }
    }
}

/// Result type alias for SDK operations.
pub type Result<T> = std::result::Result<T, Error>;
