// ABOUTME: Error types for geonotes-client
// ABOUTME: One taxonomy shared by transport, resource client, and note store

use thiserror::Error;

/// Errors that can occur in geonotes-client operations
#[derive(Debug, Error)]
pub enum NotesError {
    /// No response arrived before the request deadline.
    #[error("Timeout: server did not respond within {after_ms} ms")]
    Timeout { after_ms: u64 },

    /// The connection could not be established (refused, DNS, reset).
    #[error("Server unreachable: {0}")]
    NetworkUnreachable(String),

    /// The server answered with a non-2xx status. `body` is the raw
    /// response text, empty if there was none.
    #[error("API {status}: {}", status_detail(.status, .body))]
    ApiStatus { status: u16, body: String },

    /// Success status but the body was not the JSON shape we expected.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Local precondition failed; no request was sent.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Bad base address or unreadable config file.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Response text, or the status's reason phrase when the body is empty.
fn status_detail(status: &u16, body: &str) -> String {
    if !body.trim().is_empty() {
        return body.to_string();
    }
    reqwest::StatusCode::from_u16(*status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("no response body")
        .to_string()
}

/// Result type alias using NotesError.
pub type Result<T> = std::result::Result<T, NotesError>;

impl NotesError {
    /// Text suitable for showing to the person using the app.
    ///
    /// Timeouts and connection failures both read as "server unreachable";
    /// only the trailing reason differs.
    pub fn user_message(&self, api_url: &str) -> String {
        match self {
            NotesError::Timeout { after_ms } => format!(
                "Cannot reach the API server ({api_url}): no response within {after_ms} ms. \
                 Make sure the server is running."
            ),
            NotesError::NetworkUnreachable(_) => format!(
                "Cannot reach the API server ({api_url}). Make sure the server is running."
            ),
            other => other.to_string(),
        }
    }

    /// Whether a "try again" affordance makes sense for this failure.
    pub fn is_retryable(&self) -> bool {
        match self {
            NotesError::Timeout { .. } | NotesError::NetworkUnreachable(_) => true,
            NotesError::ApiStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// HTTP status carried by `ApiStatus`, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            NotesError::ApiStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for NotesError {
    fn from(err: serde_json::Error) -> Self {
        NotesError::MalformedResponse(err.to_string())
    }
}
