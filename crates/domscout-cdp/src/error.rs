//! CDP error types.

use domscout_core::DriverError;
use thiserror::Error;

/// CDP client errors.
#[derive(Debug, Error)]
pub enum CdpError {
    /// Failed to connect to Chrome.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Chrome not found or not running with remote debugging.
    #[error("Chrome not available at {0}. Start Chrome with: chrome --remote-debugging-port=9222")]
    ChromeNotAvailable(String),

    /// No Chrome executable on this machine.
    #[error("Chrome not found. Install Google Chrome or set browser.chrome_path")]
    ChromeNotFound,

    /// Chrome was found but did not come up.
    #[error("Failed to launch Chrome: {0}")]
    LaunchFailed(String),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// CDP protocol error.
    #[error("CDP error: {message} (code: {code})")]
    Protocol { code: i64, message: String },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error (for endpoint discovery).
    #[error("HTTP error: {0}")]
    Http(String),

    /// Navigation failed.
    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    /// JavaScript execution error.
    #[error("JavaScript error: {0}")]
    JavaScript(String),

    /// Timeout.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Session closed.
    #[error("Session closed")]
    SessionClosed,

    /// Invalid response.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<tokio_tungstenite::tungstenite::Error> for CdpError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        CdpError::WebSocket(e.to_string())
    }
}

impl From<reqwest::Error> for CdpError {
    fn from(e: reqwest::Error) -> Self {
        CdpError::Http(e.to_string())
    }
}

impl From<url::ParseError> for CdpError {
    fn from(e: url::ParseError) -> Self {
        CdpError::ConnectionFailed(format!("Invalid URL: {}", e))
    }
}

impl From<CdpError> for DriverError {
    fn from(e: CdpError) -> Self {
        match e {
            CdpError::Protocol { message, .. } => classify_protocol_message(message),
            CdpError::JavaScript(msg) => DriverError::Script(msg),
            CdpError::Serialization(e) => DriverError::Script(e.to_string()),
            CdpError::Timeout(msg) => DriverError::Timeout(msg),
            CdpError::SessionClosed | CdpError::WebSocket(_) => {
                DriverError::ContextLost(e.to_string())
            }
            other => DriverError::Protocol(other.to_string()),
        }
    }
}

/// Chrome reports most DOM and Runtime failures as code -32000; only the
/// message tells them apart.
fn classify_protocol_message(message: String) -> DriverError {
    let lower = message.to_lowercase();
    if lower.contains("could not find node")
        || lower.contains("no node with given id")
        || lower.contains("could not find object")
        || lower.contains("node is detached")
    {
        DriverError::Detached
    } else if lower.contains("dom error while querying") || lower.contains("not a valid selector") {
        DriverError::InvalidSelector(message)
    } else if lower.contains("cannot find context")
        || lower.contains("execution context was destroyed")
        || lower.contains("document needs to be requested")
        || lower.contains("inspected target navigated")
    {
        DriverError::ContextLost(message)
    } else {
        DriverError::Protocol(message)
    }
}

/// Like the `From` conversion, but a vanished node is the whole document.
pub(crate) fn document_error(e: CdpError) -> DriverError {
    match DriverError::from(e) {
        DriverError::Detached => {
            DriverError::ContextLost("document node no longer exists".to_string())
        }
        other => other,
    }
}
