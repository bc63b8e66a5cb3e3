//! Error types for element discovery.

use thiserror::Error;

/// Errors reported by a rendered-document driver.
///
/// Most variants are transient and only affect the element they were raised
/// for. [`DriverError::ContextLost`] is systemic: the document or frame the
/// element lived in is gone.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The element is no longer attached to a document.
    #[error("Element is detached")]
    Detached,

    /// A script run against an element threw or returned garbage.
    #[error("Script evaluation failed: {0}")]
    Script(String),

    /// The driver rejected a selector.
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    /// The document or frame was destroyed (navigation, frame removal).
    #[error("Execution context lost: {0}")]
    ContextLost(String),

    /// Wire-level failure talking to the rendering engine.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The rendering engine did not answer in time.
    #[error("Timeout: {0}")]
    Timeout(String),
}

impl DriverError {
    /// Whether the whole document/frame is unusable, not just one element.
    pub fn is_context_lost(&self) -> bool {
        matches!(self, DriverError::ContextLost(_))
    }
}

impl From<serde_json::Error> for DriverError {
    fn from(e: serde_json::Error) -> Self {
        DriverError::Script(format!("unexpected script result: {}", e))
    }
}

/// Errors surfaced by a traversal pass or an observation session.
#[derive(Debug, Error)]
pub enum ScoutError {
    /// The root context failed in a way that aborts the pass.
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// The observation loop was stopped and cannot be restarted.
    #[error("Observation loop is stopped")]
    LoopStopped,

    /// Extraction configuration is unusable.
    #[error("Invalid extraction config: {0}")]
    InvalidConfig(String),
}
