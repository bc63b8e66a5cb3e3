//! Core session struct and CDP command dispatch.

use serde_json::Value;
use tracing::debug;

use crate::client::Transport;
use crate::error::CdpError;

/// A session attached to a single page/target.
pub struct PageSession {
    target_id: String,
    session_id: String,
    transport: Transport,
}

impl PageSession {
    pub(crate) fn new(target_id: String, session_id: String, transport: Transport) -> Self {
        Self {
            target_id,
            session_id,
            transport,
        }
    }

    /// Get target ID.
    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    /// Send a CDP command to this page session.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        self.transport
            .send(method, params, Some(&self.session_id))
            .await
    }

    /// Enable the domains discovery relies on.
    pub(crate) async fn enable_domains(&self) -> Result<(), CdpError> {
        self.call("Page.enable", None).await?;
        self.call("DOM.enable", None).await?;
        self.call("Runtime.enable", None).await?;

        debug!("Enabled CDP domains for session {}", self.session_id);
        Ok(())
    }
}
