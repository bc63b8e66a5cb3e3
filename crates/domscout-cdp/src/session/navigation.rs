//! Navigation operations for CDP page session.

use std::time::{Duration, Instant};

use serde_json::json;
use tracing::debug;

use crate::error::CdpError;

use super::core::PageSession;

const LOAD_TIMEOUT: Duration = Duration::from_secs(30);
const LOAD_POLL: Duration = Duration::from_millis(100);

/// Whether a `document.readyState` value means the DOM can be queried.
pub(super) fn is_ready(state: Option<&str>) -> bool {
    matches!(state, Some("interactive") | Some("complete"))
}

impl PageSession {
    /// Navigate to URL and wait for the document to become usable.
    pub async fn navigate(&self, url: &str) -> Result<String, CdpError> {
        let result = self
            .call("Page.navigate", Some(json!({"url": url})))
            .await?;

        if let Some(error) = result.get("errorText") {
            return Err(CdpError::NavigationFailed(format!(
                "{}: {}",
                url,
                error.as_str().unwrap_or("Unknown error")
            )));
        }

        let frame_id = result["frameId"]
            .as_str()
            .unwrap_or("main")
            .to_string();

        self.wait_for_load().await?;

        debug!("Navigated to {}", url);
        Ok(frame_id)
    }

    /// Poll `document.readyState` until the DOM is interactive.
    pub(super) async fn wait_for_load(&self) -> Result<(), CdpError> {
        let start = Instant::now();

        loop {
            // The old context may be torn down mid-navigation; keep polling.
            match self.evaluate("document.readyState").await {
                Ok(state) if is_ready(state.as_str()) => return Ok(()),
                Ok(_) | Err(CdpError::JavaScript(_)) | Err(CdpError::Protocol { .. }) => {}
                Err(e) => return Err(e),
            }

            if start.elapsed() > LOAD_TIMEOUT {
                return Err(CdpError::Timeout("Page load timeout".to_string()));
            }

            tokio::time::sleep(LOAD_POLL).await;
        }
    }

    /// Get current URL.
    pub async fn get_url(&self) -> Result<String, CdpError> {
        let result = self.evaluate("window.location.href").await?;
        Ok(result.as_str().unwrap_or("").to_string())
    }

    /// Get page title.
    pub async fn get_title(&self) -> Result<String, CdpError> {
        let result = self.evaluate("document.title").await?;
        Ok(result.as_str().unwrap_or("").to_string())
    }
}
