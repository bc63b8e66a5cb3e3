//! Browser connection for a single CLI run.

use std::sync::Arc;

use tracing::{info, warn};

use domscout_cdp::{CdpClient, CdpError, ChromeLauncher, PageSession};
use domscout_config::BrowserConfig;

use crate::adapters::launch_options;

/// A page in a connected browser, plus the process if we started it.
pub(crate) struct Browser {
    launcher: Option<ChromeLauncher>,
    client: CdpClient,
    page: Arc<PageSession>,
}

impl Browser {
    /// Attach to `endpoint` (flag, then `browser.endpoint`) or launch Chrome,
    /// then open a blank tab.
    pub(crate) async fn open(
        config: &BrowserConfig,
        endpoint: Option<String>,
    ) -> Result<Self, CdpError> {
        let (launcher, endpoint) = match endpoint.or_else(|| config.endpoint.clone()) {
            Some(endpoint) => {
                info!("Attaching to browser at {}", endpoint);
                (None, endpoint)
            }
            None => {
                let mut launcher = ChromeLauncher::new(launch_options(config));
                let endpoint = launcher.launch().await?;
                (Some(launcher), endpoint)
            }
        };

        let client = CdpClient::connect(&endpoint).await?;
        let page = match client.new_page().await {
            Ok(page) => Arc::new(page),
            Err(e) => {
                if let Some(mut launcher) = launcher {
                    launcher.shutdown().await;
                }
                return Err(e);
            }
        };

        Ok(Self {
            launcher,
            client,
            page,
        })
    }

    pub(crate) fn page(&self) -> &Arc<PageSession> {
        &self.page
    }

    /// Navigate; returns once the document is interactive.
    pub(crate) async fn goto(&self, url: &str) -> Result<(), CdpError> {
        self.page.navigate(url).await.map(|_| ())
    }

    /// Close our tab and stop Chrome if we launched it.
    pub(crate) async fn close(mut self) {
        if let Err(e) = self.client.close_page(self.page.target_id()).await {
            warn!("Failed to close tab: {}", e);
        }
        if let Some(launcher) = self.launcher.as_mut() {
            if launcher.owns_process() {
                launcher.shutdown().await;
            }
        }
    }
}
