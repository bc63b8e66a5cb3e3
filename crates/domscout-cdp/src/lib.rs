//! Chrome DevTools Protocol driver for domscout.
//!
//! Connects to Chrome/Chromium over the DevTools WebSocket and exposes a page
//! as the discovery traits from `domscout-core`.
//!
//! ## Usage
//!
//! 1. Start Chrome with remote debugging, or let [`ChromeLauncher`] do it:
//!    ```bash
//!    chrome --remote-debugging-port=9222
//!    ```
//!
//! 2. Connect, open a page and observe it:
//!    ```rust,ignore
//!    let client = CdpClient::connect("http://127.0.0.1:9222").await?;
//!    let page = Arc::new(client.new_page().await?);
//!    page.navigate("https://example.com").await?;
//!    let observation = Observation::start(Arc::new(CdpRoot::new(page)), config).await?;
//!    ```

#![recursion_limit = "256"]

mod client;
mod driver;
mod error;
mod launcher;
mod protocol;
mod session;

pub use client::CdpClient;
pub use driver::{CdpElement, CdpFrame, CdpRoot, OBJECT_GROUP};
pub use error::CdpError;
pub use launcher::{ChromeLauncher, LaunchOptions};
pub use protocol::*;
pub use session::PageSession;
