//! Bridges between the config file, the library crates and the report file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use domscout_cdp::LaunchOptions;
use domscout_config::{BrowserConfig, ConfigLoader, ExtractionSection};
use domscout_core::{ElementDescriptor, ExtractionConfig, PassReport};

/// Session settings from the `[extraction]` section.
pub(crate) fn extraction_config(section: &ExtractionSection) -> ExtractionConfig {
    ExtractionConfig {
        min_element_size: section.min_element_size,
        observation_interval: Duration::from_millis(section.observation_interval_ms),
        name_max_length: section.name_max_length,
        max_frame_depth: section.max_frame_depth,
    }
}

/// Chrome launch settings from the `[browser]` section.
pub(crate) fn launch_options(browser: &BrowserConfig) -> LaunchOptions {
    LaunchOptions {
        chrome_path: browser.chrome_path.clone(),
        debug_port: browser.debug_port,
        headless: browser.headless,
        profile_dir: browser
            .profile_dir
            .as_deref()
            .map(|dir| PathBuf::from(ConfigLoader::expand_path(dir))),
        launch_timeout: Duration::from_millis(browser.launch_timeout_ms),
    }
}

/// What gets written to the output file.
#[derive(Debug, Serialize)]
pub(crate) struct ExtractionReport {
    pub url: String,
    pub title: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub passes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_pass: Option<PassReport>,
    pub element_count: usize,
    pub elements: Vec<ElementDescriptor>,
}

impl ExtractionReport {
    /// Elements are sorted by locator so reports diff cleanly.
    pub(crate) fn new(
        url: String,
        title: String,
        started_at: DateTime<Utc>,
        passes: u64,
        mut elements: Vec<ElementDescriptor>,
    ) -> Self {
        elements.sort_by(|a, b| a.locator.cmp(&b.locator));
        Self {
            url,
            title,
            started_at,
            finished_at: Utc::now(),
            passes,
            last_pass: None,
            element_count: elements.len(),
            elements,
        }
    }

    pub(crate) fn with_last_pass(mut self, pass: PassReport) -> Self {
        self.last_pass = Some(pass);
        self
    }
}

/// Write the report as JSON, creating parent directories.
pub(crate) fn write_report(
    report: &ExtractionReport,
    path: &Path,
    pretty: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = if pretty {
        serde_json::to_string_pretty(report)?
    } else {
        serde_json::to_string(report)?
    };
    std::fs::write(path, json)?;
    Ok(())
}
