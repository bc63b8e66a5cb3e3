//! `watch` and `scan` subcommand handlers.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use domscout_cdp::CdpRoot;
use domscout_config::{Config, ConfigValidator};
use domscout_core::{Inventory, Observation, RootSource, Traversal};

use crate::adapters::{extraction_config, write_report, ExtractionReport};
use crate::browser::Browser;

const PROGRESS_INTERVAL: Duration = Duration::from_secs(10);

fn validated(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    for warning in ConfigValidator::validate(config)?.into_result()? {
        warn!("{}: {}", warning.path, warning.message);
    }
    Ok(())
}

async fn page_identity(browser: &Browser, fallback: &str) -> (String, String) {
    let url = browser
        .page()
        .get_url()
        .await
        .unwrap_or_else(|_| fallback.to_string());
    let title = browser.page().get_title().await.unwrap_or_default();
    (url, title)
}

/// Observe a page until the duration elapses or Ctrl-C, then write the report.
pub(crate) async fn watch(
    config: Config,
    endpoint: Option<String>,
    url: &str,
    duration: Option<u64>,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    validated(&config)?;
    let output = output.unwrap_or_else(|| config.output.path.clone());

    let browser = Browser::open(&config.browser, endpoint).await?;
    let result = observe(&browser, &config, url, duration).await;
    browser.close().await;

    let report = result?;
    write_report(&report, &output, config.output.pretty)?;
    info!(
        "Wrote {} element(s) from {} pass(es) to {}",
        report.element_count,
        report.passes,
        output.display()
    );
    Ok(())
}

async fn observe(
    browser: &Browser,
    config: &Config,
    url: &str,
    duration: Option<u64>,
) -> Result<ExtractionReport, Box<dyn std::error::Error>> {
    browser.goto(url).await?;

    let started_at = Utc::now();
    let source: Arc<dyn RootSource> = Arc::new(CdpRoot::new(browser.page().clone()));
    let observation = Observation::start(source, extraction_config(&config.extraction)).await?;
    info!("Observing {} (session {})", url, observation.id());

    let deadline = async {
        match duration {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(deadline);

    let mut progress = tokio::time::interval(PROGRESS_INTERVAL);
    progress.tick().await;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
            _ = &mut deadline => {
                info!("Observation time elapsed");
                break;
            }
            _ = progress.tick() => {
                info!(
                    "{} element(s) after {} pass(es)",
                    observation.len(),
                    observation.passes()
                );
            }
        }
    }

    observation.stop_and_wait().await;

    let (url, title) = page_identity(browser, url).await;
    Ok(ExtractionReport::new(
        url,
        title,
        started_at,
        observation.passes(),
        observation.elements(),
    ))
}

/// Run a single discovery pass and write the report.
pub(crate) async fn scan(
    config: Config,
    endpoint: Option<String>,
    url: &str,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    validated(&config)?;
    let output = output.unwrap_or_else(|| config.output.path.clone());

    let browser = Browser::open(&config.browser, endpoint).await?;
    let result = scan_once(&browser, &config, url).await;
    browser.close().await;

    let report = result?;
    write_report(&report, &output, config.output.pretty)?;
    info!("Wrote {} element(s) to {}", report.element_count, output.display());
    Ok(())
}

async fn scan_once(
    browser: &Browser,
    config: &Config,
    url: &str,
) -> Result<ExtractionReport, Box<dyn std::error::Error>> {
    browser.goto(url).await?;

    let extraction = extraction_config(&config.extraction);
    extraction.validate()?;

    let started_at = Utc::now();
    let root = CdpRoot::new(browser.page().clone()).root().await?;
    let traversal = Traversal::new(extraction, Inventory::new());
    let pass = traversal.run_pass(root).await?;
    info!(
        "Pass finished in {:?}: {} committed of {} candidate(s)",
        pass.elapsed, pass.committed, pass.candidates
    );

    let (url, title) = page_identity(browser, url).await;
    Ok(ExtractionReport::new(
        url,
        title,
        started_at,
        1,
        traversal.inventory().snapshot(),
    )
    .with_last_pass(pass))
}
