//! Local Chrome process management.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::error::CdpError;

const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// How to start Chrome.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Executable to run; searched for when unset.
    pub chrome_path: Option<PathBuf>,
    /// Chrome debugging port.
    pub debug_port: u16,
    pub headless: bool,
    /// User data directory.
    pub profile_dir: Option<PathBuf>,
    /// How long to wait for the DevTools endpoint to answer.
    pub launch_timeout: Duration,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            chrome_path: None,
            debug_port: 9222,
            headless: true,
            profile_dir: None,
            launch_timeout: Duration::from_secs(30),
        }
    }
}

impl LaunchOptions {
    /// Get the profile directory, falling back to `~/.domscout/browser-profile`.
    pub fn profile_dir(&self) -> PathBuf {
        self.profile_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".domscout")
                .join("browser-profile")
        })
    }

    /// Get the CDP endpoint URL.
    pub fn endpoint(&self) -> String {
        format!("http://127.0.0.1:{}", self.debug_port)
    }

    /// Command-line flags passed to Chrome.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            format!("--remote-debugging-port={}", self.debug_port),
            format!("--user-data-dir={}", self.profile_dir().display()),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
            "--disable-background-networking".to_string(),
            "--disable-sync".to_string(),
            "--disable-translate".to_string(),
            "--metrics-recording-only".to_string(),
        ];
        if self.headless {
            args.push("--headless=new".to_string());
        }
        args
    }
}

/// Starts Chrome with remote debugging and stops it again.
///
/// A browser already listening on the debug port is reused and left running.
pub struct ChromeLauncher {
    options: LaunchOptions,
    child: Option<Child>,
}

impl ChromeLauncher {
    pub fn new(options: LaunchOptions) -> Self {
        Self {
            options,
            child: None,
        }
    }

    /// Find Chrome executable path.
    pub fn find_chrome() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        let paths: &[&str] = &[
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
        ];

        #[cfg(target_os = "linux")]
        let paths: &[&str] = &[
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
        ];

        #[cfg(target_os = "windows")]
        let paths: &[&str] = &[
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
        ];

        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        let paths: &[&str] = &[];

        paths.iter().map(PathBuf::from).find(|p| p.exists())
    }

    /// Whether something answers on the DevTools endpoint.
    pub async fn is_running(endpoint: &str) -> bool {
        reqwest::get(format!("{}/json/version", endpoint))
            .await
            .is_ok()
    }

    /// Whether this launcher owns a Chrome process.
    pub fn owns_process(&self) -> bool {
        self.child.is_some()
    }

    /// Make sure Chrome is reachable and return its DevTools endpoint.
    pub async fn launch(&mut self) -> Result<String, CdpError> {
        let endpoint = self.options.endpoint();

        if Self::is_running(&endpoint).await {
            info!("Chrome already running on port {}", self.options.debug_port);
            return Ok(endpoint);
        }

        let chrome_path = match &self.options.chrome_path {
            Some(path) => path.clone(),
            None => Self::find_chrome().ok_or(CdpError::ChromeNotFound)?,
        };
        let profile_dir = self.options.profile_dir();
        if let Err(e) = std::fs::create_dir_all(&profile_dir) {
            warn!("Failed to create profile directory: {}", e);
        }

        info!(
            "Launching {} with profile at {}",
            chrome_path.display(),
            profile_dir.display()
        );

        let child = Command::new(&chrome_path)
            .args(self.options.args())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CdpError::LaunchFailed(format!("{}: {}", chrome_path.display(), e)))?;

        info!("Chrome launched with PID: {:?}", child.id());
        self.child = Some(child);

        self.wait_until_ready(&endpoint).await?;
        Ok(endpoint)
    }

    async fn wait_until_ready(&mut self, endpoint: &str) -> Result<(), CdpError> {
        let started = Instant::now();
        loop {
            tokio::time::sleep(POLL_INTERVAL).await;
            if Self::is_running(endpoint).await {
                debug!("DevTools endpoint up after {:?}", started.elapsed());
                return Ok(());
            }

            if let Some(child) = self.child.as_mut() {
                if let Ok(Some(status)) = child.try_wait() {
                    self.child = None;
                    return Err(CdpError::LaunchFailed(format!("Chrome exited early: {}", status)));
                }
            }

            if started.elapsed() >= self.options.launch_timeout {
                self.shutdown().await;
                return Err(CdpError::LaunchFailed(
                    "Chrome failed to start within timeout".to_string(),
                ));
            }
        }
    }

    /// Kill Chrome if this launcher started it.
    pub async fn shutdown(&mut self) {
        if let Some(mut child) = self.child.take() {
            info!("Shutting down Chrome...");
            if let Err(e) = child.kill().await {
                warn!("Failed to kill Chrome: {}", e);
            }
        }
    }
}

#[cfg(test)]
#[path = "launcher_tests.rs"]
mod tests;
