//! Configuration schema definitions.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub extraction: ExtractionSection,

    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Element discovery settings, fixed for the lifetime of a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionSection {
    /// Minimum rendered width and height in CSS pixels.
    #[serde(default = "default_min_element_size")]
    pub min_element_size: f64,

    #[serde(default = "default_observation_interval_ms")]
    pub observation_interval_ms: u64,

    #[serde(default = "default_name_max_length")]
    pub name_max_length: usize,

    /// Levels of nested frames a pass descends into.
    #[serde(default = "default_max_frame_depth")]
    pub max_frame_depth: usize,
}

impl Default for ExtractionSection {
    fn default() -> Self {
        Self {
            min_element_size: default_min_element_size(),
            observation_interval_ms: default_observation_interval_ms(),
            name_max_length: default_name_max_length(),
            max_frame_depth: default_max_frame_depth(),
        }
    }
}

fn default_min_element_size() -> f64 {
    5.0
}

fn default_observation_interval_ms() -> u64 {
    1000
}

fn default_name_max_length() -> usize {
    50
}

fn default_max_frame_depth() -> usize {
    8
}

/// How to reach a browser.
///
/// When `endpoint` is set an existing browser is attached to and nothing is
/// launched; the remaining launch options are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// HTTP DevTools endpoint of a running browser, e.g. `http://127.0.0.1:9222`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(default = "default_debug_port")]
    pub debug_port: u16,

    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Explicit browser executable; searched for when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chrome_path: Option<PathBuf>,

    /// User data directory. A throwaway directory is used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_dir: Option<String>,

    #[serde(default = "default_launch_timeout_ms")]
    pub launch_timeout_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            debug_port: default_debug_port(),
            headless: default_headless(),
            chrome_path: None,
            profile_dir: None,
            launch_timeout_ms: default_launch_timeout_ms(),
        }
    }
}

fn default_debug_port() -> u16 {
    9222
}

fn default_headless() -> bool {
    true
}

fn default_launch_timeout_ms() -> u64 {
    30_000
}

/// Report file settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: PathBuf,

    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            pretty: default_pretty(),
        }
    }
}

fn default_output_path() -> PathBuf {
    PathBuf::from("domscout-report.json")
}

fn default_pretty() -> bool {
    true
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file directory. `~` is expanded.
    #[serde(default = "default_log_directory")]
    pub directory: String,

    #[serde(default = "default_file_enabled")]
    pub file_enabled: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: default_log_directory(),
            file_enabled: default_file_enabled(),
        }
    }
}

impl LoggingConfig {
    /// The log directory with `~` expanded.
    pub fn resolved_directory(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.directory).as_ref())
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_directory() -> String {
    dirs::home_dir()
        .map(|home| home.join(".domscout").join("logs").display().to_string())
        .unwrap_or_else(|| "~/.domscout/logs".to_string())
}

fn default_file_enabled() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.extraction.min_element_size, 5.0);
        assert_eq!(config.extraction.observation_interval_ms, 1000);
        assert_eq!(config.extraction.name_max_length, 50);
        assert_eq!(config.extraction.max_frame_depth, 8);
        assert_eq!(config.browser.debug_port, 9222);
        assert!(config.browser.headless);
        assert!(config.browser.endpoint.is_none());
        assert_eq!(config.output.path, PathBuf::from("domscout-report.json"));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_section_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [extraction]
            name_max_length = 80
            "#,
        )
        .unwrap();
        assert_eq!(config.extraction.name_max_length, 80);
        assert_eq!(config.extraction.min_element_size, 5.0);
        assert_eq!(config.extraction.observation_interval_ms, 1000);
    }

    #[test]
    fn test_default_log_directory_is_absolute() {
        let logging = LoggingConfig::default();
        assert!(logging.resolved_directory().ends_with("logs"));
        assert!(!logging.resolved_directory().starts_with("~"));
    }

    #[test]
    fn test_resolved_directory_expands_tilde() {
        let logging = LoggingConfig {
            directory: "~/custom-logs".to_string(),
            ..LoggingConfig::default()
        };
        let dir = logging.resolved_directory();
        assert!(!dir.starts_with("~"));
        assert!(dir.ends_with("custom-logs"));
    }

    #[test]
    fn test_skips_unset_options_when_serialized() {
        let text = toml::to_string(&Config::default()).unwrap();
        assert!(!text.contains("endpoint"));
        assert!(!text.contains("chrome_path"));
        assert!(text.contains("[extraction]"));
    }
}
