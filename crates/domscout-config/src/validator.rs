//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// The first error as a [`ConfigError`], if any.
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(e) => Err(ConfigError::InvalidValue {
                field: e.path,
                message: e.message,
            }),
            None => Ok(self.warnings),
        }
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_extraction(config, &mut result);
        Self::validate_browser(config, &mut result);
        Self::validate_output(config, &mut result);
        Self::validate_logging(config, &mut result);

        Ok(result)
    }

    fn validate_extraction(config: &Config, result: &mut ValidationResult) {
        let extraction = &config.extraction;

        if !extraction.min_element_size.is_finite() || extraction.min_element_size < 0.0 {
            result.add_error(ValidationError::new(
                "extraction.min_element_size",
                "min_element_size must be a non-negative number",
            ));
        } else if extraction.min_element_size > 200.0 {
            result.add_warning(ValidationWarning::new(
                "extraction.min_element_size",
                "min_element_size is very high (>200), most controls will be filtered out",
            ));
        }

        if extraction.observation_interval_ms == 0 {
            result.add_error(ValidationError::new(
                "extraction.observation_interval_ms",
                "observation_interval_ms must be greater than 0",
            ));
        } else if extraction.observation_interval_ms < 100 {
            result.add_warning(ValidationWarning::new(
                "extraction.observation_interval_ms",
                "observation_interval_ms is below 100, passes will mostly be skipped",
            ));
        }

        if extraction.name_max_length == 0 {
            result.add_error(ValidationError::new(
                "extraction.name_max_length",
                "name_max_length must be greater than 0",
            ));
        }

        if extraction.max_frame_depth == 0 {
            result.add_warning(ValidationWarning::new(
                "extraction.max_frame_depth",
                "max_frame_depth is 0, nested frames will not be traversed",
            ));
        }
    }

    fn validate_browser(config: &Config, result: &mut ValidationResult) {
        let browser = &config.browser;

        if let Some(ref endpoint) = browser.endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                result.add_error(ValidationError::new(
                    "browser.endpoint",
                    "endpoint must start with http:// or https://",
                ));
            }
            if browser.chrome_path.is_some() || browser.profile_dir.is_some() {
                result.add_warning(ValidationWarning::new(
                    "browser",
                    "endpoint is set, launch options are ignored",
                ));
            }
            return;
        }

        if browser.debug_port == 0 {
            result.add_error(ValidationError::new(
                "browser.debug_port",
                "Port cannot be 0",
            ));
        }

        if browser.launch_timeout_ms == 0 {
            result.add_error(ValidationError::new(
                "browser.launch_timeout_ms",
                "launch_timeout_ms must be greater than 0",
            ));
        }

        if let Some(ref path) = browser.chrome_path {
            if !path.exists() {
                result.add_warning(ValidationWarning::new(
                    "browser.chrome_path",
                    format!("Browser executable does not exist: {:?}", path),
                ));
            }
        }
    }

    fn validate_output(config: &Config, result: &mut ValidationResult) {
        if config.output.path.as_os_str().is_empty() {
            result.add_error(ValidationError::new(
                "output.path",
                "Output path cannot be empty",
            ));
        }
    }

    fn validate_logging(config: &Config, result: &mut ValidationResult) {
        let level = config.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            result.add_warning(ValidationWarning::new(
                "logging.level",
                format!(
                    "Unknown log level '{}', valid values: {:?}",
                    config.logging.level, LOG_LEVELS
                ),
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
