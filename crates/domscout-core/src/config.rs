//! Extraction session configuration.

use std::time::Duration;

use crate::error::ScoutError;

/// Settings fixed for the lifetime of one extraction session.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionConfig {
    /// Minimum rendered width and height, in CSS pixels.
    pub min_element_size: f64,
    /// Delay between observation pulses.
    pub observation_interval: Duration,
    /// Maximum name length, in characters.
    pub name_max_length: usize,
    /// How many levels of nested frames a pass descends into.
    pub max_frame_depth: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_element_size: 5.0,
            observation_interval: Duration::from_millis(1000),
            name_max_length: 50,
            max_frame_depth: 8,
        }
    }
}

impl ExtractionConfig {
    /// Reject settings that would make every pass meaningless.
    pub fn validate(&self) -> Result<(), ScoutError> {
        if !self.min_element_size.is_finite() || self.min_element_size < 0.0 {
            return Err(ScoutError::InvalidConfig(format!(
                "min_element_size must be a non-negative number, got {}",
                self.min_element_size
            )));
        }
        if self.observation_interval.is_zero() {
            return Err(ScoutError::InvalidConfig(
                "observation_interval must be greater than 0".to_string(),
            ));
        }
        if self.name_max_length == 0 {
            return Err(ScoutError::InvalidConfig(
                "name_max_length must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
