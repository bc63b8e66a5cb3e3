//! # domscout-config
//!
//! TOML configuration for the domscout CLI: extraction settings, browser
//! launch/attach options, report output and logging.

mod error;
mod loader;
mod schema;
mod validator;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
pub use validator::{ConfigValidator, ValidationError, ValidationResult, ValidationWarning};
