//! `config` subcommand handlers.

use std::path::Path;

use domscout_config::{Config, ConfigValidator};

use crate::cli::ConfigAction;

/// Handle config subcommands.
pub(crate) fn handle_config_command(
    action: ConfigAction,
    path: &Path,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Check => check(path, config),
        ConfigAction::Show => {
            println!("{}", toml::to_string_pretty(config)?);
            Ok(())
        }
    }
}

fn check(path: &Path, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let result = ConfigValidator::validate(config)?;

    for warning in &result.warnings {
        println!("warning: {}: {}", warning.path, warning.message);
    }
    for error in &result.errors {
        println!("error: {}: {}", error.path, error.message);
    }

    if !result.is_valid() {
        return Err(format!("{} has {} error(s)", path.display(), result.errors.len()).into());
    }

    let source = if path.exists() {
        path.display().to_string()
    } else {
        "built-in defaults".to_string()
    };
    println!("{} is valid", source);
    Ok(())
}
