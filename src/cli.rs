//! CLI definitions for domscout.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// domscout CLI.
#[derive(Parser)]
#[command(name = "domscout")]
#[command(about = "Discover visible, interactable page elements and stable locators for them")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (defaults apply when the file is missing)
    #[arg(short, long, default_value = "config/default.toml", global = true)]
    pub config: PathBuf,

    /// Attach to a running browser at this DevTools endpoint instead of launching one
    #[arg(short, long, global = true, env = "DOMSCOUT_ENDPOINT")]
    pub endpoint: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Open a page and keep observing it until the duration elapses or Ctrl-C
    Watch {
        /// Page to open
        url: String,

        /// Stop after this many seconds
        #[arg(short, long)]
        duration: Option<u64>,

        /// Report file (overrides output.path)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Open a page, run a single discovery pass and write the report
    Scan {
        /// Page to open
        url: String,

        /// Report file (overrides output.path)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Load and validate the configuration file
    Check,

    /// Print the effective configuration as TOML
    Show,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_watch() {
        let cli = Cli::try_parse_from([
            "domscout",
            "watch",
            "https://example.com",
            "--duration",
            "30",
            "-o",
            "out.json",
        ])
        .unwrap();

        match cli.command {
            Commands::Watch { url, duration, output } => {
                assert_eq!(url, "https://example.com");
                assert_eq!(duration, Some(30));
                assert_eq!(output, Some(PathBuf::from("out.json")));
            }
            _ => panic!("expected watch"),
        }
        assert_eq!(cli.config, PathBuf::from("config/default.toml"));
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "domscout",
            "scan",
            "https://example.com",
            "--endpoint",
            "http://127.0.0.1:9333",
            "--config",
            "custom.toml",
        ])
        .unwrap();

        assert_eq!(cli.endpoint.as_deref(), Some("http://127.0.0.1:9333"));
        assert_eq!(cli.config, PathBuf::from("custom.toml"));
        assert!(matches!(cli.command, Commands::Scan { .. }));
    }

    #[test]
    fn test_parse_config_check() {
        let cli = Cli::try_parse_from(["domscout", "config", "check"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config {
                action: ConfigAction::Check
            }
        ));
    }

    #[test]
    fn test_watch_requires_url() {
        assert!(Cli::try_parse_from(["domscout", "watch"]).is_err());
    }
}
