//! CLI module for the parameter store cache
//!
//! Provides subcommands:
//! - `get`: read keys once and print them as JSON
//! - `watch`: keep a cache alive and print values whenever they change

pub mod get;
pub mod watch;

use anyhow::bail;
use clap::{Args, Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Parameter store cache - expiring, self-refreshing config values
#[derive(Parser)]
#[command(name = "paramstore-cache")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Read keys once and print them as a JSON object
    Get(get::GetArgs),

    /// Keep reading keys through a long-lived cache
    Watch(watch::WatchArgs),
}

/// Key selection shared by all subcommands
#[derive(Args, Clone, Debug)]
pub struct KeyArgs {
    /// Parameter names to read (defaults to `cache.keys` from configuration)
    pub keys: Vec<String>,
}

impl KeyArgs {
    fn resolve(&self, config: &AppConfig) -> anyhow::Result<Vec<String>> {
        let keys = if self.keys.is_empty() {
            config.cache.keys.clone()
        } else {
            self.keys.clone()
        };

        if keys.is_empty() {
            bail!("no keys given on the command line or in cache.keys");
        }

        Ok(keys)
    }
}

/// Load `.env`, configuration and logging
fn bootstrap() -> AppConfig {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration, using defaults: {}", e);
        AppConfig::default()
    });
    logging::init_logging(&config.logging);

    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_get() {
        let cli = Cli::try_parse_from(["paramstore-cache", "get", "foo", "bar"]).unwrap();

        match cli.command {
            Command::Get(args) => assert_eq!(args.keys.keys, vec!["foo", "bar"]),
            Command::Watch(_) => panic!("expected get"),
        }
    }

    #[test]
    fn test_cli_parses_watch_options() {
        let cli = Cli::try_parse_from([
            "paramstore-cache",
            "watch",
            "foo",
            "--interval-secs",
            "5",
            "--expiry-ms",
            "1000",
            "--fallback",
            "fail_hard",
        ])
        .unwrap();

        match cli.command {
            Command::Watch(args) => {
                assert_eq!(args.keys.keys, vec!["foo"]);
                assert_eq!(args.interval_secs, 5);
                assert_eq!(args.expiry_ms, Some(1000));
                assert_eq!(args.fallback, Some(crate::domain::FallbackPolicy::FailHard));
            }
            Command::Get(_) => panic!("expected watch"),
        }
    }

    #[test]
    fn test_keys_fall_back_to_config() {
        let mut config = AppConfig::default();
        config.cache.keys = vec!["from-config".to_string()];

        let args = KeyArgs { keys: vec![] };
        assert_eq!(args.resolve(&config).unwrap(), vec!["from-config"]);

        let args = KeyArgs {
            keys: vec!["from-cli".to_string()],
        };
        assert_eq!(args.resolve(&config).unwrap(), vec!["from-cli"]);
    }

    #[test]
    fn test_no_keys_anywhere_is_an_error() {
        let args = KeyArgs { keys: vec![] };
        assert!(args.resolve(&AppConfig::default()).is_err());
    }
}
