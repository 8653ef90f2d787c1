//! Solwin CLI - tooling for the Solar Window embedding protocol.
//!
//! Serves the embed script, queries regional rate data, and runs both
//! protocol endpoints in-process for a quick end-to-end check.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use solwin_config::{Config, LoadOptions};
use tracing::debug;

mod commands;
mod config_bridge;
mod theme;

use commands::{config, demo, rate, region, serve};
use theme::Theme;

/// Solwin - Solar Window embedding toolkit
#[derive(Parser)]
#[command(name = "solwin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Extra configuration file, merged above the discovered ones
    #[arg(short, long, global = true, env = "SOLWIN_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the embed script and the rate API
    Serve {
        /// Address to listen on (overrides server.bind)
        #[arg(short, long)]
        bind: Option<String>,

        /// Disable script caching
        #[arg(long)]
        dev: bool,
    },

    /// Show recent residential electricity rates for a state
    Rate {
        /// Two-letter state code, or US for the national average
        state: String,

        /// Number of monthly records
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve a coordinate to its state and summarize energy data
    Region {
        /// Latitude in degrees
        #[arg(allow_hyphen_values = true)]
        lat: f64,

        /// Longitude in degrees
        #[arg(allow_hyphen_values = true)]
        lng: f64,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Run an engine inside an embed over the in-process transport
    Demo {
        /// Origin of the host document
        #[arg(long, default_value = "https://host.example")]
        origin: String,

        /// Starting address forwarded to the engine
        #[arg(long)]
        location: Option<String>,

        /// Readiness delay in milliseconds (overrides engine.ready_delay_ms)
        #[arg(long)]
        ready_delay_ms: Option<u64>,
    },

    /// View configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the resolved configuration with source annotations
    Show {
        /// Output format: toml or json
        #[arg(short, long, default_value = "toml")]
        format: String,

        /// Limit output to one section
        #[arg(short, long)]
        section: Option<String>,
    },
    /// List the config files and environment variables consulted
    Paths,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut load_options = LoadOptions::default();
    load_options.workspace_root = std::env::current_dir().ok();
    load_options.explicit_file.clone_from(&cli.config);
    let loaded = Config::load(&load_options);

    let log_config = match &loaded {
        Ok(resolved) => {
            let mut lc = config_bridge::to_log_config(&resolved.config);
            if cli.verbose {
                "debug".clone_into(&mut lc.level);
            }
            lc
        },
        Err(_) => {
            let level = if cli.verbose { "debug" } else { "warn" };
            solwin_telemetry::LogConfig::new(level)
        },
    };
    if let Err(e) = solwin_telemetry::setup_logging(&log_config) {
        eprintln!("Failed to initialize logging: {e}");
    }

    if let Commands::Config {
        command: ConfigCommands::Paths,
    } = &cli.command
    {
        config::show_paths(&load_options);
        return Ok(());
    }

    let resolved = match loaded {
        Ok(resolved) => resolved,
        Err(e) => {
            eprintln!("{}", Theme::error(&format!("Configuration error: {e}")));
            std::process::exit(2);
        },
    };
    let cfg = &resolved.config;
    debug!(files = ?resolved.loaded_files, "configuration loaded");

    match cli.command {
        Commands::Serve { bind, dev } => serve::run_serve(cfg, bind, dev).await?,
        Commands::Rate { state, limit, json } => rate::run_rate(cfg, &state, limit, json).await?,
        Commands::Region { lat, lng, json } => region::run_region(cfg, lat, lng, json).await?,
        Commands::Demo {
            origin,
            location,
            ready_delay_ms,
        } => {
            demo::run_demo(
                cfg,
                demo::DemoArgs {
                    origin,
                    location,
                    ready_delay_ms,
                },
            )
            .await?;
        },
        Commands::Config { command } => match command {
            ConfigCommands::Show { format, section } => {
                config::show_config(&resolved, &format, section.as_deref())?;
            },
            ConfigCommands::Paths => config::show_paths(&load_options),
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_region_with_negative_longitude() {
        let cli = Cli::try_parse_from(["solwin", "region", "40.01", "-105.27", "--json"]).unwrap();
        match cli.command {
            Commands::Region { lat, lng, json } => {
                assert!((lat - 40.01).abs() < f64::EPSILON);
                assert!((lng + 105.27).abs() < f64::EPSILON);
                assert!(json);
            },
            _ => panic!("expected region command"),
        }
    }

    #[test]
    fn test_global_config_flag() {
        let cli =
            Cli::try_parse_from(["solwin", "rate", "co", "--config", "/tmp/solwin.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/solwin.toml")));
        assert!(matches!(cli.command, Commands::Rate { ref state, .. } if state == "co"));
    }

    #[test]
    fn test_config_show_defaults_to_toml() {
        let cli = Cli::try_parse_from(["solwin", "config", "show"]).unwrap();
        match cli.command {
            Commands::Config {
                command: ConfigCommands::Show { format, section },
            } => {
                assert_eq!(format, "toml");
                assert!(section.is_none());
            },
            _ => panic!("expected config show"),
        }
    }
}
