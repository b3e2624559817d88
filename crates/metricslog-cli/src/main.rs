//! metricslog CLI - Build and inspect metrics logs
//!
//! Provides commands for:
//! - Building a report from a snapshot of collaborator state
//! - Showing the reporting version string
//! - Viewing and validating configuration

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use metricslog_core::config::Config;
use tracing_subscriber::EnvFilter;

mod commands;
mod fixture;
mod output;

use commands::{
    build::BuildCommand, completions::CompletionsCommand, config::ConfigCommand,
    version::VersionCommand,
};
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "metricslog", version, about = "Dual-encoding metrics log builder")]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build, lock and encode a report from a fixture
    Build(BuildCommand),
    /// Show the reporting version string
    Version(VersionCommand),
    /// View and validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Generate shell completions
    Completions(CompletionsCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = Config::load_or_default(&config_path);

    // Setup tracing; logs go to stderr so stdout carries only report output
    let filter = match cli.verbose {
        0 => config.logging.level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if config.logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };

    match cli.command {
        Commands::Build(cmd) => cmd.execute(&config, format),
        Commands::Version(cmd) => cmd.execute(&config, format),
        Commands::Config(cmd) => cmd.execute(&config, &config_path, format),
        Commands::Completions(cmd) => cmd.execute(format),
    }
}
