//! CLI command definitions and dispatch.

pub mod config;
pub mod console;
pub mod policy;

use clap::{Parser, Subcommand};

use clubdesk_core::config::AppConfig;
use clubdesk_core::error::AppError;

use crate::output::OutputFormat;

/// ClubDesk: Fahari FC administration
#[derive(Debug, Parser)]
#[command(name = "clubdesk", version, about, long_about = None)]
pub struct Cli {
    /// Configuration overlay to apply on top of config/default.toml
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Role and capability table
    Policy(policy::PolicyArgs),
    /// Configuration management
    Config(config::ConfigArgs),
    /// Interactive signed-in console
    Console(console::ConsoleArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Policy(args) => policy::execute(args, self.format),
            Commands::Config(args) => config::execute(args, &config, self.format),
            Commands::Console(args) => console::execute(args, config, self.format).await,
        }
    }
}
