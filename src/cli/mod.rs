//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Parser, Subcommand};

/// Kubernetes to OpenStack networking integration test tool
#[derive(Parser, Debug)]
#[command(name = "osnetcheck")]
#[command(version = "0.1.0")]
#[command(about = "Validate Kubernetes to OpenStack networking integration")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run integration scenarios
    Run(RunArgs),

    /// List available scenarios
    List(ListArgs),

    /// Check the target environment before running scenarios
    Check(CheckArgs),

    /// Manage the configuration file
    Config(ConfigArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Scenario to run (number or name); all scenarios when omitted
    #[arg(short, long)]
    pub scenario: Option<String>,

    /// Output format (table, json, json-pretty, csv, summary)
    #[arg(short, long, default_value = "table")]
    pub format: String,

    /// Save results to file
    #[arg(short, long)]
    pub output: Option<String>,

    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<String>,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Show scenario descriptions
    #[arg(short, long)]
    pub detailed: bool,
}

/// Arguments for the check command
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<String>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write an example configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "./osnetcheck.yaml")]
        output: String,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show {
        /// Show environment variable overrides instead
        #[arg(long)]
        env: bool,

        /// Output format (yaml, json)
        #[arg(short, long, default_value = "yaml")]
        format: String,
    },

    /// Validate a configuration file
    Validate {
        /// Path to the file; searched for when omitted
        #[arg(short, long)]
        file: Option<String>,
    },

    /// List supported environment variables
    Env,
}
