//! osnetcheck - Kubernetes to OpenStack networking integration test tool
//!
//! A CLI tool that validates the virtual-network plumbing a Kubernetes to
//! OpenStack integration layer derives from cluster resources: namespaces
//! map to Neutron subnets and security groups, services carry traffic, and
//! teardown removes everything again.
//!
//! ## Usage
//!
//! ```bash
//! # Run every scenario
//! osnetcheck run
//!
//! # Run one scenario by number or name
//! osnetcheck run --scenario 2
//! osnetcheck run --scenario pod-isolation
//!
//! # List available scenarios
//! osnetcheck list --detailed
//!
//! # Verify the environment without creating resources
//! osnetcheck check
//!
//! # Write an example configuration
//! osnetcheck config init
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;
mod config;
mod error;
mod executor;
mod k8s;
mod models;
mod openstack;
mod output;
mod probe;
mod scenario;
mod utils;

use cli::Args;
use config::env::EnvConfig;
use config::{AppConfig, ConfigFile};
use executor::{PreFlightChecker, ScenarioRunner};
use models::ScenarioCase;
use output::{write_summary_to_file, OutputFormat, ResultFormatter};
use utils::logger::{init_logger, LogLevel};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let env = EnvConfig::load();

    let verbose = args.verbose || env.verbose.unwrap_or(false);
    init_logger(if verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    });

    match args.command {
        cli::Command::Run(run_args) => {
            run_scenarios(run_args, &env).await?;
        }
        cli::Command::List(list_args) => {
            list_scenarios(list_args);
        }
        cli::Command::Check(check_args) => {
            run_preflight(check_args, &env).await?;
        }
        cli::Command::Config(config_args) => {
            manage_config(config_args)?;
        }
    }

    Ok(())
}

/// Load the configuration file (explicit path, env path, or search) and
/// overlay the environment variables.
fn load_config(path_flag: Option<&str>, env: &EnvConfig) -> Result<AppConfig> {
    let file = match path_flag.or(env.config_file.as_deref()) {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::load_default()?,
    };

    let mut app = file.app;
    env.apply(&mut app);
    Ok(app)
}

async fn run_scenarios(args: cli::RunArgs, env: &EnvConfig) -> Result<()> {
    let config = load_config(args.config.as_deref(), env)?;

    let format = OutputFormat::from_str(&args.format)
        .or_else(|| env.format.as_deref().and_then(OutputFormat::from_str))
        .unwrap_or(OutputFormat::Table);
    let formatter = ResultFormatter::new(format);

    let runner = ScenarioRunner::new(config);
    let summary = match &args.scenario {
        Some(selector) => {
            let case = ScenarioCase::from_selector(selector)
                .ok_or_else(|| anyhow::anyhow!("Unknown scenario: {selector}"))?;
            runner.run_cases(&[case]).await?
        }
        None => runner.run_all().await?,
    };

    println!("{}", formatter.format_summary(&summary));

    if let Some(path) = &args.output {
        write_summary_to_file(path, &summary, format)?;
        println!("Results saved to: {path}");
    }

    if !summary.is_clean() {
        std::process::exit(1);
    }

    Ok(())
}

fn list_scenarios(args: cli::ListArgs) {
    println!("\nNetworking Integration Scenarios\n");
    println!("──────────────────────────────────────────────────────────────────────");

    for case in ScenarioCase::all() {
        if args.detailed {
            println!("  {:2}. {:22} {}", case.number(), case.name(), case.description());
        } else {
            println!("  {:2}. {}", case.number(), case.name());
        }
    }

    println!("──────────────────────────────────────────────────────────────────────\n");
}

async fn run_preflight(args: cli::CheckArgs, env: &EnvConfig) -> Result<()> {
    let config = load_config(args.config.as_deref(), env)?;

    let checker = PreFlightChecker::new(config);
    let result = checker.run().await;
    println!("{}", result.format_table());

    if !result.passed {
        std::process::exit(1);
    }

    Ok(())
}

fn manage_config(args: cli::ConfigArgs) -> Result<()> {
    use std::path::Path;

    match args.action {
        cli::ConfigAction::Init { output, force } => {
            let path = Path::new(&output);
            if path.exists() && !force {
                anyhow::bail!(
                    "Configuration file already exists: {output}. Use --force to overwrite."
                );
            }

            let config = ConfigFile::example();
            config.save(path)?;
            println!("✓ Configuration file created: {output}");
            println!("\nEdit the file to fill in the OpenStack credentials.");
        }

        cli::ConfigAction::Show { env, format } => {
            if env {
                let env_config = EnvConfig::load();
                env_config.print_summary();
            } else {
                let config = ConfigFile::load_default()?;
                let output = if format == "json" {
                    serde_json::to_string_pretty(&config)?
                } else {
                    serde_yaml::to_string(&config)?
                };
                println!("{output}");
            }
        }

        cli::ConfigAction::Validate { file } => {
            let path = file.unwrap_or_else(|| {
                ConfigFile::find()
                    .map(|p| p.to_string_lossy().to_string())
                    .unwrap_or_else(|| "./osnetcheck.yaml".to_string())
            });

            match ConfigFile::load(&path) {
                Ok(_) => {
                    println!("✓ Configuration file is valid: {path}");
                }
                Err(e) => {
                    println!("✗ Configuration file is invalid: {path}");
                    println!("  Error: {e}");
                    return Err(e);
                }
            }
        }

        cli::ConfigAction::Env => {
            config::env::print_env_help();
        }
    }

    Ok(())
}
