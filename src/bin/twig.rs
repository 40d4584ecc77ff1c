//! twig CLI Binary
//!
//! Command-line interface for the twig version-control core.

use anyhow::Context;
use clap::Parser;
use std::process;
use tracing::{error, info};
use twig::cli::{Cli, RunContext};
use twig::config::TwigConfig;
use twig::error::ApiError;
use twig::logging::{init_logging, LoggingConfig};
use twig::repository::Repository;
use twig::tree::walker::REPO_DIR_NAME;

fn main() {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(output) => {
            info!("Command completed successfully");
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(e) => {
            error!("Command failed: {:#}", e);
            match e.downcast_ref::<ApiError>() {
                Some(api) => eprintln!("{}", twig::cli::map_error(api)),
                None => eprintln!("error: {:#}", e),
            }
            process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<String> {
    let logging_config = build_logging_config(cli);
    init_logging(Some(&logging_config)).context("Failed to initialize logging")?;
    info!("twig CLI starting");

    let context = RunContext::new(cli.repo.clone(), cli.config.clone())?;
    Ok(context.execute(&cli.command)?)
}

/// Build logging configuration from CLI args, environment, and config file
fn build_logging_config(cli: &Cli) -> LoggingConfig {
    // Without --verbose or an explicit level, logging stays off
    if !cli.verbose && cli.log_level.is_none() {
        return LoggingConfig {
            level: "off".to_string(),
            ..LoggingConfig::default()
        };
    }

    let root = Repository::discover(&cli.repo).ok();
    let repo_dir = root.as_deref().unwrap_or(&cli.repo).join(REPO_DIR_NAME);
    let loaded = match (&cli.config, &root) {
        (Some(path), _) => TwigConfig::load_with_override(&repo_dir, path).ok(),
        (None, Some(_)) => TwigConfig::load(&repo_dir).ok(),
        (None, None) => None,
    };
    let mut config = loaded.map(|c| c.logging).unwrap_or_default();

    if cli.verbose && cli.log_level.is_none() && config.level == "warn" {
        config.level = "info".to_string();
    }
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.clone();
    }
    if let Some(ref file) = cli.log_file {
        config.file = file.clone();
    } else if let Some(root) = root.as_deref().filter(|_| config.file.is_relative()) {
        config.file = root.join(&config.file);
    }

    config
}
