//! `fleetwash` command-line tool.
//!
//! Costs exported scan batches and projects or solves operating scenarios.
//! Results go to stdout; logs go to stderr.

mod commands;

use anyhow::Context;
use clap::{Parser, Subcommand};
use commands::{CostArgs, OutputFormat, ScenarioArgs};
use fleetwash_core::EngineConfig;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "fleetwash")]
#[command(about = "Fleet-wash chemical cost reporting")]
#[command(version)]
struct Cli {
    /// Engine configuration file (defaults to $FLEETWASH_CONFIG_PATH or fleetwash.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Cost a batch of scans and print grouped totals
    Cost(CostArgs),

    /// Project monthly and annual cost for one parameter set
    Project {
        #[command(flatten)]
        scenario: ScenarioArgs,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Find three parameter sets that fit a monthly budget
    Solve {
        /// Monthly budget for the whole site
        #[arg(long)]
        budget: f64,

        #[command(flatten)]
        scenario: ScenarioArgs,

        /// Previously saved proposal (JSON) used to seed the combined option
        #[arg(long)]
        proposal: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

fn init_tracing(json: bool, verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("fleetwash_core={default_level},fleetwash_cli={default_level},warn"))
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<EngineConfig> {
    let config = match path {
        Some(path) => EngineConfig::load_from(&path.to_string_lossy()),
        None => EngineConfig::load(),
    };
    config.context("failed to load engine configuration")
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs, cli.verbose);
    debug!(command = ?cli.command, "Starting fleetwash");

    let config = load_config(cli.config.as_ref())?;
    let mut stdout = std::io::stdout().lock();

    match cli.command {
        Command::Cost(args) => commands::cost(&config, &args, &mut stdout),
        Command::Project { scenario, format } => commands::project(&scenario, format, &mut stdout),
        Command::Solve { budget, scenario, proposal, format } => {
            commands::solve(budget, &scenario, proposal.as_deref(), format, &mut stdout)
        }
    }
}
