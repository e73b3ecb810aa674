//! Doclerk CLI - Main entry point

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod outline;
mod plan;

#[derive(Parser)]
#[command(name = "doclerk")]
#[command(version)]
#[command(about = "Generates documents from structured sources and an execution plan", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every execution of a plan file
    Run {
        /// Working directory stages resolve their files against
        #[arg(short = 'w', long, default_value = ".")]
        work_dir: PathBuf,

        /// Execution plan file
        #[arg(short = 'f', long, default_value = "doclerk.yaml")]
        input_file: PathBuf,

        /// Exit with status 0 even when executions fail
        #[arg(short = 'F', long)]
        no_fail: bool,
    },

    /// List the available stages
    Stages,
}

fn main() -> Result<ExitCode> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "doclerk=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            work_dir,
            input_file,
            no_fail,
        } => {
            let failures = commands::run::execute(&commands::run::RunArgs {
                work_dir,
                input_file,
            })?;
            if no_fail && failures > 0 {
                warn!(failures, "Ignoring failed executions");
                return Ok(ExitCode::SUCCESS);
            }
            Ok(ExitCode::from(u8::try_from(failures).unwrap_or(u8::MAX)))
        }
        Commands::Stages => {
            commands::stages::execute();
            Ok(ExitCode::SUCCESS)
        }
    }
}
