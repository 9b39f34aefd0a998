// ABOUTME: Entry point for the anevazo CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

use anevazo::cli::{Cli, Commands};
use anevazo::commands;
use anevazo::config::Settings;
use anevazo::error::Result;
use anevazo::output::{Output, OutputMode};
use clap::Parser;
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };
    let output = Output::new(mode);

    if let Err(e) = run(cli, output.clone()).await {
        output.error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, output: Output) -> Result<()> {
    let cwd = env::current_dir()?;
    let settings = Settings::discover(&cwd)?;

    match cli.command {
        Commands::Install(args) => commands::install(&settings, args, output).await,
        Commands::Uninstall => commands::uninstall(&settings, output).await,
        Commands::Push(args) => commands::push(&settings, args, output).await,
        Commands::Env { command } => commands::env(&settings, command, output).await,
    }
}
