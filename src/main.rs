use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use diagmerge::cli::{self, Cli};
use diagmerge::config;
use diagmerge::engine::{Engine, Status};

const EXIT_WARNINGS: u8 = 1;
const EXIT_FATAL: u8 = 2;

fn main() -> ExitCode {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging; stderr keeps warnings apart from stdout summaries
    let filter = if cli.verbose {
        EnvFilter::new("diagmerge=debug")
    } else if cli.quiet {
        EnvFilter::new("diagmerge=error")
    } else {
        EnvFilter::new("diagmerge=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    info!("diagmerge v{}", env!("CARGO_PKG_VERSION"));

    match run(&cli) {
        Ok(Status::Clean) => ExitCode::SUCCESS,
        Ok(Status::Warnings) => ExitCode::from(EXIT_WARNINGS),
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(EXIT_FATAL)
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<Status> {
    match &cli.command {
        cli::Commands::Merge(args) => Engine::new(cli)?.merge(args),
        cli::Commands::Report(args) => Engine::new(cli)?.report(args),
        cli::Commands::Run(args) => Engine::new(cli)?.run(args),
        cli::Commands::Summary(args) => Engine::new(cli)?.summary(args),
        cli::Commands::Init => {
            config::init_config(&std::env::current_dir()?)?;
            Ok(Status::Clean)
        }
    }
}
