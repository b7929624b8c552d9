mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<ExitCode> {
    // Logs go to stderr; stdout carries command output such as the hook payload
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Capture {
            session_id,
            project,
        } => commands::capture::run(session_id.as_deref(), project.as_deref()),
        Commands::Inject { project } => commands::inject::run(project.as_deref()),
        Commands::Prune { max_age } => commands::prune::run(max_age),
        Commands::Learn { project } => commands::learn::run(project.as_deref()),
        Commands::Daemon { interval } => commands::daemon::run(interval),
        Commands::Status => commands::status::run(),
    }
}
