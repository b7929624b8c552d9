use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "michi-context")]
#[command(version)]
#[command(about = "Session memory for Claude Code")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Capture Claude Code sessions
    Capture {
        /// Capture only sessions whose id contains this value
        #[arg(long)]
        session_id: Option<String>,

        /// Project path (default: cwd)
        #[arg(long)]
        project: Option<PathBuf>,
    },

    /// Output context JSON for the Claude Code session hook
    Inject {
        /// Project path (default: cwd)
        #[arg(long)]
        project: Option<PathBuf>,
    },

    /// Remove old session summaries
    Prune {
        /// Max age in days (default: 30)
        #[arg(long)]
        max_age: Option<u32>,
    },

    /// Extract learnings from captured sessions
    Learn {
        /// Project path (default: cwd)
        #[arg(long)]
        project: Option<PathBuf>,
    },

    /// Run the background capture/learn/prune loop
    Daemon {
        /// Seconds between runs (default: 1800)
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Show store statistics
    Status,
}
