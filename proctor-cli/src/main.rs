//! `proctor` - terminal session presenter for the mock-interview service.

#![warn(clippy::all)]

use anyhow::Result;
use clap::{Parser, Subcommand};

mod client;
mod roles;
mod session;
mod view;

use client::ProctorClient;

#[derive(Parser, Debug)]
#[command(name = "proctor")]
#[command(version)]
#[command(about = "Practice job interviews against an AI interviewer.", long_about = None)]
struct Cli {
    /// Proctor API endpoint (or set PROCTOR_API_URL)
    #[arg(long)]
    server: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start a new mock interview session
    Start {
        /// Role to interview for (prompts with the catalogue when omitted)
        #[arg(long)]
        role: Option<String>,
    },

    /// List completed interviews, newest first
    History {
        /// Maximum number of interviews to show
        #[arg(long, default_value = "20")]
        limit: u32,
    },
}

fn endpoint(cli: &Cli) -> String {
    cli.server
        .clone()
        .or_else(|| std::env::var("PROCTOR_API_URL").ok())
        .unwrap_or_else(|| client::DEFAULT_ENDPOINT.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level =
        std::env::var("PROCTOR_LOG_LEVEL").unwrap_or_else(|_| "warn".to_string());
    proctor_common::logging::init_logging(&log_level, "pretty");

    let client = ProctorClient::new(&endpoint(&cli))?;

    match cli.command {
        Commands::Start { role } => {
            let role = roles::choose_role(role)?;
            session::run_interview(&client, role).await
        }
        Commands::History { limit } => session::run_history(&client, limit).await,
    }
}
