//! Pitwall CLI — the main entry point.
//!
//! Commands:
//! - `init`      — Write the default config file
//! - `serve`     — Start the HTTP gateway
//! - `analyze`   — Summarize a telemetry CSV
//! - `simulate`  — Run a stint-plan simulation
//! - `chat`      — Talk to the assistant within a session

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "pitwall",
    about = "Pitwall — race-team assistant for telemetry and strategy",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default configuration file
    Init,

    /// Start the HTTP gateway
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Summarize a lap telemetry CSV
    Analyze(commands::analyze::AnalyzeArgs),

    /// Simulate a race with a stint plan
    Simulate(commands::simulate::SimulateArgs),

    /// Chat with the assistant in a session
    Chat {
        /// Session id (a new one is generated when omitted)
        #[arg(short, long)]
        session: Option<String>,

        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init => commands::init::run().await?,
        Commands::Serve { port } => commands::serve::run(port).await?,
        Commands::Analyze(args) => commands::analyze::run(args).await?,
        Commands::Simulate(args) => commands::simulate::run(args).await?,
        Commands::Chat { session, message } => commands::chat::run(session, message).await?,
    }

    Ok(())
}
