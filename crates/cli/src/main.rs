//! Docent CLI — the main entry point.
//!
//! Commands:
//! - `onboard`   — Initialize config & upload directory
//! - `serve`     — Start the HTTP API server
//! - `extract`   — Print a file's line-addressable text
//! - `summarize` — Summarize a local file
//! - `ask`       — Ask a question about a local file
//! - `challenge` — Generate (and optionally take) a comprehension quiz
//! - `status`    — Show configuration status
//! - `doctor`    — Diagnose setup problems

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "docent",
    about = "Docent — grounded document summaries, Q&A and quizzes",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration and the upload directory
    Onboard,

    /// Start the HTTP API server
    Serve {
        /// Override the bind address
        #[arg(long)]
        host: Option<String>,

        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print the line-addressable text of a .pdf or .txt file
    Extract {
        file: PathBuf,

        /// Print a JSON object instead of the raw text
        #[arg(long)]
        json: bool,
    },

    /// Summarize a .pdf or .txt file
    Summarize {
        file: PathBuf,
    },

    /// Ask a question about a .pdf or .txt file
    Ask {
        file: PathBuf,

        /// The question to answer from the document
        question: String,
    },

    /// Generate three comprehension questions about a file
    Challenge {
        file: PathBuf,

        /// Answer the questions on stdin and have them graded
        #[arg(short, long)]
        quiz: bool,
    },

    /// Show configuration status
    Status,

    /// Diagnose setup problems
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so command output can be piped
    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    let logs = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    if cli.log_json {
        logs.json().init();
    } else {
        logs.init();
    }

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Serve { host, port } => commands::serve::run(host, port).await?,
        Commands::Extract { file, json } => commands::extract::run(&file, json).await?,
        Commands::Summarize { file } => commands::document::summarize(&file).await?,
        Commands::Ask { file, question } => commands::document::ask(&file, &question).await?,
        Commands::Challenge { file, quiz } => commands::document::challenge(&file, quiz).await?,
        Commands::Status => commands::status::run().await?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
