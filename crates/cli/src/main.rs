//! Sahayak CLI: the main entry point.
//!
//! Commands:
//! - `ask`: One question, or interactive mode
//! - `sql`: Show the plan for a database question without running it
//! - `check-sql`: Run a statement through the guardrail
//! - `schema`: Print the table catalog
//! - `doctor`: Diagnose configuration and collaborators
//! - `onboard`: Write a default config file

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "sahayak",
    about = "Sahayak: foundry operator assistant",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: ~/.sahayak/config.toml)
    #[arg(short, long, global = true, env = "SAHAYAK_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Onboard,

    /// Ask a question, or start interactive mode without one
    Ask {
        /// The question to answer
        question: Option<String>,

        /// Session to keep conversation memory under
        #[arg(short, long)]
        session: Option<String>,
    },

    /// Show template/generated SQL and the guardrail verdict, without executing
    Sql {
        /// A production-data question
        question: String,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a SQL statement against the guardrail
    CheckSql {
        /// The statement to check
        statement: String,
    },

    /// Print the tables and columns the assistant can query
    Schema,

    /// Diagnose configuration and collaborator health
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Onboard => commands::onboard::run(config_path).await?,
        Commands::Ask { question, session } => {
            commands::ask::run(config_path, question, session).await?
        }
        Commands::Sql { question, json } => commands::sql::run(config_path, &question, json).await?,
        Commands::CheckSql { statement } => commands::sql::check(config_path, &statement)?,
        Commands::Schema => commands::sql::schema(),
        Commands::Doctor => commands::doctor::run(config_path).await?,
    }

    Ok(())
}
