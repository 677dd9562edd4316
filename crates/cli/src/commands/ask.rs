//! `sahayak ask`: One question, or interactive mode.

use sahayak_agent::build_orchestrator;
use sahayak_core::turn::SessionId;
use std::io::Write;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

pub async fn run(
    config_path: Option<&Path>,
    question: Option<String>,
    session: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let orchestrator = build_orchestrator(&config);
    let session = session
        .as_deref()
        .map(SessionId::from)
        .unwrap_or_default();
    debug!(session_id = %session, interactive = question.is_none(), "Starting session");

    if let Some(question) = question {
        // Single question mode
        eprint!("  Thinking...");
        let answer = orchestrator.ask(&session, &question).await;
        eprint!("\r              \r");
        println!("{answer}");
        return Ok(());
    }

    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║       Sahayak — Foundry Assistant            ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Provider:  {}", config.default_provider);
    println!("  Model:     {}", config.default_model);
    println!("  Session:   {session}");
    println!(
        "  Database:  {}",
        if config.database.url.is_some() { "configured" } else { "not configured" }
    );
    println!();
    println!("  Ask about prices, news, procedures or production data.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print!("  You > ");
    std::io::stdout().flush()?;

    while let Some(line) = lines.next_line().await? {
        let query = line.trim();
        if matches!(query, "exit" | "quit") {
            break;
        }
        if !query.is_empty() {
            eprint!("  ...");
            let answer = orchestrator.ask(&session, query).await;
            eprint!("\r     \r");
            println!();
            for line in answer.lines() {
                println!("  Sahayak > {line}");
            }
            println!();
        }

        print!("  You > ");
        std::io::stdout().flush()?;
    }

    orchestrator.close_session(&session).await;
    println!();
    println!("  Goodbye! Stay safe on the shop floor.");
    println!();

    Ok(())
}
