//! `sahayak sql`, `sahayak check-sql` and `sahayak schema`: inspect the
//! SQL guardrail without touching the database.

use sahayak_agent::{build_sql_engine, language_model};
use sahayak_core::sql::{GuardrailVerdict, SqlCandidate, SqlOrigin};
use sahayak_sql::SqlEngine;
use std::path::Path;

pub async fn run(
    config_path: Option<&Path>,
    question: &str,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let model = language_model(&config);
    let engine = build_sql_engine(&config, model.as_ref());

    let plan = engine
        .build_query(question)
        .await
        .map_err(|e| format!("Could not produce SQL: {e}"))?;

    if json {
        let value = serde_json::json!({
            "candidate": plan.candidate,
            "verdict": plan.verdict,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let origin = match plan.candidate.origin {
        SqlOrigin::Template => format!(
            "template ({})",
            plan.candidate.template_id.as_deref().unwrap_or("-")
        ),
        SqlOrigin::Generated => "generated".to_string(),
    };
    println!("  Origin:     {origin}");
    println!("  Candidate:  {}", plan.candidate.statement_text);
    if !plan.candidate.parameters.is_empty() {
        println!("  Parameters: {:?}", plan.candidate.parameters);
    }
    print_verdict(&plan.verdict);
    Ok(())
}

pub fn check(config_path: Option<&Path>, statement: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let engine = SqlEngine::foundry().with_row_limit(config.database.row_limit);
    let verdict = engine.validate(&SqlCandidate::generated(statement));
    print_verdict(&verdict);
    match verdict.rejection_reason {
        Some(reason) => Err(format!("statement rejected: {reason}").into()),
        None => Ok(()),
    }
}

pub fn schema() {
    print!("{}", SqlEngine::foundry().schema().render_for_prompt());
}

fn print_verdict(verdict: &GuardrailVerdict) {
    match (&verdict.normalized_statement, verdict.rejection_reason) {
        (Some(statement), _) if verdict.accepted => {
            println!("  ✅ Accepted");
            println!("  Execute:    {statement}");
        }
        (_, Some(reason)) => println!("  ❌ Rejected: {reason}"),
        _ => println!("  ❌ Rejected"),
    }
}
