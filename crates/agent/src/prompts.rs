//! Prompt construction for the language-model collaborators.

use sahayak_core::action::Action;
use sahayak_core::schema::SchemaDescriptor;
use sahayak_core::turn::{RawResult, Turn};

/// Longest slice of a previous answer carried into a classification prompt.
const CONTEXT_ANSWER_CHARS: usize = 200;

pub const CLASSIFIER_SYSTEM: &str = "You route questions from foundry operators to exactly one tool. \
Reply with a single JSON object and nothing else: {\"tool\": \"<tool name>\", \"input\": \"<text for the tool>\"}. \
Use the conversation so far to resolve follow-up questions.";

pub const SQL_SYSTEM: &str = "You write PostgreSQL for a foundry production database. \
Answer with exactly one read-only SELECT statement and nothing else: no explanation, no markdown. \
Use only the tables and columns listed. Never modify data.";

pub const SUMMARY_SYSTEM: &str = "You are Sahayak, an assistant for foundry operators. \
Answer the operator's question using only the data provided. Be concise and professional. \
Quote numbers with their units. If a price is marked as a reference value from a related equity, \
say so plainly. Never show SQL.";

/// The user message for intent classification.
pub fn classification_prompt(query: &str, catalog: &[Action], recent: &[Turn]) -> String {
    let mut prompt = String::from("Tools:\n");
    for action in catalog {
        prompt.push_str(&format!("- {}: {}\n", action.name(), action.description()));
    }

    if !recent.is_empty() {
        prompt.push_str("\nRecent conversation (oldest first):\n");
        for turn in recent {
            prompt.push_str(&format!(
                "- operator: {}\n  tool: {} ({})\n  answer: {}\n",
                turn.query,
                turn.chosen_action.name(),
                turn.action_argument,
                truncate(&turn.final_response, CONTEXT_ANSWER_CHARS),
            ));
        }
    }

    prompt.push_str(&format!("\nQuestion: {query}\nJSON:"));
    prompt
}

/// The user message for SQL generation.
pub fn sql_prompt(input: &str, schema: &SchemaDescriptor) -> String {
    format!(
        "Schema:\n{}\nQuestion: {input}\nSQL:",
        schema.render_for_prompt()
    )
}

/// The user message for summarization.
pub fn summary_prompt(query: &str, action: Action, argument: &str, raw: &RawResult) -> String {
    format!(
        "Question: {query}\nTool used: {} ({argument})\nData:\n{}\n\nAnswer:",
        action.name(),
        raw.render()
    )
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn classification_prompt_lists_catalog_and_context() {
        let recent = vec![Turn {
            query: "show recent heats".into(),
            chosen_action: Action::DatabaseQuery,
            action_argument: "show recent heats".into(),
            raw_result: None,
            final_response: "x".repeat(500),
            timestamp: Utc::now(),
        }];
        let prompt =
            classification_prompt("show me the last 5 records", &Action::DISPATCHABLE, &recent);

        for action in Action::DISPATCHABLE {
            assert!(prompt.contains(action.name()));
        }
        assert!(!prompt.contains("conversational"));
        assert!(prompt.contains("show recent heats"));
        assert!(prompt.contains('…'));
        assert!(prompt.ends_with("Question: show me the last 5 records\nJSON:"));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("°C°C°C", 2), "°C…");
        assert_eq!(truncate("short", 10), "short");
    }

    #[test]
    fn summary_prompt_includes_rendered_data() {
        let prompt = summary_prompt(
            "how many heats",
            Action::DatabaseQuery,
            "how many heats",
            &RawResult::text("42"),
        );
        assert!(prompt.contains("database_query"));
        assert!(prompt.contains("42"));
    }
}
