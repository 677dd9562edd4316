//! The turn pipeline of Sahayak.
//!
//! A query moves through four stages, strictly in order:
//!
//! 1. **Route**: the [`HeuristicClassifier`] tries its ordered keyword
//!    rules; on no match the [`IntentRouter`] asks the language model once
//!    and falls back to a database question if that fails
//! 2. **Dispatch**: the [`ActionDispatcher`] calls the one collaborator the
//!    action needs (SQL always passes the guardrail first)
//! 3. **Summarize**: the raw result becomes an operator-facing answer
//! 4. **Remember**: the turn is recorded in the session's memory
//!
//! [`TurnOrchestrator::ask`] runs all four and never fails.

pub mod builder;
pub mod dispatcher;
pub mod heuristic;
pub mod llm;
pub mod orchestrator;
pub mod prompts;
pub mod router;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use builder::{ModelHandle, build_orchestrator, build_sql_engine, language_model};
pub use dispatcher::{ActionDispatcher, DispatchTimeouts, conversational_reply};
pub use heuristic::{HeuristicClassifier, HeuristicMatch, RULES, Rule};
pub use llm::{LlmIntentClassifier, LlmSqlGenerator, LlmSummarizer};
pub use orchestrator::{TurnOrchestrator, TurnOutcome};
pub use router::IntentRouter;
