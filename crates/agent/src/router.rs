//! Intent router: heuristic fast path, then one language-model attempt.
//!
//! Routing never fails: anything the router cannot decide becomes a
//! database question over the verbatim query.

use sahayak_core::action::{Action, ActionCandidate, FallbackReason};
use sahayak_core::collaborator::IntentClassifier;
use sahayak_core::error::CollaboratorError;
use sahayak_core::turn::Turn;
use sahayak_memory::SessionMemory;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::heuristic::HeuristicClassifier;

pub struct IntentRouter {
    heuristic: HeuristicClassifier,
    classifier: Option<Arc<dyn IntentClassifier>>,
    classify_timeout: Duration,
    context_turns: usize,
}

impl Default for IntentRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentRouter {
    /// Heuristic-only router; undecided queries fall back immediately.
    pub fn new() -> Self {
        Self {
            heuristic: HeuristicClassifier::new(),
            classifier: None,
            classify_timeout: Duration::from_secs(8),
            context_turns: 3,
        }
    }

    pub fn with_heuristic(mut self, heuristic: HeuristicClassifier) -> Self {
        self.heuristic = heuristic;
        self
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn IntentClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.classify_timeout = timeout;
        self
    }

    /// How many recent turns accompany a classification request.
    pub fn with_context_turns(mut self, turns: usize) -> Self {
        self.context_turns = turns;
        self
    }

    /// Pick one action for `query` given the session's memory.
    pub async fn route(&self, query: &str, memory: &SessionMemory) -> ActionCandidate {
        let k = self.context_turns.min(memory.capacity());
        self.route_with_context(query, &memory.recent(k)).await
    }

    /// [`route`](Self::route) over an explicit slice of recent turns.
    pub async fn route_with_context(&self, query: &str, recent: &[Turn]) -> ActionCandidate {
        if let Some(hit) = self.heuristic.classify(query, recent) {
            debug!(rule = hit.rule, action = %hit.candidate.action, "Heuristic match");
            return hit.candidate;
        }

        let Some(classifier) = &self.classifier else {
            return fallback(query, FallbackReason::ClassifierUnavailable);
        };

        let outcome = tokio::time::timeout(
            self.classify_timeout,
            classifier.classify(query, &Action::DISPATCHABLE, recent),
        )
        .await;

        let intent = match outcome {
            Err(_) => {
                warn!(timeout_secs = self.classify_timeout.as_secs(), "Intent classification timed out");
                return fallback(query, FallbackReason::ClassifierTimeout);
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Intent classification failed");
                let reason = match e {
                    CollaboratorError::Timeout { .. } => FallbackReason::ClassifierTimeout,
                    CollaboratorError::Malformed { .. } => FallbackReason::MalformedResponse,
                    CollaboratorError::Unavailable { .. }
                    | CollaboratorError::NotConfigured { .. } => {
                        FallbackReason::ClassifierUnavailable
                    }
                };
                return fallback(query, reason);
            }
            Ok(Ok(intent)) => intent,
        };

        let Some(action) = Action::from_tool_name(&intent.tool) else {
            warn!(tool = %intent.tool, "Classifier picked an unknown tool");
            return fallback(query, FallbackReason::UnknownTool);
        };

        let input = intent.input.trim();
        if input.is_empty() {
            return fallback(query, FallbackReason::EmptyInput);
        }

        info!(action = %action, "Routed by language model");
        ActionCandidate::language_model(action, input)
    }
}

fn fallback(query: &str, reason: FallbackReason) -> ActionCandidate {
    info!(%reason, "Falling back to database query");
    ActionCandidate::database_fallback(query, reason)
}
