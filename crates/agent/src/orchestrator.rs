//! Turn orchestrator: the `ask` entry point.
//!
//! One turn runs strictly in order: route, dispatch, summarize, record.
//! Any failure is absorbed into a polite reply that is still recorded, so
//! `ask` always returns text.

use sahayak_core::action::{Action, ActionCandidate};
use sahayak_core::collaborator::Summarizer;
use sahayak_core::error::{Capability, CollaboratorError};
use sahayak_core::event::{DomainEvent, EventBus};
use sahayak_core::turn::{RawResult, SessionId, Turn};
use sahayak_memory::SessionStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::dispatcher::ActionDispatcher;
use crate::router::IntentRouter;

const NO_DATA: &str = "No data found for that question.";

const SUMMARY_NOTICE: &str = "(Summary unavailable, showing the raw result.)";

/// What happened during one turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub candidate: ActionCandidate,
    pub response: String,
    pub raw_result: Option<RawResult>,
    /// False when the turn ended in the error state.
    pub succeeded: bool,
    /// False when the session was closed while the turn was in flight.
    pub recorded: bool,
}

pub struct TurnOrchestrator {
    router: IntentRouter,
    dispatcher: ActionDispatcher,
    summarizer: Option<Arc<dyn Summarizer>>,
    summarize_timeout: Duration,
    sessions: Arc<SessionStore>,
    events: Arc<EventBus>,
}

impl TurnOrchestrator {
    pub fn new(router: IntentRouter, dispatcher: ActionDispatcher) -> Self {
        Self {
            router,
            dispatcher,
            summarizer: None,
            summarize_timeout: Duration::from_secs(20),
            sessions: Arc::new(SessionStore::default()),
            events: Arc::new(EventBus::default()),
        }
    }

    pub fn with_summarizer(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    pub fn with_summarize_timeout(mut self, timeout: Duration) -> Self {
        self.summarize_timeout = timeout;
        self
    }

    pub fn with_sessions(mut self, sessions: Arc<SessionStore>) -> Self {
        self.sessions = sessions;
        self
    }

    pub fn with_event_bus(mut self, events: Arc<EventBus>) -> Self {
        self.events = events;
        self
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    pub fn dispatcher(&self) -> &ActionDispatcher {
        &self.dispatcher
    }

    /// Answer one operator query. Never fails.
    pub async fn ask(&self, session_id: &SessionId, query: &str) -> String {
        self.run_turn(session_id, query).await.response
    }

    /// [`ask`](Self::ask), returning the full outcome of the turn.
    pub async fn run_turn(&self, session_id: &SessionId, query: &str) -> TurnOutcome {
        let timestamp = chrono::Utc::now();
        let slot = self.sessions.open(session_id).await;
        let mut memory = slot.lock().await;

        let candidate = self.router.route(query, &memory).await;
        info!(
            session_id = %session_id,
            action = %candidate.action,
            source = ?candidate.source,
            fallback = ?candidate.fallback,
            "Turn routed"
        );
        self.events.publish(DomainEvent::TurnRouted {
            session_id: session_id.to_string(),
            action: candidate.action,
            source: candidate.source,
            fallback: candidate.fallback,
            timestamp,
        });

        let (response, raw_result, succeeded) = match self.dispatcher.dispatch(&candidate).await {
            Ok(raw) => {
                let response = self.respond(query, &candidate, &raw).await;
                (response, Some(raw), true)
            }
            Err(e) => {
                debug!(kind = ?e.kind, "Turn ended with dispatch error");
                (e.user_message, None, false)
            }
        };

        let recorded = if slot.is_closed() {
            info!(session_id = %session_id, "Session closed mid-turn, discarding result");
            false
        } else {
            memory.record(Turn {
                query: query.to_string(),
                chosen_action: candidate.action,
                action_argument: candidate.argument.clone(),
                raw_result: raw_result.clone(),
                final_response: response.clone(),
                timestamp,
            });
            true
        };
        drop(memory);

        self.events.publish(DomainEvent::TurnCompleted {
            session_id: session_id.to_string(),
            action: candidate.action,
            succeeded,
            recorded,
            timestamp: chrono::Utc::now(),
        });

        TurnOutcome {
            candidate,
            response,
            raw_result,
            succeeded,
            recorded,
        }
    }

    /// Turn a raw result into the operator-facing text.
    async fn respond(&self, query: &str, candidate: &ActionCandidate, raw: &RawResult) -> String {
        if candidate.action == Action::Conversational {
            return raw.render();
        }
        if raw.is_empty() {
            return NO_DATA.to_string();
        }

        let Some(summarizer) = &self.summarizer else {
            return raw.render();
        };

        let outcome = tokio::time::timeout(
            self.summarize_timeout,
            summarizer.summarize(query, candidate.action, &candidate.argument, raw),
        )
        .await
        .unwrap_or_else(|_| {
            Err(CollaboratorError::Timeout {
                capability: Capability::Summarization,
                timeout_secs: self.summarize_timeout.as_secs(),
            })
        });

        match outcome {
            Ok(answer) => answer,
            Err(e) => {
                warn!(error = %e, "Summarization failed, returning raw result");
                self.events.publish(DomainEvent::CollaboratorFailed {
                    capability: e.capability(),
                    error_message: e.to_string(),
                    timestamp: chrono::Utc::now(),
                });
                format!("{}\n\n{SUMMARY_NOTICE}", raw.render())
            }
        }
    }

    /// Drop a session. An in-flight turn for it will not be recorded.
    pub async fn close_session(&self, session_id: &SessionId) -> bool {
        self.sessions.close(session_id).await
    }

    /// The session's remembered turns, oldest first.
    pub async fn history(&self, session_id: &SessionId) -> Vec<Turn> {
        self.sessions.snapshot(session_id).await.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{
        ClassifierScript, MockClassifier, MockExecutor, MockMarket, MockNews, MockProcedures,
        MockSummarizer, quote,
    };
    use sahayak_core::action::{CandidateSource, FallbackReason};
    use sahayak_sql::SqlEngine;

    struct Harness {
        orchestrator: TurnOrchestrator,
        classifier: Arc<MockClassifier>,
        summarizer: Arc<MockSummarizer>,
        executor: Arc<MockExecutor>,
        market: Arc<MockMarket>,
    }

    fn harness(script: ClassifierScript, summarizer: MockSummarizer, executor: MockExecutor) -> Harness {
        let classifier = Arc::new(MockClassifier::new(script));
        let summarizer = Arc::new(summarizer);
        let executor = Arc::new(executor);
        let market = Arc::new(MockMarket::ok(quote("copper", "HG=F", 4.51)));

        let dispatcher = ActionDispatcher::new(
            Arc::new(SqlEngine::foundry()),
            market.clone(),
            Arc::new(MockNews::with_titles(&["Scrap steel prices firm"])),
            Arc::new(MockProcedures::empty()),
        )
        .with_executor(executor.clone());

        let orchestrator = TurnOrchestrator::new(
            IntentRouter::new().with_classifier(classifier.clone()),
            dispatcher,
        )
        .with_summarizer(summarizer.clone());

        Harness {
            orchestrator,
            classifier,
            summarizer,
            executor,
            market,
        }
    }

    fn default_harness() -> Harness {
        harness(
            ClassifierScript::Reply("database_query", "average tap temperature"),
            MockSummarizer::echo(),
            MockExecutor::returning(&["round"], vec![vec![serde_json::json!(1548.25)]]),
        )
    }

    #[tokio::test]
    async fn market_question_is_summarized_and_remembered() {
        let h = default_harness();
        let session = SessionId::from("op-1");

        let answer = h.orchestrator.ask(&session, "Copper price today").await;

        assert!(answer.starts_with("[market_data]"));
        assert_eq!(h.classifier.calls(), 0);
        assert_eq!(h.market.calls(), 1);

        let history = h.orchestrator.history(&session).await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].chosen_action, Action::MarketData);
        assert_eq!(history[0].action_argument, "copper");
        assert_eq!(history[0].final_response, answer);
    }

    #[tokio::test]
    async fn ambiguous_question_runs_template_sql() {
        let h = default_harness();
        let outcome = h
            .orchestrator
            .run_turn(&SessionId::from("op-1"), "What is the average tap temperature?")
            .await;

        assert_eq!(outcome.candidate.source, CandidateSource::LanguageModel);
        assert!(outcome.succeeded);
        assert_eq!(
            h.executor.statements(),
            vec![
                "SELECT ROUND(AVG(tap_temperature_c)::numeric,2) FROM melting_heat_records LIMIT 50"
                    .to_string()
            ]
        );
        assert!(outcome.response.contains("1548.25"));
    }

    #[tokio::test]
    async fn greeting_skips_summarizer() {
        let h = default_harness();
        let answer = h.orchestrator.ask(&SessionId::from("op-1"), "hello").await;
        assert!(answer.contains("foundry assistant"));
        assert_eq!(h.summarizer.calls(), 0);
    }

    #[tokio::test]
    async fn empty_rows_mean_no_data_found() {
        let h = harness(
            ClassifierScript::Reply("database_query", "average tap temperature"),
            MockSummarizer::echo(),
            MockExecutor::empty(),
        );
        let answer = h
            .orchestrator
            .ask(&SessionId::from("op-1"), "What is the average tap temperature?")
            .await;
        assert_eq!(answer, NO_DATA);
        assert_eq!(h.summarizer.calls(), 0);
    }

    #[tokio::test]
    async fn summarizer_failure_degrades_to_raw_result() {
        let h = harness(
            ClassifierScript::Reply("database_query", "x"),
            MockSummarizer::failing(),
            MockExecutor::empty(),
        );
        let answer = h.orchestrator.ask(&SessionId::from("op-1"), "Copper price today").await;

        assert!(answer.contains("HG=F"));
        assert!(answer.contains(SUMMARY_NOTICE));
        assert!(!answer.contains("groq"));
    }

    #[tokio::test(start_paused = true)]
    async fn classifier_timeout_still_answers_and_records() {
        let h = harness(
            ClassifierScript::Stall,
            MockSummarizer::echo(),
            MockExecutor::returning(&["round"], vec![vec![serde_json::json!(1550.0)]]),
        );
        let session = SessionId::from("op-1");
        let outcome = h
            .orchestrator
            .run_turn(&session, "What is the average tap temperature?")
            .await;

        assert_eq!(outcome.candidate.fallback, Some(FallbackReason::ClassifierTimeout));
        assert_eq!(outcome.candidate.argument, "What is the average tap temperature?");
        assert!(outcome.succeeded);
        assert!(outcome.recorded);
    }

    #[tokio::test]
    async fn failed_turn_is_remembered_with_fallback_text() {
        let h = harness(
            ClassifierScript::Reply("database_query", "why did line 3 stop"),
            MockSummarizer::echo(),
            MockExecutor::empty(),
        );
        let session = SessionId::from("op-1");
        let outcome = h.orchestrator.run_turn(&session, "why did line 3 stop").await;

        assert!(!outcome.succeeded);
        assert!(outcome.response.contains("temporarily unavailable"));

        let history = h.orchestrator.history(&session).await;
        assert_eq!(history.len(), 1);
        assert!(history[0].raw_result.is_none());
        assert_eq!(history[0].final_response, outcome.response);
    }

    #[tokio::test]
    async fn follow_up_uses_session_memory() {
        let h = default_harness();
        let session = SessionId::from("op-1");

        h.orchestrator.ask(&session, "Copper price today").await;
        let outcome = h.orchestrator.run_turn(&session, "what about gold").await;

        assert_eq!(outcome.candidate.action, Action::MarketData);
        assert_eq!(outcome.candidate.argument, "gold");
        assert_eq!(h.classifier.calls(), 0);
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let h = default_harness();
        let a = SessionId::from("op-a");
        let b = SessionId::from("op-b");

        h.orchestrator.ask(&a, "Copper price today").await;
        let outcome = h.orchestrator.run_turn(&b, "what about gold").await;

        assert_ne!(outcome.candidate.source, CandidateSource::Heuristic);
        assert!(h.orchestrator.history(&b).await.len() == 1);
        assert!(h.orchestrator.history(&a).await.len() == 1);
    }

    #[tokio::test]
    async fn memory_keeps_only_most_recent_turns() {
        let h = default_harness();
        let session = SessionId::from("op-1");
        for i in 0..7 {
            h.orchestrator.ask(&session, &format!("copper price {i}")).await;
        }
        let history = h.orchestrator.history(&session).await;
        assert_eq!(history.len(), 5);
        assert_eq!(history[0].query, "copper price 2");
        assert_eq!(history[4].query, "copper price 6");
    }

    #[tokio::test]
    async fn closed_session_discards_in_flight_result() {
        let h = default_harness();
        let session = SessionId::from("op-1");
        let slot = h.orchestrator.sessions().open(&session).await;

        // Hold the slot so the turn waits, then close before releasing it.
        let guard = slot.lock().await;
        let orchestrator = Arc::new(h.orchestrator);
        let turn = {
            let orchestrator = orchestrator.clone();
            let session = session.clone();
            tokio::spawn(async move { orchestrator.run_turn(&session, "Copper price today").await })
        };
        tokio::task::yield_now().await;
        assert!(orchestrator.close_session(&session).await);
        drop(guard);

        let outcome = turn.await.unwrap();
        assert!(!outcome.recorded);
        assert!(orchestrator.history(&session).await.is_empty());
    }

    #[tokio::test]
    async fn completion_event_is_published() {
        let h = default_harness();
        let mut rx = h.orchestrator.events().subscribe();
        h.orchestrator.ask(&SessionId::from("op-1"), "hello").await;

        let routed = rx.recv().await.unwrap();
        assert!(matches!(&*routed, DomainEvent::TurnRouted { action: Action::Conversational, .. }));
        let completed = rx.recv().await.unwrap();
        assert!(matches!(
            &*completed,
            DomainEvent::TurnCompleted {
                succeeded: true,
                recorded: true,
                ..
            }
        ));
    }
}
