//! Action dispatcher: runs the chosen action against its collaborator.
//!
//! Every branch isolates its own failures: collaborator errors and
//! timeouts come back as [`DispatchError`]s whose `user_message` names the
//! capability, never the provider, and never contains SQL.

use sahayak_core::action::{Action, ActionCandidate};
use sahayak_core::collaborator::{MarketDataSource, NewsSource, ProcedureIndex, QueryExecutor};
use sahayak_core::error::{Capability, CollaboratorError, DispatchError};
use sahayak_core::event::{DomainEvent, EventBus};
use sahayak_core::keywords::Words;
use sahayak_core::sql::RejectionReason;
use sahayak_core::turn::{QuoteKind, RawResult};
use sahayak_sql::SqlEngine;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const WELCOME: &str = "Hello! I'm Sahayak, your foundry assistant. I can help you with:\n\
- Market prices: steel, copper, aluminium, gold, oil, currencies and stocks\n\
- Industry news: latest headlines and trends\n\
- SOPs and procedures: safety rules and maintenance guidelines\n\
- Production data: heats, castings, inspections, inventory, maintenance and orders\n\n\
Example: \"What is the average tap temperature?\"";

const THANKS: &str =
    "You're welcome! Ask me anything else about prices, news, procedures or production data.";

const GOODBYE: &str = "Goodbye! Stay safe on the shop floor.";

const EMPTY_QUERY: &str = "Please ask a question.";

/// Canned reply for a conversational turn.
pub fn conversational_reply(query: &str) -> &'static str {
    let words = Words::new(query);
    if words.is_empty() {
        EMPTY_QUERY
    } else if words.contains_any(&["thanks", "thank you"]) {
        THANKS
    } else if words.contains_any(&["bye"]) {
        GOODBYE
    } else {
        WELCOME
    }
}

/// Per-branch timeouts.
#[derive(Debug, Clone, Copy)]
pub struct DispatchTimeouts {
    pub market: Duration,
    pub news: Duration,
    pub procedures: Duration,
    pub database: Duration,
}

impl Default for DispatchTimeouts {
    fn default() -> Self {
        Self {
            market: Duration::from_secs(6),
            news: Duration::from_secs(6),
            procedures: Duration::from_secs(6),
            database: Duration::from_secs(12),
        }
    }
}

pub struct ActionDispatcher {
    sql: Arc<SqlEngine>,
    market: Arc<dyn MarketDataSource>,
    market_fallback: Option<Arc<dyn MarketDataSource>>,
    news: Arc<dyn NewsSource>,
    procedures: Arc<dyn ProcedureIndex>,
    executor: Option<Arc<dyn QueryExecutor>>,
    events: Arc<EventBus>,
    timeouts: DispatchTimeouts,
    news_limit: usize,
    top_k: usize,
}

impl ActionDispatcher {
    pub fn new(
        sql: Arc<SqlEngine>,
        market: Arc<dyn MarketDataSource>,
        news: Arc<dyn NewsSource>,
        procedures: Arc<dyn ProcedureIndex>,
    ) -> Self {
        Self {
            sql,
            market,
            market_fallback: None,
            news,
            procedures,
            executor: None,
            events: Arc::new(EventBus::default()),
            timeouts: DispatchTimeouts::default(),
            news_limit: 5,
            top_k: 3,
        }
    }

    /// Secondary price source, quoted as a reference value.
    pub fn with_market_fallback(mut self, source: Arc<dyn MarketDataSource>) -> Self {
        self.market_fallback = Some(source);
        self
    }

    pub fn with_executor(mut self, executor: Arc<dyn QueryExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn with_event_bus(mut self, events: Arc<EventBus>) -> Self {
        self.events = events;
        self
    }

    pub fn with_timeouts(mut self, timeouts: DispatchTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn with_news_limit(mut self, limit: usize) -> Self {
        self.news_limit = limit.max(1);
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub fn sql(&self) -> &SqlEngine {
        &self.sql
    }

    /// Run one action. Conversational turns never touch a collaborator.
    pub async fn dispatch(&self, candidate: &ActionCandidate) -> Result<RawResult, DispatchError> {
        let started = Instant::now();
        let argument = candidate.argument.as_str();

        let result = match candidate.action {
            Action::Conversational => Ok(RawResult::text(conversational_reply(argument))),
            Action::MarketData => self.market_data(argument).await,
            Action::News => self.news(argument).await,
            Action::ProcedureSearch => self.procedures(argument).await,
            Action::DatabaseQuery => self.database(argument).await,
        };

        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(
            action = %candidate.action,
            success = result.is_ok(),
            duration_ms,
            "Action dispatched"
        );
        self.events.publish(DomainEvent::ActionDispatched {
            action: candidate.action,
            success: result.is_ok(),
            duration_ms,
            timestamp: chrono::Utc::now(),
        });
        result
    }

    async fn market_data(&self, argument: &str) -> Result<RawResult, DispatchError> {
        let primary = self
            .guarded(
                Capability::MarketData,
                self.timeouts.market,
                self.market.fetch_quote(argument),
            )
            .await;

        let err = match primary {
            Ok(quote) => return Ok(RawResult::Quote(quote)),
            Err(e) => e,
        };

        let Some(fallback) = &self.market_fallback else {
            return Err(err.into());
        };

        debug!(source = fallback.name(), "Trying secondary price source");
        let mut quote = self
            .guarded(
                Capability::MarketData,
                self.timeouts.market,
                fallback.fetch_quote(argument),
            )
            .await?;
        quote.kind = QuoteKind::Reference {
            proxy: quote.symbol.clone(),
        };
        Ok(RawResult::Quote(quote))
    }

    async fn news(&self, topic: &str) -> Result<RawResult, DispatchError> {
        let articles = self
            .guarded(
                Capability::News,
                self.timeouts.news,
                self.news.fetch_news(topic, self.news_limit),
            )
            .await?;
        Ok(RawResult::Headlines { articles })
    }

    async fn procedures(&self, query: &str) -> Result<RawResult, DispatchError> {
        let snippets = self
            .guarded(
                Capability::ProcedureSearch,
                self.timeouts.procedures,
                self.procedures.search(query, self.top_k),
            )
            .await?;
        Ok(RawResult::Procedures { snippets })
    }

    async fn database(&self, question: &str) -> Result<RawResult, DispatchError> {
        let plan = self.sql.build_query(question).await.map_err(|e| {
            self.report(&e);
            DispatchError::from(e)
        })?;

        let statement = match (&plan.verdict.normalized_statement, plan.verdict.accepted) {
            (Some(statement), true) => statement,
            _ => {
                let reason = plan
                    .verdict
                    .rejection_reason
                    .unwrap_or(RejectionReason::NotReadOnly);
                warn!(%reason, origin = ?plan.candidate.origin, "Guardrail rejected statement");
                self.events.publish(DomainEvent::GuardrailRejected {
                    reason,
                    timestamp: chrono::Utc::now(),
                });
                return Err(DispatchError::rejected(reason));
            }
        };

        debug!(
            %statement,
            template = plan.candidate.template_id.as_deref().unwrap_or("-"),
            "Executing approved statement"
        );

        let Some(executor) = &self.executor else {
            let err = CollaboratorError::NotConfigured {
                capability: Capability::Database,
            };
            self.report(&err);
            return Err(err.into());
        };

        let rows = self
            .guarded(
                Capability::Database,
                self.timeouts.database,
                executor.execute_read_only(statement, &plan.verdict.parameters),
            )
            .await?;
        Ok(RawResult::Rows(rows))
    }

    /// Await `call` under `timeout`, reporting any failure.
    async fn guarded<T, F>(
        &self,
        capability: Capability,
        timeout: Duration,
        call: F,
    ) -> Result<T, CollaboratorError>
    where
        F: Future<Output = Result<T, CollaboratorError>>,
    {
        let outcome = match tokio::time::timeout(timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(CollaboratorError::Timeout {
                capability,
                timeout_secs: timeout.as_secs(),
            }),
        };
        if let Err(e) = &outcome {
            self.report(e);
        }
        outcome
    }

    fn report(&self, err: &CollaboratorError) {
        warn!(capability = ?err.capability(), error = %err, "Collaborator failed");
        self.events.publish(DomainEvent::CollaboratorFailed {
            capability: err.capability(),
            error_message: err.to_string(),
            timestamp: chrono::Utc::now(),
        });
    }
}
