//! Assembles a [`TurnOrchestrator`] from configuration.

use sahayak_config::AppConfig;
use sahayak_core::event::EventBus;
use sahayak_core::provider::Provider;
use sahayak_memory::SessionStore;
use sahayak_providers::ProviderRouter;
use sahayak_sql::SqlEngine;
use sahayak_tools::{HttpProcedureIndex, NewsApiSource, PostgresExecutor, YahooChartSource};
use std::sync::Arc;
use tracing::{info, warn};

use crate::dispatcher::{ActionDispatcher, DispatchTimeouts};
use crate::llm::{LlmIntentClassifier, LlmSqlGenerator, LlmSummarizer};
use crate::orchestrator::TurnOrchestrator;
use crate::router::IntentRouter;

/// The language model every LLM adapter talks to.
#[derive(Clone)]
pub struct ModelHandle {
    pub provider: Arc<dyn Provider>,
    pub model: String,
}

/// Resolve the default provider and model, if one is usable.
///
/// Local Ollama needs no key; every other provider does.
pub fn language_model(config: &AppConfig) -> Option<ModelHandle> {
    let provider_config = config.providers.get(&config.default_provider);
    let has_key = config.has_api_key()
        || provider_config.is_some_and(|p| p.api_key.as_deref().is_some_and(|k| !k.is_empty()));
    if !has_key && config.default_provider != "ollama" {
        warn!(
            provider = %config.default_provider,
            "No API key configured, running heuristics and templates only"
        );
        return None;
    }

    let providers: ProviderRouter = sahayak_providers::build_from_config(config);
    let provider = providers.default()?;
    let model = provider_config
        .and_then(|p| p.default_model.clone())
        .unwrap_or_else(|| config.default_model.clone());
    Some(ModelHandle { provider, model })
}

/// The SQL engine with the foundry catalog and, when available, a generator.
pub fn build_sql_engine(config: &AppConfig, model: Option<&ModelHandle>) -> SqlEngine {
    let engine = SqlEngine::foundry()
        .with_row_limit(config.database.row_limit)
        .with_generation_timeout(config.timeouts.sql_generation());
    match model {
        Some(m) => engine.with_generator(Arc::new(
            LlmSqlGenerator::new(m.provider.clone(), m.model.clone())
                .with_temperature(config.default_temperature),
        )),
        None => engine,
    }
}

/// Wire every collaborator named in `config` into a ready orchestrator.
pub fn build_orchestrator(config: &AppConfig) -> TurnOrchestrator {
    let model = language_model(config);
    let events = Arc::new(EventBus::default());
    let timeouts = &config.timeouts;

    let sql = build_sql_engine(config, model.as_ref());

    let mut dispatcher = ActionDispatcher::new(
        Arc::new(sql),
        Arc::new(YahooChartSource::commodities(
            &config.market.chart_url,
            timeouts.market(),
        )),
        Arc::new(NewsApiSource::from_config(&config.news, timeouts.news())),
        Arc::new(HttpProcedureIndex::new(
            config.procedures.search_url.clone(),
            timeouts.procedures(),
        )),
    )
    .with_market_fallback(Arc::new(YahooChartSource::proxy_equities(
        &config.market.chart_url,
        timeouts.market(),
    )))
    .with_timeouts(DispatchTimeouts {
        market: timeouts.market(),
        news: timeouts.news(),
        procedures: timeouts.procedures(),
        database: timeouts.database(),
    })
    .with_news_limit(config.news.max_articles)
    .with_top_k(config.procedures.top_k)
    .with_event_bus(events.clone());

    match PostgresExecutor::connect_lazy(&config.database) {
        Ok(executor) => dispatcher = dispatcher.with_executor(Arc::new(executor)),
        Err(e) => warn!(error = %e, "Database queries disabled"),
    }

    let mut router = IntentRouter::new()
        .with_timeout(timeouts.classify())
        .with_context_turns(config.memory.context_turns);

    let mut orchestrator_summarizer = None;
    if let Some(m) = &model {
        router = router.with_classifier(Arc::new(
            LlmIntentClassifier::new(m.provider.clone(), m.model.clone())
                .with_temperature(config.default_temperature),
        ));
        orchestrator_summarizer = Some(Arc::new(
            LlmSummarizer::new(m.provider.clone(), m.model.clone())
                .with_temperature(config.summary_temperature)
                .with_max_tokens(config.default_max_tokens),
        ));
        info!(provider = m.provider.name(), model = %m.model, "Language model enabled");
    }

    let mut orchestrator = TurnOrchestrator::new(router, dispatcher)
        .with_summarize_timeout(timeouts.summarize())
        .with_sessions(Arc::new(SessionStore::new(config.memory.capacity)))
        .with_event_bus(events);
    if let Some(summarizer) = orchestrator_summarizer {
        orchestrator = orchestrator.with_summarizer(summarizer);
    }
    orchestrator
}
