//! Shared fakes for the agent's unit tests.

use async_trait::async_trait;
use chrono::Utc;
use sahayak_core::action::Action;
use sahayak_core::collaborator::{
    ClassifiedIntent, IntentClassifier, MarketDataSource, NewsSource, ProcedureIndex,
    QueryExecutor, Summarizer,
};
use sahayak_core::error::{Capability, CollaboratorError, ProviderError};
use sahayak_core::message::Message;
use sahayak_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use sahayak_core::sql::SqlParam;
use sahayak_core::turn::{
    MarketQuote, NewsArticle, ProcedureSnippet, QueryRows, QuoteKind, RawResult, Turn,
};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// A provider that replays scripted replies and records requests.
///
/// Once the script runs out every call fails with a network error.
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn texts(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self::texts(&[])
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<ProviderRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.requests.lock().unwrap().push(request);
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ProviderError::Network("connection refused".into()))?;
        Ok(ProviderResponse {
            message: Message::assistant(reply),
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
            model: "mock-model".into(),
        })
    }
}

/// What a [`MockClassifier`] does when called.
pub enum ClassifierScript {
    Reply(&'static str, &'static str),
    Fail,
    Stall,
}

pub struct MockClassifier {
    script: ClassifierScript,
    calls: AtomicUsize,
    seen: Mutex<Vec<Vec<Action>>>,
}

impl MockClassifier {
    pub fn new(script: ClassifierScript) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Actions of the recent turns handed to each call, oldest first.
    pub fn contexts(&self) -> Vec<Vec<Action>> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl IntentClassifier for MockClassifier {
    async fn classify(
        &self,
        _query: &str,
        _catalog: &[Action],
        recent: &[Turn],
    ) -> Result<ClassifiedIntent, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap()
            .push(recent.iter().map(|t| t.chosen_action).collect());
        match &self.script {
            ClassifierScript::Reply(tool, input) => Ok(ClassifiedIntent {
                tool: tool.to_string(),
                input: input.to_string(),
            }),
            ClassifierScript::Fail => Err(CollaboratorError::unavailable(
                Capability::IntentClassification,
                "HTTP 503 from upstream",
            )),
            ClassifierScript::Stall => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                unreachable!("stalled classifier should have timed out")
            }
        }
    }
}

pub fn quote(asset: &str, symbol: &str, price: f64) -> MarketQuote {
    MarketQuote {
        asset: asset.into(),
        symbol: symbol.into(),
        price,
        currency: Some("USD".into()),
        previous_close: None,
        as_of: Some(Utc::now()),
        kind: QuoteKind::Direct,
    }
}

pub struct MockMarket {
    quote: Option<MarketQuote>,
    stall: bool,
    pub calls: AtomicUsize,
}

impl MockMarket {
    pub fn ok(quote: MarketQuote) -> Self {
        Self {
            quote: Some(quote),
            stall: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            quote: None,
            stall: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn stalled() -> Self {
        Self {
            quote: None,
            stall: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketDataSource for MockMarket {
    fn name(&self) -> &str {
        "mock-market"
    }

    async fn fetch_quote(&self, symbol_or_metal: &str) -> Result<MarketQuote, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.stall {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        match &self.quote {
            Some(q) => Ok(MarketQuote {
                asset: symbol_or_metal.to_string(),
                ..q.clone()
            }),
            None => Err(CollaboratorError::unavailable(
                Capability::MarketData,
                "yahoo returned 502 Bad Gateway",
            )),
        }
    }
}

pub struct MockNews {
    articles: Option<Vec<NewsArticle>>,
    pub topics: Mutex<Vec<String>>,
}

impl MockNews {
    pub fn with_titles(titles: &[&str]) -> Self {
        Self {
            articles: Some(
                titles
                    .iter()
                    .map(|t| NewsArticle {
                        title: t.to_string(),
                        source: "Metal Bulletin".into(),
                        published_at: None,
                        url: None,
                    })
                    .collect(),
            ),
            topics: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            articles: None,
            topics: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl NewsSource for MockNews {
    async fn fetch_news(
        &self,
        topic: &str,
        limit: usize,
    ) -> Result<Vec<NewsArticle>, CollaboratorError> {
        self.topics.lock().unwrap().push(topic.to_string());
        match &self.articles {
            Some(a) => Ok(a.iter().take(limit).cloned().collect()),
            None => Err(CollaboratorError::unavailable(
                Capability::News,
                "newsapi.org: 426 Upgrade Required",
            )),
        }
    }
}

pub struct MockProcedures {
    snippets: Vec<ProcedureSnippet>,
}

impl MockProcedures {
    pub fn with(snippet: &str, document: &str) -> Self {
        Self {
            snippets: vec![ProcedureSnippet {
                snippet: snippet.into(),
                source_document: document.into(),
                score: Some(0.9),
            }],
        }
    }

    pub fn empty() -> Self {
        Self {
            snippets: Vec::new(),
        }
    }
}

#[async_trait]
impl ProcedureIndex for MockProcedures {
    async fn search(
        &self,
        _query: &str,
        top_k: usize,
    ) -> Result<Vec<ProcedureSnippet>, CollaboratorError> {
        Ok(self.snippets.iter().take(top_k).cloned().collect())
    }
}

/// Records every statement it is asked to run.
pub struct MockExecutor {
    rows: QueryRows,
    pub executed: Mutex<Vec<(String, Vec<SqlParam>)>>,
}

impl MockExecutor {
    pub fn returning(columns: &[&str], rows: Vec<Vec<serde_json::Value>>) -> Self {
        Self {
            rows: QueryRows {
                columns: columns.iter().map(|c| c.to_string()).collect(),
                rows,
            },
            executed: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self::returning(&[], Vec::new())
    }

    pub fn statements(&self) -> Vec<String> {
        self.executed
            .lock()
            .unwrap()
            .iter()
            .map(|(s, _)| s.clone())
            .collect()
    }
}

#[async_trait]
impl QueryExecutor for MockExecutor {
    async fn execute_read_only(
        &self,
        statement: &str,
        parameters: &[SqlParam],
    ) -> Result<QueryRows, CollaboratorError> {
        self.executed
            .lock()
            .unwrap()
            .push((statement.to_string(), parameters.to_vec()));
        Ok(self.rows.clone())
    }
}

/// Summarizer that prefixes the rendered raw result, or fails.
pub struct MockSummarizer {
    fail: bool,
    calls: AtomicUsize,
}

impl MockSummarizer {
    pub fn echo() -> Self {
        Self {
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Summarizer for MockSummarizer {
    async fn summarize(
        &self,
        _query: &str,
        action: Action,
        _argument: &str,
        raw: &RawResult,
    ) -> Result<String, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(CollaboratorError::unavailable(
                Capability::Summarization,
                "groq: 500 internal error",
            ));
        }
        Ok(format!("[{action}] {}", raw.render()))
    }
}
