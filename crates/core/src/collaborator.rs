//! Contracts for the external systems a turn depends on.
//!
//! Every collaborator is reached through one of these narrow traits so the
//! routing and dispatch logic can be exercised with in-process fakes.
//! Implementations: `sahayak-tools` (HTTP/database) and `sahayak-agent`
//! (language-model adapters).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::error::CollaboratorError;
use crate::schema::SchemaDescriptor;
use crate::sql::SqlParam;
use crate::turn::{MarketQuote, NewsArticle, ProcedureSnippet, QueryRows, RawResult, Turn};

type CollabResult<T> = std::result::Result<T, CollaboratorError>;

/// Unvalidated `{tool, input}` pair as returned by the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedIntent {
    pub tool: String,
    pub input: String,
}

/// Language-model intent classification.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    /// Pick one tool from `catalog` for `query`, given recent turns oldest first.
    async fn classify(
        &self,
        query: &str,
        catalog: &[Action],
        recent: &[Turn],
    ) -> CollabResult<ClassifiedIntent>;
}

/// Language-model SQL generation. The returned text is untrusted.
#[async_trait]
pub trait SqlGenerator: Send + Sync {
    async fn generate_sql(&self, input: &str, schema: &SchemaDescriptor) -> CollabResult<String>;
}

/// Turns a raw result into an operator-facing answer.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(
        &self,
        query: &str,
        action: Action,
        argument: &str,
        raw: &RawResult,
    ) -> CollabResult<String>;
}

/// Price source for metals, commodities, currencies and equities.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    fn name(&self) -> &str;

    /// Quote for an asset name ("copper") or ticker ("HG=F").
    async fn fetch_quote(&self, symbol_or_metal: &str) -> CollabResult<MarketQuote>;
}

#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Newest articles on `topic`, at most `limit`.
    async fn fetch_news(&self, topic: &str, limit: usize) -> CollabResult<Vec<NewsArticle>>;
}

/// Semantic search over operating procedures.
#[async_trait]
pub trait ProcedureIndex: Send + Sync {
    /// Best matches first, at most `top_k`.
    async fn search(&self, query: &str, top_k: usize) -> CollabResult<Vec<ProcedureSnippet>>;
}

/// Executes guardrail-approved statements.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute_read_only(
        &self,
        statement: &str,
        parameters: &[SqlParam],
    ) -> CollabResult<QueryRows>;

    async fn health_check(&self) -> CollabResult<()> {
        Ok(())
    }
}
