//! Turns and the raw results actions produce.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::action::Action;

/// Unique identifier for an operator session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One request/response cycle.
///
/// Built once the response is known and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub query: String,
    pub chosen_action: Action,
    pub action_argument: String,

    /// `None` when the turn failed before producing data.
    pub raw_result: Option<RawResult>,

    pub final_response: String,

    /// When the query entered the orchestrator.
    pub timestamp: DateTime<Utc>,
}

/// How a market quote was obtained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuoteKind {
    /// The asset's own price.
    Direct,
    /// A related equity's price standing in for an unavailable direct price.
    Reference { proxy: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketQuote {
    /// What the operator asked about, e.g. "copper".
    pub asset: String,
    /// The ticker actually quoted, e.g. "HG=F".
    pub symbol: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_close: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of: Option<DateTime<Utc>>,
    pub kind: QuoteKind,
}

impl MarketQuote {
    /// Percentage move against the previous close, when known.
    pub fn change_percent(&self) -> Option<f64> {
        let prev = self.previous_close?;
        if prev == 0.0 {
            return None;
        }
        Some((self.price - prev) / prev * 100.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcedureSnippet {
    pub snippet: String,
    pub source_document: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

/// Tabular result of a read-only query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryRows {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl QueryRows {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Raw output of a dispatched action, before summarization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RawResult {
    Text { text: String },
    Quote(MarketQuote),
    Headlines { articles: Vec<NewsArticle> },
    Procedures { snippets: Vec<ProcedureSnippet> },
    Rows(QueryRows),
}

impl RawResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// True when the action succeeded but found nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text { text } => text.trim().is_empty(),
            Self::Quote(_) => false,
            Self::Headlines { articles } => articles.is_empty(),
            Self::Procedures { snippets } => snippets.is_empty(),
            Self::Rows(rows) => rows.is_empty(),
        }
    }

    /// Plain-text rendering, used as summarization input and as the
    /// degraded answer when summarization is unavailable.
    pub fn render(&self) -> String {
        match self {
            Self::Text { text } => text.clone(),
            Self::Quote(quote) => render_quote(quote),
            Self::Headlines { articles } => articles
                .iter()
                .map(|a| {
                    let date = a
                        .published_at
                        .map(|d| format!(", {}", d.format("%Y-%m-%d")))
                        .unwrap_or_default();
                    format!("- {} ({}{date})", a.title, a.source)
                })
                .collect::<Vec<_>>()
                .join("\n"),
            Self::Procedures { snippets } => snippets
                .iter()
                .map(|s| format!("[{}] {}", s.source_document, s.snippet.trim()))
                .collect::<Vec<_>>()
                .join("\n\n"),
            Self::Rows(rows) => render_rows(rows),
        }
    }
}

fn render_quote(quote: &MarketQuote) -> String {
    let currency = quote.currency.as_deref().unwrap_or("");
    let change = quote
        .change_percent()
        .map(|c| format!(" ({c:+.2}% vs previous close)"))
        .unwrap_or_default();
    match &quote.kind {
        QuoteKind::Direct => format!(
            "{} ({}): {:.2} {currency}{change}",
            quote.asset, quote.symbol, quote.price
        )
        .trim_end()
        .to_string(),
        QuoteKind::Reference { proxy } => format!(
            "{} reference value via {proxy}: {:.2} {currency}{change} \
             (related equity, not a direct {} price)",
            quote.asset, quote.price, quote.asset
        ),
    }
}

fn render_rows(rows: &QueryRows) -> String {
    let mut out = rows.columns.join(" | ");
    for row in &rows.rows {
        out.push('\n');
        let cells: Vec<String> = row
            .iter()
            .map(|v| match v {
                serde_json::Value::Null => "NULL".to_string(),
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect();
        out.push_str(&cells.join(" | "));
    }
    out
}
