//! Semantic search over operating procedures via an HTTP index service.
//!
//! The service accepts `POST {search_url}/search` with `{query, top_k}` and
//! answers `{results: [{snippet, source_document, score}]}`, best first.

use async_trait::async_trait;
use sahayak_core::collaborator::ProcedureIndex;
use sahayak_core::error::{Capability, CollaboratorError};
use sahayak_core::turn::ProcedureSnippet;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

pub struct HttpProcedureIndex {
    search_url: Option<String>,
    client: reqwest::Client,
}

impl HttpProcedureIndex {
    pub fn new(search_url: Option<String>, timeout: Duration) -> Self {
        Self {
            search_url: search_url
                .map(|u| u.trim_end_matches('/').to_string())
                .filter(|u| !u.is_empty()),
            client: crate::http_client(timeout),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.search_url.is_some()
    }
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    top_k: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    snippet: String,
    #[serde(default, alias = "source")]
    source_document: Option<String>,
    #[serde(default)]
    score: Option<f32>,
}

fn into_snippets(response: SearchResponse, top_k: usize) -> Vec<ProcedureSnippet> {
    response
        .results
        .into_iter()
        .filter(|h| !h.snippet.trim().is_empty())
        .take(top_k)
        .map(|h| ProcedureSnippet {
            snippet: h.snippet.trim().to_string(),
            source_document: h.source_document.unwrap_or_else(|| "unknown SOP".into()),
            score: h.score,
        })
        .collect()
}

#[async_trait]
impl ProcedureIndex for HttpProcedureIndex {
    async fn search(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<ProcedureSnippet>, CollaboratorError> {
        let base = self
            .search_url
            .as_deref()
            .ok_or(CollaboratorError::NotConfigured {
                capability: Capability::ProcedureSearch,
            })?;

        debug!(%query, top_k, "Searching procedures");

        let response = self
            .client
            .post(format!("{base}/search"))
            .json(&SearchRequest { query, top_k })
            .send()
            .await
            .map_err(|e| {
                CollaboratorError::unavailable(Capability::ProcedureSearch, e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Procedure search failed");
            return Err(CollaboratorError::unavailable(
                Capability::ProcedureSearch,
                format!("search endpoint returned {status}"),
            ));
        }

        let body: SearchResponse = response.json().await.map_err(|e| {
            CollaboratorError::malformed(Capability::ProcedureSearch, e.to_string())
        })?;

        Ok(into_snippets(body, top_k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_index_reports_not_configured() {
        let index = HttpProcedureIndex::new(None, Duration::from_secs(1));
        assert!(!index.is_configured());
        let err = index.search("furnace lining", 3).await.unwrap_err();
        assert_eq!(err.capability(), Capability::ProcedureSearch);
        assert!(matches!(err, CollaboratorError::NotConfigured { .. }));
    }

    #[test]
    fn parses_hits_in_order() {
        let body: SearchResponse = serde_json::from_str(
            r#"{"results":[
                {"snippet":"Preheat the ladle to 800C before tapping.","source_document":"SOP-MELT-004.pdf","score":0.91},
                {"snippet":"  ","source_document":"blank.pdf"},
                {"snippet":"Inspect refractory lining weekly.","source":"SOP-FURN-002.pdf"},
                {"snippet":"Extra hit","source_document":"x.pdf","score":0.2}
            ]}"#,
        )
        .unwrap();

        let snippets = into_snippets(body, 2);
        assert_eq!(snippets.len(), 2);
        assert_eq!(snippets[0].source_document, "SOP-MELT-004.pdf");
        assert_eq!(snippets[0].score, Some(0.91));
        assert_eq!(snippets[1].source_document, "SOP-FURN-002.pdf");
        assert_eq!(snippets[1].score, None);
    }

    #[test]
    fn request_body_shape() {
        let body = serde_json::to_value(SearchRequest {
            query: "ladle preheat",
            top_k: 3,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"query": "ladle preheat", "top_k": 3}));
    }
}
