//! Industry headlines from NewsAPI (`/everything`).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sahayak_core::collaborator::NewsSource;
use sahayak_core::error::{Capability, CollaboratorError};
use sahayak_core::turn::NewsArticle;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// NewsAPI removes some articles but keeps a placeholder entry.
const REMOVED_TITLE: &str = "[Removed]";

pub struct NewsApiSource {
    api_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl NewsApiSource {
    pub fn new(api_url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            client: crate::http_client(timeout),
        }
    }

    pub fn from_config(config: &sahayak_config::NewsConfig, timeout: Duration) -> Self {
        Self::new(&config.api_url, config.api_key.clone(), timeout)
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl NewsSource for NewsApiSource {
    async fn fetch_news(
        &self,
        topic: &str,
        limit: usize,
    ) -> Result<Vec<NewsArticle>, CollaboratorError> {
        let api_key = self.api_key.as_deref().ok_or(CollaboratorError::NotConfigured {
            capability: Capability::News,
        })?;

        let page_size = limit.clamp(1, 100).to_string();
        debug!(%topic, limit, "Fetching news");

        let response = self
            .client
            .get(format!("{}/everything", self.api_url))
            .query(&[
                ("q", topic),
                ("sortBy", "publishedAt"),
                ("pageSize", page_size.as_str()),
                ("language", "en"),
            ])
            .header("X-Api-Key", api_key)
            .send()
            .await
            .map_err(|e| CollaboratorError::unavailable(Capability::News, e.to_string()))?;

        let status = response.status();
        let body: NewsResponse = response
            .json()
            .await
            .map_err(|e| CollaboratorError::malformed(Capability::News, e.to_string()))?;

        if !status.is_success() || body.status != "ok" {
            warn!(status = status.as_u16(), code = ?body.code, "News request failed");
            return Err(CollaboratorError::unavailable(
                Capability::News,
                body.message.unwrap_or_else(|| format!("news endpoint returned {status}")),
            ));
        }

        Ok(into_articles(body.articles, limit))
    }
}

fn into_articles(articles: Vec<ApiArticle>, limit: usize) -> Vec<NewsArticle> {
    articles
        .into_iter()
        .filter(|a| {
            a.title
                .as_deref()
                .is_some_and(|t| !t.trim().is_empty() && t != REMOVED_TITLE)
        })
        .take(limit)
        .map(|a| NewsArticle {
            title: a.title.unwrap_or_default().trim().to_string(),
            source: a
                .source
                .and_then(|s| s.name)
                .unwrap_or_else(|| "unknown".into()),
            published_at: a
                .published_at
                .as_deref()
                .and_then(|p| DateTime::parse_from_rfc3339(p).ok())
                .map(|d| d.with_timezone(&Utc)),
            url: a.url,
        })
        .collect()
}

// --- NewsAPI types ---

#[derive(Debug, Deserialize)]
struct NewsResponse {
    status: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<ApiArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiArticle {
    source: Option<ApiSource>,
    title: Option<String>,
    url: Option<String>,
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiSource {
    name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_is_not_configured() {
        let source = NewsApiSource::new("https://newsapi.org/v2", None, Duration::from_secs(1));
        assert!(!source.is_configured());
        let err = source.fetch_news("steel", 3).await.unwrap_err();
        assert!(matches!(
            err,
            CollaboratorError::NotConfigured {
                capability: Capability::News
            }
        ));
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let source =
            NewsApiSource::new("https://newsapi.org/v2", Some("  ".into()), Duration::from_secs(1));
        assert!(!source.is_configured());
    }

    #[test]
    fn parses_articles_and_drops_removed_entries() {
        let body: NewsResponse = serde_json::from_str(
            r#"{"status":"ok","totalResults":3,"articles":[
                {"source":{"id":null,"name":"Reuters"},"title":"Steel output rises in Q2",
                 "url":"https://example.com/a","publishedAt":"2024-06-10T08:30:00Z"},
                {"source":{"id":null,"name":"[Removed]"},"title":"[Removed]","url":null,"publishedAt":null},
                {"source":null,"title":"Foundry orders climb","url":null,"publishedAt":"not a date"}
            ]}"#,
        )
        .unwrap();

        let articles = into_articles(body.articles, 5);
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].source, "Reuters");
        assert!(articles[0].published_at.is_some());
        assert_eq!(articles[1].source, "unknown");
        assert!(articles[1].published_at.is_none());
    }

    #[test]
    fn respects_limit() {
        let raw: Vec<ApiArticle> = (0..10)
            .map(|i| ApiArticle {
                source: None,
                title: Some(format!("headline {i}")),
                url: None,
                published_at: None,
            })
            .collect();
        assert_eq!(into_articles(raw, 3).len(), 3);
    }

    #[test]
    fn parses_error_envelope() {
        let body: NewsResponse = serde_json::from_str(
            r#"{"status":"error","code":"apiKeyInvalid","message":"Your API key is invalid."}"#,
        )
        .unwrap();
        assert_eq!(body.status, "error");
        assert!(body.articles.is_empty());
    }
}
