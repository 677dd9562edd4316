//! Language-model adapters for classification, SQL generation and
//! summarization, all over one [`Provider`].

use async_trait::async_trait;
use sahayak_core::action::Action;
use sahayak_core::collaborator::{ClassifiedIntent, IntentClassifier, SqlGenerator, Summarizer};
use sahayak_core::error::{Capability, CollaboratorError};
use sahayak_core::message::Message;
use sahayak_core::provider::{Provider, ProviderRequest};
use sahayak_core::schema::SchemaDescriptor;
use sahayak_core::turn::{RawResult, Turn};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use crate::prompts;

/// Shared request settings for one adapter.
#[derive(Clone)]
struct ModelCall {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl ModelCall {
    async fn complete(
        &self,
        capability: Capability,
        system: &str,
        user: String,
    ) -> Result<String, CollaboratorError> {
        let mut request = ProviderRequest::new(
            self.model.clone(),
            vec![Message::system(system), Message::user(user)],
        )
        .with_temperature(self.temperature);
        if let Some(max_tokens) = self.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }

        let response = self
            .provider
            .complete(request)
            .await
            .map_err(|e| CollaboratorError::from_provider(capability, e))?;

        if let Some(usage) = &response.usage {
            debug!(
                ?capability,
                provider = self.provider.name(),
                total_tokens = usage.total_tokens,
                "Model call finished"
            );
        }
        Ok(response.message.content)
    }
}

// --- Intent classification ---

pub struct LlmIntentClassifier {
    call: ModelCall,
}

impl LlmIntentClassifier {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            call: ModelCall {
                provider,
                model: model.into(),
                temperature: 0.0,
                max_tokens: Some(128),
            },
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.call.temperature = temperature;
        self
    }
}

#[derive(Deserialize)]
struct RawIntent {
    #[serde(alias = "action", alias = "name")]
    tool: String,
    #[serde(default, alias = "query", alias = "argument")]
    input: String,
}

/// Pull the first `{...}` object out of a model reply.
///
/// Models often wrap JSON in prose or code fences.
pub fn parse_intent(reply: &str) -> Result<ClassifiedIntent, CollaboratorError> {
    let malformed = |reason: String| CollaboratorError::malformed(Capability::IntentClassification, reason);

    let start = reply.find('{').ok_or_else(|| malformed("no JSON object in reply".into()))?;
    let end = reply.rfind('}').filter(|end| *end > start).ok_or_else(|| {
        malformed("unterminated JSON object in reply".into())
    })?;

    let raw: RawIntent =
        serde_json::from_str(&reply[start..=end]).map_err(|e| malformed(e.to_string()))?;

    Ok(ClassifiedIntent {
        tool: raw.tool,
        input: raw.input,
    })
}

#[async_trait]
impl IntentClassifier for LlmIntentClassifier {
    async fn classify(
        &self,
        query: &str,
        catalog: &[Action],
        recent: &[Turn],
    ) -> Result<ClassifiedIntent, CollaboratorError> {
        let reply = self
            .call
            .complete(
                Capability::IntentClassification,
                prompts::CLASSIFIER_SYSTEM,
                prompts::classification_prompt(query, catalog, recent),
            )
            .await?;
        parse_intent(&reply)
    }
}

// --- SQL generation ---

pub struct LlmSqlGenerator {
    call: ModelCall,
}

impl LlmSqlGenerator {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            call: ModelCall {
                provider,
                model: model.into(),
                temperature: 0.0,
                max_tokens: Some(512),
            },
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.call.temperature = temperature;
        self
    }
}

/// Remove a surrounding markdown code fence, if any.
pub fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(open) = trimmed.find("```") else {
        return trimmed;
    };
    let body = &trimmed[open + 3..];
    // Skip the info string ("sql", "postgresql").
    let body = match body.find('\n') {
        Some(nl) if body[..nl].chars().all(|c| c.is_ascii_alphanumeric()) => &body[nl + 1..],
        _ => body,
    };
    match body.find("```") {
        Some(close) => body[..close].trim(),
        None => body.trim(),
    }
}

#[async_trait]
impl SqlGenerator for LlmSqlGenerator {
    async fn generate_sql(
        &self,
        input: &str,
        schema: &SchemaDescriptor,
    ) -> Result<String, CollaboratorError> {
        let reply = self
            .call
            .complete(
                Capability::SqlGeneration,
                prompts::SQL_SYSTEM,
                prompts::sql_prompt(input, schema),
            )
            .await?;

        let sql = strip_code_fence(&reply);
        if sql.is_empty() {
            return Err(CollaboratorError::malformed(
                Capability::SqlGeneration,
                "empty SQL reply",
            ));
        }
        Ok(sql.to_string())
    }
}

// --- Summarization ---

pub struct LlmSummarizer {
    call: ModelCall,
}

impl LlmSummarizer {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            call: ModelCall {
                provider,
                model: model.into(),
                temperature: 0.3,
                max_tokens: None,
            },
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.call.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.call.max_tokens = Some(max_tokens);
        self
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    async fn summarize(
        &self,
        query: &str,
        action: Action,
        argument: &str,
        raw: &RawResult,
    ) -> Result<String, CollaboratorError> {
        let reply = self
            .call
            .complete(
                Capability::Summarization,
                prompts::SUMMARY_SYSTEM,
                prompts::summary_prompt(query, action, argument, raw),
            )
            .await?;

        let answer = reply.trim();
        if answer.is_empty() {
            return Err(CollaboratorError::malformed(
                Capability::Summarization,
                "empty summary",
            ));
        }
        Ok(answer.to_string())
    }
}
