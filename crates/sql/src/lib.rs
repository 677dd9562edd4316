//! SQL guardrail engine for Sahayak.
//!
//! Turns a natural-language data question into a statement that is safe to
//! run: a keyword template when one matches, otherwise model-generated SQL,
//! and in both cases the same read-only [`Guardrail`] decides.

pub mod catalog;
pub mod guardrail;
pub mod templates;

pub use catalog::foundry_schema;
pub use guardrail::{DEFAULT_ROW_LIMIT, FORBIDDEN_KEYWORDS, Guardrail};
pub use templates::{QueryTemplate, TemplateSet};

use chrono::{NaiveDate, Utc};
use sahayak_core::{
    Capability, CollaboratorError, GuardrailVerdict, SchemaDescriptor, SqlCandidate, SqlGenerator,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// A candidate together with the guardrail's judgment of it.
#[derive(Debug, Clone, Serialize)]
pub struct QueryPlan {
    pub candidate: SqlCandidate,
    pub verdict: GuardrailVerdict,
}

pub struct SqlEngine {
    schema: Arc<SchemaDescriptor>,
    templates: TemplateSet,
    guardrail: Guardrail,
    generator: Option<Arc<dyn SqlGenerator>>,
    generation_timeout: Duration,
}

impl SqlEngine {
    pub fn new(schema: SchemaDescriptor) -> Self {
        let templates = TemplateSet::from_schema(&schema);
        Self {
            schema: Arc::new(schema),
            templates,
            guardrail: Guardrail::default(),
            generator: None,
            generation_timeout: Duration::from_secs(15),
        }
    }

    /// Engine over the built-in foundry schema.
    pub fn foundry() -> Self {
        Self::new(foundry_schema())
    }

    pub fn with_generator(mut self, generator: Arc<dyn SqlGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = timeout;
        self
    }

    pub fn with_row_limit(mut self, row_limit: u32) -> Self {
        self.guardrail = Guardrail::new(row_limit);
        self
    }

    pub fn schema(&self) -> &SchemaDescriptor {
        &self.schema
    }

    pub fn templates(&self) -> &TemplateSet {
        &self.templates
    }

    /// Template candidate for `input`, if any template matches.
    pub fn match_template(&self, input: &str, today: NaiveDate) -> Option<SqlCandidate> {
        self.templates.candidate(input, today)
    }

    /// Pick a template, or ask the generator for SQL when none matches.
    pub async fn select_candidate(&self, input: &str) -> Result<SqlCandidate, CollaboratorError> {
        self.select_candidate_on(input, Utc::now().date_naive()).await
    }

    async fn select_candidate_on(
        &self,
        input: &str,
        today: NaiveDate,
    ) -> Result<SqlCandidate, CollaboratorError> {
        if let Some(candidate) = self.match_template(input, today) {
            debug!(template = candidate.template_id.as_deref().unwrap_or("-"), "Template matched");
            return Ok(candidate);
        }

        let generator = self.generator.as_ref().ok_or(CollaboratorError::NotConfigured {
            capability: Capability::SqlGeneration,
        })?;

        info!("No template matched, generating SQL");
        let generated = tokio::time::timeout(
            self.generation_timeout,
            generator.generate_sql(input, &self.schema),
        )
        .await
        .map_err(|_| CollaboratorError::Timeout {
            capability: Capability::SqlGeneration,
            timeout_secs: self.generation_timeout.as_secs(),
        })??;

        Ok(SqlCandidate::generated(generated))
    }

    /// Structural safety check, identical for every origin.
    pub fn validate(&self, candidate: &SqlCandidate) -> GuardrailVerdict {
        self.guardrail.validate(candidate)
    }

    /// `select_candidate` then `validate`.
    pub async fn build_query(&self, input: &str) -> Result<QueryPlan, CollaboratorError> {
        let candidate = self.select_candidate(input).await?;
        let verdict = self.validate(&candidate);
        Ok(QueryPlan { candidate, verdict })
    }

    /// [`build_query`](Self::build_query) with an explicit date for "today".
    pub async fn build_query_on(
        &self,
        input: &str,
        today: NaiveDate,
    ) -> Result<QueryPlan, CollaboratorError> {
        let candidate = self.select_candidate_on(input, today).await?;
        let verdict = self.validate(&candidate);
        Ok(QueryPlan { candidate, verdict })
    }
}
