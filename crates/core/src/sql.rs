//! SQL candidates and the guardrail's verdict on them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Where a SQL statement came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SqlOrigin {
    Template,
    Generated,
}

/// A value bound to a `$n` placeholder at execution time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum SqlParam {
    Date(NaiveDate),
    Text(String),
    Integer(i64),
}

impl std::fmt::Display for SqlParam {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Date(d) => write!(f, "{d}"),
            Self::Text(s) => write!(f, "{s:?}"),
            Self::Integer(i) => write!(f, "{i}"),
        }
    }
}

/// A statement proposed for execution, not yet trusted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlCandidate {
    pub statement_text: String,
    pub origin: SqlOrigin,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    /// Values for the statement's placeholders, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<SqlParam>,
}

impl SqlCandidate {
    pub fn generated(statement_text: impl Into<String>) -> Self {
        Self {
            statement_text: statement_text.into(),
            origin: SqlOrigin::Generated,
            template_id: None,
            parameters: Vec::new(),
        }
    }

    pub fn template(
        template_id: impl Into<String>,
        statement_text: impl Into<String>,
        parameters: Vec<SqlParam>,
    ) -> Self {
        Self {
            statement_text: statement_text.into(),
            origin: SqlOrigin::Template,
            template_id: Some(template_id.into()),
            parameters,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    ForbiddenKeyword,
    NotReadOnly,
    MultiStatement,
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::ForbiddenKeyword => "forbidden_keyword",
            Self::NotReadOnly => "not_read_only",
            Self::MultiStatement => "multi_statement",
        };
        f.write_str(s)
    }
}

/// The authoritative safety judgment for one candidate.
///
/// When `accepted` is true, `normalized_statement` is a single `SELECT`
/// (or `WITH ... SELECT`) statement with an outermost `LIMIT`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardrailVerdict {
    pub accepted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<RejectionReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalized_statement: Option<String>,
    /// Bound values carried over from the candidate.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<SqlParam>,
}

impl GuardrailVerdict {
    pub fn accept(normalized_statement: String, parameters: Vec<SqlParam>) -> Self {
        Self {
            accepted: true,
            rejection_reason: None,
            normalized_statement: Some(normalized_statement),
            parameters,
        }
    }

    pub fn reject(reason: RejectionReason) -> Self {
        Self {
            accepted: false,
            rejection_reason: Some(reason),
            normalized_statement: None,
            parameters: Vec::new(),
        }
    }
}
