//! Error types for the Sahayak domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sql::RejectionReason;

/// The top-level error type for all Sahayak operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Collaborator errors ---
    #[error("Collaborator error: {0}")]
    Collaborator(#[from] CollaboratorError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// A capability the assistant exposes to operators.
///
/// User-facing failure messages name the capability, never the provider
/// behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    IntentClassification,
    MarketData,
    News,
    ProcedureSearch,
    SqlGeneration,
    Database,
    Summarization,
}

impl Capability {
    /// Human-readable label used in operator-facing messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::IntentClassification => "query understanding",
            Self::MarketData => "market prices",
            Self::News => "industry news",
            Self::ProcedureSearch => "procedure search",
            Self::SqlGeneration => "production data questions",
            Self::Database => "the production database",
            Self::Summarization => "answer summarization",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Failure of an external collaborator call.
///
/// The inner `reason` strings carry provider detail for logs only.
#[derive(Debug, Clone, Error)]
pub enum CollaboratorError {
    #[error("{capability} unavailable: {reason}")]
    Unavailable {
        capability: Capability,
        reason: String,
    },

    #[error("{capability} timed out after {timeout_secs}s")]
    Timeout {
        capability: Capability,
        timeout_secs: u64,
    },

    #[error("{capability} returned a malformed response: {reason}")]
    Malformed {
        capability: Capability,
        reason: String,
    },

    #[error("{capability} is not configured")]
    NotConfigured { capability: Capability },
}

impl CollaboratorError {
    pub fn unavailable(capability: Capability, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            capability,
            reason: reason.into(),
        }
    }

    pub fn malformed(capability: Capability, reason: impl Into<String>) -> Self {
        Self::Malformed {
            capability,
            reason: reason.into(),
        }
    }

    /// The capability that failed.
    pub fn capability(&self) -> Capability {
        match self {
            Self::Unavailable { capability, .. }
            | Self::Timeout { capability, .. }
            | Self::Malformed { capability, .. }
            | Self::NotConfigured { capability } => *capability,
        }
    }

    /// Wrap a language-model transport failure.
    pub fn from_provider(capability: Capability, err: ProviderError) -> Self {
        match err {
            ProviderError::Timeout(_) => Self::Timeout {
                capability,
                timeout_secs: 0,
            },
            ProviderError::NotConfigured(_) => Self::NotConfigured { capability },
            other => Self::unavailable(capability, other.to_string()),
        }
    }
}

/// What went wrong while dispatching an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchErrorKind {
    GuardrailRejected(RejectionReason),
    CollaboratorUnavailable(Capability),
}

/// A dispatch failure carrying a message that is safe to show operators.
///
/// `user_message` never contains SQL text or provider error bodies.
#[derive(Debug, Clone, Error)]
#[error("{user_message}")]
pub struct DispatchError {
    pub kind: DispatchErrorKind,
    pub user_message: String,
}

impl DispatchError {
    pub fn rejected(reason: RejectionReason) -> Self {
        Self {
            kind: DispatchErrorKind::GuardrailRejected(reason),
            user_message: "That query is not permitted. I can only run read-only questions \
                           against the production data."
                .into(),
        }
    }

    pub fn unavailable(capability: Capability) -> Self {
        Self {
            kind: DispatchErrorKind::CollaboratorUnavailable(capability),
            user_message: format!(
                "Sorry, {} is temporarily unavailable. Please try again shortly.",
                capability.label()
            ),
        }
    }
}

impl From<CollaboratorError> for DispatchError {
    fn from(err: CollaboratorError) -> Self {
        Self::unavailable(err.capability())
    }
}
