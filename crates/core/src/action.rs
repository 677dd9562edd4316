//! Actions and the classification result that selects one per turn.

use serde::{Deserialize, Serialize};

use crate::error::Capability;

/// The closed set of things a turn can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    MarketData,
    News,
    ProcedureSearch,
    DatabaseQuery,
    Conversational,
}

impl Action {
    /// Actions that reach an external collaborator, in catalog order.
    pub const DISPATCHABLE: [Action; 4] = [
        Action::MarketData,
        Action::News,
        Action::ProcedureSearch,
        Action::DatabaseQuery,
    ];

    /// Stable tool name used in classification prompts and responses.
    pub fn name(&self) -> &'static str {
        match self {
            Self::MarketData => "market_data",
            Self::News => "news",
            Self::ProcedureSearch => "procedure_search",
            Self::DatabaseQuery => "database_query",
            Self::Conversational => "conversational",
        }
    }

    /// One-line description for the classification catalog.
    pub fn description(&self) -> &'static str {
        match self {
            Self::MarketData => {
                "Live market prices for metals, commodities, currencies and stocks. Input: the asset or ticker."
            }
            Self::News => "Recent industry news headlines. Input: the topic.",
            Self::ProcedureSearch => {
                "Standard operating procedures, safety rules and guidelines. Input: the procedure question."
            }
            Self::DatabaseQuery => {
                "Foundry production, quality, inventory and maintenance records. Input: the data question."
            }
            Self::Conversational => "Greetings and questions about what the assistant can do.",
        }
    }

    /// Parse a tool name returned by the language model.
    ///
    /// Only dispatchable actions are accepted; anything else is `None`.
    pub fn from_tool_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase();
        Self::DISPATCHABLE
            .into_iter()
            .find(|action| action.name() == normalized)
    }

    /// The capability exercised by dispatching this action.
    pub fn capability(&self) -> Option<Capability> {
        match self {
            Self::MarketData => Some(Capability::MarketData),
            Self::News => Some(Capability::News),
            Self::ProcedureSearch => Some(Capability::ProcedureSearch),
            Self::DatabaseQuery => Some(Capability::Database),
            Self::Conversational => None,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Where an [`ActionCandidate`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    Heuristic,
    LanguageModel,
    Default,
}

/// Why the router fell back to a database query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    ClassifierUnavailable,
    ClassifierTimeout,
    MalformedResponse,
    UnknownTool,
    EmptyInput,
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::ClassifierUnavailable => "classifier_unavailable",
            Self::ClassifierTimeout => "classifier_timeout",
            Self::MalformedResponse => "malformed_response",
            Self::UnknownTool => "unknown_tool",
            Self::EmptyInput => "empty_input",
        };
        f.write_str(s)
    }
}

/// The action chosen for one turn, with the argument passed to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionCandidate {
    pub action: Action,

    /// Sub-query or normalized topic handed to the action.
    pub argument: String,

    pub source: CandidateSource,

    /// Set only when `source` is [`CandidateSource::Default`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<FallbackReason>,
}

impl ActionCandidate {
    pub fn heuristic(action: Action, argument: impl Into<String>) -> Self {
        Self {
            action,
            argument: argument.into(),
            source: CandidateSource::Heuristic,
            fallback: None,
        }
    }

    pub fn language_model(action: Action, argument: impl Into<String>) -> Self {
        Self {
            action,
            argument: argument.into(),
            source: CandidateSource::LanguageModel,
            fallback: None,
        }
    }

    /// The undecidable-query default: a database question over the verbatim query.
    pub fn database_fallback(query: impl Into<String>, reason: FallbackReason) -> Self {
        Self {
            action: Action::DatabaseQuery,
            argument: query.into(),
            source: CandidateSource::Default,
            fallback: Some(reason),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.source == CandidateSource::Default
    }
}
