//! # Sahayak Core
//!
//! Domain types, collaborator traits, and error definitions for the Sahayak
//! foundry assistant. This crate performs **no I/O**: it defines the model
//! every other crate implements against.
//!
//! ## Layout
//!
//! - [`action`]: the closed set of actions a turn can take and the
//!   candidate produced by classification
//! - [`turn`]: one request/response cycle and its raw result
//! - [`schema`]: the static catalog of tables the SQL engine may touch
//! - [`sql`]: SQL candidates, bound parameters, and guardrail verdicts
//! - [`collaborator`]: narrow async contracts for every external system
//! - [`keywords`]: word-boundary phrase matching shared by the classifiers

pub mod action;
pub mod collaborator;
pub mod error;
pub mod event;
pub mod keywords;
pub mod message;
pub mod provider;
pub mod schema;
pub mod sql;
pub mod turn;

// Re-export key types at crate root for ergonomics
pub use action::{Action, ActionCandidate, CandidateSource, FallbackReason};
pub use collaborator::{
    ClassifiedIntent, IntentClassifier, MarketDataSource, NewsSource, ProcedureIndex,
    QueryExecutor, SqlGenerator, Summarizer,
};
pub use error::{
    Capability, CollaboratorError, DispatchError, DispatchErrorKind, Error, ProviderError, Result,
};
pub use event::{DomainEvent, EventBus};
pub use message::{Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
pub use schema::{ColumnDescriptor, JoinKey, SchemaDescriptor, SemanticType, TableDescriptor};
pub use sql::{GuardrailVerdict, RejectionReason, SqlCandidate, SqlOrigin, SqlParam};
pub use turn::{
    MarketQuote, NewsArticle, ProcedureSnippet, QueryRows, QuoteKind, RawResult, SessionId, Turn,
};
