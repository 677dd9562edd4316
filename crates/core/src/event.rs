//! Domain event system: decoupled observation of turns.
//!
//! The orchestrator and dispatcher publish events as a turn progresses.
//! Subscribers (the CLI's verbose output, tests) react without coupling
//! to the pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::action::{Action, CandidateSource, FallbackReason};
use crate::error::Capability;
use crate::sql::RejectionReason;

/// All domain events in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DomainEvent {
    /// The router picked an action
    TurnRouted {
        session_id: String,
        action: Action,
        source: CandidateSource,
        fallback: Option<FallbackReason>,
        timestamp: DateTime<Utc>,
    },

    /// An action finished dispatching
    ActionDispatched {
        action: Action,
        success: bool,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },

    /// The guardrail refused a statement
    GuardrailRejected {
        reason: RejectionReason,
        timestamp: DateTime<Utc>,
    },

    /// An external call failed or timed out
    CollaboratorFailed {
        capability: Capability,
        error_message: String,
        timestamp: DateTime<Utc>,
    },

    /// A turn reached DONE
    TurnCompleted {
        session_id: String,
        action: Action,
        succeeded: bool,
        recorded: bool,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for domain events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
pub struct EventBus {
    sender: broadcast::Sender<Arc<DomainEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: DomainEvent) {
        // No subscribers is fine
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DomainEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
