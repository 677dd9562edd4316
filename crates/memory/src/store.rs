//! Per-session memory ownership.

use sahayak_core::{SessionId, Turn};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tracing::debug;

use crate::session::SessionMemory;

/// One session's memory plus its open/closed state.
///
/// The mutex serializes turns within the session; sessions never share a
/// slot.
#[derive(Debug)]
pub struct SessionSlot {
    id: SessionId,
    memory: Mutex<SessionMemory>,
    closed: AtomicBool,
}

impl SessionSlot {
    fn new(id: SessionId, capacity: usize) -> Self {
        Self {
            id,
            memory: Mutex::new(SessionMemory::new(capacity)),
            closed: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Exclusive access to the memory for the duration of one turn.
    pub async fn lock(&self) -> MutexGuard<'_, SessionMemory> {
        self.memory.lock().await
    }

    /// True once the session was closed; results for it must be discarded.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}

/// All live sessions of the process.
pub struct SessionStore {
    capacity: usize,
    sessions: RwLock<HashMap<SessionId, Arc<SessionSlot>>>,
}

impl SessionStore {
    /// `capacity` is the turn capacity of each new session.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// The slot for `id`, created empty on first use.
    pub async fn open(&self, id: &SessionId) -> Arc<SessionSlot> {
        if let Some(slot) = self.sessions.read().await.get(id) {
            return Arc::clone(slot);
        }
        let mut sessions = self.sessions.write().await;
        let slot = sessions.entry(id.clone()).or_insert_with(|| {
            debug!(session_id = %id, "Opening session");
            Arc::new(SessionSlot::new(id.clone(), self.capacity))
        });
        Arc::clone(slot)
    }

    pub async fn get(&self, id: &SessionId) -> Option<Arc<SessionSlot>> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Destroy a session's memory. In-flight turns holding the slot will
    /// see it closed and drop their result. Returns false if unknown.
    pub async fn close(&self, id: &SessionId) -> bool {
        match self.sessions.write().await.remove(id) {
            Some(slot) => {
                slot.close();
                debug!(session_id = %id, "Closed session");
                true
            }
            None => false,
        }
    }

    /// Copy of a session's turns, oldest first.
    pub async fn snapshot(&self, id: &SessionId) -> Option<Vec<Turn>> {
        let slot = self.get(id).await?;
        let memory = slot.lock().await;
        Some(memory.iter().cloned().collect())
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(SessionMemory::DEFAULT_CAPACITY)
    }
}
