//! Bounded FIFO log of recent turns.

use sahayak_core::Turn;
use std::collections::VecDeque;

/// The last `capacity` turns of one session, oldest first.
///
/// Inserting past capacity evicts the oldest turn. There is no other
/// eviction policy.
#[derive(Debug, Clone)]
pub struct SessionMemory {
    capacity: usize,
    turns: VecDeque<Turn>,
}

impl SessionMemory {
    pub const DEFAULT_CAPACITY: usize = 5;

    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            turns: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a turn, returning the evicted one if capacity was exceeded.
    pub fn record(&mut self, turn: Turn) -> Option<Turn> {
        let evicted = if self.turns.len() == self.capacity {
            self.turns.pop_front()
        } else {
            None
        };
        self.turns.push_back(turn);
        evicted
    }

    /// The most recent `k` turns, oldest first.
    pub fn recent(&self, k: usize) -> Vec<Turn> {
        let skip = self.turns.len().saturating_sub(k);
        self.turns.iter().skip(skip).cloned().collect()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

impl Default for SessionMemory {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sahayak_core::Action;

    fn turn(query: &str) -> Turn {
        Turn {
            query: query.into(),
            chosen_action: Action::DatabaseQuery,
            action_argument: query.into(),
            raw_result: None,
            final_response: format!("answer to {query}"),
            timestamp: Utc::now(),
        }
    }

    fn queries(memory: &SessionMemory) -> Vec<String> {
        memory.iter().map(|t| t.query.clone()).collect()
    }

    #[test]
    fn overflow_evicts_oldest_first() {
        let mut memory = SessionMemory::new(3);
        for q in ["q1", "q2", "q3"] {
            assert!(memory.record(turn(q)).is_none());
        }
        let evicted = memory.record(turn("q4")).unwrap();
        assert_eq!(evicted.query, "q1");
        assert_eq!(queries(&memory), vec!["q2", "q3", "q4"]);
    }

    #[test]
    fn n_plus_one_inserts_keep_exactly_n_most_recent() {
        let n = SessionMemory::DEFAULT_CAPACITY;
        let mut memory = SessionMemory::default();
        for i in 0..=n {
            memory.record(turn(&format!("q{i}")));
        }
        assert_eq!(memory.len(), n);
        let expected: Vec<String> = (1..=n).map(|i| format!("q{i}")).collect();
        assert_eq!(queries(&memory), expected);
    }

    #[test]
    fn recent_returns_tail_oldest_first() {
        let mut memory = SessionMemory::new(5);
        for q in ["a", "b", "c", "d"] {
            memory.record(turn(q));
        }
        let recent: Vec<String> = memory.recent(2).into_iter().map(|t| t.query).collect();
        assert_eq!(recent, vec!["c", "d"]);
        assert_eq!(memory.recent(10).len(), 4);
        assert!(memory.recent(0).is_empty());
        assert_eq!(memory.last().unwrap().query, "d");
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let mut memory = SessionMemory::new(0);
        memory.record(turn("a"));
        memory.record(turn("b"));
        assert_eq!(memory.capacity(), 1);
        assert_eq!(queries(&memory), vec!["b"]);
    }
}
