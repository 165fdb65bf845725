//! Session store: the single source of truth for participant state.
//!
//! All reads and writes to the waiting queue and the active-pairing table go
//! through [`SessionStore`] so its invariants are enforced in one place:
//!
//! - A participant is never simultaneously waiting and paired
//! - The pairing table is symmetric: (a → b) exists iff (b → a) exists
//! - The waiting queue holds no duplicates
//!
//! A participant's [`SessionState`] is fully derived from queue and table
//! membership; there is no separate per-participant record to drift out of
//! sync.

use std::collections::{HashMap, VecDeque};

use crate::error::EngineError;

/// Opaque participant handle supplied by the surrounding transport.
pub type ParticipantId = u64;

/// Where a participant currently stands in the matchmaking lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Never queued, or left a pairing or the queue.
    Idle,

    /// Enqueued, no partner yet.
    Waiting,

    /// Actively paired; the partner is `Paired` with this participant.
    Paired(ParticipantId),
}

/// Waiting queue plus active-pairing table behind one mutation API.
#[derive(Debug, Default)]
pub struct SessionStore {
    /// FIFO queue of participants seeking a pairing. No duplicates.
    waiting: VecDeque<ParticipantId>,
    /// Symmetric partner mapping. Every entry (a → b) has a twin (b → a).
    pairs: HashMap<ParticipantId, ParticipantId>,
}

impl SessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self { waiting: VecDeque::new(), pairs: HashMap::new() }
    }

    /// Current state of a participant. Pure lookup, no side effect.
    pub fn state_of(&self, id: ParticipantId) -> SessionState {
        if let Some(&partner) = self.pairs.get(&id) {
            SessionState::Paired(partner)
        } else if self.waiting.contains(&id) {
            SessionState::Waiting
        } else {
            SessionState::Idle
        }
    }

    /// Append `id` to the waiting queue.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyWaiting` or `AlreadyPaired` without mutating if `id`
    /// is not idle.
    pub fn enqueue(&mut self, id: ParticipantId) -> Result<(), EngineError> {
        match self.state_of(id) {
            SessionState::Paired(_) => Err(EngineError::AlreadyPaired { participant: id }),
            SessionState::Waiting => Err(EngineError::AlreadyWaiting { participant: id }),
            SessionState::Idle => {
                self.waiting.push_back(id);
                tracing::trace!(id, "enqueued");
                Ok(())
            },
        }
    }

    /// Pop the oldest waiting participant, if any.
    ///
    /// The popped participant's state is transiently `Idle`; the caller is
    /// expected to pair it immediately.
    pub fn dequeue_oldest(&mut self) -> Option<ParticipantId> {
        self.waiting.pop_front()
    }

    /// Insert the symmetric pairing (a ↔ b), removing both from the queue.
    ///
    /// # Errors
    ///
    /// Returns `SelfPair` if `a == b`, or `AlreadyPaired` if either side is
    /// already in the table. Nothing is mutated on error.
    pub fn pair(&mut self, a: ParticipantId, b: ParticipantId) -> Result<(), EngineError> {
        if a == b {
            return Err(EngineError::SelfPair { participant: a });
        }
        if self.pairs.contains_key(&a) {
            return Err(EngineError::AlreadyPaired { participant: a });
        }
        if self.pairs.contains_key(&b) {
            return Err(EngineError::AlreadyPaired { participant: b });
        }

        self.waiting.retain(|&w| w != a && w != b);
        self.pairs.insert(a, b);
        self.pairs.insert(b, a);
        tracing::debug!(a, b, "paired");
        Ok(())
    }

    /// Remove the pairing containing `id`, both directions at once.
    ///
    /// Returns the former partner, or `None` if `id` was not paired.
    pub fn unpair(&mut self, id: ParticipantId) -> Option<ParticipantId> {
        let partner = self.pairs.remove(&id)?;
        self.pairs.remove(&partner);
        tracing::debug!(id, partner, "unpaired");
        Some(partner)
    }

    /// Remove `id` from the waiting queue. Returns whether it was present.
    pub fn leave_queue(&mut self, id: ParticipantId) -> bool {
        let before = self.waiting.len();
        self.waiting.retain(|&w| w != id);
        before != self.waiting.len()
    }

    /// Number of participants currently waiting.
    pub fn count_waiting(&self) -> usize {
        self.waiting.len()
    }

    /// Number of active pairs (half the table size).
    pub fn count_active_pairs(&self) -> usize {
        self.pairs.len() / 2
    }

    /// Waiting participants in FIFO order. Read-only snapshot for reporting
    /// and tests.
    pub fn waiting(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        self.waiting.iter().copied()
    }

    /// All pairing-table entries, one per direction. Read-only.
    pub fn pairings(&self) -> impl Iterator<Item = (ParticipantId, ParticipantId)> + '_ {
        self.pairs.iter().map(|(&a, &b)| (a, b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_store_is_empty() {
        let store = SessionStore::new();
        assert_eq!(store.count_waiting(), 0);
        assert_eq!(store.count_active_pairs(), 0);
        assert_eq!(store.state_of(1), SessionState::Idle);
    }

    #[test]
    fn enqueue_sets_waiting_state() {
        let mut store = SessionStore::new();
        store.enqueue(1).unwrap();
        assert_eq!(store.state_of(1), SessionState::Waiting);
        assert_eq!(store.count_waiting(), 1);
    }

    #[test]
    fn enqueue_rejects_duplicate() {
        let mut store = SessionStore::new();
        store.enqueue(1).unwrap();
        let result = store.enqueue(1);
        assert!(matches!(result, Err(EngineError::AlreadyWaiting { participant: 1 })));
        assert_eq!(store.count_waiting(), 1);
    }

    #[test]
    fn enqueue_rejects_paired_participant() {
        let mut store = SessionStore::new();
        store.pair(1, 2).unwrap();
        let result = store.enqueue(1);
        assert!(matches!(result, Err(EngineError::AlreadyPaired { participant: 1 })));
    }

    #[test]
    fn pair_is_symmetric() {
        let mut store = SessionStore::new();
        store.pair(1, 2).unwrap();
        assert_eq!(store.state_of(1), SessionState::Paired(2));
        assert_eq!(store.state_of(2), SessionState::Paired(1));
        assert_eq!(store.count_active_pairs(), 1);
    }

    #[test]
    fn pair_rejects_self() {
        let mut store = SessionStore::new();
        let result = store.pair(1, 1);
        assert!(matches!(result, Err(EngineError::SelfPair { participant: 1 })));
        assert_eq!(store.count_active_pairs(), 0);
    }

    #[test]
    fn pair_rejects_already_paired_operand() {
        let mut store = SessionStore::new();
        store.pair(1, 2).unwrap();
        assert!(store.pair(1, 3).is_err());
        assert!(store.pair(3, 2).is_err());
        // Original pairing untouched
        assert_eq!(store.state_of(1), SessionState::Paired(2));
    }

    #[test]
    fn pair_removes_both_sides_from_queue() {
        let mut store = SessionStore::new();
        store.enqueue(1).unwrap();
        store.enqueue(2).unwrap();
        store.pair(1, 2).unwrap();
        assert_eq!(store.count_waiting(), 0);
        assert_eq!(store.state_of(1), SessionState::Paired(2));
    }

    #[test]
    fn unpair_removes_both_directions() {
        let mut store = SessionStore::new();
        store.pair(1, 2).unwrap();
        assert_eq!(store.unpair(1), Some(2));
        assert_eq!(store.state_of(1), SessionState::Idle);
        assert_eq!(store.state_of(2), SessionState::Idle);
        assert_eq!(store.count_active_pairs(), 0);
    }

    #[test]
    fn unpair_idle_returns_none() {
        let mut store = SessionStore::new();
        assert_eq!(store.unpair(9), None);
    }

    #[test]
    fn dequeue_is_fifo() {
        let mut store = SessionStore::new();
        store.enqueue(1).unwrap();
        store.enqueue(2).unwrap();
        store.enqueue(3).unwrap();
        assert_eq!(store.dequeue_oldest(), Some(1));
        assert_eq!(store.dequeue_oldest(), Some(2));
        assert_eq!(store.dequeue_oldest(), Some(3));
        assert_eq!(store.dequeue_oldest(), None);
    }

    #[test]
    fn leave_queue_reports_presence() {
        let mut store = SessionStore::new();
        store.enqueue(1).unwrap();
        assert!(store.leave_queue(1));
        assert!(!store.leave_queue(1));
        assert_eq!(store.state_of(1), SessionState::Idle);
    }
}
