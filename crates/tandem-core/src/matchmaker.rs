//! Matchmaker: the externally triggered state transitions.
//!
//! Implements the per-participant state machine
//! `Idle → Waiting → Paired → Idle` (with a direct `Waiting → Idle` exit)
//! as three operations over the [`SessionStore`]. Each operation mutates
//! state first and returns the resulting notifications for the driver to
//! deliver afterwards — no I/O happens in here.
//!
//! Fairness: among all waiting participants, the one queued longest is
//! matched first. There is no ordering criterion beyond arrival time.

use crate::{
    error::EngineError,
    event::{Notification, NotificationBody},
    session::{ParticipantId, SessionState, SessionStore},
};

/// What `skip` does with the skipper after leaving a pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SkipBehavior {
    /// Immediately attempt a re-match: pair with the oldest waiting
    /// participant if any, otherwise enqueue.
    #[default]
    Rematch,

    /// Re-enter the back of the waiting queue without attempting a match.
    Requeue,
}

/// Queue discipline and pairing algorithm over the session store.
#[derive(Debug, Default)]
pub struct Matchmaker {
    store: SessionStore,
    skip_behavior: SkipBehavior,
}

impl Matchmaker {
    /// Create a matchmaker with the given skip behavior.
    pub fn new(skip_behavior: SkipBehavior) -> Self {
        Self { store: SessionStore::new(), skip_behavior }
    }

    /// Read-only view of the underlying store.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Pair the caller with the oldest waiting participant, or enqueue it.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyPaired` or `AlreadyWaiting` without any state change
    /// if the caller is not idle.
    pub fn request_match(
        &mut self,
        id: ParticipantId,
    ) -> Result<Vec<Notification>, EngineError> {
        match self.store.state_of(id) {
            SessionState::Paired(_) => Err(EngineError::AlreadyPaired { participant: id }),
            SessionState::Waiting => Err(EngineError::AlreadyWaiting { participant: id }),
            SessionState::Idle => {
                // An idle caller cannot be at the head of the queue; if it
                // somehow is, treat the queue as empty rather than self-pair.
                let partner = match self.store.dequeue_oldest() {
                    Some(p) if p != id => Some(p),
                    Some(_) | None => None,
                };

                match partner {
                    Some(partner) => {
                        self.store.pair(id, partner)?;
                        Ok(vec![
                            Notification::new(id, NotificationBody::Matched),
                            Notification::new(partner, NotificationBody::Matched),
                        ])
                    },
                    None => {
                        self.store.enqueue(id)?;
                        Ok(vec![Notification::new(id, NotificationBody::Waiting)])
                    },
                }
            },
        }
    }

    /// Leave the current pairing (if any) and re-enter matching.
    ///
    /// Valid from any state. A paired caller's partner is notified that the
    /// caller left and becomes idle; the caller then re-matches or re-queues
    /// per [`SkipBehavior`]. A waiting or idle caller behaves exactly as
    /// [`Matchmaker::request_match`].
    ///
    /// # Errors
    ///
    /// Returns `AlreadyWaiting` (no state change) if the caller was already
    /// queued.
    pub fn skip(&mut self, id: ParticipantId) -> Result<Vec<Notification>, EngineError> {
        let Some(partner) = self.store.unpair(id) else {
            return self.request_match(id);
        };

        let mut notifications = vec![
            Notification::new(partner, NotificationBody::PartnerLeft),
            Notification::new(id, NotificationBody::SearchingAgain),
        ];

        match self.skip_behavior {
            SkipBehavior::Rematch => notifications.extend(self.request_match(id)?),
            SkipBehavior::Requeue => {
                self.store.enqueue(id)?;
                notifications.push(Notification::new(id, NotificationBody::Waiting));
            },
        }

        Ok(notifications)
    }

    /// Leave the current pairing or the waiting queue, without re-entering.
    ///
    /// # Errors
    ///
    /// Returns `NotInSession` if the caller is idle (or was never seen).
    pub fn leave(&mut self, id: ParticipantId) -> Result<Vec<Notification>, EngineError> {
        if let Some(partner) = self.store.unpair(id) {
            return Ok(vec![
                Notification::new(partner, NotificationBody::PartnerEnded),
                Notification::new(id, NotificationBody::Ended),
            ]);
        }

        if self.store.leave_queue(id) {
            return Ok(vec![Notification::new(id, NotificationBody::LeftQueue)]);
        }

        Err(EngineError::NotInSession { participant: id })
    }
}
