//! Engine: event dispatch over matchmaker and relay.
//!
//! The engine is the single entry point the transport talks to. It routes
//! inbound events to the matchmaker or the relay, maintains the append-only
//! set of every participant ever observed, and translates recoverable
//! errors into notifications for the originating participant.
//!
//! [`Engine::handle`] is total: it always returns the notifications to
//! deliver and never fails. The caller is expected to serialize calls (one
//! mutex or one sequential task); the engine itself holds no locks.

use std::collections::HashSet;

use crate::{
    event::{Event, Notification},
    matchmaker::{Matchmaker, SkipBehavior},
    relay::{ContentPolicy, LinkFilter, Relay},
    session::{ParticipantId, SessionState, SessionStore},
};

/// Engine configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineConfig {
    /// What `skip` does with the skipper after leaving a pairing.
    pub skip_behavior: SkipBehavior,
}

/// Matchmaking/session engine: dispatcher, matchmaker, relay, known set.
#[derive(Debug)]
pub struct Engine<P = LinkFilter> {
    matchmaker: Matchmaker,
    relay: Relay<P>,
    /// Every participant ever observed. Append-only; used for
    /// population-wide reporting and broadcast, carries no state invariant.
    known: HashSet<ParticipantId>,
}

impl Engine<LinkFilter> {
    /// Create an engine with the reference link-blocking content policy.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_policy(config, LinkFilter)
    }
}

impl<P: ContentPolicy> Engine<P> {
    /// Create an engine with a caller-supplied content policy.
    pub fn with_policy(config: EngineConfig, policy: P) -> Self {
        Self {
            matchmaker: Matchmaker::new(config.skip_behavior),
            relay: Relay::new(policy),
            known: HashSet::new(),
        }
    }

    /// Process one inbound event and return the notifications to deliver.
    ///
    /// State mutation completes before this returns; delivery failures
    /// downstream must not be fed back as rollbacks. Rejected operations
    /// (already in a session, not in a session, payload refused) produce a
    /// notification to the originating participant instead of an error.
    pub fn handle(&mut self, event: Event) -> Vec<Notification> {
        let participant = event.participant();
        self.known.insert(participant);

        let result = match event {
            Event::Start { participant } => self.matchmaker.request_match(participant),
            Event::Skip { participant } => self.matchmaker.skip(participant),
            Event::End { participant } => self.matchmaker.leave(participant),
            Event::Message { participant, payload } => {
                self.relay.relay(self.matchmaker.store(), participant, payload)
            },
        };

        match result {
            Ok(notifications) => notifications,
            Err(error) => {
                tracing::debug!(participant, %error, "operation rejected");
                vec![Notification::new(participant, error.notification_body())]
            },
        }
    }

    /// Current state of a participant.
    pub fn state_of(&self, id: ParticipantId) -> SessionState {
        self.matchmaker.store().state_of(id)
    }

    /// Read-only view of the session store, for reporting and tests.
    pub fn store(&self) -> &SessionStore {
        self.matchmaker.store()
    }

    /// Number of participants ever observed.
    pub fn count_all(&self) -> usize {
        self.known.len()
    }

    /// Number of active pairs.
    pub fn count_active_pairs(&self) -> usize {
        self.matchmaker.store().count_active_pairs()
    }

    /// Number of participants currently waiting.
    pub fn count_waiting(&self) -> usize {
        self.matchmaker.store().count_waiting()
    }

    /// Every participant ever observed, in no particular order.
    pub fn known_participants(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        self.known.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{NotificationBody, Payload};

    #[test]
    fn handle_records_known_participants() {
        let mut engine = Engine::new(EngineConfig::default());
        engine.handle(Event::Start { participant: 1 });
        engine.handle(Event::End { participant: 2 });
        assert_eq!(engine.count_all(), 2);

        // Repeat observation does not grow the set
        engine.handle(Event::Start { participant: 1 });
        assert_eq!(engine.count_all(), 2);
    }

    #[test]
    fn rejected_operation_notifies_caller_only() {
        let mut engine = Engine::new(EngineConfig::default());
        let notifications = engine.handle(Event::Message {
            participant: 5,
            payload: Payload::Text("hello".into()),
        });

        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].recipient, 5);
        assert_eq!(notifications[0].body, NotificationBody::NotInSession);
    }
}
