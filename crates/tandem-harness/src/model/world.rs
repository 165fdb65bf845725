//! Model world - the reference implementation.
//!
//! Tracks the same externally visible behavior as the engine with the most
//! direct data layout possible: a waiting list, a partner dictionary, and a
//! set of everyone ever seen. Applying an operation returns exactly the
//! notifications the engine is expected to emit.

use std::collections::{BTreeSet, HashMap};

use tandem_core::{
    ContentPolicy, Engine, LinkFilter, Notification, NotificationBody, ParticipantId, Payload,
    SkipBehavior,
};

use super::operation::{CLEAN_TEXT, LINK_TEXT, Operation};

/// Observable state for oracle comparison.
///
/// This is the subset of world state that can be compared against the real
/// engine: pairings are normalized to (low, high) tuples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservableState {
    /// Waiting participants in FIFO order.
    pub waiting: Vec<ParticipantId>,
    /// Active pairs, one normalized entry per pair.
    pub pairs: BTreeSet<(ParticipantId, ParticipantId)>,
    /// Every participant ever observed.
    pub known: BTreeSet<ParticipantId>,
}

impl ObservableState {
    /// Extract the observable state of a real engine.
    pub fn of_engine<P: ContentPolicy>(engine: &Engine<P>) -> Self {
        let waiting = engine.store().waiting().collect();
        let pairs = engine
            .store()
            .pairings()
            .map(|(a, b)| (a.min(b), a.max(b)))
            .collect();
        let known = engine.known_participants().collect();

        Self { waiting, pairs, known }
    }
}

/// Reference model of the matchmaking engine.
#[derive(Debug, Clone)]
pub struct ModelWorld {
    waiting: Vec<ParticipantId>,
    chats: HashMap<ParticipantId, ParticipantId>,
    known: BTreeSet<ParticipantId>,
    skip_behavior: SkipBehavior,
}

impl ModelWorld {
    /// Create an empty model with the given skip behavior.
    pub fn new(skip_behavior: SkipBehavior) -> Self {
        Self {
            waiting: Vec::new(),
            chats: HashMap::new(),
            known: BTreeSet::new(),
            skip_behavior,
        }
    }

    /// Apply an operation and return the expected notifications.
    pub fn apply(&mut self, op: &Operation) -> Vec<Notification> {
        let id = op.participant();
        self.known.insert(id);

        match op {
            Operation::RequestMatch { .. } => self.request_match(id),
            Operation::Skip { .. } => self.skip(id),
            Operation::Leave { .. } => self.leave(id),
            Operation::SendMessage { clean, .. } => self.send_message(id, *clean),
        }
    }

    /// Extract the observable state for comparison.
    pub fn observable_state(&self) -> ObservableState {
        let pairs = self.chats.iter().map(|(&a, &b)| (a.min(b), a.max(b))).collect();

        ObservableState {
            waiting: self.waiting.clone(),
            pairs,
            known: self.known.clone(),
        }
    }

    fn request_match(&mut self, id: ParticipantId) -> Vec<Notification> {
        if self.chats.contains_key(&id) {
            return vec![Notification::new(id, NotificationBody::AlreadyPaired)];
        }
        if self.waiting.contains(&id) {
            return vec![Notification::new(id, NotificationBody::StillWaiting)];
        }

        if self.waiting.is_empty() {
            self.waiting.push(id);
            vec![Notification::new(id, NotificationBody::Waiting)]
        } else {
            let partner = self.waiting.remove(0);
            self.chats.insert(id, partner);
            self.chats.insert(partner, id);
            vec![
                Notification::new(id, NotificationBody::Matched),
                Notification::new(partner, NotificationBody::Matched),
            ]
        }
    }

    fn skip(&mut self, id: ParticipantId) -> Vec<Notification> {
        let Some(partner) = self.chats.remove(&id) else {
            return self.request_match(id);
        };
        self.chats.remove(&partner);

        let mut notifications = vec![
            Notification::new(partner, NotificationBody::PartnerLeft),
            Notification::new(id, NotificationBody::SearchingAgain),
        ];

        match self.skip_behavior {
            SkipBehavior::Rematch => notifications.extend(self.request_match(id)),
            SkipBehavior::Requeue => {
                self.waiting.push(id);
                notifications.push(Notification::new(id, NotificationBody::Waiting));
            },
        }

        notifications
    }

    fn leave(&mut self, id: ParticipantId) -> Vec<Notification> {
        if let Some(partner) = self.chats.remove(&id) {
            self.chats.remove(&partner);
            return vec![
                Notification::new(partner, NotificationBody::PartnerEnded),
                Notification::new(id, NotificationBody::Ended),
            ];
        }

        if let Some(pos) = self.waiting.iter().position(|&w| w == id) {
            self.waiting.remove(pos);
            return vec![Notification::new(id, NotificationBody::LeftQueue)];
        }

        vec![Notification::new(id, NotificationBody::NotInSession)]
    }

    fn send_message(&mut self, id: ParticipantId, clean: bool) -> Vec<Notification> {
        let Some(&partner) = self.chats.get(&id) else {
            return vec![Notification::new(id, NotificationBody::NotInSession)];
        };

        if clean {
            let payload = Payload::Text(CLEAN_TEXT.to_owned());
            vec![Notification::new(partner, NotificationBody::Message(payload))]
        } else {
            // The reference policy must agree that the link text is dirty
            debug_assert!(!LinkFilter.is_acceptable(&Payload::Text(LINK_TEXT.to_owned())));
            vec![Notification::new(id, NotificationBody::PayloadRejected)]
        }
    }
}
