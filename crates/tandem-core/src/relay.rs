//! Relay: forwards a payload from a paired participant to its partner.
//!
//! Content acceptability is an external policy supplied through the
//! [`ContentPolicy`] trait. The relay applies the policy, forwards accepted
//! payloads verbatim, and never stores payload content.

use crate::{
    error::EngineError,
    event::{Notification, NotificationBody, Payload},
    session::{ParticipantId, SessionState, SessionStore},
};

/// Acceptability predicate for relayed payloads.
///
/// Supplied by the surrounding policy layer; the relay treats it as a black
/// box. Implementations must be pure — the relay may call them while the
/// engine's critical section is held.
pub trait ContentPolicy {
    /// Whether `payload` may be forwarded to a partner.
    fn is_acceptable(&self, payload: &Payload) -> bool;
}

/// Text fragments that mark a payload as carrying a link.
const BLOCKED_FRAGMENTS: [&str; 4] = ["http://", "https://", "t.me", "www."];

/// Reference policy: plain text only, no links.
///
/// Rejects any text containing an http(s) URL or a messaging-app link and
/// all non-text payloads; accepts everything else.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkFilter;

impl ContentPolicy for LinkFilter {
    fn is_acceptable(&self, payload: &Payload) -> bool {
        match payload {
            Payload::Text(text) => !BLOCKED_FRAGMENTS.iter().any(|f| text.contains(f)),
            Payload::Binary(_) => false,
        }
    }
}

/// Forwards payloads between paired partners after a policy check.
#[derive(Debug, Default)]
pub struct Relay<P> {
    policy: P,
}

impl<P: ContentPolicy> Relay<P> {
    /// Create a relay using the given content policy.
    pub fn new(policy: P) -> Self {
        Self { policy }
    }

    /// Forward `payload` from `sender` to its partner.
    ///
    /// # Errors
    ///
    /// Returns `NotInSession` if `sender` is not paired, or
    /// `ContentRejected` if the policy refuses the payload. In the rejected
    /// case only the sender is informed; the partner never learns a payload
    /// existed.
    pub fn relay(
        &self,
        store: &SessionStore,
        sender: ParticipantId,
        payload: Payload,
    ) -> Result<Vec<Notification>, EngineError> {
        let SessionState::Paired(partner) = store.state_of(sender) else {
            return Err(EngineError::NotInSession { participant: sender });
        };

        if !self.policy.is_acceptable(&payload) {
            tracing::debug!(sender, "payload rejected by policy");
            return Err(EngineError::ContentRejected);
        }

        Ok(vec![Notification::new(partner, NotificationBody::Message(payload))])
    }
}
