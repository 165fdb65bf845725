//! Boundary types between the engine and the surrounding transport.
//!
//! The transport produces [`Event`]s from whatever wire protocol it speaks
//! and consumes [`Notification`]s for delivery. The engine never performs
//! I/O itself: every externally visible effect of an operation is returned
//! as a notification after the state mutation has committed.

use crate::session::ParticipantId;

/// Inbound event, tagged with the participant it originates from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Request a match (queue up or pair with the oldest waiting entry).
    Start {
        /// Originating participant.
        participant: ParticipantId,
    },

    /// Skip the current partner and search again.
    Skip {
        /// Originating participant.
        participant: ParticipantId,
    },

    /// End the current session without re-entering matching.
    End {
        /// Originating participant.
        participant: ParticipantId,
    },

    /// Send a chat payload to the current partner.
    Message {
        /// Originating participant.
        participant: ParticipantId,
        /// Payload to relay.
        payload: Payload,
    },
}

impl Event {
    /// The participant this event originates from.
    pub fn participant(&self) -> ParticipantId {
        match self {
            Self::Start { participant }
            | Self::Skip { participant }
            | Self::End { participant }
            | Self::Message { participant, .. } => *participant,
        }
    }
}

/// Message content carried through the relay.
///
/// The relay forwards accepted payloads verbatim and never stores them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Plain text message.
    Text(String),

    /// Any non-text content (media, stickers, raw bytes).
    ///
    /// The reference content policy rejects these outright.
    Binary(Vec<u8>),
}

/// Outbound notification for the transport to deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Participant the notification is addressed to.
    pub recipient: ParticipantId,
    /// What happened.
    pub body: NotificationBody,
}

impl Notification {
    /// Create a notification addressed to `recipient`.
    pub fn new(recipient: ParticipantId, body: NotificationBody) -> Self {
        Self { recipient, body }
    }
}

/// The kinds of notification the engine emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationBody {
    /// A partner was found; the session is now active.
    Matched,

    /// No partner available; the participant was enqueued.
    Waiting,

    /// The participant left its session via skip and is matching again.
    SearchingAgain,

    /// The partner skipped away; the recipient is idle again.
    PartnerLeft,

    /// The partner ended the session cleanly.
    PartnerEnded,

    /// The recipient's own session ended cleanly.
    Ended,

    /// The recipient was removed from the waiting queue.
    LeftQueue,

    /// Rejected: the recipient is already in an active session.
    AlreadyPaired,

    /// Rejected: the recipient is already waiting for a match.
    StillWaiting,

    /// Rejected: the recipient is neither paired nor waiting.
    NotInSession,

    /// Rejected by the content policy; the partner was not informed.
    PayloadRejected,

    /// A payload relayed from the recipient's partner, verbatim.
    Message(Payload),
}
