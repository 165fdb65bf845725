//! Engine error types.

use thiserror::Error;

use crate::{event::NotificationBody, session::ParticipantId};

/// Errors from engine operations.
///
/// Every variant is recoverable: the operation that produced it performed no
/// state mutation, and the error translates into a descriptive notification
/// for the originating participant via [`EngineError::notification_body`].
/// No engine error is ever fatal to the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Participant is already in an active session.
    #[error("participant {participant} is already in a session")]
    AlreadyPaired {
        /// The rejected participant.
        participant: ParticipantId,
    },

    /// Participant is already in the waiting queue.
    #[error("participant {participant} is already waiting for a match")]
    AlreadyWaiting {
        /// The rejected participant.
        participant: ParticipantId,
    },

    /// Participant is neither paired nor waiting.
    ///
    /// Unknown participants land here too: a never-seen ID is
    /// indistinguishable from an idle one.
    #[error("participant {participant} is not in a session")]
    NotInSession {
        /// The rejected participant.
        participant: ParticipantId,
    },

    /// The content policy refused the payload; nothing was forwarded.
    #[error("payload rejected by content policy")]
    ContentRejected,

    /// Attempted to pair a participant with itself.
    #[error("cannot pair participant {participant} with itself")]
    SelfPair {
        /// The offending participant.
        participant: ParticipantId,
    },
}

impl EngineError {
    /// The notification body reported back to the participant whose
    /// operation was rejected.
    pub fn notification_body(&self) -> NotificationBody {
        match self {
            Self::AlreadyPaired { .. } | Self::SelfPair { .. } => NotificationBody::AlreadyPaired,
            Self::AlreadyWaiting { .. } => NotificationBody::StillWaiting,
            Self::NotInSession { .. } => NotificationBody::NotInSession,
            Self::ContentRejected => NotificationBody::PayloadRejected,
        }
    }
}
