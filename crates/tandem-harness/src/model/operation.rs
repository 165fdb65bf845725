//! Operations for model-based testing.
//!
//! Operations represent all externally triggerable actions in the system.
//! They are generated randomly (by proptest or a fuzzer) and applied to
//! both the model and the real engine.

use arbitrary::Arbitrary;
use tandem_core::{Event, ParticipantId, Payload};

/// Actor identifier (folded into a small participant space).
pub type ActorId = u8;

/// Number of distinct participants the operations are folded onto.
///
/// Small enough that random sequences produce plenty of interaction,
/// large enough to exercise multi-entry queues.
const NUM_ACTORS: u8 = 8;

/// Clean message text: accepted by the reference content policy.
pub(crate) const CLEAN_TEXT: &str = "hello";

/// Link-carrying message text: rejected by the reference content policy.
pub(crate) const LINK_TEXT: &str = "join me at http://blocked.example";

/// Operations that can be applied to the system.
#[derive(Debug, Clone, Arbitrary)]
pub enum Operation {
    /// Actor requests a match.
    RequestMatch {
        /// Actor performing the operation.
        actor: ActorId,
    },

    /// Actor skips the current partner.
    Skip {
        /// Actor performing the operation.
        actor: ActorId,
    },

    /// Actor ends the current session.
    Leave {
        /// Actor performing the operation.
        actor: ActorId,
    },

    /// Actor sends a message to its partner.
    SendMessage {
        /// Actor performing the operation.
        actor: ActorId,
        /// Whether the text passes the content policy.
        clean: bool,
    },
}

/// Fold an actor into the participant space.
pub(crate) fn participant(actor: ActorId) -> ParticipantId {
    // Offset by one so participant 0 never appears
    ParticipantId::from(actor % NUM_ACTORS) + 1
}

impl Operation {
    /// The participant this operation acts as.
    pub fn participant(&self) -> ParticipantId {
        match self {
            Self::RequestMatch { actor }
            | Self::Skip { actor }
            | Self::Leave { actor }
            | Self::SendMessage { actor, .. } => participant(*actor),
        }
    }

    /// The engine event this operation corresponds to.
    pub fn event(&self) -> Event {
        let id = self.participant();
        match self {
            Self::RequestMatch { .. } => Event::Start { participant: id },
            Self::Skip { .. } => Event::Skip { participant: id },
            Self::Leave { .. } => Event::End { participant: id },
            Self::SendMessage { clean, .. } => {
                let text = if *clean { CLEAN_TEXT } else { LINK_TEXT };
                Event::Message { participant: id, payload: Payload::Text(text.to_owned()) }
            },
        }
    }
}
