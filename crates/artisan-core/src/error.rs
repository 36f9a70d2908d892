//! Error types for the artisan-core crate.

use artisan_rules::{CraftError, WeenieError};
use artisan_types::EntityId;

/// Errors that stop an attempt inside the action pipeline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    /// A use-item action is already running on this actor.
    #[error("actor {actor} is busy")]
    Busy {
        /// The busy actor.
        actor: EntityId,
    },

    /// A confirmation dialog is already open for this actor.
    #[error("actor {actor} already has a confirmation open")]
    ConfirmationInProgress {
        /// The actor with the open dialog.
        actor: EntityId,
    },

    /// The actor answered the confirmation with no.
    #[error("actor {actor} declined the attempt")]
    Declined {
        /// The declining actor.
        actor: EntityId,
    },

    /// The confirmation was withdrawn before an answer arrived.
    #[error("confirmation for actor {actor} was cancelled")]
    Cancelled {
        /// The actor whose dialog was withdrawn.
        actor: EntityId,
    },

    /// No answer arrived before the confirmation timeout.
    #[error("confirmation for actor {actor} timed out")]
    TimedOut {
        /// The actor who never answered.
        actor: EntityId,
    },

    /// The actor's queue task has stopped.
    #[error("actor queue is closed")]
    QueueClosed,

    /// The rules core rejected or aborted the attempt.
    #[error(transparent)]
    Craft(#[from] CraftError),
}

impl PipelineError {
    /// The client error code that accompanies this failure, if any.
    pub const fn client_error(&self) -> Option<WeenieError> {
        match self {
            Self::Busy { .. } => Some(WeenieError::YoureTooBusy),
            Self::ConfirmationInProgress { .. } => Some(WeenieError::ConfirmationInProgress),
            Self::Craft(error) => error.client_error(),
            Self::Declined { .. }
            | Self::Cancelled { .. }
            | Self::TimedOut { .. }
            | Self::QueueClosed => None,
        }
    }

    /// Whether the attempt ended without touching any object.
    pub const fn is_abort(&self) -> bool {
        !matches!(self, Self::Craft(_) | Self::QueueClosed)
    }
}
