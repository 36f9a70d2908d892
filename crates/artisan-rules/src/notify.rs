//! Outbound notifications: chat text, client error codes, and object sync.
//!
//! The rules core never talks to a network session directly. Everything
//! the actor or nearby observers should see is pushed through a
//! [`Notifier`], which the server layer turns into wire messages.

use artisan_types::{EntityId, WorldObject};

/// Chat channel a message is rendered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChatChannel {
    /// Crafting results and destroy messages.
    Craft,
    /// General broadcast text, including tinkering cascade rolls.
    Broadcast,
    /// System notices such as quest-item mutation results.
    System,
    /// Transient on-screen text.
    Transient,
}

/// Structured error codes sent to the client alongside chat text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeenieError {
    /// The actor is already performing an action.
    YoureTooBusy,
    /// The actor must leave combat mode first.
    YouMustBeInPeaceModeToTrade,
    /// A recipe requirement failed.
    YouDoNotPassCraftingRequirements,
    /// The recipe's skill is untrained.
    YouAreNotTrainedInThatTradeSkill,
    /// Generic crafting failure for data-integrity problems.
    CraftGeneralErrorUiMsg,
    /// A confirmation dialog is already open for this actor.
    ConfirmationInProgress,
}

/// One notification emitted during an attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// Text shown only to one actor.
    Tell {
        /// Recipient.
        to: EntityId,
        /// Channel.
        channel: ChatChannel,
        /// Message body.
        text: String,
    },
    /// Text shown to everyone within local range of `origin`.
    Nearby {
        /// Entity the broadcast radiates from.
        origin: EntityId,
        /// Channel.
        channel: ChatChannel,
        /// Message body.
        text: String,
    },
    /// Text shown to every online player.
    Everyone {
        /// Channel.
        channel: ChatChannel,
        /// Message body.
        text: String,
    },
    /// Structured client error for one actor.
    Error {
        /// Recipient.
        to: EntityId,
        /// Error code.
        error: WeenieError,
    },
    /// An object changed and observers need a fresh copy.
    ObjectUpdated {
        /// Guid of the changed object.
        id: EntityId,
    },
    /// A confirmation prompt with the given text.
    Confirm {
        /// Recipient.
        to: EntityId,
        /// Prompt body.
        text: String,
    },
}

/// Sink for everything the rules core wants the outside world to see.
pub trait Notifier: Send {
    /// Deliver one notice.
    fn notify(&mut self, notice: Notice);

    /// Send text to a single actor.
    fn tell(&mut self, to: EntityId, channel: ChatChannel, text: impl Into<String>)
    where
        Self: Sized,
    {
        self.notify(Notice::Tell {
            to,
            channel,
            text: text.into(),
        });
    }

    /// Send text to observers near `origin`.
    fn broadcast_nearby(&mut self, origin: EntityId, channel: ChatChannel, text: impl Into<String>)
    where
        Self: Sized,
    {
        self.notify(Notice::Nearby {
            origin,
            channel,
            text: text.into(),
        });
    }

    /// Send text to every online player.
    fn broadcast_all(&mut self, channel: ChatChannel, text: impl Into<String>)
    where
        Self: Sized,
    {
        self.notify(Notice::Everyone {
            channel,
            text: text.into(),
        });
    }
}

/// Convenience calls for `dyn Notifier`, which cannot use the generic
/// provided methods.
impl dyn Notifier + '_ {
    /// Send text to a single actor.
    pub fn send(&mut self, to: EntityId, channel: ChatChannel, text: impl Into<String>) {
        self.notify(Notice::Tell {
            to,
            channel,
            text: text.into(),
        });
    }

    /// Send text to observers near `origin`.
    pub fn send_nearby(&mut self, origin: EntityId, channel: ChatChannel, text: impl Into<String>) {
        self.notify(Notice::Nearby {
            origin,
            channel,
            text: text.into(),
        });
    }

    /// Send text to every online player.
    pub fn send_all(&mut self, channel: ChatChannel, text: impl Into<String>) {
        self.notify(Notice::Everyone {
            channel,
            text: text.into(),
        });
    }

    /// Send a structured client error.
    pub fn error(&mut self, to: EntityId, error: WeenieError) {
        self.notify(Notice::Error { to, error });
    }

    /// Tell observers that `object` changed.
    pub fn object_updated(&mut self, object: &WorldObject) {
        self.notify(Notice::ObjectUpdated { id: object.id });
    }
}

/// A [`Notifier`] that keeps every notice in memory.
///
/// Used by tests and by the demo binary to print a transcript.
#[derive(Debug, Default, Clone)]
pub struct NoticeLog {
    notices: Vec<Notice>,
}

impl NoticeLog {
    /// Create an empty log.
    pub const fn new() -> Self {
        Self {
            notices: Vec::new(),
        }
    }

    /// All recorded notices in delivery order.
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Take the recorded notices, leaving the log empty.
    pub fn drain(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Every chat body recorded, regardless of audience.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.notices.iter().filter_map(|notice| match notice {
            Notice::Tell { text, .. }
            | Notice::Nearby { text, .. }
            | Notice::Everyone { text, .. }
            | Notice::Confirm { text, .. } => Some(text.as_str()),
            Notice::Error { .. } | Notice::ObjectUpdated { .. } => None,
        })
    }

    /// Whether any chat body contains `needle`.
    pub fn mentions(&self, needle: &str) -> bool {
        self.texts().any(|text| text.contains(needle))
    }

    /// Client error codes recorded, in order.
    pub fn errors(&self) -> Vec<WeenieError> {
        self.notices
            .iter()
            .filter_map(|notice| match notice {
                Notice::Error { error, .. } => Some(*error),
                _ => None,
            })
            .collect()
    }

    /// Number of notices delivered to every online player.
    pub fn global_count(&self) -> usize {
        self.notices
            .iter()
            .filter(|notice| matches!(notice, Notice::Everyone { .. }))
            .count()
    }
}

impl Notifier for NoticeLog {
    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_records_in_order() {
        let mut log = NoticeLog::new();
        log.tell(EntityId(1), ChatChannel::Craft, "first");
        log.broadcast_all(ChatChannel::Broadcast, "second");
        let texts: Vec<&str> = log.texts().collect();
        assert_eq!(texts, vec!["first", "second"]);
        assert_eq!(log.global_count(), 1);
    }

    #[test]
    fn dyn_helpers_reach_the_sink() {
        let mut log = NoticeLog::new();
        {
            let sink: &mut dyn Notifier = &mut log;
            sink.error(EntityId(7), WeenieError::YoureTooBusy);
            sink.send_nearby(EntityId(7), ChatChannel::Craft, "nearby");
        }
        assert_eq!(log.errors(), vec![WeenieError::YoureTooBusy]);
        assert!(log.mentions("nearby"));
    }

    #[test]
    fn drain_empties_the_log() {
        let mut log = NoticeLog::new();
        log.tell(EntityId(1), ChatChannel::System, "x");
        assert_eq!(log.drain().len(), 1);
        assert!(log.notices().is_empty());
    }
}
