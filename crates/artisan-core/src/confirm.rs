//! Confirmation dialogs that suspend an attempt until the actor answers.
//!
//! Each actor has at most one open dialog. Opening a second one while the
//! first is unanswered fails with
//! [`PipelineError::ConfirmationInProgress`]; nothing is queued. A dialog
//! ends when the actor answers, when it is cancelled, or when the timeout
//! elapses. Only an acceptance lets the attempt continue.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use artisan_rules::{Notice, Notifier};
use artisan_types::{AttemptId, EntityId};
use chrono::{DateTime, Utc};
use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::error::PipelineError;

/// The actor's answer to a dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// Go ahead.
    Accept,
    /// Abort the attempt.
    Decline,
}

#[derive(Debug)]
struct Pending {
    attempt: AttemptId,
    opened_at: DateTime<Utc>,
    reply: oneshot::Sender<Reply>,
}

/// An open dialog, consumed by [`ConfirmationManager::wait`].
#[derive(Debug)]
pub struct Ticket {
    actor: EntityId,
    attempt: AttemptId,
    rx: oneshot::Receiver<Reply>,
}

impl Ticket {
    /// The attempt waiting on this dialog.
    pub const fn attempt(&self) -> AttemptId {
        self.attempt
    }
}

/// Tracks the open dialog of every actor.
#[derive(Debug, Default)]
pub struct ConfirmationManager {
    pending: Mutex<HashMap<EntityId, Pending>>,
}

impl ConfirmationManager {
    /// A manager with no open dialogs.
    pub fn new() -> Self {
        Self::default()
    }

    fn pending(&self) -> MutexGuard<'_, HashMap<EntityId, Pending>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // -----------------------------------------------------------------------
    // Opening
    // -----------------------------------------------------------------------

    /// Open a dialog for `actor` and show it the prompt.
    pub fn request(
        &self,
        actor: EntityId,
        attempt: AttemptId,
        text: String,
        notifier: &mut dyn Notifier,
    ) -> Result<Ticket, PipelineError> {
        let (reply, rx) = oneshot::channel();
        {
            let mut pending = self.pending();
            if pending.contains_key(&actor) {
                return Err(PipelineError::ConfirmationInProgress { actor });
            }
            pending.insert(
                actor,
                Pending {
                    attempt,
                    opened_at: Utc::now(),
                    reply,
                },
            );
        }
        debug!(%actor, %attempt, "confirmation opened");
        notifier.notify(Notice::Confirm { to: actor, text });
        Ok(Ticket { actor, attempt, rx })
    }

    /// Whether `actor` has an unanswered dialog.
    pub fn is_pending(&self, actor: EntityId) -> bool {
        self.pending().contains_key(&actor)
    }

    /// When the actor's open dialog was shown.
    pub fn opened_at(&self, actor: EntityId) -> Option<DateTime<Utc>> {
        self.pending().get(&actor).map(|p| p.opened_at)
    }

    // -----------------------------------------------------------------------
    // Closing
    // -----------------------------------------------------------------------

    /// Deliver the actor's answer. Returns `false` if no dialog was open.
    pub fn respond(&self, actor: EntityId, reply: Reply) -> bool {
        let Some(pending) = self.pending().remove(&actor) else {
            return false;
        };
        // The waiter may already have timed out.
        pending.reply.send(reply).is_ok()
    }

    /// Withdraw the actor's dialog. Returns `false` if none was open.
    pub fn cancel(&self, actor: EntityId) -> bool {
        let removed = self.pending().remove(&actor);
        if let Some(pending) = &removed {
            info!(%actor, attempt = %pending.attempt, "confirmation cancelled");
        }
        removed.is_some()
    }

    /// Suspend until the dialog behind `ticket` closes.
    ///
    /// Returns `Ok` only when the actor accepted.
    pub async fn wait(&self, ticket: Ticket, timeout: Duration) -> Result<(), PipelineError> {
        let Ticket { actor, attempt, rx } = ticket;
        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(Reply::Accept)) => Ok(()),
            Ok(Ok(Reply::Decline)) => Err(PipelineError::Declined { actor }),
            Ok(Err(_)) => Err(PipelineError::Cancelled { actor }),
            Err(_) => {
                let mut pending = self.pending();
                if pending.get(&actor).is_some_and(|p| p.attempt == attempt) {
                    pending.remove(&actor);
                }
                drop(pending);
                info!(%actor, %attempt, "confirmation timed out");
                Err(PipelineError::TimedOut { actor })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use artisan_rules::NoticeLog;

    use super::*;

    const ACTOR: EntityId = EntityId(0x5000_0001);
    const LONG: Duration = Duration::from_secs(30);

    fn open(manager: &ConfirmationManager, log: &mut NoticeLog) -> Result<Ticket, PipelineError> {
        manager.request(ACTOR, AttemptId::new(), String::from("Proceed?"), log)
    }

    #[test]
    fn request_shows_the_prompt() {
        let manager = ConfirmationManager::new();
        let mut log = NoticeLog::new();
        assert!(open(&manager, &mut log).is_ok());
        assert!(manager.is_pending(ACTOR));
        assert!(manager.opened_at(ACTOR).is_some());
        assert_eq!(
            log.notices(),
            &[Notice::Confirm {
                to: ACTOR,
                text: String::from("Proceed?"),
            }]
        );
    }

    #[test]
    fn second_request_is_rejected_not_queued() {
        let manager = ConfirmationManager::new();
        let mut log = NoticeLog::new();
        let first = open(&manager, &mut log);
        assert!(first.is_ok());
        let second = open(&manager, &mut log);
        assert!(matches!(
            second,
            Err(PipelineError::ConfirmationInProgress { actor }) if actor == ACTOR
        ));
        assert_eq!(log.notices().len(), 1);
    }

    #[tokio::test]
    async fn accept_resumes_and_frees_the_slot() {
        let manager = ConfirmationManager::new();
        let mut log = NoticeLog::new();
        let Ok(ticket) = open(&manager, &mut log) else {
            return;
        };
        assert!(manager.respond(ACTOR, Reply::Accept));
        assert!(!manager.is_pending(ACTOR));
        assert_eq!(manager.wait(ticket, LONG).await, Ok(()));
        assert!(open(&manager, &mut log).is_ok());
    }

    #[tokio::test]
    async fn decline_and_cancel_abort() {
        let manager = ConfirmationManager::new();
        let mut log = NoticeLog::new();

        let Ok(ticket) = open(&manager, &mut log) else {
            return;
        };
        manager.respond(ACTOR, Reply::Decline);
        assert_eq!(
            manager.wait(ticket, LONG).await,
            Err(PipelineError::Declined { actor: ACTOR })
        );

        let Ok(ticket) = open(&manager, &mut log) else {
            return;
        };
        assert!(manager.cancel(ACTOR));
        assert!(!manager.cancel(ACTOR));
        assert_eq!(
            manager.wait(ticket, LONG).await,
            Err(PipelineError::Cancelled { actor: ACTOR })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn unanswered_dialog_times_out() {
        let manager = ConfirmationManager::new();
        let mut log = NoticeLog::new();
        let Ok(ticket) = open(&manager, &mut log) else {
            return;
        };
        assert_eq!(
            manager.wait(ticket, Duration::from_millis(500)).await,
            Err(PipelineError::TimedOut { actor: ACTOR })
        );
        assert!(!manager.is_pending(ACTOR));
        assert!(!manager.respond(ACTOR, Reply::Accept));
    }
}
