//! Per-actor serialized action queues.
//!
//! Each actor's state lives inside one tokio task. Callers hold an
//! [`ActorHandle`] and send it commands over an mpsc channel; the task runs
//! them strictly in order, so no two steps touching the same actor ever run
//! at once and the rules core needs no locks.
//!
//! # Busy flag
//!
//! A use-item action sets the actor's busy flag at submission and the task
//! clears it when the pipeline finishes. A second use-item action submitted
//! while the flag is set is rejected immediately with
//! [`WeenieError::YoureTooBusy`]; it is never queued behind the first.
//! A caller that stops waiting before its action reaches the queue
//! releases the flag.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use artisan_rules::{CraftError, CraftHooks, CraftOutcome, Crafter, Notifier, WeenieError};
use artisan_types::{CombatMode, EntityId, WorldObject};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::confirm::Reply;
use crate::error::PipelineError;
use crate::pipeline::{self, UseRequest};
use crate::services::Services;

/// Commands buffered per actor before senders wait.
const QUEUE_DEPTH: usize = 16;

/// Everything one actor queue owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorState {
    /// The actor.
    pub crafter: Crafter,
    /// Objects the actor can reach, by guid.
    #[serde(default)]
    pub objects: BTreeMap<EntityId, WorldObject>,
}

impl ActorState {
    /// State for `crafter` holding `items`.
    pub fn new(crafter: Crafter, items: impl IntoIterator<Item = WorldObject>) -> Self {
        Self {
            crafter,
            objects: items.into_iter().map(|item| (item.id, item)).collect(),
        }
    }

    /// A reachable object by guid.
    pub fn object(&self, id: EntityId) -> Result<&WorldObject, CraftError> {
        self.objects.get(&id).ok_or(CraftError::ObjectNotFound(id))
    }
}

enum Command {
    Use {
        request: UseRequest,
        reply: oneshot::Sender<Result<CraftOutcome, PipelineError>>,
    },
    SetCombatMode(CombatMode),
    Snapshot {
        reply: oneshot::Sender<ActorState>,
    },
}

/// Cloneable handle to a running actor queue.
#[derive(Debug, Clone)]
pub struct ActorHandle {
    id: EntityId,
    tx: mpsc::Sender<Command>,
    busy: Arc<AtomicBool>,
    services: Services,
}

impl ActorHandle {
    /// Start the queue task for `state`.
    ///
    /// The task ends when every handle is dropped and returns the final
    /// state.
    pub fn spawn(
        state: ActorState,
        services: Services,
        hooks: Box<dyn CraftHooks>,
    ) -> (Self, JoinHandle<ActorState>) {
        let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
        let busy = Arc::new(AtomicBool::new(false));
        let id = state.crafter.id();
        let task = tokio::spawn(run_queue(
            state,
            services.clone(),
            hooks,
            rx,
            Arc::clone(&busy),
        ));
        let handle = Self {
            id,
            tx,
            busy,
            services,
        };
        (handle, task)
    }

    /// The actor's guid.
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Whether a use-item action is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    // -----------------------------------------------------------------------
    // Use-item
    // -----------------------------------------------------------------------

    /// Use `source` on `target` and wait for the attempt to finish.
    pub async fn use_object(
        &self,
        source: EntityId,
        target: EntityId,
        confirmed: bool,
    ) -> Result<CraftOutcome, PipelineError> {
        let Some(claim) = BusyClaim::take(&self.busy) else {
            let mut notifier = self.services.notifier.clone();
            let sink: &mut dyn Notifier = &mut notifier;
            sink.error(self.id, WeenieError::YoureTooBusy);
            debug!(actor = %self.id, "use rejected, actor busy");
            return Err(PipelineError::Busy { actor: self.id });
        };

        let (reply, rx) = oneshot::channel();
        let request = UseRequest {
            source,
            target,
            confirmed,
        };
        if self.tx.send(Command::Use { request, reply }).await.is_err() {
            return Err(PipelineError::QueueClosed);
        }
        claim.hand_off();
        match rx.await {
            Ok(result) => result,
            Err(_) => Err(PipelineError::QueueClosed),
        }
    }

    /// Answer the actor's open confirmation dialog. Returns `false` if none
    /// was open.
    pub fn confirm(&self, reply: Reply) -> bool {
        self.services.confirmations.respond(self.id, reply)
    }

    /// Withdraw the actor's open confirmation dialog.
    pub fn cancel_confirmation(&self) -> bool {
        self.services.confirmations.cancel(self.id)
    }

    // -----------------------------------------------------------------------
    // Other commands
    // -----------------------------------------------------------------------

    /// Queue a stance change.
    pub async fn set_combat_mode(&self, mode: CombatMode) -> Result<(), PipelineError> {
        self.tx
            .send(Command::SetCombatMode(mode))
            .await
            .map_err(|mpsc::error::SendError(_)| PipelineError::QueueClosed)
    }

    /// A copy of the actor's state once every earlier command has run.
    pub async fn snapshot(&self) -> Result<ActorState, PipelineError> {
        let (reply, rx) = oneshot::channel();
        if self.tx.send(Command::Snapshot { reply }).await.is_err() {
            return Err(PipelineError::QueueClosed);
        }
        match rx.await {
            Ok(state) => Ok(state),
            Err(_) => Err(PipelineError::QueueClosed),
        }
    }
}

/// The busy flag, held by a use-item action until its command is queued.
///
/// Dropping an unqueued claim clears the flag, so a caller that gives up
/// while waiting for queue space leaves the actor usable.
struct BusyClaim<'a> {
    busy: &'a AtomicBool,
    queued: bool,
}

impl<'a> BusyClaim<'a> {
    fn take(busy: &'a AtomicBool) -> Option<Self> {
        busy.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                busy,
                queued: false,
            })
    }

    /// The queue task now owns clearing the flag.
    fn hand_off(mut self) {
        self.queued = true;
    }
}

impl Drop for BusyClaim<'_> {
    fn drop(&mut self) {
        if !self.queued {
            self.busy.store(false, Ordering::Release);
        }
    }
}

async fn run_queue(
    mut state: ActorState,
    services: Services,
    mut hooks: Box<dyn CraftHooks>,
    mut rx: mpsc::Receiver<Command>,
    busy: Arc<AtomicBool>,
) -> ActorState {
    let actor = state.crafter.id();
    debug!(%actor, "actor queue started");
    while let Some(command) = rx.recv().await {
        match command {
            Command::Use { request, reply } => {
                let result = pipeline::run(&services, &mut state, hooks.as_mut(), request).await;
                busy.store(false, Ordering::Release);
                if reply.send(result).is_err() {
                    trace!(%actor, "use caller went away");
                }
            }
            Command::SetCombatMode(mode) => {
                state.crafter.combat_mode = mode;
            }
            Command::Snapshot { reply } => {
                if reply.send(state.clone()).is_err() {
                    trace!(%actor, "snapshot caller went away");
                }
            }
        }
    }
    debug!(%actor, "actor queue stopped");
    state
}
