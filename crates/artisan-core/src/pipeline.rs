//! The use-object-on-target pipeline.
//!
//! One attempt runs as an ordered series of steps on the actor's own queue:
//!
//! 1. Precondition checks and chance ([`CraftingEngine::prepare`]).
//! 2. Stance change, when combat crafting is allowed and the actor is not
//!    in peace mode.
//! 3. Crafting animation, skipped for an already-confirmed attempt.
//! 4. Confirmation wait, when the attempt carries a prompt.
//! 5. Resolution ([`CraftingEngine::resolve`]).
//!
//! Nothing is written before step 5. A failure in steps 1 through 4 leaves
//! every object untouched.
//!
//! [`CraftingEngine::prepare`]: artisan_rules::CraftingEngine::prepare
//! [`CraftingEngine::resolve`]: artisan_rules::CraftingEngine::resolve

use std::time::Duration;

use artisan_rules::{
    Collaborators, CraftError, CraftHooks, CraftOutcome, Notifier, WeenieError, report_failure,
};
use artisan_types::{CombatMode, EntityId};
use tracing::{debug, info, warn};

use crate::actor::ActorState;
use crate::error::PipelineError;
use crate::services::Services;

/// One use-object-on-target request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UseRequest {
    /// Guid of the tool.
    pub source: EntityId,
    /// Guid of the target.
    pub target: EntityId,
    /// The actor already confirmed this attempt.
    pub confirmed: bool,
}

/// Run one attempt to completion against `state`.
pub async fn run(
    services: &Services,
    state: &mut ActorState,
    hooks: &mut dyn CraftHooks,
    request: UseRequest,
) -> Result<CraftOutcome, PipelineError> {
    let actor = state.crafter.id();
    let mut notifier = services.notifier.clone();
    let sink: &mut dyn Notifier = &mut notifier;
    let lookup = services.lookup.as_ref();
    let engine = services.engine.as_ref();

    // -----------------------------------------------------------------------
    // Preconditions
    // -----------------------------------------------------------------------

    let prepared = match (state.object(request.source), state.object(request.target)) {
        (Ok(source), Ok(target)) => {
            engine.prepare(&state.crafter, source, target, request.confirmed, lookup, sink)
        }
        (Err(error), _) | (_, Err(error)) => Err(error),
    };
    let attempt = match prepared {
        Ok(attempt) => attempt,
        Err(error) => {
            report_failure(&error, actor, sink);
            return Err(error.into());
        }
    };

    // -----------------------------------------------------------------------
    // Deferred steps
    // -----------------------------------------------------------------------

    if engine.config().allow_combat_mode_crafting && !state.crafter.in_peace_mode() {
        debug!(%actor, attempt = %attempt.id, "dropping to peace mode");
        tokio::time::sleep(Duration::from_millis(services.timing.stance_change_ms)).await;
        state.crafter.combat_mode = CombatMode::NonCombat;
        sink.object_updated(&state.crafter.object);
    }

    if !request.confirmed {
        tokio::time::sleep(Duration::from_millis(services.timing.clap_ms)).await;
    }

    if let Some(text) = attempt.prompt.clone() {
        let confirmations = services.confirmations.as_ref();
        let ticket = match confirmations.request(actor, attempt.id, text, sink) {
            Ok(ticket) => ticket,
            Err(error) => {
                sink.error(actor, WeenieError::ConfirmationInProgress);
                return Err(error);
            }
        };
        let timeout = Duration::from_millis(services.timing.confirmation_timeout_ms);
        confirmations.wait(ticket, timeout).await?;
        info!(%actor, attempt = %attempt.id, "attempt confirmed");
    }

    // -----------------------------------------------------------------------
    // Resolution
    // -----------------------------------------------------------------------

    let Some(mut source) = state.objects.remove(&attempt.source) else {
        let error = CraftError::ObjectNotFound(attempt.source);
        report_failure(&error, actor, sink);
        return Err(error.into());
    };
    let Some(mut target) = state.objects.remove(&attempt.target) else {
        state.objects.insert(source.id, source);
        let error = CraftError::ObjectNotFound(attempt.target);
        report_failure(&error, actor, sink);
        return Err(error.into());
    };

    let mut dice = services.dice.clone();
    let mut factory = services.guids.clone();
    let result = {
        let mut collab = Collaborators {
            lookup,
            notifier: &mut *sink,
            hooks,
            dice: &mut dice,
            factory: &mut factory,
        };
        engine.resolve(
            &attempt,
            &mut state.crafter,
            &mut source,
            &mut target,
            &mut collab,
        )
    };

    for object in [source, target] {
        if !object.is_destroyed() {
            state.objects.insert(object.id, object);
        }
    }

    match result {
        Ok(outcome) => {
            if let Some(created) = &outcome.created {
                state.objects.insert(created.id, created.clone());
            }
            info!(
                %actor,
                attempt = %outcome.attempt,
                success = outcome.success,
                modified = outcome.modified.len(),
                destroyed = outcome.destroyed.len(),
                created = outcome.created.is_some(),
                "attempt complete"
            );
            Ok(outcome)
        }
        Err(error) => {
            warn!(%actor, attempt = %attempt.id, %error, "attempt failed during resolution");
            report_failure(&error, actor, sink);
            Err(error.into())
        }
    }
}
