//! The scripted crafting session.
//!
//! Each step submits one use-item action to an actor queue and answers
//! any confirmation prompt the way the step says. Steps run one after
//! another; every notice the rules core emits is logged as it arrives.

use std::collections::BTreeMap;
use std::sync::Arc;

use artisan_core::{ActorHandle, ActorState, PipelineError, Reply, Services};
use artisan_rules::{CraftOutcome, Notice};
use artisan_types::{CombatMode, EntityId, WorldObject};
use serde::Deserialize;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::EngineError;
use crate::hooks::{HookTally, LoggingHooks};
use crate::world::ActorSeed;

/// How a step answers a confirmation prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Answer {
    /// Go ahead.
    #[default]
    Accept,
    /// Say no.
    Decline,
    /// Let the prompt time out.
    Ignore,
}

/// One scripted use-item action.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionStep {
    /// Acting player.
    pub actor: EntityId,
    /// Tool guid.
    pub source: EntityId,
    /// Target guid.
    pub target: EntityId,
    /// Skip the prompt and the animation.
    #[serde(default)]
    pub confirmed: bool,
    /// Answer to a prompt, if one is shown.
    #[serde(default)]
    pub answer: Answer,
    /// Stance to take before the attempt.
    #[serde(default)]
    pub stance: Option<CombatMode>,
}

/// Tally of a finished session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionReport {
    /// Steps run.
    pub attempts: usize,
    /// Attempts whose roll succeeded.
    pub succeeded: usize,
    /// Attempts that rolled and failed.
    pub failed: usize,
    /// Attempts stopped before resolution.
    pub rejected: usize,
    /// Proficiency grants handed to the hooks.
    pub proficiency_grants: u32,
    /// Deaths handed to the hooks.
    pub deaths: u32,
}

impl SessionReport {
    fn record(&mut self, result: &Result<CraftOutcome, PipelineError>) {
        self.attempts = self.attempts.saturating_add(1);
        let slot = match result {
            Ok(outcome) if outcome.success => &mut self.succeeded,
            Ok(_) => &mut self.failed,
            Err(_) => &mut self.rejected,
        };
        *slot = slot.saturating_add(1);
    }
}

/// Spawn a queue per seed and run `steps` in order.
///
/// Returns once every queue has drained.
pub async fn run(
    services: &Services,
    seeds: Vec<ActorSeed>,
    steps: &[SessionStep],
) -> Result<SessionReport, EngineError> {
    let logger = tokio::spawn(log_notices(services.notifier.subscribe()));
    let mut prompts = services.notifier.subscribe();

    let tally = Arc::new(HookTally::default());
    let mut handles = BTreeMap::new();
    let mut tasks = Vec::with_capacity(seeds.len());
    for seed in seeds {
        let (handle, task) = ActorHandle::spawn(
            ActorState::from(seed),
            services.clone(),
            Box::new(LoggingHooks::new(Arc::clone(&tally))),
        );
        handles.insert(handle.id(), handle);
        tasks.push(task);
    }
    info!(actors = handles.len(), steps = steps.len(), "session started");

    let mut report = SessionReport::default();
    for (index, step) in steps.iter().enumerate() {
        let handle = handles
            .get(&step.actor)
            .ok_or(EngineError::UnknownActor { actor: step.actor })?;
        if let Some(mode) = step.stance {
            handle.set_combat_mode(mode).await?;
        }

        let worker = handle.clone();
        let (source, target, confirmed) = (step.source, step.target, step.confirmed);
        let attempt = tokio::spawn(async move { worker.use_object(source, target, confirmed).await });
        let result = answer_prompts(handle, &mut prompts, attempt, step.answer).await?;

        match &result {
            Ok(outcome) => info!(
                step = index,
                actor = %step.actor,
                success = outcome.success,
                modified = outcome.modified.len(),
                destroyed = outcome.destroyed.len(),
                created = ?outcome.created.as_ref().map(WorldObject::name),
                "step finished"
            ),
            Err(error) => info!(step = index, actor = %step.actor, %error, "step stopped"),
        }
        report.record(&result);
    }

    drop(handles);
    for task in tasks {
        let state = task.await?;
        info!(
            actor = %state.crafter.id(),
            objects = state.objects.len(),
            "actor queue drained"
        );
    }
    logger.abort();
    report.proficiency_grants = tally.grants();
    report.deaths = tally.deaths();
    Ok(report)
}

/// Answer prompts addressed to `handle` until `attempt` finishes.
async fn answer_prompts(
    handle: &ActorHandle,
    prompts: &mut broadcast::Receiver<Notice>,
    mut attempt: JoinHandle<Result<CraftOutcome, PipelineError>>,
    answer: Answer,
) -> Result<Result<CraftOutcome, PipelineError>, EngineError> {
    loop {
        tokio::select! {
            joined = &mut attempt => return Ok(joined?),
            notice = prompts.recv() => match notice {
                Ok(Notice::Confirm { to, text }) if to == handle.id() => {
                    info!(actor = %to, prompt = %text, ?answer, "confirmation prompt");
                    let reply = match answer {
                        Answer::Accept => Some(Reply::Accept),
                        Answer::Decline => Some(Reply::Decline),
                        Answer::Ignore => None,
                    };
                    if let Some(reply) = reply
                        && !handle.confirm(reply)
                    {
                        warn!(actor = %to, "prompt closed before the answer arrived");
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "prompt watcher lagged"),
                Err(RecvError::Closed) => return Ok(attempt.await?),
            },
        }
    }
}

/// Log every notice until the channel closes.
async fn log_notices(mut notices: broadcast::Receiver<Notice>) {
    loop {
        match notices.recv().await {
            Ok(Notice::Tell { to, channel, text }) => info!(%to, ?channel, %text, "tell"),
            Ok(Notice::Nearby {
                origin,
                channel,
                text,
            }) => info!(%origin, ?channel, %text, "nearby"),
            Ok(Notice::Everyone { channel, text }) => info!(?channel, %text, "broadcast"),
            Ok(Notice::Error { to, error }) => info!(%to, ?error, "client error"),
            Ok(Notice::ObjectUpdated { id }) => debug!(%id, "object updated"),
            Ok(Notice::Confirm { .. }) => {}
            Err(RecvError::Lagged(skipped)) => warn!(skipped, "notice log lagged"),
            Err(RecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use artisan_core::ServerConfig;
    use artisan_rules::StaticWorldLookup;

    use super::*;
    use crate::world::WorldData;

    const SHIPPED_WORLD: &str = include_str!("../../../config/world.yaml");
    const SHIPPED_CONFIG: &str = include_str!("../../../config/artisan.yaml");

    #[test]
    fn steps_default_to_accepting() {
        let step: Option<SessionStep> =
            serde_yml::from_str("{ actor: 1, source: 2, target: 3 }").ok();
        assert_eq!(
            step,
            Some(SessionStep {
                actor: EntityId(1),
                source: EntityId(2),
                target: EntityId(3),
                confirmed: false,
                answer: Answer::Accept,
                stance: None,
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn shipped_session_runs_every_step() {
        let config = ServerConfig::parse(SHIPPED_CONFIG);
        let world = WorldData::parse(SHIPPED_WORLD);
        assert!(config.is_ok() && world.is_ok());
        let (Ok(config), Ok(world)) = (config, world) else {
            return;
        };
        let steps = world.session.len();
        let services = Services::new(&config, Arc::new(StaticWorldLookup::from(world.book)));

        let report = run(&services, world.actors, &world.session).await;
        assert!(report.is_ok(), "{report:?}");
        let Ok(report) = report else { return };
        assert_eq!(report.attempts, steps);
        assert!(report.rejected >= 2);
        assert!(report.succeeded >= 1);
    }
}
