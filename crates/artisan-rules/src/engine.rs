//! The crafting engine: one use-object-on-target attempt, start to end.
//!
//! An attempt runs in two halves so the caller can wait for the actor's
//! confirmation in between. [`CraftingEngine::prepare`] runs the
//! precondition checks and computes the chance. [`CraftingEngine::resolve`]
//! re-verifies, rolls the outcome, destroys and creates items, applies the
//! modification clauses, and reports what changed.

use artisan_types::{AttemptId, EntityId, Recipe, Skill, WorldObject};
use tracing::{debug, info, warn};

use crate::chance::{ChanceCalculator, apply_dialog, chance_dialog, exact_chance_line};
use crate::config::CraftingConfig;
use crate::context::{Collaborators, ModifiedSet, Participants};
use crate::crafter::Crafter;
use crate::dispatch::{MutationDispatch, dispatcher_for};
use crate::error::CraftError;
use crate::lifecycle::{
    broadcast_tinkering, create_result, destroy_amount, destroy_item, guids, result_weenie,
    roll_destruction, transfer_spells,
};
use crate::mutation::MutationEngine;
use crate::notify::{ChatChannel, Notifier};
use crate::outcome::{Outcome, resolve};
use crate::requirements::{RequirementEvaluator, is_salvage_pair};
use crate::salvage::combine_salvage;
use crate::services::{LogisticSkillCurve, SkillCurve, WorldLookup, name_with_material};

/// What an attempt will do once confirmed.
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    /// Run a recipe at the given chance.
    Recipe {
        /// The recipe.
        recipe: Box<Recipe>,
        /// Success chance in `[0, 1]`.
        chance: f64,
    },
    /// Combine two salvage bags.
    CombineSalvage,
}

/// A checked attempt waiting to be resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Attempt {
    /// Correlation id for log lines.
    pub id: AttemptId,
    /// Guid of the tool.
    pub source: EntityId,
    /// Guid of the target.
    pub target: EntityId,
    /// What resolution will do.
    pub plan: Plan,
    /// Confirmation text to show first, when the actor wants one.
    pub prompt: Option<String>,
}

/// Everything an attempt changed.
#[derive(Debug, Clone, PartialEq)]
pub struct CraftOutcome {
    /// Correlation id.
    pub attempt: AttemptId,
    /// Whether the attempt succeeded. Salvage combining always does.
    pub success: bool,
    /// The outcome roll, for recipe attempts.
    pub roll: Option<Outcome>,
    /// Guids written during the attempt.
    pub modified: ModifiedSet,
    /// Guids hit by a destroy roll, in roll order.
    pub destroyed: Vec<EntityId>,
    /// The created result, now in the actor's pack.
    pub created: Option<WorldObject>,
}

/// Resolves use-object-on-target attempts.
pub struct CraftingEngine {
    config: CraftingConfig,
    curve: Box<dyn SkillCurve>,
    dispatch: Box<dyn MutationDispatch>,
}

impl CraftingEngine {
    /// An engine with the logistic skill curve and the configured
    /// mutation dispatcher.
    pub fn new(config: CraftingConfig) -> Self {
        let curve = Box::new(LogisticSkillCurve {
            factor: config.skill_check_factor,
        });
        let dispatch = dispatcher_for(&config);
        Self {
            config,
            curve,
            dispatch,
        }
    }

    /// Replace the skill curve.
    #[must_use]
    pub fn with_curve(mut self, curve: Box<dyn SkillCurve>) -> Self {
        self.curve = curve;
        self
    }

    /// Replace the mutation dispatcher.
    #[must_use]
    pub fn with_dispatch(mut self, dispatch: Box<dyn MutationDispatch>) -> Self {
        self.dispatch = dispatch;
        self
    }

    /// The active configuration.
    pub const fn config(&self) -> &CraftingConfig {
        &self.config
    }

    /// Check an attempt and compute its chance.
    ///
    /// Every failure has already been reported to the actor when this
    /// returns `Err`; the caller only adds the client error code from
    /// [`CraftError::client_error`].
    pub fn prepare(
        &self,
        actor: &Crafter,
        source: &WorldObject,
        target: &WorldObject,
        confirmed: bool,
        lookup: &dyn WorldLookup,
        notifier: &mut dyn Notifier,
    ) -> Result<Attempt, CraftError> {
        if !self.config.allow_combat_mode_crafting && !actor.in_peace_mode() {
            return Err(CraftError::NotInPeaceMode { actor: actor.id() });
        }

        if source.id == target.id {
            let name = name_with_material(lookup, source);
            notifier.send(
                actor.id(),
                ChatChannel::Craft,
                format!("The {name} cannot be combined with itself."),
            );
            notifier.send(
                actor.id(),
                ChatChannel::Transient,
                format!("You can't use the {name} on itself."),
            );
            return Err(CraftError::SameObject { object: source.id });
        }

        let evaluator = RequirementEvaluator::new(&self.config, lookup);
        let id = AttemptId::new();

        if self.config.allow_salvage_combining && is_salvage_pair(source, target) {
            if !evaluator.verify(None, actor, source, target, notifier) {
                return Err(CraftError::RequirementsFailed { recipe_id: 0 });
            }
            let prompt = (actor.show_craft_chance && !confirmed).then(|| apply_dialog(lookup, source, target));
            debug!(attempt = %id, source = %source.id, target = %target.id, "salvage combine prepared");
            return Ok(Attempt {
                id,
                source: source.id,
                target: target.id,
                plan: Plan::CombineSalvage,
                prompt,
            });
        }

        let Some(recipe) = lookup.recipe(source.weenie_class_id, target.weenie_class_id) else {
            notifier.send(
                actor.id(),
                ChatChannel::Craft,
                format!(
                    "The {} cannot be used on the {}.",
                    name_with_material(lookup, source),
                    name_with_material(lookup, target)
                ),
            );
            return Err(CraftError::NoRecipe {
                source_class: source.weenie_class_id,
                target_class: target.weenie_class_id,
            });
        };

        if !evaluator.verify(Some(recipe), actor, source, target, notifier) {
            return Err(CraftError::RequirementsFailed { recipe_id: recipe.id });
        }

        let chance = ChanceCalculator::new(&self.config, self.curve.as_ref())
            .chance(recipe, actor, source, target, notifier)?;

        if !confirmed && actor.augmentations.skilled_craft > 0 {
            notifier.send(
                actor.id(),
                ChatChannel::Broadcast,
                format!(
                    "Your Aura of the Craftsman augmentation increased your skill by {}!",
                    actor.augmentations.skilled_craft
                ),
            );
        }

        let prompt = (recipe.has_difficulty() && actor.show_craft_chance && !confirmed).then(|| {
            if self.config.craft_exact_msg {
                notifier.send(
                    actor.id(),
                    ChatChannel::Craft,
                    exact_chance_line(lookup, source, target, chance),
                );
            }
            chance_dialog(recipe, actor, chance)
        });

        info!(
            attempt = %id,
            actor = %actor.id(),
            recipe = recipe.id,
            chance,
            prompted = prompt.is_some(),
            "attempt prepared"
        );
        Ok(Attempt {
            id,
            source: source.id,
            target: target.id,
            plan: Plan::Recipe {
                recipe: Box::new(recipe.clone()),
                chance,
            },
            prompt,
        })
    }

    /// Resolve a prepared attempt.
    ///
    /// Once destruction has begun nothing is rolled back; later problems
    /// are logged and the attempt completes with what was applied.
    pub fn resolve(
        &self,
        attempt: &Attempt,
        actor: &mut Crafter,
        source: &mut WorldObject,
        target: &mut WorldObject,
        collab: &mut Collaborators<'_>,
    ) -> Result<CraftOutcome, CraftError> {
        match &attempt.plan {
            Plan::CombineSalvage => self.combine(attempt, actor, source, target, collab),
            Plan::Recipe { recipe, chance } => {
                self.run_recipe(attempt, recipe, *chance, actor, source, target, collab)
            }
        }
    }

    fn combine(
        &self,
        attempt: &Attempt,
        actor: &Crafter,
        source: &mut WorldObject,
        target: &mut WorldObject,
        collab: &mut Collaborators<'_>,
    ) -> Result<CraftOutcome, CraftError> {
        let evaluator = RequirementEvaluator::new(&self.config, collab.lookup);
        if !evaluator.verify(None, actor, source, target, collab.notifier) {
            return Err(CraftError::RequirementsFailed { recipe_id: 0 });
        }
        let (report, modified) = combine_salvage(&self.config, source, target, collab.notifier);
        let destroyed = if report.remaining == 0 {
            vec![source.id]
        } else {
            Vec::new()
        };
        Ok(CraftOutcome {
            attempt: attempt.id,
            success: true,
            roll: None,
            modified,
            destroyed,
            created: None,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn run_recipe(
        &self,
        attempt: &Attempt,
        recipe: &Recipe,
        chance: f64,
        actor: &mut Crafter,
        source: &mut WorldObject,
        target: &mut WorldObject,
        collab: &mut Collaborators<'_>,
    ) -> Result<CraftOutcome, CraftError> {
        let evaluator = RequirementEvaluator::new(&self.config, collab.lookup);
        if !evaluator.verify(Some(recipe), actor, source, target, collab.notifier) {
            return Err(CraftError::RequirementsFailed { recipe_id: recipe.id });
        }

        let outcome = resolve(chance, collab.dice);
        info!(
            attempt = %attempt.id,
            actor = %actor.id(),
            tool = %source.id,
            target = %target.id,
            chance,
            roll = outcome.roll,
            success = outcome.success,
            "attempt rolled"
        );

        if recipe.is_imbuing() {
            actor.imbue_attempts = actor.imbue_attempts.saturating_add(1);
            if outcome.success {
                actor.imbue_successes = actor.imbue_successes.saturating_add(1);
            }
        }

        let branch = recipe.branch(outcome.success);
        let rolls = roll_destruction(branch, collab.dice);
        let weenie = result_weenie(recipe, outcome.success, collab.lookup)?;

        let mut destroyed = Vec::new();
        if rolls.target {
            let amount = destroy_amount(recipe, target, branch.destroy_target_amount);
            destroy_item(actor, target, amount, &branch.destroy_target_message, collab.notifier);
            destroyed.push(target.id);
        }
        if rolls.source {
            let amount = destroy_amount(recipe, source, branch.destroy_source_amount);
            destroy_item(actor, source, amount, &branch.destroy_source_message, collab.notifier);
            destroyed.push(source.id);
        }

        let mut created =
            weenie.and_then(|weenie| create_result(actor, weenie, branch.create_amount, collab.factory));
        if rolls.target
            && let Some(result) = created.as_mut()
            && transfer_spells(target, result) > 0
        {
            collab.notifier.object_updated(result);
        }

        let modified = {
            let mut parts = Participants {
                actor: &mut *actor,
                source: &mut *source,
                target: &mut *target,
                result: created.as_mut(),
            };
            MutationEngine::new(self.dispatch.as_ref()).apply(recipe, outcome.success, &mut parts, collab)
        };

        if let Some(result) = created.as_mut()
            && let Some(text) = collab.hooks.mutate_quest_item(source.weenie_class_id, result)
        {
            collab.notifier.send(actor.id(), ChatChannel::System, text);
        }

        if recipe.is_tinkering() {
            broadcast_tinkering(actor, source, target, outcome.success, collab.lookup, collab.notifier);
        } else if !branch.message.is_empty() {
            collab
                .notifier
                .send(actor.id(), ChatChannel::Craft, branch.message.as_str());
        }

        for object in [&*source, &*target] {
            if modified.contains(object.id) && !object.is_destroyed() {
                collab.notifier.object_updated(object);
            }
        }

        if outcome.success && recipe.skill > 0 && recipe.difficulty > 0 {
            match Skill::from_id(recipe.skill) {
                Some(skill) => {
                    let skill = actor.resolve_skill(skill);
                    collab.hooks.grant_proficiency(actor, skill, recipe.difficulty);
                }
                None => warn!(recipe = recipe.id, skill = recipe.skill, "proficiency skipped for unknown skill"),
            }
        }

        info!(
            attempt = %attempt.id,
            success = outcome.success,
            modified = modified.len(),
            destroyed = %guids(&destroyed),
            created = created.as_ref().map(|result| result.id.0),
            "attempt resolved"
        );
        Ok(CraftOutcome {
            attempt: attempt.id,
            success: outcome.success,
            roll: Some(outcome),
            modified,
            destroyed,
            created,
        })
    }
}

impl std::fmt::Debug for CraftingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CraftingEngine")
            .field("config", &self.config)
            .field("dispatch", &self.dispatch.name())
            .finish_non_exhaustive()
    }
}

/// Report a failed attempt's client code to the actor.
pub fn report_failure(error: &CraftError, actor: EntityId, notifier: &mut dyn Notifier) {
    if error.is_data_integrity() {
        warn!(%error, "attempt aborted on bad data");
    } else {
        debug!(%error, "attempt rejected");
    }
    if let Some(code) = error.client_error() {
        notifier.error(actor, code);
    }
}
