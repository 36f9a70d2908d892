//! Success probability for an attempt.
//!
//! Ordinary recipes use the skill curve against the recipe difficulty.
//! Tinkering recipes derive their own difficulty from material, relative
//! workmanship, and how many times the target has already been tinkered.

use artisan_types::{MaterialType, Recipe, Skill, WorldObject};
use tracing::{debug, error};

use crate::config::CraftingConfig;
use crate::crafter::Crafter;
use crate::error::CraftError;
use crate::notify::{ChatChannel, Notifier, WeenieError};
use crate::services::{SkillCurve, WorldLookup, name_with_material};

/// Difficulty multiplier by number of prior tinkers. Counts past the end
/// reuse the last entry.
pub const TINKER_ATTEMPT_MULTIPLIERS: [f64; 10] = [1.0, 1.1, 1.3, 1.6, 2.0, 2.5, 3.0, 3.5, 4.0, 4.5];

/// Difficulty multiplier for the next tinker on an item tinkered
/// `prior_tinkers` times.
pub fn attempt_multiplier(prior_tinkers: i32) -> f64 {
    let index = usize::try_from(prior_tinkers).unwrap_or(0);
    TINKER_ATTEMPT_MULTIPLIERS
        .get(index)
        .or_else(|| TINKER_ATTEMPT_MULTIPLIERS.last())
        .copied()
        .unwrap_or(1.0)
}

/// Base difficulty weight of a salvage material.
pub const fn material_modifier(material: Option<MaterialType>) -> f64 {
    use MaterialType as M;
    match material {
        Some(M::Gold | M::Oak) => 10.0,
        Some(
            M::Alabaster
            | M::ArmoredilloHide
            | M::Brass
            | M::Bronze
            | M::Ceramic
            | M::Granite
            | M::Linen
            | M::Marble
            | M::Moonstone
            | M::Opal
            | M::Pine
            | M::ReedSharkHide
            | M::Velvet
            | M::Wool,
        ) => 11.0,
        Some(
            M::Ebony
            | M::GreenGarnet
            | M::Iron
            | M::Mahogany
            | M::Porcelain
            | M::Satin
            | M::Steel
            | M::Teak,
        ) => 12.0,
        Some(
            M::Bloodstone
            | M::Carnelian
            | M::Citrine
            | M::Hematite
            | M::LavenderJade
            | M::Malachite
            | M::RedJade
            | M::RoseQuartz,
        ) => 25.0,
        _ => 20.0,
    }
}

/// Effective difficulty of applying `tool` to `target`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn tinker_difficulty(tool: &WorldObject, target: &WorldObject) -> u32 {
    let tool_workmanship = tool.workmanship().unwrap_or(0.0);
    let item_workmanship = target.workmanship().unwrap_or(0.0);
    let salvage = material_modifier(tool.material());
    let workmanship = if tool_workmanship >= item_workmanship {
        2.0
    } else {
        1.0
    };

    let raw = (salvage * 5.0) + (item_workmanship * salvage * 2.0)
        - (tool_workmanship * workmanship * salvage / 5.0);
    let scaled = (raw * attempt_multiplier(target.num_times_tinkered())).floor();
    // Negative difficulties clamp to zero.
    if scaled <= 0.0 {
        0
    } else if scaled >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        scaled as u32
    }
}

// ---------------------------------------------------------------------------
// Calculator
// ---------------------------------------------------------------------------

/// Computes the success chance of an attempt.
pub struct ChanceCalculator<'a> {
    config: &'a CraftingConfig,
    curve: &'a dyn SkillCurve,
}

impl<'a> ChanceCalculator<'a> {
    /// A calculator over the given config and skill curve.
    pub const fn new(config: &'a CraftingConfig, curve: &'a dyn SkillCurve) -> Self {
        Self { config, curve }
    }

    /// The chance in `[0, 1]` that the attempt succeeds.
    ///
    /// # Errors
    ///
    /// [`CraftError::Untrained`] after telling the actor, or
    /// [`CraftError::MissingSkill`] when the recipe names a skill the actor
    /// has no record of.
    pub fn chance(
        &self,
        recipe: &Recipe,
        actor: &Crafter,
        tool: &WorldObject,
        target: &WorldObject,
        notifier: &mut dyn Notifier,
    ) -> Result<f64, CraftError> {
        if recipe.is_tinkering() {
            return self.tinker_chance(recipe, actor, tool, target, notifier);
        }
        if !recipe.has_difficulty() {
            return Ok(1.0);
        }

        let (skill, current) = self.trained_skill(recipe, actor, notifier, false)?;
        let chance = self.curve.chance(current, recipe.difficulty);
        debug!(recipe = recipe.id, skill = ?skill, current, difficulty = recipe.difficulty, chance, "skill chance");
        Ok(chance)
    }

    fn tinker_chance(
        &self,
        recipe: &Recipe,
        actor: &Crafter,
        tool: &WorldObject,
        target: &WorldObject,
        notifier: &mut dyn Notifier,
    ) -> Result<f64, CraftError> {
        let (_, current) = self.trained_skill(recipe, actor, notifier, true)?;
        let difficulty = tinker_difficulty(tool, target);
        let mut chance = self.curve.chance(current, difficulty);

        if recipe.is_imbuing() {
            if self.config.imbue_chance_divisor > 0.0 {
                chance /= self.config.imbue_chance_divisor;
            }
            chance += f64::from(actor.augmentations.bonus_imbue_chance)
                * self.config.imbue_bonus_per_augmentation;
        }

        if self.config.foolproof_tools.contains(&tool.weenie_class_id) {
            chance = 1.0;
        }

        let chance = chance.clamp(0.0, 1.0);
        debug!(
            recipe = recipe.id,
            current,
            difficulty,
            attempt = target.num_times_tinkered(),
            chance,
            "tinker chance"
        );
        Ok(chance)
    }

    /// Resolve the recipe skill and return it with the actor's effective
    /// value, augmentation included.
    fn trained_skill(
        &self,
        recipe: &Recipe,
        actor: &Crafter,
        notifier: &mut dyn Notifier,
        tinkering: bool,
    ) -> Result<(Skill, u32), CraftError> {
        let missing = CraftError::MissingSkill {
            recipe_id: recipe.id,
            skill_id: recipe.skill,
        };
        let Some(declared) = Skill::from_id(recipe.skill) else {
            error!(recipe = recipe.id, skill = recipe.skill, "recipe names unknown skill");
            return Err(missing);
        };
        let skill = actor.resolve_skill(declared);
        let Some(record) = actor.skill(skill) else {
            error!(recipe = recipe.id, skill = ?skill, actor = %actor.id(), "actor has no record of skill");
            return Err(missing);
        };

        if !record.advancement.is_trained() {
            if tinkering {
                notifier.send(
                    actor.id(),
                    ChatChannel::Broadcast,
                    format!("You are not trained in {}.", skill.display_name()),
                );
            } else {
                notifier.error(actor.id(), WeenieError::YouAreNotTrainedInThatTradeSkill);
            }
            return Err(CraftError::Untrained { skill });
        }

        Ok((skill, record.current.saturating_add(actor.augmentations.skilled_craft)))
    }
}

// ---------------------------------------------------------------------------
// Dialog text
// ---------------------------------------------------------------------------

/// Confirmation text for a recipe attempt.
#[allow(clippy::cast_possible_truncation)]
pub fn chance_dialog(recipe: &Recipe, actor: &Crafter, chance: f64) -> String {
    let percent = (chance * 100.0).round() as i64;
    let mut text = format!("You determine that you have a {percent} percent chance to succeed.");
    let augs = if recipe.is_imbuing() {
        actor.augmentations.bonus_imbue_chance
    } else {
        0
    };
    if augs > 0 {
        text.push_str(&format!(
            "\n{} percent is due to your augmentation.",
            augs.saturating_mul(5)
        ));
    }
    text
}

/// The exact-percent line sent alongside the dialog when enabled.
#[allow(clippy::cast_possible_truncation)]
pub fn exact_chance_line(lookup: &dyn WorldLookup, tool: &WorldObject, target: &WorldObject, chance: f64) -> String {
    let percent = (chance * 100.0) as f32;
    format!(
        "You have a {percent} percent chance of using {} on {}.",
        name_with_material(lookup, tool),
        name_with_material(lookup, target)
    )
}

/// Confirmation text for combining salvage or applying a tool without a
/// skill check.
pub fn apply_dialog(lookup: &dyn WorldLookup, tool: &WorldObject, target: &WorldObject) -> String {
    let material = tool
        .material()
        .map_or_else(String::new, |m| lookup.material_name(m));
    let tool_workmanship = tool.workmanship().unwrap_or(0.0);
    if crate::requirements::is_salvage_pair(tool, target) {
        let structure = |bag: &WorldObject| {
            bag.properties
                .get_int(artisan_types::IntKey::STRUCTURE)
                .unwrap_or(0)
        };
        format!(
            "Combining\n{} {material} of workmanship {tool_workmanship:.2}\nand\n{} {material} of workmanship {:.2}\n",
            structure(tool),
            structure(target),
            target.workmanship().unwrap_or(0.0),
        )
    } else {
        format!(
            "Applying {material} of workmanship {tool_workmanship:.2} to {}.\n",
            name_with_material(lookup, target)
        )
    }
}
