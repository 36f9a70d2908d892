//! Tinkering: material strategies applied to a target by a salvage tool.
//!
//! The tool's [`MaterialType`] selects a registered [`MaterialStrategy`].
//! Most strategies apply one deterministic change ([`materials`]); four
//! also run a randomized [`cascade`] whose bucket tables live in
//! [`cascades`]. After a strategy applies, the [`TinkeringResolver`]
//! records the material in the target's tinker log and bumps its tinker
//! count.

pub mod cascade;
pub mod cascades;
pub mod materials;

use std::collections::{BTreeMap, BTreeSet};

use artisan_types::{
    DamageType, EntityId, FloatKey, ImbuedEffects, IntKey, MaterialType, StringKey, WorldObject,
};
use tracing::{debug, error};

use crate::dice::Dice;
use crate::notify::{ChatChannel, Notifier};
use crate::requirements::tinker_log_entry;
use crate::services::{WorldLookup, name_with_material};

use self::cascade::{Cascade, run_cascade};

// ---------------------------------------------------------------------------
// Job
// ---------------------------------------------------------------------------

/// Everything a material strategy may touch while applying a tool.
pub struct TinkerJob<'a> {
    /// Guid of the acting player.
    pub actor_id: EntityId,
    /// Display name of the acting player, used in global broadcasts.
    pub actor_name: &'a str,
    /// The salvage or tool being applied.
    pub tool: &'a WorldObject,
    /// The item being tinkered.
    pub target: &'a mut WorldObject,
    /// Random samples for cascade rolls.
    pub dice: &'a mut dyn Dice,
    /// Outbound chat.
    pub notifier: &'a mut dyn Notifier,
    /// Material names.
    pub lookup: &'a dyn WorldLookup,
}

impl TinkerJob<'_> {
    /// Uniform integer in `[low, high]`.
    pub fn roll(&mut self, low: i32, high: i32) -> i32 {
        self.dice.roll(low, high)
    }

    /// Uniform real in `[low, high)`.
    pub fn between(&mut self, low: f64, high: f64) -> f64 {
        self.dice.between(low, high)
    }

    /// The target's name with its material prefix.
    pub fn target_name(&self) -> String {
        name_with_material(self.lookup, self.target)
    }

    /// Tell the actor.
    pub fn tell(&mut self, text: impl Into<String>) {
        self.notifier
            .send(self.actor_id, ChatChannel::Broadcast, text);
    }

    /// Tell everyone near the actor.
    pub fn tell_nearby(&mut self, text: impl Into<String>) {
        self.notifier
            .send_nearby(self.actor_id, ChatChannel::Broadcast, text);
    }

    /// Tell every online player.
    pub fn tell_everyone(&mut self, text: impl Into<String>) {
        self.notifier.send_all(ChatChannel::Broadcast, text);
    }
}

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

/// One material's effect on a tinkered target.
pub trait MaterialStrategy: Send + Sync {
    /// Apply the deterministic part of the effect.
    ///
    /// Returns `false` when the material does nothing here and must not be
    /// recorded in the tinker log.
    fn apply(&self, job: &mut TinkerJob<'_>) -> bool;

    /// The randomized cascade run after [`apply`](Self::apply), if any.
    fn cascade(&self) -> Option<&dyn Cascade> {
        None
    }
}

/// What happened when a tool was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TinkerOutcome {
    /// The strategy ran and the target was updated.
    Applied,
    /// The strategy declined; nothing was logged.
    Skipped,
    /// No strategy is registered for the tool's material.
    UnknownMaterial,
}

/// Registry of material strategies.
pub struct TinkeringResolver {
    strategies: BTreeMap<MaterialType, Box<dyn MaterialStrategy>>,
    unlogged: BTreeSet<MaterialType>,
}

impl TinkeringResolver {
    /// A resolver with every built-in material registered.
    pub fn new(unlogged: BTreeSet<MaterialType>) -> Self {
        let mut resolver = Self::empty(unlogged);
        for (material, effect) in materials::FIXED_EFFECTS {
            resolver.register(*material, Box::new(materials::FixedStrategy(*effect)));
        }
        resolver.register(MaterialType::Steel, Box::new(cascades::Steel));
        resolver.register(MaterialType::Iron, Box::new(cascades::Iron));
        resolver.register(MaterialType::Mahogany, Box::new(cascades::Mahogany));
        resolver.register(MaterialType::GreenGarnet, Box::new(cascades::GreenGarnet));
        resolver
    }

    /// A resolver with nothing registered.
    pub fn empty(unlogged: BTreeSet<MaterialType>) -> Self {
        Self {
            strategies: BTreeMap::new(),
            unlogged,
        }
    }

    /// Register or replace the strategy for `material`.
    pub fn register(&mut self, material: MaterialType, strategy: Box<dyn MaterialStrategy>) {
        self.strategies.insert(material, strategy);
    }

    /// Whether `material` has a strategy.
    pub fn handles(&self, material: MaterialType) -> bool {
        self.strategies.contains_key(&material)
    }

    /// Apply the tool in `job` to its target.
    pub fn apply(&self, job: &mut TinkerJob<'_>) -> TinkerOutcome {
        let Some(material) = job.tool.material() else {
            error!(
                tool = %job.tool.id,
                target = %job.target.id,
                "tinkering tool has no material"
            );
            return TinkerOutcome::UnknownMaterial;
        };
        let Some(strategy) = self.strategies.get(&material) else {
            error!(
                tool = %job.tool.id,
                target = %job.target.id,
                ?material,
                "unknown material type"
            );
            return TinkerOutcome::UnknownMaterial;
        };

        if !strategy.apply(job) {
            debug!(?material, target = %job.target.id, "material skipped");
            return TinkerOutcome::Skipped;
        }
        if let Some(cascade) = strategy.cascade() {
            run_cascade(cascade, job);
        }
        if !self.unlogged.contains(&material) {
            record_tinker(job.tool, job.target);
        }
        TinkerOutcome::Applied
    }
}

impl std::fmt::Debug for TinkeringResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TinkeringResolver")
            .field("materials", &self.strategies.keys().collect::<Vec<_>>())
            .field("unlogged", &self.unlogged)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Shared primitives
// ---------------------------------------------------------------------------

/// Append the tool's material (or class id) to the target's tinker log.
pub fn append_tinker_log(tool: &WorldObject, target: &mut WorldObject) {
    let entry = tinker_log_entry(tool);
    let log = match target.properties.get_string(StringKey::TINKER_LOG) {
        Some(existing) => format!("{existing},{entry}"),
        None => entry,
    };
    target.properties.set_string(StringKey::TINKER_LOG, log);
}

/// Append to the tinker log and increment the tinker count.
pub fn record_tinker(tool: &WorldObject, target: &mut WorldObject) {
    append_tinker_log(tool, target);
    let count = target.num_times_tinkered().saturating_add(1);
    target.properties.set_int(IntKey::NUM_TIMES_TINKERED, count);
}

/// Store `effect` in the first free imbue slot.
///
/// Returns `false` when the effect is already present in any slot or all
/// five slots are taken; the target is unchanged in both cases.
pub fn add_imbued_effect(target: &mut WorldObject, effect: ImbuedEffects) -> bool {
    if target.imbued_effects().contains(effect) {
        return false;
    }
    let free = IntKey::IMBUED_EFFECT_SLOTS
        .iter()
        .copied()
        .find(|slot| target.properties.get_int(*slot).is_none());
    match free {
        Some(slot) => {
            target.properties.set_int(slot, effect.to_stored());
            true
        }
        None => false,
    }
}

/// Add `delta` to an integer stat, treating absence as zero.
pub(crate) fn add_int(target: &mut WorldObject, key: IntKey, delta: i32) -> i32 {
    let value = target
        .properties
        .get_int(key)
        .unwrap_or(0)
        .saturating_add(delta);
    target.properties.set_int(key, value);
    value
}

/// Add `delta` to a float stat, starting from `base` when absent.
pub(crate) fn add_float(target: &mut WorldObject, key: FloatKey, delta: f64, base: f64) -> f64 {
    let value = target.properties.get_float(key).unwrap_or(base) + delta;
    target.properties.set_float(key, value);
    value
}

/// The weapon's stored damage type, if any.
pub(crate) fn damage_type(target: &WorldObject) -> Option<DamageType> {
    target
        .properties
        .get_int(IntKey::DAMAGE_TYPE)
        .map(DamageType::from_stored)
}

/// Outcome of trying to make a weapon resistance-cleaving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleaveOutcome {
    /// Cleaving was granted against this damage type.
    Granted(DamageType),
    /// The weapon already cleaves.
    AlreadyCleaving,
    /// The weapon's damage type cannot cleave, or it already rends that
    /// element.
    Ineligible,
}

/// Grant resistance cleaving against the weapon's own damage type.
///
/// Slash/pierce weapons pick one of the two with an even roll when they
/// rend neither.
pub fn grant_resistance_cleave(job: &mut TinkerJob<'_>) -> CleaveOutcome {
    if job
        .target
        .properties
        .get_int(IntKey::RESISTANCE_MODIFIER_TYPE)
        .is_some()
    {
        return CleaveOutcome::AlreadyCleaving;
    }
    let Some(kind) = damage_type(job.target) else {
        return CleaveOutcome::Ineligible;
    };
    let rends = job.target.imbued_effects();

    let chosen = if kind == DamageType::SLASH_PIERCE {
        if rends.contains(ImbuedEffects::SLASH_RENDING) || rends.contains(ImbuedEffects::PIERCE_RENDING) {
            return CleaveOutcome::Ineligible;
        }
        if job.roll(1, 100) <= 50 {
            DamageType::SLASH
        } else {
            DamageType::PIERCE
        }
    } else {
        match kind.rending() {
            Some(rending) if !rends.contains(rending) => kind,
            _ => return CleaveOutcome::Ineligible,
        }
    };

    job.target
        .properties
        .set_float(FloatKey::RESISTANCE_MODIFIER, 1.0);
    job.target
        .properties
        .set_int(IntKey::RESISTANCE_MODIFIER_TYPE, chosen.to_stored());
    CleaveOutcome::Granted(chosen)
}

#[cfg(test)]
pub(crate) mod testing {
    //! Fixtures shared by the tinkering tests.

    use artisan_types::{ItemType, WeenieType};

    use super::*;
    use crate::dice::ScriptedDice;
    use crate::notify::NoticeLog;
    use crate::services::StaticWorldLookup;

    pub fn salvage(material: MaterialType) -> WorldObject {
        let mut bag = WorldObject::new(
            EntityId(50),
            20_983,
            ItemType::TinkeringMaterial,
            WeenieType::Salvage,
            "Salvage (100)",
        );
        bag.properties
            .set_int(IntKey::MATERIAL_TYPE, material.id());
        bag.properties.set_int(IntKey::ITEM_WORKMANSHIP, 8);
        bag
    }

    pub fn armor() -> WorldObject {
        let mut plate = WorldObject::new(
            EntityId(60),
            2_000,
            ItemType::Armor,
            WeenieType::Clothing,
            "Breastplate",
        );
        plate.properties.set_int(IntKey::ARMOR_LEVEL, 100);
        plate
    }

    pub fn sword() -> WorldObject {
        let mut sword = WorldObject::new(
            EntityId(61),
            3_000,
            ItemType::MeleeWeapon,
            WeenieType::MeleeWeapon,
            "Broad Sword",
        );
        sword.properties.set_int(IntKey::DAMAGE, 40);
        sword
            .properties
            .set_int(IntKey::DAMAGE_TYPE, DamageType::SLASH.to_stored());
        sword
    }

    /// Run `f` with a job over `tool` and `target`.
    pub fn with_job<T>(
        tool: &WorldObject,
        target: &mut WorldObject,
        dice: &mut ScriptedDice,
        log: &mut NoticeLog,
        f: impl FnOnce(&mut TinkerJob<'_>) -> T,
    ) -> T {
        let lookup = StaticWorldLookup::new();
        let mut job = TinkerJob {
            actor_id: EntityId(1),
            actor_name: "Aldric",
            tool,
            target,
            dice,
            notifier: log,
            lookup: &lookup,
        };
        f(&mut job)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::dice::ScriptedDice;
    use crate::notify::NoticeLog;

    // -----------------------------------------------------------------------
    // Imbued effects
    // -----------------------------------------------------------------------

    #[test]
    fn imbue_fills_slots_in_order() {
        let mut target = sword();
        assert!(add_imbued_effect(&mut target, ImbuedEffects::CRITICAL_STRIKE));
        assert!(add_imbued_effect(&mut target, ImbuedEffects::FIRE_RENDING));
        assert_eq!(
            target.properties.get_int(IntKey::IMBUED_EFFECT),
            Some(ImbuedEffects::CRITICAL_STRIKE.to_stored())
        );
        assert_eq!(
            target.properties.get_int(IntKey::IMBUED_EFFECT_2),
            Some(ImbuedEffects::FIRE_RENDING.to_stored())
        );
    }

    #[test]
    fn imbue_rejects_duplicates() {
        let mut target = sword();
        assert!(add_imbued_effect(&mut target, ImbuedEffects::ARMOR_RENDING));
        assert!(!add_imbued_effect(&mut target, ImbuedEffects::ARMOR_RENDING));
        assert!(target.properties.get_int(IntKey::IMBUED_EFFECT_2).is_none());
    }

    #[test]
    fn sixth_imbue_leaves_five_slots_unchanged() {
        let mut target = sword();
        let five = [
            ImbuedEffects::CRITICAL_STRIKE,
            ImbuedEffects::CRIPPLING_BLOW,
            ImbuedEffects::ARMOR_RENDING,
            ImbuedEffects::SLASH_RENDING,
            ImbuedEffects::FIRE_RENDING,
        ];
        for effect in five {
            assert!(add_imbued_effect(&mut target, effect));
        }
        let before = target.properties.ints.clone();
        assert!(!add_imbued_effect(&mut target, ImbuedEffects::COLD_RENDING));
        assert_eq!(target.properties.ints, before);
    }

    // -----------------------------------------------------------------------
    // Tinker log
    // -----------------------------------------------------------------------

    #[test]
    fn record_tinker_appends_and_counts() {
        let tool = salvage(MaterialType::Steel);
        let mut target = armor();
        record_tinker(&tool, &mut target);
        record_tinker(&salvage(MaterialType::Alabaster), &mut target);
        assert_eq!(target.num_times_tinkered(), 2);
        assert_eq!(target.tinker_log().collect::<Vec<_>>(), vec!["64", "66"]);
    }

    // -----------------------------------------------------------------------
    // Resistance cleaving
    // -----------------------------------------------------------------------

    #[test]
    fn cleave_follows_damage_type() {
        let tool = salvage(MaterialType::Iron);
        let mut target = sword();
        let mut dice = ScriptedDice::new();
        let mut log = NoticeLog::new();
        let outcome = with_job(&tool, &mut target, &mut dice, &mut log, grant_resistance_cleave);
        assert_eq!(outcome, CleaveOutcome::Granted(DamageType::SLASH));
        assert_eq!(
            target.properties.get_float(FloatKey::RESISTANCE_MODIFIER),
            Some(1.0)
        );
    }

    #[test]
    fn cleave_is_blocked_by_matching_rend() {
        let tool = salvage(MaterialType::Iron);
        let mut target = sword();
        assert!(add_imbued_effect(&mut target, ImbuedEffects::SLASH_RENDING));
        let mut dice = ScriptedDice::new();
        let mut log = NoticeLog::new();
        let outcome = with_job(&tool, &mut target, &mut dice, &mut log, grant_resistance_cleave);
        assert_eq!(outcome, CleaveOutcome::Ineligible);
        assert!(
            target
                .properties
                .get_int(IntKey::RESISTANCE_MODIFIER_TYPE)
                .is_none()
        );
    }

    #[test]
    fn slash_pierce_weapons_split_on_an_even_roll() {
        let tool = salvage(MaterialType::Iron);
        let mut target = sword();
        target
            .properties
            .set_int(IntKey::DAMAGE_TYPE, DamageType::SLASH_PIERCE.to_stored());
        let mut dice = ScriptedDice::new().with_rolls([73]);
        let mut log = NoticeLog::new();
        let outcome = with_job(&tool, &mut target, &mut dice, &mut log, grant_resistance_cleave);
        assert_eq!(outcome, CleaveOutcome::Granted(DamageType::PIERCE));

        let again = with_job(&tool, &mut target, &mut dice, &mut log, grant_resistance_cleave);
        assert_eq!(again, CleaveOutcome::AlreadyCleaving);
    }
}
