//! The property mutation engine.
//!
//! Applies a recipe's ordered modification clauses to the participants of
//! an attempt and records every object written. Clauses run in recipe
//! order; a clause that cannot be applied is logged and skipped without
//! aborting the rest.

use artisan_types::{
    BoolKey, ClauseEffect, DataKey, EntityId, FloatKey, InstanceKey, IntKey, ModificationClause,
    ModificationOperation, Recipe, Selector, StringKey, UI_EFFECT_MAGICAL, Vital, WorldObject,
};
use tracing::{debug, error, warn};

use crate::context::{Collaborators, ModifiedSet, Participants};
use crate::crafter::Crafter;
use crate::dispatch::MutationDispatch;
use crate::services::WorldLookup;
use crate::tinkering::TinkerJob;

/// Spellcraft and difficulty added alongside a granted spell.
pub const SPELL_GRANT_DIFFICULTY: i32 = 25;

/// Applies modification clauses.
pub struct MutationEngine<'a> {
    dispatch: &'a dyn MutationDispatch,
}

impl<'a> MutationEngine<'a> {
    /// An engine that resolves `Mutation` clauses through `dispatch`.
    pub const fn new(dispatch: &'a dyn MutationDispatch) -> Self {
        Self { dispatch }
    }

    /// Apply every clause of `recipe` whose success flag matches `success`.
    pub fn apply(
        &self,
        recipe: &Recipe,
        success: bool,
        parts: &mut Participants<'_>,
        collab: &mut Collaborators<'_>,
    ) -> ModifiedSet {
        let mut modified = ModifiedSet::new();
        for clause in recipe
            .modifications
            .iter()
            .filter(|clause| clause.executes_on_success == success)
        {
            if let Some(id) = self.apply_clause(recipe, clause, parts, collab) {
                modified.insert(id);
            }
        }
        debug!(
            recipe = recipe.id,
            success,
            modified = modified.len(),
            dispatch = self.dispatch.name(),
            "modifications applied"
        );
        modified
    }

    /// Apply one clause. Returns the guid written, if any.
    pub fn apply_clause(
        &self,
        recipe: &Recipe,
        clause: &ModificationClause,
        parts: &mut Participants<'_>,
        collab: &mut Collaborators<'_>,
    ) -> Option<EntityId> {
        match &clause.effect {
            ClauseEffect::Bool { stat, op, value } => modify_bool(recipe, clause, *stat, *op, *value, parts),
            ClauseEffect::Int { stat, op, value } => modify_int(recipe, clause, *stat, *op, *value, parts),
            ClauseEffect::Float { stat, op, value } => {
                modify_float(recipe, clause, *stat, *op, *value, parts)
            }
            ClauseEffect::Text { stat, op, value } => modify_text(recipe, clause, *stat, *op, value, parts),
            ClauseEffect::InstanceId { stat, op, value } => {
                modify_instance(recipe, clause, *stat, *op, *value, parts)
            }
            ClauseEffect::DataId { stat, op, value } => {
                modify_data(recipe, clause, *stat, *op, *value, parts)
            }
            ClauseEffect::Vital { vital, delta } => Some(modify_vital(parts.actor, *vital, *delta, collab)),
            ClauseEffect::WeenieClass { class_id } => {
                let object = parts.get_mut(clause.write_to);
                mutate_weenie_class(object, *class_id, collab.lookup).then_some(object.id)
            }
            ClauseEffect::Mutation { data_id } => self.mutate(recipe, clause, *data_id, parts, collab),
        }
    }

    fn mutate(
        &self,
        recipe: &Recipe,
        clause: &ModificationClause,
        data_id: u32,
        parts: &mut Participants<'_>,
        collab: &mut Collaborators<'_>,
    ) -> Option<EntityId> {
        let Some((actor, tool, target)) = tinker_split(parts, clause.write_to) else {
            warn!(
                recipe = recipe.id,
                data_id,
                write_to = ?clause.write_to,
                "mutation clause must write to the target or result, clause skipped"
            );
            return None;
        };
        let mut job = TinkerJob {
            actor_id: actor.id(),
            actor_name: actor.name(),
            tool,
            target,
            dice: &mut *collab.dice,
            notifier: &mut *collab.notifier,
            lookup: collab.lookup,
        };
        let changed = self.dispatch.mutate(recipe, data_id, &mut job);
        changed.then_some(job.target.id)
    }
}

impl std::fmt::Debug for MutationEngine<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutationEngine")
            .field("dispatch", &self.dispatch.name())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Selector helpers
// ---------------------------------------------------------------------------

/// The participant a clause writes to. Copy operations name their
/// destination in the operation itself.
const fn destination(op: ModificationOperation, write_to: Selector) -> Selector {
    match op {
        ModificationOperation::CopyFromSourceToTarget => Selector::Target,
        ModificationOperation::CopyFromSourceToResult => Selector::Result,
        _ => write_to,
    }
}

const fn is_copy(op: ModificationOperation) -> bool {
    matches!(
        op,
        ModificationOperation::CopyFromSourceToTarget | ModificationOperation::CopyFromSourceToResult
    )
}

/// The actor, the tool, and the object a mutation writes, borrowed apart.
fn tinker_split<'p>(
    parts: &'p mut Participants<'_>,
    write_to: Selector,
) -> Option<(&'p Crafter, &'p WorldObject, &'p mut WorldObject)> {
    let Participants {
        actor,
        source,
        target,
        result,
    } = parts;
    let written: &'p mut WorldObject = match write_to {
        Selector::Target => &mut **target,
        Selector::Result => match result.as_deref_mut() {
            Some(result) => result,
            None => &mut **target,
        },
        Selector::Source | Selector::Actor => return None,
    };
    Some((&**actor, &**source, written))
}

fn unsupported(recipe: &Recipe, family: &'static str, op: ModificationOperation) {
    warn!(recipe = recipe.id, family, ?op, "unsupported modification operation, clause skipped");
}

// ---------------------------------------------------------------------------
// Property families
// ---------------------------------------------------------------------------

fn modify_bool(
    recipe: &Recipe,
    clause: &ModificationClause,
    stat: BoolKey,
    op: ModificationOperation,
    value: bool,
    parts: &mut Participants<'_>,
) -> Option<EntityId> {
    if op != ModificationOperation::SetValue {
        unsupported(recipe, "bool", op);
        return None;
    }
    let object = parts.get_mut(clause.write_to);
    object.properties.set_bool(stat, value);
    Some(object.id)
}

fn modify_int(
    recipe: &Recipe,
    clause: &ModificationClause,
    stat: IntKey,
    op: ModificationOperation,
    value: i32,
    parts: &mut Participants<'_>,
) -> Option<EntityId> {
    if op == ModificationOperation::AddSpell {
        let object = parts.get_mut(clause.write_to);
        let spell = u32::from(stat.0);
        return object.known_spells.insert(spell).then_some(object.id);
    }

    let copied = parts.get(clause.read_from).properties.get_int(stat).unwrap_or(0);
    let object = parts.get_mut(destination(op, clause.write_to));
    let current = object.properties.get_int(stat).unwrap_or(0);
    let next = match op {
        ModificationOperation::SetValue => value,
        ModificationOperation::Add => current.saturating_add(value),
        ModificationOperation::CopyFromSourceToTarget | ModificationOperation::CopyFromSourceToResult => {
            copied
        }
        ModificationOperation::SetBitsOn => current | value,
        ModificationOperation::SetBitsOff => current & !value,
        ModificationOperation::AddSpell | ModificationOperation::Unknown => {
            unsupported(recipe, "int", op);
            return None;
        }
    };
    object.properties.set_int(stat, next);
    Some(object.id)
}

fn modify_float(
    recipe: &Recipe,
    clause: &ModificationClause,
    stat: FloatKey,
    op: ModificationOperation,
    value: f64,
    parts: &mut Participants<'_>,
) -> Option<EntityId> {
    let copied = parts
        .get(clause.read_from)
        .properties
        .get_float(stat)
        .unwrap_or(0.0);
    let object = parts.get_mut(destination(op, clause.write_to));
    let next = match op {
        ModificationOperation::SetValue => value,
        ModificationOperation::Add => object.properties.get_float(stat).unwrap_or(0.0) + value,
        _ if is_copy(op) => copied,
        _ => {
            unsupported(recipe, "float", op);
            return None;
        }
    };
    object.properties.set_float(stat, next);
    Some(object.id)
}

fn modify_text(
    recipe: &Recipe,
    clause: &ModificationClause,
    stat: StringKey,
    op: ModificationOperation,
    value: &str,
    parts: &mut Participants<'_>,
) -> Option<EntityId> {
    let copied = {
        let reader = parts.get(clause.read_from);
        reader
            .properties
            .get_string(stat)
            .unwrap_or_else(|| reader.name())
            .to_owned()
    };
    let object = parts.get_mut(destination(op, clause.write_to));
    let next = match op {
        ModificationOperation::SetValue => value.to_owned(),
        ModificationOperation::Add => {
            let mut text = object.properties.get_string(stat).unwrap_or_default().to_owned();
            text.push_str(value);
            text
        }
        _ if is_copy(op) => copied,
        _ => {
            unsupported(recipe, "string", op);
            return None;
        }
    };
    object.properties.set_string(stat, next);
    Some(object.id)
}

fn modify_instance(
    recipe: &Recipe,
    clause: &ModificationClause,
    stat: InstanceKey,
    op: ModificationOperation,
    value: u32,
    parts: &mut Participants<'_>,
) -> Option<EntityId> {
    let copied = {
        let reader = parts.get(clause.read_from);
        if stat.copies_identity() {
            reader.id
        } else {
            reader.properties.get_instance(stat).unwrap_or(EntityId(0))
        }
    };
    let object = parts.get_mut(destination(op, clause.write_to));
    let next = match op {
        ModificationOperation::SetValue => EntityId(value),
        _ if is_copy(op) => copied,
        _ => {
            unsupported(recipe, "instance", op);
            return None;
        }
    };
    object.properties.set_instance(stat, next);
    Some(object.id)
}

fn modify_data(
    recipe: &Recipe,
    clause: &ModificationClause,
    stat: DataKey,
    op: ModificationOperation,
    value: u32,
    parts: &mut Participants<'_>,
) -> Option<EntityId> {
    let copied = parts.get(clause.read_from).properties.get_data(stat).unwrap_or(0);
    let object = parts.get_mut(destination(op, clause.write_to));
    let next = match op {
        ModificationOperation::SetValue => value,
        _ if is_copy(op) => copied,
        _ => {
            unsupported(recipe, "data", op);
            return None;
        }
    };
    object.properties.set_data(stat, next);
    Some(object.id)
}

// ---------------------------------------------------------------------------
// Vitals, class changes, spells
// ---------------------------------------------------------------------------

/// Apply a vital delta to the actor. Health at or below zero runs the
/// death hook before returning.
pub fn modify_vital(
    actor: &mut Crafter,
    vital: Vital,
    delta: i32,
    collab: &mut Collaborators<'_>,
) -> EntityId {
    let current = actor.vitals.pool_mut(vital).adjust(delta);
    debug!(actor = %actor.id(), ?vital, delta, current, "vital adjusted");
    if vital == Vital::Health && current <= 0 {
        warn!(actor = %actor.id(), "actor killed by crafting");
        collab.hooks.on_death(actor);
    }
    actor.id()
}

/// Rewrite `object`'s weenie class to `class_id`.
///
/// Only weapons and casters can change class. The name and long
/// description swap the old class name for the new one; damage type, UI
/// effects, and setup come from the new class or are removed. An object
/// that still carries a proc spell or known spells stays magical.
pub fn mutate_weenie_class(object: &mut WorldObject, class_id: u32, lookup: &dyn WorldLookup) -> bool {
    if !object.item_type.supports_class_mutation() {
        error!(
            object = %object.id,
            class_id,
            item_type = ?object.item_type,
            "unsupported item type for class mutation"
        );
        return false;
    }
    let Some(weenie) = lookup.weenie(class_id) else {
        error!(object = %object.id, class_id, "class mutation names unknown weenie");
        return false;
    };

    let old_name = lookup
        .weenie(object.weenie_class_id)
        .map(|old| old.name.clone())
        .unwrap_or_default();
    if !old_name.is_empty() {
        for key in [StringKey::NAME, StringKey::LONG_DESC] {
            if let Some(text) = object.properties.get_string(key) {
                let renamed = text.replace(&old_name, &weenie.name);
                object.properties.set_string(key, renamed);
            }
        }
    }

    let new = &weenie.properties;
    match new.get_int(IntKey::DAMAGE_TYPE) {
        Some(kind) => object.properties.set_int(IntKey::DAMAGE_TYPE, kind),
        None => {
            object.properties.remove_int(IntKey::DAMAGE_TYPE);
        }
    }

    let enchanted =
        object.properties.get_data(DataKey::PROC_SPELL).is_some() || !object.known_spells.is_empty();
    match new.get_int(IntKey::UI_EFFECTS) {
        Some(effects) => object.properties.set_int(IntKey::UI_EFFECTS, effects),
        None if enchanted => object.properties.set_int(IntKey::UI_EFFECTS, UI_EFFECT_MAGICAL),
        None => {
            object.properties.remove_int(IntKey::UI_EFFECTS);
        }
    }

    match new.get_data(DataKey::SETUP) {
        Some(setup) => object.properties.set_data(DataKey::SETUP, setup),
        None => {
            object.properties.remove_data(DataKey::SETUP);
        }
    }

    debug!(object = %object.id, from = object.weenie_class_id, to = class_id, "weenie class changed");
    object.weenie_class_id = class_id;
    true
}

/// Grant `spell` to `target`, raising spellcraft and difficulty by
/// [`SPELL_GRANT_DIFFICULTY`] and marking it magical if it had no UI
/// effects. Returns `false` when the spell was already known.
pub fn add_spell_with_difficulty(target: &mut WorldObject, spell: u32) -> bool {
    if !target.known_spells.insert(spell) {
        return false;
    }
    for key in [IntKey::ITEM_SPELLCRAFT, IntKey::ITEM_DIFFICULTY] {
        let value = target
            .properties
            .get_int(key)
            .unwrap_or(0)
            .saturating_add(SPELL_GRANT_DIFFICULTY);
        target.properties.set_int(key, value);
    }
    if target.properties.get_int(IntKey::UI_EFFECTS).is_none() {
        target.properties.set_int(IntKey::UI_EFFECTS, UI_EFFECT_MAGICAL);
    }
    true
}

#[cfg(test)]
mod tests {
    use artisan_types::{ItemType, RecipeBranch, Weenie, WeenieType};

    use super::*;
    use crate::crafter::VitalPool;
    use crate::dice::ScriptedDice;
    use crate::dispatch::LegacyDispatch;
    use crate::notify::NoticeLog;
    use crate::services::{CraftHooks, NoHooks, StaticWorldLookup, WeenieFactory};

    const ACTOR: EntityId = EntityId(1);
    const SOURCE: EntityId = EntityId(2);
    const TARGET: EntityId = EntityId(3);
    const RESULT: EntityId = EntityId(4);

    fn object(id: EntityId, name: &str) -> WorldObject {
        WorldObject::new(id, id.0, ItemType::Misc, WeenieType::Generic, name)
    }

    fn clause(effect: ClauseEffect) -> ModificationClause {
        ModificationClause {
            executes_on_success: true,
            effect,
            read_from: Selector::Source,
            write_to: Selector::Target,
        }
    }

    fn recipe(modifications: Vec<ModificationClause>) -> Recipe {
        Recipe {
            id: 77,
            skill: 0,
            difficulty: 0,
            salvage_type: 0,
            success: RecipeBranch::default(),
            failure: RecipeBranch::default(),
            requirements: Vec::new(),
            modifications,
        }
    }

    #[derive(Default)]
    struct DeathCounter(u32);

    impl CraftHooks for DeathCounter {
        fn on_death(&mut self, _actor: &mut Crafter) {
            self.0 = self.0.saturating_add(1);
        }
    }

    struct Scene {
        actor: Crafter,
        source: WorldObject,
        target: WorldObject,
        result: Option<WorldObject>,
        lookup: StaticWorldLookup,
    }

    impl Scene {
        fn new() -> Self {
            Self {
                actor: Crafter::new(ACTOR, "Aldric"),
                source: object(SOURCE, "Oil"),
                target: object(TARGET, "Bow"),
                result: None,
                lookup: StaticWorldLookup::new(),
            }
        }

        fn run(&mut self, recipe: &Recipe, success: bool, hooks: &mut dyn CraftHooks) -> ModifiedSet {
            let mut dice = ScriptedDice::new();
            let mut log = NoticeLog::new();
            let mut factory = WeenieFactory::starting_at(100);
            let mut parts = Participants {
                actor: &mut self.actor,
                source: &mut self.source,
                target: &mut self.target,
                result: self.result.as_mut(),
            };
            let mut collab = Collaborators {
                lookup: &self.lookup,
                notifier: &mut log,
                hooks,
                dice: &mut dice,
                factory: &mut factory,
            };
            MutationEngine::new(&LegacyDispatch).apply(recipe, success, &mut parts, &mut collab)
        }
    }

    // -----------------------------------------------------------------------
    // Clause selection
    // -----------------------------------------------------------------------

    #[test]
    fn only_matching_branch_clauses_run() {
        let mut failure = clause(ClauseEffect::Int {
            stat: IntKey::VALUE,
            op: ModificationOperation::SetValue,
            value: 1,
        });
        failure.executes_on_success = false;
        let success = clause(ClauseEffect::Int {
            stat: IntKey::VALUE,
            op: ModificationOperation::SetValue,
            value: 2,
        });
        let recipe = recipe(vec![failure, success]);

        let mut scene = Scene::new();
        scene.run(&recipe, true, &mut NoHooks);
        assert_eq!(scene.target.properties.get_int(IntKey::VALUE), Some(2));

        let mut scene = Scene::new();
        scene.run(&recipe, false, &mut NoHooks);
        assert_eq!(scene.target.properties.get_int(IntKey::VALUE), Some(1));
    }

    #[test]
    fn clauses_apply_in_order() {
        let recipe = recipe(vec![
            clause(ClauseEffect::Int {
                stat: IntKey::VALUE,
                op: ModificationOperation::SetValue,
                value: 10,
            }),
            clause(ClauseEffect::Int {
                stat: IntKey::VALUE,
                op: ModificationOperation::Add,
                value: 5,
            }),
            clause(ClauseEffect::Int {
                stat: IntKey::VALUE,
                op: ModificationOperation::SetBitsOff,
                value: 0b1,
            }),
        ]);
        let mut scene = Scene::new();
        scene.run(&recipe, true, &mut NoHooks);
        assert_eq!(scene.target.properties.get_int(IntKey::VALUE), Some(14));
    }

    // -----------------------------------------------------------------------
    // Families
    // -----------------------------------------------------------------------

    #[test]
    fn add_treats_absent_as_zero() {
        let recipe = recipe(vec![clause(ClauseEffect::Float {
            stat: FloatKey::DAMAGE_MOD,
            op: ModificationOperation::Add,
            value: 0.25,
        })]);
        let mut scene = Scene::new();
        scene.run(&recipe, true, &mut NoHooks);
        assert_eq!(scene.target.properties.get_float(FloatKey::DAMAGE_MOD), Some(0.25));
    }

    #[test]
    fn set_bits_on_ors_the_mask() {
        let recipe = recipe(vec![clause(ClauseEffect::Int {
            stat: IntKey::UI_EFFECTS,
            op: ModificationOperation::SetBitsOn,
            value: 0b100,
        })]);
        let mut scene = Scene::new();
        scene.target.properties.set_int(IntKey::UI_EFFECTS, 0b001);
        scene.run(&recipe, true, &mut NoHooks);
        assert_eq!(scene.target.properties.get_int(IntKey::UI_EFFECTS), Some(0b101));
    }

    #[test]
    fn copy_reads_from_read_source() {
        let mut to_result = clause(ClauseEffect::Int {
            stat: IntKey::VALUE,
            op: ModificationOperation::CopyFromSourceToResult,
            value: 0,
        });
        to_result.read_from = Selector::Target;
        let recipe = recipe(vec![to_result]);

        let mut scene = Scene::new();
        scene.target.properties.set_int(IntKey::VALUE, 900);
        scene.result = Some(object(RESULT, "Result"));
        let modified = scene.run(&recipe, true, &mut NoHooks);

        let result = scene.result.unwrap_or_else(|| object(EntityId(0), ""));
        assert_eq!(result.properties.get_int(IntKey::VALUE), Some(900));
        assert!(modified.contains(RESULT));
        assert!(!modified.contains(TARGET));
    }

    #[test]
    fn copy_of_absent_numeric_writes_zero() {
        let recipe = recipe(vec![clause(ClauseEffect::DataId {
            stat: DataKey::ICON_OVERLAY,
            op: ModificationOperation::CopyFromSourceToTarget,
            value: 0,
        })]);
        let mut scene = Scene::new();
        scene.run(&recipe, true, &mut NoHooks);
        assert_eq!(scene.target.properties.get_data(DataKey::ICON_OVERLAY), Some(0));
    }

    #[test]
    fn string_copy_defaults_to_read_source_name() {
        let recipe = recipe(vec![clause(ClauseEffect::Text {
            stat: StringKey::LONG_DESC,
            op: ModificationOperation::CopyFromSourceToTarget,
            value: String::new(),
        })]);
        let mut scene = Scene::new();
        scene.run(&recipe, true, &mut NoHooks);
        assert_eq!(scene.target.properties.get_string(StringKey::LONG_DESC), Some("Oil"));
    }

    #[test]
    fn string_add_appends() {
        let recipe = recipe(vec![clause(ClauseEffect::Text {
            stat: StringKey::LONG_DESC,
            op: ModificationOperation::Add,
            value: " Inscribed.".to_owned(),
        })]);
        let mut scene = Scene::new();
        scene.target.properties.set_string(StringKey::LONG_DESC, "A bow.");
        scene.run(&recipe, true, &mut NoHooks);
        assert_eq!(
            scene.target.properties.get_string(StringKey::LONG_DESC),
            Some("A bow. Inscribed.")
        );
    }

    #[test]
    fn wielder_copy_writes_read_source_identity() {
        let mut bind = clause(ClauseEffect::InstanceId {
            stat: InstanceKey::ALLOWED_WIELDER,
            op: ModificationOperation::CopyFromSourceToTarget,
            value: 0,
        });
        bind.read_from = Selector::Actor;
        let recipe = recipe(vec![bind]);
        let mut scene = Scene::new();
        scene.run(&recipe, true, &mut NoHooks);
        assert_eq!(
            scene.target.properties.get_instance(InstanceKey::ALLOWED_WIELDER),
            Some(ACTOR)
        );
    }

    #[test]
    fn add_spell_is_idempotent() {
        let grant = clause(ClauseEffect::Int {
            stat: IntKey(2_101),
            op: ModificationOperation::AddSpell,
            value: 0,
        });
        let recipe = recipe(vec![grant]);
        let mut scene = Scene::new();

        let first = scene.run(&recipe, true, &mut NoHooks);
        assert!(first.contains(TARGET));
        let second = scene.run(&recipe, true, &mut NoHooks);
        assert!(second.is_empty());
        assert_eq!(scene.target.known_spells.len(), 1);
    }

    #[test]
    fn unsupported_operation_is_skipped() {
        let recipe = recipe(vec![
            clause(ClauseEffect::Bool {
                stat: BoolKey::RETAINED,
                op: ModificationOperation::Add,
                value: true,
            }),
            clause(ClauseEffect::Int {
                stat: IntKey::VALUE,
                op: ModificationOperation::Unknown,
                value: 3,
            }),
            clause(ClauseEffect::Int {
                stat: IntKey::STRUCTURE,
                op: ModificationOperation::SetValue,
                value: 3,
            }),
        ]);
        let mut scene = Scene::new();
        let modified = scene.run(&recipe, true, &mut NoHooks);
        assert!(scene.target.properties.get_bool(BoolKey::RETAINED).is_none());
        assert!(scene.target.properties.get_int(IntKey::VALUE).is_none());
        assert_eq!(scene.target.properties.get_int(IntKey::STRUCTURE), Some(3));
        assert_eq!(modified.len(), 1);
    }

    #[test]
    fn modified_set_excludes_untouched_objects() {
        let mut on_source = clause(ClauseEffect::Bool {
            stat: BoolKey::RETAINED,
            op: ModificationOperation::SetValue,
            value: true,
        });
        on_source.write_to = Selector::Source;
        let recipe = recipe(vec![on_source]);
        let mut scene = Scene::new();
        let modified = scene.run(&recipe, true, &mut NoHooks);
        assert!(modified.contains(SOURCE));
        assert!(!modified.contains(TARGET));
        assert!(!modified.contains(ACTOR));
    }

    // -----------------------------------------------------------------------
    // Vitals
    // -----------------------------------------------------------------------

    #[test]
    fn lethal_health_loss_runs_death_hook() {
        let recipe = recipe(vec![clause(ClauseEffect::Vital {
            vital: Vital::Health,
            delta: -500,
        })]);
        let mut scene = Scene::new();
        scene.actor.vitals.health = VitalPool::full(100);
        let mut deaths = DeathCounter::default();
        let modified = scene.run(&recipe, true, &mut deaths);
        assert_eq!(scene.actor.vitals.health.current, 0);
        assert_eq!(deaths.0, 1);
        assert!(modified.contains(ACTOR));
    }

    #[test]
    fn stamina_loss_never_kills() {
        let recipe = recipe(vec![clause(ClauseEffect::Vital {
            vital: Vital::Stamina,
            delta: -500,
        })]);
        let mut scene = Scene::new();
        scene.actor.vitals.stamina = VitalPool::full(100);
        let mut deaths = DeathCounter::default();
        scene.run(&recipe, true, &mut deaths);
        assert_eq!(deaths.0, 0);
    }

    // -----------------------------------------------------------------------
    // Weenie class
    // -----------------------------------------------------------------------

    fn weenie(class_id: u32, name: &str, damage_type: Option<i32>) -> Weenie {
        let mut weenie = Weenie {
            class_id,
            name: name.to_owned(),
            item_type: ItemType::MeleeWeapon,
            weenie_type: WeenieType::MeleeWeapon,
            properties: Default::default(),
        };
        if let Some(kind) = damage_type {
            weenie.properties.set_int(IntKey::DAMAGE_TYPE, kind);
        }
        weenie
    }

    fn blade(class_id: u32) -> WorldObject {
        let mut blade = WorldObject::new(
            TARGET,
            class_id,
            ItemType::MeleeWeapon,
            WeenieType::MeleeWeapon,
            "Gold Katana",
        );
        blade
            .properties
            .set_string(StringKey::LONG_DESC, "A finely made Katana.");
        blade.properties.set_int(IntKey::DAMAGE_TYPE, 1);
        blade.properties.set_int(IntKey::UI_EFFECTS, 0x20);
        blade
    }

    #[test]
    fn class_change_rewrites_names_and_derived_stats() {
        let lookup = StaticWorldLookup::new()
            .with_weenie(weenie(100, "Katana", Some(1)))
            .with_weenie(weenie(200, "Fire Katana", Some(0x10)));
        let mut target = blade(100);
        assert!(mutate_weenie_class(&mut target, 200, &lookup));
        assert_eq!(target.weenie_class_id, 200);
        assert_eq!(target.name(), "Gold Fire Katana");
        assert_eq!(
            target.properties.get_string(StringKey::LONG_DESC),
            Some("A finely made Fire Katana.")
        );
        assert_eq!(target.properties.get_int(IntKey::DAMAGE_TYPE), Some(0x10));
        assert!(target.properties.get_int(IntKey::UI_EFFECTS).is_none());
    }

    #[test]
    fn class_change_keeps_magic_flag_on_enchanted_items() {
        let lookup = StaticWorldLookup::new()
            .with_weenie(weenie(100, "Katana", Some(1)))
            .with_weenie(weenie(200, "Katana", None));
        let mut target = blade(100);
        target.known_spells.insert(2_101);
        assert!(mutate_weenie_class(&mut target, 200, &lookup));
        assert_eq!(
            target.properties.get_int(IntKey::UI_EFFECTS),
            Some(UI_EFFECT_MAGICAL)
        );
        assert!(target.properties.get_int(IntKey::DAMAGE_TYPE).is_none());
    }

    #[test]
    fn class_change_rejects_armor() {
        let lookup = StaticWorldLookup::new().with_weenie(weenie(200, "Katana", None));
        let mut target = object(TARGET, "Helm");
        target.item_type = ItemType::Armor;
        assert!(!mutate_weenie_class(&mut target, 200, &lookup));
        assert_eq!(target.weenie_class_id, TARGET.0);
    }

    // -----------------------------------------------------------------------
    // Mutation clauses
    // -----------------------------------------------------------------------

    #[test]
    fn mutation_clause_runs_dispatch_on_target() {
        let recipe = recipe(vec![clause(ClauseEffect::Mutation { data_id: 0x3800_0011 })]);
        let mut scene = Scene::new();
        scene.target.properties.set_int(IntKey::ARMOR_LEVEL, 100);
        let modified = scene.run(&recipe, true, &mut NoHooks);
        assert_eq!(scene.target.properties.get_int(IntKey::ARMOR_LEVEL), Some(160));
        assert!(modified.contains(TARGET));
    }

    #[test]
    fn mutation_clause_cannot_write_the_tool() {
        let mut on_source = clause(ClauseEffect::Mutation { data_id: 0x3800_0011 });
        on_source.write_to = Selector::Source;
        let recipe = recipe(vec![on_source]);
        let mut scene = Scene::new();
        scene.source.properties.set_int(IntKey::ARMOR_LEVEL, 100);
        let modified = scene.run(&recipe, true, &mut NoHooks);
        assert_eq!(scene.source.properties.get_int(IntKey::ARMOR_LEVEL), Some(100));
        assert!(modified.is_empty());
    }

    // -----------------------------------------------------------------------
    // Spell grants
    // -----------------------------------------------------------------------

    #[test]
    fn spell_grant_raises_difficulty_once() {
        let mut target = object(TARGET, "Ring");
        assert!(add_spell_with_difficulty(&mut target, 2_101));
        assert!(!add_spell_with_difficulty(&mut target, 2_101));
        assert_eq!(target.properties.get_int(IntKey::ITEM_SPELLCRAFT), Some(25));
        assert_eq!(target.properties.get_int(IntKey::ITEM_DIFFICULTY), Some(25));
        assert_eq!(
            target.properties.get_int(IntKey::UI_EFFECTS),
            Some(UI_EFFECT_MAGICAL)
        );
    }
}
