//! Precondition checks that run before any roll or mutation.
//!
//! Requirement clauses encode the *failing* relationship: a clause with
//! comparator `GreaterThan` and threshold `T` rejects the attempt when the
//! live value is greater than `T`. Absent numeric values read as zero and
//! absent strings as empty, except for the existence comparators.
//!
//! Besides recipe clauses this module owns the independent checks that
//! must also pass: object reachability, gameplay mode, salvage combining
//! structure, and the tinkering pre-checks (tinker cap, salvage quality,
//! and repeated material).

use artisan_types::{
    CompareType, IntKey, ItemType, Placement, Recipe, RequirementCheck, RequirementClause,
    Subject, Usable, WorldObject,
};
use tracing::{debug, warn};

use crate::config::CraftingConfig;
use crate::crafter::Crafter;
use crate::notify::{ChatChannel, Notifier};
use crate::services::{WorldLookup, name_with_material};

/// Text sent when source or target belong to a different gameplay mode.
pub const GAMEPLAY_MODE_MESSAGE: &str = "These items cannot be used, incompatible gameplay mode!";

// ---------------------------------------------------------------------------
// Probes
// ---------------------------------------------------------------------------

/// A live numeric value normalized for comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Number {
    real: f64,
    bits: i64,
}

impl Number {
    fn int(value: i64) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let real = value as f64;
        Self { real, bits: value }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn float(value: f64) -> Self {
        Self {
            real: value,
            bits: value as i64,
        }
    }
}

/// Read the clause's stat from `object`, returning the live value (if
/// present) and the clause threshold.
fn numeric_probe(object: &WorldObject, check: &RequirementCheck) -> Option<(Option<Number>, Number)> {
    let props = &object.properties;
    let probe = match check {
        RequirementCheck::Bool { stat, value } => (
            props.get_bool(*stat).map(|b| Number::int(i64::from(b))),
            Number::int(i64::from(*value)),
        ),
        RequirementCheck::Int { stat, value } => (
            props.get_int(*stat).map(|v| Number::int(i64::from(v))),
            Number::int(i64::from(*value)),
        ),
        RequirementCheck::Float { stat, value } => {
            (props.get_float(*stat).map(Number::float), Number::float(*value))
        }
        RequirementCheck::InstanceId { stat, value } => (
            props.get_instance(*stat).map(|v| Number::int(i64::from(v.full()))),
            Number::int(i64::from(*value)),
        ),
        RequirementCheck::DataId { stat, value } => (
            props.get_data(*stat).map(|v| Number::int(i64::from(v))),
            Number::int(i64::from(*value)),
        ),
        RequirementCheck::Text { .. } => return None,
    };
    Some(probe)
}

/// Whether a numeric clause passes.
#[allow(clippy::float_cmp)]
fn numeric_passes(comparator: CompareType, live: Option<Number>, threshold: Number) -> bool {
    let value = live.map_or(0.0, |n| n.real);
    let bits = live.map_or(0, |n| n.bits);
    let fails = match comparator {
        CompareType::GreaterThan => value > threshold.real,
        CompareType::LessThanEqual => value <= threshold.real,
        CompareType::LessThan => value < threshold.real,
        CompareType::GreaterThanEqual => value >= threshold.real,
        CompareType::NotEqual => value != threshold.real,
        CompareType::NotEqualNotExist => live.is_none_or(|n| n.real != threshold.real),
        CompareType::Equal => value == threshold.real,
        CompareType::NotExist => live.is_none(),
        CompareType::Exist => live.is_some(),
        CompareType::NotHasBits => bits & threshold.bits == 0,
        CompareType::HasBits => bits & threshold.bits == threshold.bits,
        CompareType::Unknown => false,
    };
    !fails
}

/// Whether a string clause passes. Ordering comparators are not defined
/// for strings and always pass.
fn text_passes(comparator: CompareType, live: Option<&str>, threshold: &str) -> bool {
    let fails = match comparator {
        CompareType::NotEqual => live.unwrap_or_default() != threshold,
        CompareType::NotEqualNotExist => live.is_none_or(|s| s != threshold),
        CompareType::Equal => live.unwrap_or_default() == threshold,
        CompareType::NotExist => live.is_none(),
        CompareType::Exist => live.is_some(),
        other => {
            warn!(comparator = ?other, "comparator not supported for strings, passing");
            false
        }
    };
    !fails
}

/// Evaluate one clause against `object`.
pub fn clause_passes(clause: &RequirementClause, object: &WorldObject) -> bool {
    if clause.comparator == CompareType::Unknown {
        warn!(subject = ?clause.subject, "unknown comparator, passing");
    }
    match &clause.check {
        RequirementCheck::Text { stat, value } => {
            text_passes(clause.comparator, object.properties.get_string(*stat), value)
        }
        check => numeric_probe(object, check)
            .is_none_or(|(live, threshold)| numeric_passes(clause.comparator, live, threshold)),
    }
}

// ---------------------------------------------------------------------------
// Evaluator
// ---------------------------------------------------------------------------

/// Runs every precondition for an attempt.
pub struct RequirementEvaluator<'a> {
    config: &'a CraftingConfig,
    lookup: &'a dyn WorldLookup,
}

impl<'a> RequirementEvaluator<'a> {
    /// Build an evaluator over the given config and world data.
    pub const fn new(config: &'a CraftingConfig, lookup: &'a dyn WorldLookup) -> Self {
        Self { config, lookup }
    }

    /// Evaluate the clauses of `recipe` that address `subject` against
    /// `object`. Stops at the first failure and sends its message.
    pub fn verify_subject(
        &self,
        recipe: &Recipe,
        subject: Subject,
        object: &WorldObject,
        actor: &Crafter,
        notifier: &mut dyn Notifier,
    ) -> bool {
        for clause in recipe.requirements.iter().filter(|c| c.subject == subject) {
            if !clause_passes(clause, object) {
                debug!(
                    recipe = recipe.id,
                    subject = ?subject,
                    comparator = ?clause.comparator,
                    "requirement failed"
                );
                if !clause.message.is_empty() {
                    notifier.send(actor.id(), ChatChannel::Craft, clause.message.as_str());
                }
                return false;
            }
        }
        true
    }

    /// Full precondition pass for a recipe attempt, or for salvage
    /// combining when `recipe` is `None`.
    ///
    /// Order: reachability, gameplay mode, then either the salvage
    /// structure checks or Target, Source, and Actor clauses followed by
    /// the tinkering pre-checks.
    pub fn verify(
        &self,
        recipe: Option<&Recipe>,
        actor: &Crafter,
        source: &WorldObject,
        target: &WorldObject,
        notifier: &mut dyn Notifier,
    ) -> bool {
        if !verify_use(actor, source, target) {
            debug!(source = %source.id, target = %target.id, "objects not reachable");
            return false;
        }

        if !verify_gameplay_mode(actor, source, target) {
            notifier.send(actor.id(), ChatChannel::Transient, GAMEPLAY_MODE_MESSAGE);
            return false;
        }

        let Some(recipe) = recipe else {
            return self.verify_salvage_combine(actor, source, target, notifier);
        };

        if !self.verify_subject(recipe, Subject::Target, target, actor, notifier)
            || !self.verify_subject(recipe, Subject::Source, source, actor, notifier)
            || !self.verify_subject(recipe, Subject::Actor, &actor.object, actor, notifier)
        {
            return false;
        }

        if recipe.is_tinkering() {
            return self.verify_tinkering(actor, source, target, notifier);
        }
        true
    }

    /// Tinker cap, minimum salvage quality, and repeated material checks.
    pub fn verify_tinkering(
        &self,
        actor: &Crafter,
        tool: &WorldObject,
        target: &WorldObject,
        notifier: &mut dyn Notifier,
    ) -> bool {
        let target_name = name_with_material(self.lookup, target);
        let max_tinkers = target
            .properties
            .get_int(IntKey::MAX_TINKER_COUNT)
            .unwrap_or(self.config.default_max_tinker_count);

        if target.num_times_tinkered() >= max_tinkers {
            notifier.send(
                actor.id(),
                ChatChannel::Broadcast,
                format!("The {target_name} cannot be tinkered any further."),
            );
            return false;
        }

        let min_quality = target
            .properties
            .get_int(IntKey::MIN_SALVAGE_QUALITY)
            .unwrap_or(0);
        let tool_quality = tool.workmanship().unwrap_or(0.0).floor();
        if tool_quality < f64::from(min_quality) {
            let tool_name = name_with_material(self.lookup, tool);
            notifier.send(
                actor.id(),
                ChatChannel::Broadcast,
                format!(
                    "The {tool_name} cannot be applied to {target_name} because its workmanship is not high enough."
                ),
            );
            return false;
        }

        let entry = tinker_log_entry(tool);
        if target.tinker_log().any(|logged| logged == entry) {
            let material = tool.material().map_or_else(
                || name_with_material(self.lookup, tool),
                |m| self.lookup.material_name(m),
            );
            notifier.send(
                actor.id(),
                ChatChannel::Broadcast,
                format!("The {target_name} has already been tinkered with {material}."),
            );
            return false;
        }
        true
    }

    /// Structural checks for combining two salvage bags.
    pub fn verify_salvage_combine(
        &self,
        actor: &Crafter,
        source: &WorldObject,
        target: &WorldObject,
        notifier: &mut dyn Notifier,
    ) -> bool {
        let complete = self.config.salvage_complete_structure;
        for bag in [source, target] {
            if bag.properties.get_int(IntKey::STRUCTURE).unwrap_or(0) >= complete {
                let name = name_with_material(self.lookup, bag);
                notifier.send(
                    actor.id(),
                    ChatChannel::Broadcast,
                    format!("The {name} is already complete and cannot be combined."),
                );
                return false;
            }
        }
        if source.material() != target.material() {
            notifier.send(
                actor.id(),
                ChatChannel::Broadcast,
                "Only bags of the same material can be combined.",
            );
            return false;
        }
        true
    }
}

/// The tinker-log token for a tool: its material id, or its weenie class
/// when it has no material.
pub fn tinker_log_entry(tool: &WorldObject) -> String {
    tool.material()
        .map_or_else(|| tool.weenie_class_id.to_string(), |m| m.id().to_string())
}

/// Whether both objects are salvage bags eligible for the combining path.
pub fn is_salvage_pair(source: &WorldObject, target: &WorldObject) -> bool {
    source.item_type == ItemType::TinkeringMaterial && target.item_type == ItemType::TinkeringMaterial
}

// ---------------------------------------------------------------------------
// Reachability and gameplay mode
// ---------------------------------------------------------------------------

/// Whether the actor can reach both objects given the source's usability
/// flags. A source without flags must be in the actor's pack and the target
/// in the pack or equipped.
pub fn verify_use(actor: &Crafter, source: &WorldObject, target: &WorldObject) -> bool {
    let usable = source
        .properties
        .get_int(IntKey::ITEM_USEABLE)
        .map(Usable::from_stored)
        .unwrap_or_default();

    let holder = actor.id();
    if usable.0 == 0 {
        warn!(source = %source.id, "source has no usability flags, using defaults");
        return source.is_contained_by(holder)
            && (target.is_contained_by(holder) || target.is_wielded_by(holder));
    }

    reachable(actor, source, usable.source_flags()) && reachable(actor, target, usable.target_flags())
}

fn reachable(actor: &Crafter, object: &WorldObject, flags: u32) -> bool {
    let holder = actor.id();
    let contained = object.is_contained_by(holder);
    let wielded = object.is_wielded_by(holder);

    (flags & Usable::CONTAINED != 0 && (contained || wielded))
        || (flags & Usable::WIELDED != 0 && wielded)
        || (flags & Usable::REMOTE != 0
            && (contained || wielded || object.placement == Placement::World))
}

/// Objects tagged with a gameplay mode are only usable by actors in the
/// same mode.
pub fn verify_gameplay_mode(actor: &Crafter, source: &WorldObject, target: &WorldObject) -> bool {
    [source, target].iter().all(|object| {
        object
            .properties
            .get_int(IntKey::GAMEPLAY_MODE)
            .is_none_or(|mode| mode == actor.gameplay_mode)
    })
}
