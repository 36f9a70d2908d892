//! The acting player: skills, vitals, augmentations, and stance.

use std::collections::BTreeMap;

use artisan_types::{
    CombatMode, EntityId, ItemType, Skill, SkillAdvancementClass, Vital, WeenieType, WorldObject,
};
use serde::{Deserialize, Serialize};

/// One skill as seen by the chance calculator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRecord {
    /// Training level.
    pub advancement: SkillAdvancementClass,
    /// Current effective value, buffs included.
    pub current: u32,
}

/// Current and maximum value of one vital.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VitalPool {
    /// Current value.
    pub current: i32,
    /// Ceiling.
    pub max: i32,
}

impl VitalPool {
    /// A full pool.
    pub const fn full(max: i32) -> Self {
        Self { current: max, max }
    }

    /// Apply a delta, clamped to `[0, max]`. Returns the new value.
    pub fn adjust(&mut self, delta: i32) -> i32 {
        self.current = self.current.saturating_add(delta).clamp(0, self.max.max(0));
        self.current
    }
}

/// Health, stamina, and mana.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vitals {
    /// Health pool.
    pub health: VitalPool,
    /// Stamina pool.
    pub stamina: VitalPool,
    /// Mana pool.
    pub mana: VitalPool,
}

impl Vitals {
    /// The pool for `vital`.
    pub const fn pool_mut(&mut self, vital: Vital) -> &mut VitalPool {
        match vital {
            Vital::Health => &mut self.health,
            Vital::Stamina => &mut self.stamina,
            Vital::Mana => &mut self.mana,
        }
    }
}

/// Permanent augmentations that affect crafting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Augmentations {
    /// Flat bonus to every crafting skill.
    pub skilled_craft: u32,
    /// Ranks of the imbue chance augmentation.
    pub bonus_imbue_chance: u32,
}

/// The player performing an attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crafter {
    /// The actor's own world object and property store.
    pub object: WorldObject,
    /// Skills by id.
    #[serde(default)]
    pub skills: BTreeMap<Skill, SkillRecord>,
    /// Vitals.
    #[serde(default)]
    pub vitals: Vitals,
    /// Augmentation ranks.
    #[serde(default)]
    pub augmentations: Augmentations,
    /// Current stance.
    #[serde(default)]
    pub combat_mode: CombatMode,
    /// Whether the actor wants a confirmation dialog before skill-gated
    /// attempts.
    #[serde(default = "default_true")]
    pub show_craft_chance: bool,
    /// Gameplay mode tag; objects with a different tag are off limits.
    #[serde(default)]
    pub gameplay_mode: i32,
    /// Imbue attempts made.
    #[serde(default)]
    pub imbue_attempts: u32,
    /// Imbue attempts that succeeded.
    #[serde(default)]
    pub imbue_successes: u32,
}

const fn default_true() -> bool {
    true
}

impl Crafter {
    /// A new actor with full vitals and no skills.
    pub fn new(id: EntityId, name: &str) -> Self {
        Self {
            object: WorldObject::new(id, 1, ItemType::Creature, WeenieType::Creature, name),
            skills: BTreeMap::new(),
            vitals: Vitals {
                health: VitalPool::full(100),
                stamina: VitalPool::full(100),
                mana: VitalPool::full(100),
            },
            augmentations: Augmentations::default(),
            combat_mode: CombatMode::NonCombat,
            show_craft_chance: true,
            gameplay_mode: 0,
            imbue_attempts: 0,
            imbue_successes: 0,
        }
    }

    /// Builder-style skill assignment.
    #[must_use]
    pub fn with_skill(mut self, skill: Skill, advancement: SkillAdvancementClass, current: u32) -> Self {
        self.skills.insert(skill, SkillRecord { advancement, current });
        self
    }

    /// The actor's guid.
    pub const fn id(&self) -> EntityId {
        self.object.id
    }

    /// The actor's display name.
    pub fn name(&self) -> &str {
        self.object.name()
    }

    /// Whether the actor is in peace mode.
    pub fn in_peace_mode(&self) -> bool {
        self.combat_mode == CombatMode::NonCombat
    }

    /// Resolve a recipe skill id to the skill the actor actually uses.
    ///
    /// Retired melee skills map to whichever of heavy, light, or finesse
    /// weapons is highest. Retired missile skills map to missile weapons.
    pub fn resolve_skill(&self, skill: Skill) -> Skill {
        if skill.is_retired_melee() {
            [
                Skill::HeavyWeapons,
                Skill::LightWeapons,
                Skill::FinesseWeapons,
            ]
            .into_iter()
            .max_by_key(|s| self.skill_value(*s))
            .unwrap_or(Skill::HeavyWeapons)
        } else if skill.is_retired_missile() {
            Skill::MissileWeapons
        } else {
            skill
        }
    }

    /// The record for `skill`, if the actor has one.
    pub fn skill(&self, skill: Skill) -> Option<&SkillRecord> {
        self.skills.get(&skill)
    }

    fn skill_value(&self, skill: Skill) -> u32 {
        self.skills.get(&skill).map_or(0, |r| r.current)
    }
}
