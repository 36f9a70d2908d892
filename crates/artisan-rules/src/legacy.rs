//! The data-id keyed mutation table.
//!
//! Older recipe data names its tinkering effect by a mutation data id
//! rather than relying on the tool's material. This table keeps those ids
//! working. Its arithmetic differs from the material
//! strategies: increments leave absent stats absent, resistances are not
//! capped, and scalars truncate instead of rounding.

use artisan_types::{
    BoolKey, DataKey, FloatKey, HeritageGroup, ImbuedEffects, IntKey, Skill, StringKey,
    WorldObject,
};
use tracing::{error, warn};

use crate::tinkering::{TinkerJob, append_tinker_log};

/// One legacy effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LegacyEffect {
    /// Add to an integer stat when present.
    AddInt(IntKey, i32),
    /// Add to a float stat when present.
    AddFloat(FloatKey, f64),
    /// Add to a float stat, starting from zero.
    AddFloatFromZero(FloatKey, f64),
    /// Multiply an integer stat when present, truncating.
    ScaleInt(IntKey, f64),
    /// Multiply a float stat when present.
    ScaleFloat(FloatKey, f64),
    /// Overwrite the first imbue slot.
    SetImbue(ImbuedEffects),
    /// Set the retained flag.
    Retained(bool),
    /// Heritage group from the restriction name.
    HeritageFromRestriction,
    /// Move a defense activation requirement between skills.
    DefenseSwap {
        /// Skill currently required.
        from: Skill,
        /// Skill required afterwards.
        to: Skill,
        /// Multiplier on the required level.
        factor: f64,
    },
    /// Drop the rank limit; difficulty becomes spellcraft.
    RankLimit,
    /// Armatures: nothing to do and reported as not applied.
    Armature,
    /// Shorten weapon time by a fixed amount, not below zero.
    ReduceWeaponTime(i32),
    /// Copy the secondary icon overlay onto the primary.
    Stamp,
    /// Magic projectile damage reduction.
    Fetish,
    /// Raise the item level cap.
    ParagonLevel,
    /// Point existing resistance cleaving at the weapon's damage type.
    RetargetCleave,
}

/// A data id, its effect, and whether it appends to the tinker log.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegacyEntry {
    /// Mutation data id.
    pub data_id: u32,
    /// Effect.
    pub effect: LegacyEffect,
    /// Whether the tool is appended to the tinker log.
    pub logs_tinker: bool,
}

const fn entry(data_id: u32, effect: LegacyEffect, logs_tinker: bool) -> LegacyEntry {
    LegacyEntry {
        data_id,
        effect,
        logs_tinker,
    }
}

/// Base level written to paragon weapons.
const PARAGON_BASE_XP: i32 = 2_000_000_000;

/// Every known data id.
pub const LEGACY_TABLE: &[LegacyEntry] = &[
    // armor
    entry(0x3800_0011, LegacyEffect::AddInt(IntKey::ARMOR_LEVEL, 60), true),
    entry(0x3800_0017, LegacyEffect::AddFloat(FloatKey::ARMOR_MOD_VS_PIERCE, 0.2), true),
    entry(0x3800_0018, LegacyEffect::AddFloat(FloatKey::ARMOR_MOD_VS_SLASH, 0.2), true),
    entry(0x3800_0013, LegacyEffect::AddFloat(FloatKey::ARMOR_MOD_VS_BLUDGEON, 0.2), true),
    entry(0x3800_0012, LegacyEffect::AddFloat(FloatKey::ARMOR_MOD_VS_ACID, 0.4), true),
    entry(0x3800_0016, LegacyEffect::AddFloat(FloatKey::ARMOR_MOD_VS_FIRE, 0.4), true),
    entry(0x3800_0014, LegacyEffect::AddFloat(FloatKey::ARMOR_MOD_VS_COLD, 0.4), true),
    entry(0x3800_0015, LegacyEffect::AddFloat(FloatKey::ARMOR_MOD_VS_ELECTRIC, 0.4), true),
    entry(0x3800_0038, LegacyEffect::SetImbue(ImbuedEffects::MELEE_DEFENSE), true),
    entry(0x3800_0039, LegacyEffect::SetImbue(ImbuedEffects::MISSILE_DEFENSE), true),
    entry(0x3800_0037, LegacyEffect::SetImbue(ImbuedEffects::MAGIC_DEFENSE), true),
    // items
    entry(0x3800_001E, LegacyEffect::ScaleInt(IntKey::VALUE, 0.75), true),
    entry(0x3800_001F, LegacyEffect::ScaleInt(IntKey::VALUE, 1.25), true),
    entry(0x3800_0019, LegacyEffect::ScaleInt(IntKey::ENCUMBRANCE_VAL, 0.75), true),
    entry(0x3800_0043, LegacyEffect::Retained(true), false),
    entry(0x3800_004E, LegacyEffect::Retained(false), false),
    entry(0x3800_002F, LegacyEffect::AddInt(IntKey::ITEM_MAX_MANA, 500), true),
    entry(0x3800_0042, LegacyEffect::HeritageFromRestriction, true),
    entry(
        0x3800_0035,
        LegacyEffect::DefenseSwap {
            from: Skill::MissileDefense,
            to: Skill::MeleeDefense,
            factor: 1.0 / 0.7,
        },
        true,
    ),
    entry(
        0x3800_0034,
        LegacyEffect::DefenseSwap {
            from: Skill::MeleeDefense,
            to: Skill::MissileDefense,
            factor: 0.7,
        },
        true,
    ),
    entry(0x3800_0036, LegacyEffect::RankLimit, true),
    // armatures
    entry(0x3800_0048, LegacyEffect::Armature, false),
    entry(0x3800_0049, LegacyEffect::Armature, false),
    entry(0x3800_0050, LegacyEffect::Armature, false),
    entry(0x3800_0051, LegacyEffect::Armature, false),
    entry(0x3800_0052, LegacyEffect::Armature, false),
    entry(0x3800_0053, LegacyEffect::Armature, false),
    // element changes
    entry(0x3800_0054, LegacyEffect::RetargetCleave, false),
    entry(0x3800_0055, LegacyEffect::RetargetCleave, false),
    entry(0x3800_0056, LegacyEffect::RetargetCleave, false),
    entry(0x3800_0057, LegacyEffect::RetargetCleave, false),
    // magic items
    entry(0x3800_0025, LegacyEffect::SetImbue(ImbuedEffects::ARMOR_RENDING), true),
    entry(0x3800_0024, LegacyEffect::SetImbue(ImbuedEffects::CRIPPLING_BLOW), true),
    entry(0x3800_0023, LegacyEffect::SetImbue(ImbuedEffects::CRITICAL_STRIKE), true),
    entry(0x3800_002E, LegacyEffect::AddFloatFromZero(FloatKey::MANA_CONVERSION_MOD, 0.01), true),
    entry(0x3800_004B, LegacyEffect::AddFloatFromZero(FloatKey::ELEMENTAL_DAMAGE_MOD, 0.01), true),
    entry(0x3800_0041, LegacyEffect::SetImbue(ImbuedEffects::SPELLBOOK), true),
    // weapons
    entry(0x3800_001A, LegacyEffect::AddInt(IntKey::DAMAGE, 3), true),
    entry(0x3800_001B, LegacyEffect::AddFloat(FloatKey::DAMAGE_MOD, 0.12), true),
    entry(0x3800_001C, LegacyEffect::ScaleFloat(FloatKey::DAMAGE_VARIANCE, 0.8), true),
    entry(0x3800_001D, LegacyEffect::ReduceWeaponTime(50), true),
    entry(0x3800_0020, LegacyEffect::AddFloat(FloatKey::WEAPON_DEFENSE, 0.05), true),
    entry(0x3800_0021, LegacyEffect::AddFloat(FloatKey::WEAPON_OFFENSE, 0.05), true),
    // rendings
    entry(0x3800_003A, LegacyEffect::SetImbue(ImbuedEffects::ACID_RENDING), true),
    entry(0x3800_003B, LegacyEffect::SetImbue(ImbuedEffects::BLUDGEON_RENDING), true),
    entry(0x3800_003C, LegacyEffect::SetImbue(ImbuedEffects::COLD_RENDING), true),
    entry(0x3800_003D, LegacyEffect::SetImbue(ImbuedEffects::ELECTRIC_RENDING), true),
    entry(0x3800_003E, LegacyEffect::SetImbue(ImbuedEffects::FIRE_RENDING), true),
    entry(0x3800_003F, LegacyEffect::SetImbue(ImbuedEffects::PIERCE_RENDING), true),
    entry(0x3800_0040, LegacyEffect::SetImbue(ImbuedEffects::SLASH_RENDING), true),
    // addons
    entry(0x3800_000F, LegacyEffect::Stamp, false),
    entry(0x3800_0046, LegacyEffect::Fetish, false),
    entry(0x3900_0000, LegacyEffect::ParagonLevel, false),
];

/// The table row for `data_id`.
pub fn lookup(data_id: u32) -> Option<&'static LegacyEntry> {
    LEGACY_TABLE.iter().find(|row| row.data_id == data_id)
}

/// Apply the legacy effect for `data_id`.
///
/// Returns `false` for unknown ids, armatures, and defense swaps whose
/// precondition does not hold.
pub fn apply(data_id: u32, job: &mut TinkerJob<'_>) -> bool {
    let Some(row) = lookup(data_id) else {
        error!(
            data_id,
            tool = %job.tool.id,
            target = %job.target.id,
            "unknown mutation id"
        );
        return false;
    };
    if !row.effect.apply(job.target) {
        return false;
    }
    if row.logs_tinker {
        append_tinker_log(job.tool, job.target);
    }
    true
}

impl LegacyEffect {
    /// Apply to `target`.
    pub fn apply(self, target: &mut WorldObject) -> bool {
        let props = &mut target.properties;
        match self {
            Self::AddInt(key, amount) => {
                if let Some(value) = props.get_int(key) {
                    props.set_int(key, value.saturating_add(amount));
                }
            }
            Self::AddFloat(key, amount) => {
                if let Some(value) = props.get_float(key) {
                    props.set_float(key, value + amount);
                }
            }
            Self::AddFloatFromZero(key, amount) => {
                let value = props.get_float(key).unwrap_or(0.0) + amount;
                props.set_float(key, value);
            }
            Self::ScaleInt(key, factor) => {
                if let Some(value) = props.get_int(key) {
                    props.set_int(key, truncate(f64::from(value) * factor));
                }
            }
            Self::ScaleFloat(key, factor) => {
                if let Some(value) = props.get_float(key) {
                    props.set_float(key, value * factor);
                }
            }
            Self::SetImbue(effect) => props.set_int(IntKey::IMBUED_EFFECT, effect.to_stored()),
            Self::Retained(retained) => props.set_bool(BoolKey::RETAINED, retained),
            Self::HeritageFromRestriction => {
                let group = props
                    .get_string(StringKey::ITEM_HERITAGE_GROUP_RESTRICTION)
                    .and_then(HeritageGroup::from_restriction_name);
                if let Some(group) = group {
                    props.set_int(IntKey::HERITAGE_GROUP, group.id());
                }
            }
            Self::DefenseSwap { from, to, factor } => {
                let required = props.get_data(DataKey::ITEM_SKILL_LIMIT);
                let Some(level) = props.get_int(IntKey::ITEM_SKILL_LEVEL_LIMIT) else {
                    return false;
                };
                if required != Some(from.id()) {
                    warn!(target = %target.id, ?required, "defense swap precondition failed");
                    return false;
                }
                props.set_data(DataKey::ITEM_SKILL_LIMIT, to.id());
                props.set_int(
                    IntKey::ITEM_SKILL_LEVEL_LIMIT,
                    truncate(f64::from(level) * factor),
                );
            }
            Self::RankLimit => {
                props.remove_int(IntKey::ITEM_ALLEGIANCE_RANK_LIMIT);
                match props.get_int(IntKey::ITEM_SPELLCRAFT) {
                    Some(spellcraft) => props.set_int(IntKey::ITEM_DIFFICULTY, spellcraft),
                    None => {
                        props.remove_int(IntKey::ITEM_DIFFICULTY);
                    }
                }
            }
            Self::Armature => return false,
            Self::ReduceWeaponTime(cut) => {
                let time = props
                    .get_int(IntKey::WEAPON_TIME)
                    .unwrap_or(0)
                    .saturating_sub(cut)
                    .max(0);
                props.set_int(IntKey::WEAPON_TIME, time);
            }
            Self::Stamp => match props.get_data(DataKey::ICON_OVERLAY_SECONDARY) {
                Some(icon) => props.set_data(DataKey::ICON_OVERLAY, icon),
                None => {
                    props.remove_data(DataKey::ICON_OVERLAY);
                }
            },
            Self::Fetish => {
                let mut effect = props
                    .get_int(IntKey::IMBUED_EFFECT)
                    .map_or(ImbuedEffects::NONE, ImbuedEffects::from_stored);
                if effect.bits() >= ImbuedEffects::IGNORE_ALL_ARMOR.bits() {
                    effect = ImbuedEffects::NONE;
                }
                let effect = effect | ImbuedEffects::IGNORE_SOME_MAGIC_PROJECTILE_DAMAGE;
                props.set_int(IntKey::IMBUED_EFFECT, effect.to_stored());
            }
            Self::ParagonLevel => {
                let level = props
                    .get_int(IntKey::ITEM_MAX_LEVEL)
                    .unwrap_or(0)
                    .saturating_add(1);
                props.set_int(IntKey::ITEM_MAX_LEVEL, level);
                props.set_int(IntKey::ITEM_BASE_XP, PARAGON_BASE_XP);
                let total = props.get_int(IntKey::ITEM_TOTAL_XP).unwrap_or(0);
                props.set_int(IntKey::ITEM_TOTAL_XP, total);
            }
            Self::RetargetCleave => {
                if props.get_int(IntKey::RESISTANCE_MODIFIER_TYPE).is_some() {
                    match props.get_int(IntKey::DAMAGE_TYPE) {
                        Some(kind) => props.set_int(IntKey::RESISTANCE_MODIFIER_TYPE, kind),
                        None => {
                            props.remove_int(IntKey::RESISTANCE_MODIFIER_TYPE);
                        }
                    }
                }
            }
        }
        true
    }
}

/// Truncate toward zero, saturating at the `i32` range.
#[allow(clippy::cast_possible_truncation)]
fn truncate(value: f64) -> i32 {
    value as i32
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use std::collections::BTreeSet;

    use artisan_types::{DamageType, MaterialType};

    use super::*;
    use crate::dice::ScriptedDice;
    use crate::notify::NoticeLog;
    use crate::tinkering::TinkeringResolver;
    use crate::tinkering::testing::*;

    fn run(data_id: u32, target: &mut WorldObject) -> bool {
        let tool = salvage(MaterialType::Steel);
        let mut dice = ScriptedDice::new();
        let mut log = NoticeLog::new();
        with_job(&tool, target, &mut dice, &mut log, |job| apply(data_id, job))
    }

    #[test]
    fn ids_are_unique() {
        let ids: BTreeSet<u32> = LEGACY_TABLE.iter().map(|row| row.data_id).collect();
        assert_eq!(ids.len(), LEGACY_TABLE.len());
    }

    #[test]
    fn steel_adds_armor_and_appends_log_only() {
        let mut target = armor();
        assert!(run(0x3800_0011, &mut target));
        assert_eq!(target.properties.get_int(IntKey::ARMOR_LEVEL), Some(160));
        assert_eq!(target.tinker_log().collect::<Vec<_>>(), vec!["64"]);
        assert_eq!(target.num_times_tinkered(), 0);
    }

    #[test]
    fn increments_leave_absent_stats_absent() {
        let mut target = armor();
        assert!(run(0x3800_0017, &mut target));
        assert!(
            target
                .properties
                .get_float(FloatKey::ARMOR_MOD_VS_PIERCE)
                .is_none()
        );
    }

    #[test]
    fn legacy_resistance_is_uncapped_but_native_is_capped() {
        let mut legacy = armor();
        legacy
            .properties
            .set_float(FloatKey::ARMOR_MOD_VS_FIRE, 1.9);
        let mut native = legacy.clone();

        assert!(run(0x3800_0016, &mut legacy));
        let value = legacy
            .properties
            .get_float(FloatKey::ARMOR_MOD_VS_FIRE)
            .unwrap_or_default();
        assert!((value - 2.3).abs() < 1e-9);

        let resolver = TinkeringResolver::new(BTreeSet::new());
        let tool = salvage(MaterialType::Ceramic);
        let mut dice = ScriptedDice::new();
        let mut log = NoticeLog::new();
        with_job(&tool, &mut native, &mut dice, &mut log, |job| resolver.apply(job));
        assert_eq!(native.properties.get_float(FloatKey::ARMOR_MOD_VS_FIRE), Some(2.0));
    }

    #[test]
    fn legacy_value_truncates() {
        let mut target = armor();
        target.properties.set_int(IntKey::VALUE, 10);
        assert!(run(0x3800_001E, &mut target));
        assert_eq!(target.properties.get_int(IntKey::VALUE), Some(7));
    }

    #[test]
    fn imbue_overwrites_first_slot() {
        let mut target = sword();
        target
            .properties
            .set_int(IntKey::IMBUED_EFFECT, ImbuedEffects::CRITICAL_STRIKE.to_stored());
        assert!(run(0x3800_003A, &mut target));
        assert_eq!(target.imbued_effects(), ImbuedEffects::ACID_RENDING);
    }

    #[test]
    fn armatures_report_not_applied() {
        let mut target = armor();
        assert!(!run(0x3800_0049, &mut target));
        assert_eq!(target.tinker_log().count(), 0);
    }

    #[test]
    fn defense_swap_requires_matching_skill() {
        let mut target = armor();
        target
            .properties
            .set_data(DataKey::ITEM_SKILL_LIMIT, Skill::MeleeDefense.id());
        target
            .properties
            .set_int(IntKey::ITEM_SKILL_LEVEL_LIMIT, 300);
        assert!(!run(0x3800_0035, &mut target));

        assert!(run(0x3800_0034, &mut target));
        assert_eq!(
            target.properties.get_data(DataKey::ITEM_SKILL_LIMIT),
            Some(Skill::MissileDefense.id())
        );
        assert_eq!(target.properties.get_int(IntKey::ITEM_SKILL_LEVEL_LIMIT), Some(210));
    }

    #[test]
    fn element_change_retargets_existing_cleave() {
        let mut target = sword();
        target
            .properties
            .set_int(IntKey::RESISTANCE_MODIFIER_TYPE, DamageType::SLASH.to_stored());
        target
            .properties
            .set_int(IntKey::DAMAGE_TYPE, DamageType::FIRE.to_stored());
        assert!(run(0x3800_0055, &mut target));
        assert_eq!(
            target.properties.get_int(IntKey::RESISTANCE_MODIFIER_TYPE),
            Some(DamageType::FIRE.to_stored())
        );
    }

    #[test]
    fn paragon_raises_level_cap() {
        let mut target = sword();
        assert!(run(0x3900_0000, &mut target));
        assert!(run(0x3900_0000, &mut target));
        assert_eq!(target.properties.get_int(IntKey::ITEM_MAX_LEVEL), Some(2));
        assert_eq!(target.properties.get_int(IntKey::ITEM_TOTAL_XP), Some(0));
    }

    #[test]
    fn unknown_id_is_rejected() {
        let mut target = armor();
        let before = target.clone();
        assert!(!run(0x3800_9999, &mut target));
        assert_eq!(target, before);
    }
}
