//! Materials with one deterministic effect.

use artisan_types::{
    BoolKey, FloatKey, HeritageGroup, ImbuedEffects, IntKey, MaterialType, StringKey, WorldObject,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;

use super::{MaterialStrategy, TinkerJob, add_float, add_imbued_effect, add_int};

/// Ceiling for armor resistance modifiers raised by tinkering.
pub const RESISTANCE_CAP: f64 = 2.0;

/// Raise a resistance modifier, starting from zero and capped at
/// [`RESISTANCE_CAP`].
pub fn raise_resistance(target: &mut WorldObject, key: FloatKey, amount: f64) -> f64 {
    let value = (target.properties.get_float(key).unwrap_or(0.0) + amount).min(RESISTANCE_CAP);
    target.properties.set_float(key, value);
    value
}

/// Scale an integer stat by `percent` / 100 with banker's rounding.
/// Absent values scale from 1.
pub fn scale_int(target: &mut WorldObject, key: IntKey, percent: i64) -> Option<i32> {
    let current = Decimal::from(target.properties.get_int(key).unwrap_or(1));
    let scaled = current
        .checked_mul(Decimal::new(percent, 2))?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
        .to_i32()?;
    target.properties.set_int(key, scaled);
    Some(scaled)
}

/// A single deterministic change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FixedEffect {
    /// Raise an armor resistance, capped.
    Resistance {
        /// Resistance modifier.
        key: FloatKey,
        /// Increment.
        amount: f64,
    },
    /// Add an imbued effect to a free slot.
    Imbue(ImbuedEffects),
    /// Scale an integer stat by a percentage.
    ScaleInt {
        /// Stat.
        key: IntKey,
        /// Percentage, 100 leaves the value unchanged.
        percent: i64,
    },
    /// Set or clear the retained flag.
    Retained(bool),
    /// Add to an integer stat.
    AddInt {
        /// Stat.
        key: IntKey,
        /// Increment.
        amount: i32,
    },
    /// Add to a float stat.
    AddFloat {
        /// Stat.
        key: FloatKey,
        /// Increment.
        amount: f64,
        /// Starting value when absent.
        base: f64,
    },
    /// Multiply a float stat when present.
    ScaleFloat {
        /// Stat.
        key: FloatKey,
        /// Factor.
        factor: f64,
    },
    /// Restrict the item to one heritage.
    Heritage(HeritageGroup),
    /// Drop the allegiance rank limit and fold spellcraft into difficulty.
    RemoveRankLimit,
    /// Shorten weapon time by a random amount, not below zero.
    ReduceWeaponTime {
        /// Smallest reduction.
        low: i32,
        /// Largest reduction.
        high: i32,
    },
    /// Recipe clauses carry the whole effect.
    RecipeOnly,
    /// Armatures and trinkets: recipe clauses carry the effect and the
    /// tinker log is untouched.
    Skip,
}

impl FixedEffect {
    /// Apply to the job's target. Returns `false` only for [`Self::Skip`].
    pub fn apply(self, job: &mut TinkerJob<'_>) -> bool {
        let target = &mut *job.target;
        match self {
            Self::Resistance { key, amount } => {
                raise_resistance(target, key, amount);
            }
            Self::Imbue(effect) => {
                if !add_imbued_effect(target, effect) {
                    debug!(target = %target.id, ?effect, "imbue not added");
                }
            }
            Self::ScaleInt { key, percent } => {
                if scale_int(target, key, percent).is_none() {
                    debug!(target = %target.id, ?key, "scaled value out of range");
                }
            }
            Self::Retained(retained) => target.properties.set_bool(BoolKey::RETAINED, retained),
            Self::AddInt { key, amount } => {
                add_int(target, key, amount);
            }
            Self::AddFloat { key, amount, base } => {
                add_float(target, key, amount, base);
            }
            Self::ScaleFloat { key, factor } => {
                if let Some(value) = target.properties.get_float(key) {
                    target.properties.set_float(key, value * factor);
                }
            }
            Self::Heritage(group) => {
                target.properties.set_int(IntKey::HERITAGE_GROUP, group.id());
                target.properties.set_string(
                    StringKey::ITEM_HERITAGE_GROUP_RESTRICTION,
                    group.restriction_name(),
                );
            }
            Self::RemoveRankLimit => {
                target
                    .properties
                    .remove_int(IntKey::ITEM_ALLEGIANCE_RANK_LIMIT);
                let spellcraft = target
                    .properties
                    .get_int(IntKey::ITEM_SPELLCRAFT)
                    .unwrap_or(0);
                add_int(target, IntKey::ITEM_DIFFICULTY, spellcraft);
            }
            Self::ReduceWeaponTime { low, high } => {
                let cut = job.dice.roll(low, high);
                let time = target
                    .properties
                    .get_int(IntKey::WEAPON_TIME)
                    .unwrap_or(0)
                    .saturating_sub(cut)
                    .max(0);
                target.properties.set_int(IntKey::WEAPON_TIME, time);
            }
            Self::RecipeOnly => {}
            Self::Skip => return false,
        }
        true
    }
}

/// [`MaterialStrategy`] wrapping one [`FixedEffect`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedStrategy(pub FixedEffect);

impl MaterialStrategy for FixedStrategy {
    fn apply(&self, job: &mut TinkerJob<'_>) -> bool {
        self.0.apply(job)
    }
}

/// Every material with a deterministic effect.
pub const FIXED_EFFECTS: &[(MaterialType, FixedEffect)] = &[
    // armor
    (MaterialType::Alabaster, FixedEffect::Resistance { key: FloatKey::ARMOR_MOD_VS_PIERCE, amount: 0.2 }),
    (MaterialType::Bronze, FixedEffect::Resistance { key: FloatKey::ARMOR_MOD_VS_SLASH, amount: 0.2 }),
    (MaterialType::Marble, FixedEffect::Resistance { key: FloatKey::ARMOR_MOD_VS_BLUDGEON, amount: 0.2 }),
    (MaterialType::ArmoredilloHide, FixedEffect::Resistance { key: FloatKey::ARMOR_MOD_VS_ACID, amount: 0.4 }),
    (MaterialType::Ceramic, FixedEffect::Resistance { key: FloatKey::ARMOR_MOD_VS_FIRE, amount: 0.4 }),
    (MaterialType::Wool, FixedEffect::Resistance { key: FloatKey::ARMOR_MOD_VS_COLD, amount: 0.4 }),
    (MaterialType::ReedSharkHide, FixedEffect::Resistance { key: FloatKey::ARMOR_MOD_VS_ELECTRIC, amount: 0.4 }),
    (MaterialType::Peridot, FixedEffect::Imbue(ImbuedEffects::MELEE_DEFENSE)),
    (MaterialType::YellowTopaz, FixedEffect::Imbue(ImbuedEffects::MISSILE_DEFENSE)),
    (MaterialType::Zircon, FixedEffect::Imbue(ImbuedEffects::MAGIC_DEFENSE)),
    // items
    (MaterialType::Pine, FixedEffect::ScaleInt { key: IntKey::VALUE, percent: 75 }),
    (MaterialType::Gold, FixedEffect::ScaleInt { key: IntKey::VALUE, percent: 125 }),
    (MaterialType::Linen, FixedEffect::ScaleInt { key: IntKey::ENCUMBRANCE_VAL, percent: 75 }),
    (MaterialType::Ivory, FixedEffect::RecipeOnly),
    (MaterialType::Leather, FixedEffect::Retained(true)),
    (MaterialType::Sandstone, FixedEffect::Retained(false)),
    (MaterialType::Moonstone, FixedEffect::AddInt { key: IntKey::ITEM_MAX_MANA, amount: 500 }),
    (MaterialType::Teak, FixedEffect::Heritage(HeritageGroup::Aluvian)),
    (MaterialType::Ebony, FixedEffect::Heritage(HeritageGroup::Gharundim)),
    (MaterialType::Porcelain, FixedEffect::Heritage(HeritageGroup::Sho)),
    (MaterialType::Satin, FixedEffect::Heritage(HeritageGroup::Viamontian)),
    (MaterialType::Silk, FixedEffect::RemoveRankLimit),
    // armatures
    (MaterialType::Amber, FixedEffect::Skip),
    (MaterialType::Diamond, FixedEffect::Skip),
    (MaterialType::GromnieHide, FixedEffect::Skip),
    (MaterialType::Pyreal, FixedEffect::Skip),
    (MaterialType::Ruby, FixedEffect::Skip),
    (MaterialType::Sapphire, FixedEffect::Skip),
    // magic items
    (MaterialType::Sunstone, FixedEffect::Imbue(ImbuedEffects::ARMOR_RENDING)),
    (MaterialType::FireOpal, FixedEffect::Imbue(ImbuedEffects::CRIPPLING_BLOW)),
    (MaterialType::BlackOpal, FixedEffect::Imbue(ImbuedEffects::CRITICAL_STRIKE)),
    (MaterialType::Opal, FixedEffect::AddFloat { key: FloatKey::MANA_CONVERSION_MOD, amount: 0.01, base: 0.0 }),
    // weapons
    (MaterialType::Granite, FixedEffect::ScaleFloat { key: FloatKey::DAMAGE_VARIANCE, factor: 0.8 }),
    (MaterialType::Oak, FixedEffect::ReduceWeaponTime { low: 25, high: 70 }),
    (MaterialType::Brass, FixedEffect::AddFloat { key: FloatKey::WEAPON_DEFENSE, amount: 0.05, base: 1.0 }),
    (MaterialType::Velvet, FixedEffect::AddFloat { key: FloatKey::WEAPON_OFFENSE, amount: 0.05, base: 1.0 }),
    // rendings
    (MaterialType::Emerald, FixedEffect::Imbue(ImbuedEffects::ACID_RENDING)),
    (MaterialType::WhiteSapphire, FixedEffect::Imbue(ImbuedEffects::BLUDGEON_RENDING)),
    (MaterialType::Aquamarine, FixedEffect::Imbue(ImbuedEffects::COLD_RENDING)),
    (MaterialType::Jet, FixedEffect::Imbue(ImbuedEffects::ELECTRIC_RENDING)),
    (MaterialType::RedGarnet, FixedEffect::Imbue(ImbuedEffects::FIRE_RENDING)),
    (MaterialType::BlackGarnet, FixedEffect::Imbue(ImbuedEffects::PIERCE_RENDING)),
    (MaterialType::ImperialTopaz, FixedEffect::Imbue(ImbuedEffects::SLASH_RENDING)),
];

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use std::collections::BTreeSet;

    use super::super::testing::*;
    use super::super::{TinkerOutcome, TinkeringResolver};
    use super::*;
    use crate::dice::ScriptedDice;
    use crate::notify::NoticeLog;

    fn resolve(material: MaterialType, target: &mut WorldObject) -> TinkerOutcome {
        let resolver = TinkeringResolver::new(BTreeSet::new());
        let tool = salvage(material);
        let mut dice = ScriptedDice::new().with_rolls([40]);
        let mut log = NoticeLog::new();
        with_job(&tool, target, &mut dice, &mut log, |job| resolver.apply(job))
    }

    #[test]
    fn table_has_no_duplicate_materials() {
        let unique: BTreeSet<MaterialType> = FIXED_EFFECTS.iter().map(|(m, _)| *m).collect();
        assert_eq!(unique.len(), FIXED_EFFECTS.len());
    }

    #[test]
    fn alabaster_raises_pierce_and_logs() {
        let mut target = armor();
        assert_eq!(resolve(MaterialType::Alabaster, &mut target), TinkerOutcome::Applied);
        assert_eq!(target.properties.get_float(FloatKey::ARMOR_MOD_VS_PIERCE), Some(0.2));
        assert_eq!(target.num_times_tinkered(), 1);
        assert_eq!(target.tinker_log().collect::<Vec<_>>(), vec!["66"]);
    }

    #[test]
    fn resistance_is_capped_at_two() {
        let mut target = armor();
        target
            .properties
            .set_float(FloatKey::ARMOR_MOD_VS_COLD, 1.9);
        resolve(MaterialType::Wool, &mut target);
        assert_eq!(target.properties.get_float(FloatKey::ARMOR_MOD_VS_COLD), Some(2.0));
    }

    #[test]
    fn value_scaling_uses_bankers_rounding() {
        let mut target = armor();
        target.properties.set_int(IntKey::VALUE, 10);
        resolve(MaterialType::Pine, &mut target);
        // 7.5 rounds to the even neighbour.
        assert_eq!(target.properties.get_int(IntKey::VALUE), Some(8));

        target.properties.set_int(IntKey::VALUE, 2);
        resolve(MaterialType::Gold, &mut target);
        // 2.5 rounds down to 2.
        assert_eq!(target.properties.get_int(IntKey::VALUE), Some(2));
    }

    #[test]
    fn armatures_are_skipped_and_not_logged() {
        let mut target = armor();
        assert_eq!(resolve(MaterialType::Pyreal, &mut target), TinkerOutcome::Skipped);
        assert_eq!(target.num_times_tinkered(), 0);
        assert_eq!(target.tinker_log().count(), 0);
    }

    #[test]
    fn heritage_sets_group_and_restriction() {
        let mut target = armor();
        resolve(MaterialType::Ebony, &mut target);
        assert_eq!(target.properties.get_int(IntKey::HERITAGE_GROUP), Some(2));
        assert_eq!(
            target
                .properties
                .get_string(StringKey::ITEM_HERITAGE_GROUP_RESTRICTION),
            Some("Gharu'ndim")
        );
    }

    #[test]
    fn silk_folds_spellcraft_into_difficulty() {
        let mut target = armor();
        target
            .properties
            .set_int(IntKey::ITEM_ALLEGIANCE_RANK_LIMIT, 3);
        target.properties.set_int(IntKey::ITEM_SPELLCRAFT, 150);
        target.properties.set_int(IntKey::ITEM_DIFFICULTY, 40);
        resolve(MaterialType::Silk, &mut target);
        assert!(
            target
                .properties
                .get_int(IntKey::ITEM_ALLEGIANCE_RANK_LIMIT)
                .is_none()
        );
        assert_eq!(target.properties.get_int(IntKey::ITEM_DIFFICULTY), Some(190));
    }

    #[test]
    fn oak_never_goes_below_zero() {
        let mut target = sword();
        target.properties.set_int(IntKey::WEAPON_TIME, 30);
        resolve(MaterialType::Oak, &mut target);
        assert_eq!(target.properties.get_int(IntKey::WEAPON_TIME), Some(0));
    }

    #[test]
    fn unlogged_materials_skip_the_log() {
        let resolver = TinkeringResolver::new(BTreeSet::from([MaterialType::Leather]));
        let tool = salvage(MaterialType::Leather);
        let mut target = armor();
        let mut dice = ScriptedDice::new();
        let mut log = NoticeLog::new();
        let outcome = with_job(&tool, &mut target, &mut dice, &mut log, |job| resolver.apply(job));
        assert_eq!(outcome, TinkerOutcome::Applied);
        assert_eq!(target.properties.get_bool(BoolKey::RETAINED), Some(true));
        assert_eq!(target.num_times_tinkered(), 0);
    }

    #[test]
    fn unregistered_material_is_reported() {
        let mut target = armor();
        assert_eq!(resolve(MaterialType::Copper, &mut target), TinkerOutcome::UnknownMaterial);
        assert_eq!(target.num_times_tinkered(), 0);
    }
}
