//! Tunable parameters for crafting resolution.
//!
//! The server reads these from the `crafting` section of its YAML config.
//! Every field has a default so partial configs deserialize.

use std::collections::BTreeSet;

use artisan_types::MaterialType;
use serde::{Deserialize, Serialize};

/// Which implementation resolves recipe mutation clauses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationStrategy {
    /// Material strategies for tinkering recipes, the data-id table for
    /// everything else.
    #[default]
    Native,
    /// The data-id table for every recipe.
    Legacy,
}

/// Configuration for crafting and tinkering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CraftingConfig {
    /// Allow crafting while in a combat stance; the pipeline drops the
    /// actor to peace mode first (default: false).
    pub allow_combat_mode_crafting: bool,

    /// Append the unrounded chance to the confirmation text (default: false).
    pub craft_exact_msg: bool,

    /// Allow the recipe-less salvage combining path (default: true).
    pub allow_salvage_combining: bool,

    /// Mutation implementation (default: native).
    pub mutation_strategy: MutationStrategy,

    /// Tool weenie classes that always succeed.
    pub foolproof_tools: BTreeSet<u32>,

    /// Materials that do not append to the tinker log when applied.
    pub unlogged_materials: BTreeSet<MaterialType>,

    /// Tinker cap for items without their own (default: 10).
    pub default_max_tinker_count: i32,

    /// Structure at which a salvage bag is complete (default: 100).
    pub salvage_complete_structure: i32,

    /// Value cap for a combined salvage bag (default: 75000).
    pub max_salvage_value: i32,

    /// Steepness of the skill-vs-difficulty curve (default: 0.03).
    pub skill_check_factor: f64,

    /// Divisor applied to imbue chances (default: 3.0).
    pub imbue_chance_divisor: f64,

    /// Chance added per imbue augmentation rank (default: 0.05).
    pub imbue_bonus_per_augmentation: f64,
}

impl Default for CraftingConfig {
    fn default() -> Self {
        Self {
            allow_combat_mode_crafting: false,
            craft_exact_msg: false,
            allow_salvage_combining: true,
            mutation_strategy: MutationStrategy::Native,
            foolproof_tools: BTreeSet::new(),
            unlogged_materials: BTreeSet::new(),
            default_max_tinker_count: 10,
            salvage_complete_structure: 100,
            max_salvage_value: 75_000,
            skill_check_factor: 0.03,
            imbue_chance_divisor: 3.0,
            imbue_bonus_per_augmentation: 0.05,
        }
    }
}

impl CraftingConfig {
    /// The first field holding a value resolution cannot use.
    ///
    /// Returns the field name on failure.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.imbue_chance_divisor.is_nan() || self.imbue_chance_divisor <= 0.0 {
            return Err("imbue_chance_divisor");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let yaml = "craft_exact_msg: true\nmutation_strategy: legacy\nfoolproof_tools: [36619]\n";
        let config: Option<CraftingConfig> = serde_yml::from_str(yaml).ok();
        assert!(config.is_some());
        let Some(config) = config else { return };
        assert!(config.craft_exact_msg);
        assert_eq!(config.mutation_strategy, MutationStrategy::Legacy);
        assert!(config.foolproof_tools.contains(&36_619));
        assert_eq!(config.default_max_tinker_count, 10);
        assert_eq!(config.max_salvage_value, 75_000);
    }

    #[test]
    fn non_positive_imbue_divisor_is_rejected() {
        assert_eq!(CraftingConfig::default().validate(), Ok(()));
        for divisor in [0.0, -3.0, f64::NAN] {
            let config = CraftingConfig {
                imbue_chance_divisor: divisor,
                ..CraftingConfig::default()
            };
            assert_eq!(config.validate(), Err("imbue_chance_divisor"));
        }
    }

    #[test]
    fn unlogged_materials_parse_by_name() {
        let yaml = "unlogged_materials: [Ivory, Leather]\n";
        let config: CraftingConfig = serde_yml::from_str(yaml).unwrap_or_default();
        assert!(config.unlogged_materials.contains(&MaterialType::Leather));
        assert!(!config.unlogged_materials.contains(&MaterialType::Steel));
    }
}
