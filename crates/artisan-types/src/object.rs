//! World objects and the weenie definitions they are built from.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::enums::{ImbuedEffects, ItemType, MaterialType, WeenieType};
use crate::ids::EntityId;
use crate::properties::{IntKey, PropertyStore, StringKey};

/// Where an object currently lives relative to its holder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Placement {
    /// Inside a container owned by `owner`.
    Inventory {
        /// Guid of the owning creature.
        owner: EntityId,
    },
    /// Worn or wielded by `wielder`.
    Equipped {
        /// Guid of the wielding creature.
        wielder: EntityId,
    },
    /// Placed on a landblock.
    #[default]
    World,
    /// Removed from the world.
    Destroyed,
}

/// A live object participating in a crafting attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldObject {
    /// Persistent guid.
    pub id: EntityId,
    /// Weenie class the object was created from.
    pub weenie_class_id: u32,
    /// Broad item category.
    #[serde(default)]
    pub item_type: ItemType,
    /// Behavioral class.
    #[serde(default)]
    pub weenie_type: WeenieType,
    /// Persistent attribute store.
    #[serde(default)]
    pub properties: PropertyStore,
    /// Spell ids the object carries.
    #[serde(default)]
    pub known_spells: BTreeSet<u32>,
    /// Current location.
    #[serde(default)]
    pub placement: Placement,
}

impl WorldObject {
    /// Create a bare object with the given display name.
    pub fn new(
        id: EntityId,
        weenie_class_id: u32,
        item_type: ItemType,
        weenie_type: WeenieType,
        name: &str,
    ) -> Self {
        let mut properties = PropertyStore::new();
        properties.set_string(StringKey::NAME, name);
        Self {
            id,
            weenie_class_id,
            item_type,
            weenie_type,
            properties,
            known_spells: BTreeSet::new(),
            placement: Placement::World,
        }
    }

    /// Display name, empty when unset.
    pub fn name(&self) -> &str {
        self.properties.get_string(StringKey::NAME).unwrap_or_default()
    }

    /// Number of items in the stack; single objects report 1.
    pub fn stack_size(&self) -> i32 {
        self.properties.get_int(IntKey::STACK_SIZE).unwrap_or(1)
    }

    /// Material classification, if the object has a known one.
    pub fn material(&self) -> Option<MaterialType> {
        self.properties
            .get_int(IntKey::MATERIAL_TYPE)
            .and_then(MaterialType::from_id)
    }

    /// Per-item workmanship.
    ///
    /// Salvage bags store the sum over every salvaged item, so the stored
    /// value is divided by the item count when one is recorded.
    pub fn workmanship(&self) -> Option<f64> {
        let total = f64::from(self.properties.get_int(IntKey::ITEM_WORKMANSHIP)?);
        match self.properties.get_int(IntKey::NUM_ITEMS_IN_MATERIAL) {
            Some(count) if count > 0 => Some(total / f64::from(count)),
            _ => Some(total),
        }
    }

    /// Number of prior tinkers.
    pub fn num_times_tinkered(&self) -> i32 {
        self.properties
            .get_int(IntKey::NUM_TIMES_TINKERED)
            .unwrap_or(0)
    }

    /// Entries in the tinker log, in application order.
    pub fn tinker_log(&self) -> impl Iterator<Item = &str> {
        self.properties
            .get_string(StringKey::TINKER_LOG)
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
    }

    /// Union of all five imbued-effect slots.
    pub fn imbued_effects(&self) -> ImbuedEffects {
        IntKey::IMBUED_EFFECT_SLOTS
            .iter()
            .filter_map(|slot| self.properties.get_int(*slot))
            .fold(ImbuedEffects::NONE, |acc, stored| {
                acc.union(ImbuedEffects::from_stored(stored))
            })
    }

    /// Whether the object sits in `holder`'s inventory.
    pub fn is_contained_by(&self, holder: EntityId) -> bool {
        matches!(self.placement, Placement::Inventory { owner } if owner == holder)
    }

    /// Whether the object is worn or wielded by `holder`.
    pub fn is_wielded_by(&self, holder: EntityId) -> bool {
        matches!(self.placement, Placement::Equipped { wielder } if wielder == holder)
    }

    /// Whether the object has been removed from the world.
    pub fn is_destroyed(&self) -> bool {
        self.placement == Placement::Destroyed
    }
}

/// Read-only class definition that world objects are instantiated from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weenie {
    /// Weenie class id.
    pub class_id: u32,
    /// Display name of new instances.
    pub name: String,
    /// Broad item category.
    #[serde(default)]
    pub item_type: ItemType,
    /// Behavioral class.
    #[serde(default)]
    pub weenie_type: WeenieType,
    /// Properties copied onto new instances.
    #[serde(default)]
    pub properties: PropertyStore,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bag() -> WorldObject {
        WorldObject::new(
            EntityId(1),
            20_983,
            ItemType::TinkeringMaterial,
            WeenieType::Salvage,
            "Salvage (100)",
        )
    }

    #[test]
    fn salvage_workmanship_is_averaged() {
        let mut bag = bag();
        bag.properties.set_int(IntKey::ITEM_WORKMANSHIP, 35);
        bag.properties.set_int(IntKey::NUM_ITEMS_IN_MATERIAL, 5);
        assert_eq!(bag.workmanship().map(|w| (w * 10.0).round()), Some(70.0));
    }

    #[test]
    fn tinker_log_skips_empty_entries() {
        let mut item = bag();
        item.properties.set_string(StringKey::TINKER_LOG, "64,,23");
        let entries: Vec<&str> = item.tinker_log().collect();
        assert_eq!(entries, vec!["64", "23"]);
    }

    #[test]
    fn imbued_effects_union_all_slots() {
        let mut item = bag();
        item.properties
            .set_int(IntKey::IMBUED_EFFECT, ImbuedEffects::MELEE_DEFENSE.to_stored());
        item.properties
            .set_int(IntKey::IMBUED_EFFECT_4, ImbuedEffects::FIRE_RENDING.to_stored());
        let effects = item.imbued_effects();
        assert!(effects.contains(ImbuedEffects::MELEE_DEFENSE));
        assert!(effects.contains(ImbuedEffects::FIRE_RENDING));
        assert!(!effects.contains(ImbuedEffects::MAGIC_DEFENSE));
    }

    #[test]
    fn placement_queries_match_holder() {
        let mut item = bag();
        item.placement = Placement::Inventory { owner: EntityId(9) };
        assert!(item.is_contained_by(EntityId(9)));
        assert!(!item.is_contained_by(EntityId(8)));
        assert!(!item.is_wielded_by(EntityId(9)));
    }
}
