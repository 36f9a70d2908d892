//! Sparse, typed property stores.
//!
//! Every world object carries one [`PropertyStore`] split into six
//! families. A key that is absent is distinct from a key holding zero,
//! `false`, or the empty string; requirement comparators such as
//! `Exist`/`NotExist` depend on that distinction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::EntityId;

/// Generates a newtype property key around a numeric stat id.
macro_rules! define_key {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub u16);

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

define_key! {
    /// Key into the boolean family.
    BoolKey
}

define_key! {
    /// Key into the integer family.
    IntKey
}

define_key! {
    /// Key into the float family.
    FloatKey
}

define_key! {
    /// Key into the string family.
    StringKey
}

define_key! {
    /// Key into the instance-reference family (guids of other objects).
    InstanceKey
}

define_key! {
    /// Key into the data-reference family (static data ids).
    DataKey
}

// ---------------------------------------------------------------------------
// Named stats
// ---------------------------------------------------------------------------

impl BoolKey {
    /// Item cannot be sold or salvaged.
    pub const RETAINED: Self = Self(91);
    /// Weapon ignores magical armor.
    pub const IGNORE_MAGIC_ARMOR: Self = Self(65);
    /// Weapon ignores magical resistances.
    pub const IGNORE_MAGIC_RESIST: Self = Self(66);
}

impl IntKey {
    /// Encumbrance.
    pub const ENCUMBRANCE_VAL: Self = Self(5);
    /// Number of items in the stack.
    pub const STACK_SIZE: Self = Self(12);
    /// Where the object may be when used; see `Usable`.
    pub const ITEM_USEABLE: Self = Self(16);
    /// UI effect flags.
    pub const UI_EFFECTS: Self = Self(18);
    /// Pyreal value.
    pub const VALUE: Self = Self(19);
    /// Armor level.
    pub const ARMOR_LEVEL: Self = Self(28);
    /// Bonded status.
    pub const BONDED: Self = Self(33);
    /// Base weapon damage.
    pub const DAMAGE: Self = Self(44);
    /// Damage type flags.
    pub const DAMAGE_TYPE: Self = Self(45);
    /// Weapon speed; lower is faster.
    pub const WEAPON_TIME: Self = Self(49);
    /// Units of salvage in a bag.
    pub const STRUCTURE: Self = Self(92);
    /// Workmanship, summed across items for salvage bags.
    pub const ITEM_WORKMANSHIP: Self = Self(105);
    /// Spellcraft of the item's spells.
    pub const ITEM_SPELLCRAFT: Self = Self(106);
    /// Maximum mana.
    pub const ITEM_MAX_MANA: Self = Self(108);
    /// Arcane lore difficulty.
    pub const ITEM_DIFFICULTY: Self = Self(109);
    /// Allegiance rank required to use the item.
    pub const ITEM_ALLEGIANCE_RANK_LIMIT: Self = Self(110);
    /// Skill level required to wield the item.
    pub const ITEM_SKILL_LEVEL_LIMIT: Self = Self(115);
    /// Material classification id.
    pub const MATERIAL_TYPE: Self = Self(131);
    /// Number of items that were salvaged into a bag.
    pub const NUM_ITEMS_IN_MATERIAL: Self = Self(170);
    /// Number of times the item has been tinkered.
    pub const NUM_TIMES_TINKERED: Self = Self(171);
    /// First imbued-effect slot.
    pub const IMBUED_EFFECT: Self = Self(179);
    /// Heritage group restriction.
    pub const HERITAGE_GROUP: Self = Self(188);
    /// Flat elemental damage bonus.
    pub const ELEMENTAL_DAMAGE_BONUS: Self = Self(204);
    /// Second imbued-effect slot.
    pub const IMBUED_EFFECT_2: Self = Self(303);
    /// Third imbued-effect slot.
    pub const IMBUED_EFFECT_3: Self = Self(304);
    /// Fourth imbued-effect slot.
    pub const IMBUED_EFFECT_4: Self = Self(305);
    /// Fifth imbued-effect slot.
    pub const IMBUED_EFFECT_5: Self = Self(306);
    /// Damage type cleaved by the weapon's resistance modifier.
    pub const RESISTANCE_MODIFIER_TYPE: Self = Self(317);
    /// Maximum item level.
    pub const ITEM_MAX_LEVEL: Self = Self(319);
    /// Base experience per item level.
    pub const ITEM_BASE_XP: Self = Self(4000);
    /// Total experience earned by the item.
    pub const ITEM_TOTAL_XP: Self = Self(4001);
    /// Per-item override of the maximum tinker count.
    pub const MAX_TINKER_COUNT: Self = Self(9000);
    /// Minimum salvage workmanship accepted when tinkering this item.
    pub const MIN_SALVAGE_QUALITY: Self = Self(9001);
    /// Gameplay mode the object belongs to.
    pub const GAMEPLAY_MODE: Self = Self(9010);

    /// The five imbued-effect slots, in fill order.
    pub const IMBUED_EFFECT_SLOTS: [Self; 5] = [
        Self::IMBUED_EFFECT,
        Self::IMBUED_EFFECT_2,
        Self::IMBUED_EFFECT_3,
        Self::IMBUED_EFFECT_4,
        Self::IMBUED_EFFECT_5,
    ];
}

impl FloatKey {
    /// Armor modifier versus slashing.
    pub const ARMOR_MOD_VS_SLASH: Self = Self(13);
    /// Armor modifier versus piercing.
    pub const ARMOR_MOD_VS_PIERCE: Self = Self(14);
    /// Armor modifier versus bludgeoning.
    pub const ARMOR_MOD_VS_BLUDGEON: Self = Self(15);
    /// Armor modifier versus cold.
    pub const ARMOR_MOD_VS_COLD: Self = Self(16);
    /// Armor modifier versus fire.
    pub const ARMOR_MOD_VS_FIRE: Self = Self(17);
    /// Armor modifier versus acid.
    pub const ARMOR_MOD_VS_ACID: Self = Self(18);
    /// Armor modifier versus electric.
    pub const ARMOR_MOD_VS_ELECTRIC: Self = Self(19);
    /// Damage variance.
    pub const DAMAGE_VARIANCE: Self = Self(22);
    /// Melee defense modifier.
    pub const WEAPON_DEFENSE: Self = Self(29);
    /// Attack modifier.
    pub const WEAPON_OFFENSE: Self = Self(62);
    /// Missile damage modifier.
    pub const DAMAGE_MOD: Self = Self(63);
    /// Ignore-armor fraction.
    pub const IGNORE_ARMOR: Self = Self(100);
    /// Critical multiplier.
    pub const CRITICAL_MULTIPLIER: Self = Self(136);
    /// Mana conversion modifier.
    pub const MANA_CONVERSION_MOD: Self = Self(144);
    /// Critical frequency.
    pub const CRITICAL_FREQUENCY: Self = Self(147);
    /// Magic defense modifier.
    pub const WEAPON_MAGIC_DEFENSE: Self = Self(150);
    /// Elemental damage modifier for casters.
    pub const ELEMENTAL_DAMAGE_MOD: Self = Self(152);
    /// Resistance modifier applied by cleaving.
    pub const RESISTANCE_MODIFIER: Self = Self(157);
    /// Armor modifier versus nether.
    pub const ARMOR_MOD_VS_NETHER: Self = Self(165);
}

impl StringKey {
    /// Display name.
    pub const NAME: Self = Self(1);
    /// Long description.
    pub const LONG_DESC: Self = Self(16);
    /// Heritage restriction name.
    pub const ITEM_HERITAGE_GROUP_RESTRICTION: Self = Self(33);
    /// Comma-separated record of applied materials.
    pub const TINKER_LOG: Self = Self(39);
    /// Comma-separated spell ids carried over when the item is consumed.
    pub const EXTRA_SPELLS_LIST: Self = Self(9008);
}

impl InstanceKey {
    /// Only this guid may wield the item.
    pub const ALLOWED_WIELDER: Self = Self(3);
    /// Only this guid may activate the item.
    pub const ALLOWED_ACTIVATOR: Self = Self(4);

    /// Whether copies of this stat write the read-source's own guid.
    pub const fn copies_identity(self) -> bool {
        self.0 == Self::ALLOWED_WIELDER.0 || self.0 == Self::ALLOWED_ACTIVATOR.0
    }
}

impl DataKey {
    /// Visual setup.
    pub const SETUP: Self = Self(1);
    /// Icon overlay.
    pub const ICON_OVERLAY: Self = Self(50);
    /// Secondary icon overlay.
    pub const ICON_OVERLAY_SECONDARY: Self = Self(51);
    /// Spell cast on hit.
    pub const PROC_SPELL: Self = Self(55);
    /// Skill required to wield the item.
    pub const ITEM_SKILL_LIMIT: Self = Self(125);
}

/// UI effect bit for an item that shows as magical.
pub const UI_EFFECT_MAGICAL: i32 = 0x1;

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// A sparse key/value store split into six typed families.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyStore {
    /// Boolean family.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub bools: BTreeMap<BoolKey, bool>,
    /// Integer family.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub ints: BTreeMap<IntKey, i32>,
    /// Float family.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub floats: BTreeMap<FloatKey, f64>,
    /// String family.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub strings: BTreeMap<StringKey, String>,
    /// Instance-reference family.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub instance_ids: BTreeMap<InstanceKey, EntityId>,
    /// Data-reference family.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data_ids: BTreeMap<DataKey, u32>,
}

impl PropertyStore {
    /// Create an empty store.
    pub const fn new() -> Self {
        Self {
            bools: BTreeMap::new(),
            ints: BTreeMap::new(),
            floats: BTreeMap::new(),
            strings: BTreeMap::new(),
            instance_ids: BTreeMap::new(),
            data_ids: BTreeMap::new(),
        }
    }

    /// Read a boolean.
    pub fn get_bool(&self, key: BoolKey) -> Option<bool> {
        self.bools.get(&key).copied()
    }

    /// Write a boolean.
    pub fn set_bool(&mut self, key: BoolKey, value: bool) {
        self.bools.insert(key, value);
    }

    /// Read an integer.
    pub fn get_int(&self, key: IntKey) -> Option<i32> {
        self.ints.get(&key).copied()
    }

    /// Write an integer.
    pub fn set_int(&mut self, key: IntKey, value: i32) {
        self.ints.insert(key, value);
    }

    /// Remove an integer, returning the old value.
    pub fn remove_int(&mut self, key: IntKey) -> Option<i32> {
        self.ints.remove(&key)
    }

    /// Read a float.
    pub fn get_float(&self, key: FloatKey) -> Option<f64> {
        self.floats.get(&key).copied()
    }

    /// Write a float.
    pub fn set_float(&mut self, key: FloatKey, value: f64) {
        self.floats.insert(key, value);
    }

    /// Read a string.
    pub fn get_string(&self, key: StringKey) -> Option<&str> {
        self.strings.get(&key).map(String::as_str)
    }

    /// Write a string.
    pub fn set_string(&mut self, key: StringKey, value: impl Into<String>) {
        self.strings.insert(key, value.into());
    }

    /// Read an instance reference.
    pub fn get_instance(&self, key: InstanceKey) -> Option<EntityId> {
        self.instance_ids.get(&key).copied()
    }

    /// Write an instance reference.
    pub fn set_instance(&mut self, key: InstanceKey, value: EntityId) {
        self.instance_ids.insert(key, value);
    }

    /// Read a data reference.
    pub fn get_data(&self, key: DataKey) -> Option<u32> {
        self.data_ids.get(&key).copied()
    }

    /// Write a data reference.
    pub fn set_data(&mut self, key: DataKey, value: u32) {
        self.data_ids.insert(key, value);
    }

    /// Remove a data reference, returning the old value.
    pub fn remove_data(&mut self, key: DataKey) -> Option<u32> {
        self.data_ids.remove(&key)
    }
}
