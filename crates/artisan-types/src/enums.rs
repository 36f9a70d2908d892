//! Enumeration and flag types for the crafting rules core.
//!
//! Numeric identifiers match the values stored in object property
//! stores and recipe data, so they must not be renumbered.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Materials
// ---------------------------------------------------------------------------

/// Generates the [`MaterialType`] enum with its stored id and display name.
macro_rules! materials {
    ( $( $variant:ident = $id:literal => $label:literal ),+ $(,)? ) => {
        /// Material classification of a salvage bag or crafted item.
        ///
        /// The numeric value is what gets written into a target's
        /// `TinkerLog` when the material is applied.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub enum MaterialType {
            $(
                #[doc = concat!("The ", $label, " material.")]
                $variant = $id,
            )+
        }

        impl MaterialType {
            /// Every known material, in id order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Look up a material by its stored id.
            pub const fn from_id(id: i32) -> Option<Self> {
                match id {
                    $($id => Some(Self::$variant),)+
                    _ => None,
                }
            }

            /// The stored numeric id.
            pub const fn id(self) -> i32 {
                match self {
                    $(Self::$variant => $id,)+
                }
            }

            /// Default display name, used when the world lookup has none.
            pub const fn display_name(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }
    };
}

materials! {
    Ceramic = 1 => "Ceramic",
    Porcelain = 2 => "Porcelain",
    Linen = 4 => "Linen",
    Satin = 5 => "Satin",
    Silk = 6 => "Silk",
    Velvet = 7 => "Velvet",
    Wool = 8 => "Wool",
    Agate = 10 => "Agate",
    Amber = 11 => "Amber",
    Amethyst = 12 => "Amethyst",
    Aquamarine = 13 => "Aquamarine",
    Azurite = 14 => "Azurite",
    BlackGarnet = 15 => "Black Garnet",
    BlackOpal = 16 => "Black Opal",
    Bloodstone = 17 => "Bloodstone",
    Carnelian = 18 => "Carnelian",
    Citrine = 19 => "Citrine",
    Diamond = 20 => "Diamond",
    Emerald = 21 => "Emerald",
    FireOpal = 22 => "Fire Opal",
    GreenGarnet = 23 => "Green Garnet",
    GreenJade = 24 => "Green Jade",
    Hematite = 25 => "Hematite",
    ImperialTopaz = 26 => "Imperial Topaz",
    Jet = 27 => "Jet",
    LapisLazuli = 28 => "Lapis Lazuli",
    LavenderJade = 29 => "Lavender Jade",
    Malachite = 30 => "Malachite",
    Moonstone = 31 => "Moonstone",
    Onyx = 32 => "Onyx",
    Opal = 33 => "Opal",
    Peridot = 34 => "Peridot",
    RedGarnet = 35 => "Red Garnet",
    RedJade = 36 => "Red Jade",
    RoseQuartz = 37 => "Rose Quartz",
    Ruby = 38 => "Ruby",
    Sapphire = 39 => "Sapphire",
    SmokeyQuartz = 40 => "Smokey Quartz",
    Sunstone = 41 => "Sunstone",
    TigerEye = 42 => "Tiger Eye",
    Tourmaline = 43 => "Tourmaline",
    Turquoise = 44 => "Turquoise",
    WhiteJade = 45 => "White Jade",
    WhiteQuartz = 46 => "White Quartz",
    WhiteSapphire = 47 => "White Sapphire",
    YellowGarnet = 48 => "Yellow Garnet",
    YellowTopaz = 49 => "Yellow Topaz",
    Zircon = 50 => "Zircon",
    Ivory = 51 => "Ivory",
    Leather = 52 => "Leather",
    ArmoredilloHide = 53 => "Armoredillo Hide",
    GromnieHide = 54 => "Gromnie Hide",
    ReedSharkHide = 55 => "Reed Shark Hide",
    Brass = 57 => "Brass",
    Bronze = 58 => "Bronze",
    Copper = 59 => "Copper",
    Gold = 60 => "Gold",
    Iron = 61 => "Iron",
    Pyreal = 62 => "Pyreal",
    Silver = 63 => "Silver",
    Steel = 64 => "Steel",
    Alabaster = 66 => "Alabaster",
    Granite = 67 => "Granite",
    Marble = 68 => "Marble",
    Obsidian = 69 => "Obsidian",
    Sandstone = 70 => "Sandstone",
    Serpentine = 71 => "Serpentine",
    Ebony = 73 => "Ebony",
    Mahogany = 74 => "Mahogany",
    Oak = 75 => "Oak",
    Pine = 76 => "Pine",
    Teak = 77 => "Teak",
}

// ---------------------------------------------------------------------------
// Imbued effects
// ---------------------------------------------------------------------------

/// A set of imbued-effect flags.
///
/// A single flag and a union of flags share this representation. Objects
/// store up to five of these in separate slots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ImbuedEffects(pub u32);

impl ImbuedEffects {
    /// No effect.
    pub const NONE: Self = Self(0);
    /// Critical strike.
    pub const CRITICAL_STRIKE: Self = Self(0x1);
    /// Crippling blow.
    pub const CRIPPLING_BLOW: Self = Self(0x2);
    /// Armor rending.
    pub const ARMOR_RENDING: Self = Self(0x4);
    /// Slash rending.
    pub const SLASH_RENDING: Self = Self(0x8);
    /// Pierce rending.
    pub const PIERCE_RENDING: Self = Self(0x10);
    /// Bludgeon rending.
    pub const BLUDGEON_RENDING: Self = Self(0x20);
    /// Acid rending.
    pub const ACID_RENDING: Self = Self(0x40);
    /// Cold rending.
    pub const COLD_RENDING: Self = Self(0x80);
    /// Electric rending.
    pub const ELECTRIC_RENDING: Self = Self(0x100);
    /// Fire rending.
    pub const FIRE_RENDING: Self = Self(0x200);
    /// Melee defense bonus.
    pub const MELEE_DEFENSE: Self = Self(0x400);
    /// Missile defense bonus.
    pub const MISSILE_DEFENSE: Self = Self(0x800);
    /// Magic defense bonus.
    pub const MAGIC_DEFENSE: Self = Self(0x1000);
    /// Spellbook (cantrip) imbue.
    pub const SPELLBOOK: Self = Self(0x2000);
    /// Nether rending.
    pub const NETHER_RENDING: Self = Self(0x4000);
    /// Reduces damage from magic projectiles.
    pub const IGNORE_SOME_MAGIC_PROJECTILE_DAMAGE: Self = Self(0x2000_0000);
    /// Always critical.
    pub const ALWAYS_CRITICAL: Self = Self(0x4000_0000);
    /// Ignores all armor.
    pub const IGNORE_ALL_ARMOR: Self = Self(0x8000_0000);

    /// Raw flag bits.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether no flag is set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether every flag in `other` is set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Union of both flag sets.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Reinterpret a stored signed slot value as flags.
    pub const fn from_stored(value: i32) -> Self {
        Self(u32::from_ne_bytes(value.to_ne_bytes()))
    }

    /// Bit-preserving signed representation for property storage.
    pub const fn to_stored(self) -> i32 {
        i32::from_ne_bytes(self.0.to_ne_bytes())
    }
}

impl core::ops::BitOr for ImbuedEffects {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

// ---------------------------------------------------------------------------
// Damage types
// ---------------------------------------------------------------------------

/// Damage type flags carried by a weapon.
///
/// Most weapons carry a single flag; some carry a combination such as
/// slash and pierce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DamageType(pub u32);

impl DamageType {
    /// Slashing.
    pub const SLASH: Self = Self(0x1);
    /// Piercing.
    pub const PIERCE: Self = Self(0x2);
    /// Bludgeoning.
    pub const BLUDGEON: Self = Self(0x4);
    /// Cold.
    pub const COLD: Self = Self(0x8);
    /// Fire.
    pub const FIRE: Self = Self(0x10);
    /// Acid.
    pub const ACID: Self = Self(0x20);
    /// Electric.
    pub const ELECTRIC: Self = Self(0x40);
    /// Nether.
    pub const NETHER: Self = Self(0x400);
    /// Slash and pierce combined.
    pub const SLASH_PIERCE: Self = Self(0x3);

    /// Build from a stored integer property value.
    pub const fn from_stored(value: i32) -> Self {
        Self(u32::from_ne_bytes(value.to_ne_bytes()))
    }

    /// Bit-preserving signed representation for property storage.
    pub const fn to_stored(self) -> i32 {
        i32::from_ne_bytes(self.0.to_ne_bytes())
    }

    /// The rending imbue that cleaves resistance to this single damage type.
    pub const fn rending(self) -> Option<ImbuedEffects> {
        match self.0 {
            0x1 => Some(ImbuedEffects::SLASH_RENDING),
            0x2 => Some(ImbuedEffects::PIERCE_RENDING),
            0x4 => Some(ImbuedEffects::BLUDGEON_RENDING),
            0x8 => Some(ImbuedEffects::COLD_RENDING),
            0x10 => Some(ImbuedEffects::FIRE_RENDING),
            0x20 => Some(ImbuedEffects::ACID_RENDING),
            0x40 => Some(ImbuedEffects::ELECTRIC_RENDING),
            0x400 => Some(ImbuedEffects::NETHER_RENDING),
            _ => None,
        }
    }

    /// Lower-case name used in chat messages.
    pub const fn name(self) -> &'static str {
        match self.0 {
            0x1 => "slashing",
            0x2 => "piercing",
            0x4 => "bludgeoning",
            0x8 => "cold",
            0x10 => "fire",
            0x20 => "acid",
            0x40 => "lightning",
            0x400 => "nether",
            0x3 => "slashing/piercing",
            _ => "mixed",
        }
    }
}

// ---------------------------------------------------------------------------
// Object classification
// ---------------------------------------------------------------------------

/// Broad item category of a world object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ItemType {
    /// Melee weapon.
    MeleeWeapon,
    /// Missile launcher or thrown weapon.
    MissileWeapon,
    /// Wand, staff, or orb.
    Caster,
    /// Armor.
    Armor,
    /// Clothing.
    Clothing,
    /// Jewelry.
    Jewelry,
    /// Food or drink.
    Food,
    /// Gem.
    Gem,
    /// Key.
    Key,
    /// Mana stone.
    ManaStone,
    /// Spell component.
    SpellComponents,
    /// Salvage bag.
    TinkeringMaterial,
    /// Tool used for tinkering or crafting.
    TinkeringTool,
    /// Creature, including players.
    Creature,
    /// Anything else.
    #[default]
    Misc,
}

impl ItemType {
    /// Whether an object of this type may have its weenie class rewritten.
    pub const fn supports_class_mutation(self) -> bool {
        matches!(self, Self::MeleeWeapon | Self::MissileWeapon | Self::Caster)
    }
}

/// Behavioral class of a world object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum WeenieType {
    /// Plain item.
    #[default]
    Generic,
    /// Clothing or armor.
    Clothing,
    /// Melee weapon.
    MeleeWeapon,
    /// Bow, crossbow, or atlatl.
    MissileLauncher,
    /// Thrown weapon, stackable.
    Missile,
    /// Arrows, bolts, and darts.
    Ammunition,
    /// Magic caster.
    Caster,
    /// Generic stackable.
    Stackable,
    /// Salvage bag.
    Salvage,
    /// Crafting tool.
    CraftTool,
    /// Creature.
    Creature,
}

/// Heritage group an item can be restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum HeritageGroup {
    /// Aluvian.
    Aluvian = 1,
    /// Gharu'ndim.
    Gharundim = 2,
    /// Sho.
    Sho = 3,
    /// Viamontian.
    Viamontian = 4,
}

impl HeritageGroup {
    /// The stored numeric id.
    pub const fn id(self) -> i32 {
        self as i32
    }

    /// The restriction name written on heritage-locked items.
    pub const fn restriction_name(self) -> &'static str {
        match self {
            Self::Aluvian => "Aluvian",
            Self::Gharundim => "Gharu'ndim",
            Self::Sho => "Sho",
            Self::Viamontian => "Viamontian",
        }
    }

    /// Parse a restriction name.
    pub fn from_restriction_name(name: &str) -> Option<Self> {
        match name {
            "Aluvian" => Some(Self::Aluvian),
            "Gharu'ndim" => Some(Self::Gharundim),
            "Sho" => Some(Self::Sho),
            "Viamontian" => Some(Self::Viamontian),
            _ => None,
        }
    }
}

/// Combat stance of an actor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum CombatMode {
    /// Peace mode.
    #[default]
    NonCombat,
    /// Melee stance.
    Melee,
    /// Missile stance.
    Missile,
    /// Magic stance.
    Magic,
}

/// One of an actor's three vitals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Vital {
    /// Health. Dropping to zero kills the actor.
    Health,
    /// Stamina.
    Stamina,
    /// Mana.
    Mana,
}

// ---------------------------------------------------------------------------
// Usability
// ---------------------------------------------------------------------------

/// Where an object may be when it is used, packed as source flags in the
/// low 16 bits and target flags in the high 16 bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Usable(pub u32);

impl Usable {
    /// Cannot be used.
    pub const NO: u32 = 0x1;
    /// Used on itself.
    pub const SELF: u32 = 0x2;
    /// Must be wielded.
    pub const WIELDED: u32 = 0x4;
    /// Must be in the actor's inventory.
    pub const CONTAINED: u32 = 0x8;
    /// Must be viewed.
    pub const VIEWED: u32 = 0x10;
    /// May be out in the world.
    pub const REMOTE: u32 = 0x20;

    /// Build from a stored integer property value.
    pub const fn from_stored(value: i32) -> Self {
        Self(u32::from_ne_bytes(value.to_ne_bytes()))
    }

    /// Flags describing where the object may be when used as a source.
    pub const fn source_flags(self) -> u32 {
        self.0 & 0xFFFF
    }

    /// Flags describing where the object may be when used as a target.
    pub const fn target_flags(self) -> u32 {
        self.0 >> 16
    }
}

// ---------------------------------------------------------------------------
// Skills
// ---------------------------------------------------------------------------

/// Generates the [`Skill`] enum with stored ids and display names.
macro_rules! skills {
    ( $( $variant:ident = $id:literal => $label:literal ),+ $(,)? ) => {
        /// A trainable skill.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub enum Skill {
            $(
                #[doc = concat!("The ", $label, " skill.")]
                $variant = $id,
            )+
        }

        impl Skill {
            /// Look up a skill by its stored id.
            pub const fn from_id(id: u32) -> Option<Self> {
                match id {
                    $($id => Some(Self::$variant),)+
                    _ => None,
                }
            }

            /// The stored numeric id.
            pub const fn id(self) -> u32 {
                match self {
                    $(Self::$variant => $id,)+
                }
            }

            /// Human-readable name.
            pub const fn display_name(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }
    };
}

skills! {
    Axe = 1 => "Axe",
    Bow = 2 => "Bow",
    Crossbow = 3 => "Crossbow",
    Dagger = 4 => "Dagger",
    Mace = 5 => "Mace",
    MeleeDefense = 6 => "Melee Defense",
    MissileDefense = 7 => "Missile Defense",
    Sling = 8 => "Sling",
    Spear = 9 => "Spear",
    Staff = 10 => "Staff",
    Sword = 11 => "Sword",
    ThrownWeapon = 12 => "Thrown Weapon",
    UnarmedCombat = 13 => "Unarmed Combat",
    ArcaneLore = 14 => "Arcane Lore",
    MagicDefense = 15 => "Magic Defense",
    ManaConversion = 16 => "Mana Conversion",
    ItemTinkering = 18 => "Item Tinkering",
    Lockpick = 23 => "Lockpick",
    WeaponTinkering = 28 => "Weapon Tinkering",
    ArmorTinkering = 29 => "Armor Tinkering",
    MagicItemTinkering = 30 => "Magic Item Tinkering",
    Fletching = 37 => "Fletching",
    Alchemy = 38 => "Alchemy",
    Cooking = 39 => "Cooking",
    Salvaging = 40 => "Salvaging",
    HeavyWeapons = 44 => "Heavy Weapons",
    LightWeapons = 45 => "Light Weapons",
    FinesseWeapons = 46 => "Finesse Weapons",
    MissileWeapons = 47 => "Missile Weapons",
}

impl Skill {
    /// Melee skills folded into heavy, light, and finesse weapons.
    pub const fn is_retired_melee(self) -> bool {
        matches!(
            self,
            Self::Axe
                | Self::Dagger
                | Self::Mace
                | Self::Spear
                | Self::Staff
                | Self::Sword
                | Self::UnarmedCombat
        )
    }

    /// Missile skills folded into missile weapons.
    pub const fn is_retired_missile(self) -> bool {
        matches!(
            self,
            Self::Bow | Self::Crossbow | Self::Sling | Self::ThrownWeapon
        )
    }
}

/// Training level of a skill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum SkillAdvancementClass {
    /// Not available to the actor at all.
    Inactive,
    /// Usable only if the skill allows untrained use.
    #[default]
    Untrained,
    /// Trained.
    Trained,
    /// Specialized.
    Specialized,
}

impl SkillAdvancementClass {
    /// Whether the skill counts as trained for crafting.
    pub const fn is_trained(self) -> bool {
        matches!(self, Self::Trained | Self::Specialized)
    }
}
