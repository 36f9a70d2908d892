//! The four cascade materials and their boundary tables.
//!
//! Steel works armor level, iron works melee damage, mahogany works the
//! missile damage modifier, and green garnet works the elemental damage
//! modifier of casters.

use artisan_types::{BoolKey, DamageType, FloatKey, IntKey, MaterialType};

use super::cascade::{Bucket, Cascade, CascadeTable, pick};
use super::materials::raise_resistance;
use super::{CleaveOutcome, MaterialStrategy, TinkerJob, add_float, add_int, damage_type, grant_resistance_cleave};

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// Steel on armor. The top of the range holds the two jackpots.
pub const STEEL_TABLE: CascadeTable = CascadeTable {
    name: "steel",
    version: 1,
    gate_sides: 200,
    gate_threshold: 50,
    bucket_sides: 300,
    buckets: &[
        (200, Bucket::ExtraFlat),
        (251, Bucket::SecondaryBonus),
        (297, Bucket::CriticalFailure),
        (298, Bucket::JackpotFlat),
        (300, Bucket::JackpotBonded),
    ],
};

const WEAPON_BUCKETS: &[(i32, Bucket)] = &[
    (180, Bucket::ExtraFlat),
    (190, Bucket::CriticalFailure),
    (209, Bucket::SecondaryBonus),
    (234, Bucket::ResistanceCleave),
    (235, Bucket::SpecialProperty),
    (300, Bucket::Nothing),
];

/// Iron on melee weapons.
pub const IRON_TABLE: CascadeTable = CascadeTable {
    name: "iron",
    version: 1,
    gate_sides: 200,
    gate_threshold: 70,
    bucket_sides: 300,
    buckets: WEAPON_BUCKETS,
};

/// Mahogany on missile weapons.
pub const MAHOGANY_TABLE: CascadeTable = CascadeTable {
    name: "mahogany",
    version: 1,
    gate_sides: 200,
    gate_threshold: 60,
    bucket_sides: 300,
    buckets: WEAPON_BUCKETS,
};

/// Green garnet on casters.
pub const GREEN_GARNET_TABLE: CascadeTable = CascadeTable {
    name: "green_garnet",
    version: 1,
    gate_sides: 200,
    gate_threshold: 60,
    bucket_sides: 300,
    buckets: WEAPON_BUCKETS,
};

/// Sides of every secondary, element, and special-property die.
const SUB_ROLL_SIDES: i32 = 187;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Resist {
    key: FloatKey,
    amount: f64,
    label: &'static str,
}

const STEEL_RESISTANCES: &[(i32, Option<Resist>)] = &[
    (20, Some(Resist { key: FloatKey::ARMOR_MOD_VS_PIERCE, amount: 0.2, label: "Piercing" })),
    (41, Some(Resist { key: FloatKey::ARMOR_MOD_VS_SLASH, amount: 0.2, label: "Slashing" })),
    (62, Some(Resist { key: FloatKey::ARMOR_MOD_VS_BLUDGEON, amount: 0.2, label: "Bludgeoning" })),
    (83, Some(Resist { key: FloatKey::ARMOR_MOD_VS_ACID, amount: 0.4, label: "Acid" })),
    (104, Some(Resist { key: FloatKey::ARMOR_MOD_VS_FIRE, amount: 0.4, label: "Fire" })),
    (125, Some(Resist { key: FloatKey::ARMOR_MOD_VS_COLD, amount: 0.4, label: "Cold" })),
    (146, Some(Resist { key: FloatKey::ARMOR_MOD_VS_ELECTRIC, amount: 0.4, label: "Lightning" })),
    (167, Some(Resist { key: FloatKey::ARMOR_MOD_VS_NETHER, amount: 0.4, label: "Nether" })),
    (187, None),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Secondary {
    MagicDefense,
    MeleeDefense,
    Signature,
}

const SECONDARIES: &[(i32, Secondary)] = &[
    (60, Secondary::MagicDefense),
    (120, Secondary::MeleeDefense),
    (187, Secondary::Signature),
];

/// Elements a weapon without a damage type can be upgraded into.
pub const ELEMENTS: &[(i32, DamageType)] = &[
    (26, DamageType::SLASH),
    (53, DamageType::PIERCE),
    (81, DamageType::BLUDGEON),
    (108, DamageType::COLD),
    (136, DamageType::FIRE),
    (164, DamageType::ACID),
    (187, DamageType::ELECTRIC),
];

/// A rare named property granted by the special-property bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpecialProperty {
    /// Ignores magical armor.
    IgnoreMagicArmor,
    /// Ignores magical resistance.
    IgnoreMagicResist,
    /// Critical frequency set to the given value.
    BitingStrike(f64),
    /// Critical multiplier set to the given value.
    CrushingBlow(f64),
    /// Ignores all armor.
    ArmorCleaving,
}

impl SpecialProperty {
    /// Grant the property unless the target already has it.
    pub fn grant(self, job: &mut TinkerJob<'_>) -> bool {
        let props = &mut job.target.properties;
        match self {
            Self::IgnoreMagicArmor => grant_flag(props, BoolKey::IGNORE_MAGIC_ARMOR),
            Self::IgnoreMagicResist => grant_flag(props, BoolKey::IGNORE_MAGIC_RESIST),
            Self::BitingStrike(frequency) => {
                grant_float(props, FloatKey::CRITICAL_FREQUENCY, frequency)
            }
            Self::CrushingBlow(multiplier) => {
                grant_float(props, FloatKey::CRITICAL_MULTIPLIER, multiplier)
            }
            Self::ArmorCleaving => {
                if props
                    .get_float(FloatKey::IGNORE_ARMOR)
                    .is_some_and(|v| v >= 1.0)
                {
                    return false;
                }
                props.set_float(FloatKey::IGNORE_ARMOR, 1.0);
                true
            }
        }
    }

    /// Chat label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::IgnoreMagicArmor => "Ignore Magic Armor",
            Self::IgnoreMagicResist => "Ignore Magic Resist",
            Self::BitingStrike(_) => "Biting Strike",
            Self::CrushingBlow(_) => "Crushing Blow",
            Self::ArmorCleaving => "Armor Cleaving",
        }
    }
}

fn grant_flag(props: &mut artisan_types::PropertyStore, key: BoolKey) -> bool {
    if props.get_bool(key) == Some(true) {
        return false;
    }
    props.set_bool(key, true);
    true
}

fn grant_float(props: &mut artisan_types::PropertyStore, key: FloatKey, value: f64) -> bool {
    if props.get_float(key).is_some() {
        return false;
    }
    props.set_float(key, value);
    true
}

const IRON_SPECIALS: &[(i32, Option<SpecialProperty>)] = &[
    (30, Some(SpecialProperty::IgnoreMagicArmor)),
    (61, Some(SpecialProperty::IgnoreMagicResist)),
    (92, Some(SpecialProperty::BitingStrike(0.13))),
    (123, Some(SpecialProperty::CrushingBlow(3.0))),
    (187, None),
];

const MAHOGANY_SPECIALS: &[(i32, Option<SpecialProperty>)] = &[
    (61, Some(SpecialProperty::ArmorCleaving)),
    (124, Some(SpecialProperty::BitingStrike(0.15))),
    (187, Some(SpecialProperty::CrushingBlow(3.0))),
];

const GREEN_GARNET_SPECIALS: &[(i32, Option<SpecialProperty>)] = &[
    (94, Some(SpecialProperty::BitingStrike(0.10))),
    (187, Some(SpecialProperty::CrushingBlow(1.2))),
];

// ---------------------------------------------------------------------------
// Shared payloads
// ---------------------------------------------------------------------------

fn roll_secondary(job: &mut TinkerJob<'_>) -> Secondary {
    let roll = job.roll(1, SUB_ROLL_SIDES);
    pick(SECONDARIES, roll).unwrap_or(Secondary::Signature)
}

fn roll_element(job: &mut TinkerJob<'_>) -> DamageType {
    let roll = job.roll(1, SUB_ROLL_SIDES);
    pick(ELEMENTS, roll).unwrap_or(DamageType::SLASH)
}

/// Roll a special property and grant it. Returns the granted property.
fn roll_special(
    table: &[(i32, Option<SpecialProperty>)],
    material: &str,
    roll: i32,
    job: &mut TinkerJob<'_>,
) -> Option<SpecialProperty> {
    let sub = job.roll(1, SUB_ROLL_SIDES);
    let special = pick(table, sub).flatten()?;
    if !special.grant(job) {
        return None;
    }
    let text = format!(
        "{} rolled a {roll} applying {material}! Their {} gained {}.",
        job.actor_name,
        job.target_name(),
        special.label()
    );
    job.tell_everyone(text);
    Some(special)
}

/// Elemental upgrade: raise the bonus on elemental weapons, or make a
/// plain weapon elemental with a base bonus of 2.
fn elemental_bonus(job: &mut TinkerJob<'_>, roll: i32, raise_by: i32) {
    if damage_type(job.target).is_some() {
        let bonus = add_int(job.target, IntKey::ELEMENTAL_DAMAGE_BONUS, raise_by);
        let text = format!("You rolled {roll}. You gained bonus elemental damage {bonus} (+{raise_by}).");
        job.tell(text);
    } else {
        let element = roll_element(job);
        job.target
            .properties
            .set_int(IntKey::DAMAGE_TYPE, element.to_stored());
        job.target
            .properties
            .set_int(IntKey::ELEMENTAL_DAMAGE_BONUS, 2);
        let text = format!(
            "You rolled {roll}. Your {} has been upgraded into an elemental weapon. It gained +2 {} damage.",
            job.target_name(),
            element.name()
        );
        job.tell(text);
    }
}

fn defense_bonus(job: &mut TinkerJob<'_>, roll: i32, key: FloatKey, amount: f64, label: &str) {
    let value = add_float(job.target, key, amount, 1.0);
    job.tell(format!(
        "You rolled {roll}. You gained bonus {label} {value:.2} (+{:.0}%).",
        amount * 100.0
    ));
}

fn cleave_message(job: &mut TinkerJob<'_>, roll: i32, outcome: CleaveOutcome) {
    match outcome {
        CleaveOutcome::Granted(kind) => {
            let text = format!(
                "You rolled {roll}. Your {} is now {} cleaving!",
                job.target_name(),
                kind.name()
            );
            job.tell(text);
        }
        CleaveOutcome::AlreadyCleaving => {
            job.tell(format!("You rolled {roll}. Your weapon already cleaves resistance."));
        }
        CleaveOutcome::Ineligible => {
            job.tell(format!("You rolled {roll}, but your weapon cannot gain resistance cleaving."));
        }
    }
}

// ---------------------------------------------------------------------------
// Steel
// ---------------------------------------------------------------------------

/// Armor level cascade.
#[derive(Debug, Clone, Copy, Default)]
pub struct Steel;

impl MaterialStrategy for Steel {
    fn apply(&self, _job: &mut TinkerJob<'_>) -> bool {
        true
    }

    fn cascade(&self) -> Option<&dyn Cascade> {
        Some(self)
    }
}

impl Cascade for Steel {
    fn table(&self) -> &'static CascadeTable {
        &STEEL_TABLE
    }

    fn on_gate_failed(&self, gate: i32, job: &mut TinkerJob<'_>) {
        let armor = add_int(job.target, IntKey::ARMOR_LEVEL, 65);
        job.tell(format!(
            "Rolled {gate}: no bonus roll this time. New target armor level {armor} (+65)."
        ));
    }

    fn on_bucket(&self, bucket: Bucket, roll: i32, job: &mut TinkerJob<'_>) {
        match bucket {
            Bucket::ExtraFlat => {
                let extra = job.roll(10, 30);
                let gained = 55_i32.saturating_add(extra);
                let armor = add_int(job.target, IntKey::ARMOR_LEVEL, gained);
                job.tell(format!(
                    "Rolled {roll}. You gained {extra} extra armor level. New target armor level {armor} (+{gained})."
                ));
            }
            Bucket::SecondaryBonus => {
                let sub = job.roll(1, SUB_ROLL_SIDES);
                if let Some(resist) = pick(STEEL_RESISTANCES, sub).flatten() {
                    let armor = add_int(job.target, IntKey::ARMOR_LEVEL, 55);
                    raise_resistance(job.target, resist.key, resist.amount);
                    job.tell(format!(
                        "Rolled {roll}. You gained an extra {:.0}% {} resistance. New target armor level {armor} (+55).",
                        resist.amount * 100.0,
                        resist.label
                    ));
                }
            }
            Bucket::CriticalFailure => {
                let loss = job.roll(1, 25);
                let armor = add_int(job.target, IntKey::ARMOR_LEVEL, loss.saturating_neg());
                let text = format!(
                    "Rolled {roll}. Critical failure! {} lost {loss} armor level applying steel to the {}. New armor level {armor} (-{loss}).",
                    job.actor_name,
                    job.target_name()
                );
                job.tell_nearby(text);
            }
            Bucket::JackpotFlat => {
                let armor = add_int(job.target, IntKey::ARMOR_LEVEL, 80);
                let text = format!(
                    "{} rolled a {roll}! They just got super lucky applying steel to an item! New target armor level {armor} (+80).",
                    job.actor_name
                );
                job.tell_everyone(text);
            }
            Bucket::JackpotBonded => {
                job.target.properties.set_int(IntKey::BONDED, 1);
                let text = format!(
                    "{} rolled a perfect {roll}! They just got super lucky applying steel to their {}! The item is now bonded.",
                    job.actor_name,
                    job.target_name()
                );
                job.tell_everyone(text);
            }
            Bucket::ResistanceCleave | Bucket::SpecialProperty | Bucket::Nothing => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Iron
// ---------------------------------------------------------------------------

/// Melee damage cascade.
#[derive(Debug, Clone, Copy, Default)]
pub struct Iron;

impl Iron {
    const SIGNATURE_BONUS: i32 = 3;
    /// Damage the weapon must already have, before the flat bonus, to gain variance.
    const VARIANCE_DAMAGE_FLOOR: i32 = 80;

    /// Heavy hitters also widen their variance, up to 0.9.
    fn raise_variance(job: &mut TinkerJob<'_>) -> Option<&'static str> {
        let damage = job.target.properties.get_int(IntKey::DAMAGE).unwrap_or(0);
        if damage < Self::VARIANCE_DAMAGE_FLOOR {
            return None;
        }
        let variance = job.target.properties.get_float(FloatKey::DAMAGE_VARIANCE)?;
        let raised = variance + 0.05;
        let (value, note) = if raised >= 1.0 {
            (0.9, " Your weapon has reached maximum variance.")
        } else {
            (raised, " You've also gained 5% variance.")
        };
        job.target
            .properties
            .set_float(FloatKey::DAMAGE_VARIANCE, value);
        Some(note)
    }
}

impl MaterialStrategy for Iron {
    fn apply(&self, _job: &mut TinkerJob<'_>) -> bool {
        true
    }

    fn cascade(&self) -> Option<&dyn Cascade> {
        Some(self)
    }
}

impl Cascade for Iron {
    fn table(&self) -> &'static CascadeTable {
        &IRON_TABLE
    }

    fn on_gate_failed(&self, gate: i32, job: &mut TinkerJob<'_>) {
        job.tell(format!("Rolled {gate}: no bonus roll this time."));
    }

    fn on_bucket(&self, bucket: Bucket, roll: i32, job: &mut TinkerJob<'_>) {
        match bucket {
            Bucket::ExtraFlat => {
                let bonus = Self::SIGNATURE_BONUS.saturating_add(job.roll(1, 4));
                let note = Self::raise_variance(job);
                let damage = add_int(job.target, IntKey::DAMAGE, bonus);
                job.tell(format!(
                    "Rolled {roll}. New weapon damage {damage} (+{bonus}).{}",
                    note.unwrap_or_default()
                ));
            }
            Bucket::CriticalFailure => {
                let loss = job.roll(1, 3);
                let damage = add_int(job.target, IntKey::DAMAGE, loss.saturating_neg());
                let text = format!(
                    "Rolled {roll}. Critical failure! {} lost {loss} damage applying iron to the {}. New damage {damage}.",
                    job.actor_name,
                    job.target_name()
                );
                job.tell_nearby(text);
            }
            Bucket::SecondaryBonus => {
                add_int(job.target, IntKey::DAMAGE, Self::SIGNATURE_BONUS);
                match roll_secondary(job) {
                    Secondary::MagicDefense => {
                        defense_bonus(job, roll, FloatKey::WEAPON_MAGIC_DEFENSE, 0.05, "magic defense");
                    }
                    Secondary::MeleeDefense => {
                        defense_bonus(job, roll, FloatKey::WEAPON_DEFENSE, 0.01, "melee defense");
                    }
                    Secondary::Signature => {
                        defense_bonus(job, roll, FloatKey::WEAPON_OFFENSE, 0.05, "attack");
                    }
                }
            }
            Bucket::ResistanceCleave => {
                let outcome = grant_resistance_cleave(job);
                if outcome != CleaveOutcome::Ineligible {
                    add_int(job.target, IntKey::DAMAGE, Self::SIGNATURE_BONUS);
                }
                cleave_message(job, roll, outcome);
            }
            Bucket::SpecialProperty => {
                if roll_special(IRON_SPECIALS, "iron", roll, job).is_some() {
                    add_int(job.target, IntKey::DAMAGE, Self::SIGNATURE_BONUS);
                }
            }
            Bucket::JackpotFlat | Bucket::JackpotBonded | Bucket::Nothing => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Mahogany
// ---------------------------------------------------------------------------

/// Missile damage modifier cascade. Always grants a base modifier bump.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mahogany;

impl Mahogany {
    const BASE_BONUS: f64 = 0.04;
}

impl MaterialStrategy for Mahogany {
    fn apply(&self, job: &mut TinkerJob<'_>) -> bool {
        add_float(job.target, FloatKey::DAMAGE_MOD, Self::BASE_BONUS, 1.0);
        true
    }

    fn cascade(&self) -> Option<&dyn Cascade> {
        Some(self)
    }
}

impl Cascade for Mahogany {
    fn table(&self) -> &'static CascadeTable {
        &MAHOGANY_TABLE
    }

    fn on_gate_failed(&self, gate: i32, job: &mut TinkerJob<'_>) {
        let modifier = job
            .target
            .properties
            .get_float(FloatKey::DAMAGE_MOD)
            .unwrap_or(1.0);
        job.tell(format!(
            "Rolled {gate}: no bonus roll this time. Damage modifier is now {modifier:.2}."
        ));
    }

    fn on_bucket(&self, bucket: Bucket, roll: i32, job: &mut TinkerJob<'_>) {
        match bucket {
            Bucket::ExtraFlat => {
                let bonus = job.between(0.03, 0.06);
                let modifier = add_float(job.target, FloatKey::DAMAGE_MOD, bonus, 1.0);
                job.tell(format!(
                    "Rolled {roll}. You gained {:.1}% extra damage modifier. Now {modifier:.2}.",
                    bonus * 100.0
                ));
            }
            Bucket::CriticalFailure => {
                let loss = job.between(0.01, 0.05);
                add_float(job.target, FloatKey::DAMAGE_MOD, -loss, 1.0);
                let text = format!(
                    "Rolled {roll}. Critical failure! {} lost {:.1}% damage modifier applying mahogany to the {}.",
                    job.actor_name,
                    loss * 100.0,
                    job.target_name()
                );
                job.tell_nearby(text);
            }
            Bucket::SecondaryBonus => match roll_secondary(job) {
                Secondary::MagicDefense => {
                    defense_bonus(job, roll, FloatKey::WEAPON_MAGIC_DEFENSE, 0.01, "magic defense");
                }
                Secondary::MeleeDefense => {
                    defense_bonus(job, roll, FloatKey::WEAPON_DEFENSE, 0.01, "melee defense");
                }
                Secondary::Signature => elemental_bonus(job, roll, 3),
            },
            Bucket::ResistanceCleave => {
                let outcome = grant_resistance_cleave(job);
                cleave_message(job, roll, outcome);
            }
            Bucket::SpecialProperty => {
                roll_special(MAHOGANY_SPECIALS, "mahogany", roll, job);
            }
            Bucket::JackpotFlat | Bucket::JackpotBonded | Bucket::Nothing => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Green garnet
// ---------------------------------------------------------------------------

/// Caster elemental modifier cascade.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreenGarnet;

impl GreenGarnet {
    const STEP: f64 = 0.01;
}

impl MaterialStrategy for GreenGarnet {
    fn apply(&self, _job: &mut TinkerJob<'_>) -> bool {
        true
    }

    fn cascade(&self) -> Option<&dyn Cascade> {
        Some(self)
    }
}

impl Cascade for GreenGarnet {
    fn table(&self) -> &'static CascadeTable {
        &GREEN_GARNET_TABLE
    }

    fn on_gate_failed(&self, gate: i32, job: &mut TinkerJob<'_>) {
        job.tell(format!("Rolled {gate}: no bonus roll this time."));
    }

    fn on_bucket(&self, bucket: Bucket, roll: i32, job: &mut TinkerJob<'_>) {
        match bucket {
            Bucket::ExtraFlat => {
                if damage_type(job.target).is_none() {
                    let element = roll_element(job);
                    job.target
                        .properties
                        .set_int(IntKey::DAMAGE_TYPE, element.to_stored());
                    job.target
                        .properties
                        .set_float(FloatKey::ELEMENTAL_DAMAGE_MOD, 1.0);
                    let text = format!(
                        "You rolled {roll}. Your {} now does bonus {} damage.",
                        job.target_name(),
                        element.name()
                    );
                    job.tell(text);
                }
                let extra = job.between(0.002, 0.007);
                let modifier =
                    add_float(job.target, FloatKey::ELEMENTAL_DAMAGE_MOD, Self::STEP + extra, 1.0);
                job.tell(format!(
                    "Rolled {roll}. You gained {:.1}% extra elemental damage modifier. Now {modifier:.3}.",
                    extra * 100.0
                ));
            }
            Bucket::CriticalFailure => {
                if job
                    .target
                    .properties
                    .get_float(FloatKey::ELEMENTAL_DAMAGE_MOD)
                    .is_none()
                {
                    job.tell_nearby(format!(
                        "Rolled {roll}. Critical failure! The salvage applies poorly and does nothing."
                    ));
                } else {
                    let loss = job.between(0.001, 0.007);
                    add_float(job.target, FloatKey::ELEMENTAL_DAMAGE_MOD, -loss, 1.0);
                    let text = format!(
                        "Rolled {roll}. Critical failure! {} lost {:.1}% elemental damage modifier on the {}.",
                        job.actor_name,
                        loss * 100.0,
                        job.target_name()
                    );
                    job.tell_nearby(text);
                }
            }
            Bucket::SecondaryBonus => match roll_secondary(job) {
                Secondary::MagicDefense => {
                    defense_bonus(job, roll, FloatKey::WEAPON_MAGIC_DEFENSE, 0.01, "magic defense");
                }
                Secondary::MeleeDefense => {
                    defense_bonus(job, roll, FloatKey::WEAPON_DEFENSE, 0.01, "melee defense");
                }
                Secondary::Signature => elemental_bonus(job, roll, 2),
            },
            Bucket::ResistanceCleave => {
                add_float(job.target, FloatKey::ELEMENTAL_DAMAGE_MOD, Self::STEP, 1.0);
                let outcome = grant_resistance_cleave(job);
                cleave_message(job, roll, outcome);
            }
            Bucket::SpecialProperty => {
                add_float(job.target, FloatKey::ELEMENTAL_DAMAGE_MOD, Self::STEP, 1.0);
                roll_special(GREEN_GARNET_SPECIALS, "green garnet", roll, job);
            }
            Bucket::JackpotFlat | Bucket::JackpotBonded | Bucket::Nothing => {}
        }
    }
}

/// Every cascade material with its table.
pub const CASCADE_TABLES: &[(MaterialType, &CascadeTable)] = &[
    (MaterialType::Steel, &STEEL_TABLE),
    (MaterialType::Iron, &IRON_TABLE),
    (MaterialType::Mahogany, &MAHOGANY_TABLE),
    (MaterialType::GreenGarnet, &GREEN_GARNET_TABLE),
];
