//! Recipe data: requirements, outcome branches, and modification clauses.
//!
//! Recipes are loaded from external data and never mutated by the rules
//! core. Comparators and operations that the data names but this crate
//! does not know deserialize to an `Unknown` variant instead of failing
//! the whole load, so one bad clause cannot take down a recipe book.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::Vital;
use crate::properties::{BoolKey, DataKey, FloatKey, InstanceKey, IntKey, StringKey};

// ---------------------------------------------------------------------------
// Recipe
// ---------------------------------------------------------------------------

/// Salvage type marking an ordinary crafting recipe.
pub const SALVAGE_TYPE_CRAFTING: u32 = 0;
/// Salvage type marking a tinkering recipe.
pub const SALVAGE_TYPE_TINKERING: u32 = 1;
/// Salvage type marking an imbue recipe.
pub const SALVAGE_TYPE_IMBUING: u32 = 2;

/// One legal source-on-target interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Recipe {
    /// Recipe id.
    pub id: u32,
    /// Skill id checked by the attempt, 0 for none.
    #[serde(default)]
    pub skill: u32,
    /// Difficulty of the skill check, 0 for none.
    #[serde(default)]
    pub difficulty: u32,
    /// Crafting, tinkering, or imbuing; see the `SALVAGE_TYPE_*` constants.
    #[serde(default)]
    pub salvage_type: u32,
    /// Outcome when the roll succeeds.
    #[serde(default)]
    pub success: RecipeBranch,
    /// Outcome when the roll fails.
    #[serde(default)]
    pub failure: RecipeBranch,
    /// Preconditions, checked in order.
    #[serde(default)]
    pub requirements: Vec<RequirementClause>,
    /// Mutations, applied in order.
    #[serde(default)]
    pub modifications: Vec<ModificationClause>,
}

impl Recipe {
    /// Whether this is a tinkering (or imbuing) recipe.
    pub const fn is_tinkering(&self) -> bool {
        self.salvage_type > SALVAGE_TYPE_CRAFTING
    }

    /// Whether this is an imbue recipe.
    pub const fn is_imbuing(&self) -> bool {
        self.salvage_type == SALVAGE_TYPE_IMBUING
    }

    /// Whether the attempt can fail, which decides if a chance dialog is
    /// worth showing.
    pub const fn has_difficulty(&self) -> bool {
        self.is_tinkering() || (self.skill > 0 && self.difficulty > 0)
    }

    /// The branch selected by the outcome.
    pub const fn branch(&self, success: bool) -> &RecipeBranch {
        if success { &self.success } else { &self.failure }
    }
}

/// Creation and destruction rules for one outcome.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RecipeBranch {
    /// Weenie class of the created result, 0 for none.
    #[serde(default)]
    pub create_item: u32,
    /// Stack size of the created result.
    #[serde(default)]
    pub create_amount: u32,
    /// Message sent to the actor for ordinary crafting.
    #[serde(default)]
    pub message: String,
    /// Probability in [0,1] that the source is consumed.
    #[serde(default)]
    pub destroy_source_chance: f64,
    /// Units of the source consumed.
    #[serde(default)]
    pub destroy_source_amount: u32,
    /// Message sent when the source is consumed.
    #[serde(default)]
    pub destroy_source_message: String,
    /// Probability in [0,1] that the target is consumed.
    #[serde(default)]
    pub destroy_target_chance: f64,
    /// Units of the target consumed.
    #[serde(default)]
    pub destroy_target_amount: u32,
    /// Message sent when the target is consumed.
    #[serde(default)]
    pub destroy_target_message: String,
}

// ---------------------------------------------------------------------------
// Requirements
// ---------------------------------------------------------------------------

/// Which participant a requirement clause inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Subject {
    /// The tool or ingredient being used.
    Source,
    /// The object it is used on.
    Target,
    /// The crafting player.
    Actor,
}

/// Failure-encoded comparator.
///
/// Each variant names the relationship that makes the requirement
/// **fail**. `GreaterThan` with threshold 10 rejects a live value of 11
/// and accepts 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum CompareType {
    /// Fails when live > threshold.
    GreaterThan,
    /// Fails when live <= threshold.
    LessThanEqual,
    /// Fails when live < threshold.
    LessThan,
    /// Fails when live >= threshold.
    GreaterThanEqual,
    /// Fails when live != threshold.
    NotEqual,
    /// Fails when the stat is absent or live != threshold.
    NotEqualNotExist,
    /// Fails when live == threshold.
    Equal,
    /// Fails when the stat is absent.
    NotExist,
    /// Fails when the stat is present.
    Exist,
    /// Fails when live shares no bits with the mask.
    NotHasBits,
    /// Fails when live contains every bit of the mask.
    HasBits,
    /// Unrecognized comparator; always passes.
    #[serde(other)]
    Unknown,
}

/// The stat a requirement reads and the threshold it compares against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum RequirementCheck {
    /// Boolean stat.
    Bool {
        /// Stat key.
        stat: BoolKey,
        /// Threshold.
        value: bool,
    },
    /// Integer stat.
    Int {
        /// Stat key.
        stat: IntKey,
        /// Threshold.
        value: i32,
    },
    /// Float stat.
    Float {
        /// Stat key.
        stat: FloatKey,
        /// Threshold.
        value: f64,
    },
    /// String stat.
    Text {
        /// Stat key.
        stat: StringKey,
        /// Threshold.
        value: String,
    },
    /// Instance-reference stat.
    InstanceId {
        /// Stat key.
        stat: InstanceKey,
        /// Threshold guid.
        value: u32,
    },
    /// Data-reference stat.
    DataId {
        /// Stat key.
        stat: DataKey,
        /// Threshold data id.
        value: u32,
    },
}

/// A single precondition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RequirementClause {
    /// Participant inspected.
    pub subject: Subject,
    /// Stat and threshold.
    pub check: RequirementCheck,
    /// Failure-encoded comparator.
    pub comparator: CompareType,
    /// Message sent to the actor when the clause fails.
    #[serde(default)]
    pub message: String,
}

// ---------------------------------------------------------------------------
// Modifications
// ---------------------------------------------------------------------------

/// Participant a modification reads from or writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Selector {
    /// The tool or ingredient.
    Source,
    /// The object used on.
    Target,
    /// The crafting player.
    Actor,
    /// The newly created result; falls back to the target when none exists.
    Result,
}

/// Operation applied by a property modification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ModificationOperation {
    /// Overwrite with the clause value.
    SetValue,
    /// Add the clause value to the current value.
    Add,
    /// Copy the read-source's value onto the write target.
    CopyFromSourceToTarget,
    /// Copy the read-source's value onto the created result.
    CopyFromSourceToResult,
    /// Add the clause stat as a known spell (integer family only).
    AddSpell,
    /// Bitwise OR.
    SetBitsOn,
    /// Bitwise AND-NOT.
    SetBitsOff,
    /// Unrecognized operation; logged and skipped.
    #[serde(other)]
    Unknown,
}

/// What a modification clause does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum ClauseEffect {
    /// Boolean property operation.
    Bool {
        /// Stat key.
        stat: BoolKey,
        /// Operation.
        op: ModificationOperation,
        /// Operand.
        value: bool,
    },
    /// Integer property operation.
    Int {
        /// Stat key, or spell id for `AddSpell`.
        stat: IntKey,
        /// Operation.
        op: ModificationOperation,
        /// Operand.
        value: i32,
    },
    /// Float property operation.
    Float {
        /// Stat key.
        stat: FloatKey,
        /// Operation.
        op: ModificationOperation,
        /// Operand.
        value: f64,
    },
    /// String property operation.
    Text {
        /// Stat key.
        stat: StringKey,
        /// Operation.
        op: ModificationOperation,
        /// Operand.
        #[serde(default)]
        value: String,
    },
    /// Instance-reference property operation.
    InstanceId {
        /// Stat key.
        stat: InstanceKey,
        /// Operation.
        op: ModificationOperation,
        /// Operand guid.
        #[serde(default)]
        value: u32,
    },
    /// Data-reference property operation.
    DataId {
        /// Stat key.
        stat: DataKey,
        /// Operation.
        op: ModificationOperation,
        /// Operand data id.
        #[serde(default)]
        value: u32,
    },
    /// Change one of the actor's vitals.
    Vital {
        /// Vital changed.
        vital: Vital,
        /// Signed delta.
        delta: i32,
    },
    /// Rewrite the write target's weenie class.
    WeenieClass {
        /// New weenie class id.
        class_id: u32,
    },
    /// Run a data-id keyed item mutation on the target.
    Mutation {
        /// Mutation data id.
        data_id: u32,
    },
}

/// One ordered mutation instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ModificationClause {
    /// Runs on success when `true`, on failure when `false`.
    #[serde(default = "default_executes_on_success")]
    pub executes_on_success: bool,
    /// The effect applied.
    pub effect: ClauseEffect,
    /// Participant values are copied from.
    #[serde(default = "default_read_from")]
    pub read_from: Selector,
    /// Participant written to.
    #[serde(default = "default_write_to")]
    pub write_to: Selector,
}

const fn default_executes_on_success() -> bool {
    true
}

const fn default_read_from() -> Selector {
    Selector::Source
}

const fn default_write_to() -> Selector {
    Selector::Target
}
