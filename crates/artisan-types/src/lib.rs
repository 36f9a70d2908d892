//! Shared type definitions for the Artisan crafting rules core.
//!
//! This crate is the single source of truth for the data the rules core
//! reads and writes: object guids, typed property stores, world objects,
//! and recipe data. Recipe types flow downstream to `TypeScript` via
//! `ts-rs` for the recipe authoring tools.
//!
//! # Modules
//!
//! - [`ids`] -- Object guids and attempt correlation ids
//! - [`enums`] -- Materials, imbued effects, damage types, skills, and other
//!   stored enumerations
//! - [`properties`] -- Typed property keys and the sparse [`PropertyStore`]
//! - [`object`] -- [`WorldObject`] and [`Weenie`] definitions
//! - [`recipe`] -- Recipes, requirement clauses, and modification clauses

pub mod enums;
pub mod ids;
pub mod object;
pub mod properties;
pub mod recipe;

// Re-export all public types at crate root for convenience.
pub use enums::{
    CombatMode, DamageType, HeritageGroup, ImbuedEffects, ItemType, MaterialType, Skill,
    SkillAdvancementClass, Usable, Vital, WeenieType,
};
pub use ids::{AttemptId, EntityId};
pub use object::{Placement, Weenie, WorldObject};
pub use properties::{
    BoolKey, DataKey, FloatKey, InstanceKey, IntKey, PropertyStore, StringKey, UI_EFFECT_MAGICAL,
};
pub use recipe::{
    ClauseEffect, CompareType, ModificationClause, ModificationOperation, Recipe, RecipeBranch,
    RequirementCheck, RequirementClause, SALVAGE_TYPE_CRAFTING, SALVAGE_TYPE_IMBUING,
    SALVAGE_TYPE_TINKERING, Selector, Subject,
};
