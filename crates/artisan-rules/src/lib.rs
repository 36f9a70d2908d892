//! Crafting rules for the Artisan server.
//!
//! This crate holds the logic layer for use-object-on-target attempts:
//! everything that reads and writes world objects without touching I/O.
//! It sits between `artisan-types` (the data definitions) and
//! `artisan-core` (actor queues, confirmation, and timing).
//!
//! # Modules
//!
//! - [`chance`] -- Success probability, tinkering difficulty, dialog text
//! - [`config`] -- Tunable parameters ([`CraftingConfig`])
//! - [`context`] -- Participants, collaborators, and the [`ModifiedSet`]
//! - [`crafter`] -- The acting player ([`Crafter`])
//! - [`dice`] -- Injectable random sampling ([`Dice`])
//! - [`dispatch`] -- Material strategies vs. the data-id mutation table
//! - [`engine`] -- One attempt from precondition to outcome ([`CraftingEngine`])
//! - [`error`] -- Error types for crafting attempts ([`CraftError`])
//! - [`legacy`] -- The data-id keyed mutation table
//! - [`lifecycle`] -- Destroy rolls, item removal, and result creation
//! - [`mutation`] -- Modification clauses applied to participants
//! - [`notify`] -- Outbound chat, error codes, and object sync ([`Notifier`])
//! - [`outcome`] -- The success roll
//! - [`requirements`] -- Requirement clauses and pre-checks
//! - [`salvage`] -- Combining partial salvage bags
//! - [`services`] -- World lookup, skill curve, hooks, and item factory
//! - [`tinkering`] -- Material strategies and randomized cascades

pub mod chance;
pub mod config;
pub mod context;
pub mod crafter;
pub mod dice;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod legacy;
pub mod lifecycle;
pub mod mutation;
pub mod notify;
pub mod outcome;
pub mod requirements;
pub mod salvage;
pub mod services;
pub mod tinkering;

// Re-export primary types at crate root for convenience.
pub use chance::{ChanceCalculator, tinker_difficulty};
pub use config::{CraftingConfig, MutationStrategy};
pub use context::{Collaborators, ModifiedSet, Participants};
pub use crafter::{Augmentations, Crafter, SkillRecord, VitalPool, Vitals};
pub use dice::{Dice, RngDice, ScriptedDice, SharedDice};
pub use dispatch::{LegacyDispatch, MutationDispatch, NativeDispatch, dispatcher_for};
pub use engine::{Attempt, CraftOutcome, CraftingEngine, Plan, report_failure};
pub use error::CraftError;
pub use notify::{ChatChannel, Notice, NoticeLog, Notifier, WeenieError};
pub use outcome::Outcome;
pub use services::{
    CookbookEntry, CraftHooks, ItemFactory, LogisticSkillCurve, NoHooks, RecipeBook, SkillCurve,
    StaticWorldLookup, WeenieFactory, WorldLookup,
};
pub use tinkering::{MaterialStrategy, TinkerJob, TinkerOutcome, TinkeringResolver};
