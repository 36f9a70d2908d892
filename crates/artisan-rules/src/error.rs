//! Error types for the artisan-rules crate.
//!
//! Two families share one enum. Precondition failures are recoverable:
//! the actor has already been told why and the attempt stops before any
//! mutation. Data-integrity failures mean the recipe data disagrees with
//! the world and are logged as server errors.

use artisan_types::{EntityId, Skill};

use crate::notify::WeenieError;

/// Errors that abort a crafting attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CraftError {
    /// The actor is already in the middle of another action.
    #[error("actor {actor} is busy")]
    Busy {
        /// The busy actor.
        actor: EntityId,
    },

    /// Crafting outside peace mode is disabled.
    #[error("actor {actor} is not in peace mode")]
    NotInPeaceMode {
        /// The actor in combat stance.
        actor: EntityId,
    },

    /// Source and target are the same object.
    #[error("object {object} cannot be combined with itself")]
    SameObject {
        /// The offending object.
        object: EntityId,
    },

    /// No recipe combines the two weenie classes.
    #[error("no recipe combines class {source_class} with class {target_class}")]
    NoRecipe {
        /// Weenie class of the tool.
        source_class: u32,
        /// Weenie class of the target.
        target_class: u32,
    },

    /// A requirement clause, use check, or tinkering pre-check failed.
    #[error("requirements not met for recipe {recipe_id}")]
    RequirementsFailed {
        /// Recipe being attempted, 0 for salvage combining.
        recipe_id: u32,
    },

    /// The recipe's skill is not trained.
    #[error("actor is not trained in {skill:?}")]
    Untrained {
        /// The untrained skill.
        skill: Skill,
    },

    /// The recipe names a skill id the actor has no record of.
    #[error("recipe {recipe_id} names unknown skill {skill_id}")]
    MissingSkill {
        /// Recipe being attempted.
        recipe_id: u32,
        /// The unresolvable skill id.
        skill_id: u32,
    },

    /// The branch names a result weenie that does not exist.
    #[error("recipe {recipe_id} result class {class_id} not found")]
    ResultWeenieMissing {
        /// Recipe being attempted.
        recipe_id: u32,
        /// The missing weenie class.
        class_id: u32,
    },

    /// A participating object could not be found.
    #[error("object {0} not found")]
    ObjectNotFound(EntityId),
}

impl CraftError {
    /// The client error code that accompanies this failure, if any.
    ///
    /// Failures that already produced chat text and need no code return
    /// `None`.
    pub const fn client_error(&self) -> Option<WeenieError> {
        match self {
            Self::Busy { .. } => Some(WeenieError::YoureTooBusy),
            Self::NotInPeaceMode { .. } => Some(WeenieError::YouMustBeInPeaceModeToTrade),
            Self::RequirementsFailed { .. } => Some(WeenieError::YouDoNotPassCraftingRequirements),
            Self::ResultWeenieMissing { .. } | Self::ObjectNotFound(_) => {
                Some(WeenieError::CraftGeneralErrorUiMsg)
            }
            Self::SameObject { .. }
            | Self::NoRecipe { .. }
            | Self::Untrained { .. }
            | Self::MissingSkill { .. } => None,
        }
    }

    /// Whether this failure points at bad data rather than player input.
    pub const fn is_data_integrity(&self) -> bool {
        matches!(
            self,
            Self::MissingSkill { .. } | Self::ResultWeenieMissing { .. } | Self::ObjectNotFound(_)
        )
    }
}
