//! World data: the recipe book, seeded actors, and the scripted session.
//!
//! Everything is read from one YAML file (`config/world.yaml` by default):
//!
//! ```yaml
//! book:
//!   recipes: [...]
//!   cookbook: [...]
//!   weenies: [...]
//! actors:
//!   - crafter: { object: {...}, skills: {...} }
//!     items: [...]
//! session:
//!   - { actor: 1342177281, source: 70, target: 71 }
//! ```

use std::collections::BTreeSet;
use std::path::Path;

use artisan_core::ActorState;
use artisan_rules::{Crafter, RecipeBook};
use artisan_types::{EntityId, WorldObject};
use serde::Deserialize;

use crate::error::EngineError;
use crate::session::SessionStep;

/// One actor and the items it starts with.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ActorSeed {
    /// The actor.
    pub crafter: Crafter,
    /// Objects the actor can reach.
    #[serde(default)]
    pub items: Vec<WorldObject>,
}

impl From<ActorSeed> for ActorState {
    fn from(seed: ActorSeed) -> Self {
        Self::new(seed.crafter, seed.items)
    }
}

/// The contents of a world data file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WorldData {
    /// Recipes, cookbook bindings, and weenies.
    #[serde(default)]
    pub book: RecipeBook,
    /// Actors to spawn.
    #[serde(default)]
    pub actors: Vec<ActorSeed>,
    /// Attempts to run, in order.
    #[serde(default)]
    pub session: Vec<SessionStep>,
}

impl WorldData {
    /// Read and validate a world data file.
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let contents = std::fs::read_to_string(path).map_err(|source| EngineError::WorldRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    /// Parse and validate world data from YAML.
    pub fn parse(yaml: &str) -> Result<Self, EngineError> {
        let world: Self =
            serde_yml::from_str(yaml).map_err(|source| EngineError::WorldParse { source })?;
        world.validate()?;
        Ok(world)
    }

    /// Every cookbook binding names a defined recipe, and every session
    /// step names a seeded actor.
    fn validate(&self) -> Result<(), EngineError> {
        let recipes: BTreeSet<u32> = self.book.recipes.iter().map(|r| r.id).collect();
        if let Some(entry) = self
            .book
            .cookbook
            .iter()
            .find(|entry| !recipes.contains(&entry.recipe_id))
        {
            return Err(EngineError::UnknownRecipe {
                source_class: entry.source_class,
                target_class: entry.target_class,
                recipe_id: entry.recipe_id,
            });
        }

        let actors: BTreeSet<EntityId> = self.actors.iter().map(|a| a.crafter.id()).collect();
        if let Some(step) = self.session.iter().find(|step| !actors.contains(&step.actor)) {
            return Err(EngineError::UnknownActor { actor: step.actor });
        }
        Ok(())
    }
}
