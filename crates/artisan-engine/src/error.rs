//! Error types for the Artisan engine binary.
//!
//! [`EngineError`] wraps every failure mode during startup and the
//! scripted session so `main` can propagate with `?`.

use std::path::PathBuf;

use artisan_core::{ConfigError, PipelineError};
use artisan_types::EntityId;

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Server configuration could not be loaded.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// The world data file could not be read.
    #[error("failed to read world data {}: {source}", path.display())]
    WorldRead {
        /// Path that was read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The world data file is not valid YAML for a world.
    #[error("failed to parse world data: {source}")]
    WorldParse {
        /// The underlying YAML error.
        source: serde_yml::Error,
    },

    /// A cookbook binding names a recipe the book does not define.
    #[error("cookbook binds classes {source_class}/{target_class} to unknown recipe {recipe_id}")]
    UnknownRecipe {
        /// Tool weenie class.
        source_class: u32,
        /// Target weenie class.
        target_class: u32,
        /// The missing recipe id.
        recipe_id: u32,
    },

    /// A session step names an actor with no seed.
    #[error("session step names unknown actor {actor}")]
    UnknownActor {
        /// The missing actor.
        actor: EntityId,
    },

    /// An actor queue stopped accepting commands.
    #[error("pipeline error: {source}")]
    Pipeline {
        /// The underlying pipeline error.
        #[from]
        source: PipelineError,
    },

    /// A spawned task panicked or was cancelled.
    #[error("task error: {source}")]
    Task {
        /// The underlying join error.
        #[from]
        source: tokio::task::JoinError,
    },
}
