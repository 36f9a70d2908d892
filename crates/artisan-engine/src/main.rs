//! Artisan engine binary.
//!
//! Loads the server configuration and world data, spawns one action queue
//! per seeded actor, and runs the scripted crafting session from the world
//! file.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `$ARTISAN_CONFIG` or `config/artisan.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Load the recipe book, actors, and session from the world file
//! 4. Build the shared services (engine, lookup, dice, guids, notifier)
//! 5. Run the session and log the tally

mod error;
mod hooks;
mod session;
mod world;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use artisan_core::{LoggingConfig, ServerConfig, Services};
use artisan_rules::{StaticWorldLookup, WorldLookup};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::world::WorldData;

const DEFAULT_CONFIG: &str = "config/artisan.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration or world data cannot be loaded, or
/// if an actor queue stops unexpectedly.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::var_os("ARTISAN_CONFIG")
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG), PathBuf::from);
    let (config, found) = load_config(&config_path)?;

    init_tracing(&config.logging);
    info!("artisan-engine starting");
    if found {
        info!(path = %config_path.display(), "configuration loaded");
    } else {
        info!(path = %config_path.display(), "config file not found, using defaults");
    }
    info!(
        seed = ?config.world.seed,
        mutation_strategy = ?config.crafting.mutation_strategy,
        allow_combat_mode_crafting = config.crafting.allow_combat_mode_crafting,
        clap_ms = config.pipeline.clap_ms,
        confirmation_timeout_ms = config.pipeline.confirmation_timeout_ms,
        "crafting rules configured"
    );

    let world = WorldData::load(&config.world.data_file).with_context(|| {
        format!("loading world data from {}", config.world.data_file.display())
    })?;
    info!(
        recipes = world.book.recipes.len(),
        bindings = world.book.cookbook.len(),
        weenies = world.book.weenies.len(),
        actors = world.actors.len(),
        steps = world.session.len(),
        "world data loaded"
    );

    let lookup: Arc<dyn WorldLookup> = Arc::new(StaticWorldLookup::from(world.book));
    let services = Services::new(&config, lookup);

    let report = session::run(&services, world.actors, &world.session).await?;
    info!(
        attempts = report.attempts,
        succeeded = report.succeeded,
        failed = report.failed,
        rejected = report.rejected,
        proficiency_grants = report.proficiency_grants,
        deaths = report.deaths,
        "session complete"
    );
    Ok(())
}

/// Load the server configuration, falling back to defaults when the file
/// does not exist. The flag reports whether the file was found.
fn load_config(path: &Path) -> Result<(ServerConfig, bool), EngineError> {
    if path.exists() {
        Ok((ServerConfig::from_file(path)?, true))
    } else {
        Ok((ServerConfig::default(), false))
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
