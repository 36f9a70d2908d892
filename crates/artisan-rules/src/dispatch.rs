//! Selection between the material-strategy and data-id mutation paths.
//!
//! A recipe's `Mutation` clause carries a data id. The native dispatcher
//! resolves tinkering recipes through the registered material strategies
//! and sends everything else to the data-id table. The legacy dispatcher
//! always uses the table. The two paths do not produce identical results
//! for every id and are tested separately.

use artisan_types::Recipe;
use tracing::debug;

use crate::config::{CraftingConfig, MutationStrategy};
use crate::legacy;
use crate::tinkering::{TinkerJob, TinkerOutcome, TinkeringResolver};

/// Applies a recipe's data-id mutation to a tinker job.
pub trait MutationDispatch: Send + Sync {
    /// Apply the mutation named by `data_id`. Returns `true` when the
    /// target changed.
    fn mutate(&self, recipe: &Recipe, data_id: u32, job: &mut TinkerJob<'_>) -> bool;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Material strategies first, the data-id table as fallback.
#[derive(Debug)]
pub struct NativeDispatch {
    resolver: TinkeringResolver,
}

impl NativeDispatch {
    /// Dispatch through `resolver`.
    pub const fn new(resolver: TinkeringResolver) -> Self {
        Self { resolver }
    }

    /// The material registry.
    pub const fn resolver(&self) -> &TinkeringResolver {
        &self.resolver
    }
}

impl MutationDispatch for NativeDispatch {
    fn mutate(&self, recipe: &Recipe, data_id: u32, job: &mut TinkerJob<'_>) -> bool {
        let registered = job
            .tool
            .material()
            .is_some_and(|material| self.resolver.handles(material));

        if recipe.is_tinkering() && registered {
            return self.resolver.apply(job) == TinkerOutcome::Applied;
        }

        debug!(
            recipe = recipe.id,
            data_id,
            tinkering = recipe.is_tinkering(),
            "falling back to mutation table"
        );
        legacy::apply(data_id, job)
    }

    fn name(&self) -> &'static str {
        "native"
    }
}

/// The data-id table for every recipe.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyDispatch;

impl MutationDispatch for LegacyDispatch {
    fn mutate(&self, _recipe: &Recipe, data_id: u32, job: &mut TinkerJob<'_>) -> bool {
        legacy::apply(data_id, job)
    }

    fn name(&self) -> &'static str {
        "legacy"
    }
}

/// The dispatcher `config` selects.
pub fn dispatcher_for(config: &CraftingConfig) -> Box<dyn MutationDispatch> {
    match config.mutation_strategy {
        MutationStrategy::Native => Box::new(NativeDispatch::new(TinkeringResolver::new(
            config.unlogged_materials.clone(),
        ))),
        MutationStrategy::Legacy => Box::new(LegacyDispatch),
    }
}
