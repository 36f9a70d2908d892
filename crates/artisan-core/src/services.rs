//! Shared services every actor queue draws on.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use artisan_rules::services::instantiate;
use artisan_rules::{CraftingEngine, ItemFactory, SharedDice, WorldLookup};
use artisan_types::{EntityId, Weenie, WorldObject};

use crate::config::{PipelineConfig, ServerConfig};
use crate::confirm::ConfirmationManager;
use crate::notify::BroadcastNotifier;

/// Notices buffered per lagging subscriber.
const NOTICE_CAPACITY: usize = 256;

/// Hands out guids for created items across every actor.
///
/// Cloning shares the counter.
#[derive(Debug, Clone)]
pub struct GuidAllocator {
    next: Arc<AtomicU32>,
}

impl GuidAllocator {
    /// Start allocating at `first`.
    pub fn starting_at(first: u32) -> Self {
        Self {
            next: Arc::new(AtomicU32::new(first)),
        }
    }

    /// The next guid, or `None` once the range is exhausted.
    pub fn allocate(&self) -> Option<EntityId> {
        self.next
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_add(1))
            .ok()
            .map(EntityId)
    }
}

impl ItemFactory for GuidAllocator {
    fn create(&mut self, weenie: &Weenie) -> Option<WorldObject> {
        let id = self.allocate()?;
        Some(instantiate(id, weenie))
    }
}

/// Everything an actor queue needs besides its own state.
#[derive(Clone)]
pub struct Services {
    /// The rules engine.
    pub engine: Arc<CraftingEngine>,
    /// Recipe and weenie data.
    pub lookup: Arc<dyn WorldLookup>,
    /// Shared random generator.
    pub dice: SharedDice,
    /// Guid source for created items.
    pub guids: GuidAllocator,
    /// Outbound notices.
    pub notifier: BroadcastNotifier,
    /// Pipeline delays.
    pub timing: PipelineConfig,
    /// Open confirmation dialogs.
    pub confirmations: Arc<ConfirmationManager>,
}

impl Services {
    /// Build the services described by `config` over `lookup`.
    pub fn new(config: &ServerConfig, lookup: Arc<dyn WorldLookup>) -> Self {
        let dice = config
            .world
            .seed
            .map_or_else(SharedDice::from_os_rng, SharedDice::seeded);
        Self {
            engine: Arc::new(CraftingEngine::new(config.crafting.clone())),
            lookup,
            dice,
            guids: GuidAllocator::starting_at(config.world.first_dynamic_guid),
            notifier: BroadcastNotifier::new(NOTICE_CAPACITY),
            timing: config.pipeline,
            confirmations: Arc::new(ConfirmationManager::new()),
        }
    }

    /// Replace the rules engine.
    #[must_use]
    pub fn with_engine(mut self, engine: CraftingEngine) -> Self {
        self.engine = Arc::new(engine);
        self
    }

    /// Replace the random generator.
    #[must_use]
    pub fn with_dice(mut self, dice: SharedDice) -> Self {
        self.dice = dice;
        self
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("engine", &self.engine)
            .field("guids", &self.guids)
            .field("timing", &self.timing)
            .finish_non_exhaustive()
    }
}
