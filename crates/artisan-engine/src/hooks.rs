//! Side-effect hooks for the scripted session.
//!
//! The engine has no advancement, quest, or death subsystems of its own,
//! so these hooks log each call and count it in a tally shared by every
//! actor queue.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use artisan_rules::{CraftHooks, Crafter};
use artisan_types::{Skill, WorldObject};
use tracing::{debug, info, warn};

/// Hook calls counted across all actors.
#[derive(Debug, Default)]
pub struct HookTally {
    grants: AtomicU32,
    deaths: AtomicU32,
}

impl HookTally {
    /// Proficiency grants so far.
    pub fn grants(&self) -> u32 {
        self.grants.load(Ordering::Relaxed)
    }

    /// Deaths so far.
    pub fn deaths(&self) -> u32 {
        self.deaths.load(Ordering::Relaxed)
    }
}

/// Hooks that log every call.
#[derive(Debug, Clone)]
pub struct LoggingHooks {
    tally: Arc<HookTally>,
}

impl LoggingHooks {
    /// Hooks counting into `tally`.
    pub const fn new(tally: Arc<HookTally>) -> Self {
        Self { tally }
    }
}

impl CraftHooks for LoggingHooks {
    fn grant_proficiency(&mut self, actor: &mut Crafter, skill: Skill, difficulty: u32) {
        self.tally.grants.fetch_add(1, Ordering::Relaxed);
        info!(actor = %actor.id(), skill = skill.display_name(), difficulty, "proficiency granted");
    }

    fn mutate_quest_item(&mut self, tool_class: u32, result: &mut WorldObject) -> Option<String> {
        debug!(tool_class, result = %result.id, "no quest mutation registered");
        None
    }

    fn on_death(&mut self, actor: &mut Crafter) {
        self.tally.deaths.fetch_add(1, Ordering::Relaxed);
        warn!(actor = %actor.id(), "actor died while crafting");
    }
}
