//! Per-attempt state: the participating objects, the injected
//! collaborators, and the set of objects that changed.

use std::collections::BTreeSet;

use artisan_types::{EntityId, Selector, WorldObject};

use crate::crafter::Crafter;
use crate::dice::Dice;
use crate::notify::Notifier;
use crate::services::{CraftHooks, ItemFactory, WorldLookup};

/// The objects taking part in one attempt.
pub struct Participants<'a> {
    /// The crafting player.
    pub actor: &'a mut Crafter,
    /// The tool or ingredient.
    pub source: &'a mut WorldObject,
    /// The object the tool is used on.
    pub target: &'a mut WorldObject,
    /// The object created by the attempt, if any.
    pub result: Option<&'a mut WorldObject>,
}

impl Participants<'_> {
    /// The object a selector names. `Result` falls back to the target when
    /// nothing was created.
    pub fn get(&self, selector: Selector) -> &WorldObject {
        match selector {
            Selector::Actor => &self.actor.object,
            Selector::Source => &*self.source,
            Selector::Target => &*self.target,
            Selector::Result => self.result.as_deref().unwrap_or(&*self.target),
        }
    }

    /// Mutable access to the object a selector names.
    pub fn get_mut(&mut self, selector: Selector) -> &mut WorldObject {
        match selector {
            Selector::Actor => &mut self.actor.object,
            Selector::Source => &mut *self.source,
            Selector::Target => &mut *self.target,
            Selector::Result => match self.result.as_deref_mut() {
                Some(result) => result,
                None => &mut *self.target,
            },
        }
    }
}

/// Collaborators consumed while resolving an attempt.
pub struct Collaborators<'a> {
    /// Recipe and weenie data.
    pub lookup: &'a dyn WorldLookup,
    /// Outbound chat and sync.
    pub notifier: &'a mut dyn Notifier,
    /// Proficiency, quest, and death hooks.
    pub hooks: &'a mut dyn CraftHooks,
    /// Random samples.
    pub dice: &'a mut dyn Dice,
    /// Result item construction.
    pub factory: &'a mut dyn ItemFactory,
}

/// Guids of every object written during one attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModifiedSet(BTreeSet<EntityId>);

impl ModifiedSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a write to `id`.
    pub fn insert(&mut self, id: EntityId) {
        self.0.insert(id);
    }

    /// Whether `id` was written.
    pub fn contains(&self, id: EntityId) -> bool {
        self.0.contains(&id)
    }

    /// Number of distinct objects written.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing was written.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Merge another set into this one.
    pub fn extend(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    /// Guids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.0.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use artisan_types::{ItemType, WeenieType};

    use super::*;

    fn object(id: u32, name: &str) -> WorldObject {
        WorldObject::new(EntityId(id), id, ItemType::Misc, WeenieType::Generic, name)
    }

    #[test]
    fn result_selector_falls_back_to_target() {
        let mut actor = Crafter::new(EntityId(1), "Aldric");
        let mut source = object(2, "Tool");
        let mut target = object(3, "Gem");
        let mut parts = Participants {
            actor: &mut actor,
            source: &mut source,
            target: &mut target,
            result: None,
        };
        assert_eq!(parts.get(Selector::Result).id, EntityId(3));
        assert_eq!(parts.get_mut(Selector::Result).id, EntityId(3));
        assert_eq!(parts.get(Selector::Actor).id, EntityId(1));
    }

    #[test]
    fn result_selector_prefers_created_object() {
        let mut actor = Crafter::new(EntityId(1), "Aldric");
        let mut source = object(2, "Tool");
        let mut target = object(3, "Gem");
        let mut result = object(4, "Cut Gem");
        let parts = Participants {
            actor: &mut actor,
            source: &mut source,
            target: &mut target,
            result: Some(&mut result),
        };
        assert_eq!(parts.get(Selector::Result).name(), "Cut Gem");
    }

    #[test]
    fn modified_set_deduplicates() {
        let mut set = ModifiedSet::new();
        set.insert(EntityId(5));
        set.insert(EntityId(5));
        set.insert(EntityId(2));
        assert_eq!(set.len(), 2);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![EntityId(2), EntityId(5)]);
    }
}
