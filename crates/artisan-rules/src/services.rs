//! Collaborators the rules core consumes: world data lookup, the skill
//! check curve, side-effect hooks, and the result item factory.
//!
//! All of these are injected at construction. Nothing here reaches for
//! global state.

use std::collections::BTreeMap;

use artisan_types::{EntityId, MaterialType, Recipe, Skill, Weenie, WorldObject};
use serde::{Deserialize, Serialize};

use crate::crafter::Crafter;

// ---------------------------------------------------------------------------
// World lookup
// ---------------------------------------------------------------------------

/// Display name prefixed with the material, e.g. "Steel Salvage (100)".
pub fn name_with_material(lookup: &dyn WorldLookup, object: &WorldObject) -> String {
    let name = object.name();
    match object.material() {
        Some(material) => {
            let label = lookup.material_name(material);
            if name.starts_with(&label) {
                name.to_owned()
            } else {
                format!("{label} {name}")
            }
        }
        None => name.to_owned(),
    }
}

/// Read-only access to recipe and weenie data.
pub trait WorldLookup: Send + Sync {
    /// The recipe that applies `source_class` to `target_class`, if any.
    fn recipe(&self, source_class: u32, target_class: u32) -> Option<&Recipe>;

    /// A weenie definition by class id.
    fn weenie(&self, class_id: u32) -> Option<&Weenie>;

    /// Display name for a material.
    fn material_name(&self, material: MaterialType) -> String {
        material.display_name().to_owned()
    }
}

/// One cookbook row binding a (tool, target) class pair to a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookbookEntry {
    /// Tool weenie class.
    pub source_class: u32,
    /// Target weenie class.
    pub target_class: u32,
    /// Recipe id.
    pub recipe_id: u32,
}

/// Serialized form of a recipe book.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecipeBook {
    /// Recipes, keyed by their own id.
    pub recipes: Vec<Recipe>,
    /// Tool/target bindings.
    pub cookbook: Vec<CookbookEntry>,
    /// Weenie definitions used for results and class mutation.
    pub weenies: Vec<Weenie>,
    /// Material display-name overrides.
    pub material_names: BTreeMap<MaterialType, String>,
}

/// In-memory [`WorldLookup`] built from a [`RecipeBook`].
#[derive(Debug, Clone, Default)]
pub struct StaticWorldLookup {
    recipes: BTreeMap<u32, Recipe>,
    cookbook: BTreeMap<(u32, u32), u32>,
    weenies: BTreeMap<u32, Weenie>,
    material_names: BTreeMap<MaterialType, String>,
}

impl StaticWorldLookup {
    /// An empty lookup.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a recipe and bind it to a tool/target class pair.
    #[must_use]
    pub fn with_recipe(mut self, source_class: u32, target_class: u32, recipe: Recipe) -> Self {
        self.cookbook
            .insert((source_class, target_class), recipe.id);
        self.recipes.insert(recipe.id, recipe);
        self
    }

    /// Register a weenie definition.
    #[must_use]
    pub fn with_weenie(mut self, weenie: Weenie) -> Self {
        self.weenies.insert(weenie.class_id, weenie);
        self
    }

    /// Number of cookbook bindings.
    pub fn binding_count(&self) -> usize {
        self.cookbook.len()
    }
}

impl From<RecipeBook> for StaticWorldLookup {
    fn from(book: RecipeBook) -> Self {
        Self {
            recipes: book.recipes.into_iter().map(|r| (r.id, r)).collect(),
            cookbook: book
                .cookbook
                .into_iter()
                .map(|e| ((e.source_class, e.target_class), e.recipe_id))
                .collect(),
            weenies: book.weenies.into_iter().map(|w| (w.class_id, w)).collect(),
            material_names: book.material_names,
        }
    }
}

impl WorldLookup for StaticWorldLookup {
    fn recipe(&self, source_class: u32, target_class: u32) -> Option<&Recipe> {
        let id = self.cookbook.get(&(source_class, target_class))?;
        self.recipes.get(id)
    }

    fn weenie(&self, class_id: u32) -> Option<&Weenie> {
        self.weenies.get(&class_id)
    }

    fn material_name(&self, material: MaterialType) -> String {
        self.material_names
            .get(&material)
            .cloned()
            .unwrap_or_else(|| material.display_name().to_owned())
    }
}

// ---------------------------------------------------------------------------
// Skill check curve
// ---------------------------------------------------------------------------

/// Monotonic map from (skill, difficulty) to a success chance.
pub trait SkillCurve: Send + Sync {
    /// Chance in `[0, 1]`; never decreases as `skill` grows.
    fn chance(&self, skill: u32, difficulty: u32) -> f64;
}

/// The classic logistic skill check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogisticSkillCurve {
    /// Steepness of the curve around `skill == difficulty`.
    pub factor: f64,
}

impl Default for LogisticSkillCurve {
    fn default() -> Self {
        Self { factor: 0.03 }
    }
}

impl SkillCurve for LogisticSkillCurve {
    fn chance(&self, skill: u32, difficulty: u32) -> f64 {
        let delta = f64::from(skill) - f64::from(difficulty);
        let chance = 1.0 - 1.0 / (1.0 + (self.factor * delta).exp());
        chance.clamp(0.0, 1.0)
    }
}

// ---------------------------------------------------------------------------
// Side-effect hooks
// ---------------------------------------------------------------------------

/// Side effects owned by other subsystems.
///
/// Every method has a no-op default.
pub trait CraftHooks: Send {
    /// A skill-gated attempt succeeded; advancement may award experience.
    fn grant_proficiency(&mut self, _actor: &mut Crafter, _skill: Skill, _difficulty: u32) {}

    /// Quest-linked mutation of a freshly created result. Returns a system
    /// message for the actor when something changed.
    fn mutate_quest_item(&mut self, _tool_class: u32, _result: &mut WorldObject) -> Option<String> {
        None
    }

    /// The actor's health dropped to zero during a mutation.
    fn on_death(&mut self, _actor: &mut Crafter) {}
}

/// Hooks that do nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl CraftHooks for NoHooks {}

// ---------------------------------------------------------------------------
// Item factory
// ---------------------------------------------------------------------------

/// Instantiates world objects from weenie definitions.
pub trait ItemFactory: Send {
    /// A new object built from `weenie`, or `None` if no guid is available.
    fn create(&mut self, weenie: &Weenie) -> Option<WorldObject>;
}

/// Factory that hands out guids from a counter.
#[derive(Debug, Clone)]
pub struct WeenieFactory {
    next_guid: u32,
}

impl WeenieFactory {
    /// Start allocating at `first_guid`.
    pub const fn starting_at(first_guid: u32) -> Self {
        Self {
            next_guid: first_guid,
        }
    }
}

impl ItemFactory for WeenieFactory {
    fn create(&mut self, weenie: &Weenie) -> Option<WorldObject> {
        let id = self.next_guid;
        self.next_guid = id.checked_add(1)?;
        Some(instantiate(EntityId(id), weenie))
    }
}

/// A fresh object with guid `id` carrying the weenie's default properties.
pub fn instantiate(id: EntityId, weenie: &Weenie) -> WorldObject {
    let mut object = WorldObject::new(
        id,
        weenie.class_id,
        weenie.item_type,
        weenie.weenie_type,
        &weenie.name,
    );
    object.properties = weenie.properties.clone();
    object
        .properties
        .set_string(artisan_types::StringKey::NAME, weenie.name.as_str());
    object
}

#[cfg(test)]
mod tests {
    use artisan_types::{ItemType, PropertyStore, RecipeBranch, WeenieType};

    use super::*;

    fn recipe(id: u32) -> Recipe {
        Recipe {
            id,
            skill: 0,
            difficulty: 0,
            salvage_type: 0,
            success: RecipeBranch::default(),
            failure: RecipeBranch::default(),
            requirements: Vec::new(),
            modifications: Vec::new(),
        }
    }

    fn weenie(class_id: u32) -> Weenie {
        Weenie {
            class_id,
            name: String::from("Bundle of Arrowheads"),
            item_type: ItemType::Misc,
            weenie_type: WeenieType::Stackable,
            properties: PropertyStore::new(),
        }
    }

    #[test]
    fn cookbook_binds_class_pairs() {
        let lookup = StaticWorldLookup::new().with_recipe(10, 20, recipe(7));
        assert_eq!(lookup.recipe(10, 20).map(|r| r.id), Some(7));
        assert!(lookup.recipe(20, 10).is_none());
        assert_eq!(lookup.binding_count(), 1);
    }

    #[test]
    fn recipe_book_converts() {
        let book = RecipeBook {
            recipes: vec![recipe(3)],
            cookbook: vec![CookbookEntry {
                source_class: 1,
                target_class: 2,
                recipe_id: 3,
            }],
            weenies: vec![weenie(500)],
            material_names: BTreeMap::from([(MaterialType::Steel, String::from("Fine Steel"))]),
        };
        let lookup = StaticWorldLookup::from(book);
        assert!(lookup.recipe(1, 2).is_some());
        assert!(lookup.weenie(500).is_some());
        assert_eq!(lookup.material_name(MaterialType::Steel), "Fine Steel");
        assert_eq!(lookup.material_name(MaterialType::Iron), "Iron");
    }

    #[test]
    fn material_prefix_is_added_once() {
        let lookup = StaticWorldLookup::new();
        let mut bag = WorldObject::new(
            EntityId(1),
            20_983,
            ItemType::TinkeringMaterial,
            WeenieType::Salvage,
            "Salvage (100)",
        );
        assert_eq!(name_with_material(&lookup, &bag), "Salvage (100)");
        bag.properties
            .set_int(artisan_types::IntKey::MATERIAL_TYPE, MaterialType::Steel.id());
        assert_eq!(name_with_material(&lookup, &bag), "Steel Salvage (100)");
        bag.properties
            .set_string(artisan_types::StringKey::NAME, "Steel Breastplate");
        assert_eq!(name_with_material(&lookup, &bag), "Steel Breastplate");
    }

    #[test]
    fn logistic_curve_is_half_at_parity() {
        let curve = LogisticSkillCurve::default();
        let at_parity = curve.chance(200, 200);
        assert!((at_parity - 0.5).abs() < 1e-9);
    }

    #[test]
    fn logistic_curve_is_monotonic_in_skill() {
        let curve = LogisticSkillCurve::default();
        let mut last = 0.0;
        for skill in (0..600).step_by(5) {
            let chance = curve.chance(skill, 250);
            assert!(chance >= last);
            last = chance;
        }
    }

    #[test]
    fn factory_allocates_sequential_guids() {
        let mut factory = WeenieFactory::starting_at(0x8000_0000);
        let first = factory.create(&weenie(500));
        let second = factory.create(&weenie(500));
        assert_eq!(first.map(|o| o.id), Some(EntityId(0x8000_0000)));
        assert_eq!(second.as_ref().map(|o| o.id), Some(EntityId(0x8000_0001)));
        assert_eq!(second.as_ref().map(WorldObject::name), Some("Bundle of Arrowheads"));
    }

    #[test]
    fn factory_stops_at_guid_exhaustion() {
        let mut factory = WeenieFactory::starting_at(u32::MAX);
        assert!(factory.create(&weenie(1)).is_none());
    }
}
