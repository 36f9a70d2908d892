//! Result creation and destruction of consumed participants.
//!
//! Destroy rolls are drawn independently of the outcome roll, target
//! first. The result weenie is resolved before anything is destroyed so a
//! broken recipe never eats the actor's items.

use artisan_types::{
    EntityId, IntKey, Placement, Recipe, RecipeBranch, StringKey, Weenie, WeenieType, WorldObject,
};
use tracing::{debug, error, info, warn};

use crate::crafter::Crafter;
use crate::dice::Dice;
use crate::error::CraftError;
use crate::mutation::add_spell_with_difficulty;
use crate::notify::{ChatChannel, Notifier};
use crate::services::{ItemFactory, WorldLookup, name_with_material};

/// Which participants the branch's destroy rolls hit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DestroyRolls {
    /// The target is destroyed.
    pub target: bool,
    /// The source is destroyed.
    pub source: bool,
}

/// Roll destroy-target, then destroy-source, against the branch chances.
pub fn roll_destruction(branch: &RecipeBranch, dice: &mut dyn Dice) -> DestroyRolls {
    let target = dice.unit() < branch.destroy_target_chance;
    let source = dice.unit() < branch.destroy_source_chance;
    DestroyRolls { target, source }
}

/// The weenie the branch creates, if any.
///
/// # Errors
///
/// [`CraftError::ResultWeenieMissing`] when the branch names a class the
/// world does not define.
pub fn result_weenie<'w>(
    recipe: &Recipe,
    success: bool,
    lookup: &'w dyn WorldLookup,
) -> Result<Option<&'w Weenie>, CraftError> {
    let class_id = recipe.branch(success).create_item;
    if class_id == 0 {
        return Ok(None);
    }
    match lookup.weenie(class_id) {
        Some(weenie) => Ok(Some(weenie)),
        None => {
            error!(recipe = recipe.id, class_id, success, "result weenie not found");
            Err(CraftError::ResultWeenieMissing {
                recipe_id: recipe.id,
                class_id,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Destruction
// ---------------------------------------------------------------------------

/// How a destroyed object left the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// Taken from the actor's pack; `remaining` items are left in the
    /// stack.
    Consumed {
        /// Items taken.
        amount: i32,
        /// Items left; zero when the whole stack went.
        remaining: i32,
    },
    /// Unequipped and consumed.
    Dequipped,
    /// Destroyed where it lay.
    Destroyed,
}

/// Destroy amount for a participant, as configured on the branch. Thrown
/// weapons and ammunition lose the whole stack on a tinkering branch.
pub fn destroy_amount(recipe: &Recipe, item: &WorldObject, configured: u32) -> i32 {
    let thrown = matches!(item.weenie_type, WeenieType::Missile | WeenieType::Ammunition);
    if recipe.is_tinkering() && thrown {
        return item.stack_size();
    }
    i32::try_from(configured).unwrap_or(i32::MAX)
}

/// Remove `amount` of `item`. Items in the actor's pack are consumed from
/// the stack, wielded items are unequipped and consumed, and anything else
/// is destroyed outright. `message` goes to the actor when non-empty.
pub fn destroy_item(
    actor: &Crafter,
    item: &mut WorldObject,
    amount: i32,
    message: &str,
    notifier: &mut dyn Notifier,
) -> Removal {
    let holder = actor.id();
    let removal = if item.is_contained_by(holder) {
        let stack = item.stack_size();
        let remaining = stack.saturating_sub(amount).max(0);
        if remaining > 0 {
            item.properties.set_int(IntKey::STACK_SIZE, remaining);
            notifier.object_updated(item);
        } else {
            item.placement = Placement::Destroyed;
        }
        Removal::Consumed {
            amount: stack.min(amount),
            remaining,
        }
    } else if item.is_wielded_by(holder) {
        item.placement = Placement::Destroyed;
        Removal::Dequipped
    } else {
        item.placement = Placement::Destroyed;
        Removal::Destroyed
    };

    debug!(item = %item.id, amount, ?removal, "item destroyed");
    if !message.is_empty() {
        notifier.send(holder, ChatChannel::Craft, message);
    }
    removal
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

/// Instantiate `amount` of `weenie` into the actor's pack.
pub fn create_result(
    actor: &Crafter,
    weenie: &Weenie,
    amount: u32,
    factory: &mut dyn ItemFactory,
) -> Option<WorldObject> {
    let Some(mut result) = factory.create(weenie) else {
        warn!(class_id = weenie.class_id, amount, "failed to create result");
        return None;
    };
    if amount > 1 {
        result
            .properties
            .set_int(IntKey::STACK_SIZE, i32::try_from(amount).unwrap_or(i32::MAX));
    }
    result.placement = Placement::Inventory { owner: actor.id() };
    info!(result = %result.id, class_id = weenie.class_id, amount, "result created");
    Some(result)
}

/// Move the spells listed on a destroyed target onto the new result.
/// Returns the number of spells granted.
pub fn transfer_spells(target: &WorldObject, result: &mut WorldObject) -> usize {
    let Some(list) = target.properties.get_string(StringKey::EXTRA_SPELLS_LIST) else {
        return 0;
    };
    list.split(',')
        .filter_map(|entry| entry.trim().parse::<u32>().ok())
        .filter(|spell| add_spell_with_difficulty(result, *spell))
        .count()
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Tell observers near the actor how a tinkering attempt went.
pub fn broadcast_tinkering(
    actor: &Crafter,
    tool: &WorldObject,
    target: &WorldObject,
    success: bool,
    lookup: &dyn WorldLookup,
    notifier: &mut dyn Notifier,
) {
    let tool_name = name_with_material(lookup, tool);
    let tool_name = strip_stack_suffix(&tool_name);
    let workmanship = tool.workmanship().unwrap_or(0.0);
    let target_name = name_with_material(lookup, target);
    let text = if success {
        format!(
            "{} successfully applies the {tool_name} (workmanship {workmanship:.2}) to the {target_name}.",
            actor.name()
        )
    } else {
        format!(
            "{} fails to apply the {tool_name} (workmanship {workmanship:.2}) to the {target_name}. The target is destroyed.",
            actor.name()
        )
    };
    notifier.send_nearby(actor.id(), ChatChannel::Craft, text);
}

/// "Steel Salvage (100)" becomes "Steel Salvage".
fn strip_stack_suffix(name: &str) -> &str {
    let Some(open) = name.rfind(" (") else {
        return name;
    };
    let tail = name.get(open.saturating_add(2)..).unwrap_or_default();
    match tail.strip_suffix(')') {
        Some(digits) if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => {
            name.get(..open).unwrap_or(name)
        }
        _ => name,
    }
}

/// Guid list rendered for logs.
pub fn guids(ids: &[EntityId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
