//! Combining two partial salvage bags of the same material.
//!
//! Units move from the source bag into the target until the target is
//! complete. Value and workmanship follow the units proportionally. A
//! source with units left over is renamed for its new count; an emptied
//! source is consumed.

use artisan_types::{IntKey, Placement, StringKey, WorldObject};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::info;

use crate::config::CraftingConfig;
use crate::context::ModifiedSet;
use crate::notify::Notifier;

/// What a combine moved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CombineReport {
    /// Units moved into the target.
    pub moved: i32,
    /// Units left in the source.
    pub remaining: i32,
    /// Value moved into the target, before the cap.
    pub value_moved: i32,
}

/// `whole * part / total`, rounded half to even.
fn share(whole: i32, part: i32, total: i32) -> i32 {
    if total <= 0 {
        return 0;
    }
    Decimal::from(whole)
        .checked_mul(Decimal::from(part))
        .and_then(|scaled| scaled.checked_div(Decimal::from(total)))
        .map(|exact| exact.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven))
        .and_then(|rounded| rounded.to_i32())
        .unwrap_or(0)
}

fn int(object: &WorldObject, key: IntKey) -> i32 {
    object.properties.get_int(key).unwrap_or(0)
}

/// Move units from `source` into `target`.
pub fn combine_salvage(
    config: &CraftingConfig,
    source: &mut WorldObject,
    target: &mut WorldObject,
    notifier: &mut dyn Notifier,
) -> (CombineReport, ModifiedSet) {
    let amount = int(source, IntKey::STRUCTURE);
    let room = config
        .salvage_complete_structure
        .saturating_sub(int(target, IntKey::STRUCTURE))
        .max(0);
    let moved = amount.min(room).max(0);
    let remaining = amount.saturating_sub(moved);

    let value_moved = share(int(source, IntKey::VALUE), moved, amount);
    let target_value = int(target, IntKey::VALUE)
        .saturating_add(value_moved)
        .min(config.max_salvage_value);

    let source_items = source
        .properties
        .get_int(IntKey::NUM_ITEMS_IN_MATERIAL)
        .unwrap_or(1);
    let source_work = int(source, IntKey::ITEM_WORKMANSHIP);
    let items_moved = share(source_items, moved, amount);
    let work_moved = if items_moved == source_items {
        source_work
    } else {
        share(source_work, items_moved, source_items)
    };

    let target_items = target
        .properties
        .get_int(IntKey::NUM_ITEMS_IN_MATERIAL)
        .unwrap_or(1);
    let target_structure = int(target, IntKey::STRUCTURE).saturating_add(moved);
    let target_work = int(target, IntKey::ITEM_WORKMANSHIP).saturating_add(work_moved);
    let props = &mut target.properties;
    props.set_int(IntKey::STRUCTURE, target_structure);
    props.set_int(IntKey::VALUE, target_value);
    props.set_int(IntKey::NUM_ITEMS_IN_MATERIAL, target_items.saturating_add(items_moved));
    props.set_int(IntKey::ITEM_WORKMANSHIP, target_work);
    notifier.object_updated(target);

    let mut modified = ModifiedSet::new();
    modified.insert(target.id);
    modified.insert(source.id);

    if remaining > 0 {
        let source_value = int(source, IntKey::VALUE).saturating_sub(value_moved);
        let props = &mut source.properties;
        props.set_int(IntKey::STRUCTURE, remaining);
        props.set_int(IntKey::VALUE, source_value);
        props.set_int(IntKey::NUM_ITEMS_IN_MATERIAL, source_items.saturating_sub(items_moved));
        props.set_int(IntKey::ITEM_WORKMANSHIP, source_work.saturating_sub(work_moved));
        props.set_string(StringKey::NAME, format!("Salvage ({remaining})"));
        notifier.object_updated(source);
    } else {
        source.placement = Placement::Destroyed;
    }

    info!(
        source = %source.id,
        target = %target.id,
        moved,
        remaining,
        value_moved,
        "salvage combined"
    );
    let report = CombineReport {
        moved,
        remaining,
        value_moved,
    };
    (report, modified)
}

#[cfg(test)]
mod tests {
    use artisan_types::{EntityId, ItemType, MaterialType, WeenieType};

    use super::*;
    use crate::notify::NoticeLog;

    fn bag(id: u32, structure: i32, value: i32, items: i32, workmanship: i32) -> WorldObject {
        let mut bag = WorldObject::new(
            EntityId(id),
            20_983,
            ItemType::TinkeringMaterial,
            WeenieType::Salvage,
            &format!("Salvage ({structure})"),
        );
        bag.placement = Placement::Inventory { owner: EntityId(1) };
        bag.properties
            .set_int(IntKey::MATERIAL_TYPE, MaterialType::Iron.id());
        bag.properties.set_int(IntKey::STRUCTURE, structure);
        bag.properties.set_int(IntKey::VALUE, value);
        bag.properties.set_int(IntKey::NUM_ITEMS_IN_MATERIAL, items);
        bag.properties.set_int(IntKey::ITEM_WORKMANSHIP, workmanship);
        bag
    }

    #[test]
    fn share_rounds_half_to_even() {
        assert_eq!(share(5, 1, 2), 2);
        assert_eq!(share(7, 1, 2), 4);
        assert_eq!(share(10, 0, 0), 0);
    }

    #[test]
    fn whole_source_fits() {
        let config = CraftingConfig::default();
        let mut log = NoticeLog::new();
        let mut source = bag(2, 30, 300, 3, 24);
        let mut target = bag(3, 50, 500, 5, 30);
        let (report, modified) = combine_salvage(&config, &mut source, &mut target, &mut log);

        assert_eq!(report.moved, 30);
        assert_eq!(report.remaining, 0);
        assert!(source.is_destroyed());
        assert!(modified.contains(source.id));
        assert_eq!(target.properties.get_int(IntKey::STRUCTURE), Some(80));
        assert_eq!(target.properties.get_int(IntKey::VALUE), Some(800));
        assert_eq!(target.properties.get_int(IntKey::NUM_ITEMS_IN_MATERIAL), Some(8));
        assert_eq!(target.properties.get_int(IntKey::ITEM_WORKMANSHIP), Some(54));
    }

    #[test]
    fn overflow_stays_in_source() {
        let config = CraftingConfig::default();
        let mut log = NoticeLog::new();
        let mut source = bag(2, 60, 600, 6, 48);
        let mut target = bag(3, 80, 800, 8, 64);
        let (report, _) = combine_salvage(&config, &mut source, &mut target, &mut log);

        assert_eq!(report.moved, 20);
        assert_eq!(report.remaining, 40);
        assert_eq!(report.value_moved, 200);
        assert!(!source.is_destroyed());
        assert_eq!(source.name(), "Salvage (40)");
        assert_eq!(source.properties.get_int(IntKey::VALUE), Some(400));
        assert_eq!(source.properties.get_int(IntKey::NUM_ITEMS_IN_MATERIAL), Some(4));
        assert_eq!(source.properties.get_int(IntKey::ITEM_WORKMANSHIP), Some(32));
        assert_eq!(target.properties.get_int(IntKey::STRUCTURE), Some(100));
        assert_eq!(target.properties.get_int(IntKey::ITEM_WORKMANSHIP), Some(80));
    }

    #[test]
    fn target_value_is_capped() {
        let config = CraftingConfig::default();
        let mut log = NoticeLog::new();
        let mut source = bag(2, 10, 50_000, 1, 8);
        let mut target = bag(3, 10, 50_000, 1, 8);
        combine_salvage(&config, &mut source, &mut target, &mut log);
        assert_eq!(
            target.properties.get_int(IntKey::VALUE),
            Some(config.max_salvage_value)
        );
    }
}
