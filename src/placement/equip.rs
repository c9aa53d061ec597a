//! Equip-and-consume
//!
//! Dropping a lone piece of equipment on a holder (or a holder on it) puts
//! the item on the holder and destroys the item entity. Whatever the holder
//! wore before comes back as a free-standing entity next to it.

use crate::core::error::{Result, TableError};
use crate::core::types::{EntityId, Vec2};
use crate::entity::definition::Tag;
use crate::simulation::events::TableEventKind;
use crate::simulation::table::Table;
use crate::spatial::find_free_slot;
use crate::stack::stack_len;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EquipOutcome {
    pub holder: EntityId,
    /// Previously worn item, re-spawned beside the holder
    pub replaced: Option<EntityId>,
}

/// Sort two dropped-together entities into `(item, holder)` if one can wear
/// the other
pub fn equip_roles(table: &Table, a: EntityId, b: EntityId) -> Option<(EntityId, EntityId)> {
    let (ea, eb) = (table.world.get(a)?, table.world.get(b)?);
    if ea.has_tag(Tag::Equipment) && eb.has_tag(Tag::EquipHolder) {
        Some((a, b))
    } else if eb.has_tag(Tag::Equipment) && ea.has_tag(Tag::EquipHolder) {
        Some((b, a))
    } else {
        None
    }
}

pub fn equip(table: &mut Table, item: EntityId, holder: EntityId) -> Result<EquipOutcome> {
    let item_entity = table.world.get(item).ok_or(TableError::EntityNotFound(item))?;
    let holder_entity = table
        .world
        .get(holder)
        .ok_or(TableError::EntityNotFound(holder))?;
    if !item_entity.has_tag(Tag::Equipment) || !holder_entity.has_tag(Tag::EquipHolder) {
        return Err(TableError::NotEquippable(item, holder));
    }
    if stack_len(&table.world, item) > 1 {
        return Err(TableError::EquipStacked(item));
    }

    let definition = item_entity.definition.clone();
    let holder_position = holder_entity.position;

    let previous = table.world.get_mut(holder).and_then(|h| {
        let previous = h.equipped.replace(definition.clone());
        if let Some(combat) = h.combat.as_mut() {
            combat.bonus_attack = definition.stats.attack;
        }
        previous
    });

    table.destroy(item);

    let replaced = previous.map(|old| {
        let placement = &table.config.placement;
        let start = holder_position + Vec2::new(placement.equip_eject_distance, 0.0);
        let area = table.play_area();
        let slot = find_free_slot(
            &table.world,
            start,
            old.size,
            area.as_ref(),
            placement.free_slot_step,
            placement.free_slot_rings,
            &[],
        );
        let id = table.spawn(old, slot);
        table.settle(id);
        id
    });

    tracing::debug!(
        holder = %holder,
        item = %definition.key,
        replaced = replaced.is_some(),
        "equipped item"
    );
    table.log(TableEventKind::Equipped {
        holder,
        item: definition.key.clone(),
        replaced,
    });

    Ok(EquipOutcome { holder, replaced })
}
