//! Zone registry
//!
//! Zones register on activation and deregister on deactivation; iteration
//! is in registration order. Overlapping zones of the same category are a
//! configuration error and are refused at registration, and so are a
//! crafting bench and a lane sharing ground. Only a generic zone may
//! overlap another, and rule-bearing zones take precedence over it.

use std::sync::Arc;

use crate::core::error::{Result, TableError};
use crate::core::suspend::Suspendable;
use crate::core::types::ZoneId;
use crate::world::World;
use crate::zone::crafting::RecipeBook;
use crate::zone::region::Zone;

/// Something a zone refresh wants the session to know
#[derive(Debug, Clone, PartialEq)]
pub enum ZoneNotice {
    CraftAvailable { zone: ZoneId, recipe: Option<String> },
}

#[derive(Debug, Clone, Default)]
pub struct ZoneRegistry {
    zones: Vec<Zone>,
    recipes: Arc<RecipeBook>,
}

impl ZoneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_recipes(&mut self, recipes: RecipeBook) {
        self.recipes = Arc::new(recipes);
    }

    pub fn recipes(&self) -> &RecipeBook {
        &self.recipes
    }

    pub fn register(&mut self, zone: Zone) -> Result<ZoneId> {
        if let Some(existing) = self
            .zones
            .iter()
            .find(|z| z.category().conflicts_with(zone.category()) && z.area.intersects(&zone.area))
        {
            return Err(TableError::ZoneOverlap {
                new: zone.name,
                existing: existing.name.clone(),
            });
        }
        let id = zone.id;
        tracing::debug!(zone = %zone.name, category = ?zone.category(), "zone registered");
        self.zones.push(zone);
        Ok(id)
    }

    pub fn deregister(&mut self, id: ZoneId) -> Option<Zone> {
        let index = self.zones.iter().position(|z| z.id == id)?;
        Some(self.zones.remove(index))
    }

    pub fn get(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.iter().find(|z| z.id == id)
    }

    pub fn get_mut(&mut self, id: ZoneId) -> Option<&mut Zone> {
        self.zones.iter_mut().find(|z| z.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Zone> + '_ {
        self.zones.iter()
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Let a zone re-evaluate its local eligibility after its contents moved
    pub fn refresh(&mut self, id: ZoneId, world: &World) -> Option<ZoneNotice> {
        let recipes = Arc::clone(&self.recipes);
        let zone = self.zones.iter_mut().find(|z| z.id == id)?;
        let contents = zone.contents(world);
        let state = zone.crafting_state_mut()?;
        if !state.refresh(&recipes, &contents) {
            return None;
        }
        let recipe = state
            .available()
            .and_then(|i| recipes.get(i))
            .map(|r| r.name.clone());
        Some(ZoneNotice::CraftAvailable { zone: id, recipe })
    }

    /// Crafting zones with a live countdown advance by `dt`; returns
    /// `(zone, recipe index)` for every craft that finished
    pub fn advance_crafts(&mut self, dt: f32) -> Vec<(ZoneId, usize)> {
        self.zones
            .iter_mut()
            .filter_map(|zone| {
                let id = zone.id;
                zone.crafting_state_mut()?.advance(dt).map(|recipe| (id, recipe))
            })
            .collect()
    }

    /// Every suspendable piece of zone state
    pub fn suspendables_mut(&mut self) -> impl Iterator<Item = &mut dyn Suspendable> + '_ {
        self.zones
            .iter_mut()
            .filter_map(|z| z.crafting_state_mut())
            .map(|s| s as &mut dyn Suspendable)
    }

    /// Deregister every zone along with its crafting state; the recipe book
    /// outlives a run like the definition catalog does
    pub fn reset_state(&mut self) {
        self.zones.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Bounds, Vec2};

    fn rect(x: f32, y: f32, w: f32, h: f32) -> Bounds {
        Bounds::new(Vec2::new(x, y), Vec2::new(x + w, y + h))
    }

    #[test]
    fn test_same_category_overlap_rejected() {
        let mut zones = ZoneRegistry::new();
        zones.register(Zone::crafting("a", rect(0.0, 0.0, 4.0, 4.0))).unwrap();
        let err = zones.register(Zone::crafting("b", rect(2.0, 2.0, 4.0, 4.0)));
        assert!(matches!(err, Err(TableError::ZoneOverlap { .. })));
        assert_eq!(zones.len(), 1);
    }

    #[test]
    fn test_different_category_overlap_allowed() {
        let mut zones = ZoneRegistry::new();
        zones.register(Zone::crafting("bench", rect(0.0, 0.0, 4.0, 4.0))).unwrap();
        assert!(zones.register(Zone::generic("rug", rect(1.0, 1.0, 4.0, 4.0))).is_ok());
    }

    #[test]
    fn test_bench_and_lane_may_not_share_ground() {
        let mut zones = ZoneRegistry::new();
        zones.register(Zone::crafting("bench", rect(0.0, 0.0, 4.0, 4.0))).unwrap();
        let err = zones.register(Zone::lane("road", rect(3.0, 0.0, 6.0, 2.0), 2));
        assert!(matches!(err, Err(TableError::ZoneOverlap { .. })));
    }

    #[test]
    fn test_deregister_preserves_order() {
        let mut zones = ZoneRegistry::new();
        let a = zones.register(Zone::generic("a", rect(0.0, 0.0, 1.0, 1.0))).unwrap();
        let b = zones.register(Zone::generic("b", rect(2.0, 0.0, 1.0, 1.0))).unwrap();
        let c = zones.register(Zone::generic("c", rect(4.0, 0.0, 1.0, 1.0))).unwrap();
        zones.deregister(b).unwrap();
        let order: Vec<_> = zones.iter().map(|z| z.id).collect();
        assert_eq!(order, vec![a, c]);
    }
}
