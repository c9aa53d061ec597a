//! Serializable summary of a session, for the headless runner and debugging

use serde::Serialize;

use crate::agent::AgentState;
use crate::core::types::{EntityId, SimTime, Vec2};
use crate::simulation::session::Session;
use crate::stack::members_including_self;
use crate::zone::ZoneCategory;

#[derive(Debug, Clone, Serialize)]
pub struct StackSnapshot {
    pub root: EntityId,
    pub key: String,
    pub position: Vec2,
    pub members: usize,
    pub zone: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ZoneSnapshot {
    pub name: String,
    pub category: ZoneCategory,
    pub occupants: usize,
    pub craft_available: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentSnapshot {
    pub entity: EntityId,
    pub state: AgentState,
    pub target: Option<EntityId>,
    pub hp: Option<f32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub time: SimTime,
    pub stacks: Vec<StackSnapshot>,
    pub zones: Vec<ZoneSnapshot>,
    pub agents: Vec<AgentSnapshot>,
}

impl SessionSnapshot {
    pub fn capture(session: &Session) -> Self {
        use crate::combat::capability::Combatant;

        let table = &session.table;
        let zone_name = |id| table.zones.get(id).map(|z| z.name.clone());

        let stacks = table
            .world
            .roots()
            .map(|e| StackSnapshot {
                root: e.id,
                key: e.definition.key.clone(),
                position: e.position,
                members: members_including_self(&table.world, e.id).len(),
                zone: e.current_zone.and_then(zone_name),
            })
            .collect();

        let recipes = table.zones.recipes();
        let zones = table
            .zones
            .iter()
            .map(|z| ZoneSnapshot {
                name: z.name.clone(),
                category: z.category(),
                occupants: z.occupants(&table.world).len(),
                craft_available: z
                    .crafting_state()
                    .and_then(|s| s.available())
                    .and_then(|i| recipes.get(i))
                    .map(|r| r.name.clone()),
            })
            .collect();

        let agents = session
            .agents
            .iter()
            .map(|a| AgentSnapshot {
                entity: a.entity,
                state: a.state,
                target: a.target,
                hp: table
                    .entity(a.entity)
                    .and_then(|e| e.combat.as_ref())
                    .map(|c| c.hp()),
            })
            .collect();

        Self {
            time: table.now,
            stacks,
            zones,
            agents,
        }
    }

    pub fn to_json(&self) -> crate::core::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
