//! Simulation configuration with documented constants
//!
//! All tunable numbers are collected here with explanations of their purpose
//! and how they interact with each other. The config is constructed once and
//! passed down to the table; there is no global instance.

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, TableError};
use crate::core::types::{Bounds, Vec2};

/// Stack model tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    /// Maximum members a stack can hold
    ///
    /// Entities beyond this are ejected as independent singletons
    /// rather than joining.
    pub max_stack_size: usize,

    /// Display offset of the top member relative to the root
    ///
    /// Bottom and hidden middle members sit exactly on the root; only the
    /// top card is shifted so the count badge stays readable.
    pub top_offset: Vec2,

    /// How far to the side an overflow entity lands after a merge
    pub eject_distance: f32,

    /// Random jitter applied to ejected entities so they don't pile up
    /// exactly on top of each other and stay pickable
    pub eject_jitter: f32,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            max_stack_size: 99,
            top_offset: Vec2::new(0.0, 0.3),
            eject_distance: 1.5,
            eject_jitter: 0.25,
        }
    }
}

/// Drag/drop tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Radius around the release point probed for a foreign stack
    pub merge_probe_radius: f32,

    /// Distance each stack is pushed when two incompatible stacks collide
    pub bounce_distance: f32,

    /// Seconds for the bounce-apart animation
    pub bounce_duration: f32,

    /// Seconds for a rejected drop to animate back to its start
    pub return_duration: f32,

    /// How far sideways an unequipped item is ejected from its holder
    pub equip_eject_distance: f32,

    /// Ring spacing for the nearest-free-slot search
    pub free_slot_step: f32,

    /// Ring count before the free-slot search gives up and uses the start
    pub free_slot_rings: u32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            merge_probe_radius: 0.8,
            bounce_distance: 1.2,
            bounce_duration: 0.2,
            return_duration: 0.25,
            equip_eject_distance: 1.5,
            free_slot_step: 0.5,
            free_slot_rings: 12,
        }
    }
}

/// Per-agent tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentParams {
    /// How far an agent notices rivals and resources
    pub search_radius: f32,

    /// Distance at which a rival can be struck
    ///
    /// Must not exceed `search_radius`, otherwise an agent could attack
    /// something it can't see.
    pub attack_range: f32,

    /// Distance at which a chased resource is close enough to harvest
    pub stop_distance: f32,

    /// Length of one movement hop
    pub hop_distance: f32,

    /// Seconds a hop takes to play
    pub hop_duration: f32,

    /// Seconds of stillness between hops
    ///
    /// Movement is step-paced (hop, pause, hop) rather than continuous.
    pub hop_pause: f32,

    /// Seconds before the same agent may attack again
    pub attack_cooldown: f32,

    /// Seconds the strike animation locks the attacker out of re-entering
    /// an attack
    pub attack_lock_duration: f32,

    /// Maximum heading change per patrol step (radians)
    pub patrol_jitter: f32,

    /// Weight of the previous heading when picking the next patrol step
    ///
    /// At 1.0 the agent only jitters; at 0.0 every step is a fresh random
    /// direction.
    pub patrol_inertia: f32,

    /// Seconds a struck boundary is remembered
    pub boundary_memory_ttl: f32,

    /// Seconds between checks for a missing combat resolver
    pub resolver_retry_interval: f32,
}

impl Default for AgentParams {
    fn default() -> Self {
        Self {
            search_radius: 6.0,
            attack_range: 1.2,
            stop_distance: 1.0,
            hop_distance: 1.0,
            hop_duration: 0.25,
            hop_pause: 0.35,
            attack_cooldown: 1.0,
            attack_lock_duration: 0.4,
            patrol_jitter: 0.6,
            patrol_inertia: 0.8,
            boundary_memory_ttl: 2.0,
            resolver_retry_interval: 2.0,
        }
    }
}

/// Configuration for the whole table simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub stack: StackConfig,
    pub placement: PlacementConfig,
    pub agent: AgentParams,

    /// Permitted play area; `None` means an unbounded table
    pub play_area: Option<Bounds>,

    /// Seed for every random draw (patrol jitter, eject jitter)
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            stack: StackConfig::default(),
            placement: PlacementConfig::default(),
            agent: AgentParams::default(),
            play_area: None,
            seed: 0x5eed,
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from a TOML document and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.stack.max_stack_size < 2 {
            return Err(TableError::InvalidConfig(format!(
                "max_stack_size ({}) must allow at least 2 members",
                self.stack.max_stack_size
            )));
        }

        let agent = &self.agent;
        if agent.attack_range > agent.search_radius {
            return Err(TableError::InvalidConfig(format!(
                "attack_range ({}) should be <= search_radius ({})",
                agent.attack_range, agent.search_radius
            )));
        }

        if agent.hop_distance <= 0.0 || agent.hop_duration <= 0.0 {
            return Err(TableError::InvalidConfig(
                "hop_distance and hop_duration must be positive".into(),
            ));
        }

        if !(0.0..=1.0).contains(&agent.patrol_inertia) {
            return Err(TableError::InvalidConfig(format!(
                "patrol_inertia ({}) must be within 0..=1",
                agent.patrol_inertia
            )));
        }

        if self.placement.free_slot_step <= 0.0 {
            return Err(TableError::InvalidConfig("free_slot_step must be positive".into()));
        }

        if let Some(area) = self.play_area {
            if area.size().x <= 0.0 || area.size().y <= 0.0 {
                return Err(TableError::InvalidConfig("play_area must have positive size".into()));
            }
        }

        Ok(())
    }
}
