//! Player entity creation

use crate::config::PlayerConfig;
use crate::ecs::{ActorSpec, CombatStats, EntityId, EntityRegistry, Health, Position, Role};
use crate::error::RegistryError;

/// Spawn spec for a fresh character
pub fn player_spec(config: &PlayerConfig) -> ActorSpec {
    ActorSpec {
        role: Role::Player,
        name: "you".to_string(),
        health: Health::new(config.max_hp),
        stats: CombatStats::new(config.attack, config.defense),
        initiative: config.speed,
        xp_reward: 0,
    }
}

/// Spawn the player entity
pub fn spawn_player(registry: &mut EntityRegistry, pos: Position, spec: ActorSpec) -> Result<EntityId, RegistryError> {
    registry.spawn_actor(spec, pos)
}
