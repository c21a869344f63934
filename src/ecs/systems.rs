//! ECS Systems
//!
//! Monster decision making. Monsters never run full field of view; they
//! check range and a single line of sight to the player.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::VisibilityConfig;
use crate::ecs::{AIState, Direction, EntityId, EntityRegistry, Position};
use crate::world::{fov::has_line_of_sight, LevelMap, TileType};

/// What a monster wants to do this turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonsterAction {
    Attack { target: EntityId },
    Move { to: Position },
    OpenDoor { at: Position },
    Idle,
}

/// Decide one monster's action against the player
pub fn decide_monster_action(
    registry: &EntityRegistry,
    map: &LevelMap,
    monster: EntityId,
    player: EntityId,
    config: &VisibilityConfig,
    rng: &mut impl Rng,
) -> (MonsterAction, AIState) {
    let (Some(monster_pos), Some(player_pos)) = (registry.position(monster), registry.position(player)) else {
        return (MonsterAction::Idle, AIState::Idle);
    };

    if monster_pos.is_adjacent(&player_pos) && !map.cuts_corner(monster_pos, player_pos) {
        return (MonsterAction::Attack { target: player }, AIState::Attack);
    }

    let distance = monster_pos.chebyshev_distance(&player_pos);
    if distance <= config.perception_range && has_line_of_sight(map, monster_pos, player_pos) {
        let action = chase_step(monster_pos, player_pos, map, registry).unwrap_or(MonsterAction::Idle);
        return (action, AIState::Chase);
    }

    if rng.gen_bool(config.wander_chance.clamp(0.0, 1.0)) {
        if let Some(action) = wander_step(monster_pos, map, registry, rng) {
            return (action, AIState::Wander);
        }
    }

    (MonsterAction::Idle, AIState::Idle)
}

/// Calculate the best move for chasing the player
fn chase_step(
    from: Position,
    target: Position,
    map: &LevelMap,
    registry: &EntityRegistry,
) -> Option<MonsterAction> {
    let dx = (target.x - from.x).signum();
    let dy = (target.y - from.y).signum();

    // Straight at the target first, then the two steps either side of it
    let candidates = if dx != 0 && dy != 0 {
        [
            Position::new(from.x + dx, from.y + dy),
            Position::new(from.x + dx, from.y),
            Position::new(from.x, from.y + dy),
        ]
    } else if dx != 0 {
        [
            Position::new(from.x + dx, from.y),
            Position::new(from.x + dx, from.y - 1),
            Position::new(from.x + dx, from.y + 1),
        ]
    } else if dy != 0 {
        [
            Position::new(from.x, from.y + dy),
            Position::new(from.x - 1, from.y + dy),
            Position::new(from.x + 1, from.y + dy),
        ]
    } else {
        return None;
    };

    candidates
        .into_iter()
        .find_map(|pos| step_action(pos, map, registry))
}

fn wander_step(
    from: Position,
    map: &LevelMap,
    registry: &EntityRegistry,
    rng: &mut impl Rng,
) -> Option<MonsterAction> {
    let dir = *Direction::ALL.choose(rng)?;
    let to = from.offset(dir);
    // Wandering monsters leave doors alone
    if map.tile(to) == Some(TileType::DoorClosed) {
        return None;
    }
    step_action(to, map, registry)
}

/// Action for stepping onto `pos`, if that is possible at all
fn step_action(pos: Position, map: &LevelMap, registry: &EntityRegistry) -> Option<MonsterAction> {
    if registry.is_occupied(pos) {
        return None;
    }
    match map.tile(pos)? {
        TileType::DoorClosed => Some(MonsterAction::OpenDoor { at: pos }),
        tile if tile.is_walkable() => Some(MonsterAction::Move { to: pos }),
        _ => None,
    }
}
