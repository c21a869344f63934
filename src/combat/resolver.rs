//! Attack resolution
//!
//! Applies a rolled attack to the defender's health. Any actor brought to
//! zero is removed from the registry. A monster's drops land on its tile;
//! the player drops nothing, and the caller ends the run.

use rand::Rng;

use super::damage::{roll_attack, AttackRoll};
use crate::config::CombatConfig;
use crate::ecs::{CombatStats, EntityId, EntityRegistry, Position, Role};
use crate::error::RegistryError;
use crate::items::{roll_drops, ItemIdGen};

/// One side of a fight: who, and with what effective stats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Combatant {
    pub id: EntityId,
    pub stats: CombatStats,
}

impl Combatant {
    pub fn new(id: EntityId, stats: CombatStats) -> Self {
        Self { id, stats }
    }
}

/// What an attack did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackOutcome {
    Miss,
    Hit { damage: i32, remaining: i32 },
    Kill {
        damage: i32,
        victim: Role,
        at: Position,
        xp: u32,
        drops: usize,
    },
}

impl AttackOutcome {
    pub fn is_kill(&self) -> bool {
        matches!(self, AttackOutcome::Kill { .. })
    }
}

/// Everything an attack may touch besides the two fighters
pub struct CombatContext<'a> {
    pub registry: &'a mut EntityRegistry,
    pub ids: &'a mut ItemIdGen,
    pub config: &'a CombatConfig,
    pub depth: u32,
}

/// Roll and apply one attack
pub fn resolve_attack(
    ctx: &mut CombatContext<'_>,
    attacker: Combatant,
    defender: Combatant,
    rng: &mut impl Rng,
) -> Result<AttackOutcome, RegistryError> {
    let roll = roll_attack(&attacker.stats, &defender.stats, ctx.config, rng);
    apply_attack(ctx, defender.id, roll, rng)
}

/// Apply an already rolled attack to `defender`
pub fn apply_attack(
    ctx: &mut CombatContext<'_>,
    defender: EntityId,
    roll: AttackRoll,
    rng: &mut impl Rng,
) -> Result<AttackOutcome, RegistryError> {
    let damage = match roll {
        AttackRoll::Miss => return Ok(AttackOutcome::Miss),
        AttackRoll::Hit { damage } => damage,
    };
    apply_damage(ctx, defender, damage, rng)
}

/// Take `damage` off an actor; kills are handled the same way whatever
/// dealt the damage (melee or scroll)
pub fn apply_damage(
    ctx: &mut CombatContext<'_>,
    defender: EntityId,
    damage: i32,
    rng: &mut impl Rng,
) -> Result<AttackOutcome, RegistryError> {
    let remaining = {
        let mut health = ctx
            .registry
            .health_mut(defender)
            .ok_or(RegistryError::UnknownEntity(defender))?;
        health.take_damage(damage);
        health.current
    };

    if remaining > 0 {
        return Ok(AttackOutcome::Hit { damage, remaining });
    }

    let victim = ctx.registry.role(defender).ok_or(RegistryError::UnknownEntity(defender))?;
    let xp = ctx.registry.xp_reward(defender).unwrap_or_default().0;

    let at = ctx.registry.despawn(defender)?;
    if victim == Role::Player {
        return Ok(AttackOutcome::Kill { damage, victim, at, xp: 0, drops: 0 });
    }

    let loot = roll_drops(victim, ctx.depth, ctx.ids, rng);
    let drops = loot.len();
    ctx.registry.drop_items(at, loot)?;

    Ok(AttackOutcome::Kill { damage, victim, at, xp, drops })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{ActorSpec, Health};
    use crate::entities::MonsterKind;
    use rand::SeedableRng;

    fn rat(hp: i32) -> ActorSpec {
        let mut spec = MonsterKind::Rat.actor_spec(&crate::progression::DepthScaling::new(1));
        spec.health = Health { current: hp, max: 6 };
        spec
    }

    #[test]
    fn test_kill_removes_defender() {
        let mut registry = EntityRegistry::new();
        let mut ids = ItemIdGen::new();
        let config = CombatConfig::default();
        let pos = Position::new(4, 4);
        let victim = registry.spawn_actor(rat(1), pos).unwrap();
        let mut rng = crate::GameRng::seed_from_u64(3);

        let mut ctx = CombatContext { registry: &mut registry, ids: &mut ids, config: &config, depth: 1 };
        let outcome = apply_attack(&mut ctx, victim, AttackRoll::Hit { damage: 1 }, &mut rng).unwrap();

        assert!(outcome.is_kill());
        assert!(!registry.contains(victim));
        assert!(registry.actor_at(pos).is_none());
        if let AttackOutcome::Kill { drops, .. } = outcome {
            assert_eq!(registry.pile_at(pos).is_some(), drops > 0);
        }
    }

    #[test]
    fn test_hit_clamps_health() {
        let mut registry = EntityRegistry::new();
        let mut ids = ItemIdGen::new();
        let config = CombatConfig::default();
        let victim = registry.spawn_actor(rat(6), Position::new(1, 1)).unwrap();
        let mut rng = crate::GameRng::seed_from_u64(3);

        let mut ctx = CombatContext { registry: &mut registry, ids: &mut ids, config: &config, depth: 1 };
        let outcome = apply_attack(&mut ctx, victim, AttackRoll::Hit { damage: 2 }, &mut rng).unwrap();
        assert_eq!(outcome, AttackOutcome::Hit { damage: 2, remaining: 4 });
        assert_eq!(apply_attack(&mut ctx, victim, AttackRoll::Miss, &mut rng).unwrap(), AttackOutcome::Miss);
        assert_eq!(registry.health(victim).unwrap().current, 4);
    }

    #[test]
    fn test_lethal_hit_removes_player() {
        let mut registry = EntityRegistry::new();
        let mut ids = ItemIdGen::new();
        let config = CombatConfig::default();
        let spec = crate::entities::player_spec(&crate::config::PlayerConfig::default());
        let pos = Position::new(2, 2);
        let player = registry.spawn_actor(spec, pos).unwrap();
        let mut rng = crate::GameRng::seed_from_u64(3);

        let mut ctx = CombatContext { registry: &mut registry, ids: &mut ids, config: &config, depth: 1 };
        let outcome = apply_damage(&mut ctx, player, 500, &mut rng).unwrap();
        assert_eq!(
            outcome,
            AttackOutcome::Kill { damage: 500, victim: Role::Player, at: pos, xp: 0, drops: 0 }
        );
        assert!(!registry.contains(player));
        assert!(!registry.is_occupied(pos));
        assert!(registry.is_empty());
    }
}
