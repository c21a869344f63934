//! Damage calculation
//!
//! Handles the combat math: hit chance from the attack/defense gap, and
//! damage with a small random shave. Neither a hit nor a miss is ever
//! certain.

use rand::Rng;

use crate::config::CombatConfig;
use crate::ecs::CombatStats;

/// Raw result of one swing, before it touches anyone's health
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackRoll {
    Miss,
    Hit { damage: i32 },
}

/// Chance that `attacker` lands a blow on `defender`
pub fn hit_chance(attacker: &CombatStats, defender: &CombatStats, config: &CombatConfig) -> f64 {
    let (lo, hi) = config.hit_bounds();
    let gap = (attacker.attack - defender.defense) as f64;
    (config.base_hit_chance + config.hit_chance_per_point * gap).clamp(lo, hi)
}

/// Damage of a landed hit: attack minus defense minus a random shave,
/// never below the configured minimum
pub fn roll_damage(attacker: &CombatStats, defender: &CombatStats, config: &CombatConfig, rng: &mut impl Rng) -> i32 {
    let shave = rng.gen_range(0..=config.damage_variance.max(0));
    (attacker.attack - defender.defense - shave).max(config.min_damage.max(1))
}

/// Roll a full attack
pub fn roll_attack(
    attacker: &CombatStats,
    defender: &CombatStats,
    config: &CombatConfig,
    rng: &mut impl Rng,
) -> AttackRoll {
    if !rng.gen_bool(hit_chance(attacker, defender, config)) {
        return AttackRoll::Miss;
    }
    AttackRoll::Hit {
        damage: roll_damage(attacker, defender, config, rng),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_hit_chance_scales_with_gap() {
        let config = CombatConfig::default();
        let even = hit_chance(&CombatStats::new(3, 0), &CombatStats::new(0, 3), &config);
        assert!((even - 0.75).abs() < 1e-9);
        let strong = hit_chance(&CombatStats::new(6, 0), &CombatStats::new(0, 3), &config);
        assert!(strong > even);
    }

    #[test]
    fn test_hit_chance_never_certain() {
        let config = CombatConfig::default();
        let huge = hit_chance(&CombatStats::new(500, 0), &CombatStats::new(0, 0), &config);
        let tiny = hit_chance(&CombatStats::new(0, 0), &CombatStats::new(0, 500), &config);
        assert!(huge < 1.0);
        assert!(tiny > 0.0);
    }

    #[test]
    fn test_damage_floor() {
        let config = CombatConfig::default();
        let mut rng = crate::GameRng::seed_from_u64(1);
        for _ in 0..100 {
            let dmg = roll_damage(&CombatStats::new(1, 0), &CombatStats::new(0, 10), &config, &mut rng);
            assert_eq!(dmg, 1);
            let dmg = roll_damage(&CombatStats::new(10, 0), &CombatStats::new(0, 2), &config, &mut rng);
            assert!((6..=8).contains(&dmg));
        }
    }

    #[test]
    fn test_both_outcomes_happen() {
        let config = CombatConfig::default();
        let mut rng = crate::GameRng::seed_from_u64(2);
        let rolls: Vec<_> = (0..500)
            .map(|_| roll_attack(&CombatStats::new(30, 0), &CombatStats::new(0, 0), &config, &mut rng))
            .collect();
        assert!(rolls.contains(&AttackRoll::Miss));
        assert!(rolls.iter().any(|r| matches!(r, AttackRoll::Hit { .. })));
    }
}
