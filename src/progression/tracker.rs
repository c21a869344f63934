//! Run progression
//!
//! Starting a run, entering a new depth, crediting kills, and the two
//! ways a run ends.

use rand::SeedableRng;

use super::xp::{ATTACK_PER_LEVEL, HP_PER_LEVEL};
use super::Experience;
use crate::combat::AttackOutcome;
use crate::config::GameConfig;
use crate::ecs::{ActorSpec, EntityRegistry, Role};
use crate::entities::{player_spec, populate_level};
use crate::error::{ActionError, GameError, RegistryError};
use crate::game::{GameState, MessageCategory, Outcome, RunStats};
use crate::items::{Equipment, Inventory, ItemIdGen};
use crate::world::generation::level_seed;
use crate::world::{generate, Visibility};
use crate::{GameRng, MAX_DEPTH};

/// RNG for everything that happens on one level after generation
fn level_rng(seed: u64, depth: u32) -> GameRng {
    GameRng::seed_from_u64(level_seed(seed, depth).rotate_left(29) ^ 0xD1B5_4A32_D192_ED03)
}

impl GameState {
    /// Start a fresh run at depth 1
    pub fn new_run(seed: u64, config: GameConfig) -> Result<Self, GameError> {
        config
            .validate()
            .map_err(|e| GameError::InvalidConfig(e.to_string()))?;
        log::info!("Starting new run with seed {}", seed);
        let map = generate(seed, 1, &config.map)?;
        let mut rng = level_rng(seed, 1);
        let mut item_ids = ItemIdGen::new();
        let mut registry = EntityRegistry::new();
        let population = populate_level(
            &mut registry,
            &map,
            player_spec(&config.player),
            &mut item_ids,
            &mut rng,
        )?;

        let mut visibility = Visibility::new(&map);
        visibility.update(&map, map.stairs_up, config.visibility.fov_radius);

        let mut state = Self {
            config,
            seed,
            depth: 1,
            map,
            visibility,
            registry,
            player: population.player,
            inventory: Inventory::new(),
            equipment: Equipment::new(),
            experience: Experience::new(),
            stats: RunStats { max_depth: 1, ..RunStats::default() },
            outcome: Outcome::Ongoing,
            rounds: 0,
            rng,
            item_ids,
            messages: Vec::new(),
            remains: None,
        };
        state.add_message(
            "You enter the dungeon. Somewhere below, a dragon stirs.",
            MessageCategory::System,
        );
        Ok(state)
    }

    /// Take the stairs down. The player keeps hit points, stats and
    /// belongings; everything else on the level is discarded.
    pub fn descend(&mut self) -> Result<u32, ActionError> {
        if self.is_over() {
            return Err(ActionError::RunOver);
        }
        let pos = self.player_position().ok_or(RegistryError::UnknownEntity(self.player))?;
        if self.map.stairs_down != Some(pos) {
            return Err(ActionError::NotOnStairs);
        }
        if self.depth >= MAX_DEPTH {
            return Err(GameError::BottomReached(self.depth).into());
        }

        let spec = self.player_carry_over()?;
        self.enter_depth(self.depth + 1, spec)?;
        Ok(self.depth)
    }

    fn player_carry_over(&self) -> Result<ActorSpec, RegistryError> {
        let unknown = RegistryError::UnknownEntity(self.player);
        Ok(ActorSpec {
            role: Role::Player,
            name: self.registry.name(self.player).ok_or_else(|| unknown.clone())?,
            health: self.registry.health(self.player).ok_or_else(|| unknown.clone())?,
            stats: self.registry.stats(self.player).ok_or_else(|| unknown.clone())?,
            initiative: self.registry.initiative(self.player).ok_or(unknown)?.0,
            xp_reward: 0,
        })
    }

    /// Build the next level in full, then swap it in. Nothing changes if
    /// generation fails.
    fn enter_depth(&mut self, depth: u32, player: ActorSpec) -> Result<(), GameError> {
        let map = generate(self.seed, depth, &self.config.map)?;
        let mut rng = level_rng(self.seed, depth);
        let mut item_ids = self.item_ids.clone();
        let mut registry = EntityRegistry::starting_at(self.registry.next_id());
        let population = populate_level(&mut registry, &map, player, &mut item_ids, &mut rng)?;

        let mut visibility = Visibility::new(&map);
        visibility.update(&map, map.stairs_up, self.config.visibility.fov_radius);

        self.map = map;
        self.registry = registry;
        self.visibility = visibility;
        self.player = population.player;
        self.rng = rng;
        self.item_ids = item_ids;
        self.depth = depth;
        self.stats.max_depth = self.stats.max_depth.max(depth);

        log::info!("Descended to depth {}", depth);
        if depth >= MAX_DEPTH {
            self.add_message(
                format!("You descend to depth {}. The air is hot and smells of smoke.", depth),
                MessageCategory::Warning,
            );
        } else {
            self.add_message(format!("You descend to depth {}.", depth), MessageCategory::System);
        }
        Ok(())
    }

    /// Credit the player for a kill: tally, XP, level-ups, and the win
    pub(crate) fn credit_kill(&mut self, name: &str, outcome: AttackOutcome) {
        let AttackOutcome::Kill { victim, xp, drops, .. } = outcome else {
            return;
        };
        self.stats.kills += 1;
        self.add_message(format!("You slay the {}! (+{} XP)", name, xp), MessageCategory::Combat);
        if drops > 0 {
            self.add_message(format!("The {} drops something.", name), MessageCategory::Item);
        }

        let levels = self.experience.gain(xp);
        for _ in 0..levels {
            if let Some(mut health) = self.registry.health_mut(self.player) {
                health.raise_max(HP_PER_LEVEL);
                health.heal_full();
            }
            if let Some(mut stats) = self.registry.stats_mut(self.player) {
                stats.attack += ATTACK_PER_LEVEL;
            }
        }
        if levels > 0 {
            let level = self.experience.level;
            self.add_message(format!("Level up! You are now level {}!", level), MessageCategory::System);
        }

        if victim.is_boss() && self.depth >= MAX_DEPTH {
            self.outcome = Outcome::Won;
            log::info!(
                "Run won on round {} (seed {}, score {})",
                self.rounds,
                self.seed,
                self.score()
            );
            self.add_message("The dragon is dead. You have conquered the dungeon!", MessageCategory::System);
        }
    }

    /// The player's hit points reached zero
    pub(crate) fn player_died(&mut self, killer: &str) {
        self.outcome = Outcome::Lost;
        log::info!(
            "Run lost at depth {} to a {} (seed {}, score {})",
            self.depth,
            killer,
            self.seed,
            self.score()
        );
        self.add_message(format!("You were slain by the {}.", killer), MessageCategory::Warning);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{Health, Position};
    use crate::world::TileType;

    fn new_state() -> GameState {
        GameState::new_run(42, GameConfig::default()).unwrap()
    }

    fn stand_on_stairs(state: &mut GameState) {
        let stairs = state.map.stairs_down.unwrap();
        // Clear the way: anything on the stairs is removed first
        if let Some(id) = state.registry.entity_at(stairs) {
            if id != state.player {
                state.registry.despawn(id).unwrap();
            }
        }
        state.registry.move_to(state.player, stairs).unwrap();
    }

    #[test]
    fn test_new_run_starts_on_depth_one() {
        let state = new_state();
        assert_eq!(state.depth(), 1);
        assert_eq!(state.outcome(), Outcome::Ongoing);
        assert_eq!(state.player_position(), Some(state.map().stairs_up));
        assert!(state.visibility().is_visible(state.map().stairs_up));
    }

    #[test]
    fn test_new_run_rejects_bad_config() {
        let mut config = GameConfig::default();
        config.map.room_width = 9..=5;
        assert!(matches!(
            GameState::new_run(42, config),
            Err(GameError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_descend_requires_stairs() {
        let mut state = new_state();
        assert_eq!(state.descend(), Err(ActionError::NotOnStairs));
        assert_eq!(state.depth(), 1);
    }

    #[test]
    fn test_descend_keeps_player_state() {
        let mut state = new_state();
        state.registry.health_mut(state.player).unwrap().take_damage(7);
        stand_on_stairs(&mut state);

        assert_eq!(state.descend(), Ok(2));
        assert_eq!(state.depth(), 2);
        assert_eq!(state.map().depth, 2);
        assert_eq!(state.player_health().unwrap().current, 23);
        assert_eq!(state.player_position(), Some(state.map().stairs_up));
        assert_eq!(state.map().tile(state.map().stairs_up), Some(TileType::StairsUp));
        assert_eq!(state.run_stats().max_depth, 2);
    }

    #[test]
    fn test_level_up_on_kill() {
        let mut state = new_state();
        let outcome = AttackOutcome::Kill {
            damage: 3,
            victim: Role::Monster(crate::entities::MonsterKind::Orc),
            at: Position::new(0, 0),
            xp: 25,
            drops: 0,
        };
        state.credit_kill("orc", outcome);
        assert_eq!(state.experience().level, 2);
        assert_eq!(state.player_health(), Some(Health { current: 38, max: 38 }));
        assert_eq!(state.run_stats().kills, 1);
        assert_eq!(state.outcome(), Outcome::Ongoing);
    }

    #[test]
    fn test_dragon_kill_above_bottom_does_not_win() {
        let mut state = new_state();
        let outcome = AttackOutcome::Kill {
            damage: 3,
            victim: Role::Monster(crate::entities::MonsterKind::Dragon),
            at: Position::new(0, 0),
            xp: 100,
            drops: 0,
        };
        state.credit_kill("dragon", outcome);
        assert_eq!(state.outcome(), Outcome::Ongoing);
    }

    fn jump_to(state: &mut GameState, depth: u32) {
        let spec = state.player_carry_over().unwrap();
        state.enter_depth(depth, spec).unwrap();
    }

    #[test]
    fn test_descend_to_bottom_stays_ongoing() {
        let mut state = new_state();
        jump_to(&mut state, 7);
        stand_on_stairs(&mut state);

        assert_eq!(state.descend(), Ok(8));
        assert_eq!(state.outcome(), Outcome::Ongoing);
        assert!(state.map().stairs_down.is_none());
        assert!(state.registry().boss().is_some());
        assert_eq!(state.run_stats().max_depth, 8);
    }

    #[test]
    fn test_bottom_has_no_way_down() {
        let mut state = new_state();
        jump_to(&mut state, MAX_DEPTH);
        assert_eq!(state.descend(), Err(ActionError::NotOnStairs));
        assert_eq!(state.depth(), MAX_DEPTH);
    }

    #[test]
    fn test_slaying_the_boss_wins() {
        let mut state = new_state();
        jump_to(&mut state, MAX_DEPTH);
        let boss = state.registry().boss().unwrap();
        {
            let mut health = state.registry.health_mut(boss).unwrap();
            let current = health.current;
            health.take_damage(current - 1);
        }

        let mut outcome = AttackOutcome::Miss;
        for _ in 0..200 {
            outcome = state.player_attack(boss).unwrap();
            if outcome.is_kill() {
                break;
            }
        }
        assert!(outcome.is_kill());
        assert!(!state.registry().contains(boss));
        assert_eq!(state.outcome(), Outcome::Won);
    }

    #[test]
    fn test_player_death_loses() {
        let mut state = new_state();
        let monster = state.registry().monsters_in_turn_order()[0];
        {
            let mut health = state.registry.health_mut(state.player).unwrap();
            let current = health.current;
            health.take_damage(current - 1);
        }

        for _ in 0..200 {
            if state.monster_attack(monster).unwrap().is_kill() {
                break;
            }
        }
        assert_eq!(state.outcome(), Outcome::Lost);
        assert!(!state.registry().contains(state.player()));
        let remains = state.remains().unwrap();
        assert_eq!(remains.health, Health { current: 0, max: 30 });
        assert_eq!(state.player_health().unwrap().current, 0);
        assert!(state.registry().entity_at(remains.position).is_none());
        assert_eq!(state.descend(), Err(ActionError::RunOver));
    }
}
