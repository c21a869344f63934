//! Game state
//!
//! The single value that holds a run: the active level, its entities, the
//! player's belongings and the outcome. Only the turn scheduler and the
//! progression tracker mutate it.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::combat::{apply_damage, resolve_attack, AttackOutcome, CombatContext, Combatant};
use crate::config::GameConfig;
use crate::ecs::{CombatStats, EntityId, EntityRegistry, Health, Position};
use crate::error::RegistryError;
use crate::items::{Equipment, Inventory, ItemIdGen};
use crate::progression::Experience;
use crate::world::{LevelMap, Visibility};
use crate::GameRng;

/// Messages kept in the log
pub const MESSAGE_LIMIT: usize = 100;

/// How the run stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Outcome {
    #[default]
    Ongoing,
    /// The boss fell on the last level
    Won,
    /// The player's hit points reached zero
    Lost,
}

impl Outcome {
    pub fn is_terminal(&self) -> bool {
        *self != Outcome::Ongoing
    }
}

/// A message to display in the game log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameMessage {
    pub text: String,
    pub round: u64,
    pub category: MessageCategory,
}

/// Categories for message filtering/coloring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageCategory {
    Combat,
    Item,
    System,
    Warning,
}

/// Tallies for the end-of-run summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunStats {
    pub kills: u32,
    /// Gold picked up over the whole run
    pub gold: u32,
    pub max_depth: u32,
}

impl RunStats {
    /// Final score for a character of the given level
    pub fn score(&self, level: u32) -> u32 {
        self.kills * 10 + self.gold + self.max_depth * 50 + level * 25
    }
}

/// Where and how the player fell. The player entity is gone once its
/// hit points reach zero; this keeps the last frame renderable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Remains {
    pub position: Position,
    pub health: Health,
    pub killer: String,
}

/// Process-wide run state
pub struct GameState {
    pub(crate) config: GameConfig,
    pub(crate) seed: u64,
    pub(crate) depth: u32,
    pub(crate) map: LevelMap,
    pub(crate) visibility: Visibility,
    pub(crate) registry: EntityRegistry,
    pub(crate) player: EntityId,
    pub(crate) inventory: Inventory,
    pub(crate) equipment: Equipment,
    pub(crate) experience: Experience,
    pub(crate) stats: RunStats,
    pub(crate) outcome: Outcome,
    pub(crate) rounds: u64,
    pub(crate) rng: GameRng,
    pub(crate) item_ids: ItemIdGen,
    pub(crate) messages: Vec<GameMessage>,
    pub(crate) remains: Option<Remains>,
}

impl GameState {
    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn map(&self) -> &LevelMap {
        &self.map
    }

    pub fn visibility(&self) -> &Visibility {
        &self.visibility
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn player(&self) -> EntityId {
        self.player
    }

    /// Where the player stands, or fell
    pub fn player_position(&self) -> Option<Position> {
        self.registry
            .position(self.player)
            .or_else(|| self.remains.as_ref().map(|r| r.position))
    }

    /// The player's hit points; zero once slain
    pub fn player_health(&self) -> Option<Health> {
        self.registry
            .health(self.player)
            .or_else(|| self.remains.as_ref().map(|r| r.health))
    }

    pub fn remains(&self) -> Option<&Remains> {
        self.remains.as_ref()
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn equipment(&self) -> &Equipment {
        &self.equipment
    }

    pub fn experience(&self) -> &Experience {
        &self.experience
    }

    pub fn run_stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_terminal()
    }

    /// Completed rounds this run
    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    pub fn messages(&self) -> &[GameMessage] {
        &self.messages
    }

    pub fn score(&self) -> u32 {
        self.stats.score(self.experience.level)
    }

    /// Add a message to the log
    pub fn add_message(&mut self, text: impl Into<String>, category: MessageCategory) {
        self.messages.push(GameMessage {
            text: text.into(),
            round: self.rounds,
            category,
        });

        // Keep only the most recent messages
        if self.messages.len() > MESSAGE_LIMIT {
            let excess = self.messages.len() - MESSAGE_LIMIT;
            self.messages.drain(..excess);
        }
    }

    // =========================================================================
    // Combat helpers
    // =========================================================================

    /// Player's stats with equipment bonuses
    pub fn effective_player_stats(&self) -> CombatStats {
        self.registry
            .stats(self.player)
            .unwrap_or_default()
            .with_bonus(self.equipment.attack_bonus(), self.equipment.defense_bonus())
    }

    fn combat_context(&mut self) -> (CombatContext<'_>, &mut GameRng) {
        (
            CombatContext {
                registry: &mut self.registry,
                ids: &mut self.item_ids,
                config: &self.config.combat,
                depth: self.depth,
            },
            &mut self.rng,
        )
    }

    /// Player swings at `target`. Kills are credited and logged.
    pub(crate) fn player_attack(&mut self, target: EntityId) -> Result<AttackOutcome, RegistryError> {
        let attacker = Combatant::new(self.player, self.effective_player_stats());
        let defender_stats = self.registry.stats(target).ok_or(RegistryError::UnknownEntity(target))?;
        let defender = Combatant::new(target, defender_stats);
        let name = self.registry.name(target).unwrap_or_default();

        let outcome = {
            let (mut ctx, rng) = self.combat_context();
            resolve_attack(&mut ctx, attacker, defender, rng)?
        };

        match outcome {
            AttackOutcome::Miss => self.add_message(format!("You miss the {}.", name), MessageCategory::Combat),
            AttackOutcome::Hit { damage, remaining } => self.add_message(
                format!("You hit the {} for {} damage. ({} HP left)", name, damage, remaining),
                MessageCategory::Combat,
            ),
            AttackOutcome::Kill { .. } => self.credit_kill(&name, outcome),
        }
        Ok(outcome)
    }

    /// `monster` swings at the player
    pub(crate) fn monster_attack(&mut self, monster: EntityId) -> Result<AttackOutcome, RegistryError> {
        let attacker_stats = self.registry.stats(monster).ok_or(RegistryError::UnknownEntity(monster))?;
        let attacker = Combatant::new(monster, attacker_stats);
        let defender = Combatant::new(self.player, self.effective_player_stats());
        let name = self.registry.name(monster).unwrap_or_default();
        let max_hp = self.registry.health(self.player).map_or(0, |h| h.max);

        let outcome = {
            let (mut ctx, rng) = self.combat_context();
            resolve_attack(&mut ctx, attacker, defender, rng)?
        };

        match outcome {
            AttackOutcome::Miss => self.add_message(format!("The {} misses you.", name), MessageCategory::Combat),
            AttackOutcome::Hit { damage, .. } => {
                self.add_message(format!("The {} hits you for {}!", name, damage), MessageCategory::Combat)
            }
            AttackOutcome::Kill { damage, at, .. } => {
                self.add_message(format!("The {} hits you for {}!", name, damage), MessageCategory::Combat);
                self.remains = Some(Remains {
                    position: at,
                    health: Health { current: 0, max: max_hp },
                    killer: name.clone(),
                });
                self.player_died(&name);
            }
        }
        Ok(outcome)
    }

    /// Blast every currently visible monster (damage scrolls). Returns the
    /// number of monsters struck.
    pub(crate) fn blast_visible_monsters(&mut self) -> Result<usize, RegistryError> {
        let targets: Vec<EntityId> = self
            .registry
            .monsters_in_turn_order()
            .into_iter()
            .filter(|id| {
                self.registry
                    .position(*id)
                    .is_some_and(|pos| self.visibility.is_visible(pos))
            })
            .collect();

        for target in &targets {
            let damage = self.rng.gen_range(10..=25);
            let name = self.registry.name(*target).unwrap_or_default();
            let outcome = {
                let (mut ctx, rng) = self.combat_context();
                apply_damage(&mut ctx, *target, damage, rng)?
            };
            if outcome.is_kill() {
                self.credit_kill(&name, outcome);
            }
        }
        Ok(targets.len())
    }
}
