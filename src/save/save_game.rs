//! Game save/load
//!
//! A run can't be rebuilt from its seed alone once monsters have moved and
//! items have changed hands, so a save carries the live level verbatim:
//! tiles, visibility memory, every entity, the player's belongings and the
//! RNG stream position.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::GameConfig;
use crate::ecs::{EntityId, EntityRecord, EntityRegistry};
use crate::error::RegistryError;
use crate::game::{GameState, MessageCategory, Outcome, Remains, RunStats};
use crate::items::{Equipment, Inventory, ItemIdGen};
use crate::progression::Experience;
use crate::world::{LevelMap, Visibility};
use crate::GameRng;

/// Save format version for compatibility checking
pub const SAVE_VERSION: u32 = 1;

/// Save error types
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("save version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("save data is inconsistent: {0}")]
    Registry(#[from] RegistryError),

    #[error("save data is corrupt: {0}")]
    Corrupt(String),
}

/// Complete save data structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveData {
    pub version: u32,
    pub config: GameConfig,
    pub seed: u64,
    pub depth: u32,
    pub map: LevelMap,
    pub visibility: Visibility,
    pub entities: Vec<EntityRecord>,
    pub next_entity_id: u64,
    pub player: EntityId,
    pub inventory: Inventory,
    pub equipment: Equipment,
    pub experience: Experience,
    pub stats: RunStats,
    pub outcome: Outcome,
    pub rounds: u64,
    pub rng: GameRng,
    pub item_ids: ItemIdGen,
    /// Set once the player has fallen
    #[serde(default)]
    pub remains: Option<Remains>,
}

impl SaveData {
    /// Copy everything needed to resume `state`
    pub fn capture(state: &GameState) -> Self {
        Self {
            version: SAVE_VERSION,
            config: state.config.clone(),
            seed: state.seed,
            depth: state.depth,
            map: state.map.clone(),
            visibility: state.visibility.clone(),
            entities: state.registry.records(),
            next_entity_id: state.registry.next_id(),
            player: state.player,
            inventory: state.inventory.clone(),
            equipment: state.equipment.clone(),
            experience: state.experience,
            stats: state.stats,
            outcome: state.outcome,
            rounds: state.rounds,
            rng: state.rng.clone(),
            item_ids: state.item_ids.clone(),
            remains: state.remains.clone(),
        }
    }

    /// Rebuild the run. The message log starts empty.
    pub fn restore(self) -> Result<GameState, SaveError> {
        if self.version != SAVE_VERSION {
            return Err(SaveError::VersionMismatch {
                expected: SAVE_VERSION,
                found: self.version,
            });
        }
        if !self.map.is_well_formed() {
            return Err(SaveError::Corrupt(format!(
                "map is not a {}x{} grid",
                self.map.width, self.map.height
            )));
        }
        if !self.visibility.fits(&self.map) {
            return Err(SaveError::Corrupt("visibility does not match the map".into()));
        }
        if let Some(record) = self.entities.iter().find(|r| !self.map.in_bounds(r.position)) {
            return Err(SaveError::Corrupt(format!(
                "entity {} lies off the map at ({}, {})",
                record.id, record.position.x, record.position.y
            )));
        }

        let registry = EntityRegistry::from_records(self.entities, self.next_entity_id)?;
        // A fallen player leaves remains instead of an entity
        let fallen = self.outcome == Outcome::Lost && self.remains.is_some();
        if !registry.contains(self.player) && !fallen {
            return Err(RegistryError::UnknownEntity(self.player).into());
        }

        let mut state = GameState {
            config: self.config,
            seed: self.seed,
            depth: self.depth,
            map: self.map,
            visibility: self.visibility,
            registry,
            player: self.player,
            inventory: self.inventory,
            equipment: self.equipment,
            experience: self.experience,
            stats: self.stats,
            outcome: self.outcome,
            rounds: self.rounds,
            rng: self.rng,
            item_ids: self.item_ids,
            messages: Vec::new(),
            remains: self.remains,
        };
        log::info!("Restored run at depth {}, round {}", state.depth, state.rounds);
        state.add_message("Game loaded.", MessageCategory::System);
        Ok(state)
    }

    pub fn to_json(&self) -> Result<String, SaveError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SaveError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl GameState {
    /// Serialise the run to JSON
    pub fn save_json(&self) -> Result<String, SaveError> {
        SaveData::capture(self).to_json()
    }

    /// Resume a run saved with [`GameState::save_json`]
    pub fn load_json(json: &str) -> Result<Self, SaveError> {
        SaveData::from_json(json)?.restore()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{PlayerAction, TurnScheduler};

    fn played_state() -> GameState {
        let mut state = GameState::new_run(7, GameConfig::default()).unwrap();
        let mut scheduler = TurnScheduler::new();
        for _ in 0..5 {
            scheduler.submit(&mut state, PlayerAction::Wait).unwrap();
        }
        state
    }

    #[test]
    fn test_restore_matches_original() {
        let state = played_state();
        let restored = GameState::load_json(&state.save_json().unwrap()).unwrap();

        assert_eq!(restored.depth(), state.depth());
        assert_eq!(restored.rounds(), state.rounds());
        assert_eq!(restored.map(), state.map());
        assert_eq!(restored.visibility(), state.visibility());
        assert_eq!(restored.registry().records(), state.registry().records());
        assert_eq!(restored.player_health(), state.player_health());
        assert_eq!(restored.inventory(), state.inventory());
        assert_eq!(restored.outcome(), state.outcome());
    }

    #[test]
    fn test_restored_run_continues_identically() {
        let mut original = played_state();
        let mut restored = GameState::load_json(&original.save_json().unwrap()).unwrap();
        let mut a = TurnScheduler::new();
        let mut b = TurnScheduler::new();

        for _ in 0..10 {
            let left = a.submit(&mut original, PlayerAction::Wait);
            let right = b.submit(&mut restored, PlayerAction::Wait);
            assert_eq!(left, right);
        }
        assert_eq!(original.registry().records(), restored.registry().records());
    }

    #[test]
    fn test_version_mismatch() {
        let mut data = SaveData::capture(&played_state());
        data.version = SAVE_VERSION + 1;
        assert!(matches!(
            data.restore(),
            Err(SaveError::VersionMismatch { expected: SAVE_VERSION, found }) if found == SAVE_VERSION + 1
        ));
    }

    #[test]
    fn test_truncated_tiles_are_rejected() {
        let json = played_state().save_json().unwrap();
        let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
        value["map"]["tiles"].as_array_mut().unwrap().truncate(10);
        let result = GameState::load_json(&value.to_string());
        assert!(matches!(result, Err(SaveError::Corrupt(_))), "{:?}", result.err());
    }

    #[test]
    fn test_mismatched_visibility_is_rejected() {
        let mut data = SaveData::capture(&played_state());
        data.visibility = Visibility::new(&LevelMap::new(12, 12, 1, 0));
        assert!(matches!(data.restore(), Err(SaveError::Corrupt(_))));
    }

    #[test]
    fn test_lost_run_round_trips() {
        let mut state = played_state();
        let monster = state.registry().monsters_in_turn_order()[0];
        {
            let mut health = state.registry.health_mut(state.player).unwrap();
            let current = health.current;
            health.take_damage(current - 1);
        }
        while !state.is_over() {
            state.monster_attack(monster).unwrap();
        }

        let restored = GameState::load_json(&state.save_json().unwrap()).unwrap();
        assert_eq!(restored.outcome(), Outcome::Lost);
        assert_eq!(restored.remains(), state.remains());
        assert_eq!(restored.player_health().unwrap().current, 0);
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(matches!(GameState::load_json("{ not json"), Err(SaveError::Json(_))));
    }
}
