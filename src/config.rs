//! Tunable parameters
//!
//! Loads a [`GameConfig`] from RON, with fallback to hardcoded defaults.
//! Every field has a default, so a config file only needs to name the
//! values it changes.

use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Smallest map side that still leaves room for a walled room
pub const MIN_MAP_SIDE: i32 = 10;

/// All tunables for a run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub map: MapConfig,
    pub combat: CombatConfig,
    pub visibility: VisibilityConfig,
    pub player: PlayerConfig,
}

/// Level geometry and generation budgets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub width: i32,
    pub height: i32,
    pub room_width: RangeInclusive<i32>,
    pub room_height: RangeInclusive<i32>,
    /// Rooms aimed for on depth 1; deeper levels add a few more
    pub target_rooms: RangeInclusive<usize>,
    /// Layouts with fewer rooms than this are thrown away
    pub min_rooms: usize,
    /// Room placement attempts per layout
    pub placement_attempts: u32,
    /// Full layouts tried before generation gives up
    pub layout_retries: u32,
    /// Chance that a doorway gets a (closed) door
    pub door_chance: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 80,
            height: 30,
            room_width: 5..=12,
            room_height: 4..=8,
            target_rooms: 5..=9,
            min_rooms: 4,
            placement_attempts: 200,
            layout_retries: 10,
            door_chance: 0.35,
        }
    }
}

/// Hit and damage curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Hit chance when attack equals defense
    pub base_hit_chance: f64,
    /// Hit chance gained per point of attack above defense
    pub hit_chance_per_point: f64,
    pub min_hit_chance: f64,
    pub max_hit_chance: f64,
    /// Upper bound of the random amount shaved off each hit
    pub damage_variance: i32,
    pub min_damage: i32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            base_hit_chance: 0.75,
            hit_chance_per_point: 0.05,
            min_hit_chance: 0.10,
            max_hit_chance: 0.95,
            damage_variance: 2,
            min_damage: 1,
        }
    }
}

impl CombatConfig {
    /// Hit chance bounds, kept strictly inside (0, 1) so neither a hit
    /// nor a miss is ever certain
    pub fn hit_bounds(&self) -> (f64, f64) {
        let lo = self.min_hit_chance.clamp(0.01, 0.99);
        let hi = self.max_hit_chance.clamp(lo, 0.99);
        (lo, hi)
    }
}

/// Sight and perception ranges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityConfig {
    pub fov_radius: i32,
    pub perception_range: i32,
    pub wander_chance: f64,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            fov_radius: 8,
            perception_range: 8,
            wander_chance: 0.25,
        }
    }
}

/// Starting character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub max_hp: i32,
    pub attack: i32,
    pub defense: i32,
    pub speed: i32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            max_hp: 30,
            attack: 3,
            defense: 0,
            speed: 10,
        }
    }
}

impl GameConfig {
    /// Parse a config from RON text. The result is validated.
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the generator or the dice cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let map = &self.map;
        if map.width < MIN_MAP_SIDE || map.height < MIN_MAP_SIDE {
            return invalid(format!(
                "map must be at least {MIN_MAP_SIDE}x{MIN_MAP_SIDE}, got {}x{}",
                map.width, map.height
            ));
        }
        check_range("map.room_width", &map.room_width, 3)?;
        check_range("map.room_height", &map.room_height, 3)?;
        check_range("map.target_rooms", &map.target_rooms, 1)?;
        if map.min_rooms < 2 {
            return invalid(format!("map.min_rooms must be at least 2, got {}", map.min_rooms));
        }
        check_chance("map.door_chance", map.door_chance)?;

        let combat = &self.combat;
        check_chance("combat.base_hit_chance", combat.base_hit_chance)?;
        check_chance("combat.min_hit_chance", combat.min_hit_chance)?;
        check_chance("combat.max_hit_chance", combat.max_hit_chance)?;
        if !combat.hit_chance_per_point.is_finite() {
            return invalid("combat.hit_chance_per_point must be finite".into());
        }
        if combat.min_hit_chance > combat.max_hit_chance {
            return invalid(format!(
                "combat.min_hit_chance {} is above combat.max_hit_chance {}",
                combat.min_hit_chance, combat.max_hit_chance
            ));
        }
        if combat.damage_variance < 0 {
            return invalid(format!(
                "combat.damage_variance must not be negative, got {}",
                combat.damage_variance
            ));
        }

        let visibility = &self.visibility;
        if visibility.fov_radius < 0 || visibility.perception_range < 0 {
            return invalid("visibility ranges must not be negative".into());
        }
        check_chance("visibility.wander_chance", visibility.wander_chance)?;

        if self.player.max_hp < 1 {
            return invalid(format!("player.max_hp must be at least 1, got {}", self.player.max_hp));
        }
        Ok(())
    }

    /// Load a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_ron(&content)
    }

    /// Load a config file, falling back to defaults when it is missing or broken
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Failed to load {}: {}. Using defaults.", path.display(), e);
                Self::default()
            }
        }
    }

    /// Serialize to pretty RON (for writing a starter config)
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }
}

fn invalid(reason: String) -> Result<(), ConfigError> {
    Err(ConfigError::Invalid(reason))
}

fn check_range<T>(field: &str, range: &RangeInclusive<T>, min_start: T) -> Result<(), ConfigError>
where
    T: PartialOrd + std::fmt::Display,
{
    if range.is_empty() {
        return invalid(format!("{field} is empty ({}..={})", range.start(), range.end()));
    }
    if *range.start() < min_start {
        return invalid(format!("{field} must start at {min_start} or more, got {}", range.start()));
    }
    Ok(())
}

fn check_chance(field: &str, chance: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&chance) {
        return invalid(format!("{field} must be a probability, got {chance}"));
    }
    Ok(())
}
