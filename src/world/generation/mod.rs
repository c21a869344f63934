//! Procedural map generation
//!
//! Turns a (seed, depth) pair into a connected [`LevelMap`]. The same pair
//! always yields the same map.

pub mod rooms;

use rand::SeedableRng;

use super::LevelMap;
use crate::config::MapConfig;
use crate::error::GenerationError;
use crate::GameRng;

/// Derive the RNG seed for one level of a run
pub fn level_seed(seed: u64, depth: u32) -> u64 {
    seed ^ (depth as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Generate the level for `depth` of the run started with `seed`.
///
/// Layouts with too few rooms are discarded and rebuilt; after
/// `layout_retries` failures generation gives up.
pub fn generate(seed: u64, depth: u32, config: &MapConfig) -> Result<LevelMap, GenerationError> {
    let mut rng = GameRng::seed_from_u64(level_seed(seed, depth));
    let attempts = config.layout_retries.max(1);

    for attempt in 1..=attempts {
        let mut map = rooms::build_layout(&mut rng, depth, seed, config);
        if map.rooms.len() < config.min_rooms.max(2) {
            log::debug!(
                "Depth {} layout {} has only {} rooms, retrying",
                depth,
                attempt,
                map.rooms.len()
            );
            continue;
        }

        rooms::ensure_connected(&mut map);
        rooms::place_doors(&mut map, &mut rng, config.door_chance);
        rooms::place_stairs(&mut map);

        if !map.is_fully_connected() {
            log::debug!("Depth {} layout {} failed the connectivity check", depth, attempt);
            continue;
        }

        log::info!(
            "Generated depth {} (seed {}): {} rooms, attempt {}",
            depth,
            seed,
            map.rooms.len(),
            attempt
        );
        return Ok(map);
    }

    Err(GenerationError::NoConnectedLayout { depth, attempts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::TileType;
    use crate::MAX_DEPTH;

    #[test]
    fn test_every_depth_is_connected() {
        let config = MapConfig::default();
        for seed in [1, 42, 1337] {
            for depth in 1..=MAX_DEPTH {
                let map = generate(seed, depth, &config).unwrap();
                assert!(map.is_fully_connected(), "seed {seed} depth {depth}");
                assert!(map.rooms.len() >= config.min_rooms);
            }
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let config = MapConfig::default();
        let a = generate(42, 3, &config).unwrap();
        let b = generate(42, 3, &config).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, generate(43, 3, &config).unwrap());
    }

    #[test]
    fn test_seed_42_depth_1() {
        let map = generate(42, 1, &MapConfig::default()).unwrap();
        assert!(map.rooms.len() >= 4);
        let down = map.stairs_down.unwrap();
        assert_eq!(map.tile(down), Some(TileType::StairsDown));
        assert!(map.reachable_from(map.stairs_up)[map.idx(down)]);
        assert_eq!(map.tile(map.stairs_up), Some(TileType::StairsUp));
    }

    #[test]
    fn test_bottom_has_lair_instead_of_stairs() {
        let map = generate(42, MAX_DEPTH, &MapConfig::default()).unwrap();
        assert_eq!(map.stairs_down, None);
        assert_ne!(map.lair, map.stairs_up);
        assert!(!map.tiles().contains(&TileType::StairsDown));
    }

    #[test]
    fn test_impossible_config_fails() {
        let config = MapConfig {
            width: 12,
            height: 10,
            min_rooms: 6,
            layout_retries: 3,
            ..MapConfig::default()
        };
        assert_eq!(
            generate(1, 1, &config),
            Err(GenerationError::NoConnectedLayout { depth: 1, attempts: 3 })
        );
    }
}
