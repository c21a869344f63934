//! Property tests: level connectivity, determinism, and the registry and
//! health invariants under arbitrary play.

use std::collections::HashSet;

use depthcrawl::config::MapConfig;
use depthcrawl::world::generate;
use depthcrawl::{Direction, GameConfig, GameState, PlayerAction, TurnScheduler, MAX_DEPTH};
use proptest::prelude::*;

fn action_strategy() -> impl Strategy<Value = PlayerAction> {
    prop_oneof![
        4 => (0usize..8).prop_map(|i| PlayerAction::Move(Direction::ALL[i])),
        2 => (0usize..8).prop_map(|i| PlayerAction::Attack(Direction::ALL[i])),
        1 => Just(PlayerAction::Wait),
        1 => Just(PlayerAction::Descend),
        1 => (0usize..5).prop_map(PlayerAction::Buy),
    ]
}

/// Check the per-round invariants on a live state
fn check_invariants(state: &GameState) -> Result<(), TestCaseError> {
    let registry = state.registry();
    let mut seen = HashSet::new();
    for (id, pos) in registry.committed_positions() {
        prop_assert!(seen.insert(pos), "two entities on {:?}", pos);
        prop_assert_eq!(registry.entity_at(pos), Some(id));
        prop_assert!(state.map().is_walkable(pos), "{} stands on {:?}", id, state.map().tile(pos));
    }

    for id in registry.ids() {
        if let Some(health) = registry.health(id) {
            // Anything brought to zero leaves the registry at once
            prop_assert!(health.current > 0 && health.current <= health.max, "{} at {:?}", id, health);
        }
    }

    // The player is either alive on the level or has fallen and ended the run
    match (registry.contains(state.player()), state.remains()) {
        (true, None) => {}
        (false, Some(remains)) => {
            prop_assert_eq!(remains.health.current, 0);
            prop_assert!(state.is_over());
        }
        (alive, remains) => prop_assert!(false, "player alive: {}, remains: {:?}", alive, remains),
    }
    Ok(())
}

proptest! {
    /// Every generated level is a single connected region with reachable stairs.
    #[test]
    fn prop_levels_are_connected(seed: u64, depth in 1u32..=MAX_DEPTH) {
        let map = generate(seed, depth, &MapConfig::default()).unwrap();
        prop_assert!(map.is_fully_connected());
        let dist = map.distances_from(map.stairs_up);
        match map.stairs_down {
            Some(stairs) => prop_assert!(dist[map.idx(stairs)].is_some()),
            None => prop_assert_eq!(depth, MAX_DEPTH),
        }
        prop_assert!(dist[map.idx(map.lair)].is_some());
    }

    /// Same seed and depth, same level.
    #[test]
    fn prop_generation_is_deterministic(seed: u64, depth in 1u32..=MAX_DEPTH) {
        let a = generate(seed, depth, &MapConfig::default()).unwrap();
        let b = generate(seed, depth, &MapConfig::default()).unwrap();
        prop_assert_eq!(a, b);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Arbitrary play never stacks entities, never leaves health out of
    /// range, and never climbs back up.
    #[test]
    fn prop_invariants_hold_under_play(
        seed: u64,
        actions in prop::collection::vec(action_strategy(), 1..60),
    ) {
        let mut state = GameState::new_run(seed, GameConfig::default()).unwrap();
        let mut scheduler = TurnScheduler::new();
        check_invariants(&state)?;

        for action in actions {
            let depth = state.depth();
            let rounds = state.rounds();
            match scheduler.submit(&mut state, action) {
                Ok(report) => prop_assert_eq!(report.round, rounds + 1),
                Err(_) => prop_assert_eq!(state.rounds(), rounds),
            }
            prop_assert!(state.depth() >= depth);
            check_invariants(&state)?;
        }
    }

    /// Two runs fed the same inputs stay identical.
    #[test]
    fn prop_runs_are_reproducible(
        seed: u64,
        actions in prop::collection::vec(action_strategy(), 1..30),
    ) {
        let mut a = GameState::new_run(seed, GameConfig::default()).unwrap();
        let mut b = GameState::new_run(seed, GameConfig::default()).unwrap();
        let mut sa = TurnScheduler::new();
        let mut sb = TurnScheduler::new();
        for action in actions {
            prop_assert_eq!(sa.submit(&mut a, action), sb.submit(&mut b, action));
        }
        prop_assert_eq!(a.snapshot(), b.snapshot());
    }
}
