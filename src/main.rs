//! Depthcrawl - headless entry point
//!
//! Plays one run with a simple autopilot and prints the result. Usage:
//! `depthcrawl [seed] [config.ron]`.

use anyhow::{Context, Result};

use depthcrawl::ecs::{Direction, Position};
use depthcrawl::items::{Consumable, ItemKind};
use depthcrawl::{GameConfig, GameState, PlayerAction, TurnScheduler, MAX_DEPTH};

/// Hard stop so a stuck bot can't spin forever
const MAX_ROUNDS: u64 = 20_000;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let seed = match args.next() {
        Some(raw) => raw.parse::<u64>().with_context(|| format!("invalid seed: {raw}"))?,
        None => 42,
    };
    let config = match args.next() {
        Some(path) => GameConfig::load(&path).with_context(|| format!("loading config {path}"))?,
        None => GameConfig::default(),
    };

    let mut state = GameState::new_run(seed, config)?;
    let mut scheduler = TurnScheduler::new();

    while !state.is_over() && state.rounds() < MAX_ROUNDS {
        let action = choose_action(&state);
        if let Err(e) = scheduler.submit(&mut state, action) {
            log::warn!("Autopilot action {:?} rejected: {}", action, e);
            scheduler.submit(&mut state, PlayerAction::Wait)?;
        }
    }

    let snapshot = state.snapshot();
    print!("{}", snapshot.render_text());
    for line in &snapshot.messages {
        println!("{}", line);
    }
    println!(
        "Seed {} | outcome {:?} | depth {} | level {} | kills {} | gold {} | rounds {} | score {}",
        seed,
        state.outcome(),
        state.depth(),
        state.experience().level,
        state.run_stats().kills,
        state.run_stats().gold,
        state.rounds(),
        state.score()
    );
    Ok(())
}

/// Pick the bot's next move: heal when low, blast crowds, fight what's
/// adjacent, then head for the stairs (or the dragon's lair on the last
/// level), walking around the merchant.
fn choose_action(state: &GameState) -> PlayerAction {
    let Some(pos) = state.player_position() else {
        return PlayerAction::Wait;
    };

    if let Some(health) = state.player_health() {
        if health.current * 3 < health.max {
            let potion = state
                .inventory()
                .items()
                .iter()
                .find(|item| matches!(item.kind, ItemKind::Consumable(Consumable::Potion { .. })));
            if let Some(potion) = potion {
                return PlayerAction::UseItem(potion.id);
            }
        }
    }

    // Wear anything better than what's equipped
    if let Some(item) = state
        .inventory()
        .items()
        .iter()
        .find(|item| state.equipment().is_upgrade(item))
    {
        return PlayerAction::UseItem(item.id);
    }

    // A crowd in view is worth a damaging scroll
    let in_view = state
        .snapshot()
        .entities
        .iter()
        .filter(|e| e.role.is_monster())
        .count();
    if in_view >= 2 {
        let scroll = state.inventory().items().iter().find(|item| {
            matches!(item.kind, ItemKind::Consumable(Consumable::Scroll(effect)) if effect.is_damaging())
        });
        if let Some(scroll) = scroll {
            return PlayerAction::UseItem(scroll.id);
        }
    }

    if let Some(dir) = adjacent_monster(state, pos) {
        return PlayerAction::Attack(dir);
    }

    let map = state.map();
    if map.stairs_down == Some(pos) && state.depth() < MAX_DEPTH {
        return PlayerAction::Descend;
    }

    let goal = match map.stairs_down {
        Some(stairs) => stairs,
        None => boss_position(state).unwrap_or(map.lair),
    };
    map.next_step_avoiding(pos, goal, |cell| state.registry().merchant_at(cell).is_some())
        .and_then(|step| pos.direction_to(&step))
        .map(PlayerAction::Move)
        .unwrap_or(PlayerAction::Wait)
}

/// A monster within reach: adjacent and not around a wall corner
fn adjacent_monster(state: &GameState, pos: Position) -> Option<Direction> {
    Direction::ALL.into_iter().find(|dir| {
        let at = pos.offset(*dir);
        !state.map().cuts_corner(pos, at)
            && state
                .registry()
                .actor_at(at)
                .and_then(|id| state.registry().role(id))
                .is_some_and(|role| role.is_monster())
    })
}

fn boss_position(state: &GameState) -> Option<Position> {
    state.registry().boss().and_then(|id| state.registry().position(id))
}
