//! Turn management
//!
//! One round is one player action followed by one action per living
//! monster, fastest first and ties broken by the lower id. The scheduler
//! is stepped once per player input; it never blocks or loops on its own.

use crate::combat::AttackOutcome;
use crate::ecs::{decide_monster_action, EntityId, MonsterAction};
use crate::error::ActionError;
use crate::game::actions::{ActionResult, PlayerAction};
use crate::game::{GameState, Outcome};

/// Where the scheduler is within a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnPhase {
    #[default]
    AwaitingPlayerInput,
    ResolvingPlayerAction,
    ResolvingMonsterActions,
    RoundComplete,
    /// The run is over; nothing more will be processed
    Finished,
}

/// One monster's action within a round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonsterTurn {
    pub monster: EntityId,
    pub action: MonsterAction,
    /// Set when the monster attacked
    pub attack: Option<AttackOutcome>,
}

/// Everything that happened in one round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReport {
    pub round: u64,
    pub player: ActionResult,
    pub monsters: Vec<MonsterTurn>,
    pub outcome: Outcome,
}

/// Manages turn order
#[derive(Debug, Clone, Default)]
pub struct TurnScheduler {
    phase: TurnPhase,
}

impl TurnScheduler {
    /// Create a new turn scheduler
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Run one full round driven by `action`.
    ///
    /// Rejected actions leave the state untouched and do not consume the
    /// turn. Accepted actions always end the round.
    pub fn submit(&mut self, state: &mut GameState, action: PlayerAction) -> Result<TurnReport, ActionError> {
        if state.is_over() {
            self.phase = TurnPhase::Finished;
            return Err(ActionError::RunOver);
        }
        state.validate_action(&action)?;

        self.phase = TurnPhase::ResolvingPlayerAction;
        log::debug!("Round {}: player {:?}", state.rounds + 1, action);
        let result = match state.perform_player_action(action) {
            Ok(result) => result,
            Err(e) => {
                self.phase = TurnPhase::AwaitingPlayerInput;
                return Err(e);
            }
        };

        // A fresh level gives its monsters no head start
        let mut monsters = Vec::new();
        if !state.is_over() && !matches!(result, ActionResult::Descended { .. }) {
            self.phase = TurnPhase::ResolvingMonsterActions;
            monsters = run_monster_phase(state)?;
        }

        self.phase = TurnPhase::RoundComplete;
        state.rounds += 1;
        let report = TurnReport {
            round: state.rounds,
            player: result,
            monsters,
            outcome: state.outcome,
        };

        self.phase = if state.is_over() {
            TurnPhase::Finished
        } else {
            TurnPhase::AwaitingPlayerInput
        };
        Ok(report)
    }
}

/// Every living monster acts once, in initiative order. Stops as soon as
/// the player dies.
fn run_monster_phase(state: &mut GameState) -> Result<Vec<MonsterTurn>, ActionError> {
    let mut turns = Vec::new();

    for monster in state.registry.monsters_in_turn_order() {
        if state.is_over() {
            break;
        }
        if !state.registry.contains(monster) {
            continue;
        }

        let (action, ai_state) = decide_monster_action(
            &state.registry,
            &state.map,
            monster,
            state.player,
            &state.config.visibility,
            &mut state.rng,
        );
        state.registry.set_ai_state(monster, ai_state);

        let attack = match action {
            MonsterAction::Attack { .. } => Some(state.monster_attack(monster)?),
            MonsterAction::Move { to } => {
                state.registry.move_to(monster, to)?;
                None
            }
            MonsterAction::OpenDoor { at } => {
                state.map.open_door(at);
                None
            }
            MonsterAction::Idle => None,
        };
        turns.push(MonsterTurn { monster, action, attack });
    }

    Ok(turns)
}
