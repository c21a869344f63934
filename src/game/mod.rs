//! Game module - run state, player actions and the turn loop

mod state;
mod actions;
mod turn;
mod snapshot;

pub use state::{GameMessage, GameState, MessageCategory, Outcome, Remains, RunStats, MESSAGE_LIMIT};
pub use actions::{ActionResult, PlayerAction};
pub use turn::{MonsterTurn, TurnPhase, TurnReport, TurnScheduler};
pub use snapshot::{EntityView, PlayerView, RenderSnapshot, ShopView, TileView};
